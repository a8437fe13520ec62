use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: i64,
    pub event_id: i64,
    pub email: String,
    pub reservation_code: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewReservation {
    pub event_id: i64,
    pub email: String,
    pub reservation_code: String,
}

/// A reservation joined with the title of its event, as listed to the holder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservationSummary {
    pub id: i64,
    pub event_id: i64,
    pub email: String,
    pub reservation_code: String,
    pub event_title: String,
    pub created_at: DateTime<Utc>,
}

/// How a cancellation names its reservation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReservationRef {
    Id(i64),
    Code(String),
}

impl fmt::Display for ReservationRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReservationRef::Id(id) => write!(f, "{}", id),
            ReservationRef::Code(code) => write!(f, "{}", code),
        }
    }
}
