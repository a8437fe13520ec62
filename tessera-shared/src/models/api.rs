//! Request and response bodies of the `/api` JSON surface.
//!
//! The server handlers and the HTTP gateway both use these types, so the two
//! sides cannot drift apart.

use serde::{Deserialize, Serialize};

use super::event::Event;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub event_id: i64,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
    pub reservation_id: i64,
    pub reservation_code: String,
}

/// Exactly one of `reservation_id` / `reservation_code` names the reservation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CancelReservationRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reservation_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reservation_code: Option<String>,
    pub email: String,
}

/// Event fields as they travel over the wire: timestamps are ISO 8601 strings
/// so the server can report unparseable values as validation errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventPayload {
    pub title: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditEventRequest {
    pub event_id: i64,
    #[serde(flatten)]
    pub event: EventPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteEventRequest {
    pub event_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventResponse {
    pub message: String,
    pub event: Event,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationsQuery {
    #[serde(default)]
    pub email: Option<String>,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}
