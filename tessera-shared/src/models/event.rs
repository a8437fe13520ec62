use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub thumbnail: Option<String>,
}

/// Field values for creating an event or replacing an existing one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEvent {
    pub title: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub thumbnail: Option<String>,
}

impl Event {
    pub fn from_new(id: i64, new: NewEvent) -> Self {
        Self {
            id,
            title: new.title,
            start_date: new.start_date,
            end_date: new.end_date,
            thumbnail: new.thumbnail,
        }
    }
}
