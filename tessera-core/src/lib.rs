pub mod code;
pub mod contract;
pub mod password;
pub mod repository;
pub mod service;
pub mod timestamp;

pub use contract::ReservationsApi;
pub use service::{AdminBootstrap, RegistrationService};

/// Business errors shared by the service, the repositories and both HTTP surfaces.
///
/// Display strings are user-facing: the web layer shows them as flash messages.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoreError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("You have already registered for this event.")]
    AlreadyRegistered { event_id: i64, email: String },
    #[error("Reservation code collision")]
    DuplicateCode,
    #[error("An account with this email already exists.")]
    EmailTaken(String),
    #[error("Invalid email or password.")]
    InvalidCredentials,
    #[error("{0}")]
    Forbidden(String),
    #[error("The reservation service is unavailable: {0}")]
    Transport(String),
    #[error("Storage error: {0}")]
    Storage(String),
}

impl CoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn event_not_found(id: i64) -> Self {
        Self::NotFound(format!("Event {} not found.", id))
    }

    pub fn reservation_not_found(reference: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("Reservation {} not found.", reference))
    }

    pub fn storage(err: impl std::fmt::Display) -> Self {
        Self::Storage(err.to_string())
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
