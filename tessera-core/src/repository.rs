use async_trait::async_trait;
use tessera_shared::models::{
    Event, NewEvent, NewReservation, NewUser, Reservation, ReservationSummary, User,
};

use crate::CoreResult;

/// Repository trait for user accounts
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> CoreResult<Option<User>>;

    /// Fails with `CoreError::EmailTaken` when the email already has an account.
    async fn create_user(&self, user: NewUser) -> CoreResult<User>;
}

/// Repository trait for events
#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn list_events(&self) -> CoreResult<Vec<Event>>;

    async fn get_event(&self, id: i64) -> CoreResult<Option<Event>>;

    async fn create_event(&self, event: &NewEvent) -> CoreResult<Event>;

    /// Returns `None` when no event has this id.
    async fn update_event(&self, id: i64, event: &NewEvent) -> CoreResult<Option<Event>>;

    /// Deletes the event and every reservation that references it in one
    /// atomic step. Returns the number of reservations removed, or `None`
    /// when no event has this id.
    async fn delete_event_cascade(&self, id: i64) -> CoreResult<Option<u64>>;
}

/// Repository trait for reservations
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Inserts atomically. Fails with `AlreadyRegistered` when the
    /// (event, email) pair exists, `DuplicateCode` when the code is taken,
    /// and `NotFound` when the event is gone.
    async fn insert_reservation(&self, reservation: NewReservation) -> CoreResult<Reservation>;

    async fn find_by_id(&self, id: i64) -> CoreResult<Option<ReservationSummary>>;

    async fn find_by_code(&self, code: &str) -> CoreResult<Option<ReservationSummary>>;

    async fn list_by_email(&self, email: &str) -> CoreResult<Vec<ReservationSummary>>;

    /// Returns false when the reservation was already gone.
    async fn delete_reservation(&self, id: i64) -> CoreResult<bool>;
}
