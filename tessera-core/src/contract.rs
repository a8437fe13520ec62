use async_trait::async_trait;
use tessera_shared::models::{Event, NewEvent, Reservation, ReservationRef, ReservationSummary};

use crate::CoreResult;

/// Event and reservation operations as seen by the web layer.
///
/// `RegistrationService` implements this in-process; an HTTP client of the
/// JSON API implements it across processes.
#[async_trait]
pub trait ReservationsApi: Send + Sync {
    async fn list_events(&self) -> CoreResult<Vec<Event>>;

    async fn get_event(&self, id: i64) -> CoreResult<Event>;

    async fn list_reservations(&self, email: &str) -> CoreResult<Vec<ReservationSummary>>;

    async fn find_reservation(&self, code: &str) -> CoreResult<ReservationSummary>;

    /// Reserve a place for `email` and return the new reservation with its code.
    async fn register(&self, event_id: i64, email: &str) -> CoreResult<Reservation>;

    /// Cancel a reservation on behalf of `email`, which must match the holder.
    async fn cancel(&self, target: ReservationRef, email: &str) -> CoreResult<()>;

    async fn create_event(&self, event: NewEvent) -> CoreResult<Event>;

    async fn update_event(&self, id: i64, event: NewEvent) -> CoreResult<Event>;

    async fn delete_event(&self, id: i64) -> CoreResult<()>;
}
