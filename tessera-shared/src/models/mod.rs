pub mod api;
pub mod event;
pub mod reservation;
pub mod user;

pub use event::{Event, NewEvent};
pub use reservation::{NewReservation, Reservation, ReservationRef, ReservationSummary};
pub use user::{NewUser, User};
