pub mod app_config;
pub mod database;
pub mod event_repo;
pub mod memory;
pub mod reservation_repo;
pub mod user_repo;

pub use database::DbClient;
pub use event_repo::PgEventRepository;
pub use memory::InMemoryStore;
pub use reservation_repo::PgReservationRepository;
pub use user_repo::PgUserRepository;

use tessera_core::CoreError;

/// Maps a driver error to the business error it stands for.
///
/// Constraint names come from the migrations.
pub(crate) fn map_db_error(err: sqlx::Error) -> CoreError {
    if let sqlx::Error::Database(db) = &err {
        match db.constraint() {
            Some("reservations_event_email_key") => {
                return CoreError::AlreadyRegistered { event_id: 0, email: String::new() }
            }
            Some("reservations_code_key") => return CoreError::DuplicateCode,
            Some("users_email_key") => return CoreError::EmailTaken(String::new()),
            Some("reservations_event_id_fkey") => {
                return CoreError::NotFound("Event not found.".to_string())
            }
            _ => {}
        }
    }
    tracing::error!("Database error: {}", err);
    CoreError::storage(err)
}
