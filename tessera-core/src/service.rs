use async_trait::async_trait;
use std::sync::Arc;
use tessera_shared::{
    mask_email,
    models::{Event, NewEvent, NewReservation, NewUser, Reservation, ReservationRef, ReservationSummary, User},
    Masked,
};
use tracing::{info, warn};
use validator::ValidateEmail;

use crate::code::generate_reservation_code;
use crate::contract::ReservationsApi;
use crate::password::{hash_password_blocking, verify_password_blocking};
use crate::repository::{EventRepository, ReservationRepository, UserRepository};
use crate::{CoreError, CoreResult};

/// Attempts at drawing a fresh reservation code before giving up.
const MAX_CODE_ATTEMPTS: usize = 5;
pub const MIN_PASSWORD_LENGTH: usize = 6;
/// Column width of `users.email` and `reservations.email`.
pub const MAX_EMAIL_LENGTH: usize = 120;
pub const MAX_TITLE_LENGTH: usize = 100;
pub const MAX_THUMBNAIL_LENGTH: usize = 200;

/// Outcome of the startup admin bootstrap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminBootstrap {
    Created,
    AlreadyExists,
}

/// All business rules of the registration system, over pluggable repositories.
pub struct RegistrationService {
    users: Arc<dyn UserRepository>,
    events: Arc<dyn EventRepository>,
    reservations: Arc<dyn ReservationRepository>,
}

/// Emails are compared case-insensitively and without surrounding whitespace.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn checked_email(email: &str) -> CoreResult<String> {
    let email = normalize_email(email);
    if email.is_empty() {
        return Err(CoreError::validation("Email is required."));
    }
    if email.chars().count() > MAX_EMAIL_LENGTH {
        return Err(CoreError::validation(format!(
            "Email must be at most {} characters.",
            MAX_EMAIL_LENGTH
        )));
    }
    if !email.validate_email() {
        return Err(CoreError::validation("Invalid email address."));
    }
    Ok(email)
}

/// Field rules shared by event creation and editing.
pub fn validate_new_event(event: &NewEvent) -> CoreResult<()> {
    let title = event.title.trim();
    if title.is_empty() {
        return Err(CoreError::validation("Title is required."));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(CoreError::validation(format!(
            "Title must be at most {} characters.",
            MAX_TITLE_LENGTH
        )));
    }
    if let Some(thumbnail) = &event.thumbnail {
        if thumbnail.chars().count() > MAX_THUMBNAIL_LENGTH {
            return Err(CoreError::validation(format!(
                "Thumbnail URL must be at most {} characters.",
                MAX_THUMBNAIL_LENGTH
            )));
        }
    }
    if event.end_date < event.start_date {
        return Err(CoreError::validation("End date must not be before the start date."));
    }
    Ok(())
}

fn tidy_event(mut event: NewEvent) -> NewEvent {
    event.title = event.title.trim().to_string();
    event.thumbnail = event
        .thumbnail
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());
    event
}

impl RegistrationService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        events: Arc<dyn EventRepository>,
        reservations: Arc<dyn ReservationRepository>,
    ) -> Self {
        Self { users, events, reservations }
    }

    // ========================================================================
    // Accounts
    // ========================================================================

    /// Create a regular (non-admin) account.
    pub async fn sign_up(&self, email: &str, password: &str) -> CoreResult<User> {
        self.create_account(email, password, false).await
    }

    /// Check credentials. Unknown email and wrong password are indistinguishable.
    pub async fn authenticate(&self, email: &str, password: &str) -> CoreResult<User> {
        let email = normalize_email(email);
        let user = self.users.find_by_email(&email).await?;

        // Unknown emails still pay for one verification
        let stored = user.as_ref().map(|u| u.password_hash.expose().as_str());
        let verified = verify_password_blocking(password, stored).await?;

        match user {
            Some(user) if verified => Ok(user),
            _ => {
                info!("Rejected login for {}", mask_email(&email));
                Err(CoreError::InvalidCredentials)
            }
        }
    }

    /// Create the configured admin account unless a user with that email exists.
    pub async fn ensure_admin(&self, email: &str, password: &str) -> CoreResult<AdminBootstrap> {
        let normalized = normalize_email(email);
        if self.users.find_by_email(&normalized).await?.is_some() {
            info!("Admin account {} already exists", mask_email(&normalized));
            return Ok(AdminBootstrap::AlreadyExists);
        }

        match self.create_account(email, password, true).await {
            Ok(_) => {
                info!("Created admin account {}", mask_email(&normalized));
                Ok(AdminBootstrap::Created)
            }
            // Lost a race with another bootstrap.
            Err(CoreError::EmailTaken(_)) => Ok(AdminBootstrap::AlreadyExists),
            Err(e) => Err(e),
        }
    }

    async fn create_account(&self, email: &str, password: &str, is_admin: bool) -> CoreResult<User> {
        let email = checked_email(email)?;
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(CoreError::validation(format!(
                "Password must be at least {} characters.",
                MIN_PASSWORD_LENGTH
            )));
        }

        let password_hash = hash_password_blocking(password).await?;
        self.users
            .create_user(NewUser {
                email,
                password_hash: Masked(password_hash),
                is_admin,
            })
            .await
    }

    // ========================================================================
    // Reservations
    // ========================================================================

    async fn find_target(&self, target: &ReservationRef) -> CoreResult<Option<ReservationSummary>> {
        match target {
            ReservationRef::Id(id) => self.reservations.find_by_id(*id).await,
            ReservationRef::Code(code) => self.reservations.find_by_code(code.trim()).await,
        }
    }
}

#[async_trait]
impl ReservationsApi for RegistrationService {
    async fn list_events(&self) -> CoreResult<Vec<Event>> {
        self.events.list_events().await
    }

    async fn get_event(&self, id: i64) -> CoreResult<Event> {
        self.events
            .get_event(id)
            .await?
            .ok_or_else(|| CoreError::event_not_found(id))
    }

    async fn list_reservations(&self, email: &str) -> CoreResult<Vec<ReservationSummary>> {
        self.reservations.list_by_email(&normalize_email(email)).await
    }

    async fn find_reservation(&self, code: &str) -> CoreResult<ReservationSummary> {
        let code = code.trim();
        self.reservations
            .find_by_code(code)
            .await?
            .ok_or_else(|| CoreError::reservation_not_found(code))
    }

    async fn register(&self, event_id: i64, email: &str) -> CoreResult<Reservation> {
        // 1. Event must exist
        let event = self.get_event(event_id).await?;
        let email = checked_email(email)?;

        // 2. Insert; the store rejects a duplicate (event, email) pair atomically
        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let reservation_code = generate_reservation_code(&mut rand::thread_rng());
            let result = self
                .reservations
                .insert_reservation(NewReservation {
                    event_id: event.id,
                    email: email.clone(),
                    reservation_code,
                })
                .await;

            match result {
                Ok(reservation) => {
                    info!(
                        "Reservation {} created for event {} by {}",
                        reservation.id,
                        event.id,
                        mask_email(&email)
                    );
                    return Ok(reservation);
                }
                Err(CoreError::DuplicateCode) => {
                    warn!("Reservation code collision (attempt {}), retrying", attempt);
                }
                Err(e) => return Err(e),
            }
        }

        Err(CoreError::Storage("could not allocate a unique reservation code".to_string()))
    }

    async fn cancel(&self, target: ReservationRef, email: &str) -> CoreResult<()> {
        let email = normalize_email(email);

        // 1. Locate
        let reservation = self
            .find_target(&target)
            .await?
            .ok_or_else(|| CoreError::reservation_not_found(&target))?;

        // 2. Only the holder may cancel
        if reservation.email != email {
            warn!(
                "Cancellation of reservation {} refused for {}",
                reservation.id,
                mask_email(&email)
            );
            return Err(CoreError::Forbidden("You cannot cancel this reservation.".to_string()));
        }

        // 3. Delete; a concurrent cancel may have won
        if !self.reservations.delete_reservation(reservation.id).await? {
            return Err(CoreError::reservation_not_found(&target));
        }

        info!("Reservation {} canceled", reservation.id);
        Ok(())
    }

    async fn create_event(&self, event: NewEvent) -> CoreResult<Event> {
        let event = tidy_event(event);
        validate_new_event(&event)?;

        let created = self.events.create_event(&event).await?;
        info!("Event {} created: {}", created.id, created.title);
        Ok(created)
    }

    async fn update_event(&self, id: i64, event: NewEvent) -> CoreResult<Event> {
        let event = tidy_event(event);
        validate_new_event(&event)?;

        let updated = self
            .events
            .update_event(id, &event)
            .await?
            .ok_or_else(|| CoreError::event_not_found(id))?;
        info!("Event {} updated", id);
        Ok(updated)
    }

    async fn delete_event(&self, id: i64) -> CoreResult<()> {
        let removed = self
            .events
            .delete_event_cascade(id)
            .await?
            .ok_or_else(|| CoreError::event_not_found(id))?;
        info!("Event {} deleted along with {} reservation(s)", id, removed);
        Ok(())
    }
}
