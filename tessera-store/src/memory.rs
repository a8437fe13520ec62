//! In-memory implementation of all three repositories.
//!
//! One lock guards every table, so the uniqueness checks and the cascade
//! delete are as atomic here as they are in Postgres. Used by the test
//! suites and when no database URL is configured.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tessera_core::{
    repository::{EventRepository, ReservationRepository, UserRepository},
    CoreError, CoreResult,
};
use tessera_shared::models::{
    Event, NewEvent, NewReservation, NewUser, Reservation, ReservationSummary, User,
};
use tokio::sync::RwLock;

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    events: BTreeMap<i64, Event>,
    reservations: BTreeMap<i64, Reservation>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn summarize(&self, reservation: &Reservation) -> Option<ReservationSummary> {
        let event = self.events.get(&reservation.event_id)?;
        Some(ReservationSummary {
            id: reservation.id,
            event_id: reservation.event_id,
            email: reservation.email.clone(),
            reservation_code: reservation.reservation_code.clone(),
            event_title: event.title.clone(),
            created_at: reservation.created_at,
        })
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an event with a fixed id. Later generated ids stay above it.
    pub async fn insert_event_with_id(&self, id: i64, event: NewEvent) -> Event {
        let mut tables = self.tables.write().await;
        tables.next_id = tables.next_id.max(id);
        let event = Event::from_new(id, event);
        tables.events.insert(id, event.clone());
        event
    }

    pub async fn reservation_count(&self) -> usize {
        self.tables.read().await.reservations.len()
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_email(&self, email: &str) -> CoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn create_user(&self, user: NewUser) -> CoreResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(CoreError::EmailTaken(user.email));
        }

        let id = tables.next_id();
        let created = User {
            id,
            email: user.email,
            password_hash: user.password_hash,
            is_admin: user.is_admin,
        };
        tables.users.insert(id, created.clone());
        Ok(created)
    }
}

#[async_trait]
impl EventRepository for InMemoryStore {
    async fn list_events(&self) -> CoreResult<Vec<Event>> {
        let tables = self.tables.read().await;
        let mut events: Vec<Event> = tables.events.values().cloned().collect();
        events.sort_by(|a, b| a.start_date.cmp(&b.start_date).then(a.id.cmp(&b.id)));
        Ok(events)
    }

    async fn get_event(&self, id: i64) -> CoreResult<Option<Event>> {
        Ok(self.tables.read().await.events.get(&id).cloned())
    }

    async fn create_event(&self, event: &NewEvent) -> CoreResult<Event> {
        let mut tables = self.tables.write().await;
        let id = tables.next_id();
        let created = Event::from_new(id, event.clone());
        tables.events.insert(id, created.clone());
        Ok(created)
    }

    async fn update_event(&self, id: i64, event: &NewEvent) -> CoreResult<Option<Event>> {
        let mut tables = self.tables.write().await;
        match tables.events.get_mut(&id) {
            Some(existing) => {
                *existing = Event::from_new(id, event.clone());
                Ok(Some(existing.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_event_cascade(&self, id: i64) -> CoreResult<Option<u64>> {
        let mut tables = self.tables.write().await;
        if tables.events.remove(&id).is_none() {
            return Ok(None);
        }

        let before = tables.reservations.len();
        tables.reservations.retain(|_, r| r.event_id != id);
        Ok(Some((before - tables.reservations.len()) as u64))
    }
}

#[async_trait]
impl ReservationRepository for InMemoryStore {
    async fn insert_reservation(&self, reservation: NewReservation) -> CoreResult<Reservation> {
        let mut tables = self.tables.write().await;

        if !tables.events.contains_key(&reservation.event_id) {
            return Err(CoreError::event_not_found(reservation.event_id));
        }
        if tables
            .reservations
            .values()
            .any(|r| r.event_id == reservation.event_id && r.email == reservation.email)
        {
            return Err(CoreError::AlreadyRegistered {
                event_id: reservation.event_id,
                email: reservation.email,
            });
        }
        if tables
            .reservations
            .values()
            .any(|r| r.reservation_code == reservation.reservation_code)
        {
            return Err(CoreError::DuplicateCode);
        }

        let id = tables.next_id();
        let created = Reservation {
            id,
            event_id: reservation.event_id,
            email: reservation.email,
            reservation_code: reservation.reservation_code,
            created_at: Utc::now(),
        };
        tables.reservations.insert(id, created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> CoreResult<Option<ReservationSummary>> {
        let tables = self.tables.read().await;
        Ok(tables.reservations.get(&id).and_then(|r| tables.summarize(r)))
    }

    async fn find_by_code(&self, code: &str) -> CoreResult<Option<ReservationSummary>> {
        let tables = self.tables.read().await;
        Ok(tables
            .reservations
            .values()
            .find(|r| r.reservation_code == code)
            .and_then(|r| tables.summarize(r)))
    }

    async fn list_by_email(&self, email: &str) -> CoreResult<Vec<ReservationSummary>> {
        let tables = self.tables.read().await;
        Ok(tables
            .reservations
            .values()
            .filter(|r| r.email == email)
            .filter_map(|r| tables.summarize(r))
            .collect())
    }

    async fn delete_reservation(&self, id: i64) -> CoreResult<bool> {
        Ok(self.tables.write().await.reservations.remove(&id).is_some())
    }
}
