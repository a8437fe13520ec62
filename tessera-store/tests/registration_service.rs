use chrono::{Duration, TimeZone, Utc};
use std::sync::Arc;
use tessera_core::{
    code::is_reservation_code, AdminBootstrap, CoreError, RegistrationService, ReservationsApi,
};
use tessera_shared::models::{NewEvent, ReservationRef};
use tessera_store::InMemoryStore;

fn service() -> (Arc<InMemoryStore>, Arc<RegistrationService>) {
    let store = Arc::new(InMemoryStore::new());
    let service = Arc::new(RegistrationService::new(store.clone(), store.clone(), store.clone()));
    (store, service)
}

fn conference(title: &str) -> NewEvent {
    let start = Utc.with_ymd_and_hms(2025, 9, 12, 9, 0, 0).unwrap();
    NewEvent {
        title: title.to_string(),
        start_date: start,
        end_date: start + Duration::hours(8),
        thumbnail: Some("https://example.com/banner.png".to_string()),
    }
}

#[tokio::test]
async fn test_register_for_event_five() {
    let (store, service) = service();
    store.insert_event_with_id(5, conference("RustConf")).await;

    let reservation = service.register(5, "a@b.com").await.unwrap();
    assert_eq!(reservation.event_id, 5);
    assert_eq!(reservation.reservation_code.len(), 10);
    assert!(is_reservation_code(&reservation.reservation_code));

    let again = service.register(5, "a@b.com").await;
    assert_eq!(
        again.unwrap_err().to_string(),
        "You have already registered for this event."
    );
}

#[tokio::test]
async fn test_duplicate_detection_ignores_case_and_whitespace() {
    let (_, service) = service();
    let event = service.create_event(conference("Meetup")).await.unwrap();

    service.register(event.id, "Alice@Example.com").await.unwrap();
    let again = service.register(event.id, "  alice@example.com ").await;
    assert!(matches!(again, Err(CoreError::AlreadyRegistered { .. })));
}

#[tokio::test]
async fn test_concurrent_registrations_yield_exactly_one_reservation() {
    let (store, service) = service();
    let event = service.create_event(conference("Launch party")).await.unwrap();

    let attempts: Vec<_> = (0..16)
        .map(|_| {
            let service = service.clone();
            tokio::spawn(async move { service.register(event.id, "race@example.com").await })
        })
        .collect();

    let mut created = 0;
    let mut rejected = 0;
    for attempt in attempts {
        match attempt.await.unwrap() {
            Ok(_) => created += 1,
            Err(CoreError::AlreadyRegistered { .. }) => rejected += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(created, 1);
    assert_eq!(rejected, 15);
    assert_eq!(store.reservation_count().await, 1);
}

#[tokio::test]
async fn test_register_validates_event_and_email() {
    let (_, service) = service();
    assert!(matches!(service.register(42, "a@b.com").await, Err(CoreError::NotFound(_))));

    let event = service.create_event(conference("Meetup")).await.unwrap();
    assert!(matches!(service.register(event.id, "not-an-email").await, Err(CoreError::Validation(_))));
}

#[tokio::test]
async fn test_overlong_email_is_rejected_before_the_store() {
    let (store, service) = service();
    let event = service.create_event(conference("Meetup")).await.unwrap();
    let email = format!("{}@{}.example.com", "a".repeat(64), "b".repeat(60));

    assert!(matches!(service.register(event.id, &email).await, Err(CoreError::Validation(_))));
    assert!(matches!(service.sign_up(&email, "secret1").await, Err(CoreError::Validation(_))));
    assert_eq!(store.reservation_count().await, 0);
}

#[tokio::test]
async fn test_delete_event_cascades_to_reservations() {
    let (_, service) = service();
    let event = service.create_event(conference("Workshop")).await.unwrap();
    let first = service.register(event.id, "one@example.com").await.unwrap();
    let second = service.register(event.id, "two@example.com").await.unwrap();

    service.delete_event(event.id).await.unwrap();

    for reservation in [first, second] {
        let lookup = service.find_reservation(&reservation.reservation_code).await;
        assert!(matches!(lookup, Err(CoreError::NotFound(_))));
        let cancel = service.cancel(ReservationRef::Id(reservation.id), &reservation.email).await;
        assert!(matches!(cancel, Err(CoreError::NotFound(_))));
    }
    assert!(matches!(service.get_event(event.id).await, Err(CoreError::NotFound(_))));
    assert!(matches!(service.delete_event(event.id).await, Err(CoreError::NotFound(_))));
}

#[tokio::test]
async fn test_cancel_requires_matching_email() {
    let (_, service) = service();
    let event = service.create_event(conference("Meetup")).await.unwrap();
    let reservation = service.register(event.id, "holder@example.com").await.unwrap();

    let stranger = service.cancel(ReservationRef::Id(reservation.id), "other@example.com").await;
    assert_eq!(
        stranger,
        Err(CoreError::Forbidden("You cannot cancel this reservation.".to_string()))
    );

    service
        .cancel(ReservationRef::Code(reservation.reservation_code.clone()), "HOLDER@example.com")
        .await
        .unwrap();
    assert!(service.list_reservations("holder@example.com").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_re_registration_after_cancellation_succeeds() {
    let (_, service) = service();
    let event = service.create_event(conference("Meetup")).await.unwrap();
    let first = service.register(event.id, "back@example.com").await.unwrap();

    service.cancel(ReservationRef::Id(first.id), "back@example.com").await.unwrap();
    let second = service.register(event.id, "back@example.com").await.unwrap();

    assert_ne!(first.id, second.id);
}

#[tokio::test]
async fn test_list_reservations_includes_event_titles() {
    let (_, service) = service();
    let a = service.create_event(conference("Alpha")).await.unwrap();
    let b = service.create_event(conference("Beta")).await.unwrap();
    service.register(a.id, "fan@example.com").await.unwrap();
    service.register(b.id, "fan@example.com").await.unwrap();
    service.register(b.id, "someone@example.com").await.unwrap();

    let titles: Vec<String> = service
        .list_reservations("fan@example.com")
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.event_title)
        .collect();
    assert_eq!(titles, vec!["Alpha".to_string(), "Beta".to_string()]);
}

#[tokio::test]
async fn test_update_event_validates_and_reports_missing() {
    let (_, service) = service();
    let event = service.create_event(conference("Old title")).await.unwrap();

    let mut changes = conference("New title");
    changes.thumbnail = None;
    let updated = service.update_event(event.id, changes.clone()).await.unwrap();
    assert_eq!(updated.title, "New title");
    assert_eq!(updated.thumbnail, None);

    assert!(matches!(service.update_event(999, changes.clone()).await, Err(CoreError::NotFound(_))));

    changes.end_date = changes.start_date - Duration::hours(1);
    assert!(matches!(service.update_event(event.id, changes).await, Err(CoreError::Validation(_))));
}

#[tokio::test]
async fn test_sign_up_and_authenticate() {
    let (_, service) = service();
    let user = service.sign_up("New@Example.com", "secret1").await.unwrap();
    assert_eq!(user.email, "new@example.com");
    assert!(!user.is_admin);
    assert_ne!(user.password_hash.expose(), "secret1");

    assert!(matches!(service.sign_up("new@example.com", "secret1").await, Err(CoreError::EmailTaken(_))));
    assert!(matches!(service.sign_up("short@example.com", "12345").await, Err(CoreError::Validation(_))));

    assert_eq!(service.authenticate("new@example.com", "secret1").await.unwrap().id, user.id);
    assert_eq!(
        service.authenticate("new@example.com", "wrong-password").await.unwrap_err(),
        CoreError::InvalidCredentials
    );
    assert_eq!(
        service.authenticate("ghost@example.com", "secret1").await.unwrap_err(),
        CoreError::InvalidCredentials
    );
}

#[tokio::test]
async fn test_admin_bootstrap_is_idempotent() {
    let (_, service) = service();
    assert_eq!(service.ensure_admin("root@example.com", "rootpass").await.unwrap(), AdminBootstrap::Created);
    assert_eq!(
        service.ensure_admin("root@example.com", "other-pass").await.unwrap(),
        AdminBootstrap::AlreadyExists
    );

    let admin = service.authenticate("root@example.com", "rootpass").await.unwrap();
    assert!(admin.is_admin);
}
