mod common;

use axum::http::StatusCode;
use common::*;
use tessera_core::ReservationsApi;

#[tokio::test]
async fn test_wrong_password_sets_no_session_cookie() {
    let app = test_app().await;
    app.service.sign_up("user@example.com", "secret1").await.unwrap();

    let response = send(
        &app.router,
        form_post("/login", "email=user@example.com&password=wrong-one", None),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(set_cookie(&response, "tessera_session").is_none());
    assert!(body_string(response).await.contains("Invalid email or password."));
}

#[tokio::test]
async fn test_remember_me_makes_session_cookie_persistent() {
    let app = test_app().await;
    app.service.sign_up("user@example.com", "secret1").await.unwrap();

    let plain = send(&app.router, form_post("/login", "email=user@example.com&password=secret1", None)).await;
    assert_eq!(plain.status(), StatusCode::SEE_OTHER);
    assert!(!set_cookie(&plain, "tessera_session").unwrap().contains("Max-Age"));

    let remembered = send(
        &app.router,
        form_post("/login", "email=user@example.com&password=secret1&remember=on", None),
    )
    .await;
    assert!(set_cookie(&remembered, "tessera_session").unwrap().contains("Max-Age=86400"));
}

#[tokio::test]
async fn test_login_form_validation_rerenders_with_field_errors() {
    let app = test_app().await;

    let response = send(&app.router, form_post("/login", "email=&password=", None)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains("Email is required."));
    assert!(html.contains("Password is required."));
}

#[tokio::test]
async fn test_signup_then_login() {
    let app = test_app().await;

    let response = send(
        &app.router,
        form_post(
            "/register",
            "email=New@Example.com&password=secret1&confirm_password=secret1",
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");

    login(&app.router, "new@example.com", "secret1").await;
}

#[tokio::test]
async fn test_signup_with_taken_email_is_a_field_error() {
    let app = test_app().await;
    app.service.sign_up("taken@example.com", "secret1").await.unwrap();

    let response = send(
        &app.router,
        form_post(
            "/register",
            "email=taken@example.com&password=secret1&confirm_password=secret1",
            None,
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("An account with this email already exists."));
}

#[tokio::test]
async fn test_guarded_pages_redirect_anonymous_visitors_to_login() {
    let app = test_app().await;

    for uri in ["/manage-events", "/register/1", "/admin"] {
        let response = send(&app.router, get(uri, None)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{}", uri);
        assert_eq!(location(&response), "/login", "{}", uri);
        assert_eq!(flashes(&response), vec!["Please log in to access this page.".to_string()]);
    }
}

#[tokio::test]
async fn test_non_admin_cannot_create_events() {
    let app = test_app().await;
    app.service.sign_up("user@example.com", "secret1").await.unwrap();
    let cookie = login(&app.router, "user@example.com", "secret1").await;

    let response = send(
        &app.router,
        form_post(
            "/admin",
            "title=Sneaky&start_date=2025-09-12T09:00&end_date=2025-09-12T17:00&thumbnail=",
            Some(&cookie),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    assert_eq!(flashes(&response), vec!["Access denied: administrators only.".to_string()]);
    assert!(app.service.list_events().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_admin_creates_event_and_invalid_form_rerenders() {
    let app = test_app().await;
    let cookie = login(&app.router, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let invalid = send(
        &app.router,
        form_post(
            "/admin",
            "title=&start_date=2025-09-12T17:00&end_date=2025-09-12T09:00&thumbnail=",
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(invalid.status(), StatusCode::OK);
    assert!(body_string(invalid).await.contains("Title is required."));
    assert!(app.service.list_events().await.unwrap().is_empty());

    let created = send(
        &app.router,
        form_post(
            "/admin",
            "title=RustConf&start_date=2025-09-12T09:00&end_date=2025-09-12T17:00&thumbnail=",
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(created.status(), StatusCode::SEE_OTHER);
    assert_eq!(flashes(&created), vec!["Event created successfully.".to_string()]);

    let events = app.service.list_events().await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].title, "RustConf");
    assert_eq!(events[0].thumbnail, None);

    let index = send(&app.router, get("/", Some(&cookie))).await;
    let html = body_string(index).await;
    assert!(html.contains("RustConf"));
    assert!(html.contains(&format!("/edit-event/{}", events[0].id)));
}

#[tokio::test]
async fn test_admin_edits_event() {
    let app = test_app().await;
    let event = app.service.create_event(conference("Old title")).await.unwrap();
    let cookie = login(&app.router, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let page = send(&app.router, get(&format!("/edit-event/{}", event.id), Some(&cookie))).await;
    assert_eq!(page.status(), StatusCode::OK);
    assert!(body_string(page).await.contains("2025-09-12T09:00"));

    let response = send(
        &app.router,
        form_post(
            &format!("/edit-event/{}", event.id),
            "title=New+title&start_date=2025-09-13&end_date=2025-09-14&thumbnail=",
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(app.service.get_event(event.id).await.unwrap().title, "New title");

    let missing = send(&app.router, get("/edit-event/999", Some(&cookie))).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_register_then_duplicate_is_rejected() {
    let app = test_app().await;
    let event = app.service.create_event(conference("RustConf")).await.unwrap();
    app.service.sign_up("fan@example.com", "secret1").await.unwrap();
    let cookie = login(&app.router, "fan@example.com", "secret1").await;

    let confirm = send(&app.router, get(&format!("/register/{}", event.id), Some(&cookie))).await;
    assert_eq!(confirm.status(), StatusCode::OK);
    assert!(body_string(confirm).await.contains("fan@example.com"));

    let first = send(&app.router, form_post(&format!("/register/{}", event.id), "", Some(&cookie))).await;
    assert_eq!(first.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&first), "/manage-events");
    let message = flashes(&first).pop().unwrap();
    let code = message
        .strip_prefix("Registration successful! Your reservation code: ")
        .unwrap();
    assert_eq!(code.len(), 10);

    let second = send(&app.router, form_post(&format!("/register/{}", event.id), "", Some(&cookie))).await;
    assert_eq!(second.status(), StatusCode::SEE_OTHER);
    assert_eq!(flashes(&second), vec!["You have already registered for this event.".to_string()]);
    assert_eq!(app.store.reservation_count().await, 1);

    let listing = send(&app.router, get("/manage-events", Some(&cookie))).await;
    let html = body_string(listing).await;
    assert!(html.contains("RustConf"));
    assert!(html.contains(code));
}

#[tokio::test]
async fn test_register_for_missing_event_renders_404() {
    let app = test_app().await;
    app.service.sign_up("fan@example.com", "secret1").await.unwrap();
    let cookie = login(&app.router, "fan@example.com", "secret1").await;

    let response = send(&app.router, form_post("/register/77", "", Some(&cookie))).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_string(response).await.contains("Event 77 not found."));
}

#[tokio::test]
async fn test_cancel_own_reservation_only() {
    let app = test_app().await;
    let event = app.service.create_event(conference("RustConf")).await.unwrap();
    let theirs = app.service.register(event.id, "other@example.com").await.unwrap();
    let mine = app.service.register(event.id, "fan@example.com").await.unwrap();
    app.service.sign_up("fan@example.com", "secret1").await.unwrap();
    let cookie = login(&app.router, "fan@example.com", "secret1").await;

    let refused = send(
        &app.router,
        form_post(&format!("/cancel-reservation/{}", theirs.id), "", Some(&cookie)),
    )
    .await;
    assert_eq!(refused.status(), StatusCode::SEE_OTHER);
    assert_eq!(flashes(&refused), vec!["You cannot cancel this reservation.".to_string()]);

    let done = send(
        &app.router,
        form_post(&format!("/cancel-reservation/{}", mine.id), "", Some(&cookie)),
    )
    .await;
    assert_eq!(done.status(), StatusCode::SEE_OTHER);
    assert_eq!(flashes(&done), vec!["Reservation canceled.".to_string()]);
    assert_eq!(app.store.reservation_count().await, 1);
}

#[tokio::test]
async fn test_manage_by_code_requires_matching_email() {
    let app = test_app().await;
    let event = app.service.create_event(conference("RustConf")).await.unwrap();
    let reservation = app.service.register(event.id, "holder@example.com").await.unwrap();
    let uri = format!("/manage/{}", reservation.reservation_code);

    let page = send(&app.router, get(&uri, None)).await;
    assert_eq!(page.status(), StatusCode::OK);
    assert!(body_string(page).await.contains("RustConf"));

    let invalid = send(&app.router, form_post(&uri, "email=not-an-email", None)).await;
    assert_eq!(invalid.status(), StatusCode::OK);
    assert!(body_string(invalid).await.contains("Invalid email address."));

    let refused = send(&app.router, form_post(&uri, "email=other@example.com", None)).await;
    assert_eq!(refused.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&refused), uri);
    assert_eq!(flashes(&refused), vec!["You cannot cancel this reservation.".to_string()]);

    let done = send(&app.router, form_post(&uri, "email=Holder@Example.com", None)).await;
    assert_eq!(done.status(), StatusCode::SEE_OTHER);
    assert_eq!(app.store.reservation_count().await, 0);

    let gone = send(&app.router, get(&uri, None)).await;
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_delete_removes_event_and_reservations() {
    let app = test_app().await;
    let event = app.service.create_event(conference("Doomed")).await.unwrap();
    let first = app.service.register(event.id, "one@example.com").await.unwrap();
    app.service.register(event.id, "two@example.com").await.unwrap();
    let cookie = login(&app.router, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let confirm = send(&app.router, get(&format!("/delete-event/{}", event.id), Some(&cookie))).await;
    assert_eq!(confirm.status(), StatusCode::OK);

    let response = send(&app.router, form_post(&format!("/delete-event/{}", event.id), "", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(app.store.reservation_count().await, 0);

    let lookup = send(&app.router, get(&format!("/manage/{}", first.reservation_code), None)).await;
    assert_eq!(lookup.status(), StatusCode::NOT_FOUND);

    let again = send(&app.router, form_post(&format!("/delete-event/{}", event.id), "", Some(&cookie))).await;
    assert_eq!(again.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_logout_clears_session() {
    let app = test_app().await;
    let cookie = login(&app.router, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let response = send(&app.router, get("/logout", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let cleared = set_cookie(&response, "tessera_session").unwrap();
    assert!(cleared.starts_with("tessera_session=;"));
}

#[tokio::test]
async fn test_tampered_session_is_anonymous() {
    let app = test_app().await;

    let response = send(&app.router, get("/manage-events", Some("tessera_session=forged.token.value"))).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_unknown_page_is_404() {
    let app = test_app().await;
    let response = send(&app.router, get("/no-such-page", None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
