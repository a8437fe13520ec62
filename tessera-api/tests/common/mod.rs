#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, Response},
    Router,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{Duration, TimeZone, Utc};
use serde_json::Value;
use tessera_api::{
    app,
    flash::Flash,
    state::{AppState, AuthConfig},
};
use tessera_core::RegistrationService;
use tessera_shared::models::NewEvent;
use tessera_store::InMemoryStore;
use tower::ServiceExt;

pub const API_TOKEN: &str = "test-api-token";
pub const ADMIN_EMAIL: &str = "root@example.com";
pub const ADMIN_PASSWORD: &str = "rootpass";

pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryStore>,
    pub service: Arc<RegistrationService>,
    pub state: AppState,
}

pub fn auth_config() -> AuthConfig {
    AuthConfig {
        secret: "integration-secret".to_string(),
        session_seconds: 3600,
        remember_seconds: 86400,
        secure_cookies: false,
    }
}

pub async fn test_app() -> TestApp {
    let store = Arc::new(InMemoryStore::new());
    let service = Arc::new(RegistrationService::new(store.clone(), store.clone(), store.clone()));
    service.ensure_admin(ADMIN_EMAIL, ADMIN_PASSWORD).await.unwrap();

    let state = AppState::local(service.clone(), auth_config(), API_TOKEN.to_string());
    TestApp {
        router: app(state.clone()),
        store,
        service,
        state,
    }
}

pub fn conference(title: &str) -> NewEvent {
    let start = Utc.with_ymd_and_hms(2025, 9, 12, 9, 0, 0).unwrap();
    NewEvent {
        title: title.to_string(),
        start_date: start,
        end_date: start + Duration::hours(8),
        thumbnail: None,
    }
}

// ============================================================================
// Requests
// ============================================================================

pub async fn send(router: &Router, request: Request<Body>) -> Response<Body> {
    router.clone().oneshot(request).await.unwrap()
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn form_post(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn api(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", API_TOKEN));
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

// ============================================================================
// Responses
// ============================================================================

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn location(response: &Response<Body>) -> &str {
    response.headers()[header::LOCATION].to_str().unwrap()
}

/// Full `Set-Cookie` header of the named cookie, if the response sets it.
pub fn set_cookie(response: &Response<Body>, name: &str) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(&format!("{}=", name)))
        .map(str::to_string)
}

/// `name=value` pair to send back in a `Cookie` header.
pub fn cookie_pair(response: &Response<Body>, name: &str) -> Option<String> {
    set_cookie(response, name).and_then(|v| v.split(';').next().map(str::to_string))
}

/// Flash messages queued by a redirect.
pub fn flashes(response: &Response<Body>) -> Vec<String> {
    cookie_pair(response, "tessera_flash")
        .and_then(|pair| pair.split_once('=').map(|(_, v)| v.to_string()))
        .and_then(|value| URL_SAFE_NO_PAD.decode(value).ok())
        .and_then(|bytes| serde_json::from_slice::<Vec<Flash>>(&bytes).ok())
        .map(|list| list.into_iter().map(|f| f.message).collect())
        .unwrap_or_default()
}

/// Logs in through the form and returns the session cookie pair.
pub async fn login(router: &Router, email: &str, password: &str) -> String {
    let body = format!("email={}&password={}", email, password);
    let response = send(router, form_post("/login", &body, None)).await;
    assert_eq!(response.status(), 303, "login failed for {}", email);
    cookie_pair(&response, "tessera_session").expect("session cookie")
}
