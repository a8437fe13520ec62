use axum::{
    http::Method,
    middleware::{from_fn, from_fn_with_state},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod admin;
pub mod auth;
pub mod error;
pub mod flash;
pub mod forms;
pub mod gateway;
pub mod middleware;
pub mod state;
pub mod v1;
pub mod views;
pub mod web;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    // CORS Middleware
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::USER_AGENT,
        ]);

    let members = web::member_routes().route_layer(from_fn(middleware::require_login));
    let admins = admin::routes().route_layer(from_fn(middleware::require_admin));

    Router::new()
        .merge(web::public_routes())
        .merge(auth::routes())
        .merge(members)
        .merge(admins)
        .nest("/api", v1::routes(state.clone()).layer(cors))
        .fallback(web::not_found)
        .layer(from_fn_with_state(state.clone(), middleware::session_context))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
