//! JSON mirror of the web operations, mounted under `/api`.

use axum::{
    extract::{FromRequest, FromRequestParts},
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
    Router,
};

use crate::{error::AppError, middleware::api_token_middleware, state::AppState};

pub mod events;
pub mod reservations;

/// `Json` whose rejections use the API error body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// `Path` whose rejections use the API error body.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

/// `Query` whose rejections use the API error body.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/events", get(events::list_events))
        .route("/events/{id}", get(events::get_event))
        .route("/create-event", post(events::create_event))
        .route("/edit-event", put(events::edit_event))
        .route("/delete-event", delete(events::delete_event))
        .route("/reservations", get(reservations::list_reservations))
        .route("/reservations/{code}", get(reservations::get_reservation))
        .route("/register", post(reservations::register))
        .route("/cancel-reservation", post(reservations::cancel_reservation))
        .route_layer(from_fn_with_state(state, api_token_middleware))
}
