use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Extension, Form, Router,
};
use axum_extra::extract::cookie::CookieJar;
use tessera_core::{code::is_reservation_code, CoreError};
use tessera_shared::models::ReservationRef;

use crate::{
    flash::{self, Flash},
    forms::{check, CancelForm, FormErrors},
    middleware::{Principal, RequestContext},
    state::AppState,
    views,
};

/// Pages anyone may open.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/manage/{code}", get(manage_by_code).post(cancel_by_code))
}

/// Pages behind `require_login`.
pub fn member_routes() -> Router<AppState> {
    Router::new()
        .route("/register/{event_id}", get(register_page).post(register))
        .route("/manage-events", get(manage_events))
        .route("/cancel-reservation/{id}", post(cancel_reservation))
}

/// Turns a failed operation into a page: not-found renders the 404 page,
/// everything else goes back to `back` with an error flash.
pub(crate) fn failure(jar: CookieJar, ctx: &RequestContext, err: CoreError, back: &str) -> Response {
    match err {
        CoreError::NotFound(msg) => {
            views::render_with_status(StatusCode::NOT_FOUND, jar, ctx, "Not found", views::not_found(&msg))
        }
        e @ (CoreError::Storage(_) | CoreError::DuplicateCode) => {
            tracing::error!("Request failed: {}", e);
            let jar = flash::push(jar, Flash::error("Something went wrong. Please try again."));
            (jar, Redirect::to(back)).into_response()
        }
        e => {
            tracing::debug!("Request rejected: {}", e);
            let jar = flash::push(jar, Flash::error(e.to_string()));
            (jar, Redirect::to(back)).into_response()
        }
    }
}

pub async fn not_found(Extension(ctx): Extension<RequestContext>, jar: CookieJar) -> Response {
    views::render_with_status(
        StatusCode::NOT_FOUND,
        jar,
        &ctx,
        "Not found",
        views::not_found("The page you requested does not exist."),
    )
}

// ============================================================================
// Events
// ============================================================================

async fn index(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    jar: CookieJar,
) -> Response {
    match state.gateway.list_events().await {
        Ok(events) => views::render(jar, &ctx, "Upcoming events", views::index(&events, &ctx)),
        Err(e) => {
            // The list is the landing page, so there is nothing to go back to.
            tracing::warn!("Could not list events: {}", e);
            let jar = flash::push(jar, Flash::error(e.to_string()));
            views::render(jar, &ctx, "Upcoming events", views::index(&[], &ctx))
        }
    }
}

// ============================================================================
// Reservations of the logged-in user
// ============================================================================

async fn register_page(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Extension(principal): Extension<Principal>,
    jar: CookieJar,
    Path(event_id): Path<i64>,
) -> Response {
    match state.gateway.get_event(event_id).await {
        Ok(event) => views::render(
            jar,
            &ctx,
            "Register",
            views::register_confirm(&event, &principal.email),
        ),
        Err(e) => failure(jar, &ctx, e, "/"),
    }
}

async fn register(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Extension(principal): Extension<Principal>,
    jar: CookieJar,
    Path(event_id): Path<i64>,
) -> Response {
    match state.gateway.register(event_id, &principal.email).await {
        Ok(reservation) => {
            let jar = flash::push(
                jar,
                Flash::info(format!(
                    "Registration successful! Your reservation code: {}",
                    reservation.reservation_code
                )),
            );
            (jar, Redirect::to("/manage-events")).into_response()
        }
        Err(e) => failure(jar, &ctx, e, "/"),
    }
}

async fn manage_events(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Extension(principal): Extension<Principal>,
    jar: CookieJar,
) -> Response {
    let reservations = match state.gateway.list_reservations(&principal.email).await {
        Ok(reservations) => reservations,
        Err(e) => return failure(jar, &ctx, e, "/"),
    };

    let events = if principal.is_admin {
        match state.gateway.list_events().await {
            Ok(events) => Some(events),
            Err(e) => return failure(jar, &ctx, e, "/"),
        }
    } else {
        None
    };

    views::render(
        jar,
        &ctx,
        "My reservations",
        views::manage_events(&reservations, events.as_deref()),
    )
}

async fn cancel_reservation(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Extension(principal): Extension<Principal>,
    jar: CookieJar,
    Path(id): Path<i64>,
) -> Response {
    match state.gateway.cancel(ReservationRef::Id(id), &principal.email).await {
        Ok(()) => {
            let jar = flash::push(jar, Flash::info("Reservation canceled."));
            (jar, Redirect::to("/manage-events")).into_response()
        }
        Err(e) => failure(jar, &ctx, e, "/manage-events"),
    }
}

// ============================================================================
// Manage by code (no login)
// ============================================================================

async fn manage_by_code(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    jar: CookieJar,
    Path(code): Path<String>,
) -> Response {
    match state.gateway.find_reservation(&code).await {
        Ok(reservation) => views::render(
            jar,
            &ctx,
            "Manage reservation",
            views::manage_by_code(&reservation, "", &FormErrors::default()),
        ),
        Err(e) => failure(jar, &ctx, e, "/"),
    }
}

async fn cancel_by_code(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    jar: CookieJar,
    Path(code): Path<String>,
    Form(form): Form<CancelForm>,
) -> Response {
    let back = if is_reservation_code(&code) {
        format!("/manage/{}", code)
    } else {
        "/".to_string()
    };

    if let Err(errors) = check(&form) {
        return match state.gateway.find_reservation(&code).await {
            Ok(reservation) => views::render(
                jar,
                &ctx,
                "Manage reservation",
                views::manage_by_code(&reservation, &form.email, &errors),
            ),
            Err(e) => failure(jar, &ctx, e, "/"),
        };
    }

    match state.gateway.cancel(ReservationRef::Code(code), &form.email).await {
        Ok(()) => {
            let jar = flash::push(jar, Flash::info("Reservation canceled."));
            (jar, Redirect::to("/")).into_response()
        }
        Err(e) => failure(jar, &ctx, e, &back),
    }
}
