use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Extension, Form, Router,
};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    flash::{self, Flash},
    forms::{EventForm, FormErrors},
    middleware::{Principal, RequestContext},
    state::AppState,
    views, web,
};

/// Event management pages, mounted behind `require_admin`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin", get(create_page).post(create_event))
        .route("/edit-event/{id}", get(edit_page).post(update_event))
        .route("/delete-event/{id}", get(delete_page).post(delete_event))
}

// ============================================================================
// Create
// ============================================================================

async fn create_page(Extension(ctx): Extension<RequestContext>, jar: CookieJar) -> Response {
    views::render(
        jar,
        &ctx,
        "Create event",
        views::event_form("/admin", &EventForm::default(), &FormErrors::default()),
    )
}

async fn create_event(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Extension(admin): Extension<Principal>,
    jar: CookieJar,
    Form(form): Form<EventForm>,
) -> Response {
    let event = match form.into_new_event() {
        Ok(event) => event,
        Err(errors) => {
            return views::render(jar, &ctx, "Create event", views::event_form("/admin", &form, &errors))
        }
    };

    match state.gateway.create_event(event).await {
        Ok(created) => {
            tracing::info!("Admin {} created event {}", admin.user_id, created.id);
            let jar = flash::push(jar, Flash::info("Event created successfully."));
            (jar, Redirect::to("/")).into_response()
        }
        Err(e) => web::failure(jar, &ctx, e, "/admin"),
    }
}

// ============================================================================
// Edit
// ============================================================================

async fn edit_page(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    jar: CookieJar,
    Path(id): Path<i64>,
) -> Response {
    match state.gateway.get_event(id).await {
        Ok(event) => views::render(
            jar,
            &ctx,
            "Edit event",
            views::event_form(&format!("/edit-event/{}", id), &EventForm::from_event(&event), &FormErrors::default()),
        ),
        Err(e) => web::failure(jar, &ctx, e, "/"),
    }
}

async fn update_event(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Extension(admin): Extension<Principal>,
    jar: CookieJar,
    Path(id): Path<i64>,
    Form(form): Form<EventForm>,
) -> Response {
    let action = format!("/edit-event/{}", id);
    let event = match form.into_new_event() {
        Ok(event) => event,
        Err(errors) => return views::render(jar, &ctx, "Edit event", views::event_form(&action, &form, &errors)),
    };

    match state.gateway.update_event(id, event).await {
        Ok(updated) => {
            tracing::info!("Admin {} updated event {}", admin.user_id, updated.id);
            let jar = flash::push(jar, Flash::info("Event updated successfully."));
            (jar, Redirect::to("/")).into_response()
        }
        Err(e) => web::failure(jar, &ctx, e, &action),
    }
}

// ============================================================================
// Delete
// ============================================================================

async fn delete_page(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    jar: CookieJar,
    Path(id): Path<i64>,
) -> Response {
    match state.gateway.get_event(id).await {
        Ok(event) => views::render(jar, &ctx, "Delete event", views::delete_confirm(&event)),
        Err(e) => web::failure(jar, &ctx, e, "/"),
    }
}

async fn delete_event(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Extension(admin): Extension<Principal>,
    jar: CookieJar,
    Path(id): Path<i64>,
) -> Response {
    match state.gateway.delete_event(id).await {
        Ok(()) => {
            tracing::info!("Admin {} deleted event {}", admin.user_id, id);
            let jar = flash::push(jar, Flash::info("Event and its reservations deleted."));
            (jar, Redirect::to("/")).into_response()
        }
        Err(e) => web::failure(jar, &ctx, e, "/"),
    }
}
