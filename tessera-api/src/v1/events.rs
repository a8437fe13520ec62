use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use tessera_core::ReservationsApi;
use tessera_shared::models::{
    api::{DeleteEventRequest, EditEventRequest, EventPayload, EventResponse, MessageResponse},
    Event, NewEvent,
};

use super::{ApiJson, ApiPath};
use crate::{error::AppError, forms::EventForm, state::AppState};

fn parse_payload(payload: EventPayload) -> Result<NewEvent, AppError> {
    EventForm::from(payload)
        .into_new_event()
        .map_err(|errors| AppError::ValidationError(errors.summary()))
}

pub async fn list_events(State(state): State<AppState>) -> Result<Json<Vec<Event>>, AppError> {
    Ok(Json(state.service.list_events().await?))
}

pub async fn get_event(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Event>, AppError> {
    Ok(Json(state.service.get_event(id).await?))
}

pub async fn create_event(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<EventPayload>,
) -> Result<(StatusCode, Json<EventResponse>), AppError> {
    let event = state.service.create_event(parse_payload(payload)?).await?;

    Ok((
        StatusCode::CREATED,
        Json(EventResponse {
            message: "Event created successfully.".to_string(),
            event,
        }),
    ))
}

pub async fn edit_event(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<EditEventRequest>,
) -> Result<Json<EventResponse>, AppError> {
    let event = state
        .service
        .update_event(req.event_id, parse_payload(req.event)?)
        .await?;

    Ok(Json(EventResponse {
        message: "Event updated successfully.".to_string(),
        event,
    }))
}

pub async fn delete_event(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<DeleteEventRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    state.service.delete_event(req.event_id).await?;
    Ok(Json(MessageResponse::new("Event deleted successfully.")))
}
