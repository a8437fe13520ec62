use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use tessera_core::ReservationsApi;
use tessera_shared::models::{
    api::{CancelReservationRequest, MessageResponse, RegisterRequest, RegisterResponse, ReservationsQuery},
    ReservationRef, ReservationSummary,
};

use super::{ApiJson, ApiPath, ApiQuery};
use crate::{error::AppError, state::AppState};

pub async fn list_reservations(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ReservationsQuery>,
) -> Result<Json<Vec<ReservationSummary>>, AppError> {
    let email = query
        .email
        .filter(|e| !e.trim().is_empty())
        .ok_or_else(|| AppError::ValidationError("Email query parameter is required.".to_string()))?;

    Ok(Json(state.service.list_reservations(&email).await?))
}

pub async fn get_reservation(
    State(state): State<AppState>,
    ApiPath(code): ApiPath<String>,
) -> Result<Json<ReservationSummary>, AppError> {
    Ok(Json(state.service.find_reservation(&code).await?))
}

pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let reservation = state.service.register(req.event_id, &req.email).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "Registration successful!".to_string(),
            reservation_id: reservation.id,
            reservation_code: reservation.reservation_code,
        }),
    ))
}

pub async fn cancel_reservation(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CancelReservationRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    // Exactly one of id / code
    let target = match (req.reservation_id, req.reservation_code) {
        (Some(id), None) => ReservationRef::Id(id),
        (None, Some(code)) => ReservationRef::Code(code),
        _ => {
            return Err(AppError::ValidationError(
                "Provide either reservation_id or reservation_code.".to_string(),
            ))
        }
    };
    if req.email.trim().is_empty() {
        return Err(AppError::ValidationError("Email is required.".to_string()));
    }

    state.service.cancel(target, &req.email).await?;
    Ok(Json(MessageResponse::new("Reservation canceled.")))
}
