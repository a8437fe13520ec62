use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum::http::header::AUTHORIZATION;
use axum_extra::extract::cookie::CookieJar;

use super::session::{Principal, RequestContext};
use crate::{error::AppError, flash::{self, Flash}, state::AppState};

// ============================================================================
// Authorization Decision
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    LoggedIn,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AccessDenied {
    #[error("Please log in to access this page.")]
    NotLoggedIn,
    #[error("Access denied: administrators only.")]
    NotAdmin,
}

/// Decides whether the request's principal satisfies `requirement`.
pub fn authorize(ctx: &RequestContext, requirement: Requirement) -> Result<Principal, AccessDenied> {
    let principal = ctx.principal.clone().ok_or(AccessDenied::NotLoggedIn)?;

    if requirement == Requirement::Admin && !principal.is_admin {
        return Err(AccessDenied::NotAdmin);
    }

    Ok(principal)
}

impl IntoResponse for AccessDenied {
    fn into_response(self) -> Response {
        let target = match self {
            AccessDenied::NotLoggedIn => "/login",
            AccessDenied::NotAdmin => "/",
        };

        let jar = flash::push(CookieJar::new(), Flash::error(self.to_string()));
        (jar, Redirect::to(target)).into_response()
    }
}

// ============================================================================
// Route Guards
// ============================================================================

async fn guard(requirement: Requirement, mut req: Request, next: Next) -> Result<Response, AccessDenied> {
    let ctx = req
        .extensions()
        .get::<RequestContext>()
        .cloned()
        .unwrap_or_default();

    let principal = authorize(&ctx, requirement).inspect_err(|denied| {
        tracing::debug!("{} {} denied: {}", req.method(), req.uri().path(), denied);
    })?;

    req.extensions_mut().insert(principal);
    Ok(next.run(req).await)
}

/// Lets the request through only with a session principal.
pub async fn require_login(req: Request, next: Next) -> Result<Response, AccessDenied> {
    guard(Requirement::LoggedIn, req, next).await
}

/// Lets the request through only with an admin principal.
pub async fn require_admin(req: Request, next: Next) -> Result<Response, AccessDenied> {
    guard(Requirement::Admin, req, next).await
}

// ============================================================================
// Internal API Token
// ============================================================================

/// Every `/api` call must present the configured bearer token.
pub async fn api_token_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::AuthenticationError("Missing API token".to_string()))?;

    if token != state.api_token {
        return Err(AppError::AuthenticationError("Invalid API token".to_string()));
    }

    Ok(next.run(req).await)
}
