use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tessera_shared::models::User;
use uuid::Uuid;

use crate::state::{AppState, AuthConfig};

pub const SESSION_COOKIE: &str = "tessera_session";

// ============================================================================
// Session Claims
// ============================================================================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    pub sub: String,
    pub email: String,
    pub admin: bool,
    pub sid: Uuid,
    pub iat: usize,
    pub exp: usize,
}

/// The logged-in user behind a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: i64,
    pub email: String,
    pub is_admin: bool,
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            email: user.email.clone(),
            is_admin: user.is_admin,
        }
    }
}

/// Per-request view of who is asking. Built once by `session_context` and
/// handed to handlers as an extension.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub principal: Option<Principal>,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn is_admin(&self) -> bool {
        self.principal.as_ref().is_some_and(|p| p.is_admin)
    }
}

// ============================================================================
// Token Handling
// ============================================================================

pub fn issue_session_token(auth: &AuthConfig, principal: &Principal, remember: bool) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now().timestamp() as usize;
    let lifetime = if remember { auth.remember_seconds } else { auth.session_seconds };

    let claims = SessionClaims {
        sub: principal.user_id.to_string(),
        email: principal.email.clone(),
        admin: principal.is_admin,
        sid: Uuid::new_v4(),
        iat: now,
        exp: now + lifetime as usize,
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(auth.secret.as_bytes()))
}

/// Decodes a session token. Expired, tampered or malformed tokens yield `None`.
pub fn read_session_token(auth: &AuthConfig, token: &str) -> Option<Principal> {
    let token_data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(auth.secret.as_bytes()),
        &Validation::default(),
    )
    .ok()?;

    let claims = token_data.claims;
    Some(Principal {
        user_id: claims.sub.parse().ok()?,
        email: claims.email,
        is_admin: claims.admin,
    })
}

/// Session cookie for a fresh login. Without "remember me" it is a browser
/// session cookie; with it the cookie outlives the browser.
pub fn session_cookie(auth: &AuthConfig, token: String, remember: bool) -> Cookie<'static> {
    let mut builder = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(auth.secure_cookies)
        .same_site(SameSite::Lax);

    if remember {
        builder = builder.max_age(time::Duration::seconds(auth.remember_seconds as i64));
    }

    builder.build()
}

pub fn clear_session(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}

// ============================================================================
// Session Middleware
// ============================================================================

/// Resolves the session cookie into a `RequestContext` for every request.
pub async fn session_context(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let jar = CookieJar::from_headers(req.headers());
    let principal = jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| read_session_token(&state.auth, cookie.value()));

    req.extensions_mut().insert(RequestContext { principal });

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth() -> AuthConfig {
        AuthConfig {
            secret: "test-secret".to_string(),
            session_seconds: 60,
            remember_seconds: 3600,
            secure_cookies: false,
        }
    }

    fn alice() -> Principal {
        Principal { user_id: 7, email: "alice@example.com".to_string(), is_admin: true }
    }

    #[test]
    fn test_token_round_trip() {
        let token = issue_session_token(&auth(), &alice(), false).unwrap();
        assert_eq!(read_session_token(&auth(), &token), Some(alice()));
    }

    #[test]
    fn test_token_signed_with_other_secret_is_ignored() {
        let mut other = auth();
        other.secret = "another-secret".to_string();
        let token = issue_session_token(&other, &alice(), false).unwrap();

        assert_eq!(read_session_token(&auth(), &token), None);
        assert_eq!(read_session_token(&auth(), "garbage"), None);
    }

    #[test]
    fn test_remember_me_controls_cookie_persistence() {
        let session = session_cookie(&auth(), "t".to_string(), false);
        assert_eq!(session.max_age(), None);
        assert_eq!(session.http_only(), Some(true));

        let remembered = session_cookie(&auth(), "t".to_string(), true);
        assert_eq!(remembered.max_age(), Some(time::Duration::seconds(3600)));
    }
}
