pub mod auth;
pub mod session;

pub use auth::{api_token_middleware, authorize, require_admin, require_login, AccessDenied, Requirement};
pub use session::{session_context, Principal, RequestContext};
