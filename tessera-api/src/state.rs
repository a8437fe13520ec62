use std::sync::Arc;
use tessera_core::{RegistrationService, ReservationsApi};

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    /// Lifetime of a session token when "remember me" is off.
    pub session_seconds: u64,
    /// Lifetime of the token and cookie when "remember me" is on.
    pub remember_seconds: u64,
    pub secure_cookies: bool,
}

#[derive(Clone)]
pub struct AppState {
    /// Business rules, called directly by the JSON API and the account pages.
    pub service: Arc<RegistrationService>,
    /// What the HTML pages use for events and reservations: the service
    /// itself, or an HTTP client of another instance's JSON API.
    pub gateway: Arc<dyn ReservationsApi>,
    pub auth: AuthConfig,
    pub api_token: String,
}

impl AppState {
    /// State whose pages call the service in-process.
    pub fn local(service: Arc<RegistrationService>, auth: AuthConfig, api_token: String) -> Self {
        Self {
            gateway: service.clone(),
            service,
            auth,
            api_token,
        }
    }

    pub fn with_gateway(mut self, gateway: Arc<dyn ReservationsApi>) -> Self {
        self.gateway = gateway;
        self
    }
}
