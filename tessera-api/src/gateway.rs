//! `ReservationsApi` over the JSON API of another instance.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use tessera_core::{service::normalize_email, CoreError, CoreResult, ReservationsApi};
use tessera_shared::models::{
    api::{
        CancelReservationRequest, DeleteEventRequest, EditEventRequest, ErrorResponse, EventPayload,
        EventResponse, MessageResponse, RegisterRequest, RegisterResponse,
    },
    Event, NewEvent, Reservation, ReservationRef, ReservationSummary,
};
use tracing::{debug, warn};

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpGatewayConfig {
    /// Base URL of the remote `/api` mount, e.g. `http://10.0.0.5:8080/api`
    pub base_url: String,
    /// Bearer token expected by the remote API
    pub api_token: String,
    /// Whole-request timeout
    pub timeout: Duration,
}

pub struct HttpGateway {
    base_url: Url,
    api_token: String,
    client: reqwest::Client,
}

impl HttpGateway {
    pub fn new(config: HttpGatewayConfig) -> anyhow::Result<Self> {
        let base_url = Url::parse(&config.base_url)?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("gateway base URL cannot be a base: {}", config.base_url);
        }

        let client = reqwest::Client::builder()
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            base_url,
            api_token: config.api_token,
            client,
        })
    }

    /// Appends percent-encoded path segments to the base URL.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> CoreResult<T> {
        let response = request
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(|e| {
                warn!("Gateway request failed: {}", e);
                CoreError::Transport(e.to_string())
            })?;

        let status = response.status();
        debug!("Gateway {} -> {}", response.url().path(), status);

        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| CoreError::Transport(format!("Unreadable response: {}", e)));
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.error)
            .unwrap_or(body);

        Err(match status {
            StatusCode::BAD_REQUEST => CoreError::Validation(message),
            StatusCode::FORBIDDEN => CoreError::Forbidden(message),
            StatusCode::NOT_FOUND => CoreError::NotFound(message),
            _ => {
                warn!("Gateway returned HTTP {}: {}", status, message);
                CoreError::Transport(format!("HTTP {}", status.as_u16()))
            }
        })
    }
}

fn to_payload(event: NewEvent) -> EventPayload {
    EventPayload {
        title: event.title,
        start_date: event.start_date.to_rfc3339(),
        end_date: event.end_date.to_rfc3339(),
        thumbnail: event.thumbnail,
    }
}

#[async_trait]
impl ReservationsApi for HttpGateway {
    async fn list_events(&self) -> CoreResult<Vec<Event>> {
        self.send(self.client.get(self.url(&["events"]))).await
    }

    async fn get_event(&self, id: i64) -> CoreResult<Event> {
        self.send(self.client.get(self.url(&["events", &id.to_string()]))).await
    }

    async fn list_reservations(&self, email: &str) -> CoreResult<Vec<ReservationSummary>> {
        let request = self.client.get(self.url(&["reservations"])).query(&[("email", email)]);
        self.send(request).await
    }

    async fn find_reservation(&self, code: &str) -> CoreResult<ReservationSummary> {
        self.send(self.client.get(self.url(&["reservations", code.trim()]))).await
    }

    async fn register(&self, event_id: i64, email: &str) -> CoreResult<Reservation> {
        let request = self.client.post(self.url(&["register"])).json(&RegisterRequest {
            event_id,
            email: email.to_string(),
        });
        let created: RegisterResponse = self.send(request).await?;

        // The API answers with id and code only; the timestamp is local.
        Ok(Reservation {
            id: created.reservation_id,
            event_id,
            email: normalize_email(email),
            reservation_code: created.reservation_code,
            created_at: Utc::now(),
        })
    }

    async fn cancel(&self, target: ReservationRef, email: &str) -> CoreResult<()> {
        let mut body = CancelReservationRequest {
            email: email.to_string(),
            ..Default::default()
        };
        match target {
            ReservationRef::Id(id) => body.reservation_id = Some(id),
            ReservationRef::Code(code) => body.reservation_code = Some(code),
        }

        let _: MessageResponse = self
            .send(self.client.post(self.url(&["cancel-reservation"])).json(&body))
            .await?;
        Ok(())
    }

    async fn create_event(&self, event: NewEvent) -> CoreResult<Event> {
        let request = self.client.post(self.url(&["create-event"])).json(&to_payload(event));
        let created: EventResponse = self.send(request).await?;
        Ok(created.event)
    }

    async fn update_event(&self, id: i64, event: NewEvent) -> CoreResult<Event> {
        let request = self.client.put(self.url(&["edit-event"])).json(&EditEventRequest {
            event_id: id,
            event: to_payload(event),
        });
        let updated: EventResponse = self.send(request).await?;
        Ok(updated.event)
    }

    async fn delete_event(&self, id: i64) -> CoreResult<()> {
        let request = self
            .client
            .delete(self.url(&["delete-event"]))
            .json(&DeleteEventRequest { event_id: id });
        let _: MessageResponse = self.send(request).await?;
        Ok(())
    }
}
