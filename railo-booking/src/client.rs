use async_trait::async_trait;
use railo_core::AuthSession;
use railo_shared::{CancelReservationRequest, ReservationDetail, ReservationRequest, ReservationResponse};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::ServiceConfig;
use crate::error::{ClientError, ClientResult};

pub const RESERVATION_PATH: &str = "api/v1/booking/reservation";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    Cancelled,
    /// The server no longer knows the reservation, e.g. a repeated cancel
    AlreadyCancelled,
}

/// Reservation lifecycle calls. Each is one request/response exchange with
/// no retry.
#[async_trait]
pub trait ReservationService: Send + Sync {
    async fn create(&self, request: &ReservationRequest) -> ClientResult<ReservationResponse>;

    async fn fetch_detail(&self, reservation_id: i64) -> ClientResult<ReservationDetail>;

    async fn cancel(&self, reservation_id: i64) -> ClientResult<CancelOutcome>;
}

pub struct HttpReservationService {
    client: Client,
    base_url: String,
    auth: Arc<dyn AuthSession>,
}

impl HttpReservationService {
    pub fn new(config: &ServiceConfig, auth: Arc<dyn AuthSession>) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Attach the bearer token. Reservation endpoints are members-only, so a
    /// missing token fails before anything is sent.
    fn authorize(&self, request: RequestBuilder) -> ClientResult<RequestBuilder> {
        match self.auth.access_token() {
            Some(token) => Ok(request.bearer_auth(token.expose())),
            None => Err(ClientError::Unauthorized),
        }
    }

    async fn send(&self, request: RequestBuilder) -> ClientResult<reqwest::Response> {
        let response = self.authorize(request)?.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await?;
        match status {
            StatusCode::UNAUTHORIZED => Err(ClientError::Unauthorized),
            _ => Err(ClientError::Network {
                status: status.as_u16(),
                body,
            }),
        }
    }

    async fn json<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let response = self.send(request).await?;
        response.json().await.map_err(Into::into)
    }
}

#[async_trait]
impl ReservationService for HttpReservationService {
    async fn create(&self, request: &ReservationRequest) -> ClientResult<ReservationResponse> {
        tracing::info!(
            train_schedule_id = request.train_schedule_id,
            seats = request.seat_ids.len(),
            "Creating reservation"
        );
        let response: ReservationResponse = self
            .json(self.client.post(self.url(RESERVATION_PATH)).json(request))
            .await?;
        tracing::info!(reservation_id = response.reservation_id, "Reservation created");
        Ok(response)
    }

    async fn fetch_detail(&self, reservation_id: i64) -> ClientResult<ReservationDetail> {
        tracing::debug!(reservation_id, "Fetching reservation detail");
        let path = format!("{}/{}", RESERVATION_PATH, reservation_id);
        self.json(self.client.get(self.url(&path))).await
    }

    async fn cancel(&self, reservation_id: i64) -> ClientResult<CancelOutcome> {
        let body = CancelReservationRequest { reservation_id };
        let request = self.client.delete(self.url(RESERVATION_PATH)).json(&body);

        match self.send(request).await {
            Ok(_) => {
                tracing::info!(reservation_id, "Reservation cancelled");
                Ok(CancelOutcome::Cancelled)
            }
            Err(ClientError::Network { status: 404 | 409 | 410, body }) => {
                tracing::warn!(reservation_id, %body, "Reservation already cancelled");
                Ok(CancelOutcome::AlreadyCancelled)
            }
            Err(e) => Err(e),
        }
    }
}
