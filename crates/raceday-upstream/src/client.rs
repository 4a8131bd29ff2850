use std::time::Duration;

use async_trait::async_trait;
use raceday_schemas::RaceStatus;
use reqwest::Client;
use tracing::warn;

use crate::circuit_breaker::CircuitBreaker;
use crate::error::UpstreamError;
use crate::payload::{validate_race_payload, RacePayload};
use crate::retry::{retry_with_backoff, RetryConfig};

/// Upstream TAB API boundary. Implementations must be object-safe so the
/// pipeline can hold a `Arc<dyn UpstreamClient>` without knowing the
/// concrete transport (the production HTTP client, or a test double).
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    /// Fetches the raw meetings payload for `date` (`YYYY-MM-DD`, NZ
    /// calendar). Used by the daily initializer to seed the day's skeleton.
    async fn fetch_meetings(&self, date: &str) -> Result<serde_json::Value, UpstreamError>;

    /// Fetches a single race's validated payload. `expected_status`, when
    /// given, is only used to log a soft mismatch warning — a race's status
    /// legitimately changes between polls, so a mismatch is not an error.
    async fn fetch_race(
        &self,
        race_id: &str,
        expected_status: Option<RaceStatus>,
    ) -> Result<RacePayload, UpstreamError>;
}

/// Production implementation backed by `reqwest`, with retry, timeout, and
/// a shared circuit breaker per §4.1.
pub struct TabApiClient {
    http: Client,
    base_url: String,
    breaker: CircuitBreaker,
    retry_cfg: RetryConfig,
    attempt_timeout: Duration,
}

impl TabApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let http = Client::builder()
            .user_agent("raceday-ingest/1.0 (+pari-mutuel data pipeline)")
            .build()
            .expect("reqwest client construction must not fail");

        Self {
            http,
            base_url: base_url.into(),
            breaker: CircuitBreaker::default(),
            retry_cfg: RetryConfig::default(),
            attempt_timeout: Duration::from_secs(10),
        }
    }

    async fn get_json(&self, path: &str) -> Result<serde_json::Value, UpstreamError> {
        if !self.breaker.allow_request() {
            return Err(UpstreamError::CircuitOpen);
        }

        let url = format!("{}{}", self.base_url, path);
        let result = retry_with_backoff(self.retry_cfg, || async {
            let resp = self
                .http
                .get(&url)
                .header("Accept", "application/json")
                .header("X-Client-Name", "raceday-ingest")
                .timeout(self.attempt_timeout)
                .send()
                .await
                .map_err(|e| UpstreamError::Network {
                    message: e.to_string(),
                    retryable: e.is_timeout() || e.is_connect(),
                })?;

            let status = resp.status();
            if !status.is_success() {
                return Err(UpstreamError::http_status(status.as_u16()));
            }

            resp.json::<serde_json::Value>()
                .await
                .map_err(|e| UpstreamError::Network {
                    message: format!("decode response body: {e}"),
                    retryable: false,
                })
        })
        .await;

        match &result {
            Ok(_) => self.breaker.record_success(),
            Err(e) if !matches!(e, UpstreamError::CircuitOpen) => self.breaker.record_failure(),
            _ => {}
        }

        result
    }
}

#[async_trait]
impl UpstreamClient for TabApiClient {
    async fn fetch_meetings(&self, date: &str) -> Result<serde_json::Value, UpstreamError> {
        self.get_json(&format!("/affiliates/v1/racing/meetings?date={date}"))
            .await
    }

    async fn fetch_race(
        &self,
        race_id: &str,
        expected_status: Option<RaceStatus>,
    ) -> Result<RacePayload, UpstreamError> {
        let raw = self
            .get_json(&format!("/affiliates/v1/racing/events/{race_id}"))
            .await?;

        let payload = validate_race_payload(raw)?;

        if let Some(expected) = expected_status {
            let observed = RaceStatus::normalize(&payload.status);
            if observed != expected {
                warn!(
                    race_id,
                    ?expected,
                    ?observed,
                    "race status differs from the status the caller expected"
                );
            }
        }

        Ok(payload)
    }
}
