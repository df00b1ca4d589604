//! HTTP client for the telemetry aggregation service.
//!
//! ## Endpoints
//!
//! - `GET /versions` - all build versions (`["nightly/40", ...]`)
//! - `GET /filters/?channel=nightly&version=40` - filter options of a build
//! - `GET /evolution/nightly/40/GC_MS?aggregated=true` - histogram evolution
//!
//! Every request goes through the same retry policy: connection failures,
//! timeouts, `429` and `5xx` responses are retried with exponential backoff.
//!
//! ## Example
//!
//! ```rust,no_run
//! use histwatch_telemetry::{TelemetryClient, TelemetryService};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = TelemetryClient::builder()
//!         .endpoint("https://aggregates.telemetry.mozilla.org")
//!         .max_retries(5)
//!         .build()?;
//!
//!     for version in client.versions().await? {
//!         println!("{}", version);
//!     }
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use histwatch_types::{Evolution, MetricName, VersionId};

use crate::{FilterOptions, TelemetryError, TelemetryService};

/// Default service endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://aggregates.telemetry.mozilla.org";

/// Retries applied to every request unless configured otherwise.
pub const DEFAULT_MAX_RETRIES: u32 = 5;

const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Telemetry service client over HTTP.
#[derive(Debug, Clone)]
pub struct TelemetryClient {
    client: Client,
    endpoint: String,
    max_retries: u32,
    retry_backoff: Duration,
}

impl TelemetryClient {
    /// Create a new builder for configuring the client.
    pub fn builder() -> TelemetryClientBuilder {
        TelemetryClientBuilder::default()
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn versions_url(&self) -> String {
        format!("{}/versions", self.endpoint)
    }

    fn filters_url(&self) -> String {
        format!("{}/filters/", self.endpoint)
    }

    fn evolution_url(&self, version: &VersionId, metric: &MetricName) -> String {
        format!(
            "{}/evolution/{}/{}/{}",
            self.endpoint,
            urlencoded(version.channel()),
            urlencoded(version.build()),
            urlencoded(metric.as_str())
        )
    }

    /// GET `url` and decode the JSON body, retrying transient failures.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, TelemetryError> {
        let mut retries = 0;

        loop {
            match self.get_json_once(url, query).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && retries < self.max_retries => {
                    retries += 1;
                    let backoff = self.backoff(retries);
                    warn!(
                        error = %e,
                        url,
                        retry = retries,
                        max_retries = self.max_retries,
                        backoff_ms = backoff.as_millis() as u64,
                        "retrying request"
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn get_json_once<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, TelemetryError> {
        debug!(url, ?query, "GET");
        let response = self.client.get(url).query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TelemetryError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| TelemetryError::Parse {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    /// Exponential backoff for the given retry number (1-based), capped.
    fn backoff(&self, retry: u32) -> Duration {
        let factor = 1u32 << (retry - 1).min(16);
        self.retry_backoff.saturating_mul(factor).min(MAX_BACKOFF)
    }
}

#[async_trait]
impl TelemetryService for TelemetryClient {
    async fn versions(&self) -> Result<Vec<VersionId>, TelemetryError> {
        let raw: Vec<String> = self.get_json(&self.versions_url(), &[]).await?;

        let mut versions = Vec::with_capacity(raw.len());
        for id in raw {
            match VersionId::parse(&id) {
                Ok(v) => versions.push(v),
                Err(e) => warn!(error = %e, version = %id, "ignoring malformed version"),
            }
        }
        Ok(versions)
    }

    async fn filter_options(&self, version: &VersionId) -> Result<FilterOptions, TelemetryError> {
        self.get_json(
            &self.filters_url(),
            &[("channel", version.channel()), ("version", version.build())],
        )
        .await
    }

    async fn evolution(
        &self,
        version: &VersionId,
        metric: &MetricName,
    ) -> Result<Evolution, TelemetryError> {
        self.get_json(&self.evolution_url(version, metric), &[("aggregated", "true")])
            .await
    }
}

/// Builder for TelemetryClient.
#[derive(Debug, Default)]
pub struct TelemetryClientBuilder {
    endpoint: Option<String>,
    timeout: Option<Duration>,
    max_retries: Option<u32>,
    retry_backoff: Option<Duration>,
}

impl TelemetryClientBuilder {
    /// Set the service endpoint (default: [`DEFAULT_ENDPOINT`]).
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the per-request timeout (default: 30 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set how many times a transient failure is retried (default: 5).
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }

    /// Set the delay before the first retry; it doubles per attempt (default: 1 second).
    pub fn retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = Some(backoff);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<TelemetryClient, TelemetryError> {
        let timeout = self.timeout.unwrap_or(Duration::from_secs(30));

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("histwatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TelemetryError::Config(e.to_string()))?;

        let endpoint = self
            .endpoint
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(TelemetryClient {
            client,
            endpoint,
            max_retries: self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
            retry_backoff: self.retry_backoff.unwrap_or(Duration::from_secs(1)),
        })
    }
}

// Percent-encode the characters that would change the meaning of a path segment.
fn urlencoded(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '%' => out.push_str("%25"),
            '/' => out.push_str("%2F"),
            '?' => out.push_str("%3F"),
            '#' => out.push_str("%23"),
            ' ' => out.push_str("%20"),
            _ => out.push(c),
        }
    }
    out
}
