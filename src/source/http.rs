//! HTTP report source.
//!
//! Fetches the report from a URL on a background tokio task and hands new
//! versions to the UI thread over a channel.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use histwatch_types::RegressionReport;

use super::DataSource;

/// Fetch and validate a regression report.
pub async fn fetch_report(client: &reqwest::Client, url: &str) -> Result<RegressionReport> {
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("request to {} failed", url))?
        .error_for_status()
        .with_context(|| format!("{} returned an error status", url))?;

    let body = response.text().await.context("failed to read response body")?;
    let report = RegressionReport::from_json(&body).with_context(|| format!("invalid report from {}", url))?;
    Ok(report)
}

/// Periodically fetches a regression report over HTTP.
///
/// Must be created inside a tokio runtime. The background task stops when
/// the source is dropped.
///
/// ```no_run
/// use std::time::Duration;
/// use histwatch::{DataSource, HttpSource};
///
/// # tokio_test::block_on(async {
/// let url = "http://localhost:8000/regressions.json";
/// let mut source = HttpSource::spawn(url, Duration::from_secs(60)).unwrap();
/// if let Some(report) = source.poll() {
///     println!("{} dates", report.len());
/// }
/// # });
/// ```
#[derive(Debug)]
pub struct HttpSource {
    description: String,
    receiver: mpsc::UnboundedReceiver<Result<RegressionReport, String>>,
    reload: Arc<Notify>,
    last_error: Option<String>,
    task: JoinHandle<()>,
}

impl HttpSource {
    pub fn spawn(url: impl Into<String>, refresh: Duration) -> Result<Self> {
        let url = url.into();
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("histwatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;

        let (tx, receiver) = mpsc::unbounded_channel();
        let reload = Arc::new(Notify::new());
        let task = tokio::spawn(fetch_loop(client, url.clone(), refresh, tx, reload.clone()));

        Ok(Self {
            description: format!("url: {}", url),
            receiver,
            reload,
            last_error: None,
            task,
        })
    }
}

async fn fetch_loop(
    client: reqwest::Client,
    url: String,
    refresh: Duration,
    tx: mpsc::UnboundedSender<Result<RegressionReport, String>>,
    reload: Arc<Notify>,
) {
    let mut last: Option<RegressionReport> = None;

    loop {
        let message = match fetch_report(&client, &url).await {
            Ok(report) if last.as_ref() == Some(&report) => {
                debug!(url = %url, "report unchanged");
                None
            }
            Ok(report) => {
                last = Some(report.clone());
                Some(Ok(report))
            }
            Err(e) => {
                warn!(url = %url, error = %format!("{:#}", e), "fetch failed");
                Some(Err(format!("{:#}", e)))
            }
        };

        if let Some(message) = message {
            if tx.send(message).is_err() {
                break;
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(refresh) => {}
            _ = reload.notified() => {
                // A forced reload delivers the report even if unchanged
                last = None;
            }
            _ = tx.closed() => break,
        }
    }
}

impl Drop for HttpSource {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl DataSource for HttpSource {
    fn poll(&mut self) -> Option<RegressionReport> {
        let mut latest = None;
        while let Ok(message) = self.receiver.try_recv() {
            match message {
                Ok(report) => {
                    self.last_error = None;
                    latest = Some(report);
                }
                Err(e) => self.last_error = Some(e),
            }
        }
        latest
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn request_reload(&mut self) {
        self.reload.notify_one();
    }
}
