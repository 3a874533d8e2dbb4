/// HTTP retrieval and parsing of sensor snapshots
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use thiserror::Error;
use tokio::time::{timeout, Duration};
use url::Url;

use crate::models::SensorReading;

/// Failure of a single fetch cycle. Always recovered by the poll loop,
/// never surfaced to the host framework.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("invalid sensor payload: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Coarse failure category recorded in the state store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    Network,
    Parse,
}

impl FetchError {
    /// A timeout is a network failure as far as recovery is concerned.
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            FetchError::Network(_) | FetchError::Timeout(_) => FetchErrorKind::Network,
            FetchError::Parse(_) => FetchErrorKind::Parse,
        }
    }
}

/// One sensor round-trip. The poll loop is generic over this trait so
/// tests can script fetch outcomes without a network.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self) -> Result<SensorReading, FetchError>;
}

/// Parse and validate a response body as a sensor reading.
///
/// Missing or mistyped required fields fail here rather than propagating
/// garbage into classification.
pub fn parse_reading(body: &[u8]) -> Result<SensorReading, FetchError> {
    let reading: SensorReading = serde_json::from_slice(body)?;
    Ok(reading.sanitized())
}

/// Fetches readings from the configured endpoint with a plain GET.
pub struct HttpFetcher {
    client: Client,
    endpoint: Url,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(endpoint: Url, timeout: Duration) -> Self {
        HttpFetcher {
            client: Client::new(),
            endpoint,
            timeout,
        }
    }

    async fn get_body(&self) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .send()
            .await?
            .error_for_status()?;
        let body = response.bytes().await?;
        debug!(
            "Received {} bytes from {}",
            body.len(),
            self.endpoint
        );
        Ok(body.to_vec())
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    /// Issue one GET, accumulate the full body and parse it. The whole
    /// round-trip is bounded by the configured timeout so a hung endpoint
    /// cannot hold a request in flight past the next tick.
    async fn fetch(&self) -> Result<SensorReading, FetchError> {
        let body = match timeout(self.timeout, self.get_body()).await {
            Ok(result) => result?,
            Err(_) => return Err(FetchError::Timeout(self.timeout)),
        };
        parse_reading(&body)
    }
}
