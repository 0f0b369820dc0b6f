use super::serialization::{RemoteWriteSerializer, SerializationError};
use super::{MetricSink, TransmissionResult};
use crate::domain::MetricFamilies;
use reqwest::header::{CONTENT_ENCODING, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, ClientBuilder};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;
use url::Url;

pub const REMOTE_WRITE_VERSION_HEADER: &str = "x-prometheus-remote-write-version";
pub const REMOTE_WRITE_VERSION: &str = "0.1.0";

/// Error bodies longer than this are cut before being logged.
const MAX_ERROR_BODY_CHARS: usize = 1024;

#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    #[error("Server returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },
}

impl DeliveryError {
    /// Whether a resend could succeed. Informational: the agent never resends.
    pub fn is_recoverable(&self) -> bool {
        match self {
            DeliveryError::Request(_) | DeliveryError::Timeout(_) => true,
            DeliveryError::HttpStatus { status, .. } => *status >= 500 || *status == 429,
            DeliveryError::InvalidConfiguration(_) | DeliveryError::Serialization(_) => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoint: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:9090/api/v1/write".to_string(),
            timeout: Duration::from_secs(15),
            user_agent: format!("{}/{}", crate::BIN_NAME, crate::VERSION),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConnectionStats {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub average_response_time: Duration,
}

#[derive(Debug, Default)]
pub struct ClientStats {
    total_requests: AtomicU64,
    successful_requests: AtomicU64,
    failed_requests: AtomicU64,
    total_response_time: AtomicU64,
}

impl ClientStats {
    pub fn record_request(&self, success: bool, response_time: Duration) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.total_response_time
            .fetch_add(response_time.as_millis() as u64, Ordering::Relaxed);

        if success {
            self.successful_requests.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed_requests.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// Blocking-per-call remote write client: one POST per `store`, no retries,
/// no buffering.
#[derive(Debug, Clone)]
pub struct RemoteWriteClient {
    client: Client,
    config: ClientConfig,
    endpoint_url: Url,
    serializer: RemoteWriteSerializer,
    stats: Arc<ClientStats>,
}

impl RemoteWriteClient {
    pub fn new(config: ClientConfig) -> Result<Self, DeliveryError> {
        let endpoint_url = parse_endpoint(&config.endpoint)?;

        let client = ClientBuilder::new()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .default_headers(remote_write_headers())
            .build()
            .map_err(|e| {
                DeliveryError::InvalidConfiguration(format!("Failed to build HTTP client: {e}"))
            })?;

        let serializer = RemoteWriteSerializer::new();

        Ok(Self {
            client,
            config,
            endpoint_url,
            serializer,
            stats: Arc::new(ClientStats::default()),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint_url
    }

    /// Serializes, compresses and POSTs `families`. An empty map still
    /// produces a (empty) request.
    pub async fn store(&self, families: &MetricFamilies) -> Result<TransmissionResult, DeliveryError> {
        let payload = self.serializer.serialize(families)?;
        let bytes_sent = payload.body.len();

        if payload.series == 0 {
            debug!("Sending empty remote write request");
        }

        let start = Instant::now();
        let response = match self
            .client
            .post(self.endpoint_url.clone())
            .body(payload.body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                self.stats.record_request(false, start.elapsed());
                if e.is_timeout() {
                    return Err(DeliveryError::Timeout(self.config.timeout));
                }
                return Err(DeliveryError::Request(e));
            }
        };
        let latency = start.elapsed();
        let status = response.status();

        if !status.is_success() {
            self.stats.record_request(false, latency);
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::HttpStatus {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        self.stats.record_request(true, latency);
        debug!(
            status = status.as_u16(),
            series = payload.series,
            bytes = bytes_sent,
            latency_ms = latency.as_millis() as u64,
            "Remote write request accepted"
        );

        Ok(TransmissionResult {
            status_code: status.as_u16(),
            series: payload.series,
            bytes_sent,
            latency,
        })
    }

    pub fn connection_stats(&self) -> ConnectionStats {
        let total_requests = self.stats.total_requests.load(Ordering::Relaxed);
        let total_response_time = self.stats.total_response_time.load(Ordering::Relaxed);

        let average_response_time = if total_requests > 0 {
            Duration::from_millis(total_response_time / total_requests)
        } else {
            Duration::ZERO
        };

        ConnectionStats {
            total_requests,
            successful_requests: self.stats.successful_requests.load(Ordering::Relaxed),
            failed_requests: self.stats.failed_requests.load(Ordering::Relaxed),
            average_response_time,
        }
    }
}

impl MetricSink for RemoteWriteClient {
    async fn deliver(&self, families: &MetricFamilies) -> Result<TransmissionResult, DeliveryError> {
        self.store(families).await
    }
}

pub fn parse_endpoint(endpoint: &str) -> Result<Url, DeliveryError> {
    let url = Url::parse(endpoint).map_err(|e| {
        DeliveryError::InvalidConfiguration(format!("Invalid endpoint URL '{endpoint}': {e}"))
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(DeliveryError::InvalidConfiguration(format!(
            "Unsupported endpoint scheme '{scheme}' in '{endpoint}'"
        ))),
    }
}

fn remote_write_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_ENCODING, HeaderValue::from_static("snappy"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/x-protobuf"));
    headers.insert(
        HeaderName::from_static(REMOTE_WRITE_VERSION_HEADER),
        HeaderValue::from_static(REMOTE_WRITE_VERSION),
    );
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_endpoint() {
        assert!(parse_endpoint("http://localhost:9090/api/v1/write").is_ok());
        assert!(parse_endpoint("https://prom.example.com/api/v1/write").is_ok());
        assert!(matches!(
            parse_endpoint("not a url"),
            Err(DeliveryError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            parse_endpoint("ftp://example.com/write"),
            Err(DeliveryError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_recoverable_classification() {
        let status = |status| DeliveryError::HttpStatus {
            status,
            body: String::new(),
        };
        assert!(status(500).is_recoverable());
        assert!(status(503).is_recoverable());
        assert!(status(429).is_recoverable());
        assert!(!status(400).is_recoverable());
        assert!(DeliveryError::Timeout(Duration::from_secs(1)).is_recoverable());
        assert!(!DeliveryError::InvalidConfiguration(String::new()).is_recoverable());
    }

    #[test]
    fn test_default_user_agent() {
        let config = ClientConfig::default();
        assert!(config.user_agent.starts_with("faucet_agent/"));
        assert_eq!(config.timeout, Duration::from_secs(15));
    }

    #[test]
    fn test_stats_start_empty() {
        let client = RemoteWriteClient::new(ClientConfig::default()).unwrap();
        let stats = client.connection_stats();
        assert_eq!(stats.total_requests, 0);
        assert_eq!(stats.average_response_time, Duration::ZERO);
    }
}
