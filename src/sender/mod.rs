pub mod client;
pub mod remote_write;
pub mod serialization;

pub use client::{ClientConfig, ConnectionStats, DeliveryError, RemoteWriteClient};
pub use remote_write::WriteRequest;
pub use serialization::{RemoteWritePayload, RemoteWriteSerializer, SerializationError};

use crate::domain::MetricFamilies;
use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct TransmissionResult {
    pub status_code: u16,
    pub series: usize,
    pub bytes_sent: usize,
    pub latency: Duration,
}

/// Destination for translated metric families.
///
/// Called once per input line, awaited before the next line is read, so a
/// slow sink throttles ingestion.
pub trait MetricSink: Send + Sync {
    fn deliver(
        &self,
        families: &MetricFamilies,
    ) -> impl Future<Output = Result<TransmissionResult, DeliveryError>> + Send;
}
