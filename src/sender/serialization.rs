use super::remote_write::WriteRequest;
use crate::domain::MetricFamilies;
use bytes::Bytes;
use prost::Message;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SerializationError {
    #[error("Protobuf encoding failed: {0}")]
    Encode(#[from] prost::EncodeError),
    #[error("Snappy compression failed: {0}")]
    Compress(#[from] snap::Error),
}

/// A compressed remote write body ready to POST.
#[derive(Debug, Clone)]
pub struct RemoteWritePayload {
    pub body: Bytes,
    pub series: usize,
    pub uncompressed_len: usize,
}

/// Builds, encodes and snappy-compresses write requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct RemoteWriteSerializer;

impl RemoteWriteSerializer {
    pub fn new() -> Self {
        Self
    }

    pub fn serialize(&self, families: &MetricFamilies) -> Result<RemoteWritePayload, SerializationError> {
        let request = WriteRequest::from_families(families);
        let raw = encode(&request)?;
        let body = compress(&raw)?;

        Ok(RemoteWritePayload {
            body: Bytes::from(body),
            series: request.series_count(),
            uncompressed_len: raw.len(),
        })
    }
}

pub fn encode(request: &WriteRequest) -> Result<Vec<u8>, SerializationError> {
    let mut buf = Vec::with_capacity(request.encoded_len());
    request.encode(&mut buf)?;
    Ok(buf)
}

/// Raw (block) snappy, as remote write expects; not the framed stream format.
pub fn compress(raw: &[u8]) -> Result<Vec<u8>, SerializationError> {
    Ok(snap::raw::Encoder::new().compress_vec(raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MetricFamily, MetricKind, MetricSample};

    #[test]
    fn test_empty_request_still_serializes() {
        let payload = RemoteWriteSerializer::new()
            .serialize(&MetricFamilies::new())
            .unwrap();
        assert_eq!(payload.series, 0);
        assert_eq!(payload.uncompressed_len, 0);

        let raw = snap::raw::Decoder::new().decompress_vec(&payload.body).unwrap();
        assert!(raw.is_empty());
    }

    #[test]
    fn test_body_decodes_to_request() {
        let mut families = MetricFamilies::new();
        families.insert(
            "faucet_mac_ip_info".to_string(),
            MetricFamily::new("faucet_mac_ip_info", MetricKind::Untyped)
                .with_sample(MetricSample::new(1.0, 1_634_300_000_123).with_label("mac", "aa")),
        );

        let payload = RemoteWriteSerializer::new().serialize(&families).unwrap();
        let raw = snap::raw::Decoder::new().decompress_vec(&payload.body).unwrap();
        assert_eq!(raw.len(), payload.uncompressed_len);

        let request = WriteRequest::decode(raw.as_slice()).unwrap();
        assert_eq!(request.series_count(), 1);
        assert_eq!(request.timeseries[0].samples[0].timestamp, 1_634_300_000_123);
    }
}
