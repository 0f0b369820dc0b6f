use crate::domain::{
    EventPayload, EventRecord, L3Learn, MetricFamilies, MetricFamily, MetricKind, MetricSample,
};
use thiserror::Error;
use tracing::debug;

/// Family emitted for every L3 learn: which MAC holds which IP on which port/VLAN.
pub const MAC_IP_INFO: &str = "faucet_mac_ip_info";

#[derive(Error, Debug)]
pub enum TranslateError {
    #[error("Malformed event record: {0}")]
    MalformedRecord(#[from] serde_json::Error),
}

/// Maps one event line to the metric families it produces.
///
/// Only L3 learns produce metrics today. New payload kinds are mapped by
/// adding an arm to [`EventTranslator::translate_payload`]; nothing else in
/// the pipeline needs to change.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventTranslator;

impl EventTranslator {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, line: &[u8]) -> Result<EventRecord, TranslateError> {
        Ok(serde_json::from_slice(line)?)
    }

    pub fn translate(&self, line: &[u8]) -> Result<MetricFamilies, TranslateError> {
        let record = self.parse(line)?;
        Ok(self.translate_record(&record))
    }

    pub fn translate_record(&self, record: &EventRecord) -> MetricFamilies {
        let mut families = MetricFamilies::new();
        for payload in &record.payloads {
            self.translate_payload(record, payload, &mut families);
        }
        families
    }

    fn translate_payload(
        &self,
        record: &EventRecord,
        payload: &EventPayload,
        families: &mut MetricFamilies,
    ) {
        match payload {
            EventPayload::L3Learn(learn) => {
                debug!(
                    timestamp = ?chrono::DateTime::from_timestamp_millis(record.timestamp_ms()),
                    dp = %record.dp_name,
                    event = ?learn,
                    "Received L3 learn event"
                );
                let sample = mac_ip_info_sample(learn, record.timestamp_ms());
                families
                    .entry(MAC_IP_INFO.to_string())
                    .or_insert_with(|| MetricFamily::new(MAC_IP_INFO, MetricKind::Untyped))
                    .samples
                    .push(sample);
            }
            EventPayload::ConfigChange(_)
            | EventPayload::DpChange(_)
            | EventPayload::PortChange(_)
            | EventPayload::L2Learn(_) => {}
        }
    }
}

fn mac_ip_info_sample(learn: &L3Learn, timestamp_ms: i64) -> MetricSample {
    MetricSample::new(1.0, timestamp_ms)
        .with_label("mac", learn.eth_src.as_str())
        .with_label("ip", learn.l3_src_ip.as_str())
        .with_label("port", learn.port_no.to_string())
        .with_label("vid", learn.vid.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_l3_learn_labels() {
        let families = EventTranslator::new()
            .translate(br#"{"time":2.0005,"L3_LEARN":{"eth_src":"m","l3_src_ip":"i","port_no":7,"vid":8}}"#)
            .unwrap();

        let family = &families[MAC_IP_INFO];
        assert_eq!(family.kind, MetricKind::Untyped);
        let sample = &family.samples[0];
        let keys: Vec<_> = sample.labels.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["ip", "mac", "port", "vid"]);
        assert_eq!(sample.labels["port"], "7");
        assert_eq!(sample.labels["vid"], "8");
        assert_eq!(sample.timestamp_ms, 2000);
        assert!((sample.value - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_object_yields_nothing() {
        let families = EventTranslator::new().translate(b"{}").unwrap();
        assert!(families.is_empty());
    }

    #[test]
    fn test_not_json_is_malformed() {
        let err = EventTranslator::new().translate(b"not json").unwrap_err();
        assert!(matches!(err, TranslateError::MalformedRecord(_)));
    }

    #[test]
    fn test_empty_line_is_malformed() {
        assert!(EventTranslator::new().translate(b"").is_err());
    }
}
