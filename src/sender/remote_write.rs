//! Prometheus remote write (v1) protobuf messages and the conversion from
//! metric families.
//!
//! The message layout mirrors `prompb/types.proto` and `prompb/remote.proto`;
//! only the fields the agent writes are declared.

use crate::domain::{Labels, MetricFamilies, MetricKind};

/// Label carrying the family name on every series.
pub const METRIC_NAME_LABEL: &str = "__name__";

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WriteRequest {
    #[prost(message, repeated, tag = "1")]
    pub timeseries: Vec<TimeSeries>,
    #[prost(message, repeated, tag = "3")]
    pub metadata: Vec<MetricMetadata>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TimeSeries {
    #[prost(message, repeated, tag = "1")]
    pub labels: Vec<Label>,
    #[prost(message, repeated, tag = "2")]
    pub samples: Vec<Sample>,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct Label {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub value: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Sample {
    #[prost(double, tag = "1")]
    pub value: f64,
    #[prost(int64, tag = "2")]
    pub timestamp: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MetricMetadata {
    #[prost(enumeration = "MetricType", tag = "1")]
    pub r#type: i32,
    #[prost(string, tag = "2")]
    pub metric_family_name: String,
    #[prost(string, tag = "4")]
    pub help: String,
    #[prost(string, tag = "5")]
    pub unit: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum MetricType {
    Unknown = 0,
    Counter = 1,
    Gauge = 2,
    Histogram = 3,
    GaugeHistogram = 4,
    Summary = 5,
    Info = 6,
    StateSet = 7,
}

impl From<MetricKind> for MetricType {
    fn from(kind: MetricKind) -> Self {
        match kind {
            MetricKind::Untyped => MetricType::Unknown,
        }
    }
}

impl WriteRequest {
    /// Builds a request with one series per sample and one metadata entry per
    /// family, in family name order.
    ///
    /// Series labels are `__name__` plus the sample's labels, sorted by name.
    /// Samples without a timestamp are stamped with the current time.
    pub fn from_families(families: &MetricFamilies) -> Self {
        let mut request = WriteRequest::default();
        let now_ms = chrono::Utc::now().timestamp_millis();

        for (name, family) in families {
            request.metadata.push(MetricMetadata {
                r#type: MetricType::from(family.kind) as i32,
                metric_family_name: family.name.clone(),
                help: family.help.clone(),
                unit: String::new(),
            });

            for sample in &family.samples {
                let mut labels = Labels::new();
                labels.insert(METRIC_NAME_LABEL.to_string(), name.clone());
                labels.extend(sample.labels.iter().map(|(k, v)| (k.clone(), v.clone())));

                let timestamp = if sample.timestamp_ms == 0 {
                    now_ms
                } else {
                    sample.timestamp_ms
                };

                request.timeseries.push(TimeSeries {
                    labels: labels
                        .into_iter()
                        .map(|(name, value)| Label { name, value })
                        .collect(),
                    samples: vec![Sample {
                        value: sample.value,
                        timestamp,
                    }],
                });
            }
        }

        request
    }

    pub fn series_count(&self) -> usize {
        self.timeseries.len()
    }
}
