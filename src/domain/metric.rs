use std::collections::BTreeMap;

/// Label set of one sample. Keys are unique by construction.
pub type Labels = BTreeMap<String, String>;

/// Families keyed by family name; iteration order is the sorted name order
/// the remote write request is built in.
pub type MetricFamilies = BTreeMap<String, MetricFamily>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// Presence/info style metric without counter or gauge semantics.
    Untyped,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricSample {
    pub labels: Labels,
    pub value: f64,
    /// Milliseconds since the epoch; 0 means "stamp at send time".
    pub timestamp_ms: i64,
}

impl MetricSample {
    pub fn new(value: f64, timestamp_ms: i64) -> Self {
        Self {
            labels: Labels::new(),
            value,
            timestamp_ms,
        }
    }

    pub fn with_label(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(name.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricFamily {
    pub name: String,
    pub help: String,
    pub kind: MetricKind,
    pub samples: Vec<MetricSample>,
}

impl MetricFamily {
    pub fn new(name: impl Into<String>, kind: MetricKind) -> Self {
        Self {
            name: name.into(),
            help: String::new(),
            kind,
            samples: Vec::new(),
        }
    }

    pub fn with_sample(mut self, sample: MetricSample) -> Self {
        self.samples.push(sample);
        self
    }
}
