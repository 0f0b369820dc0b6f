//! Faucet event records as emitted on the event socket.
//!
//! On the wire every payload kind is an independent, optional top-level key
//! (`L3_LEARN`, `PORT_CHANGE`, ...). Here they are folded into a list of
//! [`EventPayload`] values so each payload is a closed sum type, while a record
//! that carries more than one kind still keeps all of them.

use serde::{Deserialize, Deserializer};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawEventRecord")]
pub struct EventRecord {
    pub version: i64,
    /// Seconds since the epoch, sub-second precision.
    pub time: f64,
    pub dp_id: u64,
    pub dp_name: String,
    pub event_id: u64,
    /// Payloads in wire-key order: config, dp, port, L2, L3.
    pub payloads: Vec<EventPayload>,
}

impl EventRecord {
    /// Millisecond timestamp derived from `time`, truncated toward zero.
    pub fn timestamp_ms(&self) -> i64 {
        (self.time * 1000.0) as i64
    }

    pub fn payload(&self) -> Option<&EventPayload> {
        self.payloads.first()
    }

    pub fn l3_learn(&self) -> Option<&L3Learn> {
        self.payloads.iter().find_map(|payload| match payload {
            EventPayload::L3Learn(learn) => Some(learn),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventPayload {
    ConfigChange(ConfigChange),
    DpChange(DpChange),
    PortChange(PortChange),
    L2Learn(L2Learn),
    L3Learn(L3Learn),
}

impl EventPayload {
    /// The wire key this payload was read from.
    pub fn kind(&self) -> &'static str {
        match self {
            EventPayload::ConfigChange(_) => "CONFIG_CHANGE",
            EventPayload::DpChange(_) => "DP_CHANGE",
            EventPayload::PortChange(_) => "PORT_CHANGE",
            EventPayload::L2Learn(_) => "L2_LEARN",
            EventPayload::L3Learn(_) => "L3_LEARN",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ConfigChange {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub restart_type: Option<String>,
    #[serde(default)]
    pub config_hash_info: Option<ConfigHashInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ConfigHashInfo {
    #[serde(deserialize_with = "null_as_default")]
    pub config_files: String,
    #[serde(deserialize_with = "null_as_default")]
    pub hashes: String,
    #[serde(deserialize_with = "null_as_default")]
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DpChange {
    #[serde(deserialize_with = "null_as_default")]
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PortChange {
    #[serde(deserialize_with = "null_as_default")]
    pub port_no: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub reason: String,
    #[serde(deserialize_with = "null_as_default")]
    pub state: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub status: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct L2Learn {
    #[serde(deserialize_with = "null_as_default")]
    pub port_no: u32,
    /// Faucet sends an integer, `null`, or nothing at all. Anything that is
    /// not a port number is read as `None`.
    #[serde(deserialize_with = "lenient_port_no")]
    pub previous_port_no: Option<u32>,
    #[serde(deserialize_with = "null_as_default")]
    pub vid: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub eth_src: String,
    #[serde(deserialize_with = "null_as_default")]
    pub eth_dst: String,
    #[serde(deserialize_with = "null_as_default")]
    pub eth_type: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub l3_src_ip: String,
    #[serde(deserialize_with = "null_as_default")]
    pub l3_dst_ip: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct L3Learn {
    #[serde(deserialize_with = "null_as_default")]
    pub eth_src: String,
    #[serde(deserialize_with = "null_as_default")]
    pub l3_src_ip: String,
    #[serde(deserialize_with = "null_as_default")]
    pub port_no: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub vid: u32,
}

/// Faucet serializes unset scalars as `null`; read them as the zero value.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_port_no<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .and_then(|v| v.as_u64())
        .and_then(|n| u32::try_from(n).ok()))
}

#[derive(Deserialize)]
struct RawEventRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    version: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    time: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    dp_id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    dp_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    event_id: u64,
    #[serde(rename = "CONFIG_CHANGE", default)]
    config_change: Option<ConfigChange>,
    #[serde(rename = "DP_CHANGE", default)]
    dp_change: Option<DpChange>,
    #[serde(rename = "PORT_CHANGE", default)]
    port_change: Option<PortChange>,
    #[serde(rename = "L2_LEARN", default)]
    l2_learn: Option<L2Learn>,
    #[serde(rename = "L3_LEARN", default)]
    l3_learn: Option<L3Learn>,
}

impl From<RawEventRecord> for EventRecord {
    fn from(raw: RawEventRecord) -> Self {
        let payloads = [
            raw.config_change.map(EventPayload::ConfigChange),
            raw.dp_change.map(EventPayload::DpChange),
            raw.port_change.map(EventPayload::PortChange),
            raw.l2_learn.map(EventPayload::L2Learn),
            raw.l3_learn.map(EventPayload::L3Learn),
        ]
        .into_iter()
        .flatten()
        .collect();

        Self {
            version: raw.version,
            time: raw.time,
            dp_id: raw.dp_id,
            dp_name: raw.dp_name,
            event_id: raw.event_id,
            payloads,
        }
    }
}
