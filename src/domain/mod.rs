//! Domain layer for faucet-agent.
//!
//! Contains the canonical types shared across all modules:
//! - `EventRecord`: one decoded line from the Faucet event socket
//! - `MetricFamily` / `MetricSample`: what gets written to Prometheus
//! - `AgentError`: Top-level error type

pub mod error;
pub mod event;
pub mod metric;

pub use error::AgentError;
pub use event::{
    ConfigChange, ConfigHashInfo, DpChange, EventPayload, EventRecord, L2Learn, L3Learn,
    PortChange,
};
pub use metric::{Labels, MetricFamilies, MetricFamily, MetricKind, MetricSample};
