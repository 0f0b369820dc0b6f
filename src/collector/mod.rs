//! Event socket side of the pipeline.
//!
//! `StreamReader` owns one connection to the Faucet event socket and hands out
//! one line at a time. `ConnectionHandle` lets another task force the active
//! connection closed, which is the only way to interrupt a pending read.

pub mod connection;
pub mod stream;

pub use connection::ConnectionHandle;
pub use stream::{DEFAULT_MAX_RECORD_BYTES, StreamError, StreamReader};
