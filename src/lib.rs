#![deny(rust_2024_compatibility)]
// Specific pedantic lints enforced (not blanket allow):
#![deny(
    clippy::explicit_iter_loop,
    clippy::manual_let_else,
    clippy::semicolon_if_nothing_returned,
    clippy::inconsistent_struct_constructor
)]
#![allow(
    clippy::cast_possible_truncation, // Event times are bounded epoch seconds
    clippy::cast_precision_loss,      // Acceptable for latency display
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::doc_markdown
)]

pub mod app;
pub mod collector;
pub mod domain;
pub mod parser;
pub mod reliability;
pub mod sender;

pub use app::{App, Config};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Binary name, used as the user agent prefix and the env var prefix.
pub const BIN_NAME: &str = "faucet_agent";
