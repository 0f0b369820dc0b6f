use thiserror::Error;

/// Top-level error type for agent startup.
///
/// Everything past startup is handled (logged) where it happens; only the
/// errors below ever reach the process exit code.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Configuration error: {0}")]
    Config(#[from] crate::app::ConfigError),

    #[error("Initialization error: {0}")]
    Initialization(#[from] crate::app::InitializationError),

    #[error("Remote write client error: {0}")]
    Client(#[from] crate::sender::DeliveryError),
}
