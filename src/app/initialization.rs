use thiserror::Error;

#[derive(Error, Debug)]
pub enum InitializationError {
    #[error("Invalid log directive '{input}'")]
    InvalidDirective {
        input: String,
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },

    #[error("Logging system initialization failed: {details}")]
    LoggingInitFailed {
        details: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Signal handler installation failed")]
    SignalHandler(#[source] std::io::Error),
}
