use super::config::{LogFormat, LogLevel};
use super::initialization::InitializationError;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// HTTP stack targets that are noisy below `warn`.
const QUIET_TARGETS: &[&str] = &["hyper", "reqwest", "h2", "rustls"];

#[derive(Debug, Clone)]
pub struct LoggingSystem {
    directives: Vec<String>,
    format: LogFormat,
}

impl LoggingSystem {
    pub fn new(format: LogFormat) -> Self {
        Self {
            directives: Vec::new(),
            format,
        }
    }

    /// Adds one `target=level` directive; rejected if `EnvFilter` cannot parse it.
    pub fn add_directive(&mut self, directive: &str) -> Result<(), InitializationError> {
        directive
            .parse::<Directive>()
            .map_err(|source| InitializationError::InvalidDirective {
                input: directive.to_string(),
                source,
            })?;
        self.directives.push(directive.to_string());
        Ok(())
    }

    pub fn add_default_directives(&mut self) -> Result<(), InitializationError> {
        for target in QUIET_TARGETS {
            self.add_directive(&format!("{target}=warn"))?;
        }
        Ok(())
    }

    pub fn build_filter_string(&self, level: LogLevel) -> String {
        std::iter::once(level.as_str())
            .chain(self.directives.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn directive_count(&self) -> usize {
        self.directives.len()
    }

    /// Installs the global subscriber. Fails if one is already installed.
    pub fn initialize_tracing(&self, level: LogLevel) -> Result<(), InitializationError> {
        let filter_string = self.build_filter_string(level);
        let env_filter = EnvFilter::try_new(&filter_string).map_err(|e| {
            InitializationError::LoggingInitFailed {
                details: format!("Failed to create EnvFilter with '{filter_string}'"),
                source: Box::new(e),
            }
        })?;

        let registry = tracing_subscriber::registry().with(env_filter);
        let result = match self.format {
            LogFormat::Text => tracing::subscriber::set_global_default(
                registry.with(
                    fmt::layer()
                        .with_writer(std::io::stdout)
                        .with_target(true)
                        .with_level(true),
                ),
            ),
            LogFormat::Json => tracing::subscriber::set_global_default(
                registry.with(
                    fmt::layer()
                        .json()
                        .with_writer(std::io::stdout)
                        .with_current_span(false),
                ),
            ),
        };

        result.map_err(|e| InitializationError::LoggingInitFailed {
            details: "Failed to set global tracing subscriber".to_string(),
            source: Box::new(e),
        })
    }
}

/// Builds the default logging system and installs it.
pub fn setup_logging(level: LogLevel, format: LogFormat) -> Result<(), InitializationError> {
    let mut logging_system = LoggingSystem::new(format);
    logging_system.add_default_directives()?;
    logging_system.initialize_tracing(level)
}
