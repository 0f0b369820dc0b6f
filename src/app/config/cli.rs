use super::{ConfigError, LogFormat, LogLevel};
use crate::collector::DEFAULT_MAX_RECORD_BYTES;
use crate::reliability::{Backoff, SupervisorConfig};
use crate::sender::ClientConfig;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "faucet_agent",
    version = concat!("v", env!("CARGO_PKG_VERSION")),
    about = "Forwards Faucet controller events to a Prometheus remote write endpoint",
    long_about = None
)]
pub struct Config {
    /// Path to the Faucet event socket
    #[arg(
        long,
        env = "FAUCET_AGENT_EVENT_SOCKET",
        default_value = "/run/faucet/event.sock"
    )]
    pub event_socket: PathBuf,

    /// Prometheus remote write URI
    #[arg(
        long,
        env = "FAUCET_AGENT_PROMETHEUS_REMOTE_WRITE_URI",
        default_value = "http://localhost:9090/api/v1/write"
    )]
    pub prometheus_remote_write_uri: String,

    /// Log level
    #[arg(long, env = "FAUCET_AGENT_LOG_LEVEL", default_value = "info")]
    pub log_level: LogLevel,

    /// Log output format
    #[arg(long, env = "FAUCET_AGENT_LOG_FORMAT", default_value = "text")]
    pub log_format: LogFormat,

    /// Base reconnect delay in seconds
    #[arg(long, env = "FAUCET_AGENT_INITIAL_BACKOFF_SECS", default_value = "5")]
    pub initial_backoff_secs: u64,

    /// Upper bound on the reconnect delay in seconds
    #[arg(long, env = "FAUCET_AGENT_MAX_BACKOFF_SECS", default_value = "300")]
    pub max_backoff_secs: u64,

    /// Remote write request timeout in seconds
    #[arg(
        long,
        env = "FAUCET_AGENT_REMOTE_WRITE_TIMEOUT_SECS",
        default_value = "15"
    )]
    pub remote_write_timeout_secs: u64,

    /// Longest accepted event record in bytes
    #[arg(long, env = "FAUCET_AGENT_MAX_RECORD_BYTES", default_value = "65536")]
    pub max_record_bytes: usize,

    /// Derived fields (not CLI arguments)
    #[arg(skip)]
    pub initial_backoff: Duration,

    #[arg(skip)]
    pub max_backoff: Duration,

    #[arg(skip)]
    pub remote_write_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            event_socket: PathBuf::from("/run/faucet/event.sock"),
            prometheus_remote_write_uri: "http://localhost:9090/api/v1/write".to_string(),
            log_level: LogLevel::Info,
            log_format: LogFormat::Text,
            initial_backoff_secs: 5,
            max_backoff_secs: 300,
            remote_write_timeout_secs: 15,
            max_record_bytes: DEFAULT_MAX_RECORD_BYTES,
            initial_backoff: Duration::from_secs(5),
            max_backoff: Duration::from_secs(300),
            remote_write_timeout: Duration::from_secs(15),
        }
    }
}

impl Config {
    /// Parses flags (falling back to `FAUCET_AGENT_*` variables), then fills
    /// and validates the derived fields.
    ///
    /// `--help` and `--version` come back as [`ConfigError::Cli`]; the caller
    /// decides how to print them.
    pub fn from_args<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let mut config = Config::try_parse_from(args)?;
        config.post_process()?;
        config.validate()?;
        Ok(config)
    }

    pub fn post_process(&mut self) -> Result<(), ConfigError> {
        self.initial_backoff = Duration::from_secs(self.initial_backoff_secs);
        self.max_backoff = Duration::from_secs(self.max_backoff_secs);
        self.remote_write_timeout = Duration::from_secs(self.remote_write_timeout_secs);
        Ok(())
    }

    pub fn backoff(&self) -> Backoff {
        Backoff::new(self.initial_backoff, self.max_backoff)
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            endpoint: self.prometheus_remote_write_uri.clone(),
            timeout: self.remote_write_timeout,
            ..ClientConfig::default()
        }
    }

    pub fn supervisor_config(&self) -> SupervisorConfig {
        SupervisorConfig {
            socket_path: self.event_socket.clone(),
            max_record_bytes: self.max_record_bytes,
            backoff: self.backoff(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_process_fills_durations() {
        let mut config = Config {
            initial_backoff_secs: 1,
            max_backoff_secs: 30,
            remote_write_timeout_secs: 2,
            ..Config::default()
        };
        config.post_process().unwrap();

        assert_eq!(
            config.backoff(),
            Backoff::new(Duration::from_secs(1), Duration::from_secs(30))
        );
        assert_eq!(config.client_config().timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_supervisor_config() {
        let config = Config {
            event_socket: PathBuf::from("/tmp/faucet.sock"),
            max_record_bytes: 1024,
            ..Config::default()
        };
        let supervisor = config.supervisor_config();
        assert_eq!(supervisor.socket_path, PathBuf::from("/tmp/faucet.sock"));
        assert_eq!(supervisor.max_record_bytes, 1024);
        assert_eq!(supervisor.backoff, Backoff::default());
    }

    #[test]
    fn test_client_config_keeps_user_agent() {
        let client = Config::default().client_config();
        assert_eq!(client.endpoint, "http://localhost:9090/api/v1/write");
        assert!(client.user_agent.starts_with("faucet_agent/"));
    }
}
