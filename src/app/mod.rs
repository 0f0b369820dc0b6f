pub mod config;
pub mod initialization;
pub mod logging_system;
pub mod shutdown;

pub use config::{Config, ConfigError, LogFormat, LogLevel};
pub use initialization::InitializationError;
pub use logging_system::{LoggingSystem, setup_logging};
pub use shutdown::{ShutdownHandle, SignalHandler};

use crate::collector::ConnectionHandle;
use crate::domain::AgentError;
use crate::reliability::ReconnectSupervisor;
use crate::sender::RemoteWriteClient;
use clap::error::ErrorKind;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

pub struct App {
    config: Config,
    client: RemoteWriteClient,
}

impl App {
    pub fn from_args<I, T>(args: I) -> Result<Self, AgentError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let config = Config::from_args(args)?;
        Self::from_config(config)
    }

    pub fn from_config(config: Config) -> Result<Self, AgentError> {
        let client = RemoteWriteClient::new(config.client_config())?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn client(&self) -> &RemoteWriteClient {
        &self.client
    }

    /// Runs until SIGINT or SIGTERM.
    pub async fn run(self) -> Result<(), AgentError> {
        let shutdown = ShutdownHandle::new(CancellationToken::new(), ConnectionHandle::new());
        let signals = SignalHandler::spawn(shutdown.clone())?;

        info!("faucet_agent is running. Press Ctrl+C to stop.");
        self.run_until(shutdown.clone()).await;

        shutdown.token().cancel();
        if let Err(e) = signals.await {
            error!(error = %e, "Signal handler task failed");
        }
        Ok(())
    }

    /// Runs the control loop until `shutdown` fires.
    pub async fn run_until(self, shutdown: ShutdownHandle) {
        info!(
            event_socket = %self.config.event_socket.display(),
            remote_write = %self.client.endpoint(),
            "Configuration loaded"
        );

        let supervisor = ReconnectSupervisor::new(
            self.config.supervisor_config(),
            self.client.clone(),
            shutdown.connection(),
        );
        supervisor.run(shutdown.token()).await;

        let stats = self.client.connection_stats();
        info!(
            total_requests = stats.total_requests,
            failed_requests = stats.failed_requests,
            "faucet_agent stopped"
        );
    }
}

/// Process entry point; returns the exit code.
pub async fn main() -> i32 {
    let config = match Config::from_args(std::env::args_os()) {
        Ok(config) => config,
        Err(ConfigError::Cli(e)) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
        }
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return 1;
        }
    };

    if let Err(e) = setup_logging(config.log_level, config.log_format) {
        eprintln!("Failed to initialize logging: {e}");
        return 1;
    }

    info!(version = crate::VERSION, "Starting faucet_agent");

    let app = match App::from_config(config) {
        Ok(app) => app,
        Err(e) => {
            error!(error = %e, "Failed to create remote write client");
            return 1;
        }
    };

    match app.run().await {
        Ok(()) => 0,
        Err(e) => {
            error!(error = %e, "Application error");
            1
        }
    }
}
