//! Event socket control loop.
//!
//! ```text
//! Disconnected -> Connecting -> Connected -> Disconnected -> (backoff) -> Connecting ...
//!        \____________\_____________\______________ cancel ______________> Shutdown
//! ```
//!
//! One session is one [`StreamReader`]; every line read is translated and
//! delivered before the next read. `retries` only grows across consecutive
//! sessions that see no traffic: any line read resets it to 0, a failed
//! connect does not.

use super::retry::{Backoff, wait_or_cancel};
use crate::collector::{ConnectionHandle, DEFAULT_MAX_RECORD_BYTES, StreamError, StreamReader};
use crate::domain::MetricFamilies;
use crate::parser::EventTranslator;
use crate::sender::MetricSink;
use std::path::PathBuf;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupervisorStatus {
    pub state: ConnectionState,
    pub retries: u32,
    pub connect_attempts: u64,
    pub sessions: u64,
    pub records: u64,
}

impl Default for SupervisorStatus {
    fn default() -> Self {
        Self {
            state: ConnectionState::Disconnected,
            retries: 0,
            connect_attempts: 0,
            sessions: 0,
            records: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    pub socket_path: PathBuf,
    pub max_record_bytes: usize,
    pub backoff: Backoff,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            socket_path: PathBuf::from("/run/faucet/event.sock"),
            max_record_bytes: DEFAULT_MAX_RECORD_BYTES,
            backoff: Backoff::default(),
        }
    }
}

pub struct ReconnectSupervisor<S> {
    config: SupervisorConfig,
    translator: EventTranslator,
    sink: S,
    connection: ConnectionHandle,
    status: watch::Sender<SupervisorStatus>,
}

impl<S: MetricSink> ReconnectSupervisor<S> {
    /// `connection` is the handle the shutdown task closes; the supervisor
    /// attaches each session's connection to it.
    pub fn new(config: SupervisorConfig, sink: S, connection: ConnectionHandle) -> Self {
        let (status, _) = watch::channel(SupervisorStatus::default());
        Self {
            config,
            translator: EventTranslator::new(),
            sink,
            connection,
            status,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SupervisorStatus> {
        self.status.subscribe()
    }

    pub fn status(&self) -> SupervisorStatus {
        *self.status.borrow()
    }

    /// Runs until `cancel` fires. Never returns early on socket, parse or
    /// delivery failures.
    pub async fn run(self, cancel: CancellationToken) {
        info!(socket = %self.config.socket_path.display(), "Starting event socket supervisor");

        while !cancel.is_cancelled() {
            self.run_session(&cancel).await;

            if cancel.is_cancelled() {
                break;
            }

            self.update(|status| status.state = ConnectionState::Disconnected);

            let retries = self.status().retries;
            let delay = self.config.backoff.delay(retries);
            info!(retries, backoff = ?delay, "Waiting before reconnecting to event socket");

            if !wait_or_cancel(delay, &cancel).await {
                break;
            }

            self.update(|status| status.retries = status.retries.saturating_add(1));
        }

        self.update(|status| status.state = ConnectionState::Shutdown);
        info!("Event socket supervisor stopped");
    }

    async fn run_session(&self, cancel: &CancellationToken) {
        self.update(|status| {
            status.state = ConnectionState::Connecting;
            status.connect_attempts += 1;
        });

        let mut reader =
            match StreamReader::connect(&self.config.socket_path, self.config.max_record_bytes)
                .await
            {
                Ok(reader) => reader,
                Err(e) => {
                    error!(error = %e, "Failed to connect to event socket");
                    return;
                }
            };

        self.connection.attach(reader.closer());
        // Shutdown may have fired between the connect and the attach.
        if cancel.is_cancelled() {
            reader.close();
        }

        self.update(|status| {
            status.state = ConnectionState::Connected;
            status.sessions += 1;
        });

        loop {
            match reader.next_record().await {
                Ok(Some(line)) => {
                    self.handle_line(&line).await;
                    self.update(|status| {
                        status.retries = 0;
                        status.records += 1;
                    });
                }
                Ok(None) => {
                    info!("Got EOF from event socket");
                    break;
                }
                Err(StreamError::Interrupted) => {
                    debug!("Event socket read interrupted by local close");
                    break;
                }
                Err(e) => {
                    error!(error = %e, "Error reading from event socket");
                    break;
                }
            }

            if cancel.is_cancelled() {
                break;
            }
        }

        self.connection.detach();
    }

    /// Translates and delivers one line. A malformed line still results in an
    /// (empty) delivery.
    async fn handle_line(&self, line: &[u8]) {
        let families = match self.translator.translate(line) {
            Ok(families) => families,
            Err(e) => {
                error!(
                    error = %e,
                    message = %String::from_utf8_lossy(line),
                    "Failed to parse event record"
                );
                MetricFamilies::new()
            }
        };

        if let Err(e) = self.sink.deliver(&families).await {
            error!(
                error = %e,
                recoverable = e.is_recoverable(),
                "Unable to send remote write request"
            );
        }
    }

    fn update(&self, f: impl FnOnce(&mut SupervisorStatus)) {
        self.status.send_modify(f);
    }
}

impl<S> std::fmt::Debug for ReconnectSupervisor<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReconnectSupervisor")
            .field("config", &self.config)
            .field("status", &*self.status.borrow())
            .finish_non_exhaustive()
    }
}
