use super::initialization::InitializationError;
use crate::collector::ConnectionHandle;
use tokio::signal::unix::{SignalKind, signal as unix_signal};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Cancels the control loop and force-closes whatever event socket
/// connection is currently open, so a blocked read returns at once.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    cancel: CancellationToken,
    connection: ConnectionHandle,
}

impl ShutdownHandle {
    pub fn new(cancel: CancellationToken, connection: ConnectionHandle) -> Self {
        Self { cancel, connection }
    }

    pub fn token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn connection(&self) -> ConnectionHandle {
        self.connection.clone()
    }

    pub fn is_shutdown(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn shutdown(&self) {
        info!("Cleaning up and exiting");
        self.cancel.cancel();
        if self.connection.close() {
            info!("Closed event socket connection");
        }
    }
}

#[derive(Debug)]
pub struct SignalHandler;

impl SignalHandler {
    /// Spawns the task that waits for SIGINT or SIGTERM and then calls
    /// [`ShutdownHandle::shutdown`]. The task also ends quietly if the
    /// handle is cancelled some other way.
    pub fn spawn(handle: ShutdownHandle) -> Result<JoinHandle<()>, InitializationError> {
        let mut sigterm =
            unix_signal(SignalKind::terminate()).map_err(InitializationError::SignalHandler)?;
        let mut sigint =
            unix_signal(SignalKind::interrupt()).map_err(InitializationError::SignalHandler)?;
        let token = handle.token();

        Ok(tokio::spawn(async move {
            tokio::select! {
                () = token.cancelled() => return,
                received = sigint.recv() => {
                    if received.is_none() {
                        error!("SIGINT listener closed");
                        return;
                    }
                    info!("Received SIGINT, shutting down");
                }
                received = sigterm.recv() => {
                    if received.is_none() {
                        error!("SIGTERM listener closed");
                        return;
                    }
                    info!("Received SIGTERM, shutting down");
                }
            }

            handle.shutdown();
        }))
    }
}
