use parking_lot::Mutex;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Shared reference to whichever event socket connection is currently open.
///
/// The supervisor attaches the session's close token when it connects and
/// detaches it when the session ends; the shutdown task calls [`close`]
/// from any thread, concurrently with a read in progress.
///
/// [`close`]: ConnectionHandle::close
#[derive(Debug, Clone, Default)]
pub struct ConnectionHandle {
    active: Arc<Mutex<Option<CancellationToken>>>,
}

impl ConnectionHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&self, closer: CancellationToken) {
        *self.active.lock() = Some(closer);
    }

    pub fn detach(&self) {
        self.active.lock().take();
    }

    pub fn is_attached(&self) -> bool {
        self.active.lock().is_some()
    }

    /// Force-closes the active connection. Returns false if none was open.
    pub fn close(&self) -> bool {
        match self.active.lock().take() {
            Some(closer) => {
                debug!("Force-closing active event socket connection");
                closer.cancel();
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_close_without_connection() {
        let handle = ConnectionHandle::new();
        assert!(!handle.close());
    }

    #[test]
    fn test_close_cancels_attached_token() {
        let handle = ConnectionHandle::new();
        let token = CancellationToken::new();
        handle.attach(token.clone());
        assert!(handle.is_attached());

        let shared = handle.clone();
        assert!(shared.close());
        assert!(token.is_cancelled());
        assert!(!handle.is_attached());
    }

    #[test]
    fn test_detach_leaves_token_untouched() {
        let handle = ConnectionHandle::new();
        let token = CancellationToken::new();
        handle.attach(token.clone());
        handle.detach();
        assert!(!handle.close());
        assert!(!token.is_cancelled());
    }
}
