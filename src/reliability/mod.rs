pub mod retry;
pub mod supervisor;

pub use retry::{Backoff, DEFAULT_INITIAL_BACKOFF, DEFAULT_MAX_BACKOFF, wait_or_cancel};
pub use supervisor::{ConnectionState, ReconnectSupervisor, SupervisorConfig, SupervisorStatus};
