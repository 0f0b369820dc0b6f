use rand::Rng;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_secs(5);
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(5 * 60);

/// Reconnect delay: `initial + 2^retries s + jitter`, capped at `max`.
///
/// Jitter is a whole number of seconds drawn uniformly from
/// `[0, 2^retries / 2)`, so the first retry (`retries == 0`) has none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    pub initial: Duration,
    pub max: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            initial: DEFAULT_INITIAL_BACKOFF,
            max: DEFAULT_MAX_BACKOFF,
        }
    }
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self { initial, max }
    }

    pub fn delay(&self, retries: u32) -> Duration {
        self.delay_with_rng(retries, &mut rand::rng())
    }

    pub fn delay_with_rng<R: Rng>(&self, retries: u32, rng: &mut R) -> Duration {
        let expo = 1_u64.checked_shl(retries).unwrap_or(u64::MAX);
        let half = expo / 2;

        let jitter = if half >= 1 {
            rng.random_range(0..half)
        } else {
            0
        };

        let delay = self
            .initial
            .saturating_add(Duration::from_secs(expo.saturating_add(jitter)));
        delay.min(self.max)
    }
}

/// Sleeps for `delay` unless `cancel` fires first. Returns false when cancelled.
pub async fn wait_or_cancel(delay: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        () = cancel.cancelled() => false,
        () = tokio::time::sleep(delay) => true,
    }
}
