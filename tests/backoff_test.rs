use faucet_agent::reliability::{Backoff, DEFAULT_MAX_BACKOFF};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::Duration;

#[test]
fn test_first_retry_is_initial_plus_one_second() {
    let backoff = Backoff::new(Duration::from_secs(5), Duration::from_secs(300));
    let mut rng = StdRng::seed_from_u64(7);
    assert_eq!(backoff.delay_with_rng(0, &mut rng), Duration::from_secs(6));
}

#[test]
fn test_large_retry_count_hits_max() {
    let backoff = Backoff::default();
    let mut rng = StdRng::seed_from_u64(7);
    assert_eq!(backoff.delay_with_rng(10, &mut rng), DEFAULT_MAX_BACKOFF);
}

#[test]
fn test_jitter_stays_in_range() {
    let backoff = Backoff::new(Duration::from_secs(5), Duration::from_secs(3600));
    let mut rng = StdRng::seed_from_u64(42);

    for retries in 1..=8_u32 {
        let expo = 1_u64 << retries;
        for _ in 0..100 {
            let delay = backoff.delay_with_rng(retries, &mut rng);
            assert!(delay >= Duration::from_secs(5 + expo));
            assert!(delay < Duration::from_secs(5 + expo + expo / 2));
        }
    }
}

#[test]
fn test_never_exceeds_max() {
    let backoff = Backoff::new(Duration::from_secs(5), Duration::from_secs(20));
    let mut rng = StdRng::seed_from_u64(1);
    for retries in 0..100 {
        assert!(backoff.delay_with_rng(retries, &mut rng) <= Duration::from_secs(20));
    }
}
