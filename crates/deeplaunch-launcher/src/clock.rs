//! Time source for the launch race.
//!
//! Injected so the race can be driven deterministically; under
//! `#[tokio::test(start_paused = true)]` the tokio clock only advances when
//! every task is idle, so timer/visibility orderings are exact.

use std::time::Duration;
use tokio::time::Instant;

/// Monotonic clock with a sleep primitive.
#[trait_variant::make(Clock: Send)]
pub trait LocalClock {
    /// Current instant
    fn now(&self) -> Instant;

    /// Complete after `duration` has elapsed
    async fn sleep(&self, duration: Duration);
}

/// Clock backed by the tokio runtime.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await
    }
}

#[cfg(test)]
mod tests {
    // Only the Send variant; both traits in scope would make `now` ambiguous
    use super::{Clock, Duration, TokioClock};

    #[tokio::test(start_paused = true)]
    async fn test_tokio_clock_sleep_advances_paused_time() {
        let clock = TokioClock;
        let start = clock.now();
        clock.sleep(Duration::from_millis(2500)).await;
        let elapsed = clock.now().duration_since(start);
        assert!(elapsed >= Duration::from_millis(2500));
        assert!(elapsed < Duration::from_millis(2600));
    }
}
