use crate::error::{ComponentsError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::debug;

pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 2;
pub const SLOW_POLL_INTERVAL_SECS: u64 = 5;
pub const SLOW_POLL_AFTER_SECS: u64 = 30;

/// Poll interval that steps up once a wait has run for a while.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSchedule {
    pub initial_interval: Duration,
    pub slow_interval: Duration,
    pub slow_after: Duration,
}

impl Default for PollSchedule {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            slow_interval: Duration::from_secs(SLOW_POLL_INTERVAL_SECS),
            slow_after: Duration::from_secs(SLOW_POLL_AFTER_SECS),
        }
    }
}

impl PollSchedule {
    pub fn interval_at(&self, elapsed: Duration) -> Duration {
        if elapsed > self.slow_after {
            self.slow_interval
        } else {
            self.initial_interval
        }
    }
}

/// Fetches until `is_terminal` holds or `max_wait` elapses.
///
/// The deadline is checked before every fetch. A fetch error ends the wait
/// immediately; only a non-terminal result is retried.
pub async fn wait_for<T, F, Fut, P>(
    max_wait: Duration,
    schedule: &PollSchedule,
    mut fetch: F,
    is_terminal: P,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
    P: Fn(&T) -> bool,
{
    let started = Instant::now();
    let mut attempts = 0u32;

    loop {
        if started.elapsed() >= max_wait {
            debug!(attempts, ?max_wait, "polling deadline reached");
            return Err(ComponentsError::Timeout(max_wait));
        }

        let current = fetch().await?;
        attempts += 1;
        if is_terminal(&current) {
            return Ok(current);
        }

        sleep(schedule.interval_at(started.elapsed())).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast() -> PollSchedule {
        PollSchedule {
            initial_interval: Duration::from_millis(5),
            slow_interval: Duration::from_millis(10),
            slow_after: Duration::from_millis(20),
        }
    }

    #[test]
    fn test_interval_steps_up() {
        let schedule = PollSchedule::default();
        assert_eq!(schedule.interval_at(Duration::from_secs(1)), Duration::from_secs(2));
        assert_eq!(schedule.interval_at(Duration::from_secs(30)), Duration::from_secs(2));
        assert_eq!(schedule.interval_at(Duration::from_secs(31)), Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_returns_on_terminal() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let res = wait_for(
            Duration::from_secs(5),
            &fast(),
            || async move { Ok(counter.fetch_add(1, Ordering::SeqCst) + 1) },
            |n| *n == 3,
        )
        .await
        .unwrap();
        assert_eq!(res, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_timeout() {
        let res = wait_for(
            Duration::from_millis(40),
            &fast(),
            || async { Ok("processing") },
            |s| *s == "succeeded",
        )
        .await;
        assert!(matches!(res, Err(ComponentsError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_fetch_error_aborts() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let res: Result<u32> = wait_for(
            Duration::from_secs(5),
            &fast(),
            || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(ComponentsError::Other("boom".to_string()))
            },
            |_| false,
        )
        .await;
        assert!(matches!(res, Err(ComponentsError::Other(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_zero_wait_never_fetches() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let res = wait_for(
            Duration::ZERO,
            &fast(),
            || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            },
            |_| true,
        )
        .await;
        assert!(matches!(res, Err(ComponentsError::Timeout(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
