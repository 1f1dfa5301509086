use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

pub const POLL_INTERVAL_MS: u64 = 100;

/// Polls `check` until it yields a value or `timeout` elapses.
///
/// The check always runs at least once, so a zero timeout is a single check.
/// Absence is reported as `None`; this never fails.
pub async fn wait_until<T, F, Fut>(timeout: Duration, interval: Duration, mut check: F) -> Option<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    let start = Instant::now();
    loop {
        if let Some(found) = check().await {
            return Some(found);
        }
        if start.elapsed() >= timeout {
            return None;
        }
        tokio::time::sleep(interval).await;
    }
}

pub async fn poll_until<T, F, Fut>(timeout: Duration, check: F) -> Option<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    wait_until(timeout, Duration::from_millis(POLL_INTERVAL_MS), check).await
}
