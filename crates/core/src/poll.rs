// iOS Tunnel Manager - Deadline-Bounded Polling

use std::time::{Duration, Instant};

/// Run `check` until it produces a value or the deadline passes.
///
/// The check always runs at least once, so an already-expired deadline
/// still observes current state without blocking. Between checks the task
/// sleeps cooperatively for `interval` (capped at the time remaining).
pub async fn poll_until<T, F>(deadline: Instant, interval: Duration, mut check: F) -> Option<T>
where
    F: FnMut() -> Option<T>,
{
    loop {
        if let Some(value) = check() {
            return Some(value);
        }
        let now = Instant::now();
        if now >= deadline {
            return None;
        }
        tokio::time::sleep(interval.min(deadline - now)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: Duration = Duration::from_millis(10);

    #[tokio::test]
    async fn returns_immediately_on_first_success() {
        let start = Instant::now();
        let result = poll_until(start + Duration::from_secs(5), INTERVAL, || Some(42)).await;
        assert_eq!(result, Some(42));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn expired_deadline_still_checks_once() {
        let mut calls = 0;
        let result = poll_until(Instant::now() - Duration::from_secs(1), INTERVAL, || {
            calls += 1;
            Some("seen")
        })
        .await;
        assert_eq!(result, Some("seen"));
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn gives_up_at_deadline() {
        let start = Instant::now();
        let result: Option<()> =
            poll_until(start + Duration::from_millis(50), INTERVAL, || None).await;
        assert_eq!(result, None);
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn retries_until_check_succeeds() {
        let start = Instant::now();
        let mut calls = 0;
        let result = poll_until(start + Duration::from_secs(5), INTERVAL, || {
            calls += 1;
            (calls >= 3).then_some(calls)
        })
        .await;
        assert_eq!(result, Some(3));
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
