// Retry-read for asynchronously rendered text
//
// The site fills some elements through client-side templating after they
// become visible, so a single read can race the render.

use std::future::Future;
use std::time::Duration;

use crate::error::Result;

/// Bounded retry for text reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            interval: Duration::from_millis(200),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }
}

/// Reads until the text is not whitespace-only, sleeping `interval` after
/// each empty read, for at most `max_attempts` empty reads.
///
/// Returns the last value read even if it is still empty; callers that
/// need text must check.
pub async fn read_until_non_empty<F, Fut>(policy: RetryPolicy, mut read: F) -> Result<String>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<String>>>,
{
    let mut text = String::new();
    let mut attempts = 0;

    while text.trim().is_empty() && attempts < policy.max_attempts {
        text = read().await?.unwrap_or_default();
        if text.trim().is_empty() {
            tokio::time::sleep(policy.interval).await;
            attempts += 1;
        }
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_returns_text_rendered_after_a_delay() {
        let reads = Arc::new(AtomicU32::new(0));
        let counter = reads.clone();
        let text = read_until_non_empty(RetryPolicy::default(), move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            async move { Ok(if n < 4 { Some("  ".to_string()) } else { Some("テスト太郎".to_string()) }) }
        })
        .await
        .unwrap();

        assert_eq!(text, "テスト太郎");
        assert_eq!(reads.load(Ordering::SeqCst), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_attempts_and_returns_last_value() {
        let reads = Arc::new(AtomicU32::new(0));
        let counter = reads.clone();
        let start = tokio::time::Instant::now();
        let text = read_until_non_empty(RetryPolicy::new(3, Duration::from_millis(200)), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok(Some(" \n".to_string())) }
        })
        .await
        .unwrap();

        assert_eq!(text, " \n");
        assert_eq!(reads.load(Ordering::SeqCst), 3);
        assert_eq!(start.elapsed(), Duration::from_millis(600));
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_text_counts_as_empty() {
        let text = read_until_non_empty(RetryPolicy::new(2, Duration::from_millis(10)), || async {
            Ok(None)
        })
        .await
        .unwrap();
        assert!(text.is_empty());
    }
}
