// Bounded waits
//
// Every wait polls the tab until a condition holds or the timeout elapses,
// the same loop shape as auto-retrying assertions.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use regex::Regex;

use crate::driver::{BrowserTab, Selector};
use crate::error::{Error, Result};

/// Default polling interval (100ms)
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Polls `condition` until it returns true or `timeout` elapses.
///
/// Returns `Ok(false)` on timeout; engine errors propagate.
pub async fn poll_until<F, Fut>(timeout: Duration, poll: Duration, mut condition: F) -> Result<bool>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let start = Instant::now();
    loop {
        if condition().await? {
            return Ok(true);
        }
        if start.elapsed() >= timeout {
            return Ok(false);
        }
        tokio::time::sleep(poll).await;
    }
}

/// Waits for the element to become visible.
pub async fn wait_for_visible(tab: &dyn BrowserTab, selector: &Selector, timeout: Duration) -> Result<()> {
    let visible = poll_until(timeout, DEFAULT_POLL_INTERVAL, || tab.is_visible(selector)).await?;
    if visible {
        Ok(())
    } else {
        Err(Error::ElementNotFound(selector.to_string()))
    }
}

/// Waits until the tab URL matches `pattern`.
///
/// Fails with [`Error::Timeout`] naming the last URL seen.
pub async fn wait_for_url(tab: &dyn BrowserTab, pattern: &Regex, timeout: Duration) -> Result<()> {
    let matched = poll_until(timeout, DEFAULT_POLL_INTERVAL, || async {
        Ok(pattern.is_match(&tab.url()))
    })
    .await?;
    if matched {
        Ok(())
    } else {
        Err(Error::Timeout(format!(
            "URL did not match /{}/ within {:?}, last URL: {}",
            pattern.as_str(),
            timeout,
            tab.url()
        )))
    }
}

/// Waits until at least one element matching `css` is displayed.
pub async fn wait_for_displayed(tab: &dyn BrowserTab, css: &str, timeout: Duration) -> Result<()> {
    let shown = poll_until(timeout, DEFAULT_POLL_INTERVAL, || async {
        Ok::<_, Error>(tab.displayed_count(css).await? > 0)
    })
    .await?;
    if shown {
        Ok(())
    } else {
        Err(Error::Timeout(format!("no '{}' displayed within {:?}", css, timeout)))
    }
}

/// Which of two raced signals fired first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirstSignal {
    First,
    Second,
    /// Neither fired before the timeout (or both gave up)
    Neither,
}

/// Waits for the first of {signal A, signal B, timeout}.
///
/// A signal that fails (its own bounded wait lapsing, or an engine error)
/// drops out of the race without deciding it: the other signal keeps
/// running until it fires or the overall timeout elapses. Nothing here is
/// fatal; the caller inspects page state afterwards.
pub async fn first_of<A, B>(signal_a: A, signal_b: B, timeout: Duration) -> FirstSignal
where
    A: Future<Output = Result<()>>,
    B: Future<Output = Result<()>>,
{
    let race = async move {
        tokio::pin!(signal_a);
        tokio::pin!(signal_b);
        let mut a_done = false;
        let mut b_done = false;

        while !(a_done && b_done) {
            tokio::select! {
                outcome = &mut signal_a, if !a_done => match outcome {
                    Ok(()) => return FirstSignal::First,
                    Err(e) => {
                        tracing::debug!("first signal lapsed: {}", e);
                        a_done = true;
                    }
                },
                outcome = &mut signal_b, if !b_done => match outcome {
                    Ok(()) => return FirstSignal::Second,
                    Err(e) => {
                        tracing::debug!("second signal lapsed: {}", e);
                        b_done = true;
                    }
                },
            }
        }
        FirstSignal::Neither
    };

    tokio::time::timeout(timeout, race)
        .await
        .unwrap_or(FirstSignal::Neither)
}
