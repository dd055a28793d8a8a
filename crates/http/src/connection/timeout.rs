use std::future;
use std::pin::Pin;
use std::time::Duration;

use tokio::time::{Sleep, sleep};

/// The single deadline of a connection.
///
/// Arming replaces the pending deadline, so there is never more than one.
#[derive(Debug, Default)]
pub(crate) struct Timeout {
    sleep: Option<Pin<Box<Sleep>>>,
    duration: Option<Duration>,
}

impl Timeout {
    /// Arms a deadline `duration` from now. A zero duration leaves the timeout unset.
    pub(crate) fn arm(&mut self, duration: Duration) {
        self.clear();
        if duration.is_zero() {
            return;
        }

        self.sleep = Some(Box::pin(sleep(duration)));
        self.duration = Some(duration);
    }

    pub(crate) fn clear(&mut self) {
        self.sleep = None;
        self.duration = None;
    }

    pub(crate) fn is_armed(&self) -> bool {
        self.sleep.is_some()
    }

    pub(crate) fn duration(&self) -> Option<Duration> {
        self.duration
    }

    /// Completes when the deadline passes, never when the timeout is unset.
    pub(crate) async fn expired(&mut self) {
        match &mut self.sleep {
            Some(sleep) => sleep.as_mut().await,
            None => future::pending().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn rearming_replaces_the_deadline() {
        let start = Instant::now();
        let mut timeout = Timeout::default();

        timeout.arm(Duration::from_secs(1));
        timeout.arm(Duration::from_secs(3));
        assert_eq!(timeout.duration(), Some(Duration::from_secs(3)));

        timeout.expired().await;
        assert!(start.elapsed() >= Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn unset_timeout_never_expires() {
        let mut timeout = Timeout::default();
        timeout.arm(Duration::ZERO);
        assert!(!timeout.is_armed());
        assert!(timeout.expired().now_or_never().is_none());

        timeout.arm(Duration::from_millis(10));
        timeout.clear();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(timeout.expired().now_or_never().is_none());
    }
}
