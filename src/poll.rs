//! Periodic sampling of the playback clock.
//!
//! The player has no fine-grained time-update event, so the active cue is
//! found by sampling the clock on a short interval. The poller publishes the
//! active index on a `watch` channel and stops when its handle is cancelled
//! or dropped.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::config::DEFAULT_POLL_INTERVAL_MS;
use crate::playback::PlaybackClock;
use crate::tracker::ActiveCueTracker;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(DEFAULT_POLL_INTERVAL_MS);

pub struct CuePoller;

impl CuePoller {
    /// Start sampling `clock` every `interval`. Must be called inside a
    /// tokio runtime.
    ///
    /// Replace the handle whenever the cue sequence changes; dropping the
    /// old one stops the old task.
    pub fn spawn(
        mut tracker: ActiveCueTracker,
        clock: Arc<dyn PlaybackClock>,
        interval: Duration,
    ) -> PollHandle {
        let token = CancellationToken::new();
        let (tx, rx) = watch::channel(tracker.current());
        let cancelled = token.clone();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    _ = ticker.tick() => {
                        let active = tracker.update(clock.current_time_secs());
                        tx.send_if_modified(|current| {
                            if *current == active {
                                return false;
                            }
                            *current = active;
                            true
                        });
                    }
                }
            }
            tracing::debug!("cue poller stopped");
        });

        PollHandle {
            token,
            rx,
            task: Some(task),
        }
    }
}

/// Handle to a running poller.
pub struct PollHandle {
    token: CancellationToken,
    rx: watch::Receiver<Option<usize>>,
    task: Option<JoinHandle<()>>,
}

impl PollHandle {
    /// A receiver notified whenever the active cue changes.
    pub fn subscribe(&self) -> watch::Receiver<Option<usize>> {
        self.rx.clone()
    }

    /// The most recently published active cue.
    pub fn current(&self) -> Option<usize> {
        *self.rx.borrow()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Cancel and wait for the task to finish.
    pub async fn stop(mut self) {
        self.token.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "cue poller task failed");
            }
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::ManualClock;
    use crate::tracker::CueWindow;

    fn tracker() -> ActiveCueTracker {
        ActiveCueTracker::from_windows(vec![
            CueWindow { start: 0.0, end: 2.0 },
            CueWindow { start: 2.0, end: 4.0 },
        ])
    }

    #[tokio::test]
    async fn test_publishes_active_cue() {
        let clock = ManualClock::new(10.0);
        clock.set_time(1.0);
        let handle = CuePoller::spawn(tracker(), Arc::new(clock.clone()), Duration::from_millis(5));
        let mut rx = handle.subscribe();

        tokio::time::timeout(Duration::from_secs(2), rx.wait_for(|v| *v == Some(0)))
            .await
            .expect("first cue")
            .unwrap();

        clock.set_time(1.8);
        tokio::time::timeout(Duration::from_secs(2), rx.wait_for(|v| *v == Some(1)))
            .await
            .expect("lookahead reaches second cue")
            .unwrap();

        assert_eq!(handle.current(), Some(1));
        handle.stop().await;
    }

    #[tokio::test]
    async fn test_drop_cancels() {
        let clock = ManualClock::new(10.0);
        let handle = CuePoller::spawn(tracker(), Arc::new(clock), Duration::from_millis(5));
        let mut rx = handle.subscribe();
        drop(handle);

        // The sender is dropped when the task exits.
        let closed = tokio::time::timeout(Duration::from_secs(2), async {
            while rx.changed().await.is_ok() {}
        })
        .await;
        assert!(closed.is_ok());
    }
}
