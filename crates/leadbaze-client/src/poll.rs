//! Cancellable background polling.
//!
//! [`poll_resource`] spawns a task that repeatedly calls a fetch closure and
//! forwards each result over a channel until the value is terminal, the
//! attempt budget runs out, or the subscriber goes away. Dropping the
//! [`PollSubscription`] (or calling [`PollSubscription::cancel`]) stops the
//! task, so no timer outlives the screen that started it.

use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::error::ClientError;
use crate::retry::is_retriable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    pub interval: Duration,
    /// Stop after this many fetches. `None` polls until terminal or cancelled.
    pub max_attempts: Option<u32>,
}

impl PollOptions {
    #[must_use]
    pub fn every(interval: Duration) -> Self {
        Self {
            interval,
            max_attempts: None,
        }
    }

    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PollEvent<T> {
    /// A non-terminal value; `seq` counts successful fetches from 1.
    Update { seq: u32, value: T },
    /// A fetch failed. Polling continues on the next tick; `retriable` is
    /// `false` when the same request cannot succeed later (auth, not found).
    Error {
        attempt: u32,
        retriable: bool,
        message: String,
    },
    /// The value satisfied the terminal predicate. No further events follow.
    Finished { seq: u32, value: T },
    /// The attempt budget ran out without a terminal value.
    Exhausted { attempts: u32 },
}

impl<T> PollEvent<T> {
    #[must_use]
    pub fn is_last(&self) -> bool {
        matches!(self, Self::Finished { .. } | Self::Exhausted { .. })
    }
}

/// Handle to a running poll. Events are delivered in fetch order.
#[derive(Debug)]
pub struct PollSubscription<T> {
    rx: mpsc::Receiver<PollEvent<T>>,
    task: JoinHandle<()>,
}

impl<T> PollSubscription<T> {
    /// Waits for the next event. Returns `None` once polling has stopped and
    /// every event has been received.
    pub async fn next(&mut self) -> Option<PollEvent<T>> {
        self.rx.recv().await
    }

    /// Stops the poll task. Events already queued are discarded.
    pub fn cancel(mut self) {
        self.task.abort();
        self.rx.close();
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl<T> Drop for PollSubscription<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Starts polling `fetch` on a fixed interval. The first fetch runs
/// immediately.
///
/// Fetch errors are reported as [`PollEvent::Error`] and count toward
/// `max_attempts`; they never stop the poll on their own.
///
/// Must be called from within a Tokio runtime.
pub fn poll_resource<T, F, Fut, P>(
    options: PollOptions,
    is_terminal: P,
    mut fetch: F,
) -> PollSubscription<T>
where
    T: Send + 'static,
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, ClientError>> + Send,
    P: Fn(&T) -> bool + Send + 'static,
{
    let (tx, rx) = mpsc::channel(16);

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(options.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut attempts = 0u32;
        let mut seq = 0u32;

        loop {
            if options.max_attempts.is_some_and(|max| attempts >= max) {
                tracing::debug!(attempts, "poll budget exhausted");
                let _ = tx.send(PollEvent::Exhausted { attempts }).await;
                return;
            }
            ticker.tick().await;
            attempts += 1;

            let event = match fetch().await {
                Ok(value) => {
                    seq += 1;
                    if is_terminal(&value) {
                        PollEvent::Finished { seq, value }
                    } else {
                        PollEvent::Update { seq, value }
                    }
                }
                Err(err) => {
                    tracing::warn!(attempt = attempts, error = %err, "poll fetch failed");
                    PollEvent::Error {
                        attempt: attempts,
                        retriable: is_retriable(&err),
                        message: err.to_string(),
                    }
                }
            };
            let last = event.is_last();
            if tx.send(event).await.is_err() {
                tracing::debug!("poll subscriber dropped, stopping");
                return;
            }
            if last {
                return;
            }
        }
    });

    PollSubscription { rx, task }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;

    fn fast() -> PollOptions {
        PollOptions::every(Duration::from_millis(5))
    }

    #[tokio::test]
    async fn stops_at_terminal_value() {
        let counter = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&counter);
        let mut sub = poll_resource(fast(), |v: &u32| *v >= 3, move || {
            let c = Arc::clone(&c);
            async move { Ok(c.fetch_add(1, Ordering::SeqCst) + 1) }
        });

        let mut events = Vec::new();
        while let Some(event) = sub.next().await {
            events.push(event);
        }
        assert_eq!(
            events,
            vec![
                PollEvent::Update { seq: 1, value: 1 },
                PollEvent::Update { seq: 2, value: 2 },
                PollEvent::Finished { seq: 3, value: 3 },
            ]
        );
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn errors_do_not_stop_polling() {
        let counter = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&counter);
        let mut sub = poll_resource(fast(), |_: &u32| true, move || {
            let c = Arc::clone(&c);
            async move {
                if c.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(ClientError::InvalidInput("flaky".to_owned()))
                } else {
                    Ok(7)
                }
            }
        });

        assert!(matches!(
            sub.next().await,
            Some(PollEvent::Error { attempt: 1, .. })
        ));
        assert_eq!(
            sub.next().await,
            Some(PollEvent::Finished { seq: 1, value: 7 })
        );
        assert_eq!(sub.next().await, None);
    }

    #[tokio::test]
    async fn error_events_flag_whether_retrying_can_help() {
        let counter = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&counter);
        let mut sub = poll_resource(fast(), |_: &u32| false, move || {
            let c = Arc::clone(&c);
            async move {
                if c.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(ClientError::UnexpectedStatus {
                        status: 503,
                        url: "http://backend/campaigns".to_owned(),
                        body: String::new(),
                    })
                } else {
                    Err(ClientError::NotFound {
                        url: "http://backend/campaigns".to_owned(),
                    })
                }
            }
        });

        assert!(matches!(
            sub.next().await,
            Some(PollEvent::Error {
                attempt: 1,
                retriable: true,
                ..
            })
        ));
        assert!(matches!(
            sub.next().await,
            Some(PollEvent::Error {
                attempt: 2,
                retriable: false,
                ..
            })
        ));
        sub.cancel();
    }

    #[tokio::test]
    async fn exhausts_attempt_budget() {
        let mut sub = poll_resource(fast().with_max_attempts(2), |_: &u32| false, || async {
            Ok(0)
        });
        assert!(matches!(sub.next().await, Some(PollEvent::Update { seq: 1, .. })));
        assert!(matches!(sub.next().await, Some(PollEvent::Update { seq: 2, .. })));
        assert_eq!(sub.next().await, Some(PollEvent::Exhausted { attempts: 2 }));
        assert_eq!(sub.next().await, None);
    }

    #[tokio::test]
    async fn cancel_stops_fetching() {
        let counter = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&counter);
        let mut sub = poll_resource(fast(), |_: &u32| false, move || {
            let c = Arc::clone(&c);
            async move { Ok(c.fetch_add(1, Ordering::SeqCst)) }
        });
        assert!(sub.next().await.is_some());
        sub.cancel();

        let seen = counter.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(
            counter.load(Ordering::SeqCst) <= seen + 1,
            "fetches continued after cancel"
        );
    }

    #[tokio::test]
    async fn dropping_subscription_stops_task() {
        let counter = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&counter);
        let sub = poll_resource(fast(), |_: &u32| false, move || {
            let c = Arc::clone(&c);
            async move { Ok(c.fetch_add(1, Ordering::SeqCst)) }
        });
        drop(sub);
        tokio::time::sleep(Duration::from_millis(30)).await;
        let seen = counter.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(counter.load(Ordering::SeqCst), seen);
    }
}
