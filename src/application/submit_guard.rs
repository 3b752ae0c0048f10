//! Submission guard for asynchronous actions.
//!
//! Rejects submissions while one is in flight and for a cooldown after it
//! settles, whether it succeeded or failed.

use crate::application::config::DEFAULT_SUBMIT_COOLDOWN;
use crate::application::lock;
use crate::application::metrics::Metrics;
use crate::application::ports::Clock;
use crate::domain::policy::CallDecision;
use crate::domain::submission::{SubmitPhase, SubmitState};
use crate::infrastructure::clock::TokioClock;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Protects an asynchronous target against overlapping and rapid calls.
///
/// A submission is accepted only when no other submission is in flight and
/// the previous one settled at least `cooldown` ago. Rejected submissions
/// resolve to `None` without running the target and without an error.
/// Accepted submissions resolve to `Some(output)`; a failing target's
/// `Err` is handed back unchanged inside the `Some`.
///
/// The accept decision is taken synchronously inside [`SubmitGuard::submit`],
/// before the returned future is polled. The transition out of `InFlight`
/// happens when the target's future completes, panics, or is dropped.
///
/// # Example
/// ```
/// use call_guard::SubmitGuard;
/// use std::time::Duration;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let guard = SubmitGuard::new(|roster: Vec<&'static str>| async move {
///     Ok::<usize, String>(roster.len())
/// })
/// .with_cooldown(Duration::from_secs(2));
///
/// assert_eq!(guard.submit(vec!["ana", "kim"]).await, Some(Ok(2)));
/// assert_eq!(guard.submit(vec!["ana"]).await, None); // cooling down
/// # }
/// ```
pub struct SubmitGuard<F> {
    target: F,
    state: Arc<Mutex<SubmitState>>,
    clock: Arc<dyn Clock>,
    metrics: Metrics,
}

impl<F> SubmitGuard<F> {
    /// Wrap `target` with the default 2 second cooldown.
    pub fn new(target: F) -> Self {
        Self {
            target,
            state: Arc::new(Mutex::new(SubmitState::new(DEFAULT_SUBMIT_COOLDOWN))),
            clock: Arc::new(TokioClock::new()),
            metrics: Metrics::new(),
        }
    }

    /// Set the cooldown applied after each submission settles.
    pub fn with_cooldown(self, cooldown: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(SubmitState::new(cooldown))),
            ..self
        }
    }

    /// Set the clock used for cooldown bookkeeping.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Submit `args` to the target if the guard is idle.
    ///
    /// The returned future resolves to `None` when the submission was
    /// rejected. It does not borrow the guard, so it can be spawned.
    pub fn submit<A, Fut>(&self, args: A) -> impl Future<Output = Option<Fut::Output>>
    where
        F: Fn(A) -> Fut,
        Fut: Future,
    {
        let accepted = self.try_begin().map(|in_flight| {
            // The target runs after the guard exists, so a panic here still settles.
            let fut = (self.target)(args);
            (in_flight, fut)
        });

        async move {
            match accepted {
                Some((in_flight, fut)) => {
                    let output = fut.await;
                    drop(in_flight);
                    Some(output)
                }
                None => None,
            }
        }
    }

    fn try_begin(&self) -> Option<InFlight> {
        let now = self.clock.now();
        let (decision, phase) = {
            let mut state = lock(&self.state);
            let phase = state.phase(now);
            (state.try_accept(now), phase)
        };

        match decision {
            CallDecision::Invoke => {
                self.metrics.record_invoked();
                tracing::debug!("submission accepted");
                Some(InFlight {
                    state: Arc::clone(&self.state),
                    clock: Arc::clone(&self.clock),
                })
            }
            CallDecision::Drop => {
                self.metrics.record_suppressed();
                tracing::debug!(phase = ?phase, "submission rejected");
                None
            }
        }
    }

    /// Current phase of the guard.
    pub fn phase(&self) -> SubmitPhase {
        lock(&self.state).phase(self.clock.now())
    }

    /// Time until the guard accepts again; `None` while in flight.
    pub fn remaining_cooldown(&self) -> Option<Duration> {
        lock(&self.state).remaining_cooldown(self.clock.now())
    }

    /// The configured cooldown.
    pub fn cooldown(&self) -> Duration {
        lock(&self.state).cooldown()
    }

    /// Get a handle to this controller's metrics.
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}

impl<F> fmt::Debug for SubmitGuard<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubmitGuard")
            .field("state", &*lock(&self.state))
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

/// Settles the guard when the accepted submission ends, however it ends.
struct InFlight {
    state: Arc<Mutex<SubmitState>>,
    clock: Arc<dyn Clock>,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        let now = self.clock.now();
        lock(&self.state).settle(now);
        tracing::trace!("submission settled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::mocks::MockClock;
    use std::time::Instant;
    use tokio::sync::oneshot;

    type Reply = Result<u32, String>;
    type BoxedReply = std::pin::Pin<Box<dyn Future<Output = Reply> + Send>>;

    /// Guard whose target waits for a reply on a oneshot channel.
    fn guard_with_clock(
        clock: &MockClock,
    ) -> SubmitGuard<impl Fn(oneshot::Receiver<Reply>) -> BoxedReply> {
        SubmitGuard::new(|rx: oneshot::Receiver<Reply>| -> BoxedReply {
            Box::pin(async move { rx.await.unwrap_or_else(|_| Err("sender dropped".into())) })
        })
        .with_cooldown(Duration::from_millis(2000))
        .with_clock(Arc::new(clock.clone()))
    }

    fn ready(reply: Reply) -> oneshot::Receiver<Reply> {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(reply);
        rx
    }

    #[tokio::test]
    async fn test_rapid_submit_timeline() {
        let clock = MockClock::new(Instant::now());
        let guard = guard_with_clock(&clock);

        let (tx, rx) = oneshot::channel();
        let first = guard.submit(rx);
        assert_eq!(guard.phase(), SubmitPhase::InFlight);

        clock.advance_ms(500);
        assert_eq!(guard.submit(ready(Ok(2))).await, None);

        clock.advance_ms(300);
        tx.send(Ok(1)).unwrap();
        assert_eq!(first.await, Some(Ok(1)));
        assert_eq!(guard.phase(), SubmitPhase::Cooldown);

        assert_eq!(guard.submit(ready(Ok(3))).await, None);
        clock.advance_ms(1999);
        assert_eq!(guard.submit(ready(Ok(4))).await, None);
        clock.advance_ms(1);
        assert_eq!(guard.phase(), SubmitPhase::Idle);
        assert_eq!(guard.submit(ready(Ok(5))).await, Some(Ok(5)));

        let snapshot = guard.metrics().snapshot();
        assert_eq!(snapshot.calls_invoked, 2);
        assert_eq!(snapshot.calls_suppressed, 3);
    }

    #[tokio::test]
    async fn test_failure_gets_same_cooldown() {
        let clock = MockClock::new(Instant::now());
        let guard = guard_with_clock(&clock);

        assert_eq!(
            guard.submit(ready(Err("rejected".into()))).await,
            Some(Err("rejected".to_string()))
        );
        assert_eq!(guard.phase(), SubmitPhase::Cooldown);
        assert_eq!(guard.remaining_cooldown(), Some(Duration::from_millis(2000)));

        clock.advance_ms(1999);
        assert_eq!(guard.submit(ready(Ok(1))).await, None);
        clock.advance_ms(1);
        assert_eq!(guard.submit(ready(Ok(1))).await, Some(Ok(1)));
    }

    #[tokio::test]
    async fn test_rejected_call_does_not_run_target() {
        let runs = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let guard = SubmitGuard::new(move |_: ()| {
            counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            async {}
        });

        let first = guard.submit(());
        let second = guard.submit(());

        assert_eq!(second.await, None);
        assert_eq!(first.await, Some(()));
        assert_eq!(runs.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_dropped_submission_settles() {
        let clock = MockClock::new(Instant::now());
        let guard = guard_with_clock(&clock);

        let (_tx, rx) = oneshot::channel();
        let pending = guard.submit(rx);
        assert_eq!(guard.phase(), SubmitPhase::InFlight);

        drop(pending);
        assert_eq!(guard.phase(), SubmitPhase::Cooldown);
    }

    #[test]
    fn test_panicking_target_settles() {
        let clock = MockClock::new(Instant::now());
        let guard = SubmitGuard::new(|_: ()| -> std::future::Ready<()> { panic!("boom") })
            .with_clock(Arc::new(clock.clone()));

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = guard.submit(());
        }));

        assert!(result.is_err());
        assert_eq!(guard.phase(), SubmitPhase::Cooldown);
    }
}
