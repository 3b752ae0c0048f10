//! Throttle controller.
//!
//! Invokes the target at most once per window and drops every call that
//! arrives while the window is open.

use crate::application::config::{duration_to_ms, DEFAULT_THROTTLE_LIMIT};
use crate::application::lock;
use crate::application::metrics::Metrics;
use crate::application::ports::Clock;
use crate::domain::policy::{CallDecision, ThrottleWindow};
use crate::infrastructure::clock::TokioClock;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Allows at most one invocation of a target per `limit`.
///
/// The first call (or the first call after the window closed) runs the
/// target synchronously and opens a new window. Calls inside the window
/// return `None` and are not queued.
///
/// The window opens before the target runs, so a panicking target cannot
/// be used to bypass the throttle.
///
/// # Example
/// ```
/// use call_guard::Throttler;
/// use std::time::Duration;
///
/// let save = Throttler::new(|draft: &str| draft.len()).with_limit(Duration::from_secs(1));
///
/// assert_eq!(save.call("lineup"), Some(6));
/// assert_eq!(save.call("lineup v2"), None); // inside the window
/// ```
pub struct Throttler<F> {
    target: F,
    window: Mutex<ThrottleWindow>,
    clock: Arc<dyn Clock>,
    metrics: Metrics,
}

impl<F> Throttler<F> {
    /// Wrap `target` with the default 1 second window.
    pub fn new(target: F) -> Self {
        Self {
            target,
            window: Mutex::new(ThrottleWindow::new(DEFAULT_THROTTLE_LIMIT)),
            clock: Arc::new(TokioClock::new()),
            metrics: Metrics::new(),
        }
    }

    /// Set the window length.
    pub fn with_limit(self, limit: Duration) -> Self {
        Self {
            window: Mutex::new(ThrottleWindow::new(limit)),
            ..self
        }
    }

    /// Set the clock used to measure the window.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Invoke the target unless the window is open.
    ///
    /// Returns `Some(result)` when the target ran, `None` when the call
    /// was dropped.
    pub fn call<A, R>(&self, args: A) -> Option<R>
    where
        F: Fn(A) -> R,
    {
        match self.check() {
            CallDecision::Invoke => Some((self.target)(args)),
            CallDecision::Drop => None,
        }
    }

    /// Register a call without running the target.
    ///
    /// Opens the window on `Invoke`; callers that use this directly are
    /// expected to perform the guarded work themselves.
    pub fn check(&self) -> CallDecision {
        let now = self.clock.now();
        let (decision, remaining) = {
            let mut window = lock(&self.window);
            let decision = window.register_call(now);
            (decision, window.remaining(now))
        };

        match decision {
            CallDecision::Invoke => self.metrics.record_invoked(),
            CallDecision::Drop => {
                self.metrics.record_suppressed();
                tracing::debug!(
                    remaining_ms = duration_to_ms(remaining),
                    "throttled call dropped"
                );
            }
        }
        decision
    }

    /// Whether a call made now would be dropped.
    pub fn is_open(&self) -> bool {
        lock(&self.window).is_open(self.clock.now())
    }

    /// The configured window length.
    pub fn limit(&self) -> Duration {
        lock(&self.window).limit()
    }

    /// Get a handle to this controller's metrics.
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}

impl<F> fmt::Debug for Throttler<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Throttler")
            .field("window", &*lock(&self.window))
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}
