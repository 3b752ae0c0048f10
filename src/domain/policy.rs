//! Throttle window policy.
//!
//! A throttle window accepts one call, then suppresses every call that
//! arrives before `limit` has elapsed. Suppressed calls are dropped, never
//! deferred.

use std::time::{Duration, Instant};

/// Decision made for a single incoming call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallDecision {
    /// Invoke the wrapped target now
    Invoke,
    /// Drop the call without invoking the target
    Drop,
}

impl CallDecision {
    /// Check if this decision is Invoke.
    pub fn is_invoke(&self) -> bool {
        matches!(self, CallDecision::Invoke)
    }

    /// Check if this decision is Drop.
    pub fn is_drop(&self) -> bool {
        matches!(self, CallDecision::Drop)
    }
}

/// Fixed suppression window that opens on every accepted call.
///
/// # Example
/// ```
/// use call_guard::ThrottleWindow;
/// use std::time::{Duration, Instant};
///
/// let mut window = ThrottleWindow::new(Duration::from_millis(1000));
/// let t0 = Instant::now();
///
/// assert!(window.register_call(t0).is_invoke());
/// assert!(window.register_call(t0 + Duration::from_millis(200)).is_drop());
/// assert!(window.register_call(t0 + Duration::from_millis(1100)).is_invoke());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThrottleWindow {
    limit: Duration,
    opened_at: Option<Instant>,
}

impl ThrottleWindow {
    /// Create a closed window with the given limit.
    pub fn new(limit: Duration) -> Self {
        Self {
            limit,
            opened_at: None,
        }
    }

    /// Register a call arriving at `now`.
    ///
    /// Opens a new window and returns `Invoke` when the window is closed,
    /// otherwise returns `Drop` and leaves the window untouched.
    pub fn register_call(&mut self, now: Instant) -> CallDecision {
        if self.is_open(now) {
            return CallDecision::Drop;
        }
        self.opened_at = Some(now);
        CallDecision::Invoke
    }

    /// Whether calls arriving at `now` would be suppressed.
    ///
    /// A window closes at exactly `opened_at + limit`.
    pub fn is_open(&self, now: Instant) -> bool {
        match self.opened_at {
            Some(opened) => now.saturating_duration_since(opened) < self.limit,
            None => false,
        }
    }

    /// Time left until the window closes, zero if already closed.
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.opened_at {
            Some(opened) => self
                .limit
                .saturating_sub(now.saturating_duration_since(opened)),
            None => Duration::ZERO,
        }
    }

    /// The configured window length.
    pub fn limit(&self) -> Duration {
        self.limit
    }

    /// Close the window immediately.
    pub fn reset(&mut self) {
        self.opened_at = None;
    }
}
