//! Quiet-period tracking for debouncing.
//!
//! Every call issues a new [`DebounceTicket`] and invalidates the previous
//! one. Only the holder of the current ticket may fire, which gives
//! last-call-wins semantics independent of how the timer itself is
//! cancelled.

use std::time::Duration;

/// Handle for one scheduled invocation.
///
/// The ticket carries no deadline: when it fires is decided by whoever
/// schedules it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceTicket {
    generation: u64,
}

/// Result of registering a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registration {
    /// Ticket for the newly scheduled invocation
    pub ticket: DebounceTicket,
    /// Whether an earlier pending invocation was discarded
    pub superseded: bool,
}

/// State of a debounce controller.
#[derive(Debug, Clone)]
pub struct QuietPeriod {
    delay: Duration,
    generation: u64,
    pending: Option<u64>,
}

impl QuietPeriod {
    /// Create a quiet period with the given delay and nothing pending.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: 0,
            pending: None,
        }
    }

    /// Register a call, replacing any pending invocation.
    pub fn register_call(&mut self) -> Registration {
        let superseded = self.pending.is_some();
        self.generation = self.generation.wrapping_add(1);
        self.pending = Some(self.generation);

        Registration {
            ticket: DebounceTicket {
                generation: self.generation,
            },
            superseded,
        }
    }

    /// Consume `ticket` if it is still the current one.
    ///
    /// Returns `true` exactly once for the latest ticket; stale tickets
    /// always return `false`.
    pub fn fire(&mut self, ticket: DebounceTicket) -> bool {
        if self.pending == Some(ticket.generation) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    /// Discard any pending invocation.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    /// Whether an invocation is scheduled.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// The configured delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_latest_ticket_fires() {
        let mut period = QuietPeriod::new(Duration::from_millis(300));

        let first = period.register_call();
        let second = period.register_call();
        let third = period.register_call();

        assert!(!first.superseded);
        assert!(second.superseded);
        assert!(third.superseded);

        assert!(!period.fire(first.ticket));
        assert!(!period.fire(second.ticket));
        assert!(period.fire(third.ticket));
        assert!(!period.is_pending());
    }

    #[test]
    fn test_ticket_fires_once() {
        let mut period = QuietPeriod::new(Duration::from_millis(10));
        let reg = period.register_call();

        assert!(period.fire(reg.ticket));
        assert!(!period.fire(reg.ticket));
    }

    #[test]
    fn test_cancel() {
        let mut period = QuietPeriod::new(Duration::from_millis(10));
        let reg = period.register_call();

        assert!(period.cancel());
        assert!(!period.cancel());
        assert!(!period.fire(reg.ticket));
    }

    #[test]
    fn test_call_after_fire_is_not_superseding() {
        let mut period = QuietPeriod::new(Duration::from_millis(10));

        let reg = period.register_call();
        period.fire(reg.ticket);

        assert!(!period.register_call().superseded);
    }
}
