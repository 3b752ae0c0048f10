//! Submission state machine.
//!
//! Tracks one protected asynchronous action through three phases:
//!
//! ```text
//!          accept                settle               cooldown elapsed
//! Idle ──────────────▶ InFlight ──────────▶ Cooldown ─────────────────▶ Idle
//! ```
//!
//! `Cooldown` is derived from the settle timestamp, so no timer is needed to
//! move back to `Idle`.

use crate::domain::policy::CallDecision;
use std::time::{Duration, Instant};

/// Observable phase of a submission guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitPhase {
    /// Ready to accept a submission
    Idle,
    /// A submission is running
    InFlight,
    /// A submission settled less than `cooldown` ago
    Cooldown,
}

/// Mutable state behind a submission guard.
#[derive(Debug, Clone)]
pub struct SubmitState {
    cooldown: Duration,
    in_flight: bool,
    last_start: Option<Instant>,
    settled_at: Option<Instant>,
}

impl SubmitState {
    /// Create idle state with the given cooldown.
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            in_flight: false,
            last_start: None,
            settled_at: None,
        }
    }

    /// Phase as observed at `now`.
    pub fn phase(&self, now: Instant) -> SubmitPhase {
        if self.in_flight {
            return SubmitPhase::InFlight;
        }
        match self.settled_at {
            Some(settled) if now.saturating_duration_since(settled) < self.cooldown => {
                SubmitPhase::Cooldown
            }
            _ => SubmitPhase::Idle,
        }
    }

    /// Try to accept a submission at `now`.
    ///
    /// Accepts only when idle and at least `cooldown` has passed since the
    /// last accepted start. Acceptance moves the state to `InFlight`.
    pub fn try_accept(&mut self, now: Instant) -> CallDecision {
        if self.phase(now) != SubmitPhase::Idle {
            return CallDecision::Drop;
        }
        if let Some(start) = self.last_start {
            if now.saturating_duration_since(start) < self.cooldown {
                return CallDecision::Drop;
            }
        }

        self.in_flight = true;
        self.last_start = Some(now);
        CallDecision::Invoke
    }

    /// Record that the in-flight submission finished at `now`, whatever its outcome.
    pub fn settle(&mut self, now: Instant) {
        if self.in_flight {
            self.in_flight = false;
            self.settled_at = Some(now);
        }
    }

    /// Time until the guard becomes idle again, zero when idle.
    ///
    /// Returns `None` while a submission is in flight since the end is unknown.
    pub fn remaining_cooldown(&self, now: Instant) -> Option<Duration> {
        if self.in_flight {
            return None;
        }
        Some(match self.settled_at {
            Some(settled) => self
                .cooldown
                .saturating_sub(now.saturating_duration_since(settled)),
            None => Duration::ZERO,
        })
    }

    /// The configured cooldown.
    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Timestamp of the last accepted submission.
    pub fn last_start(&self) -> Option<Instant> {
        self.last_start
    }
}
