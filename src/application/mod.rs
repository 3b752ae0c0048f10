//! Application layer - orchestration of domain logic.
//!
//! This layer turns the pure timing state of the domain layer into
//! controllers that own a target callable:
//! - Debouncer (delayed, last-call-wins invocation)
//! - Throttler (one invocation per window)
//! - Submission guard (no overlap, cooldown after completion)
//! - Keyed throttle registry and reactive bindings built on top of them
//!
//! ## Ports
//!
//! The application layer defines ports (traits) that infrastructure
//! adapters must implement. This keeps the application layer independent
//! from infrastructure details.

pub mod config;
pub mod debouncer;
pub mod metrics;
pub mod ports;
pub mod reactive;
pub mod registry;
pub mod submit_guard;
pub mod throttler;

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock controller state, recovering from poisoning.
///
/// State is only mutated by short, non-panicking transitions, so a poisoned
/// lock still guards consistent data.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
