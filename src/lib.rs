//! # call-guard
//!
//! Call-frequency controllers for event-driven callbacks: debounce, throttle,
//! and a guard against rapid or overlapping asynchronous submissions.
//!
//! Each controller wraps exactly one target callable and owns all of its
//! timing state. Typical owners are UI components (a search box, a scroll
//! handler, a form's submit button), but any event source works.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use call_guard::{debounce, prevent_rapid_submit, throttle};
//!
//! # #[tokio::main]
//! # async fn main() {
//! // Search only once typing pauses for 300ms (the default)
//! let search = debounce(|query: String| println!("search {query}")).unwrap();
//! search.call("strik".into());
//! search.call("striker".into());
//!
//! // Handle at most one scroll event per second (the default)
//! let on_scroll = throttle(|offset: u32| println!("scrolled to {offset}"));
//! on_scroll.call(120);
//! on_scroll.call(240); // dropped
//!
//! // Submit a lineup at most once per in-flight request plus 2s cooldown
//! let save = prevent_rapid_submit(|lineup: Vec<String>| async move {
//!     Ok::<usize, std::io::Error>(lineup.len())
//! });
//! let first = save.submit(vec!["ana".into()]).await;  // Some(Ok(1))
//! let second = save.submit(vec!["kim".into()]).await; // None, cooling down
//! # }
//! ```
//!
//! ## Controllers
//!
//! | Controller | Accepts | Drops | Returns |
//! |------------|---------|-------|---------|
//! | [`Debouncer`] | last call after `delay` of quiet | every earlier call of a burst | nothing (fire-and-forget) |
//! | [`Throttler`] | first call per `limit` window | calls inside the window | `Option<R>` |
//! | [`SubmitGuard`] | calls while idle | calls while in flight or cooling down | `Future<Output = Option<T>>` |
//!
//! Dropped calls are silent: no error is returned to the caller. They are
//! counted in each controller's [`Metrics`] and logged at `debug` level
//! through `tracing`.
//!
//! ### Debounce
//!
//! Every call cancels the pending invocation and schedules a new one on the
//! tokio runtime. The target receives the arguments of the last call only.
//! A panicking target unwinds inside the timer task, never in the caller.
//!
//! ### Throttle
//!
//! The first call runs the target synchronously and opens a window of
//! `limit`; calls inside it return `None` and are not queued. The window
//! opens before the target runs, so a panicking target cannot bypass it.
//!
//! ### Submission guard
//!
//! ```text
//!          accept                settle               cooldown elapsed
//! Idle ──────────────▶ InFlight ──────────▶ Cooldown ─────────────────▶ Idle
//! ```
//!
//! The accept decision is made synchronously in `submit`, under a lock, so
//! at most one submission is ever in flight even on a multi-threaded
//! runtime. Success and failure settle identically.
//!
//! ## Reactive bindings
//!
//! [`use_debounce`] and [`use_throttle`] adapt the controllers to UI layers
//! that rebuild their callbacks on every render. Throttle state is shared by
//! every clone of a [`ThrottledCallback`] and never reset by re-rendering.
//!
//! ## Keyed throttling
//!
//! [`ThrottleRegistry`] keeps one window per key in sharded storage, for
//! throttling many actions with a single instance.
//!
//! ## Configuration
//!
//! [`TimingConfig`] groups the three durations, with the defaults above.
//! Enable the `serde` feature to load it from configuration files.
//!
//! ## Testing
//!
//! Controllers read time through the [`Clock`] port. The default
//! [`TokioClock`] follows tokio's paused clock, so
//! `#[tokio::test(start_paused = true)]` makes timing tests deterministic.
//! The `test-helpers` feature adds `MockClock`, a recording target and a
//! capturing `tracing` layer under `infrastructure::mocks`.

// Domain layer - pure timing state
pub mod domain;

// Application layer - controllers
pub mod application;

// Infrastructure layer - external adapters
pub mod infrastructure;

use std::future::Future;
use std::time::Duration;

pub use domain::{
    debounce::{DebounceTicket, QuietPeriod},
    policy::{CallDecision, ThrottleWindow},
    submission::{SubmitPhase, SubmitState},
};

pub use application::{
    config::{
        ConfigError, TimingConfig, DEFAULT_DEBOUNCE_DELAY, DEFAULT_SUBMIT_COOLDOWN,
        DEFAULT_THROTTLE_LIMIT,
    },
    debouncer::{BuildError, Debouncer, DebouncerBuilder},
    metrics::{Metrics, MetricsSnapshot},
    ports::{Clock, Storage},
    reactive::{use_debounce, use_throttle, DebouncedValue, ThrottledCallback},
    registry::ThrottleRegistry,
    submit_guard::SubmitGuard,
    throttler::Throttler,
};

pub use infrastructure::{
    clock::{SystemClock, TokioClock},
    storage::ShardedStorage,
};

/// Debounce `target` with the default 300ms delay.
///
/// # Errors
/// Returns `BuildError::NoRuntime` outside a tokio runtime.
pub fn debounce<A, F>(target: F) -> Result<Debouncer<A>, BuildError>
where
    A: Send + 'static,
    F: Fn(A) + Send + Sync + 'static,
{
    debounce_with(target, DEFAULT_DEBOUNCE_DELAY)
}

/// Debounce `target` with a custom delay.
///
/// # Errors
/// Returns `BuildError::NoRuntime` outside a tokio runtime.
pub fn debounce_with<A, F>(target: F, delay: Duration) -> Result<Debouncer<A>, BuildError>
where
    A: Send + 'static,
    F: Fn(A) + Send + Sync + 'static,
{
    Debouncer::new(target, delay)
}

/// Throttle `target` with the default 1s window.
pub fn throttle<F>(target: F) -> Throttler<F> {
    Throttler::new(target)
}

/// Throttle `target` with a custom window.
pub fn throttle_with<F>(target: F, limit: Duration) -> Throttler<F> {
    Throttler::new(target).with_limit(limit)
}

/// Guard an asynchronous `target` with the default 2s cooldown.
pub fn prevent_rapid_submit<A, F, Fut>(target: F) -> SubmitGuard<F>
where
    F: Fn(A) -> Fut,
    Fut: Future,
{
    SubmitGuard::new(target)
}

/// Guard an asynchronous `target` with a custom cooldown.
pub fn prevent_rapid_submit_with<A, F, Fut>(target: F, cooldown: Duration) -> SubmitGuard<F>
where
    F: Fn(A) -> Fut,
    Fut: Future,
{
    SubmitGuard::new(target).with_cooldown(cooldown)
}
