//! Debounce controller.
//!
//! Every call replaces the pending invocation; the target runs once the
//! calls stop for `delay`, with the arguments of the last call.
//!
//! The delay is measured by `tokio::time::sleep`, so it follows tokio time:
//! pausing and advancing the tokio clock in tests drives the debouncer.
//! Unlike the other controllers it takes no [`Clock`](crate::Clock).

use crate::application::config::{duration_to_ms, ConfigError, DEFAULT_DEBOUNCE_DELAY};
use crate::application::lock;
use crate::application::metrics::Metrics;
use crate::domain::debounce::{DebounceTicket, QuietPeriod};
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Error returned when building a controller fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// No tokio runtime was available to schedule delayed calls
    NoRuntime,
    /// Timing configuration is invalid
    Config(ConfigError),
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildError::NoRuntime => {
                write!(
                    f,
                    "no tokio runtime available; build inside a runtime or pass one with with_runtime"
                )
            }
            BuildError::Config(e) => {
                write!(f, "invalid timing configuration: {}", e)
            }
        }
    }
}

impl std::error::Error for BuildError {}

impl From<ConfigError> for BuildError {
    fn from(e: ConfigError) -> Self {
        BuildError::Config(e)
    }
}

type Target<A> = Arc<dyn Fn(A) + Send + Sync>;

/// Builder for [`Debouncer`].
pub struct DebouncerBuilder<A> {
    target: Target<A>,
    delay: Duration,
    runtime: Option<Handle>,
}

impl<A> DebouncerBuilder<A>
where
    A: Send + 'static,
{
    /// Set the quiet period (default 300ms).
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Schedule delayed calls on a specific runtime.
    ///
    /// Without this the runtime of the calling context is captured at
    /// build time.
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Build the debouncer.
    ///
    /// # Errors
    /// Returns `BuildError::NoRuntime` if no runtime was given and the
    /// builder is not running inside one.
    pub fn build(self) -> Result<Debouncer<A>, BuildError> {
        let runtime = match self.runtime {
            Some(handle) => handle,
            None => Handle::try_current().map_err(|_| BuildError::NoRuntime)?,
        };

        Ok(Debouncer {
            shared: Arc::new(Shared {
                target: self.target,
                slot: Mutex::new(Slot {
                    period: QuietPeriod::new(self.delay),
                    task: None,
                }),
                metrics: Metrics::new(),
            }),
            delay: self.delay,
            runtime,
        })
    }
}

struct Slot {
    period: QuietPeriod,
    task: Option<JoinHandle<()>>,
}

struct Shared<A> {
    target: Target<A>,
    slot: Mutex<Slot>,
    metrics: Metrics,
}

impl<A> Shared<A> {
    fn fire(&self, ticket: DebounceTicket, args: A) {
        let current = {
            let mut slot = lock(&self.slot);
            let current = slot.period.fire(ticket);
            if current {
                slot.task = None;
            }
            current
        };

        if current {
            self.metrics.record_invoked();
            tracing::trace!("debounced call fired");
            // Lock released: the target may call back into the debouncer.
            (self.target)(args);
        }
    }
}

/// Delays invocation of a target until calls stop arriving.
///
/// Each call cancels the pending invocation and schedules a new one
/// `delay` later on the tokio runtime. Only the last call of a burst
/// reaches the target; earlier arguments are discarded. Calls never
/// block and return nothing.
///
/// A panic in the target unwinds inside the spawned timer task, not in
/// the caller, and does not affect later calls. Dropping the debouncer
/// cancels any pending invocation.
///
/// # Example
/// ```
/// use call_guard::Debouncer;
/// use std::time::Duration;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let search = Debouncer::builder(|query: String| println!("searching {query}"))
///     .with_delay(Duration::from_millis(300))
///     .build()
///     .unwrap();
///
/// search.call("r".to_string());
/// search.call("ru".to_string());
/// search.call("rust".to_string()); // only this one is delivered
/// # }
/// ```
pub struct Debouncer<A> {
    shared: Arc<Shared<A>>,
    delay: Duration,
    runtime: Handle,
}

impl<A> Debouncer<A>
where
    A: Send + 'static,
{
    /// Start building a debouncer around `target`.
    pub fn builder<F>(target: F) -> DebouncerBuilder<A>
    where
        F: Fn(A) + Send + Sync + 'static,
    {
        DebouncerBuilder {
            target: Arc::new(target),
            delay: DEFAULT_DEBOUNCE_DELAY,
            runtime: None,
        }
    }

    /// Build a debouncer with the given delay on the current runtime.
    ///
    /// # Errors
    /// Returns `BuildError::NoRuntime` outside a tokio runtime.
    pub fn new<F>(target: F, delay: Duration) -> Result<Self, BuildError>
    where
        F: Fn(A) + Send + Sync + 'static,
    {
        Self::builder(target).with_delay(delay).build()
    }

    /// Schedule `target(args)` after the quiet period, replacing any
    /// pending invocation.
    pub fn call(&self, args: A) {
        let delay = self.delay;

        let mut slot = lock(&self.shared.slot);
        let registration = slot.period.register_call();
        if registration.superseded {
            self.shared.metrics.record_superseded();
            tracing::trace!(
                delay_ms = duration_to_ms(delay),
                "debounced call superseded"
            );
        }

        let shared = Arc::clone(&self.shared);
        let ticket = registration.ticket;
        let task = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            shared.fire(ticket, args);
        });

        if let Some(previous) = slot.task.replace(task) {
            previous.abort();
        }
    }
}

impl<A> Debouncer<A> {
    /// Whether an invocation is scheduled and has not fired yet.
    pub fn is_pending(&self) -> bool {
        lock(&self.shared.slot).period.is_pending()
    }

    /// The configured quiet period.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Get a handle to this controller's metrics.
    pub fn metrics(&self) -> &Metrics {
        &self.shared.metrics
    }
}

impl<A> Drop for Debouncer<A> {
    fn drop(&mut self) {
        let mut slot = lock(&self.shared.slot);
        if slot.period.cancel() {
            tracing::trace!("pending debounced call cancelled on drop");
        }
        if let Some(task) = slot.task.take() {
            task.abort();
        }
    }
}

impl<A> fmt::Debug for Debouncer<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Debouncer")
            .field("delay", &self.delay)
            .field("pending", &self.is_pending())
            .finish_non_exhaustive()
    }
}
