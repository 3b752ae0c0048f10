//! Bindings for reactive UI layers.
//!
//! A reactive UI re-runs its view code on every state change ("render").
//! These bindings expose the timing controllers in a shape such a layer can
//! hold across renders:
//!
//! - [`use_debounce`] produces a value that follows its input only after the
//!   input stopped changing for `delay`, published through a
//!   `tokio::sync::watch` channel the UI can await.
//! - [`use_throttle`] produces a cloneable callback whose throttle state is
//!   shared by every clone, so re-creating the callback on each render never
//!   resets the window.

use crate::application::debouncer::{BuildError, Debouncer};
use crate::application::throttler::Throttler;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// A value that trails its input by a quiet period.
pub struct DebouncedValue<T> {
    debouncer: Debouncer<T>,
    sender: Arc<watch::Sender<T>>,
}

/// Create a debounced value starting at `initial`.
///
/// For the default 300ms delay use
/// [`TimingConfig::debounced_value`](crate::TimingConfig::debounced_value).
///
/// # Errors
/// Returns `BuildError::NoRuntime` outside a tokio runtime.
///
/// # Example
/// ```
/// use call_guard::use_debounce;
/// use std::time::Duration;
///
/// # #[tokio::main(flavor = "current_thread", start_paused = true)]
/// # async fn main() {
/// let search = use_debounce(String::new(), Duration::from_millis(300)).unwrap();
/// let mut updates = search.subscribe();
///
/// search.set("striker".to_string());
/// assert_eq!(search.get(), "");
///
/// updates.changed().await.unwrap();
/// assert_eq!(search.get(), "striker");
/// # }
/// ```
pub fn use_debounce<T>(initial: T, delay: Duration) -> Result<DebouncedValue<T>, BuildError>
where
    T: Send + Sync + 'static,
{
    let (sender, _) = watch::channel(initial);
    let sender = Arc::new(sender);
    let publish = Arc::clone(&sender);

    let debouncer = Debouncer::builder(move |value: T| {
        publish.send_replace(value);
    })
    .with_delay(delay)
    .build()?;

    Ok(DebouncedValue { debouncer, sender })
}

impl<T> DebouncedValue<T>
where
    T: Send + Sync + 'static,
{
    /// Feed a new input value.
    ///
    /// The published value changes once no further input arrives for the
    /// configured delay.
    pub fn set(&self, value: T) {
        self.debouncer.call(value);
    }

    /// The current debounced value.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.sender.borrow().clone()
    }

    /// Subscribe to changes of the debounced value.
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.sender.subscribe()
    }

    /// Whether an input is waiting for its quiet period to elapse.
    pub fn is_settling(&self) -> bool {
        self.debouncer.is_pending()
    }
}

impl<T: fmt::Debug> fmt::Debug for DebouncedValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebouncedValue")
            .field("value", &*self.sender.borrow())
            .field("debouncer", &self.debouncer)
            .finish()
    }
}

/// A throttled callback whose state persists across clones.
///
/// Clone it freely (for example once per render); every clone shares one
/// throttle window.
pub struct ThrottledCallback<F> {
    inner: Arc<Throttler<F>>,
}

/// Create a throttled callback with the given window.
///
/// For the default 1s window use
/// [`TimingConfig::throttled_callback`](crate::TimingConfig::throttled_callback).
///
/// # Example
/// ```
/// use call_guard::use_throttle;
/// use std::time::Duration;
///
/// let on_scroll = use_throttle(|offset: u32| offset, Duration::from_millis(100));
/// let next_render = on_scroll.clone();
///
/// assert_eq!(on_scroll.call(10), Some(10));
/// assert_eq!(next_render.call(20), None); // same window
/// ```
pub fn use_throttle<F>(target: F, limit: Duration) -> ThrottledCallback<F> {
    ThrottledCallback {
        inner: Arc::new(Throttler::new(target).with_limit(limit)),
    }
}

impl<F> ThrottledCallback<F> {
    /// Wrap an already configured throttler.
    pub fn from_throttler(throttler: Throttler<F>) -> Self {
        Self {
            inner: Arc::new(throttler),
        }
    }

    /// Invoke the target unless the shared window is open.
    pub fn call<A, R>(&self, args: A) -> Option<R>
    where
        F: Fn(A) -> R,
    {
        self.inner.call(args)
    }

    /// The underlying throttler.
    pub fn throttler(&self) -> &Throttler<F> {
        &self.inner
    }
}

impl<F> Clone for ThrottledCallback<F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<F> fmt::Debug for ThrottledCallback<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ThrottledCallback").field(&self.inner).finish()
    }
}
