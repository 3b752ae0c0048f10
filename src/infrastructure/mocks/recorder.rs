//! Recording target for controller tests.

use crate::application::ports::Clock;
use crate::infrastructure::clock::TokioClock;
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// One recorded invocation of a wrapped target.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall<A> {
    pub args: A,
    pub at: Instant,
}

/// Records every invocation it receives, with a timestamp.
///
/// Use [`CallRecorder::sink`] as the target of a controller and inspect the
/// recorder afterwards. Timestamps come from [`TokioClock`] unless another
/// clock is supplied, so they follow paused tokio time in tests.
#[derive(Debug)]
pub struct CallRecorder<A> {
    calls: Arc<Mutex<Vec<RecordedCall<A>>>>,
    clock: Arc<dyn Clock>,
}

impl<A> CallRecorder<A>
where
    A: Send + 'static,
{
    /// Create a recorder timestamping with tokio's clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(TokioClock::new()))
    }

    /// Create a recorder timestamping with a custom clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            clock,
        }
    }

    /// A target closure that records into this recorder.
    pub fn sink(&self) -> impl Fn(A) + Send + Sync + Clone + 'static {
        let calls = Arc::clone(&self.calls);
        let clock = Arc::clone(&self.clock);
        move |args| {
            let at = clock.now();
            calls
                .lock()
                .expect("CallRecorder mutex poisoned - a test thread panicked while holding the lock")
                .push(RecordedCall { args, at });
        }
    }

    /// Number of recorded invocations.
    pub fn count(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Forget all recorded invocations.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<RecordedCall<A>>> {
        self.calls
            .lock()
            .expect("CallRecorder mutex poisoned - a test thread panicked while holding the lock")
    }
}

impl<A> CallRecorder<A>
where
    A: Clone + Send + 'static,
{
    /// All recorded invocations in order.
    pub fn calls(&self) -> Vec<RecordedCall<A>> {
        self.lock().clone()
    }

    /// Arguments of all recorded invocations in order.
    pub fn args(&self) -> Vec<A> {
        self.lock().iter().map(|c| c.args.clone()).collect()
    }
}

impl<A> Clone for CallRecorder<A> {
    fn clone(&self) -> Self {
        Self {
            calls: Arc::clone(&self.calls),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<A> Default for CallRecorder<A>
where
    A: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
