//! Keyed throttling.
//!
//! The registry keeps one independent throttle window per key, so a single
//! instance can protect many actions (one per form, per button, per user)
//! without creating a controller for each of them up front.

use crate::application::config::DEFAULT_THROTTLE_LIMIT;
use crate::application::metrics::Metrics;
use crate::application::ports::{Clock, Storage};
use crate::domain::policy::{CallDecision, ThrottleWindow};
use crate::infrastructure::clock::TokioClock;
use crate::infrastructure::storage::ShardedStorage;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

/// Registry of throttle windows, one per key.
///
/// Uses the Storage port for concurrent access. This type is generic over
/// the storage implementation; by default it uses `Arc<ShardedStorage>`.
///
/// Keys are only forgotten by [`prune`](Self::prune). Without a key limit
/// the caller is responsible for pruning; with
/// [`with_max_keys`](Self::with_max_keys) the registry prunes itself
/// whenever a new key takes it past the limit.
///
/// # Example
/// ```
/// use call_guard::ThrottleRegistry;
/// use std::time::Duration;
///
/// let registry = ThrottleRegistry::new(Duration::from_secs(1));
///
/// assert!(registry.check("save-lineup").is_invoke());
/// assert!(registry.check("save-lineup").is_drop());
/// assert!(registry.check("save-profile").is_invoke()); // independent key
/// ```
#[derive(Clone)]
pub struct ThrottleRegistry<K, S = Arc<ShardedStorage<K, ThrottleWindow>>>
where
    K: Hash + Eq + Clone + Send + Sync,
    S: Storage<K, ThrottleWindow> + Clone,
{
    storage: S,
    clock: Arc<dyn Clock>,
    limit: Duration,
    max_keys: Option<usize>,
    metrics: Metrics,
    _key: std::marker::PhantomData<fn(K)>,
}

impl<K> ThrottleRegistry<K>
where
    K: Hash + Eq + Clone + Send + Sync + Debug,
{
    /// Create a registry with in-memory sharded storage.
    pub fn new(limit: Duration) -> Self {
        Self::with_storage(
            Arc::new(ShardedStorage::new()),
            Arc::new(TokioClock::new()),
            limit,
        )
    }
}

impl<K> Default for ThrottleRegistry<K>
where
    K: Hash + Eq + Clone + Send + Sync + Debug,
{
    fn default() -> Self {
        Self::new(DEFAULT_THROTTLE_LIMIT)
    }
}

impl<K, S> ThrottleRegistry<K, S>
where
    K: Hash + Eq + Clone + Send + Sync,
    S: Storage<K, ThrottleWindow> + Clone,
{
    /// Create a registry over custom storage and clock.
    pub fn with_storage(storage: S, clock: Arc<dyn Clock>, limit: Duration) -> Self {
        Self {
            storage,
            clock,
            limit,
            max_keys: None,
            metrics: Metrics::new(),
            _key: std::marker::PhantomData,
        }
    }

    /// Prune closed windows automatically once more than `max_keys` keys
    /// are tracked.
    ///
    /// Keys whose window is still open are never evicted, since forgetting
    /// them would let a throttled action run again early. The registry can
    /// therefore exceed `max_keys` while that many windows are open.
    pub fn with_max_keys(mut self, max_keys: usize) -> Self {
        self.max_keys = Some(max_keys);
        self
    }

    /// Register a call for `key`, opening its window when closed.
    pub fn check(&self, key: K) -> CallDecision {
        let now = self.clock.now();
        let limit = self.limit;
        let decision = self.storage.with_entry_mut(
            key,
            || ThrottleWindow::new(limit),
            |window| window.register_call(now),
        );

        match decision {
            CallDecision::Invoke => {
                self.metrics.record_invoked();
                self.enforce_max_keys();
            }
            CallDecision::Drop => {
                self.metrics.record_suppressed();
                tracing::debug!("throttled call dropped for key");
            }
        }
        decision
    }

    /// Run `f` if the window for `key` is closed.
    pub fn call<R>(&self, key: K, f: impl FnOnce() -> R) -> Option<R> {
        match self.check(key) {
            CallDecision::Invoke => Some(f()),
            CallDecision::Drop => None,
        }
    }

    /// Forget keys whose window has closed.
    ///
    /// Returns the number of keys removed. A forgotten key behaves exactly
    /// like a key with a closed window, so pruning never changes decisions.
    pub fn prune(&self) -> usize {
        let now = self.clock.now();
        let before = self.storage.len();
        self.storage.retain(|_, window| window.is_open(now));
        before.saturating_sub(self.storage.len())
    }

    fn enforce_max_keys(&self) {
        let Some(max_keys) = self.max_keys else {
            return;
        };
        let tracked = self.storage.len();
        if tracked > max_keys {
            let removed = self.prune();
            tracing::debug!(tracked, removed, max_keys, "throttle registry pruned");
        }
    }

    /// Key limit set by [`with_max_keys`](Self::with_max_keys).
    pub fn max_keys(&self) -> Option<usize> {
        self.max_keys
    }

    /// Number of tracked keys.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Whether no key is tracked.
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Forget all keys, closing every window.
    pub fn clear(&self) {
        self.storage.clear();
    }

    /// Window length applied to every key.
    pub fn limit(&self) -> Duration {
        self.limit
    }

    /// Get a handle to the registry's metrics.
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::mocks::MockClock;
    use std::time::Instant;

    fn registry(clock: &MockClock) -> ThrottleRegistry<&'static str> {
        ThrottleRegistry::with_storage(
            Arc::new(ShardedStorage::new()),
            Arc::new(clock.clone()),
            Duration::from_millis(1000),
        )
    }

    #[test]
    fn test_keys_are_independent() {
        let clock = MockClock::new(Instant::now());
        let registry = registry(&clock);

        assert!(registry.check("lineup").is_invoke());
        assert!(registry.check("profile").is_invoke());
        assert!(registry.check("lineup").is_drop());
        assert!(registry.check("profile").is_drop());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_window_per_key_reopens() {
        let clock = MockClock::new(Instant::now());
        let registry = registry(&clock);

        assert_eq!(registry.call("lineup", || 1), Some(1));
        clock.advance_ms(200);
        assert_eq!(registry.call("lineup", || 2), None);
        clock.advance_ms(900);
        assert_eq!(registry.call("lineup", || 3), Some(3));

        assert_eq!(registry.metrics().calls_invoked(), 2);
        assert_eq!(registry.metrics().calls_suppressed(), 1);
    }

    #[test]
    fn test_prune_removes_closed_windows_only() {
        let clock = MockClock::new(Instant::now());
        let registry = registry(&clock);

        registry.check("old");
        clock.advance_ms(600);
        registry.check("fresh");
        clock.advance_ms(500);

        assert_eq!(registry.prune(), 1);
        assert_eq!(registry.len(), 1);
        assert!(registry.check("fresh").is_drop());
        assert!(registry.check("old").is_invoke());
    }

    #[test]
    fn test_clear() {
        let clock = MockClock::new(Instant::now());
        let registry = registry(&clock);

        registry.check("lineup");
        registry.clear();

        assert!(registry.is_empty());
        assert!(registry.check("lineup").is_invoke());
    }

    #[test]
    fn test_clones_share_windows() {
        let clock = MockClock::new(Instant::now());
        let registry = registry(&clock);
        let clone = registry.clone();

        assert!(registry.check("lineup").is_invoke());
        assert!(clone.check("lineup").is_drop());
    }

    #[test]
    fn test_max_keys_prunes_closed_windows() {
        let clock = MockClock::new(Instant::now());
        let registry = registry(&clock).with_max_keys(3);

        for key in ["a", "b", "c"] {
            registry.check(key);
        }
        clock.advance_ms(1000);

        // A fourth key passes the limit and the three closed windows go
        assert!(registry.check("d").is_invoke());
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.max_keys(), Some(3));
    }

    #[test]
    fn test_max_keys_keeps_open_windows() {
        let clock = MockClock::new(Instant::now());
        let registry = registry(&clock).with_max_keys(2);

        for key in ["a", "b", "c"] {
            assert!(registry.check(key).is_invoke());
        }

        assert_eq!(registry.len(), 3);
        assert!(registry.check("a").is_drop());
    }

    #[test]
    fn test_without_max_keys_nothing_is_pruned() {
        let clock = MockClock::new(Instant::now());
        let registry = registry(&clock);

        for key in ["a", "b", "c"] {
            registry.check(key);
        }
        clock.advance_ms(5000);
        registry.check("d");

        assert_eq!(registry.len(), 4);
    }
}
