//! Clock adapters for time operations.
//!
//! Provides `TokioClock` (the default for every controller) and
//! `SystemClock`.
//!
//! # Testing
//!
//! See `MockClock` (in `crate::infrastructure::mocks`) for a controllable test clock.
//! Available with the `test-helpers` feature or in test builds:
//!
//! ```toml
//! [dev-dependencies]
//! call-guard = { version = "*", features = ["test-helpers"] }
//! ```

use crate::application::ports::Clock;
use std::time::Instant;

/// System clock implementation using `Instant::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Create a new system clock.
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that reads tokio's time source.
///
/// Identical to [`SystemClock`] in normal operation. When the tokio clock is
/// paused (`#[tokio::test(start_paused = true)]`), timestamps follow the
/// virtual time, keeping cooldown and window checks in step with
/// `tokio::time::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl TokioClock {
    /// Create a new tokio clock.
    pub fn new() -> Self {
        Self
    }
}

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_system_clock() {
        let clock = SystemClock::new();
        let t1 = clock.now();
        std::thread::sleep(Duration::from_millis(10));
        let t2 = clock.now();

        assert!(t2 > t1);
    }

    #[test]
    fn test_tokio_clock_without_runtime() {
        let clock = TokioClock::new();
        let t1 = clock.now();
        std::thread::sleep(Duration::from_millis(10));

        assert!(clock.now() > t1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_clock_follows_paused_time() {
        let clock = TokioClock::new();
        let t1 = clock.now();

        tokio::time::advance(Duration::from_secs(60)).await;

        assert_eq!(clock.now().duration_since(t1), Duration::from_secs(60));
    }
}
