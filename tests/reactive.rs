//! Integration tests for the reactive bindings.

#![cfg(feature = "test-helpers")]

use call_guard::infrastructure::mocks::CallRecorder;
use call_guard::{use_debounce, use_throttle};
use std::time::Duration;
use tokio::time::{sleep, timeout};

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[tokio::test(start_paused = true)]
async fn test_debounced_value_publishes_once_per_burst() {
    let query = use_debounce(String::new(), ms(300)).unwrap();
    let mut updates = query.subscribe();

    for text in ["s", "st", "str", "strike"] {
        query.set(text.to_string());
        sleep(ms(50)).await;
    }
    assert!(query.is_settling());
    assert_eq!(query.get(), "");

    updates.changed().await.unwrap();
    assert_eq!(*updates.borrow_and_update(), "strike");
    assert!(!query.is_settling());

    // No further change is published
    let next = timeout(ms(1000), updates.changed()).await;
    assert!(next.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_throttled_callback_survives_rerender() {
    let recorder = CallRecorder::new();
    let mut callback = use_throttle(recorder.sink(), ms(1000));

    // Each "render" rebuilds the handler from the previous one
    for offset in 0..10u32 {
        callback = callback.clone();
        callback.call(offset);
        sleep(ms(150)).await;
    }

    // Calls at t=0 and t=1050 pass
    assert_eq!(recorder.args(), vec![0, 7]);
    assert_eq!(callback.throttler().metrics().calls_suppressed(), 8);
}
