//! Mock implementations for testing.
//!
//! This module provides test doubles for infrastructure adapters,
//! enabling controlled testing of the controllers.

pub mod clock;
pub mod layer;
pub mod recorder;

pub use clock::MockClock;
pub use layer::{CapturedEvent, MockCaptureLayer};
pub use recorder::{CallRecorder, RecordedCall};
