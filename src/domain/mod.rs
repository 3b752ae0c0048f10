//! Domain layer - pure timing state with no external dependencies.
//!
//! This layer contains the decision logic behind each controller:
//! - Quiet-period tracking for debouncing
//! - Fixed suppression windows for throttling
//! - The idle/in-flight/cooldown machine for submissions
//!
//! Every type here takes the current instant as an argument, so all of
//! them are deterministic and easily testable.

pub mod debounce;
pub mod policy;
pub mod submission;
