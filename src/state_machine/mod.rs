//! # Status State Machine
//!
//! Lifecycle status enums for batches and cards, plus the read-side
//! display-status projection. Transitions themselves are enforced at the
//! database layer through predicate-guarded updates (see the model
//! mutators), so the enums here stay plain data.

pub mod projection;
pub mod states;

pub use projection::{display_status, display_status_raw, DisplayStatus};
pub use states::{BatchStatus, CardStatus, PrintStatus};
