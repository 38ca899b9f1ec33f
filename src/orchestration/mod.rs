//! # Batch Lifecycle Workflow
//!
//! The orchestration services that carry a batch from imported rows to
//! collected cards:
//!
//! - [`session`] - the explicit in-memory batch aggregate
//! - [`batch_saver`] - batch materialization (create or full replace)
//! - [`print_dispatcher`] - vendor dispatch with per-row isolation
//! - [`completion`] - completion rollup, collection, and batch deletion
//! - [`types`] - shared outcome types
//!
//! Remote steps commit independently; the failure policy of each service is
//! documented where it lives.

pub mod batch_saver;
pub mod completion;
pub mod print_dispatcher;
pub mod session;
pub mod types;

pub use batch_saver::{BatchSaver, SaveError};
pub use completion::{CompletionRollup, RollupError};
pub use print_dispatcher::{DispatchError, PrintDispatcher};
pub use session::{BatchSession, BoundBatch, SessionRow};
pub use types::{
    CollectionOutcome, DeleteOutcome, DispatchOutcome, RollupOutcome, RowFailure, SaveOutcome,
    SkippedRow,
};
