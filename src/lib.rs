#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Cardflow Core
//!
//! Rust core for ID-card batch issuance and print fulfillment.
//!
//! ## Overview
//!
//! Cardflow Core implements the batch lifecycle behind an ID-card admin
//! frontend: employees' card requests are imported from spreadsheet rows,
//! materialized into batches of cards, dispatched to external print
//! vendors, and rolled up to completion as vendors mark cards collected.
//! The frontend stays presentation-only; everything stateful lives here.
//!
//! ## Architecture
//!
//! The workflow is a set of orchestration services over PostgreSQL and an
//! HTTP object store. Each remote step commits independently (there is no
//! distributed transaction), so every step is written to be idempotent and
//! the status promotions are single predicate-guarded SQL statements that
//! stay correct under concurrent operators.
//!
//! ## Module Organization
//!
//! - [`ingest`] - header-alias resolution and typed canonical rows
//! - [`orchestration`] - batch session, saver, dispatcher, and rollup
//! - [`models`] - SQLx model layer for the fulfillment tables
//! - [`state_machine`] - status enums and the display-status projection
//! - [`storage`] - object storage seam, HTTP client, and test double
//! - [`render`] - card-face rendering for vendor dispatch
//! - [`database`] - connection handling and schema migrations
//! - [`config`] - environment-driven configuration
//! - [`error`] - crate-level error type
//! - [`logging`] - structured logging helpers
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use cardflow_core::config::CardflowConfig;
//! use cardflow_core::database::{DatabaseConnection, DatabaseMigrations};
//! use cardflow_core::ingest::{CellValue, SheetImport};
//! use cardflow_core::orchestration::{BatchSaver, BatchSession};
//! use cardflow_core::storage::HttpObjectStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CardflowConfig::from_env()?;
//! let db = DatabaseConnection::new().await?;
//! DatabaseMigrations::run_all(db.pool()).await?;
//!
//! let storage = Arc::new(HttpObjectStore::new(&config.storage));
//! let saver = BatchSaver::new(db.pool().clone(), storage, &config);
//!
//! let sheet = SheetImport::new(
//!     vec!["Full Name".into(), "Employee ID".into(), "Branch".into()],
//!     vec![vec![
//!         CellValue::Text("John Doe".into()),
//!         CellValue::Text("E100".into()),
//!         CellValue::Text("HYD".into()),
//!     ]],
//! );
//! let mut session = BatchSession::from_import(&sheet, Some("admin".into()));
//! let outcome = saver.save(&mut session).await?;
//! println!("saved {}", outcome.batch_ref);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod database;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod models;
pub mod orchestration;
pub mod render;
pub mod state_machine;
pub mod storage;

pub use config::{CardflowConfig, StorageConfig};
pub use constants::{batch_ref, branches, status_groups, system};
pub use constants::events as lifecycle_events;
pub use error::{CardflowError, Result};
pub use models::{
    CardBatch, Employee, IdCard, NewEmployee, NewIdCard, NewVendor, NewVendorRequest, Vendor,
    VendorRequest,
};
pub use orchestration::{
    BatchSaver, BatchSession, BoundBatch, CollectionOutcome, CompletionRollup, DeleteOutcome,
    DispatchError, DispatchOutcome, PrintDispatcher, RollupError, RollupOutcome, SaveError,
    SaveOutcome, SessionRow,
};
pub use state_machine::{display_status, BatchStatus, CardStatus, DisplayStatus, PrintStatus};
pub use storage::{HttpObjectStore, MemoryObjectStore, ObjectStorage, StorageError};
