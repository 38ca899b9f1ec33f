//! # Database Operations
//!
//! Connection management and schema migrations for the card fulfillment
//! tables.
//!
//! ## Key Components
//!
//! - [`connection`] - Pooled connection wrapper with health check
//! - [`migrations`] - File-discovered schema migrations with version
//!   tracking and an advisory-locked fresh-schema path for tests
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use cardflow_core::database::{DatabaseConnection, DatabaseMigrations};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = DatabaseConnection::new().await?;
//! DatabaseMigrations::run_all(db.pool()).await?;
//! # Ok(())
//! # }
//! ```

pub mod connection;
pub mod migrations;

pub use connection::DatabaseConnection;
pub use migrations::DatabaseMigrations;
