//! # RondaGuard Database Crate
//!
//! This crate acts as a high-level, application-specific interface to the
//! SQLite database. It is the system's "permanent archive."
//!
//! ## Architectural Principles
//!
//! - **Layer 3 Adapter:** This crate is an adapter that encapsulates all database-specific
//!   logic. It provides a clean, abstract API to the rest of the application, hiding
//!   the underlying SQL and database implementation details.
//! - **Aggregates, not rows:** Callers hand over and receive whole entities
//!   (a task with its checklist, a round with its photos); every multi-table
//!   write happens inside a single transaction so partial writes are never
//!   observable.
//! - **Asynchronous & Pooled:** All operations are asynchronous, and it uses a
//!   bounded connection pool (`SqlitePool`) for concurrent database access.
//!
//! ## Public API
//!
//! - `connect`: The async function to establish the database connection pool.
//! - `run_migrations`: A utility to apply database migrations, ensuring the schema is up-to-date.
//! - `DbRepository`: The main struct that holds the connection pool and provides all
//!   the high-level data access methods (e.g., `upsert_task`, `list_rounds`).
//! - `DbError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod repository;
pub mod testing;

mod rows;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{PoolSettings, connect, run_migrations};
pub use error::DbError;
pub use repository::{DbRepository, LoginOutcome};
