//! # pkgacl Store
//!
//! Storage abstraction for the package-ownership registry. Provides a
//! trait-based interface for reading the ownership graph and applying the
//! administrative mutations, with SQLite and in-memory implementations.
//!
//! ## Overview
//!
//! The export pipeline only ever calls [`OwnershipStore::read_graph`]; the
//! mutator methods exist for the (out-of-scope) administrative layer and
//! for tests. The primary implementation is [`SqliteStore`], with
//! [`MemoryStore`] for testing.
//!
//! ## Key Types
//!
//! - [`OwnershipStore`] - The async trait for all storage operations
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//!
//! ## Design Notes
//!
//! - **Order preservation**: `read_graph` returns listings and grants in
//!   insertion order; downstream sorts rely on it as their tie-break.
//! - **Filtering at the boundary**: removed listings and non-approved
//!   grants never reach the graph.
//! - **Malformed grants**: a persisted grant whose role is outside the
//!   closed set is skipped and logged, never fatal.

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::OwnershipStore;
