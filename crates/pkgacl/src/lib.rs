//! # pkgacl
//!
//! A package-ownership ACL registry exposed to its external consumers -
//! the bug tracker, the notification system, and the version-control ACL
//! layer - as legacy byte-exact text and JSON renderings.
//!
//! ## Overview
//!
//! - **Graph**: ownership facts (collection, package, owner, grants) read
//!   from a store into an ordered intermediate representation
//! - **Aggregators**: one grouped view per consumer
//! - **Renderers**: text and JSON encodings with field escaping
//! - **Cache**: generation-counted memoization, invalidated as a unit on
//!   every committed write
//!
//! ## Usage
//!
//! ```rust,no_run
//! use pkgacl::{Consumer, ExportConfig, Exporter, Format};
//! use pkgacl::store::SqliteStore;
//!
//! async fn example() {
//!     let store = SqliteStore::open("pkgacl.db").unwrap();
//!     let exporter = Exporter::new(store, ExportConfig::default());
//!
//!     let export = exporter
//!         .export(Consumer::Bugtracker, Format::Text)
//!         .await
//!         .unwrap();
//!     println!("{}", String::from_utf8_lossy(&export.bytes));
//!
//!     // After any committed ownership write:
//!     exporter.invalidate();
//! }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `pkgacl::core` - data model (Identity, AclRole, OwnershipGraph)
//! - `pkgacl::store` - storage abstraction, SQLite and in-memory stores
//! - `pkgacl::export` - aggregators, renderers, targets, config

pub mod cache;
pub mod error;
pub mod exporter;

// Re-export component crates
pub use pkgacl_core as core;
pub use pkgacl_export as export;
pub use pkgacl_store as store;

// Re-export main types for convenience
pub use cache::ExportCache;
pub use error::{ExportError, Result};
pub use exporter::{Export, Exporter};

// Re-export commonly used component types
pub use pkgacl_core::{AclRole, AclStatus, Identity, ListingStatus, OwnershipGraph};
pub use pkgacl_export::{Consumer, ExportConfig, ExportTarget, Format, OwnerPlacement};
pub use pkgacl_store::{OwnershipStore, StoreError};
