//! # pkgacl Testkit
//!
//! Testing utilities for the pkgacl workspace.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: the shared sample ownership dataset, as a ready-made
//!   graph and as a store populator
//! - **Fault injection**: [`FlakyStore`] for exercising unavailable-store
//!   paths
//! - **Generators**: proptest strategies for graphs, identities, and
//!   adversarial field text
//!
//! ## Fixtures
//!
//! ```rust,no_run
//! use pkgacl_store::MemoryStore;
//! use pkgacl_testkit::fixtures::populate_sample;
//!
//! async fn example() {
//!     let store = MemoryStore::new();
//!     populate_sample(&store).await.unwrap();
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use pkgacl_testkit::generators::ownership_graph;
//!
//! proptest! {
//!     #[test]
//!     fn aggregation_never_panics(graph in ownership_graph(16)) {
//!         // ...
//!     }
//! }
//! ```

pub mod fixtures;
pub mod flaky;
pub mod generators;

pub use fixtures::{populate_sample, sample_graph};
pub use flaky::FlakyStore;

/// Install a test subscriber for tracing output. Safe to call repeatedly.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
