//! # pkgacl Core
//!
//! Pure data model for the package-ownership ACL registry: identities,
//! roles, lifecycle statuses, and the in-memory ownership graph that the
//! export pipeline consumes.
//!
//! This crate contains no I/O, no storage, no rendering. It is pure data
//! over which the store and export crates operate.
//!
//! ## Key Types
//!
//! - [`Identity`] - A person or a group, carried as data instead of the
//!   legacy `group::name` string sentinel
//! - [`AclRole`] - The closed set of grantable roles
//! - [`OwnershipGraph`] - Ordered intermediate representation of all
//!   approved ownership facts
//! - [`ListingRecord`] - One package-in-collection association with its
//!   owner, QA contact, and approved grants

pub mod error;
pub mod graph;
pub mod types;

pub use error::ModelError;
pub use graph::{CollectionRef, GrantRecord, ListingRecord, OwnershipGraph, PackageRef};
pub use types::{AclRole, AclStatus, CollectionStatus, Identity, ListingStatus};
