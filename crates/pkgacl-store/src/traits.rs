//! OwnershipStore trait: the abstract interface for the ownership registry.
//!
//! This trait allows the export pipeline to be storage-agnostic.
//! Implementations include SQLite (primary) and in-memory (for tests).

use async_trait::async_trait;
use pkgacl_core::{
    AclRole, AclStatus, CollectionStatus, Identity, ListingStatus, OwnershipGraph,
};

use crate::error::Result;

/// The OwnershipStore trait: async interface for ownership persistence.
///
/// `read_graph` is the only method the export pipeline calls. The mutators
/// are the surface the administrative layer commits through; every one of
/// its committed writes must be followed by a cache `invalidate()` call,
/// which is the caller's responsibility, not the store's.
///
/// # Design Notes
///
/// - **Read filtering**: `read_graph` excludes listings with status
///   `removed` and grants whose approval status is not `approved`.
/// - **Order**: listings and grants come back in insertion order; this is
///   the stable tie-break for all export sorting.
/// - **No silent retries**: an unreachable store surfaces
///   [`StoreError::Unavailable`](crate::StoreError::Unavailable) directly.
#[async_trait]
pub trait OwnershipStore: Send + Sync {
    /// Read the current approved ownership graph.
    ///
    /// Side-effect-free. Grants referencing a role outside the closed set
    /// are skipped and logged rather than failing the read.
    async fn read_graph(&self) -> Result<OwnershipGraph>;

    /// Create a collection (a named, versioned distribution branch).
    ///
    /// Fails with `AlreadyExists` if the branch identifier is taken.
    async fn create_collection(
        &self,
        name: &str,
        version: &str,
        branch: &str,
        status: CollectionStatus,
    ) -> Result<()>;

    /// Create a package. Fails with `AlreadyExists` on duplicate name.
    async fn create_package(&self, name: &str, summary: &str) -> Result<()>;

    /// Associate a package with a collection branch.
    ///
    /// The listing starts with status `approved`. Fails with `NotFound`
    /// if package or branch is unknown, `AlreadyExists` on duplicates.
    async fn create_listing(
        &self,
        package: &str,
        branch: &str,
        owner: Identity,
        qa_contact: Option<Identity>,
    ) -> Result<()>;

    /// Change the lifecycle status of a listing.
    async fn set_listing_status(
        &self,
        package: &str,
        branch: &str,
        status: ListingStatus,
    ) -> Result<()>;

    /// Upsert a role grant on a listing.
    ///
    /// An existing grant for the same (identity, role) pair has its
    /// approval status replaced.
    async fn set_grant(
        &self,
        package: &str,
        branch: &str,
        identity: Identity,
        role: AclRole,
        status: AclStatus,
    ) -> Result<()>;
}
