//! In-memory implementation of the OwnershipStore trait.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence.

use std::sync::RwLock;

use async_trait::async_trait;

use pkgacl_core::{
    AclRole, AclStatus, CollectionRef, CollectionStatus, GrantRecord, Identity, ListingRecord,
    ListingStatus, OwnershipGraph, PackageRef,
};

use crate::error::{Result, StoreError};
use crate::traits::OwnershipStore;

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
/// Rows are kept in vectors so insertion order survives into the graph.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    collections: Vec<CollectionRow>,
    packages: Vec<PackageRow>,
    listings: Vec<ListingRow>,
}

struct CollectionRow {
    name: String,
    version: String,
    branch: String,
    status: CollectionStatus,
}

struct PackageRow {
    name: String,
    summary: String,
}

struct ListingRow {
    package: String,
    branch: String,
    owner: Identity,
    qa_contact: Option<Identity>,
    status: ListingStatus,
    grants: Vec<GrantRow>,
}

struct GrantRow {
    identity: Identity,
    role: AclRole,
    status: AclStatus,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner::default()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned(e: impl std::fmt::Display) -> StoreError {
    StoreError::Unavailable(format!("lock poisoned: {}", e))
}

#[async_trait]
impl OwnershipStore for MemoryStore {
    async fn read_graph(&self) -> Result<OwnershipGraph> {
        let inner = self.inner.read().map_err(poisoned)?;

        let mut graph = OwnershipGraph::new();
        for listing in &inner.listings {
            if listing.status == ListingStatus::Removed {
                continue;
            }

            let collection = inner
                .collections
                .iter()
                .find(|c| c.branch == listing.branch)
                .ok_or_else(|| {
                    StoreError::InvalidData(format!("listing references unknown branch {}", listing.branch))
                })?;
            let package = inner
                .packages
                .iter()
                .find(|p| p.name == listing.package)
                .ok_or_else(|| {
                    StoreError::InvalidData(format!("listing references unknown package {}", listing.package))
                })?;

            graph.push(ListingRecord {
                collection: CollectionRef {
                    name: collection.name.clone(),
                    version: collection.version.clone(),
                    branch: collection.branch.clone(),
                    status: collection.status,
                },
                package: PackageRef {
                    name: package.name.clone(),
                    summary: package.summary.clone(),
                },
                owner: listing.owner.clone(),
                qa_contact: listing.qa_contact.clone(),
                grants: listing
                    .grants
                    .iter()
                    .filter(|g| g.status == AclStatus::Approved)
                    .map(|g| GrantRecord {
                        identity: g.identity.clone(),
                        role: g.role,
                    })
                    .collect(),
            });
        }

        Ok(graph)
    }

    async fn create_collection(
        &self,
        name: &str,
        version: &str,
        branch: &str,
        status: CollectionStatus,
    ) -> Result<()> {
        let mut inner = self.inner.write().map_err(poisoned)?;

        if inner.collections.iter().any(|c| c.branch == branch) {
            return Err(StoreError::AlreadyExists(format!("collection branch {}", branch)));
        }

        inner.collections.push(CollectionRow {
            name: name.to_string(),
            version: version.to_string(),
            branch: branch.to_string(),
            status,
        });
        Ok(())
    }

    async fn create_package(&self, name: &str, summary: &str) -> Result<()> {
        let mut inner = self.inner.write().map_err(poisoned)?;

        if inner.packages.iter().any(|p| p.name == name) {
            return Err(StoreError::AlreadyExists(format!("package {}", name)));
        }

        inner.packages.push(PackageRow {
            name: name.to_string(),
            summary: summary.to_string(),
        });
        Ok(())
    }

    async fn create_listing(
        &self,
        package: &str,
        branch: &str,
        owner: Identity,
        qa_contact: Option<Identity>,
    ) -> Result<()> {
        let mut inner = self.inner.write().map_err(poisoned)?;

        if !inner.packages.iter().any(|p| p.name == package) {
            return Err(StoreError::NotFound(format!("package {}", package)));
        }
        if !inner.collections.iter().any(|c| c.branch == branch) {
            return Err(StoreError::NotFound(format!("collection branch {}", branch)));
        }
        if inner
            .listings
            .iter()
            .any(|l| l.package == package && l.branch == branch)
        {
            return Err(StoreError::AlreadyExists(format!("listing {}/{}", package, branch)));
        }

        inner.listings.push(ListingRow {
            package: package.to_string(),
            branch: branch.to_string(),
            owner,
            qa_contact,
            status: ListingStatus::Approved,
            grants: Vec::new(),
        });
        Ok(())
    }

    async fn set_listing_status(
        &self,
        package: &str,
        branch: &str,
        status: ListingStatus,
    ) -> Result<()> {
        let mut inner = self.inner.write().map_err(poisoned)?;

        let listing = inner
            .listings
            .iter_mut()
            .find(|l| l.package == package && l.branch == branch)
            .ok_or_else(|| StoreError::NotFound(format!("listing {}/{}", package, branch)))?;

        listing.status = status;
        Ok(())
    }

    async fn set_grant(
        &self,
        package: &str,
        branch: &str,
        identity: Identity,
        role: AclRole,
        status: AclStatus,
    ) -> Result<()> {
        let mut inner = self.inner.write().map_err(poisoned)?;

        let listing = inner
            .listings
            .iter_mut()
            .find(|l| l.package == package && l.branch == branch)
            .ok_or_else(|| StoreError::NotFound(format!("listing {}/{}", package, branch)))?;

        if let Some(grant) = listing
            .grants
            .iter_mut()
            .find(|g| g.identity == identity && g.role == role)
        {
            grant.status = status;
        } else {
            listing.grants.push(GrantRow {
                identity,
                role,
                status,
            });
        }
        Ok(())
    }
}
