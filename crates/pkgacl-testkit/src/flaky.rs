//! A fault-injecting store wrapper.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use pkgacl_core::{
    AclRole, AclStatus, CollectionStatus, Identity, ListingStatus, OwnershipGraph,
};
use pkgacl_store::{OwnershipStore, Result, StoreError};

/// Wraps another store and fails `read_graph` with
/// [`StoreError::Unavailable`] while the fault flag is set.
///
/// Mutators pass through untouched so tests can seed data and then flip
/// the read path.
pub struct FlakyStore<S> {
    inner: S,
    failing: AtomicBool,
}

impl<S> FlakyStore<S> {
    /// Wrap a store with the fault flag clear.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            failing: AtomicBool::new(false),
        }
    }

    /// Set or clear the read fault.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// The wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: OwnershipStore> OwnershipStore for FlakyStore<S> {
    async fn read_graph(&self) -> Result<OwnershipGraph> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected fault".to_string()));
        }
        self.inner.read_graph().await
    }

    async fn create_collection(
        &self,
        name: &str,
        version: &str,
        branch: &str,
        status: CollectionStatus,
    ) -> Result<()> {
        self.inner
            .create_collection(name, version, branch, status)
            .await
    }

    async fn create_package(&self, name: &str, summary: &str) -> Result<()> {
        self.inner.create_package(name, summary).await
    }

    async fn create_listing(
        &self,
        package: &str,
        branch: &str,
        owner: Identity,
        qa_contact: Option<Identity>,
    ) -> Result<()> {
        self.inner
            .create_listing(package, branch, owner, qa_contact)
            .await
    }

    async fn set_listing_status(
        &self,
        package: &str,
        branch: &str,
        status: ListingStatus,
    ) -> Result<()> {
        self.inner.set_listing_status(package, branch, status).await
    }

    async fn set_grant(
        &self,
        package: &str,
        branch: &str,
        identity: Identity,
        role: AclRole,
        status: AclStatus,
    ) -> Result<()> {
        self.inner
            .set_grant(package, branch, identity, role, status)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pkgacl_store::MemoryStore;

    #[tokio::test]
    async fn test_fault_flag_gates_reads_only() {
        let store = FlakyStore::new(MemoryStore::new());
        store
            .create_collection("Fedora", "devel", "master", CollectionStatus::Active)
            .await
            .unwrap();

        store.set_failing(true);
        assert!(matches!(
            store.read_graph().await,
            Err(StoreError::Unavailable(_))
        ));
        // Mutators still pass through.
        store.create_package("geany", "IDE").await.unwrap();

        store.set_failing(false);
        store.read_graph().await.unwrap();
    }
}
