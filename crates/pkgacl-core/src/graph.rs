//! The ownership graph: the intermediate representation between the
//! persistent store and the export aggregators.
//!
//! A graph is an ordered sequence of listing records, already filtered to
//! listings that are not removed and grants that are approved. Insertion
//! order is significant: it is the stable tie-break for every downstream
//! sort, so readers must preserve store order and aggregators must never
//! re-sort ambiguously.

use serde::{Deserialize, Serialize};

use crate::types::{AclRole, CollectionStatus, Identity};

/// The collection side of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionRef {
    /// Collection name, e.g. `Fedora`. Several branches may share a name.
    pub name: String,
    /// Version tag, e.g. `devel` or `19`.
    pub version: String,
    /// Branch identifier, e.g. `master` or `f19`. Unique per collection.
    pub branch: String,
    /// Lifecycle status.
    pub status: CollectionStatus,
}

impl CollectionRef {
    /// Full version string as reported to consumers, e.g. `Fedora 19`.
    pub fn full_version(&self) -> String {
        format!("{} {}", self.name, self.version)
    }
}

/// The package side of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRef {
    /// Package name.
    pub name: String,
    /// One-line summary.
    pub summary: String,
}

/// One approved role grant on a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantRecord {
    /// Holder of the grant.
    pub identity: Identity,
    /// Granted role.
    pub role: AclRole,
}

/// One package-in-collection association with its ownership facts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub collection: CollectionRef,
    pub package: PackageRef,
    /// Owner identity; a group owner means group-maintained.
    pub owner: Identity,
    /// Optional QA contact.
    pub qa_contact: Option<Identity>,
    /// Approved grants, in store order.
    pub grants: Vec<GrantRecord>,
}

impl ListingRecord {
    /// Iterate grant holders of one role, preserving grant order.
    pub fn holders_of(&self, role: AclRole) -> impl Iterator<Item = &Identity> {
        self.grants
            .iter()
            .filter(move |g| g.role == role)
            .map(|g| &g.identity)
    }
}

/// The full ownership graph, in store order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipGraph {
    listings: Vec<ListingRecord>,
}

impl OwnershipGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a listing record, preserving order.
    pub fn push(&mut self, listing: ListingRecord) {
        self.listings.push(listing);
    }

    /// Listings in store order.
    pub fn listings(&self) -> &[ListingRecord] {
        &self.listings
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }
}

impl FromIterator<ListingRecord> for OwnershipGraph {
    fn from_iter<T: IntoIterator<Item = ListingRecord>>(iter: T) -> Self {
        Self {
            listings: iter.into_iter().collect(),
        }
    }
}
