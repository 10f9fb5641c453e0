//! Proptest generators for property-based testing.

use proptest::prelude::*;

use pkgacl_core::{
    AclRole, CollectionRef, CollectionStatus, GrantRecord, Identity, ListingRecord,
    OwnershipGraph, PackageRef,
};

/// Generate a plain account name.
pub fn account_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,15}".prop_map(String::from)
}

/// Generate a person or group identity.
pub fn identity() -> impl Strategy<Value = Identity> {
    prop_oneof![
        account_name().prop_map(Identity::person),
        account_name().prop_map(Identity::group),
    ]
}

/// Generate a role from the closed set.
pub fn acl_role() -> impl Strategy<Value = AclRole> {
    prop_oneof![
        Just(AclRole::WatchBugs),
        Just(AclRole::WatchCommits),
        Just(AclRole::Commit),
        Just(AclRole::ApproveAcls),
    ]
}

/// Generate a collection lifecycle status.
pub fn collection_status() -> impl Strategy<Value = CollectionStatus> {
    prop_oneof![
        Just(CollectionStatus::Active),
        Just(CollectionStatus::UnderDevelopment),
        Just(CollectionStatus::EndOfLife),
    ]
}

/// Generate summary text, including delimiter characters that must be
/// escaped in text renderings.
pub fn summary() -> impl Strategy<Value = String> {
    "[ -~]{0,40}".prop_map(String::from)
}

/// Generate a collection reference on one of a few branches.
pub fn collection_ref() -> impl Strategy<Value = CollectionRef> {
    (
        prop_oneof![Just("master"), Just("f19"), Just("f20")],
        collection_status(),
    )
        .prop_map(|(branch, status)| CollectionRef {
            name: "Fedora".to_string(),
            version: if branch == "master" { "devel" } else { &branch[1..] }.to_string(),
            branch: branch.to_string(),
            status,
        })
}

/// Generate one grant.
pub fn grant_record() -> impl Strategy<Value = GrantRecord> {
    (identity(), acl_role()).prop_map(|(identity, role)| GrantRecord { identity, role })
}

/// Generate a listing record with up to four grants.
pub fn listing_record() -> impl Strategy<Value = ListingRecord> {
    (
        collection_ref(),
        account_name(),
        summary(),
        identity(),
        prop::option::of(identity()),
        prop::collection::vec(grant_record(), 0..=4),
    )
        .prop_map(
            |(collection, package, summary, owner, qa_contact, grants)| ListingRecord {
                collection,
                package: PackageRef {
                    name: package,
                    summary,
                },
                owner,
                qa_contact,
                grants,
            },
        )
}

/// Generate a small ownership graph.
pub fn ownership_graph(max_listings: usize) -> impl Strategy<Value = OwnershipGraph> {
    prop::collection::vec(listing_record(), 0..=max_listings)
        .prop_map(|listings| listings.into_iter().collect())
}
