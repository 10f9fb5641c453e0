//! Test fixtures and helpers.
//!
//! One shared sample dataset, available two ways: [`sample_graph`] builds
//! the ownership graph directly for pure aggregation tests, and
//! [`populate_sample`] seeds a store with the same facts through the
//! mutator surface so end-to-end tests see an identical graph from
//! `read_graph`. The dataset includes an awaiting grant and a removed
//! listing, both of which must never reach an export.

use pkgacl_core::{
    AclRole, AclStatus, CollectionRef, CollectionStatus, GrantRecord, Identity, ListingRecord,
    ListingStatus, OwnershipGraph, PackageRef,
};
use pkgacl_store::{OwnershipStore, Result};

fn master() -> CollectionRef {
    CollectionRef {
        name: "Fedora".to_string(),
        version: "devel".to_string(),
        branch: "master".to_string(),
        status: CollectionStatus::Active,
    }
}

fn f19() -> CollectionRef {
    CollectionRef {
        name: "Fedora".to_string(),
        version: "19".to_string(),
        branch: "f19".to_string(),
        status: CollectionStatus::Active,
    }
}

fn record(
    collection: CollectionRef,
    name: &str,
    summary: &str,
    owner: Identity,
    grants: &[(Identity, AclRole)],
) -> ListingRecord {
    ListingRecord {
        collection,
        package: PackageRef {
            name: name.to_string(),
            summary: summary.to_string(),
        },
        owner,
        qa_contact: None,
        grants: grants
            .iter()
            .map(|(identity, role)| GrantRecord {
                identity: identity.clone(),
                role: *role,
            })
            .collect(),
    }
}

/// The sample ownership graph, as `read_graph` would return it.
pub fn sample_graph() -> OwnershipGraph {
    let toshio = Identity::person("toshio");
    let pingou = Identity::person("pingou");
    let spot = Identity::person("spot");
    let test = Identity::person("test");
    let perl_sig = Identity::group("perl-sig");

    [
        record(
            master(),
            "geany",
            "IDE",
            toshio.clone(),
            &[
                (pingou.clone(), AclRole::WatchBugs),
                (pingou.clone(), AclRole::WatchCommits),
                (pingou.clone(), AclRole::Commit),
            ],
        ),
        record(
            f19(),
            "geany",
            "IDE",
            toshio.clone(),
            &[
                (pingou.clone(), AclRole::WatchCommits),
                (pingou.clone(), AclRole::Commit),
            ],
        ),
        record(
            master(),
            "guake",
            "Drop down terminal",
            pingou.clone(),
            &[
                (spot.clone(), AclRole::WatchBugs),
                (spot.clone(), AclRole::Commit),
            ],
        ),
        record(f19(), "guake", "Drop down terminal", pingou.clone(), &[]),
        record(
            master(),
            "python-gpgme",
            "GPG module in python",
            toshio.clone(),
            &[],
        ),
        record(
            f19(),
            "python-gpgme",
            "GPG module in python",
            toshio.clone(),
            &[],
        ),
        record(master(), "perl-foo", "Foo in perl", perl_sig.clone(), &[]),
        record(f19(), "perl-foo", "Foo in perl", perl_sig.clone(), &[]),
        record(master(), "perl-bar", "Bar in perl", perl_sig.clone(), &[]),
        record(
            master(),
            "test",
            "test",
            pingou.clone(),
            &[
                (test.clone(), AclRole::WatchBugs),
                (test.clone(), AclRole::Commit),
            ],
        ),
        record(f19(), "test", "test", pingou.clone(), &[]),
        record(
            master(),
            "test2",
            "test",
            test.clone(),
            &[
                (pingou.clone(), AclRole::WatchBugs),
                (pingou.clone(), AclRole::Commit),
            ],
        ),
        record(f19(), "test2", "test", test.clone(), &[]),
    ]
    .into_iter()
    .collect()
}

/// Seed a store with the sample dataset through the mutator surface.
///
/// Includes facts that must be filtered on read: an awaiting commit grant
/// on geany/master and a removed listing for `retired-tool`.
pub async fn populate_sample<S: OwnershipStore>(store: &S) -> Result<()> {
    let toshio = Identity::person("toshio");
    let pingou = Identity::person("pingou");
    let spot = Identity::person("spot");
    let test = Identity::person("test");
    let perl_sig = Identity::group("perl-sig");

    store
        .create_collection("Fedora", "devel", "master", CollectionStatus::Active)
        .await?;
    store
        .create_collection("Fedora", "19", "f19", CollectionStatus::Active)
        .await?;

    store.create_package("geany", "IDE").await?;
    store.create_package("guake", "Drop down terminal").await?;
    store
        .create_package("python-gpgme", "GPG module in python")
        .await?;
    store.create_package("perl-foo", "Foo in perl").await?;
    store.create_package("perl-bar", "Bar in perl").await?;
    store.create_package("test", "test").await?;
    store.create_package("test2", "test").await?;
    store.create_package("retired-tool", "obsolete tool").await?;

    // Listing creation order matches `sample_graph` so insertion-order
    // tie-breaks agree between the two fixtures.
    for (package, owner) in [
        ("geany", &toshio),
        ("guake", &pingou),
        ("python-gpgme", &toshio),
        ("perl-foo", &perl_sig),
    ] {
        for branch in ["master", "f19"] {
            store
                .create_listing(package, branch, owner.clone(), None)
                .await?;
        }
    }
    store
        .create_listing("perl-bar", "master", perl_sig.clone(), None)
        .await?;
    for (package, owner) in [("test", &pingou), ("test2", &test)] {
        for branch in ["master", "f19"] {
            store
                .create_listing(package, branch, owner.clone(), None)
                .await?;
        }
    }
    store
        .create_listing("retired-tool", "master", toshio.clone(), None)
        .await?;
    store
        .set_listing_status("retired-tool", "master", ListingStatus::Removed)
        .await?;

    for role in [AclRole::WatchBugs, AclRole::WatchCommits, AclRole::Commit] {
        store
            .set_grant("geany", "master", pingou.clone(), role, AclStatus::Approved)
            .await?;
    }
    for role in [AclRole::WatchCommits, AclRole::Commit] {
        store
            .set_grant("geany", "f19", pingou.clone(), role, AclStatus::Approved)
            .await?;
    }
    // Must never surface in read_graph.
    store
        .set_grant(
            "geany",
            "master",
            Identity::person("kevin"),
            AclRole::Commit,
            AclStatus::Awaiting,
        )
        .await?;

    for role in [AclRole::WatchBugs, AclRole::Commit] {
        store
            .set_grant("guake", "master", spot.clone(), role, AclStatus::Approved)
            .await?;
        store
            .set_grant("test", "master", test.clone(), role, AclStatus::Approved)
            .await?;
        store
            .set_grant("test2", "master", pingou.clone(), role, AclStatus::Approved)
            .await?;
    }

    Ok(())
}
