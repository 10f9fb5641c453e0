//! End-to-end export tests over the shared sample dataset.
//!
//! The expected bodies here are the contract with the external consumers;
//! any byte-level change to them is a breaking change.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use pkgacl::core::{
    AclRole, AclStatus, CollectionStatus, Identity, ListingStatus, OwnershipGraph,
};
use pkgacl::store::{MemoryStore, OwnershipStore, SqliteStore};
use pkgacl::{Consumer, ExportConfig, ExportError, Exporter, Format, StoreError};
use pkgacl_testkit::{init_tracing, populate_sample, FlakyStore};
use serde_json::{json, Value};

const BUGZILLA_BODY: &str = r"Fedora|geany|IDE|toshio|pingou
Fedora|guake|Drop down terminal|pingou|spot
Fedora|perl-bar|Bar in perl|group::perl-sig|
Fedora|perl-foo|Foo in perl|group::perl-sig|
Fedora|python-gpgme|GPG module in python|toshio|
Fedora|test|test|pingou|test
Fedora|test2|test|test|pingou";

const NOTIFY_BODY: &str = r"geany|toshio,pingou
guake|pingou,spot
python-gpgme|toshio
perl-foo|group::perl-sig
perl-bar|group::perl-sig
test|pingou,test
test2|test,pingou";

const VCS_BODY: &str = r"avail | @provenpackager,pingou,toshio | rpms/geany/master
avail | @provenpackager,pingou,toshio | rpms/geany/f19
avail | @provenpackager,pingou,spot | rpms/guake/master
avail | @provenpackager,pingou | rpms/guake/f19
avail | @provenpackager,toshio | rpms/python-gpgme/master
avail | @provenpackager,toshio | rpms/python-gpgme/f19
avail | @provenpackager,@perl-sig, | rpms/perl-foo/master
avail | @provenpackager,@perl-sig, | rpms/perl-foo/f19
avail | @provenpackager,@perl-sig, | rpms/perl-bar/master
avail | @provenpackager,pingou,test | rpms/test/master
avail | @provenpackager,pingou | rpms/test/f19
avail | @provenpackager,pingou,test | rpms/test2/master
avail | @provenpackager,test | rpms/test2/f19";

async fn sample_exporter() -> Exporter<MemoryStore> {
    init_tracing();
    let store = MemoryStore::new();
    populate_sample(&store).await.unwrap();
    Exporter::new(store, ExportConfig::default())
}

async fn export_string<S: OwnershipStore>(
    exporter: &Exporter<S>,
    consumer: Consumer,
    format: Format,
) -> String {
    let export = exporter.export(consumer, format).await.unwrap();
    String::from_utf8(export.bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_bugzilla_text_golden() {
    let exporter = sample_exporter().await;
    let text = export_string(&exporter, Consumer::Bugtracker, Format::Text).await;

    let (header, body) = text.split_once("\n\n").unwrap();
    let header_lines: Vec<&str> = header.lines().collect();
    assert_eq!(
        header_lines,
        vec![
            "# Package Database VCS Acls",
            "# Text Format",
            "# Collection|Package|Description|Owner|Initial QA|Initial CCList",
            "# Backslashes (\\) are escaped as \\u005c Pipes (|) are escaped as \\u007c",
        ]
    );
    assert_eq!(body, BUGZILLA_BODY);
}

#[tokio::test]
async fn test_notify_text_golden() {
    let exporter = sample_exporter().await;
    let text = export_string(&exporter, Consumer::Notify, Format::Text).await;
    assert_eq!(text, NOTIFY_BODY);
}

#[tokio::test]
async fn test_vcs_text_golden() {
    let exporter = sample_exporter().await;
    let text = export_string(&exporter, Consumer::Vcs, Format::Text).await;

    let (header, body) = text.split_once("\n\n").unwrap();
    assert_eq!(header, "# VCS ACLs\n# avail|@groups,users|rpms/Package/branch");
    assert_eq!(body, VCS_BODY);
}

#[tokio::test]
async fn test_bugzilla_json_entry() {
    let exporter = sample_exporter().await;
    let text = export_string(&exporter, Consumer::Bugtracker, Format::Json).await;
    let doc: Value = serde_json::from_str(&text).unwrap();

    assert_eq!(doc["title"], "Package Database -- Bugzilla ACLs");
    let fedora = doc["bugzillaAcls"]["Fedora"].as_array().unwrap();
    let gpgme = fedora.iter().find_map(|v| v.get("python-gpgme")).unwrap();
    assert_eq!(
        *gpgme,
        json!({
            "owner": "toshio",
            "cclist": {"groups": [], "people": []},
            "qacontact": null,
            "summary": "GPG module in python",
        })
    );
}

#[tokio::test]
async fn test_vcs_json_branch_keyed() {
    let exporter = sample_exporter().await;
    let text = export_string(&exporter, Consumer::Vcs, Format::Json).await;
    let doc: Value = serde_json::from_str(&text).unwrap();

    assert_eq!(doc["title"], "Package Database -- VCS ACLs");
    // The last aggregated package (test2) wins per branch.
    assert_eq!(
        doc["packageAcls"]["master"],
        json!({"commit": {"groups": ["provenpackager"], "people": ["pingou", "test"]}})
    );
    assert_eq!(
        doc["packageAcls"]["f19"],
        json!({"commit": {"groups": ["provenpackager"], "people": ["test"]}})
    );
}

#[tokio::test]
async fn test_determinism_across_all_targets() {
    let exporter = sample_exporter().await;
    for consumer in [Consumer::Bugtracker, Consumer::Notify, Consumer::Vcs] {
        for format in [Format::Text, Format::Json] {
            let a = exporter.export(consumer, format).await.unwrap();
            let b = exporter.export(consumer, format).await.unwrap();
            assert_eq!(a.bytes, b.bytes);
        }
    }
}

#[tokio::test]
async fn test_content_types() {
    let exporter = sample_exporter().await;
    let text = exporter.export(Consumer::Notify, Format::Text).await.unwrap();
    assert_eq!(text.content_type, "text/plain;charset=UTF-8");
    let json = exporter.export(Consumer::Notify, Format::Json).await.unwrap();
    assert_eq!(json.content_type, "application/json");
}

#[tokio::test]
async fn test_unknown_target_rejected() {
    let exporter = sample_exporter().await;
    let err = exporter.export_named("bugzilla2", "text").await.unwrap_err();
    assert!(matches!(err, ExportError::UnknownTarget(_)));
    let err = exporter.export_named("vcs", "xml").await.unwrap_err();
    assert!(matches!(err, ExportError::UnknownTarget(_)));

    exporter.export_named("bugtracker", "json").await.unwrap();
}

#[tokio::test]
async fn test_invalidation_reflects_mutation() {
    let exporter = sample_exporter().await;
    let before = export_string(&exporter, Consumer::Notify, Format::Text).await;

    exporter
        .store()
        .set_grant(
            "python-gpgme",
            "master",
            Identity::person("kevin"),
            AclRole::WatchBugs,
            AclStatus::Approved,
        )
        .await
        .unwrap();

    // Before invalidation the stale rendering may still be served.
    let stale = export_string(&exporter, Consumer::Notify, Format::Text).await;
    assert_eq!(stale, before);

    exporter.invalidate();
    let after = export_string(&exporter, Consumer::Notify, Format::Text).await;
    assert_ne!(after, before);
    assert!(after.contains("python-gpgme|toshio,kevin"));
}

#[tokio::test]
async fn test_invalidation_covers_every_target() {
    let exporter = sample_exporter().await;
    let before = export_string(&exporter, Consumer::Bugtracker, Format::Json).await;

    exporter
        .store()
        .set_listing_status("perl-bar", "master", ListingStatus::Removed)
        .await
        .unwrap();
    exporter.invalidate();

    let after = export_string(&exporter, Consumer::Bugtracker, Format::Json).await;
    assert_ne!(after, before);
    assert!(!after.contains("perl-bar"));
    let vcs = export_string(&exporter, Consumer::Vcs, Format::Text).await;
    assert!(!vcs.contains("perl-bar"));
}

#[tokio::test]
async fn test_stale_served_when_store_unavailable() {
    init_tracing();
    let store = FlakyStore::new(MemoryStore::new());
    populate_sample(store.inner()).await.unwrap();
    let exporter = Exporter::new(store, ExportConfig::default());

    let warm = export_string(&exporter, Consumer::Vcs, Format::Text).await;
    exporter.invalidate();
    exporter.store().set_failing(true);

    // Recomputation fails; the previous generation remains servable.
    let served = export_string(&exporter, Consumer::Vcs, Format::Text).await;
    assert_eq!(served, warm);

    exporter.store().set_failing(false);
    let recovered = export_string(&exporter, Consumer::Vcs, Format::Text).await;
    assert_eq!(recovered, warm);
}

#[tokio::test]
async fn test_cold_cache_propagates_store_error() {
    let store = FlakyStore::new(MemoryStore::new());
    store.set_failing(true);
    let exporter = Exporter::new(store, ExportConfig::default());

    let err = exporter
        .export(Consumer::Notify, Format::Text)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ExportError::Store(StoreError::Unavailable(_))
    ));
}

#[tokio::test]
async fn test_text_json_consistency_bugtracker() {
    let exporter = sample_exporter().await;
    let text = export_string(&exporter, Consumer::Bugtracker, Format::Text).await;
    let doc: Value = serde_json::from_str(
        &export_string(&exporter, Consumer::Bugtracker, Format::Json).await,
    )
    .unwrap();

    // (package, owner, cclist) triples from the text body.
    let mut from_text = Vec::new();
    let (_, body) = text.split_once("\n\n").unwrap();
    for line in body.lines() {
        let fields: Vec<&str> = line.split('|').collect();
        let cclist = fields.last().unwrap().to_string();
        from_text.push((fields[1].to_string(), fields[3].to_string(), cclist));
    }

    let mut from_json = Vec::new();
    for (_, packages) in doc["bugzillaAcls"].as_object().unwrap() {
        for wrapper in packages.as_array().unwrap() {
            for (name, entry) in wrapper.as_object().unwrap() {
                let groups = entry["cclist"]["groups"].as_array().unwrap();
                let people = entry["cclist"]["people"].as_array().unwrap();
                let cclist: Vec<String> = groups
                    .iter()
                    .map(|g| format!("group::{}", g.as_str().unwrap()))
                    .chain(people.iter().map(|p| p.as_str().unwrap().to_string()))
                    .collect();
                from_json.push((
                    name.clone(),
                    entry["owner"].as_str().unwrap().to_string(),
                    cclist.join(","),
                ));
            }
        }
    }
    assert_eq!(from_text, from_json);
}

#[tokio::test]
async fn test_text_json_consistency_notify() {
    let exporter = sample_exporter().await;
    let text = export_string(&exporter, Consumer::Notify, Format::Text).await;
    let doc: Value =
        serde_json::from_str(&export_string(&exporter, Consumer::Notify, Format::Json).await)
            .unwrap();

    let from_text: Vec<(String, String)> = text
        .lines()
        .map(|line| {
            let (pkg, list) = line.split_once('|').unwrap();
            (pkg.to_string(), list.to_string())
        })
        .collect();

    let from_json: Vec<(String, String)> = doc["packages"]
        .as_array()
        .unwrap()
        .iter()
        .flat_map(|wrapper| wrapper.as_object().unwrap())
        .map(|(name, list)| {
            let csv: Vec<&str> = list
                .as_array()
                .unwrap()
                .iter()
                .map(|v| v.as_str().unwrap())
                .collect();
            (name.clone(), csv.join(","))
        })
        .collect();

    assert_eq!(from_text, from_json);
}

#[tokio::test]
async fn test_sqlite_store_end_to_end() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("pkgacl.db");

    {
        let store = SqliteStore::open(&path)?;
        populate_sample(&store).await?;
        let exporter = Exporter::new(store, ExportConfig::default());
        let text = export_string(&exporter, Consumer::Notify, Format::Text).await;
        assert_eq!(text, NOTIFY_BODY);
    }

    // A fresh handle over the same file renders identical bytes.
    let store = SqliteStore::open(&path)?;
    let exporter = Exporter::new(store, ExportConfig::default());
    let text = export_string(&exporter, Consumer::Notify, Format::Text).await;
    assert_eq!(text, NOTIFY_BODY);
    let vcs = export_string(&exporter, Consumer::Vcs, Format::Text).await;
    let (_, body) = vcs.split_once("\n\n").unwrap();
    assert_eq!(body, VCS_BODY);
    Ok(())
}

/// Counts `read_graph` calls so coalescing is observable end to end.
struct CountingStore {
    inner: MemoryStore,
    reads: AtomicUsize,
}

#[async_trait]
impl OwnershipStore for CountingStore {
    async fn read_graph(&self) -> pkgacl::store::Result<OwnershipGraph> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.read_graph().await
    }

    async fn create_collection(
        &self,
        name: &str,
        version: &str,
        branch: &str,
        status: CollectionStatus,
    ) -> pkgacl::store::Result<()> {
        self.inner
            .create_collection(name, version, branch, status)
            .await
    }

    async fn create_package(&self, name: &str, summary: &str) -> pkgacl::store::Result<()> {
        self.inner.create_package(name, summary).await
    }

    async fn create_listing(
        &self,
        package: &str,
        branch: &str,
        owner: Identity,
        qa_contact: Option<Identity>,
    ) -> pkgacl::store::Result<()> {
        self.inner
            .create_listing(package, branch, owner, qa_contact)
            .await
    }

    async fn set_listing_status(
        &self,
        package: &str,
        branch: &str,
        status: ListingStatus,
    ) -> pkgacl::store::Result<()> {
        self.inner.set_listing_status(package, branch, status).await
    }

    async fn set_grant(
        &self,
        package: &str,
        branch: &str,
        identity: Identity,
        role: AclRole,
        status: AclStatus,
    ) -> pkgacl::store::Result<()> {
        self.inner
            .set_grant(package, branch, identity, role, status)
            .await
    }
}

#[tokio::test]
async fn test_concurrent_exports_read_store_once() {
    let store = CountingStore {
        inner: MemoryStore::new(),
        reads: AtomicUsize::new(0),
    };
    populate_sample(&store.inner).await.unwrap();
    let exporter = Arc::new(Exporter::new(store, ExportConfig::default()));

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let exporter = exporter.clone();
        tasks.push(tokio::spawn(async move {
            exporter.export(Consumer::Notify, Format::Text).await
        }));
    }
    let mut outputs = Vec::new();
    for task in tasks {
        outputs.push(task.await.unwrap().unwrap().bytes);
    }
    assert!(outputs.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(exporter.store().reads.load(Ordering::SeqCst), 1);
}
