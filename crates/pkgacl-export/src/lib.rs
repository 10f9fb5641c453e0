//! # pkgacl Export
//!
//! The aggregation and rendering half of the export pipeline: pure
//! transforms from an [`OwnershipGraph`](pkgacl_core::OwnershipGraph) to
//! the legacy byte-exact encodings each external consumer expects.
//!
//! Three consumers, two formats each:
//!
//! - [`bugzilla`] - the bug tracker: grouped by collection name
//! - [`notify`] - the notification system: one entry per package
//! - [`vcs`] - the version-control ACL layer: grouped by package/branch
//!
//! Every function here is deterministic: identical graph state always
//! yields byte-identical renderings. Sorting is stable everywhere, with
//! graph insertion order as the tie-break.

pub mod bugzilla;
pub mod config;
pub mod escape;
pub mod notify;
pub mod target;
pub mod vcs;

pub use config::{ExportConfig, OwnerPlacement};
pub use escape::{escape_field, unescape_field};
pub use target::{Consumer, ExportTarget, Format, UnknownTarget};

use pkgacl_core::OwnershipGraph;

/// Run the aggregator and renderer for one target over a graph.
///
/// This is the single dispatch point the facade's cache recomputes
/// through; the consumer set is closed, so it is a plain match.
pub fn render(graph: &OwnershipGraph, target: ExportTarget, config: &ExportConfig) -> Vec<u8> {
    match target.consumer {
        Consumer::Bugtracker => {
            let view = bugzilla::aggregate(graph);
            match target.format {
                Format::Text => bugzilla::render_text(&view, config).into_bytes(),
                Format::Json => to_json_bytes(&bugzilla::render_json(&view, config)),
            }
        }
        Consumer::Notify => {
            let view = notify::aggregate(graph, config);
            match target.format {
                Format::Text => notify::render_text(&view).into_bytes(),
                Format::Json => to_json_bytes(&notify::render_json(&view, config)),
            }
        }
        Consumer::Vcs => {
            let view = vcs::aggregate(graph, config);
            match target.format {
                Format::Text => vcs::render_text(&view, config).into_bytes(),
                Format::Json => to_json_bytes(&vcs::render_json(&view, config)),
            }
        }
    }
}

fn to_json_bytes(value: &serde_json::Value) -> Vec<u8> {
    // Serializing an already-built `Value` to a Vec is infallible: no I/O,
    // and `Value` map keys are always strings.
    serde_json::to_vec(value).expect("JSON serialization failed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pkgacl_core::{
        AclRole, CollectionRef, CollectionStatus, GrantRecord, Identity, ListingRecord,
        OwnershipGraph, PackageRef,
    };

    fn small_graph() -> OwnershipGraph {
        [ListingRecord {
            collection: CollectionRef {
                name: "Fedora".to_string(),
                version: "devel".to_string(),
                branch: "master".to_string(),
                status: CollectionStatus::Active,
            },
            package: PackageRef {
                name: "geany".to_string(),
                summary: "IDE".to_string(),
            },
            owner: Identity::person("toshio"),
            qa_contact: None,
            grants: vec![GrantRecord {
                identity: Identity::person("pingou"),
                role: AclRole::WatchBugs,
            }],
        }]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_render_deterministic_for_all_targets() {
        let graph = small_graph();
        let config = ExportConfig::default();

        for consumer in Consumer::ALL {
            for format in [Format::Text, Format::Json] {
                let target = ExportTarget::new(consumer, format);
                let a = render(&graph, target, &config);
                let b = render(&graph, target, &config);
                assert_eq!(a, b, "non-deterministic rendering for {}", target);
            }
        }
    }

    #[test]
    fn test_json_targets_parse() {
        let graph = small_graph();
        let config = ExportConfig::default();

        for consumer in Consumer::ALL {
            let bytes = render(&graph, ExportTarget::new(consumer, Format::Json), &config);
            let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
            assert!(value.get("title").is_some());
        }
    }
}
