//! Version-control ACL aggregation and rendering.
//!
//! Groups by package, then by collection branch. The listing owner is an
//! implicit commit holder; the configured privileged group leads every
//! line. The text form keys entries by namespace/package/branch, while
//! the JSON form preserves the legacy branch-keyed map in which the most
//! recently aggregated package wins per branch.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use pkgacl_core::{AclRole, Identity, OwnershipGraph};
use serde_json::{json, Map, Value};

use crate::config::ExportConfig;
use crate::escape::escape_field;
use crate::target::Consumer;

/// The commit ACL for one package on one branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VcsEntry {
    pub package: String,
    pub branch: String,
    /// Bare group names: the privileged group first, the rest sorted.
    pub groups: Vec<String>,
    /// Person names, sorted ascending.
    pub people: Vec<String>,
}

/// The VCS grouped view: packages in first-seen order, branches within.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VcsView {
    pub entries: Vec<VcsEntry>,
}

struct PackageAccum {
    name: String,
    branch_order: Vec<String>,
    branches: HashMap<String, Vec<Identity>>,
}

impl PackageAccum {
    fn finish(mut self, privileged_group: &str) -> Vec<VcsEntry> {
        let name = self.name;
        self.branch_order
            .iter()
            .filter_map(|branch| {
                self.branches
                    .remove(branch)
                    .map(|holders| (branch.clone(), holders))
            })
            .map(|(branch, holders)| {
                let mut groups = Vec::new();
                let mut people = Vec::new();
                for identity in &holders {
                    if identity.is_group() {
                        groups.push(identity.name().to_string());
                    } else {
                        people.push(identity.name().to_string());
                    }
                }
                groups.sort();
                groups.dedup();
                groups.retain(|g| g != privileged_group);
                groups.insert(0, privileged_group.to_string());
                people.sort();
                people.dedup();
                VcsEntry {
                    package: name.clone(),
                    branch,
                    groups,
                    people,
                }
            })
            .collect()
    }
}

/// Group commit holders by package and branch.
pub fn aggregate(graph: &OwnershipGraph, config: &ExportConfig) -> VcsView {
    let mut packages: Vec<PackageAccum> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for listing in graph.listings() {
        let slot = *index
            .entry(listing.package.name.clone())
            .or_insert_with(|| {
                packages.push(PackageAccum {
                    name: listing.package.name.clone(),
                    branch_order: Vec::new(),
                    branches: HashMap::new(),
                });
                packages.len() - 1
            });
        let accum = &mut packages[slot];

        let holders = match accum.branches.entry(listing.collection.branch.clone()) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => {
                accum.branch_order.push(listing.collection.branch.clone());
                e.insert(Vec::new())
            }
        };
        // The owner holds commit implicitly.
        if !holders.contains(&listing.owner) {
            holders.push(listing.owner.clone());
        }
        for holder in listing.holders_of(AclRole::Commit) {
            if !holders.contains(holder) {
                holders.push(holder.clone());
            }
        }
    }

    VcsView {
        entries: packages
            .into_iter()
            .flat_map(|p| p.finish(&config.privileged_group))
            .collect(),
    }
}

/// Render the legacy `avail` line format.
///
/// The person list follows the group list after a comma even when empty,
/// which yields the historical trailing-comma form.
pub fn render_text(view: &VcsView, config: &ExportConfig) -> String {
    let mut out = String::new();
    out.push_str("# VCS ACLs\n");
    out.push_str(&format!(
        "# avail|@groups,users|{}/Package/branch\n",
        config.vcs_namespace
    ));
    out.push('\n');

    let lines: Vec<String> = view
        .entries
        .iter()
        .map(|entry| {
            let groups_csv = entry
                .groups
                .iter()
                .map(|g| format!("@{}", escape_field(g)))
                .collect::<Vec<_>>()
                .join(",");
            let people_csv = entry
                .people
                .iter()
                .map(|p| escape_field(p).into_owned())
                .collect::<Vec<_>>()
                .join(",");
            format!(
                "avail | {},{} | {}/{}/{}",
                groups_csv,
                people_csv,
                config.vcs_namespace,
                escape_field(&entry.package),
                escape_field(&entry.branch)
            )
        })
        .collect();
    out.push_str(&lines.join("\n"));
    out
}

/// Render the legacy branch-keyed JSON map.
pub fn render_json(view: &VcsView, config: &ExportConfig) -> Value {
    let mut acls = Map::new();
    for entry in &view.entries {
        let mut commit = Map::new();
        commit.insert("groups".to_string(), json!(entry.groups));
        commit.insert("people".to_string(), json!(entry.people));
        let mut branch = Map::new();
        branch.insert("commit".to_string(), Value::Object(commit));
        // Later packages overwrite earlier ones per branch.
        acls.insert(entry.branch.clone(), Value::Object(branch));
    }

    let mut doc = Map::new();
    doc.insert("title".to_string(), json!(config.title(Consumer::Vcs)));
    doc.insert("packageAcls".to_string(), Value::Object(acls));
    Value::Object(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pkgacl_core::{
        CollectionRef, CollectionStatus, GrantRecord, ListingRecord, PackageRef,
    };

    fn listing(pkg: &str, branch: &str, owner: Identity, committers: &[Identity]) -> ListingRecord {
        ListingRecord {
            collection: CollectionRef {
                name: "Fedora".to_string(),
                version: if branch == "master" { "devel" } else { "19" }.to_string(),
                branch: branch.to_string(),
                status: CollectionStatus::Active,
            },
            package: PackageRef {
                name: pkg.to_string(),
                summary: format!("{} summary", pkg),
            },
            owner,
            qa_contact: None,
            grants: committers
                .iter()
                .map(|c| GrantRecord {
                    identity: c.clone(),
                    role: AclRole::Commit,
                })
                .collect(),
        }
    }

    fn sample_graph() -> OwnershipGraph {
        [
            listing(
                "geany",
                "master",
                Identity::person("toshio"),
                &[Identity::person("pingou")],
            ),
            listing(
                "geany",
                "f19",
                Identity::person("toshio"),
                &[Identity::person("pingou")],
            ),
            listing("perl-foo", "master", Identity::group("perl-sig"), &[]),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_owner_is_implicit_commit_holder() {
        let view = aggregate(&sample_graph(), &ExportConfig::default());
        let entry = &view.entries[0];
        assert_eq!(entry.package, "geany");
        assert_eq!(entry.people, vec!["pingou", "toshio"]);
    }

    #[test]
    fn test_privileged_group_always_first() {
        let graph: OwnershipGraph = [listing(
            "foo",
            "master",
            Identity::group("a-sig"),
            &[Identity::group("provenpackager"), Identity::group("z-sig")],
        )]
        .into_iter()
        .collect();
        let view = aggregate(&graph, &ExportConfig::default());
        assert_eq!(
            view.entries[0].groups,
            vec!["provenpackager", "a-sig", "z-sig"]
        );
    }

    #[test]
    fn test_branches_grouped_per_package() {
        let graph: OwnershipGraph = [
            listing("geany", "master", Identity::person("toshio"), &[]),
            listing("guake", "master", Identity::person("pingou"), &[]),
            listing("geany", "f19", Identity::person("toshio"), &[]),
        ]
        .into_iter()
        .collect();
        let view = aggregate(&graph, &ExportConfig::default());
        let keys: Vec<_> = view
            .entries
            .iter()
            .map(|e| format!("{}/{}", e.package, e.branch))
            .collect();
        assert_eq!(keys, vec!["geany/master", "geany/f19", "guake/master"]);
    }

    #[test]
    fn test_text_group_owned_trailing_comma_line() {
        let view = aggregate(&sample_graph(), &ExportConfig::default());
        let text = render_text(&view, &ExportConfig::default());
        assert!(
            text.contains("avail | @provenpackager,@perl-sig, | rpms/perl-foo/master"),
            "missing group line in:\n{}",
            text
        );
    }

    #[test]
    fn test_text_people_line_has_no_trailing_comma() {
        let view = aggregate(&sample_graph(), &ExportConfig::default());
        let text = render_text(&view, &ExportConfig::default());
        assert!(text.contains("avail | @provenpackager,pingou,toshio | rpms/geany/master"));
        assert!(text.contains("avail | @provenpackager,pingou,toshio | rpms/geany/f19"));
    }

    #[test]
    fn test_text_header() {
        let view = aggregate(&OwnershipGraph::new(), &ExportConfig::default());
        let text = render_text(&view, &ExportConfig::default());
        assert!(text.starts_with("# VCS ACLs\n# avail|@groups,users|rpms/Package/branch\n\n"));
    }

    #[test]
    fn test_custom_namespace() {
        let config = ExportConfig {
            vcs_namespace: "modules".to_string(),
            ..ExportConfig::default()
        };
        let view = aggregate(&sample_graph(), &config);
        let text = render_text(&view, &config);
        assert!(text.contains(" | modules/geany/master"));
    }

    #[test]
    fn test_json_branch_keyed_last_package_wins() {
        let graph: OwnershipGraph = [
            listing("geany", "master", Identity::person("toshio"), &[]),
            listing(
                "guake",
                "master",
                Identity::person("pingou"),
                &[Identity::person("spot")],
            ),
        ]
        .into_iter()
        .collect();
        let view = aggregate(&graph, &ExportConfig::default());
        let doc = render_json(&view, &ExportConfig::default());
        assert_eq!(doc["title"], "Package Database -- VCS ACLs");
        assert_eq!(
            doc["packageAcls"]["master"],
            json!({"commit": {"groups": ["provenpackager"], "people": ["pingou", "spot"]}})
        );
    }

    #[test]
    fn test_json_empty_partitions_present() {
        let view = aggregate(
            &[listing("perl-foo", "master", Identity::group("perl-sig"), &[])]
                .into_iter()
                .collect(),
            &ExportConfig::default(),
        );
        let doc = render_json(&view, &ExportConfig::default());
        assert_eq!(
            doc["packageAcls"]["master"]["commit"]["people"],
            json!([])
        );
    }
}
