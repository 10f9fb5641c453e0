//! Notification-list aggregation and rendering.
//!
//! One entry per package, no collection grouping: listings across branches
//! merge, the owner from the most recently read listing wins, and the
//! notify list is the distinct watch-bugs and watch-commits holders in
//! first-seen order with the owner placed per
//! [`OwnerPlacement`](crate::config::OwnerPlacement).

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use pkgacl_core::{AclRole, Identity, OwnershipGraph};
use serde_json::{json, Map, Value};

use crate::config::{ExportConfig, OwnerPlacement};
use crate::escape::escape_field;
use crate::target::Consumer;

/// One package with its ordered notification list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyPackage {
    pub name: String,
    pub notify: Vec<Identity>,
}

/// The notification grouped view, packages in first-seen order.
///
/// `name`, `version`, and `eol` describe the collection when the view is
/// filtered to one branch; a whole-graph view leaves them unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotifyView {
    pub name: Option<String>,
    pub version: Option<String>,
    pub eol: bool,
    pub packages: Vec<NotifyPackage>,
}

struct NotifyAccum {
    owner: Identity,
    watchers: Vec<Identity>,
}

impl NotifyAccum {
    fn compose(self, placement: OwnerPlacement) -> Vec<Identity> {
        match placement {
            OwnerPlacement::First => {
                let mut list = vec![self.owner];
                for watcher in self.watchers {
                    if !list.contains(&watcher) {
                        list.push(watcher);
                    }
                }
                list
            }
            OwnerPlacement::Last => {
                let mut list = self.watchers;
                if !list.contains(&self.owner) {
                    list.push(self.owner);
                }
                list
            }
        }
    }
}

/// Aggregate the whole graph: one entry per package, no collection metadata.
pub fn aggregate(graph: &OwnershipGraph, config: &ExportConfig) -> NotifyView {
    let (packages, _) = collect(graph, config, None);
    NotifyView {
        name: None,
        version: None,
        eol: false,
        packages,
    }
}

/// Aggregate one collection branch, carrying its name/version/EOL metadata.
pub fn aggregate_branch(graph: &OwnershipGraph, branch: &str, config: &ExportConfig) -> NotifyView {
    let (packages, meta) = collect(graph, config, Some(branch));
    match meta {
        Some((name, version, eol)) => NotifyView {
            name: Some(name),
            version: Some(version),
            eol,
            packages,
        },
        None => NotifyView {
            name: None,
            version: None,
            eol: false,
            packages,
        },
    }
}

fn collect(
    graph: &OwnershipGraph,
    config: &ExportConfig,
    branch: Option<&str>,
) -> (Vec<NotifyPackage>, Option<(String, String, bool)>) {
    let mut order: Vec<String> = Vec::new();
    let mut accums: HashMap<String, NotifyAccum> = HashMap::new();
    let mut meta: Option<(String, String, bool)> = None;

    for listing in graph.listings() {
        if let Some(branch) = branch {
            if listing.collection.branch != branch {
                continue;
            }
            // Most recently read listing wins, as elsewhere.
            meta = Some((
                listing.collection.name.clone(),
                listing.collection.version.clone(),
                listing.collection.status.is_eol(),
            ));
        }

        let name = &listing.package.name;
        let accum = match accums.entry(name.clone()) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => {
                order.push(name.clone());
                e.insert(NotifyAccum {
                    owner: listing.owner.clone(),
                    watchers: Vec::new(),
                })
            }
        };
        accum.owner = listing.owner.clone();
        for role in [AclRole::WatchBugs, AclRole::WatchCommits] {
            for holder in listing.holders_of(role) {
                if !accum.watchers.contains(holder) {
                    accum.watchers.push(holder.clone());
                }
            }
        }
    }

    let packages = order
        .iter()
        .filter_map(|name| accums.remove(name).map(|a| (name.clone(), a)))
        .map(|(name, accum)| NotifyPackage {
            name,
            notify: accum.compose(config.owner_placement),
        })
        .collect();
    (packages, meta)
}

/// Render the text form: `package|identity,identity,...`, no header.
pub fn render_text(view: &NotifyView) -> String {
    let lines: Vec<String> = view
        .packages
        .iter()
        .map(|pkg| {
            let csv = pkg
                .notify
                .iter()
                .map(|id| escape_field(&id.to_string()).into_owned())
                .collect::<Vec<_>>()
                .join(",");
            format!("{}|{}", escape_field(&pkg.name), csv)
        })
        .collect();
    lines.join("\n")
}

/// Render the JSON form: title, collection metadata, then the package list.
pub fn render_json(view: &NotifyView, config: &ExportConfig) -> Value {
    let packages: Vec<Value> = view
        .packages
        .iter()
        .map(|pkg| {
            let list: Vec<String> = pkg.notify.iter().map(|id| id.to_string()).collect();
            let mut wrapper = Map::new();
            wrapper.insert(pkg.name.clone(), json!(list));
            Value::Object(wrapper)
        })
        .collect();

    let mut doc = Map::new();
    doc.insert("title".to_string(), json!(config.title(Consumer::Notify)));
    doc.insert(
        "name".to_string(),
        view.name.as_ref().map_or(Value::Null, |n| json!(n)),
    );
    doc.insert(
        "version".to_string(),
        view.version.as_ref().map_or(Value::Null, |v| json!(v)),
    );
    doc.insert("eol".to_string(), json!(view.eol));
    doc.insert("packages".to_string(), Value::Array(packages));
    Value::Object(doc)
}
