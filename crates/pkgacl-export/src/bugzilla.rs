//! Bug-tracker aggregation and rendering.
//!
//! Groups the graph by collection name. Listings of the same package under
//! the same collection name (several branches) merge into one entry: the
//! watch-bugs holders union, the owner, QA contact, and summary come from
//! the most recently read listing. Packages are ordered by name; the cc
//! partitions are sorted ascending, case-sensitive.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use pkgacl_core::{AclRole, Identity, ListingRecord, OwnershipGraph};
use serde_json::{json, Map, Value};

use crate::config::ExportConfig;
use crate::escape::escape_field;
use crate::target::Consumer;

/// One package entry in a collection group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BugzillaPackage {
    pub name: String,
    pub summary: String,
    pub owner: Identity,
    pub qa_contact: Option<Identity>,
    /// Group cc holders, bare names, sorted ascending.
    pub cc_groups: Vec<String>,
    /// Person cc holders, sorted ascending.
    pub cc_people: Vec<String>,
}

/// All packages known under one collection name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BugzillaCollection {
    pub name: String,
    /// Ordered by package name.
    pub packages: Vec<BugzillaPackage>,
}

/// The bug-tracker grouped view, collections in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BugzillaView {
    pub collections: Vec<BugzillaCollection>,
}

struct PackageAccum {
    summary: String,
    owner: Identity,
    qa_contact: Option<Identity>,
    cc: Vec<Identity>,
}

struct CollectionAccum {
    name: String,
    order: Vec<String>,
    packages: HashMap<String, PackageAccum>,
}

impl CollectionAccum {
    fn new(name: String) -> Self {
        Self {
            name,
            order: Vec::new(),
            packages: HashMap::new(),
        }
    }

    fn absorb(&mut self, listing: &ListingRecord) {
        let name = &listing.package.name;
        let accum = match self.packages.entry(name.clone()) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => {
                self.order.push(name.clone());
                e.insert(PackageAccum {
                    summary: String::new(),
                    owner: listing.owner.clone(),
                    qa_contact: None,
                    cc: Vec::new(),
                })
            }
        };

        // Metadata from the most recently read listing wins.
        accum.summary = listing.package.summary.clone();
        accum.owner = listing.owner.clone();
        accum.qa_contact = listing.qa_contact.clone();

        for holder in listing.holders_of(AclRole::WatchBugs) {
            if !accum.cc.contains(holder) {
                accum.cc.push(holder.clone());
            }
        }
    }

    fn finish(mut self) -> BugzillaCollection {
        let mut packages: Vec<BugzillaPackage> = self
            .order
            .iter()
            .filter_map(|name| self.packages.remove(name).map(|a| (name.clone(), a)))
            .map(|(name, accum)| {
                let mut cc_groups = Vec::new();
                let mut cc_people = Vec::new();
                for identity in &accum.cc {
                    if identity.is_group() {
                        cc_groups.push(identity.name().to_string());
                    } else {
                        cc_people.push(identity.name().to_string());
                    }
                }
                cc_groups.sort();
                cc_people.sort();
                BugzillaPackage {
                    name,
                    summary: accum.summary,
                    owner: accum.owner,
                    qa_contact: accum.qa_contact,
                    cc_groups,
                    cc_people,
                }
            })
            .collect();
        packages.sort_by(|a, b| a.name.cmp(&b.name));
        BugzillaCollection {
            name: self.name,
            packages,
        }
    }
}

/// Group the graph by collection name and merge per-package facts.
pub fn aggregate(graph: &OwnershipGraph) -> BugzillaView {
    let mut collections: Vec<CollectionAccum> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for listing in graph.listings() {
        let slot = *index
            .entry(listing.collection.name.clone())
            .or_insert_with(|| {
                collections.push(CollectionAccum::new(listing.collection.name.clone()));
                collections.len() - 1
            });
        collections[slot].absorb(listing);
    }

    BugzillaView {
        collections: collections.into_iter().map(CollectionAccum::finish).collect(),
    }
}

/// Render the legacy line-oriented text form.
///
/// The header block is historical, wording included; the QA field is
/// omitted from a line entirely when the contact is absent.
pub fn render_text(view: &BugzillaView, config: &ExportConfig) -> String {
    let mut out = String::new();
    out.push_str(&format!("# {} VCS Acls\n", config.product_name));
    out.push_str("# Text Format\n");
    out.push_str("# Collection|Package|Description|Owner|Initial QA|Initial CCList\n");
    out.push_str("# Backslashes (\\) are escaped as \\u005c Pipes (|) are escaped as \\u007c\n");
    out.push('\n');

    let mut lines = Vec::new();
    for collection in &view.collections {
        for pkg in &collection.packages {
            let mut fields = vec![
                escape_field(&collection.name).into_owned(),
                escape_field(&pkg.name).into_owned(),
                escape_field(&pkg.summary).into_owned(),
                escape_field(&pkg.owner.to_string()).into_owned(),
            ];
            if let Some(qa) = &pkg.qa_contact {
                fields.push(escape_field(&qa.to_string()).into_owned());
            }
            fields.push(cc_field(pkg));
            lines.push(fields.join("|"));
        }
    }
    out.push_str(&lines.join("\n"));
    out
}

fn cc_field(pkg: &BugzillaPackage) -> String {
    let mut parts: Vec<String> = pkg
        .cc_groups
        .iter()
        .map(|g| escape_field(&Identity::group(g.clone()).to_string()).into_owned())
        .collect();
    parts.extend(pkg.cc_people.iter().map(|p| escape_field(p).into_owned()));
    parts.join(",")
}

/// Render the JSON form: `title` plus the `bugzillaAcls` map.
pub fn render_json(view: &BugzillaView, config: &ExportConfig) -> Value {
    let mut acls = Map::new();
    for collection in &view.collections {
        let packages: Vec<Value> = collection
            .packages
            .iter()
            .map(|pkg| {
                let mut cclist = Map::new();
                cclist.insert("groups".to_string(), json!(pkg.cc_groups));
                cclist.insert("people".to_string(), json!(pkg.cc_people));

                let mut body = Map::new();
                body.insert("owner".to_string(), json!(pkg.owner.to_string()));
                body.insert("cclist".to_string(), Value::Object(cclist));
                body.insert(
                    "qacontact".to_string(),
                    match &pkg.qa_contact {
                        Some(qa) => json!(qa.to_string()),
                        None => Value::Null,
                    },
                );
                body.insert("summary".to_string(), json!(pkg.summary));

                let mut wrapper = Map::new();
                wrapper.insert(pkg.name.clone(), Value::Object(body));
                Value::Object(wrapper)
            })
            .collect();
        acls.insert(collection.name.clone(), Value::Array(packages));
    }

    let mut doc = Map::new();
    doc.insert("title".to_string(), json!(config.title(Consumer::Bugtracker)));
    doc.insert("bugzillaAcls".to_string(), Value::Object(acls));
    Value::Object(doc)
}
