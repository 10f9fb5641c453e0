//! SQLite implementation of the OwnershipStore trait.
//!
//! This is the primary storage backend for the registry. It uses rusqlite
//! with bundled SQLite, wrapped in async via tokio::spawn_blocking.

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::warn;

use pkgacl_core::{
    AclRole, AclStatus, CollectionRef, CollectionStatus, GrantRecord, Identity, ListingRecord,
    ListingStatus, OwnershipGraph, PackageRef,
};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::OwnershipStore;

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a blocking operation against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|e| StoreError::Unavailable(format!("connection lock poisoned: {}", e)))?;
            f(&mut guard)
        })
        .await
        .map_err(|e| StoreError::Unavailable(format!("blocking task failed: {}", e)))?
    }
}

fn lookup_listing_id(conn: &Connection, package: &str, branch: &str) -> Result<i64> {
    conn.query_row(
        "SELECT l.id FROM listings l
         JOIN packages p ON p.id = l.package_id
         JOIN collections c ON c.id = l.collection_id
         WHERE p.name = ?1 AND c.branch = ?2",
        params![package, branch],
        |row| row.get(0),
    )
    .optional()?
    .ok_or_else(|| StoreError::NotFound(format!("listing {}/{}", package, branch)))
}

fn parse_status<T: FromStr<Err = pkgacl_core::ModelError>>(value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|e: pkgacl_core::ModelError| StoreError::InvalidData(e.to_string()))
}

#[async_trait]
impl OwnershipStore for SqliteStore {
    async fn read_graph(&self) -> Result<OwnershipGraph> {
        self.with_conn(|conn| {
            // Approved grants keyed by listing, in insertion (rowid) order.
            // Grants with a role outside the closed set are a data fault:
            // skip and log, the export proceeds with the remaining graph.
            let mut grants: HashMap<i64, Vec<GrantRecord>> = HashMap::new();
            {
                let mut stmt = conn.prepare(
                    "SELECT a.listing_id, a.identity, a.role FROM acls a
                     JOIN listings l ON l.id = a.listing_id
                     WHERE a.status = 'approved' AND l.status != 'removed'
                     ORDER BY a.listing_id, a.id",
                )?;
                let rows = stmt.query_map([], |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                })?;

                for row in rows {
                    let (listing_id, identity, role) = row?;
                    match role.parse::<AclRole>() {
                        Ok(role) => grants.entry(listing_id).or_default().push(GrantRecord {
                            identity: Identity::parse(&identity),
                            role,
                        }),
                        Err(_) => {
                            warn!(listing_id, identity = %identity, role = %role,
                                  "skipping grant with unknown role");
                        }
                    }
                }
            }

            let mut stmt = conn.prepare(
                "SELECT l.id, c.name, c.version, c.branch, c.status,
                        p.name, p.summary, l.owner, l.qa_contact
                 FROM listings l
                 JOIN packages p ON p.id = l.package_id
                 JOIN collections c ON c.id = l.collection_id
                 WHERE l.status != 'removed'
                 ORDER BY l.id",
            )?;

            let rows = stmt.query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, String>(6)?,
                    row.get::<_, String>(7)?,
                    row.get::<_, Option<String>>(8)?,
                ))
            })?;

            let mut graph = OwnershipGraph::new();
            for row in rows {
                let (id, cname, cversion, cbranch, cstatus, pname, psummary, owner, qa) = row?;
                graph.push(ListingRecord {
                    collection: CollectionRef {
                        name: cname,
                        version: cversion,
                        branch: cbranch,
                        status: parse_status::<CollectionStatus>(&cstatus)?,
                    },
                    package: PackageRef {
                        name: pname,
                        summary: psummary,
                    },
                    owner: Identity::parse(&owner),
                    qa_contact: qa.as_deref().map(Identity::parse),
                    grants: grants.remove(&id).unwrap_or_default(),
                });
            }

            Ok(graph)
        })
        .await
    }

    async fn create_collection(
        &self,
        name: &str,
        version: &str,
        branch: &str,
        status: CollectionStatus,
    ) -> Result<()> {
        let (name, version, branch) = (name.to_string(), version.to_string(), branch.to_string());
        self.with_conn(move |conn| {
            let exists: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM collections WHERE branch = ?1)",
                params![branch],
                |row| row.get(0),
            )?;
            if exists {
                return Err(StoreError::AlreadyExists(format!("collection branch {}", branch)));
            }

            conn.execute(
                "INSERT INTO collections (name, version, branch, status) VALUES (?1, ?2, ?3, ?4)",
                params![name, version, branch, status.as_str()],
            )?;
            Ok(())
        })
        .await
    }

    async fn create_package(&self, name: &str, summary: &str) -> Result<()> {
        let (name, summary) = (name.to_string(), summary.to_string());
        self.with_conn(move |conn| {
            let exists: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM packages WHERE name = ?1)",
                params![name],
                |row| row.get(0),
            )?;
            if exists {
                return Err(StoreError::AlreadyExists(format!("package {}", name)));
            }

            conn.execute(
                "INSERT INTO packages (name, summary) VALUES (?1, ?2)",
                params![name, summary],
            )?;
            Ok(())
        })
        .await
    }

    async fn create_listing(
        &self,
        package: &str,
        branch: &str,
        owner: Identity,
        qa_contact: Option<Identity>,
    ) -> Result<()> {
        let (package, branch) = (package.to_string(), branch.to_string());
        self.with_conn(move |conn| {
            let package_id: i64 = conn
                .query_row(
                    "SELECT id FROM packages WHERE name = ?1",
                    params![package],
                    |row| row.get(0),
                )
                .optional()?
                .ok_or_else(|| StoreError::NotFound(format!("package {}", package)))?;
            let collection_id: i64 = conn
                .query_row(
                    "SELECT id FROM collections WHERE branch = ?1",
                    params![branch],
                    |row| row.get(0),
                )
                .optional()?
                .ok_or_else(|| StoreError::NotFound(format!("collection branch {}", branch)))?;

            let exists: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM listings WHERE package_id = ?1 AND collection_id = ?2)",
                params![package_id, collection_id],
                |row| row.get(0),
            )?;
            if exists {
                return Err(StoreError::AlreadyExists(format!("listing {}/{}", package, branch)));
            }

            conn.execute(
                "INSERT INTO listings (package_id, collection_id, owner, qa_contact, status)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    package_id,
                    collection_id,
                    owner.to_string(),
                    qa_contact.map(|qa| qa.to_string()),
                    ListingStatus::Approved.as_str(),
                ],
            )?;
            Ok(())
        })
        .await
    }

    async fn set_listing_status(
        &self,
        package: &str,
        branch: &str,
        status: ListingStatus,
    ) -> Result<()> {
        let (package, branch) = (package.to_string(), branch.to_string());
        self.with_conn(move |conn| {
            let listing_id = lookup_listing_id(conn, &package, &branch)?;
            conn.execute(
                "UPDATE listings SET status = ?2 WHERE id = ?1",
                params![listing_id, status.as_str()],
            )?;
            Ok(())
        })
        .await
    }

    async fn set_grant(
        &self,
        package: &str,
        branch: &str,
        identity: Identity,
        role: AclRole,
        status: AclStatus,
    ) -> Result<()> {
        let (package, branch) = (package.to_string(), branch.to_string());
        self.with_conn(move |conn| {
            let listing_id = lookup_listing_id(conn, &package, &branch)?;
            conn.execute(
                "INSERT INTO acls (listing_id, identity, role, status)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(listing_id, identity, role) DO UPDATE SET
                    status = excluded.status",
                params![listing_id, identity.to_string(), role.as_str(), status.as_str()],
            )?;
            Ok(())
        })
        .await
    }
}
