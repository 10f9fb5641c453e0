//! Database schema migrations for SQLite.
//!
//! We use a simple versioned migration system. Each migration is a SQL
//! string that transforms the schema from version N to N+1.

use rusqlite::Connection;

use crate::error::{Result, StoreError};

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Initialize or migrate the database schema.
///
/// This function is idempotent - it can be called multiple times safely.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    let current: u32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    if current < CURRENT_VERSION {
        let tx = conn.transaction()?;

        for version in (current + 1)..=CURRENT_VERSION {
            apply_migration(&tx, version)?;

            tx.execute(
                "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
                rusqlite::params![version, now_millis()],
            )?;
        }

        tx.commit()?;
    }

    Ok(())
}

/// Apply a specific migration version.
fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
    match version {
        1 => apply_v1(conn),
        _ => Err(StoreError::Migration(format!(
            "unknown migration version: {}",
            version
        ))),
    }
}

/// Migration v1: Initial schema.
fn apply_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Collections: named, versioned distribution branches
        CREATE TABLE collections (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,               -- e.g. Fedora
            version TEXT NOT NULL,            -- e.g. devel, 19
            branch TEXT NOT NULL UNIQUE,      -- e.g. master, f19
            status TEXT NOT NULL              -- active / under-development / eol
        );

        -- Packages: named software units, independent of collections
        CREATE TABLE packages (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            summary TEXT NOT NULL
        );

        -- Listings: one package in one collection, with ownership facts
        CREATE TABLE listings (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            package_id INTEGER NOT NULL REFERENCES packages(id),
            collection_id INTEGER NOT NULL REFERENCES collections(id),
            owner TEXT NOT NULL,              -- legacy sentinel encoding
            qa_contact TEXT,                  -- nullable
            status TEXT NOT NULL,             -- approved / orphaned / retired / removed

            UNIQUE(package_id, collection_id)
        );

        -- Role grants: (listing, identity, role, approval status)
        CREATE TABLE acls (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            listing_id INTEGER NOT NULL REFERENCES listings(id),
            identity TEXT NOT NULL,           -- legacy sentinel encoding
            role TEXT NOT NULL,               -- closed set, validated on read
            status TEXT NOT NULL,             -- awaiting / approved / denied / obsolete

            UNIQUE(listing_id, identity, role)
        );

        -- Indexes for the read path
        CREATE INDEX idx_listings_package ON listings(package_id);
        CREATE INDEX idx_listings_collection ON listings(collection_id);
        CREATE INDEX idx_acls_listing ON acls(listing_id);
        "#,
    )?;

    Ok(())
}

/// Get current time in milliseconds.
fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_millis() as i64
}
