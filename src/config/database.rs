//! Database configuration module for DAMWallet.
//!
//! This module turns a wallet file path into a `SQLite` connection and creates the
//! `MOVEMENT` table. The table is declared with explicit SQL rather than generated from
//! the entity because the movement invariants live in `CHECK` constraints, which makes
//! the database reject bad rows even when they bypass the Rust validation.

use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr};
use std::path::Path;
use tracing::{debug, instrument};

/// DDL for the movement table. Safe to run against an existing database.
pub const CREATE_MOVEMENT_TABLE: &str = "CREATE TABLE IF NOT EXISTS MOVEMENT (
    ID INTEGER PRIMARY KEY AUTOINCREMENT,
    CONCEPT TEXT NOT NULL CHECK(LENGTH(CONCEPT) <= 25 AND LENGTH(CONCEPT) > 0),
    AMOUNT REAL NOT NULL CHECK(
        AMOUNT > -10000000 AND AMOUNT < 10000000 AND ROUND(AMOUNT * 100) <> 0
        AND ABS(AMOUNT * 100 - ROUND(AMOUNT * 100))
            <= MAX(ABS(AMOUNT * 100), 1.0) * 8.881784197001252e-16
    ),
    DATE INTEGER NOT NULL CHECK(DATE >= 0)
)";

/// Index backing the date-descending queries.
pub const CREATE_DATE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_movement_date ON MOVEMENT(DATE)";

/// Builds the `SQLite` URL for a wallet file, creating the file if it is missing.
///
/// The path is percent-encoded where the URL parser would otherwise read a query
/// string, a fragment or an escape, so `a?b/w%41.db` opens that exact file.
#[must_use]
pub fn database_url(path: &Path) -> String {
    let mut encoded = String::new();
    for c in path.to_string_lossy().chars() {
        match c {
            '%' => encoded.push_str("%25"),
            '?' => encoded.push_str("%3F"),
            '#' => encoded.push_str("%23"),
            c => encoded.push(c),
        }
    }
    format!("sqlite://{encoded}?mode=rwc")
}

/// Opens a connection to the wallet file at `path`.
#[instrument]
pub async fn create_connection(path: &Path) -> Result<DatabaseConnection, DbErr> {
    let url = database_url(path);
    debug!("Connecting to {}", url);
    Database::connect(&url).await
}

/// Creates the movement table and its index if they do not exist yet.
#[instrument(skip(db))]
pub async fn create_tables<C>(db: &C) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    db.execute_unprepared(CREATE_MOVEMENT_TABLE).await?;
    db.execute_unprepared(CREATE_DATE_INDEX).await?;
    debug!("Movement table ensured");
    Ok(())
}
