//! Ledger store - Durable persistence for movements.
//!
//! The store owns the database connection and is the only component that reads or
//! writes the `MOVEMENT` table. It validates every candidate before writing, and the
//! table's `CHECK` constraints reject anything that slips past (see
//! [`crate::config::database::CREATE_MOVEMENT_TABLE`]). Every operation is a single SQL
//! statement, so inserts and deletes are atomic on their own.
//!
//! Queries are ordered by `DATE DESC, ID ASC`: newest first, and movements sharing a
//! date keep the order in which they were inserted.

use crate::{
    config::database,
    core::{
        filter::Filter,
        movement::{Movement, NewMovement, date_to_millis},
    },
    entities::{MovementEntity, movement},
    errors::StoreError,
};
use chrono::{DateTime, Utc};
use sea_orm::{DatabaseConnection, QueryOrder, Set, prelude::*};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Handle to an initialized movement database.
#[derive(Debug)]
pub struct LedgerStore {
    db: DatabaseConnection,
    path: Option<PathBuf>,
}

impl LedgerStore {
    /// Opens the wallet file at `path`, creating its directory, the file and the
    /// movement table as needed.
    ///
    /// Running this against an existing wallet leaves its rows untouched.
    #[instrument]
    pub async fn initialize(path: &Path) -> Result<Self, StoreError> {
        let unreachable = |reason: String| StoreError::Unreachable {
            path: path.to_path_buf(),
            reason,
        };

        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| unreachable(e.to_string()))?;
        }

        let db = database::create_connection(path)
            .await
            .map_err(|e| unreachable(e.to_string()))?;
        database::create_tables(&db)
            .await
            .map_err(|e| unreachable(e.to_string()))?;

        info!("Ledger store ready at {}", path.display());
        Ok(Self {
            db,
            path: Some(path.to_path_buf()),
        })
    }

    /// Creates a store backed by a fresh in-memory database.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let unreachable = |reason: String| StoreError::Unreachable {
            path: PathBuf::from(":memory:"),
            reason,
        };

        let db = sea_orm::Database::connect("sqlite::memory:")
            .await
            .map_err(|e| unreachable(e.to_string()))?;
        database::create_tables(&db)
            .await
            .map_err(|e| unreachable(e.to_string()))?;
        Ok(Self { db, path: None })
    }

    /// Wraps an existing connection. The movement table must already exist.
    #[must_use]
    pub fn with_connection(db: DatabaseConnection) -> Self {
        Self { db, path: None }
    }

    /// Path of the wallet file, or `None` for in-memory stores.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Underlying connection.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Validates and stores a movement, returning it with the id the database assigned.
    #[instrument(skip(self))]
    pub async fn insert(&self, movement: &NewMovement) -> Result<Movement, StoreError> {
        movement.validate().map_err(StoreError::InvalidRecord)?;
        let date = date_to_millis(movement.date).map_err(StoreError::InvalidRecord)?;

        let row = movement::ActiveModel {
            concept: Set(movement.concept.clone()),
            amount: Set(movement.amount),
            date: Set(date),
            ..Default::default()
        };

        let stored = row
            .insert(&self.db)
            .await
            .map_err(|e| StoreError::from_db("insert movement", e))?;

        debug!(id = stored.id, "Movement stored");
        Ok(stored.into())
    }

    /// Deletes the movement with `id`. Returns `false` when no such row existed.
    #[instrument(skip(self))]
    pub async fn delete_by_id(&self, id: i64) -> Result<bool, StoreError> {
        let result = MovementEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| StoreError::from_db("delete movement", e))?;

        Ok(result.rows_affected > 0)
    }

    /// Looks up a single movement.
    #[instrument(skip(self))]
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Movement>, StoreError> {
        MovementEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map(|found| found.map(Movement::from))
            .map_err(|e| StoreError::from_db("find movement", e))
    }

    /// All movements inside `filter`'s window as of now, newest first.
    pub async fn query_all(&self, filter: Filter) -> Result<Vec<Movement>, StoreError> {
        self.query_all_at(filter, Utc::now()).await
    }

    /// All movements inside `filter`'s window evaluated at `now`, newest first.
    #[instrument(skip(self))]
    pub async fn query_all_at(
        &self,
        filter: Filter,
        now: DateTime<Utc>,
    ) -> Result<Vec<Movement>, StoreError> {
        let mut query = MovementEntity::find();
        if let Some(bound) = filter.lower_bound(now) {
            query = query.filter(movement::Column::Date.gte(bound));
        }

        let rows = query
            .order_by_desc(movement::Column::Date)
            .order_by_asc(movement::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| StoreError::from_db("query movements", e))?;

        debug!(count = rows.len(), "Movements loaded");
        Ok(rows.into_iter().map(Movement::from).collect())
    }
}
