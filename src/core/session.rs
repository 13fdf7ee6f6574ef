//! Ledger session - The filtered view, running balance and undo history.
//!
//! A session wraps a [`LedgerStore`] and never caches movements: every filter change
//! and every mutation ends with a fresh query through [`LedgerSession::refresh`], whose
//! [`ViewState`] is returned to the caller. Deleted movements are kept on an in-memory
//! stack so the most recent deletion can be undone; the stack dies with the session.
//!
//! While the session is inactive (a guided tour is running in the UI) every mutating
//! operation returns [`LedgerError::Suspended`] and leaves the ledger untouched.

use crate::{
    core::{
        filter::Filter,
        movement::{Movement, MovementKind, NewMovement},
        report::Report,
        store::LedgerStore,
    },
    errors::LedgerError,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::io::Write;
use tracing::{info, instrument, warn};

/// Snapshot of the visible ledger after an operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewState {
    /// Filter the snapshot was taken under
    pub filter: Filter,
    /// Visible movements, newest first
    pub movements: Vec<Movement>,
    /// Sum of the visible amounts
    pub balance: f64,
}

impl ViewState {
    fn new(filter: Filter, movements: Vec<Movement>) -> Self {
        let balance = movements.iter().fold(0.0, |total, m| total + m.amount);
        Self {
            filter,
            movements,
            balance,
        }
    }

    /// Whether the visible balance is below zero.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.balance < 0.0
    }
}

/// Stateful coordinator over a [`LedgerStore`].
#[derive(Debug)]
pub struct LedgerSession {
    store: LedgerStore,
    filter: Filter,
    undo_stack: Vec<Movement>,
    active: bool,
}

impl LedgerSession {
    /// Starts an active session showing every movement.
    #[must_use]
    pub const fn new(store: LedgerStore) -> Self {
        Self {
            store,
            filter: Filter::All,
            undo_stack: Vec::new(),
            active: true,
        }
    }

    /// The store behind this session.
    #[must_use]
    pub const fn store(&self) -> &LedgerStore {
        &self.store
    }

    /// Currently selected filter.
    #[must_use]
    pub const fn filter(&self) -> Filter {
        self.filter
    }

    /// Whether mutating operations are accepted.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Enables or suspends mutating operations.
    pub fn set_active(&mut self, active: bool) {
        if self.active != active {
            info!(active, "Ledger session activity changed");
        }
        self.active = active;
    }

    /// Number of deletions that can still be undone.
    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// Most recently deleted movement, if any.
    #[must_use]
    pub fn last_deleted(&self) -> Option<&Movement> {
        self.undo_stack.last()
    }

    const fn ensure_active(&self) -> Result<(), LedgerError> {
        if self.active {
            Ok(())
        } else {
            Err(LedgerError::Suspended)
        }
    }

    /// Re-reads the ledger under the active filter and sums the visible amounts.
    pub async fn refresh(&self) -> Result<ViewState, LedgerError> {
        self.refresh_at(Utc::now()).await
    }

    /// Like [`LedgerSession::refresh`], with the rolling windows evaluated at `now`.
    pub async fn refresh_at(&self, now: DateTime<Utc>) -> Result<ViewState, LedgerError> {
        let movements = self.store.query_all_at(self.filter, now).await?;
        Ok(ViewState::new(self.filter, movements))
    }

    /// Switches the filter and recomputes the view, even if the filter did not change.
    #[instrument(skip(self))]
    pub async fn set_filter(&mut self, filter: Filter) -> Result<ViewState, LedgerError> {
        self.ensure_active()?;
        self.filter = filter;
        self.refresh().await
    }

    /// Moves to the next filter in the `All -> LastMonth -> LastYear` cycle.
    pub async fn cycle_filter(&mut self) -> Result<ViewState, LedgerError> {
        let next = self.filter.next();
        self.set_filter(next).await
    }

    /// Adds a movement whose sign is taken from `kind`, whatever the sign of `amount`.
    #[instrument(skip(self))]
    pub async fn add_movement(
        &mut self,
        concept: &str,
        amount: f64,
        date: NaiveDate,
        kind: MovementKind,
    ) -> Result<ViewState, LedgerError> {
        self.ensure_active()?;

        let candidate = NewMovement::with_kind(concept, amount, date, kind);
        candidate.validate().map_err(LedgerError::Invalid)?;

        let stored = self.store.insert(&candidate).await?;
        info!(id = stored.id, amount = stored.amount, "Movement added");
        self.refresh().await
    }

    /// Deletes a movement and remembers it so the deletion can be undone.
    ///
    /// The movement only goes on the undo stack once the store confirms the delete.
    #[instrument(skip(self))]
    pub async fn delete_movement(&mut self, id: i64) -> Result<ViewState, LedgerError> {
        self.ensure_active()?;

        let snapshot = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(LedgerError::NotFound { id })?;

        if !self.store.delete_by_id(id).await? {
            warn!(id, "Movement vanished before it could be deleted");
            return Err(LedgerError::NotFound { id });
        }

        info!(id, concept = %snapshot.concept, "Movement deleted");
        self.undo_stack.push(snapshot);
        self.refresh().await
    }

    /// Re-inserts the most recently deleted movement. The restored row gets a new id.
    ///
    /// The snapshot is popped before the insert runs; if the insert fails it is gone.
    #[instrument(skip(self))]
    pub async fn undo_last_delete(&mut self) -> Result<ViewState, LedgerError> {
        self.ensure_active()?;

        let snapshot = self.undo_stack.pop().ok_or(LedgerError::NothingToUndo)?;
        let restored = self
            .store
            .insert(&snapshot.to_new())
            .await
            .inspect_err(|e| warn!(id = snapshot.id, "Could not restore movement: {}", e))?;

        info!(old_id = snapshot.id, new_id = restored.id, "Movement restored");
        self.refresh().await
    }

    /// Writes every movement dated after `cutoff` using `report`.
    ///
    /// The report always sees the whole ledger, not just the active filter.
    pub async fn export_report(
        &self,
        report: &dyn Report,
        cutoff: NaiveDate,
        destination: &mut dyn Write,
    ) -> Result<usize, LedgerError> {
        let snapshot = self.store.query_all(Filter::All).await?;
        let written = report.export(&snapshot, cutoff, destination)?;
        info!(written, format = report.extension(), "Report exported");
        Ok(written)
    }
}
