//! Shared test utilities for `DAMWallet`.
//!
//! This module provides common helper functions for setting up in-memory ledgers
//! and building candidate movements with sensible defaults.

use crate::{
    core::{movement::NewMovement, session::LedgerSession, store::LedgerStore},
    errors::StoreError,
};
use chrono::NaiveDate;

/// Creates an in-memory ledger store with the movement table initialized.
/// This is the standard setup for store and session tests.
pub async fn setup_test_store() -> Result<LedgerStore, StoreError> {
    LedgerStore::in_memory().await
}

/// Creates a session over a fresh in-memory store, using the default `All` filter.
pub async fn setup_test_session() -> Result<LedgerSession, StoreError> {
    Ok(LedgerSession::new(setup_test_store().await?))
}

/// Builds a candidate movement with the amount taken as given (sign included).
pub fn sample_movement(concept: &str, amount: f64, date: NaiveDate) -> NewMovement {
    NewMovement {
        concept: concept.to_string(),
        amount,
        date,
    }
}
