//! End-to-end ledger scenarios against a wallet file on disk.
#![allow(clippy::unwrap_used)]
#![allow(clippy::float_cmp)]

use chrono::{Duration, NaiveDate, Utc};
use damwallet::{
    core::{
        filter::Filter,
        movement::{MovementKind, NewMovement},
        session::LedgerSession,
        store::LedgerStore,
    },
    errors::{LedgerError, StoreError},
};
use std::path::PathBuf;

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn wallet_path(dir: &tempfile::TempDir) -> PathBuf {
    dir.path().join("BaseDeDatos").join("Movements.db")
}

#[tokio::test]
async fn salary_and_rent_scenario() -> Result<(), LedgerError> {
    let dir = tempfile::tempdir().unwrap();
    let mut session = LedgerSession::new(LedgerStore::initialize(&wallet_path(&dir)).await?);

    session
        .add_movement("Salary", 1500.00, today(), MovementKind::Income)
        .await?;
    let view = session
        .add_movement("Rent", 650.00, today(), MovementKind::Expense)
        .await?;

    assert_eq!(view.filter, Filter::All);
    assert_eq!(view.balance, 850.00);
    let concepts: Vec<&str> = view.movements.iter().map(|m| m.concept.as_str()).collect();
    assert_eq!(concepts, vec!["Salary", "Rent"]);

    // Delete the rent and bring it back
    let rent = view.movements[1].clone();
    session.delete_movement(rent.id).await?;
    let restored = session.undo_last_delete().await?;

    assert_eq!(restored.balance, 850.00);
    assert_eq!(restored.movements.len(), 2);
    let again = restored
        .movements
        .iter()
        .find(|m| m.concept == "Rent")
        .unwrap();
    assert_ne!(again.id, rent.id);
    assert_eq!(again.amount, rent.amount);
    assert_eq!(again.date, rent.date);
    Ok(())
}

#[tokio::test]
async fn undo_with_empty_history_changes_nothing() -> Result<(), LedgerError> {
    let dir = tempfile::tempdir().unwrap();
    let mut session = LedgerSession::new(LedgerStore::initialize(&wallet_path(&dir)).await?);
    session
        .add_movement("Salary", 1500.00, today(), MovementKind::Income)
        .await?;
    let before = session.refresh().await?;

    let result = session.undo_last_delete().await;

    assert!(matches!(result, Err(LedgerError::NothingToUndo)));
    assert_eq!(session.refresh().await?, before);
    Ok(())
}

#[tokio::test]
async fn reopening_a_wallet_keeps_its_movements() -> Result<(), StoreError> {
    let dir = tempfile::tempdir().unwrap();
    let path = wallet_path(&dir);

    let store = LedgerStore::initialize(&path).await?;
    let valid = [
        NewMovement {
            concept: "Epoch".to_string(),
            amount: 0.01,
            date: NaiveDate::from_ymd_opt(1970, 1, 1).unwrap(),
        },
        NewMovement {
            concept: "x".repeat(25),
            amount: -9_999_999.99,
            date: today() - Duration::days(45),
        },
    ];
    for movement in &valid {
        store.insert(movement).await?;
    }
    drop(store);

    let reopened = LedgerStore::initialize(&path).await?;
    let all = reopened.query_all(Filter::All).await?;
    let contents: Vec<NewMovement> = all.iter().map(|m| m.to_new()).collect();
    assert_eq!(contents, vec![valid[1].clone(), valid[0].clone()]);

    assert!(reopened.query_all(Filter::LastMonth).await?.is_empty());
    assert_eq!(reopened.query_all(Filter::LastYear).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn invalid_writes_leave_the_wallet_unchanged() -> Result<(), StoreError> {
    let dir = tempfile::tempdir().unwrap();
    let store = LedgerStore::initialize(&wallet_path(&dir)).await?;

    let candidates = [
        ("", 5.0, today()),
        ("This concept is way too long", 5.0, today()),
        ("Nothing", 0.0, today()),
        ("Lottery", 10_000_000.0, today()),
        ("Fraction", 0.125, today()),
        ("Moon landing", 5.0, NaiveDate::from_ymd_opt(1969, 7, 20).unwrap()),
    ];
    for (concept, amount, date) in candidates {
        let result = store
            .insert(&NewMovement {
                concept: concept.to_string(),
                amount,
                date,
            })
            .await;
        assert!(matches!(result, Err(StoreError::InvalidRecord(_))));
    }

    assert!(store.query_all(Filter::All).await?.is_empty());
    Ok(())
}
