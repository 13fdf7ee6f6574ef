//! Movement value types and the invariants every stored movement satisfies.
//!
//! A [`NewMovement`] is a candidate entry that has not been persisted yet; a [`Movement`]
//! is a row read back from the store and always carries its database id. Validation
//! happens on [`NewMovement::validate`] so the session can reject bad input before it
//! reaches the store, and the store runs it again before every write.

use crate::entities::movement;
use chrono::{DateTime, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of characters in a concept.
pub const MAX_CONCEPT_LEN: usize = 25;

/// Exclusive bound on the magnitude of an amount.
pub const AMOUNT_LIMIT: f64 = 10_000_000.0;

// Relative error allowed when checking that `amount * 100` is a whole number of
// cents. Scaled by the magnitude, so it only absorbs the representation error of
// decimals like 0.29 and never a real sub-cent remainder.
const CENT_TOLERANCE: f64 = 4.0 * f64::EPSILON;

/// The specific invariant a movement broke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Violation {
    /// Concept was empty
    EmptyConcept,
    /// Concept exceeded [`MAX_CONCEPT_LEN`] characters
    ConceptTooLong {
        /// Number of characters supplied
        len: usize,
    },
    /// Amount was zero
    ZeroAmount,
    /// Amount was NaN or infinite
    NonFiniteAmount,
    /// Amount was outside `(-AMOUNT_LIMIT, AMOUNT_LIMIT)`
    AmountOutOfRange {
        /// Amount supplied
        amount: f64,
    },
    /// Amount had more than two decimal places
    FractionalCents {
        /// Amount supplied
        amount: f64,
    },
    /// Date was before 1970-01-01
    DateBeforeEpoch {
        /// Date supplied
        date: NaiveDate,
    },
    /// The database refused the row through one of its `CHECK` constraints
    Rejected {
        /// Driver message
        message: String,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyConcept => write!(f, "concept cannot be empty"),
            Self::ConceptTooLong { len } => write!(
                f,
                "concept is {len} characters long, the limit is {MAX_CONCEPT_LEN}"
            ),
            Self::ZeroAmount => write!(f, "amount cannot be zero"),
            Self::NonFiniteAmount => write!(f, "amount must be a valid number"),
            Self::AmountOutOfRange { amount } => write!(
                f,
                "amount {amount} must be strictly between -{AMOUNT_LIMIT:.0} and {AMOUNT_LIMIT:.0}"
            ),
            Self::FractionalCents { amount } => {
                write!(f, "amount {amount} has more than two decimal places")
            }
            Self::DateBeforeEpoch { date } => {
                write!(f, "date {date} is before 1970-01-01")
            }
            Self::Rejected { message } => write!(f, "rejected by the database: {message}"),
        }
    }
}

/// Whether a movement adds to or subtracts from the balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovementKind {
    /// Money coming in, stored as a positive amount
    Income,
    /// Money going out, stored as a negative amount
    Expense,
}

impl MovementKind {
    /// Normalizes the sign of `amount` for this kind, ignoring the sign the caller used.
    #[must_use]
    pub fn signed(self, amount: f64) -> f64 {
        match self {
            Self::Income => amount.abs(),
            Self::Expense => -amount.abs(),
        }
    }
}

/// A movement that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMovement {
    /// Short label for the entry
    pub concept: String,
    /// Signed amount
    pub amount: f64,
    /// Calendar date of the entry
    pub date: NaiveDate,
}

impl NewMovement {
    /// Builds a candidate movement from raw input, applying the sign of `kind`.
    #[must_use]
    pub fn with_kind(
        concept: impl Into<String>,
        amount: f64,
        date: NaiveDate,
        kind: MovementKind,
    ) -> Self {
        Self {
            concept: concept.into(),
            amount: kind.signed(amount),
            date,
        }
    }

    /// Checks every movement invariant, reporting the first one broken.
    pub fn validate(&self) -> Result<(), Violation> {
        validate_concept(&self.concept)?;
        validate_amount(self.amount)?;
        date_to_millis(self.date).map(|_| ())
    }
}

/// A movement as stored in the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movement {
    /// Database id
    pub id: i64,
    /// Short label for the entry
    pub concept: String,
    /// Signed amount (positive for income, negative for expenses)
    pub amount: f64,
    /// Calendar date of the entry
    pub date: NaiveDate,
}

impl Movement {
    /// Copies the content of this movement without its id, for re-insertion.
    #[must_use]
    pub fn to_new(&self) -> NewMovement {
        NewMovement {
            concept: self.concept.clone(),
            amount: self.amount,
            date: self.date,
        }
    }

    /// Kind implied by the sign of the amount.
    #[must_use]
    pub fn kind(&self) -> MovementKind {
        if self.amount < 0.0 {
            MovementKind::Expense
        } else {
            MovementKind::Income
        }
    }
}

impl From<movement::Model> for Movement {
    fn from(model: movement::Model) -> Self {
        Self {
            id: model.id,
            concept: model.concept,
            amount: model.amount,
            date: millis_to_date(model.date),
        }
    }
}

fn validate_concept(concept: &str) -> Result<(), Violation> {
    let len = concept.chars().count();
    if len == 0 {
        return Err(Violation::EmptyConcept);
    }
    if len > MAX_CONCEPT_LEN {
        return Err(Violation::ConceptTooLong { len });
    }
    Ok(())
}

fn validate_amount(amount: f64) -> Result<(), Violation> {
    if !amount.is_finite() {
        return Err(Violation::NonFiniteAmount);
    }
    if amount == 0.0 {
        return Err(Violation::ZeroAmount);
    }
    if amount <= -AMOUNT_LIMIT || amount >= AMOUNT_LIMIT {
        return Err(Violation::AmountOutOfRange { amount });
    }
    let cents = amount * 100.0;
    let whole = cents.round();
    if whole == 0.0 || (cents - whole).abs() > cents.abs().max(1.0) * CENT_TOLERANCE {
        return Err(Violation::FractionalCents { amount });
    }
    Ok(())
}

/// Serializes a calendar date as the epoch milliseconds of its UTC midnight.
pub fn date_to_millis(date: NaiveDate) -> Result<i64, Violation> {
    let millis = date.and_time(NaiveTime::MIN).and_utc().timestamp_millis();
    if millis < 0 {
        return Err(Violation::DateBeforeEpoch { date });
    }
    Ok(millis)
}

/// Reads a stored timestamp back as the UTC calendar date it falls on.
///
/// Out-of-range values collapse to the epoch date; the schema forbids them anyway.
#[must_use]
pub fn millis_to_date(millis: i64) -> NaiveDate {
    DateTime::from_timestamp_millis(millis)
        .unwrap_or(DateTime::UNIX_EPOCH)
        .date_naive()
}
