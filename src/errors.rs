//! Unified error types for the ledger.
//!
//! Errors are layered the same way the ledger is: the store reports [`StoreError`],
//! the session reports [`LedgerError`] (wrapping store failures it cannot recover from),
//! report writers report [`ReportError`], and the binary folds everything into [`Error`].

use crate::core::movement::Violation;
use sea_orm::DbErr;
use std::path::PathBuf;
use thiserror::Error;

/// Failures raised at the storage boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database file or its directory could not be created or opened.
    #[error("Database at {path:?} is unreachable: {reason}")]
    Unreachable {
        /// Path the store was pointed at
        path: PathBuf,
        /// Underlying cause as reported by the filesystem or driver
        reason: String,
    },

    /// A write violated one of the movement invariants.
    #[error("Invalid movement: {0}")]
    InvalidRecord(Violation),

    /// Driver failure during an otherwise valid operation.
    #[error("Database error while trying to {operation}: {source}")]
    Io {
        /// Name of the store operation that failed
        operation: &'static str,
        /// Driver error
        #[source]
        source: DbErr,
    },
}

impl StoreError {
    /// Wraps a driver error, promoting SQLite `CHECK` failures to [`StoreError::InvalidRecord`].
    pub(crate) fn from_db(operation: &'static str, source: DbErr) -> Self {
        let message = source.to_string();
        if message.contains("CHECK constraint failed") {
            Self::InvalidRecord(Violation::Rejected { message })
        } else {
            Self::Io { operation, source }
        }
    }
}

/// Failures raised by a [`crate::core::session::LedgerSession`].
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The candidate movement was rejected.
    #[error("Invalid movement: {0}")]
    Invalid(Violation),

    /// No movement with this id exists.
    #[error("Movement #{id} not found")]
    NotFound {
        /// Id that was looked up
        id: i64,
    },

    /// The undo history is empty.
    #[error("Nothing to undo")]
    NothingToUndo,

    /// The session is in guided mode and refuses mutations.
    #[error("Ledger is suspended while guided mode is active")]
    Suspended,

    /// Unrecoverable store failure.
    #[error(transparent)]
    Store(StoreError),

    /// Report writer failure.
    #[error(transparent)]
    Report(#[from] ReportError),
}

impl From<StoreError> for LedgerError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::InvalidRecord(violation) => Self::Invalid(violation),
            other => Self::Store(other),
        }
    }
}

/// Failures raised while writing a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Destination could not be written.
    #[error("I/O error while writing report: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// PDF document could not be built.
    #[error("PDF error: {message}")]
    Pdf {
        /// Description from the PDF writer
        message: String,
    },
}

/// Application-level error used by configuration loading and the command line.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the problem
        message: String,
    },

    /// Ledger session failure.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Store failure outside a session (e.g. during startup).
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The user supplied an unusable command or argument.
    #[error("{message}")]
    Usage {
        /// Message shown to the user
        message: String,
    },
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
