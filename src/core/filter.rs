//! Time-window filters over the ledger.
//!
//! Windows are rolling and evaluated when a query runs: `LastMonth` keeps movements
//! dated at or after `now - 30 days`, `LastYear` at or after `now - 365 days`.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Selects which movements are visible and counted in the balance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Filter {
    /// Every movement
    #[default]
    All,
    /// Movements from the last 30 days
    LastMonth,
    /// Movements from the last 365 days
    LastYear,
}

impl Filter {
    /// Length of the rolling window, or `None` for [`Filter::All`].
    #[must_use]
    pub fn window(self) -> Option<Duration> {
        match self {
            Self::All => None,
            Self::LastMonth => Some(Duration::days(30)),
            Self::LastYear => Some(Duration::days(365)),
        }
    }

    /// Inclusive lower bound in epoch milliseconds for a query evaluated at `now`.
    #[must_use]
    pub fn lower_bound(self, now: DateTime<Utc>) -> Option<i64> {
        self.window()
            .map(|window| (now - window).timestamp_millis())
    }

    /// Next filter in the cycle `All -> LastMonth -> LastYear -> All`.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::All => Self::LastMonth,
            Self::LastMonth => Self::LastYear,
            Self::LastYear => Self::All,
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::All => "all",
            Self::LastMonth => "month",
            Self::LastYear => "year",
        };
        f.write_str(label)
    }
}

impl FromStr for Filter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" | "total" => Ok(Self::All),
            "month" | "last-month" => Ok(Self::LastMonth),
            "year" | "last-year" => Ok(Self::LastYear),
            other => Err(format!(
                "unknown filter '{other}', expected one of: all, month, year"
            )),
        }
    }
}
