//! Billing period identifiers (`YYYY-MM`).

use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PeriodError {
    #[error("invalid period '{0}': expected YYYY-MM")]
    Format(String),
    #[error("invalid period '{0}': month must be 01-12")]
    Month(String),
}

/// A billing cycle, one calendar month.
///
/// Stored as a `YYYY-MM` string, so lexicographic order equals
/// chronological order.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PeriodId(String);

impl PeriodId {
    pub fn parse(s: &str) -> Result<Self, PeriodError> {
        let s = s.trim();
        let bytes = s.as_bytes();
        let well_formed = bytes.len() == 7
            && bytes[4] == b'-'
            && bytes
                .iter()
                .enumerate()
                .all(|(i, b)| i == 4 || b.is_ascii_digit());
        if !well_formed || bytes[0] == b'0' {
            return Err(PeriodError::Format(s.to_string()));
        }
        if NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d").is_err() {
            return Err(PeriodError::Month(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }

    /// Period containing the given date.
    pub fn from_date(date: NaiveDate) -> Self {
        Self(format!("{:04}-{:02}", date.year(), date.month()))
    }

    /// Current UTC month.
    pub fn current() -> Self {
        Self::from_date(Utc::now().date_naive())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PeriodId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for PeriodId {
    type Err = PeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PeriodId {
    type Error = PeriodError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PeriodId> for String {
    fn from(value: PeriodId) -> Self {
        value.0
    }
}
