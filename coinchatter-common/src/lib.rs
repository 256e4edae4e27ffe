//! Shared types and utilities for the coinchatter crates.
//!
//! Holds the error type used by the collection pipeline and the
//! [`observability`] helpers that every binary calls on start-up.
//!
//! # Overview
//!
//! - [`observability`]: Centralised tracing/logging initialisation
//! - [`CoinchatterError`] and [`Result`]: Shared error handling
//! - [`LogFormat`]: Output encoding for structured logs
//!
//! # Examples
//!
//! ```rust
//! use coinchatter_common::CoinchatterError;
//!
//! let err = CoinchatterError::InvalidRange {
//!     start: "2022-01-10".into(),
//!     end: "2022-01-01".into(),
//! };
//! assert!(err.to_string().contains("2022-01-10"));
//! ```
use serde::{Deserialize, Serialize};

pub mod observability;

pub use observability::LogFormat;

/// Error types used across the collection pipeline.
#[derive(thiserror::Error, Debug)]
pub enum CoinchatterError {
    /// The requested date range is empty or inverted.
    #[error("start date {start} must be earlier than end date {end}")]
    InvalidRange { start: String, end: String },

    /// A date argument could not be parsed as `YYYY-MM-DD`.
    #[error("invalid date {input:?}: {reason}")]
    InvalidDate { input: String, reason: String },

    /// The search provider failed (network, HTTP status, or decode).
    #[error("search provider error")]
    Provider(#[from] anyhow::Error),

    /// Configuration was incomplete or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Writing a snapshot file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A snapshot table could not be encoded or decoded.
    #[error("snapshot encoding error: {0}")]
    Snapshot(#[from] serde_json::Error),
}

/// Convenient alias for results that use [`CoinchatterError`].
pub type Result<T> = std::result::Result<T, CoinchatterError>;

/// How a date range was requested on the command line.
///
/// Kept here so both the CLI and the collection crate agree on the wire form
/// used in file names and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First day, inclusive.
    pub start: chrono::NaiveDate,
    /// Last day, exclusive.
    pub end: chrono::NaiveDate,
}

impl DateRange {
    /// Build a range, rejecting empty or inverted ones.
    ///
    /// ```rust
    /// use chrono::NaiveDate;
    /// use coinchatter_common::DateRange;
    ///
    /// let d = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap();
    /// assert!(DateRange::new(d("2022-01-01"), d("2022-01-02")).is_ok());
    /// assert!(DateRange::new(d("2022-01-02"), d("2022-01-02")).is_err());
    /// ```
    pub fn new(start: chrono::NaiveDate, end: chrono::NaiveDate) -> Result<Self> {
        if start >= end {
            return Err(CoinchatterError::InvalidRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// Parse two `YYYY-MM-DD` strings into a validated range.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    /// Number of whole days covered.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

fn parse_date(input: &str) -> Result<chrono::NaiveDate> {
    chrono::NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|e| {
        CoinchatterError::InvalidDate {
            input: input.to_string(),
            reason: e.to_string(),
        }
    })
}
