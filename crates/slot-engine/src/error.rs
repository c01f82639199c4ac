//! Error types for slot-engine operations.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::zone::DayOfWeek;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SlotError {
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid time: {0}")]
    InvalidTime(String),

    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    #[error("Invalid interval: {0}")]
    InvalidInterval(String),

    #[error("Invalid rule: {0}")]
    InvalidRule(String),

    #[error("Invalid display pattern: {0}")]
    InvalidPattern(String),

    /// A stored availability rule failed validation while being resolved.
    #[error("Corrupt availability rule for {day}: {source}")]
    CorruptRule {
        day: DayOfWeek,
        #[source]
        source: Box<SlotError>,
    },

    #[error("Slot no longer available: {start} - {end}")]
    SlotNoLongerAvailable {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

impl SlotError {
    /// True when the fault comes from stored provider data rather than from
    /// the caller's request.
    pub fn is_data_integrity(&self) -> bool {
        matches!(self, SlotError::CorruptRule { .. })
    }

    /// True when re-querying availability and choosing again can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SlotError::SlotNoLongerAvailable { .. })
    }
}

pub type Result<T> = std::result::Result<T, SlotError>;
