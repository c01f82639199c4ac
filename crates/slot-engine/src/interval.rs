//! Overlap and containment over half-open UTC intervals.
//!
//! Every interval is `[start, end)`. Adjacent intervals (one ends exactly when
//! the other starts) do NOT overlap, which is what allows back-to-back
//! bookings with zero gap.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SlotError};

/// True iff `[start_a, end_a)` and `[start_b, end_b)` share any instant.
///
/// Symmetric in its two intervals.
///
/// # Examples
///
/// ```
/// use slot_engine::interval::overlaps;
///
/// assert!(overlaps(0, 10, 5, 15));
/// assert!(!overlaps(0, 10, 10, 20)); // adjacent
/// ```
pub fn overlaps<T: PartialOrd>(start_a: T, end_a: T, start_b: T, end_b: T) -> bool {
    start_a < end_b && start_b < end_a
}

/// A non-empty half-open range of UTC instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawInterval", into = "RawInterval")]
pub struct Interval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

/// An interval already claimed by a booking.
pub type BookingInterval = Interval;

impl Interval {
    /// # Errors
    ///
    /// Returns [`SlotError::InvalidInterval`] unless `start < end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Interval> {
        if start < end {
            Ok(Interval { start, end })
        } else {
            Err(SlotError::InvalidInterval(format!(
                "end {} must be after start {}",
                end.to_rfc3339(),
                start.to_rfc3339()
            )))
        }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    pub fn overlaps(&self, other: &Interval) -> bool {
        overlaps(self.start, self.end, other.start, other.end)
    }

    /// True iff `other` lies entirely within this interval.
    pub fn contains(&self, other: &Interval) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn contains_instant(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

#[derive(Serialize, Deserialize)]
struct RawInterval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TryFrom<RawInterval> for Interval {
    type Error = SlotError;

    fn try_from(raw: RawInterval) -> Result<Self> {
        Interval::new(raw.start, raw.end)
    }
}

impl From<Interval> for RawInterval {
    fn from(interval: Interval) -> Self {
        RawInterval {
            start: interval.start,
            end: interval.end,
        }
    }
}

/// True iff `candidate` overlaps any interval in `intervals`.
pub fn overlaps_any(candidate: &Interval, intervals: &[Interval]) -> bool {
    intervals.iter().any(|i| candidate.overlaps(i))
}

/// Confirm `candidate` is still free against the latest committed bookings.
///
/// Slot lists are computed from a snapshot, so two clients can be offered the
/// same slot. The booking store must call this inside the same transaction
/// that writes the booking.
///
/// # Errors
///
/// Returns [`SlotError::SlotNoLongerAvailable`] if any committed booking
/// overlaps `candidate`.
pub fn ensure_available(candidate: &Interval, committed: &[BookingInterval]) -> Result<()> {
    match committed.iter().find(|b| candidate.overlaps(b)) {
        Some(conflict) => {
            tracing::debug!(
                candidate_start = %candidate.start,
                conflict_start = %conflict.start,
                conflict_end = %conflict.end,
                "slot claimed by a committed booking"
            );
            Err(SlotError::SlotNoLongerAvailable {
                start: candidate.start,
                end: candidate.end,
            })
        }
        None => Ok(()),
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
