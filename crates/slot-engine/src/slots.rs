//! Fixed-stride slot generation over a UTC window.
//!
//! Starting at the window start, emits `[cursor, cursor + duration)` and
//! advances by exactly one duration, stopping before the first slot that would
//! end past the window. Slots produced this way never overlap each other, so
//! downstream filtering only has to check external bookings and breaks.

use std::iter::FusedIterator;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SlotError};
use crate::interval::{self, Interval};

/// A bookable slot. `end - start` is always the requested session duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeSlot {
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// True iff this slot shares any instant with `other`.
    pub fn overlaps(&self, other: &Interval) -> bool {
        interval::overlaps(self.start, self.end, other.start(), other.end())
    }

    /// Whether the slot has not started yet at `now`.
    pub fn is_future(&self, now: DateTime<Utc>) -> bool {
        self.start > now
    }
}

impl TryFrom<TimeSlot> for Interval {
    type Error = SlotError;

    fn try_from(slot: TimeSlot) -> Result<Self> {
        Interval::new(slot.start, slot.end)
    }
}

/// Lazy iterator returned by [`generate_slots`].
#[derive(Debug, Clone)]
pub struct Slots {
    cursor: DateTime<Utc>,
    window_end: DateTime<Utc>,
    step: TimeDelta,
}

impl Iterator for Slots {
    type Item = TimeSlot;

    fn next(&mut self) -> Option<TimeSlot> {
        let end = self.cursor.checked_add_signed(self.step)?;
        if end > self.window_end {
            // Park the cursor so every later call also stops.
            self.cursor = self.window_end;
            return None;
        }
        let slot = TimeSlot {
            start: self.cursor,
            end,
        };
        self.cursor = end;
        Some(slot)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.window_end - self.cursor).num_milliseconds();
        let step = self.step.num_milliseconds();
        let n = if remaining > 0 {
            usize::try_from(remaining / step).unwrap_or(usize::MAX)
        } else {
            0
        };
        (n, Some(n))
    }
}

impl FusedIterator for Slots {}

impl ExactSizeIterator for Slots {}

/// Enumerate back-to-back slots of `duration_minutes` inside
/// `[window_start, window_end]`.
///
/// A window shorter than one duration (or an inverted window) yields nothing.
///
/// # Errors
///
/// Returns [`SlotError::InvalidDuration`] if `duration_minutes <= 0` or is too
/// large to represent.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use slot_engine::slots::generate_slots;
///
/// let start = Utc.with_ymd_and_hms(2026, 1, 12, 14, 0, 0).unwrap();
/// let end = Utc.with_ymd_and_hms(2026, 1, 12, 16, 30, 0).unwrap();
/// let slots: Vec<_> = generate_slots(start, end, 60).unwrap().collect();
/// assert_eq!(slots.len(), 2); // 14:00 and 15:00; 16:00-17:00 would overrun
/// ```
pub fn generate_slots(
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    duration_minutes: i64,
) -> Result<Slots> {
    if duration_minutes <= 0 {
        return Err(SlotError::InvalidDuration(format!(
            "session duration must be positive, got {duration_minutes} minutes"
        )));
    }
    let step = TimeDelta::try_minutes(duration_minutes).ok_or_else(|| {
        SlotError::InvalidDuration(format!("{duration_minutes} minutes is out of range"))
    })?;
    Ok(Slots {
        cursor: window_start,
        window_end,
        step,
    })
}

// ── Tests ───────────────────────────────────────────────────────────────────
