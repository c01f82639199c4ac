//! Render UTC instants as wall-clock text in a viewer's timezone.
//!
//! Presentation only. Uses the same `chrono-tz` database as [`crate::zone`],
//! so a slot is never displayed at an offset the resolver did not use.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::error::{Result, SlotError};
use crate::slots::TimeSlot;
use crate::zone::{from_utc, WallTime, Zone};

/// Pattern used by [`format_date_time_for_display`], e.g.
/// `Mon, Jan 12, 2026 9:00 AM EST`.
pub const DEFAULT_PATTERN: &str = "%a, %b %-d, %Y %-I:%M %p %Z";

/// Format `instant` in `zone` with a strftime `pattern`.
///
/// # Errors
///
/// Returns [`SlotError::InvalidPattern`] if `pattern` contains a malformed
/// specifier. The pattern is checked before formatting, so a bad pattern never
/// panics.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use slot_engine::display::format_for_display;
/// use slot_engine::zone::Zone;
///
/// let instant = Utc.with_ymd_and_hms(2026, 1, 12, 14, 0, 0).unwrap();
/// let paris = Zone::parse("Europe/Paris").unwrap();
/// assert_eq!(format_for_display(instant, &paris, "%H:%M").unwrap(), "15:00");
/// ```
pub fn format_for_display(instant: DateTime<Utc>, zone: &Zone, pattern: &str) -> Result<String> {
    let items: Vec<Item<'_>> = StrftimeItems::new(pattern).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(SlotError::InvalidPattern(format!("'{}'", pattern)));
    }
    let local = instant.with_timezone(&zone.tz());
    Ok(local.format_with_items(items.into_iter()).to_string())
}

/// Format `instant` in `zone` with [`DEFAULT_PATTERN`].
pub fn format_date_time_for_display(instant: DateTime<Utc>, zone: &Zone) -> String {
    instant
        .with_timezone(&zone.tz())
        .format(DEFAULT_PATTERN)
        .to_string()
}

/// A slot as a viewer in another timezone sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayedSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// The viewer's IANA timezone.
    pub timezone: String,
    /// Viewer-local date on which the slot starts.
    pub local_date: NaiveDate,
    pub local_start: WallTime,
    pub local_end: WallTime,
    /// Human-readable start, in [`DEFAULT_PATTERN`].
    pub label: String,
}

/// Convert resolved slots into the viewer's local terms, keeping order.
pub fn present_slots(slots: &[TimeSlot], viewer: &Zone) -> Vec<DisplayedSlot> {
    slots
        .iter()
        .map(|slot| {
            let (local_date, local_start) = from_utc(slot.start, viewer);
            let (_, local_end) = from_utc(slot.end, viewer);
            DisplayedSlot {
                start: slot.start,
                end: slot.end,
                timezone: viewer.name().to_string(),
                local_date,
                local_start,
                local_end,
                label: format_date_time_for_display(slot.start, viewer),
            }
        })
        .collect()
}
