//! # slot-engine
//!
//! Timezone-aware appointment availability.
//!
//! Turns a provider's recurring wall-clock availability ("Mondays 09:00–17:00,
//! America/New_York") into concrete, non-overlapping, UTC-anchored bookable
//! slots for a given date, correctly across daylight-saving transitions, and
//! renders those slots in any viewer's timezone.
//!
//! Everything here is a pure function over borrowed inputs: no clock reads,
//! no I/O, no shared state. The caller supplies "now" and the existing
//! bookings.
//!
//! ## Modules
//!
//! - [`zone`] — Validated zones, wall-clock ↔ UTC conversion, weekdays
//! - [`interval`] — Half-open overlap tests and the commit-time availability check
//! - [`slots`] — Fixed-stride slot generation over a UTC window
//! - [`availability`] — Weekly rules + date + bookings → bookable slots
//! - [`display`] — Viewer-timezone presentation
//! - [`error`] — Error types

pub mod availability;
pub mod display;
pub mod error;
pub mod interval;
pub mod slots;
pub mod zone;

pub use availability::{
    first_available, resolve_range, resolve_slots, resolve_slots_with, AvailabilityRule,
    AvailabilitySchedule, BreakRange, RangeQuery, ResolverOptions, SlotQuery,
};
pub use display::{
    format_date_time_for_display, format_for_display, present_slots, DisplayedSlot,
};
pub use error::{Result, SlotError};
pub use interval::{ensure_available, overlaps, overlaps_any, BookingInterval, Interval};
pub use slots::{generate_slots, Slots, TimeSlot};
pub use zone::{
    day_of_week, from_utc, is_valid_timezone, parse_date, to_utc, to_utc_with,
    utc_offset_minutes, DayOfWeek, FoldPolicy, WallTime, Zone,
};
