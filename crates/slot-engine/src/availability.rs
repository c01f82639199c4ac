//! Resolve a provider's weekly availability into bookable UTC slots.
//!
//! A provider stores one [`AvailabilityRule`] per weekday, written in
//! wall-clock terms of their home timezone. For a requested calendar date the
//! resolver:
//!
//! 1. looks up the rule for that date's weekday (no rule ⇒ closed, no slots),
//! 2. anchors the rule's start/end to that date in the home zone,
//! 3. packs fixed-length slots into the anchored window,
//! 4. drops slots overlapping a break, then slots overlapping a booking,
//! 5. drops slots that have already started at `now`.
//!
//! Anchoring per date is what makes DST transparent: the same rule yields
//! different UTC windows on either side of a transition while always covering
//! the same local hours.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SlotError};
use crate::interval::{BookingInterval, Interval};
use crate::slots::{generate_slots, TimeSlot};
use crate::zone::{to_utc_with, DayOfWeek, FoldPolicy, WallTime, Zone};

// ── Rules ───────────────────────────────────────────────────────────────────

/// A wall-clock sub-range of a working day during which nothing is offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakRange {
    pub start: WallTime,
    pub end: WallTime,
}

/// Recurring availability for one weekday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityRule {
    pub day_of_week: DayOfWeek,
    /// IANA name of the provider's home timezone. Kept as stored text and
    /// validated on every resolution.
    pub timezone: String,
    pub start: WallTime,
    pub end: WallTime,
    pub session_minutes: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub breaks: Vec<BreakRange>,
}

impl AvailabilityRule {
    /// Check the rule is internally consistent and return its home zone.
    ///
    /// # Errors
    ///
    /// Returns [`SlotError::InvalidTimezone`] for an unknown zone, or
    /// [`SlotError::InvalidRule`] when the working range or a break is empty
    /// or inverted, or the session length is zero.
    pub fn validate(&self) -> Result<Zone> {
        let zone = Zone::parse(&self.timezone)?;
        if self.end <= self.start {
            return Err(SlotError::InvalidRule(format!(
                "end {} must be after start {}",
                self.end, self.start
            )));
        }
        if self.session_minutes == 0 {
            return Err(SlotError::InvalidRule(
                "session length must be at least one minute".to_string(),
            ));
        }
        if let Some(b) = self.breaks.iter().find(|b| b.end <= b.start) {
            return Err(SlotError::InvalidRule(format!(
                "break end {} must be after break start {}",
                b.end, b.start
            )));
        }
        Ok(zone)
    }
}

/// One provider's rules, at most one per weekday.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<AvailabilityRule>", into = "Vec<AvailabilityRule>")]
pub struct AvailabilitySchedule {
    rules: BTreeMap<DayOfWeek, AvailabilityRule>,
}

impl AvailabilitySchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the rule for `rule.day_of_week`, returning the rule
    /// it replaced.
    pub fn set_rule(&mut self, rule: AvailabilityRule) -> Option<AvailabilityRule> {
        self.rules.insert(rule.day_of_week, rule)
    }

    pub fn remove_rule(&mut self, day: DayOfWeek) -> Option<AvailabilityRule> {
        self.rules.remove(&day)
    }

    pub fn rule_for(&self, day: DayOfWeek) -> Option<&AvailabilityRule> {
        self.rules.get(&day)
    }

    /// Rules in weekday order, Sunday first.
    pub fn rules(&self) -> impl Iterator<Item = &AvailabilityRule> {
        self.rules.values()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl FromIterator<AvailabilityRule> for AvailabilitySchedule {
    fn from_iter<I: IntoIterator<Item = AvailabilityRule>>(iter: I) -> Self {
        let mut schedule = AvailabilitySchedule::new();
        for rule in iter {
            schedule.set_rule(rule);
        }
        schedule
    }
}

impl From<Vec<AvailabilityRule>> for AvailabilitySchedule {
    fn from(rules: Vec<AvailabilityRule>) -> Self {
        rules.into_iter().collect()
    }
}

impl From<AvailabilitySchedule> for Vec<AvailabilityRule> {
    fn from(schedule: AvailabilitySchedule) -> Self {
        schedule.rules.into_values().collect()
    }
}

// ── Queries and options ─────────────────────────────────────────────────────

/// Options for [`resolve_slots_with`] and friends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverOptions {
    /// How rule boundaries that fall in a repeated (fall-back) hour are
    /// anchored.
    #[serde(default)]
    pub fold_policy: FoldPolicy,
}

/// A request for one day's bookable slots.
#[derive(Debug, Clone, Copy)]
pub struct SlotQuery<'a> {
    /// Calendar date in the provider's home timezone.
    pub date: NaiveDate,
    /// Session length; `None` uses the rule's `session_minutes`.
    pub duration_minutes: Option<i64>,
    /// The provider's existing bookings.
    pub bookings: &'a [BookingInterval],
    /// Request time. Slots starting at or before it are not offered.
    pub now: DateTime<Utc>,
}

impl<'a> SlotQuery<'a> {
    pub fn new(date: NaiveDate, now: DateTime<Utc>) -> Self {
        SlotQuery {
            date,
            duration_minutes: None,
            bookings: &[],
            now,
        }
    }

    pub fn with_duration(mut self, minutes: i64) -> Self {
        self.duration_minutes = Some(minutes);
        self
    }

    pub fn with_bookings(mut self, bookings: &'a [BookingInterval]) -> Self {
        self.bookings = bookings;
        self
    }
}

/// A request spanning several days. See [`resolve_range`].
#[derive(Debug, Clone, Copy)]
pub struct RangeQuery<'a> {
    pub duration_minutes: Option<i64>,
    pub bookings: &'a [BookingInterval],
    pub now: DateTime<Utc>,
}

impl<'a> RangeQuery<'a> {
    pub fn new(now: DateTime<Utc>) -> Self {
        RangeQuery {
            duration_minutes: None,
            bookings: &[],
            now,
        }
    }

    pub fn with_duration(mut self, minutes: i64) -> Self {
        self.duration_minutes = Some(minutes);
        self
    }

    pub fn with_bookings(mut self, bookings: &'a [BookingInterval]) -> Self {
        self.bookings = bookings;
        self
    }

    fn for_date(&self, date: NaiveDate) -> SlotQuery<'a> {
        SlotQuery {
            date,
            duration_minutes: self.duration_minutes,
            bookings: self.bookings,
            now: self.now,
        }
    }
}

// ── Resolution ──────────────────────────────────────────────────────────────

/// Bookable slots for one date, using default [`ResolverOptions`].
///
/// # Errors
///
/// - [`SlotError::CorruptRule`] if the stored rule for that weekday is invalid
///   (unknown zone, empty range, zero session length, malformed break).
/// - [`SlotError::InvalidDuration`] if the requested duration is not positive.
/// - [`SlotError::InvalidTime`] if a rule boundary does not exist on that date
///   (it falls in a DST gap).
///
/// # Examples
///
/// ```
/// use chrono::{NaiveDate, TimeZone, Utc};
/// use slot_engine::availability::{resolve_slots, AvailabilityRule, AvailabilitySchedule, SlotQuery};
/// use slot_engine::zone::{DayOfWeek, WallTime};
///
/// let schedule: AvailabilitySchedule = vec![AvailabilityRule {
///     day_of_week: DayOfWeek::MONDAY,
///     timezone: "America/New_York".to_string(),
///     start: WallTime::parse("09:00").unwrap(),
///     end: WallTime::parse("17:00").unwrap(),
///     session_minutes: 60,
///     breaks: vec![],
/// }]
/// .into();
///
/// let monday = NaiveDate::from_ymd_opt(2026, 1, 12).unwrap();
/// let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
/// let slots = resolve_slots(&schedule, &SlotQuery::new(monday, now)).unwrap();
/// assert_eq!(slots.len(), 8);
/// assert_eq!(slots[0].start.to_rfc3339(), "2026-01-12T14:00:00+00:00");
/// ```
pub fn resolve_slots(
    schedule: &AvailabilitySchedule,
    query: &SlotQuery<'_>,
) -> Result<Vec<TimeSlot>> {
    resolve_slots_with(schedule, query, &ResolverOptions::default())
}

/// Bookable slots for one date with explicit options.
///
/// # Errors
///
/// Same as [`resolve_slots`].
pub fn resolve_slots_with(
    schedule: &AvailabilitySchedule,
    query: &SlotQuery<'_>,
    options: &ResolverOptions,
) -> Result<Vec<TimeSlot>> {
    let day = DayOfWeek::of_date(query.date);
    let Some(rule) = schedule.rule_for(day) else {
        tracing::debug!(date = %query.date, %day, "no rule for weekday; provider closed");
        return Ok(Vec::new());
    };

    let zone = rule.validate().map_err(|e| corrupt(day, e))?;
    let duration = query
        .duration_minutes
        .unwrap_or_else(|| i64::from(rule.session_minutes));

    let fold = options.fold_policy;
    let window_start = to_utc_with(query.date, rule.start, &zone, fold)?;
    let window_end = to_utc_with(query.date, rule.end, &zone, fold)?;
    let candidates = generate_slots(window_start, window_end, duration)?;

    let breaks = rule
        .breaks
        .iter()
        .map(|b| anchor_break(b, query.date, &zone, fold))
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(
        date = %query.date,
        %day,
        %zone,
        %window_start,
        %window_end,
        duration,
        breaks = breaks.len(),
        bookings = query.bookings.len(),
        "resolving availability"
    );

    let slots: Vec<TimeSlot> = candidates
        .filter(|slot| {
            if let Some(b) = breaks.iter().find(|b| slot.overlaps(b)) {
                tracing::trace!(start = %slot.start, break_start = %b.start(), "slot falls in a break");
                return false;
            }
            if let Some(b) = query.bookings.iter().find(|b| slot.overlaps(b)) {
                tracing::trace!(start = %slot.start, booking_start = %b.start(), "slot already booked");
                return false;
            }
            if !slot.is_future(query.now) {
                tracing::trace!(start = %slot.start, now = %query.now, "slot already started");
                return false;
            }
            true
        })
        .collect();

    tracing::debug!(date = %query.date, offered = slots.len(), "availability resolved");
    Ok(slots)
}

/// Bookable slots for every date in `from..=to`, ascending by UTC start.
///
/// Each weekday's rule carries its own home zone, so one civil date can
/// anchor later than the next; the joined days are re-sorted by instant.
/// An inverted range yields no slots.
///
/// # Errors
///
/// The first per-day error aborts the whole range; see [`resolve_slots`].
pub fn resolve_range(
    schedule: &AvailabilitySchedule,
    from: NaiveDate,
    to: NaiveDate,
    query: &RangeQuery<'_>,
    options: &ResolverOptions,
) -> Result<Vec<TimeSlot>> {
    let mut slots = Vec::new();
    for date in from.iter_days().take_while(|d| *d <= to) {
        slots.extend(resolve_slots_with(schedule, &query.for_date(date), options)?);
    }
    slots.sort_by_key(|slot| slot.start);
    Ok(slots)
}

/// The bookable slot with the earliest UTC start in `from..=to`, if any.
///
/// Every date is resolved: with per-weekday zones a later civil date can
/// offer an earlier instant.
///
/// # Errors
///
/// See [`resolve_range`].
pub fn first_available(
    schedule: &AvailabilitySchedule,
    from: NaiveDate,
    to: NaiveDate,
    query: &RangeQuery<'_>,
    options: &ResolverOptions,
) -> Result<Option<TimeSlot>> {
    let mut earliest: Option<TimeSlot> = None;
    for date in from.iter_days().take_while(|d| *d <= to) {
        let day = resolve_slots_with(schedule, &query.for_date(date), options)?;
        if let Some(slot) = day.into_iter().next() {
            if earliest.is_none_or(|e| slot.start < e.start) {
                earliest = Some(slot);
            }
        }
    }
    Ok(earliest)
}

fn anchor_break(
    range: &BreakRange,
    date: NaiveDate,
    zone: &Zone,
    fold: FoldPolicy,
) -> Result<Interval> {
    let start = to_utc_with(date, range.start, zone, fold)?;
    let end = to_utc_with(date, range.end, zone, fold)?;
    Interval::new(start, end)
}

fn corrupt(day: DayOfWeek, source: SlotError) -> SlotError {
    tracing::warn!(%day, error = %source, "stored availability rule failed validation");
    SlotError::CorruptRule {
        day,
        source: Box::new(source),
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
