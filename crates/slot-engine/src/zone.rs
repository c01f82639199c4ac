//! Timezone conversion primitives.
//!
//! Pure functions converting between `(date, wall-clock time, IANA zone)`
//! triples and UTC instants. Every zone string is validated before use and
//! every wall-clock value that does not exist in its zone is rejected, so no
//! caller ever receives a silently shifted instant.
//!
//! The zone database is `chrono-tz`, compiled into the binary. Which IANA
//! release is in use is therefore fixed by the dependency version; a rule
//! update (a political DST change) is an explicit dependency bump.
//!
//! # Functions
//!
//! - [`is_valid_timezone`] — Boundary guard for zone strings
//! - [`to_utc`] / [`to_utc_with`] — Wall clock in a zone → UTC instant
//! - [`from_utc`] — UTC instant → wall clock in a zone
//! - [`day_of_week`] — Weekday of an instant as observed in a zone
//! - [`utc_offset_minutes`] — Offset in effect at an instant

use std::fmt;
use std::str::FromStr;

use chrono::{
    DateTime, Datelike, LocalResult, NaiveDate, NaiveTime, Offset, SubsecRound, TimeDelta,
    TimeZone, Timelike, Utc, Weekday,
};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SlotError};

// ── Zone ────────────────────────────────────────────────────────────────────

/// A validated IANA timezone.
///
/// The only way to obtain a `Zone` from text is through parsing, so holding
/// one proves the identifier resolved against the zone database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Zone(Tz);

impl Zone {
    /// Parse an IANA timezone name (e.g., `"Europe/Paris"`).
    ///
    /// # Errors
    ///
    /// Returns [`SlotError::InvalidTimezone`] if the name is not a known zone.
    ///
    /// # Examples
    ///
    /// ```
    /// use slot_engine::zone::Zone;
    ///
    /// let zone = Zone::parse("America/New_York").unwrap();
    /// assert_eq!(zone.name(), "America/New_York");
    /// assert!(Zone::parse("Mars/Olympus_Mons").is_err());
    /// ```
    pub fn parse(id: &str) -> Result<Zone> {
        id.parse::<Tz>()
            .map(Zone)
            .map_err(|_| SlotError::InvalidTimezone(format!("'{}'", id)))
    }

    /// The IANA name of this zone.
    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    /// The underlying `chrono-tz` zone.
    pub fn tz(&self) -> Tz {
        self.0
    }
}

impl From<Tz> for Zone {
    fn from(tz: Tz) -> Self {
        Zone(tz)
    }
}

impl FromStr for Zone {
    type Err = SlotError;

    fn from_str(s: &str) -> Result<Self> {
        Zone::parse(s)
    }
}

impl TryFrom<String> for Zone {
    type Error = SlotError;

    fn try_from(s: String) -> Result<Self> {
        Zone::parse(&s)
    }
}

impl From<Zone> for String {
    fn from(zone: Zone) -> Self {
        zone.name().to_string()
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// True iff `id` is a recognized IANA zone name.
pub fn is_valid_timezone(id: &str) -> bool {
    id.parse::<Tz>().is_ok()
}

// ── WallTime ────────────────────────────────────────────────────────────────

/// A wall-clock time of day at minute precision, with no zone attached.
///
/// Canonical text form is `HH:MM` (24-hour, zero-padded).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WallTime(NaiveTime);

impl WallTime {
    /// Build a wall-clock time from hour (0-23) and minute (0-59).
    ///
    /// # Errors
    ///
    /// Returns [`SlotError::InvalidTime`] if either component is out of range.
    pub fn new(hour: u32, minute: u32) -> Result<WallTime> {
        NaiveTime::from_hms_opt(hour, minute, 0)
            .map(WallTime)
            .ok_or_else(|| SlotError::InvalidTime(format!("{hour:02}:{minute:02} out of range")))
    }

    /// Parse the canonical `HH:MM` form.
    ///
    /// Only the exact five-character form is accepted: `"9:00"`, `"09:00:00"`
    /// and `"24:00"` are all rejected.
    ///
    /// # Errors
    ///
    /// Returns [`SlotError::InvalidTime`] for anything else.
    pub fn parse(s: &str) -> Result<WallTime> {
        let invalid = || SlotError::InvalidTime(format!("'{}': expected HH:MM", s));
        let bytes = s.as_bytes();
        if bytes.len() != 5 || bytes[2] != b':' {
            return Err(invalid());
        }
        let field = |digits: &[u8]| -> Option<u32> {
            if digits.iter().all(u8::is_ascii_digit) {
                Some(digits.iter().fold(0, |n, d| n * 10 + u32::from(d - b'0')))
            } else {
                None
            }
        };
        let hour = field(&bytes[..2]).ok_or_else(invalid)?;
        let minute = field(&bytes[3..]).ok_or_else(invalid)?;
        WallTime::new(hour, minute).map_err(|_| invalid())
    }

    /// Drop seconds and sub-second precision from a local reading.
    fn truncating(time: NaiveTime) -> WallTime {
        let whole = time.trunc_subsecs(0);
        WallTime(whole - TimeDelta::seconds(i64::from(whole.second())))
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    /// Minutes since local midnight.
    pub fn minutes_from_midnight(&self) -> u32 {
        self.hour() * 60 + self.minute()
    }

    pub fn to_naive(self) -> NaiveTime {
        self.0
    }
}

impl FromStr for WallTime {
    type Err = SlotError;

    fn from_str(s: &str) -> Result<Self> {
        WallTime::parse(s)
    }
}

impl TryFrom<String> for WallTime {
    type Error = SlotError;

    fn try_from(s: String) -> Result<Self> {
        WallTime::parse(&s)
    }
}

impl From<WallTime> for String {
    fn from(time: WallTime) -> Self {
        time.to_string()
    }
}

impl fmt::Display for WallTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

/// Parse a wall-clock date in canonical `YYYY-MM-DD` form.
///
/// # Errors
///
/// Returns [`SlotError::InvalidDate`] if the text is not exactly that form or
/// names a day that does not exist (e.g., `2026-02-30`).
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    if s.len() != 10 {
        return Err(SlotError::InvalidDate(format!("'{}': expected YYYY-MM-DD", s)));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| SlotError::InvalidDate(format!("'{}': {}", s, e)))
}

// ── DayOfWeek ───────────────────────────────────────────────────────────────

const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Day of the week, 0 = Sunday through 6 = Saturday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct DayOfWeek(u8);

impl DayOfWeek {
    pub const SUNDAY: DayOfWeek = DayOfWeek(0);
    pub const MONDAY: DayOfWeek = DayOfWeek(1);
    pub const TUESDAY: DayOfWeek = DayOfWeek(2);
    pub const WEDNESDAY: DayOfWeek = DayOfWeek(3);
    pub const THURSDAY: DayOfWeek = DayOfWeek(4);
    pub const FRIDAY: DayOfWeek = DayOfWeek(5);
    pub const SATURDAY: DayOfWeek = DayOfWeek(6);

    /// # Errors
    ///
    /// Returns [`SlotError::InvalidRule`] if `n > 6`.
    pub fn new(n: u8) -> Result<DayOfWeek> {
        if n <= 6 {
            Ok(DayOfWeek(n))
        } else {
            Err(SlotError::InvalidRule(format!(
                "day of week must be 0..=6, got {n}"
            )))
        }
    }

    /// Weekday of a civil date. A `NaiveDate` already names a day in some
    /// zone, so no zone is needed here.
    pub fn of_date(date: NaiveDate) -> DayOfWeek {
        DayOfWeek::from(date.weekday())
    }

    pub fn number(&self) -> u8 {
        self.0
    }

    pub fn name(&self) -> &'static str {
        DAY_NAMES[usize::from(self.0)]
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(weekday: Weekday) -> Self {
        // num_days_from_sunday is always 0..=6
        DayOfWeek(weekday.num_days_from_sunday() as u8)
    }
}

impl From<DayOfWeek> for Weekday {
    fn from(day: DayOfWeek) -> Self {
        match day.0 {
            0 => Weekday::Sun,
            1 => Weekday::Mon,
            2 => Weekday::Tue,
            3 => Weekday::Wed,
            4 => Weekday::Thu,
            5 => Weekday::Fri,
            _ => Weekday::Sat,
        }
    }
}

impl TryFrom<u8> for DayOfWeek {
    type Error = SlotError;

    fn try_from(n: u8) -> Result<Self> {
        DayOfWeek::new(n)
    }
}

impl From<DayOfWeek> for u8 {
    fn from(day: DayOfWeek) -> Self {
        day.0
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── Conversions ─────────────────────────────────────────────────────────────

/// Which instant to pick when a wall-clock time occurs twice (DST fall-back).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FoldPolicy {
    /// The first occurrence (still on the pre-transition offset).
    #[default]
    Earliest,
    /// The second occurrence (on the post-transition offset).
    Latest,
}

/// Interpret `(date, time)` as observed in `zone` and return the instant.
///
/// Ambiguous fall-back times resolve to the earliest occurrence. Use
/// [`to_utc_with`] to choose the other one.
///
/// # Errors
///
/// Returns [`SlotError::InvalidTime`] if the wall-clock time does not exist
/// on that date in that zone (the spring-forward gap).
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use slot_engine::zone::{to_utc, WallTime, Zone};
///
/// let zone = Zone::parse("America/New_York").unwrap();
/// let date = NaiveDate::from_ymd_opt(2026, 1, 12).unwrap();
/// let utc = to_utc(date, WallTime::parse("09:00").unwrap(), &zone).unwrap();
/// assert_eq!(utc.to_rfc3339(), "2026-01-12T14:00:00+00:00");
///
/// // 02:30 does not exist on the US spring-forward day.
/// let gap = NaiveDate::from_ymd_opt(2026, 3, 8).unwrap();
/// assert!(to_utc(gap, WallTime::parse("02:30").unwrap(), &zone).is_err());
/// ```
pub fn to_utc(date: NaiveDate, time: WallTime, zone: &Zone) -> Result<DateTime<Utc>> {
    to_utc_with(date, time, zone, FoldPolicy::Earliest)
}

/// Like [`to_utc`], with an explicit policy for ambiguous times.
///
/// # Errors
///
/// Returns [`SlotError::InvalidTime`] for non-existent wall-clock times.
pub fn to_utc_with(
    date: NaiveDate,
    time: WallTime,
    zone: &Zone,
    fold: FoldPolicy,
) -> Result<DateTime<Utc>> {
    let naive = date.and_time(time.to_naive());
    let local = match zone.tz().from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earliest, latest) => match fold {
            FoldPolicy::Earliest => earliest,
            FoldPolicy::Latest => latest,
        },
        LocalResult::None => {
            return Err(SlotError::InvalidTime(format!(
                "{} {} does not exist in {} (DST gap)",
                date, time, zone
            )));
        }
    };
    Ok(local.with_timezone(&Utc))
}

/// The wall-clock reading of `instant` in `zone`, truncated to the minute.
///
/// Always succeeds: every instant has exactly one local reading.
pub fn from_utc(instant: DateTime<Utc>, zone: &Zone) -> (NaiveDate, WallTime) {
    let local = instant.with_timezone(&zone.tz());
    (local.date_naive(), WallTime::truncating(local.time()))
}

/// Weekday of `instant` as observed in `zone`.
///
/// The same instant can fall on different weekdays in different zones; rule
/// lookups must use the provider's home zone.
pub fn day_of_week(instant: DateTime<Utc>, zone: &Zone) -> DayOfWeek {
    DayOfWeek::from(instant.with_timezone(&zone.tz()).weekday())
}

/// UTC offset in minutes in effect in `zone` at `instant` (east positive).
pub fn utc_offset_minutes(instant: DateTime<Utc>, zone: &Zone) -> i32 {
    instant
        .with_timezone(&zone.tz())
        .offset()
        .fix()
        .local_minus_utc()
        / 60
}

// ── Tests ───────────────────────────────────────────────────────────────────
