//! End-to-end availability scenarios across timezones and DST.

use chrono::{DateTime, NaiveDate, TimeZone, Timelike, Utc};
use slot_engine::availability::{
    resolve_slots, AvailabilityRule, AvailabilitySchedule, BreakRange, SlotQuery,
};
use slot_engine::display::present_slots;
use slot_engine::interval::{ensure_available, Interval};
use slot_engine::zone::{from_utc, DayOfWeek, WallTime, Zone};

// ── Helpers ─────────────────────────────────────────────────────────────────

fn t(s: &str) -> WallTime {
    WallTime::parse(s).unwrap()
}

fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
}

/// Monday, America/New_York, 09:00–17:00, 60-minute sessions, no breaks.
fn new_york_mondays() -> AvailabilitySchedule {
    vec![AvailabilityRule {
        day_of_week: DayOfWeek::MONDAY,
        timezone: "America/New_York".to_string(),
        start: t("09:00"),
        end: t("17:00"),
        session_minutes: 60,
        breaks: vec![],
    }]
    .into()
}

fn january_monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 12).unwrap()
}

fn july_monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 7, 13).unwrap()
}

fn long_ago() -> DateTime<Utc> {
    utc(2025, 12, 1, 0, 0)
}

// ── Scenarios ───────────────────────────────────────────────────────────────

#[test]
fn winter_monday_offers_eight_slots_from_1400_utc() {
    let slots = resolve_slots(&new_york_mondays(), &SlotQuery::new(january_monday(), long_ago())).unwrap();

    assert_eq!(slots.len(), 8);
    assert_eq!(slots[0].start, utc(2026, 1, 12, 14, 0));
    assert_eq!(slots[7].start, utc(2026, 1, 12, 21, 0));
    assert_eq!(slots[7].end, utc(2026, 1, 12, 22, 0));
    assert!(slots.iter().all(|s| s.duration_minutes() == 60));
    assert!(slots.windows(2).all(|w| w[0].end == w[1].start));
}

#[test]
fn summer_monday_shifts_utc_one_hour_earlier_same_local_hours() {
    let schedule = new_york_mondays();
    let winter = resolve_slots(&schedule, &SlotQuery::new(january_monday(), long_ago())).unwrap();
    let summer = resolve_slots(&schedule, &SlotQuery::new(july_monday(), long_ago())).unwrap();

    assert_eq!(summer.len(), 8);
    assert_eq!(summer[0].start, utc(2026, 7, 13, 13, 0));
    assert_eq!(summer[7].start, utc(2026, 7, 13, 20, 0));

    let ny = Zone::parse("America/New_York").unwrap();
    for (w, s) in winter.iter().zip(&summer) {
        assert_eq!(w.start.hour(), s.start.hour() + 1);
        assert_eq!(from_utc(w.start, &ny).1, from_utc(s.start, &ny).1);
    }
}

#[test]
fn booking_on_the_eleven_am_slot_removes_exactly_that_slot() {
    // 11:00 EST = 16:00 UTC
    let bookings = vec![Interval::new(utc(2026, 1, 12, 16, 0), utc(2026, 1, 12, 17, 0)).unwrap()];
    let query = SlotQuery::new(january_monday(), long_ago()).with_bookings(&bookings);
    let slots = resolve_slots(&new_york_mondays(), &query).unwrap();

    assert_eq!(slots.len(), 7);
    assert!(slots.iter().all(|s| s.start != utc(2026, 1, 12, 16, 0)));
    assert!(slots.iter().any(|s| s.start == utc(2026, 1, 12, 15, 0)));
    assert!(slots.iter().any(|s| s.start == utc(2026, 1, 12, 17, 0)));
}

#[test]
fn partially_overlapping_booking_removes_both_touched_slots() {
    // 10:30–11:30 EST straddles the 10:00 and 11:00 slots
    let bookings = vec![Interval::new(utc(2026, 1, 12, 15, 30), utc(2026, 1, 12, 16, 30)).unwrap()];
    let query = SlotQuery::new(january_monday(), long_ago()).with_bookings(&bookings);
    assert_eq!(resolve_slots(&new_york_mondays(), &query).unwrap().len(), 6);
}

#[test]
fn bookings_on_other_days_are_ignored() {
    let bookings = vec![Interval::new(utc(2026, 1, 19, 16, 0), utc(2026, 1, 19, 17, 0)).unwrap()];
    let query = SlotQuery::new(january_monday(), long_ago()).with_bookings(&bookings);
    assert_eq!(resolve_slots(&new_york_mondays(), &query).unwrap().len(), 8);
}

#[test]
fn lunch_break_and_bookings_combine() {
    let mut schedule = new_york_mondays();
    schedule.set_rule(AvailabilityRule {
        day_of_week: DayOfWeek::MONDAY,
        timezone: "America/New_York".to_string(),
        start: t("09:00"),
        end: t("17:00"),
        session_minutes: 60,
        breaks: vec![BreakRange {
            start: t("12:00"),
            end: t("13:00"),
        }],
    });
    let bookings = vec![Interval::new(utc(2026, 1, 12, 14, 0), utc(2026, 1, 12, 15, 0)).unwrap()];
    let query = SlotQuery::new(january_monday(), long_ago()).with_bookings(&bookings);
    let slots = resolve_slots(&schedule, &query).unwrap();

    assert_eq!(slots.len(), 6);
    assert!(slots.iter().all(|s| s.start != utc(2026, 1, 12, 17, 0)));
}

#[test]
fn request_made_mid_day_hides_elapsed_slots() {
    // 13:20 EST: slots at 09..13 have started, 14:00 EST onward remain
    let now = utc(2026, 1, 12, 18, 20);
    let slots = resolve_slots(&new_york_mondays(), &SlotQuery::new(january_monday(), now)).unwrap();
    assert_eq!(slots.len(), 3);
    assert_eq!(slots[0].start, utc(2026, 1, 12, 19, 0));
}

#[test]
fn viewer_in_tokyo_sees_next_day_local_times() {
    let slots = resolve_slots(&new_york_mondays(), &SlotQuery::new(january_monday(), long_ago())).unwrap();
    let shown = present_slots(&slots, &Zone::parse("Asia/Tokyo").unwrap());

    assert_eq!(shown.len(), 8);
    // 14:00 UTC = 23:00 JST Monday; 15:00 UTC = 00:00 JST Tuesday
    assert_eq!(shown[0].local_start, t("23:00"));
    assert_eq!(shown[0].local_date, january_monday());
    assert_eq!(shown[1].local_start, t("00:00"));
    assert_eq!(shown[1].local_date, NaiveDate::from_ymd_opt(2026, 1, 13).unwrap());
    assert_eq!(shown[0].local_end, shown[1].local_start);
}

#[test]
fn offered_slot_can_be_claimed_once() {
    let slots = resolve_slots(&new_york_mondays(), &SlotQuery::new(january_monday(), long_ago())).unwrap();
    let chosen = Interval::try_from(slots[2]).unwrap();

    let mut committed = Vec::new();
    ensure_available(&chosen, &committed).unwrap();
    committed.push(chosen);

    assert!(ensure_available(&chosen, &committed).unwrap_err().is_retryable());

    // Fresh availability no longer offers it
    let query = SlotQuery::new(january_monday(), long_ago()).with_bookings(&committed);
    let fresh = resolve_slots(&new_york_mondays(), &query).unwrap();
    assert_eq!(fresh.len(), 7);
    assert!(!fresh.contains(&slots[2]));
}

#[test]
fn schedule_loads_from_json() {
    let json = r#"[
        {
            "day_of_week": 1,
            "timezone": "America/New_York",
            "start": "09:00",
            "end": "17:00",
            "session_minutes": 60,
            "breaks": [{ "start": "12:00", "end": "13:00" }]
        }
    ]"#;
    let schedule: AvailabilitySchedule = serde_json::from_str(json).unwrap();
    let slots = resolve_slots(&schedule, &SlotQuery::new(january_monday(), long_ago())).unwrap();
    assert_eq!(slots.len(), 7);
}

#[test]
fn schedule_json_rejects_malformed_wall_time() {
    let json = r#"[{"day_of_week":1,"timezone":"UTC","start":"9am","end":"17:00","session_minutes":60}]"#;
    let err = serde_json::from_str::<AvailabilitySchedule>(json).unwrap_err();
    assert!(err.to_string().contains("Invalid time"), "got: {err}");
}
