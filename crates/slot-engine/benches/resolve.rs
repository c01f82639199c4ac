use std::hint::black_box;

use chrono::{NaiveDate, TimeZone, Utc};
use criterion::{criterion_group, criterion_main, Criterion};
use slot_engine::availability::{
    resolve_range, AvailabilityRule, AvailabilitySchedule, BreakRange, RangeQuery,
    ResolverOptions,
};
use slot_engine::interval::Interval;
use slot_engine::zone::{DayOfWeek, WallTime};

fn weekday_schedule() -> AvailabilitySchedule {
    (1..=5u8)
        .map(|d| AvailabilityRule {
            day_of_week: DayOfWeek::new(d).unwrap(),
            timezone: "Europe/Paris".to_string(),
            start: WallTime::parse("08:00").unwrap(),
            end: WallTime::parse("18:00").unwrap(),
            session_minutes: 15,
            breaks: vec![BreakRange {
                start: WallTime::parse("12:00").unwrap(),
                end: WallTime::parse("13:30").unwrap(),
            }],
        })
        .collect()
}

fn bookings() -> Vec<Interval> {
    (0..100)
        .map(|i| {
            let start = Utc.with_ymd_and_hms(2026, 3, 23, 7, 0, 0).unwrap()
                + chrono::Duration::minutes(i * 47);
            Interval::new(start, start + chrono::Duration::minutes(30)).unwrap()
        })
        .collect()
}

fn bench_resolve_week(c: &mut Criterion) {
    let schedule = weekday_schedule();
    let bookings = bookings();
    let now = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
    let query = RangeQuery::new(now).with_bookings(&bookings);
    // Week spanning the EU spring-forward Sunday
    let from = NaiveDate::from_ymd_opt(2026, 3, 23).unwrap();
    let to = NaiveDate::from_ymd_opt(2026, 3, 29).unwrap();
    let options = ResolverOptions::default();

    c.bench_function("resolve_week_15min_100_bookings", |b| {
        b.iter(|| {
            resolve_range(
                black_box(&schedule),
                from,
                to,
                black_box(&query),
                &options,
            )
            .unwrap()
        })
    });
}

criterion_group!(benches, bench_resolve_week);
criterion_main!(benches);
