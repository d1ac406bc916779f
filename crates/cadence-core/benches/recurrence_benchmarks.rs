use cadence_core::estimate::estimate_count;
use cadence_core::models::{EventOverride, EventStatus, Frequency, Schedule};
use cadence_core::recurrence::{count_unresolved_before, expand, index_overrides, merge};
use cadence_core::rule::RecurrenceRule;
use chrono::{DateTime, NaiveDate, TimeDelta, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::collections::HashSet;
use uuid::Uuid;

fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 9, 0, 0).unwrap()
}

fn create_test_rule(frequency: Frequency) -> RecurrenceRule {
    RecurrenceRule::new(frequency, 1, utc(2020, 1, 1), utc(2030, 12, 31)).unwrap()
}

fn create_test_schedule(rule: &RecurrenceRule) -> Schedule {
    Schedule {
        id: Uuid::now_v7(),
        task_name: "Benchmark schedule".to_string(),
        rrule: rule.to_string(),
        total_events: 0,
        start_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2030, 12, 31).unwrap(),
        frequency: rule.frequency(),
        created_at: Utc::now(),
    }
}

fn bench_rule_parsing(c: &mut Criterion) {
    let rules = [
        "FREQ=DAILY;DTSTART=20250101T090000Z;INTERVAL=1;UNTIL=20251231T235959Z",
        "freq=monthly;until=20301231T000000Z;interval=3;dtstart=20250131T090000Z",
    ];

    let mut group = c.benchmark_group("rule_parsing");
    for rule in rules.iter() {
        group.bench_with_input(BenchmarkId::new("rule", rule), rule, |b, rule| {
            b.iter(|| black_box(rule).parse::<RecurrenceRule>().unwrap())
        });
    }
    group.finish();
}

fn bench_window_expansion(c: &mut Criterion) {
    let mut group = c.benchmark_group("window_expansion");
    for frequency in [Frequency::Hourly, Frequency::Daily, Frequency::Monthly] {
        let rule = create_test_rule(frequency);
        // 90-day window far from the rule start exercises the jump to the first index
        let window_start = utc(2028, 3, 1);
        let window_end = window_start + TimeDelta::days(90);

        group.bench_with_input(BenchmarkId::new("frequency", frequency), &rule, |b, rule| {
            b.iter(|| expand(black_box(rule), window_start, window_end, true))
        });
    }
    group.finish();
}

fn bench_override_merge(c: &mut Criterion) {
    let rule = create_test_rule(Frequency::Hourly);
    let schedule = create_test_schedule(&rule);
    let window_start = utc(2025, 1, 1);
    let occurrences = expand(&rule, window_start, window_start + TimeDelta::days(90), true);
    let now = window_start + TimeDelta::days(45);

    let mut group = c.benchmark_group("override_merge");
    for override_count in [0usize, 100, 1000] {
        let overrides: Vec<EventOverride> = (0..override_count)
            .map(|_| {
                let at = occurrences[fastrand::usize(..occurrences.len())];
                EventOverride {
                    id: Uuid::now_v7(),
                    schedule_id: schedule.id,
                    event_datetime: at,
                    status: EventStatus::Completed,
                    created_at: now,
                    updated_at: now,
                }
            })
            .collect();
        let index = index_overrides(overrides);

        group.bench_with_input(BenchmarkId::new("overrides", override_count), &index, |b, index| {
            b.iter(|| merge(black_box(&occurrences), index, &schedule, now))
        });
    }
    group.finish();
}

fn bench_overdue_count(c: &mut Criterion) {
    let rule = create_test_rule(Frequency::Daily);
    let overridden = HashSet::new();

    c.bench_function("count_unresolved_before_daily_5y", |b| {
        b.iter(|| count_unresolved_before(black_box(&rule), &overridden, utc(2025, 1, 1)))
    });
}

fn bench_estimate(c: &mut Criterion) {
    c.bench_function("estimate_count_monthly", |b| {
        b.iter(|| estimate_count(black_box("2025-01-01"), black_box("2035-06-30"), "MONTHLY", 2).unwrap())
    });
}

criterion_group!(
    benches,
    bench_rule_parsing,
    bench_window_expansion,
    bench_override_merge,
    bench_overdue_count,
    bench_estimate
);
criterion_main!(benches);
