use cadence_core::models::Frequency;
use cadence_core::recurrence::expand;
use cadence_core::rule::{format_instant, RecurrenceRule};
use chrono::{DateTime, Datelike, TimeDelta, TimeZone, Utc};
use proptest::prelude::*;

fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
}

fn base() -> DateTime<Utc> {
    utc(2020, 1, 1, 0, 0, 0)
}

fn frequency_strategy() -> impl Strategy<Value = Frequency> {
    prop_oneof![
        Just(Frequency::Hourly),
        Just(Frequency::Daily),
        Just(Frequency::Weekly),
        Just(Frequency::Monthly),
        Just(Frequency::Yearly),
    ]
}

/// Longest `until - start` generated per frequency, keeping expansions small
fn max_span_secs(frequency: Frequency) -> i64 {
    match frequency {
        Frequency::Hourly => 30 * 86_400,
        Frequency::Daily | Frequency::Weekly => 2 * 365 * 86_400,
        Frequency::Monthly | Frequency::Yearly => 20 * 365 * 86_400,
    }
}

fn rule_strategy(frequencies: BoxedStrategy<Frequency>) -> impl Strategy<Value = RecurrenceRule> {
    (frequencies, 1u32..=12, 0i64..5 * 365 * 86_400, 0.0f64..=1.0).prop_map(
        |(frequency, interval, start_offset, span_fraction)| {
            let start = base() + TimeDelta::seconds(start_offset);
            let span = (max_span_secs(frequency) as f64 * span_fraction) as i64;
            RecurrenceRule::new(frequency, interval, start, start + TimeDelta::seconds(span)).unwrap()
        },
    )
}

/// Window `[start + a, start + a + len]`, possibly reaching outside the rule
fn window_for(rule: &RecurrenceRule, a: i64, len: i64) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = rule.start() + TimeDelta::seconds(a);
    (start, start + TimeDelta::seconds(len))
}

proptest! {
    #[test]
    fn prop_display_round_trips(rule in rule_strategy(frequency_strategy().boxed())) {
        let parsed: RecurrenceRule = rule.to_string().parse().unwrap();
        prop_assert_eq!(parsed, rule);
    }

    #[test]
    fn prop_expansion_is_ordered_bounded_and_exact(
        rule in rule_strategy(frequency_strategy().boxed()),
        a in -30i64 * 86_400..400 * 86_400,
        len in 0i64..90 * 86_400,
        inclusive in any::<bool>(),
    ) {
        let (window_start, window_end) = window_for(&rule, a, len);
        let occurrences = expand(&rule, window_start, window_end, inclusive);

        for pair in occurrences.windows(2) {
            prop_assert!(pair[0] < pair[1]);
        }
        for occurrence in &occurrences {
            prop_assert!(*occurrence >= window_start && *occurrence <= window_end);
            prop_assert!(*occurrence >= rule.start() && *occurrence <= rule.until());
            prop_assert!(rule.contains(*occurrence));
            if !inclusive {
                prop_assert!(*occurrence != window_start && *occurrence != window_end);
            }
        }

        prop_assert_eq!(&occurrences, &expand(&rule, window_start, window_end, inclusive));
    }

    #[test]
    fn prop_split_windows_cover_the_whole(
        rule in rule_strategy(frequency_strategy().boxed()),
        a in 0i64..200 * 86_400,
        first in 0i64..45 * 86_400,
        second in 0i64..45 * 86_400,
    ) {
        let (window_start, middle) = window_for(&rule, a, first);
        let window_end = middle + TimeDelta::seconds(second);

        let mut joined = expand(&rule, window_start, middle, true);
        joined.extend(
            expand(&rule, middle, window_end, true)
                .into_iter()
                .filter(|occurrence| *occurrence > middle),
        );
        prop_assert_eq!(joined, expand(&rule, window_start, window_end, true));
    }

    #[test]
    fn prop_window_outside_rule_is_empty(
        rule in rule_strategy(frequency_strategy().boxed()),
        gap in 1i64..365 * 86_400,
        len in 0i64..90 * 86_400,
    ) {
        let before_end = rule.start() - TimeDelta::seconds(gap);
        prop_assert!(expand(&rule, before_end - TimeDelta::seconds(len), before_end, true).is_empty());

        let after_start = rule.until() + TimeDelta::seconds(gap);
        prop_assert!(expand(&rule, after_start, after_start + TimeDelta::seconds(len), true).is_empty());
    }

    #[test]
    fn prop_expansion_matches_reference_rrule(
        rule in rule_strategy(frequency_strategy().boxed()),
    ) {
        let text = format!(
            "DTSTART:{}\nRRULE:FREQ={};INTERVAL={};UNTIL={}",
            format_instant(rule.start()),
            rule.frequency(),
            rule.interval(),
            format_instant(rule.until()),
        );
        let rrule_set: rrule::RRuleSet = text.parse().unwrap();
        let expected: Vec<DateTime<Utc>> = rrule_set
            .all(u16::MAX)
            .dates
            .into_iter()
            .map(|dt| dt.with_timezone(&Utc))
            .collect();

        prop_assert_eq!(expand(&rule, rule.start(), rule.until(), true), expected);
    }

    #[test]
    fn prop_monthly_occurrences_keep_the_start_day(
        day in 1u32..=31,
        interval in 1u32..=5,
    ) {
        let start = Utc.with_ymd_and_hms(2024, 1, day, 9, 0, 0).unwrap();
        let rule = RecurrenceRule::new(Frequency::Monthly, interval, start, utc(2026, 12, 31, 23, 59, 59)).unwrap();
        let occurrences = expand(&rule, rule.start(), rule.until(), true);

        for occurrence in &occurrences {
            prop_assert_eq!(occurrence.day(), day);
            prop_assert_eq!(occurrence.time(), start.time());
        }

        // One occurrence per stepped month that has the start day
        let expected = (0..36)
            .step_by(interval as usize)
            .filter(|offset| {
                let (year, month) = (2024 + offset / 12, 1 + (offset % 12) as u32);
                day <= last_day_of_month(year, month)
            })
            .count();
        prop_assert_eq!(occurrences.len(), expected);
    }
}

fn last_day_of_month(year: i32, month: u32) -> u32 {
    (28..=31)
        .rev()
        .find(|day| chrono::NaiveDate::from_ymd_opt(year, month, *day).is_some())
        .unwrap()
}

#[test]
fn test_daily_rule_with_inclusive_window() {
    let rule: RecurrenceRule = "FREQ=DAILY;DTSTART=20250101T090000Z;INTERVAL=1;UNTIL=20250105T090000Z"
        .parse()
        .unwrap();

    let occurrences = expand(&rule, utc(2025, 1, 1, 0, 0, 0), utc(2025, 1, 5, 23, 59, 59), true);

    let expected: Vec<DateTime<Utc>> = (1..=5).map(|day| utc(2025, 1, day, 9, 0, 0)).collect();
    assert_eq!(occurrences, expected);
}

#[test]
fn test_rule_starting_after_window_expands_to_nothing() {
    let rule: RecurrenceRule = "FREQ=WEEKLY;DTSTART=20260101T090000Z;INTERVAL=1;UNTIL=20261231T235959Z"
        .parse()
        .unwrap();
    assert!(expand(&rule, utc(2025, 1, 1, 0, 0, 0), utc(2025, 3, 31, 0, 0, 0), true).is_empty());
}

#[test]
fn test_monthly_from_the_31st_skips_short_months() {
    let rule: RecurrenceRule = "FREQ=MONTHLY;DTSTART=20250131T090000Z;INTERVAL=1;UNTIL=20250601T000000Z"
        .parse()
        .unwrap();

    let occurrences = expand(&rule, utc(2025, 1, 1, 0, 0, 0), utc(2025, 6, 1, 0, 0, 0), true);
    assert_eq!(
        occurrences,
        vec![utc(2025, 1, 31, 9, 0, 0), utc(2025, 3, 31, 9, 0, 0), utc(2025, 5, 31, 9, 0, 0)]
    );
}
