//! Occurrence expansion and override merging.
//!
//! Everything here is a pure function of its arguments: no I/O, no logging,
//! no shared state. Callers bound the work by validating the window first
//! (see [`crate::window::QueryWindow`]).

use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};

use crate::models::{EventOverride, EventStatus, ResolvedEvent, Schedule};
use crate::rule::{RecurrenceRule, Slot};

/// Expands `rule` into the ordered occurrences that fall inside
/// `[window_start, window_end]`.
///
/// With `inclusive` set, occurrences exactly on either window bound are kept;
/// otherwise both bounds are excluded. `rule.until()` is always inclusive.
/// The output is strictly increasing and identical for identical inputs.
pub fn expand(
    rule: &RecurrenceRule,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    inclusive: bool,
) -> Vec<DateTime<Utc>> {
    let mut occurrences = Vec::new();
    if window_end < window_start || rule.start() > window_end || rule.until() < window_start {
        return occurrences;
    }

    let limit = window_end.min(rule.until());
    let Some(mut k) = rule.first_index_at_or_after(window_start) else {
        return occurrences;
    };

    while let Some(slot) = rule.nth(k) {
        if slot.position() > limit {
            break;
        }
        k += 1;
        let Slot::Occurs(candidate) = slot else {
            continue;
        };
        let after_start = if inclusive {
            candidate >= window_start
        } else {
            candidate > window_start
        };
        let before_end = inclusive || candidate < window_end;
        if after_start && before_end {
            occurrences.push(candidate);
        }
    }

    occurrences
}

/// Default status of an occurrence that has no stored override.
#[inline]
pub fn default_status(occurrence: DateTime<Utc>, now: DateTime<Utc>) -> EventStatus {
    if occurrence < now {
        EventStatus::Overdue
    } else {
        EventStatus::Pending
    }
}

/// Builds the exact-instant lookup used by [`merge`].
pub fn index_overrides(overrides: Vec<EventOverride>) -> HashMap<DateTime<Utc>, EventOverride> {
    let mut map = HashMap::with_capacity(overrides.len());
    for ov in overrides {
        map.insert(ov.event_datetime, ov);
    }
    map
}

/// Resolves each occurrence against the stored overrides, in expansion order.
///
/// An override stored for the exact instant wins and is emitted verbatim with
/// the schedule's task name attached. Any other occurrence gets
/// [`default_status`].
pub fn merge(
    occurrences: &[DateTime<Utc>],
    overrides: &HashMap<DateTime<Utc>, EventOverride>,
    schedule: &Schedule,
    now: DateTime<Utc>,
) -> Vec<ResolvedEvent> {
    occurrences
        .iter()
        .map(|&occurrence| match overrides.get(&occurrence) {
            Some(ov) => ResolvedEvent {
                id: Some(ov.id),
                schedule_id: ov.schedule_id,
                event_datetime: ov.event_datetime,
                status: ov.status,
                task_name: schedule.task_name.clone(),
                created_at: ov.created_at,
            },
            None => ResolvedEvent {
                id: None,
                schedule_id: schedule.id,
                event_datetime: occurrence,
                status: default_status(occurrence, now),
                task_name: schedule.task_name.clone(),
                created_at: schedule.created_at,
            },
        })
        .collect()
}

/// Counts the occurrences of `rule` that are strictly before `now` and have
/// no stored override, i.e. the ones [`merge`] would report as overdue.
///
/// This expands the rule from its start up to `now`.
pub fn count_unresolved_before(
    rule: &RecurrenceRule,
    overridden: &HashSet<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> usize {
    if rule.start() >= now {
        return 0;
    }
    expand(rule, rule.start(), now, true)
        .into_iter()
        .filter(|occurrence| *occurrence < now && !overridden.contains(occurrence))
        .count()
}
