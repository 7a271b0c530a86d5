//! Primary strategy: timezone-aware, priority-weighted slot packing.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::models::contact::ContactRecord;
use crate::models::schedule::{PriorityLabel, ScheduleEntry};
use crate::services::composition::CompositionContext;
use crate::services::contact_suggestion::{suggest_contacts, suggestion_reason};
use crate::services::slot_allocator::{self, SlotRequest};
use crate::services::{roster, schedule_utils, timezone};

pub const DEFAULT_TASK_NOTES: &str = "Scheduled call back";

pub fn compose(ctx: &CompositionContext<'_>) -> Vec<ScheduleEntry> {
    let mut entries = Vec::new();
    if ctx.window.is_empty() {
        debug!(target: "app::schedule::weighted", "window too small for a single call");
        return entries;
    }

    let mut used: HashSet<String> = HashSet::new();

    if let Some(anchor) = ctx.anchor_entry() {
        if let Some(id) = &anchor.contact_id {
            used.insert(id.clone());
        }
        entries.push(anchor);
    }

    merge_call_back_tasks(ctx, &mut entries, &mut used);

    let groups = ordered_timezone_groups(ctx);
    allocate_weighted(ctx, &groups, &mut entries, &mut used);
    backfill(ctx, &mut entries, &used);

    entries
}

/// Buckets the eligible roster by timezone, ordered so that zones open now
/// come first and, among those, the zone closing soonest leads.
pub fn ordered_timezone_groups<'a>(
    ctx: &CompositionContext<'a>,
) -> Vec<(String, Vec<&'a ContactRecord>)> {
    let start = ctx.window.start;
    let fill_day = ctx.params.fill_rest_of_day;

    let mut groups: Vec<(String, Vec<&'a ContactRecord>)> =
        roster::group_by_timezone(&ctx.eligible)
            .into_iter()
            .map(|(tz, members)| {
                let members = if fill_day {
                    members
                } else {
                    members
                        .into_iter()
                        .filter(|contact| timezone::is_business_hours(start, &contact.timezone))
                        .collect()
                };
                (tz, members)
            })
            .filter(|(_, members)| !members.is_empty())
            .collect();

    groups.sort_by_key(|(tz, _)| {
        (
            !timezone::is_business_hours(start, tz),
            timezone::end_of_business_utc(tz, timezone::local_date(start, tz)),
        )
    });

    debug!(
        target: "app::schedule::weighted",
        zones = ?groups.iter().map(|(tz, m)| (tz.as_str(), m.len())).collect::<Vec<_>>(),
        "timezone groups ordered"
    );
    groups
}

/// Places every open call-back task due inside the window at its own due
/// time. Tasks are fixed commitments and are not moved by the allocator; a
/// task overlapping an already placed entry is skipped.
pub fn merge_call_back_tasks(
    ctx: &CompositionContext<'_>,
    entries: &mut Vec<ScheduleEntry>,
    used: &mut HashSet<String>,
) {
    let window = ctx.window;
    let mut tasks: Vec<_> = ctx
        .tasks
        .iter()
        .filter(|task| task.is_pending_call_back(window.start, window.deadline))
        .collect();
    tasks.sort_by_key(|task| task.due_date);

    for task in tasks {
        if !window.fits(task.due_date) {
            debug!(
                target: "app::schedule::tasks",
                task_id = %task.id,
                "call back ends after deadline"
            );
            continue;
        }
        if slot_allocator::has_conflict(task.due_date, window.duration_mins, entries) {
            debug!(
                target: "app::schedule::tasks",
                task_id = %task.id,
                "call back overlaps a placed call"
            );
            continue;
        }

        let contact = task
            .contact_id
            .as_deref()
            .and_then(|id| ctx.roster.iter().find(|contact| contact.id == id));
        let notes = task
            .notes
            .clone()
            .filter(|notes| !notes.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TASK_NOTES.to_string());

        let entry = match contact {
            Some(contact) => {
                used.insert(contact.id.clone());
                ctx.contact_entry(contact, task.due_date, PriorityLabel::FollowUp, Some(notes))
            }
            None => {
                let mut entry = ctx.placeholder_entry(task.due_date, Some(&notes));
                entry.priority_label = PriorityLabel::FollowUp;
                entry
            }
        };
        entries.push(entry);
    }
}

/// Spreads the target across timezone groups and, inside each group, across
/// priority labels by configured weight. Candidates with no conflict-free
/// in-hours slot before the deadline are dropped, not retried.
pub fn allocate_weighted(
    ctx: &CompositionContext<'_>,
    groups: &[(String, Vec<&ContactRecord>)],
    entries: &mut Vec<ScheduleEntry>,
    used: &mut HashSet<String>,
) {
    let window = ctx.window;
    if groups.is_empty() || entries.len() >= window.target {
        return;
    }

    let per_zone = window.target.div_ceil(groups.len());
    let weights = ctx.settings.priority_weights;

    for (tz, members) in groups {
        let available: Vec<&ContactRecord> = members
            .iter()
            .copied()
            .filter(|contact| !used.contains(&contact.id))
            .collect();
        let mut placed_in_zone = 0;

        for label in PriorityLabel::ORDERED {
            let quota = weights.share(label, per_zone);
            for suggestion in suggest_contacts(&available, quota, label, ctx.now) {
                if entries.len() >= window.target {
                    return;
                }
                if placed_in_zone >= per_zone {
                    break;
                }
                let contact = suggestion.contact;
                if used.contains(&contact.id) {
                    continue;
                }

                let request = SlotRequest {
                    timezone: tz,
                    duration_mins: window.duration_mins,
                    deadline: window.deadline,
                    gap_mins: window.gap_mins,
                    max_attempts: ctx.settings.max_slot_attempts,
                };
                let Some(slot) =
                    slot_allocator::find_next_available_slot(window.start, request, entries)
                else {
                    debug!(
                        target: "app::schedule::weighted",
                        contact_id = %contact.id,
                        label = %label,
                        "no open slot before deadline, dropping candidate"
                    );
                    continue;
                };
                if !ctx.in_contact_hours(contact, slot) {
                    continue;
                }

                entries.push(ctx.contact_entry(
                    contact,
                    slot,
                    label,
                    Some(suggestion.reason.to_string()),
                ));
                used.insert(contact.id.clone());
                placed_in_zone += 1;
            }
        }
    }
}

/// Tops the schedule up to the target by cycling the contacts not yet
/// placed, one call slot at a time. In fill-rest-of-day mode a slot with no
/// contact in business hours becomes an unassigned placeholder; in quota mode
/// it is skipped and a run of consecutive misses ends the pass.
pub fn backfill(
    ctx: &CompositionContext<'_>,
    entries: &mut Vec<ScheduleEntry>,
    used: &HashSet<String>,
) {
    let window = ctx.window;
    let fill_day = ctx.params.fill_rest_of_day;
    if entries.len() >= window.target {
        return;
    }

    let remaining: Vec<&ContactRecord> = ctx
        .eligible
        .iter()
        .copied()
        .filter(|contact| !used.contains(&contact.id))
        .collect();
    let pool = roster::sort_by_priority(&remaining, ctx.now);
    if pool.is_empty() && !fill_day {
        return;
    }

    // Placed entries never overlap, so once sorted each conflict probe is a binary search.
    entries.sort_by_key(|entry| entry.scheduled_time);

    let mut cursor = window.start;
    let mut next_index = 0;
    let mut misses = 0;

    while entries.len() < window.target && window.fits(cursor) {
        if let Some(blocking) =
            slot_allocator::first_conflict_sorted(cursor, window.duration_mins, entries)
        {
            cursor = schedule_utils::add_minutes(blocking.end_time(), window.gap_mins);
            continue;
        }

        match next_in_hours(ctx, &pool, &mut next_index, cursor) {
            Some(contact) => {
                let label = ctx.classify(contact);
                let reason = suggestion_reason(contact, label);
                let entry = ctx.contact_entry(contact, cursor, label, Some(reason.to_string()));
                slot_allocator::insert_sorted(entries, entry);
                misses = 0;
            }
            None if fill_day => {
                slot_allocator::insert_sorted(entries, unassigned_slot(ctx, cursor));
            }
            None => {
                misses += 1;
                if misses >= ctx.settings.max_consecutive_misses {
                    debug!(
                        target: "app::schedule::weighted",
                        misses,
                        cursor = %cursor,
                        "backfill stopped after consecutive misses"
                    );
                    break;
                }
            }
        }

        cursor = schedule_utils::add_minutes(cursor, window.duration_mins + window.gap_mins);
    }
}

/// Fill-rest-of-day policy: unmatched capacity is still emitted so the day
/// is fully accounted for.
pub fn unassigned_slot(ctx: &CompositionContext<'_>, slot: DateTime<Utc>) -> ScheduleEntry {
    ctx.placeholder_entry(slot, None)
}

// Round-robin over the pool starting at `next_index`, bounded to one pass.
fn next_in_hours<'a>(
    ctx: &CompositionContext<'_>,
    pool: &[&'a ContactRecord],
    next_index: &mut usize,
    slot: DateTime<Utc>,
) -> Option<&'a ContactRecord> {
    let len = pool.len();
    (0..len)
        .map(|offset| (*next_index + offset) % len)
        .find(|&idx| ctx.in_contact_hours(pool[idx], slot))
        .map(|idx| {
            *next_index = (idx + 1) % len;
            pool[idx]
        })
}
