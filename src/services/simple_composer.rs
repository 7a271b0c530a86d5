//! Alternate strategy: fixed cadence, filled in priority order.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::models::contact::ContactRecord;
use crate::models::schedule::ScheduleEntry;
use crate::services::composition::CompositionContext;
use crate::services::contact_suggestion::suggestion_reason;
use crate::services::{roster, schedule_utils, timezone};

pub const NO_CONTACTS_NOTES: &str = "No contacts available during their business hours.";

/// Slots are laid back to back from the start instant, so no conflict
/// detection is needed.
pub fn compose(ctx: &CompositionContext<'_>) -> Vec<ScheduleEntry> {
    let window = ctx.window;
    let mut entries = Vec::new();
    let Some(anchor) = ctx.anchor_entry() else {
        debug!(target: "app::schedule::simple", "window too small for a single call");
        return entries;
    };
    entries.push(anchor);

    let sorted = roster::sort_by_priority(&ctx.eligible, ctx.now);
    let mut next_index = if sorted.is_empty() { 0 } else { 1 % sorted.len() };
    let mut cursor = schedule_utils::add_minutes(window.start, window.duration_mins);

    while entries.len() < window.target && window.fits(cursor) {
        let entry = match next_in_hours(&sorted, &mut next_index, cursor) {
            Some(contact) => {
                let label = ctx.classify(contact);
                let reason = suggestion_reason(contact, label);
                ctx.contact_entry(contact, cursor, label, Some(reason.to_string()))
            }
            None => ctx.placeholder_entry(cursor, Some(NO_CONTACTS_NOTES)),
        };
        entries.push(entry);
        cursor = schedule_utils::add_minutes(cursor, window.duration_mins);
    }

    entries
}

fn next_in_hours<'a>(
    sorted: &[&'a ContactRecord],
    next_index: &mut usize,
    slot: DateTime<Utc>,
) -> Option<&'a ContactRecord> {
    let len = sorted.len();
    let found = (0..len)
        .map(|offset| (*next_index + offset) % len)
        .find(|&idx| timezone::is_business_hours(slot, &sorted[idx].timezone))?;
    *next_index = (found + 1) % len;
    Some(sorted[found])
}
