use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use tracing::debug;

use crate::models::contact::{ContactRecord, ContactStatus};
use crate::models::schedule::ScheduleParams;
use crate::services::priority::classify_contact;
use crate::services::timezone;

pub const DEFAULT_STATUS_FILTERS: [ContactStatus; 3] = [
    ContactStatus::None,
    ContactStatus::Traction,
    ContactStatus::Client,
];

/// Applies status, country, timezone and follow-up deferral filters.
/// Roster order is preserved.
pub fn filter_roster<'a>(
    contacts: &'a [ContactRecord],
    params: &ScheduleParams,
    today: NaiveDate,
) -> Vec<&'a ContactRecord> {
    let allowed: HashSet<ContactStatus> = if params.status_filters.is_empty() {
        DEFAULT_STATUS_FILTERS.into_iter().collect()
    } else {
        params.status_filters.iter().copied().collect()
    };
    let excluded: HashSet<String> = params
        .excluded_countries
        .iter()
        .map(|country| normalize(country))
        .collect();
    let included: HashSet<&str> = params
        .included_timezones
        .iter()
        .map(|tz| tz.trim())
        .collect();

    let eligible: Vec<&ContactRecord> = contacts
        .iter()
        .filter(|contact| allowed.contains(&contact.status()))
        .filter(|contact| {
            contact
                .country
                .as_deref()
                .map_or(true, |country| !excluded.contains(&normalize(country)))
        })
        .filter(|contact| included.is_empty() || included.contains(contact.timezone.trim()))
        .filter(|contact| contact.follow_up_date.map_or(true, |date| date <= today))
        .collect();

    // Unknown ids are scheduled as UTC.
    let unknown_zones = eligible
        .iter()
        .filter(|contact| !timezone::is_known(&contact.timezone))
        .count();
    debug!(
        target: "app::schedule",
        roster = contacts.len(),
        eligible = eligible.len(),
        unknown_zones,
        "roster filtered"
    );
    eligible
}

/// Stable sort by priority label, then by explicit rank (unranked last).
pub fn sort_by_priority<'a>(
    contacts: &[&'a ContactRecord],
    now: DateTime<Utc>,
) -> Vec<&'a ContactRecord> {
    let mut sorted: Vec<_> = contacts
        .iter()
        .map(|contact| (classify_contact(contact, now).rank(), *contact))
        .collect();
    sorted.sort_by_key(|(rank, contact)| {
        (*rank, contact.priority_rank.is_none(), contact.priority_rank)
    });
    sorted.into_iter().map(|(_, contact)| contact).collect()
}

pub fn group_by_timezone<'a>(
    contacts: &[&'a ContactRecord],
) -> BTreeMap<String, Vec<&'a ContactRecord>> {
    let mut groups: BTreeMap<String, Vec<&'a ContactRecord>> = BTreeMap::new();
    for contact in contacts {
        groups
            .entry(contact.timezone.trim().to_string())
            .or_default()
            .push(contact);
    }
    groups
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}
