use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::models::contact::ContactRecord;
use crate::models::schedule::PriorityLabel;
use crate::services::priority::classify_contact;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactSuggestion<'a> {
    pub contact: &'a ContactRecord,
    pub label: PriorityLabel,
    pub reason: &'static str,
}

/// Picks up to `count` contacts classified as `label`, best candidates first.
pub fn suggest_contacts<'a>(
    contacts: &[&'a ContactRecord],
    count: usize,
    label: PriorityLabel,
    now: DateTime<Utc>,
) -> Vec<ContactSuggestion<'a>> {
    if count == 0 {
        return Vec::new();
    }

    let mut matching: Vec<&'a ContactRecord> = contacts
        .iter()
        .copied()
        .filter(|contact| classify_contact(contact, now) == label)
        .collect();

    match label {
        PriorityLabel::Warm | PriorityLabel::FollowUp => {
            matching.sort_by(|a, b| compare_recency(a.last_touch(), b.last_touch()));
        }
        PriorityLabel::HighValue => {
            matching.sort_by_key(|contact| std::cmp::Reverse(value_score(contact)));
        }
        PriorityLabel::Cold => {}
    }

    matching
        .into_iter()
        .take(count)
        .map(|contact| ContactSuggestion {
            contact,
            label,
            reason: suggestion_reason(contact, label),
        })
        .collect()
}

pub fn suggestion_reason(contact: &ContactRecord, label: PriorityLabel) -> &'static str {
    match label {
        PriorityLabel::Warm => "Recent activity",
        PriorityLabel::FollowUp => "Overdue follow-up",
        PriorityLabel::HighValue if contact.is_client => "Existing client",
        PriorityLabel::HighValue => "Strategic target",
        PriorityLabel::Cold => "New prospect",
    }
}

fn value_score(contact: &ContactRecord) -> i64 {
    let deals = contact
        .activity
        .as_ref()
        .map(|activity| activity.total_deals)
        .unwrap_or(0);
    10 * i64::from(contact.is_client) + deals
}

// Most recent first, contacts without any activity last.
fn compare_recency(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
