use chrono::{DateTime, Duration, Utc};

use crate::models::contact::{ContactActivity, ContactRecord};
use crate::models::schedule::PriorityLabel;

pub const WARM_WINDOW_DAYS: i64 = 7;
pub const STALE_AFTER_DAYS: i64 = 30;

struct RuleContext<'a> {
    contact: &'a ContactRecord,
    activity: &'a ContactActivity,
    now: DateTime<Utc>,
}

type PriorityRule = fn(&RuleContext<'_>) -> bool;

/// Evaluated top to bottom, first match wins. Anything unmatched is `Cold`.
const PRIORITY_RULES: [(PriorityLabel, PriorityRule); 3] = [
    (PriorityLabel::Warm, is_warm),
    (PriorityLabel::HighValue, is_high_value),
    (PriorityLabel::FollowUp, needs_follow_up),
];

/// Classifies a contact relative to the supplied reference instant.
///
/// Contacts without activity aggregates are bare roster entries and always
/// classify as `Cold`.
pub fn classify_contact(contact: &ContactRecord, now: DateTime<Utc>) -> PriorityLabel {
    let Some(activity) = contact.activity.as_ref() else {
        return PriorityLabel::Cold;
    };

    let context = RuleContext {
        contact,
        activity,
        now,
    };

    PRIORITY_RULES
        .iter()
        .find(|(_, rule)| rule(&context))
        .map(|(label, _)| *label)
        .unwrap_or(PriorityLabel::Cold)
}

fn is_warm(ctx: &RuleContext<'_>) -> bool {
    ctx.activity
        .last_touch()
        .is_some_and(|touched| ctx.now - touched <= Duration::days(WARM_WINDOW_DAYS))
}

fn is_high_value(ctx: &RuleContext<'_>) -> bool {
    ctx.activity.total_deals > 0 || ctx.contact.is_client
}

fn needs_follow_up(ctx: &RuleContext<'_>) -> bool {
    ctx.activity.is_overdue
        || ctx.activity.pending_tasks > 0
        || ctx
            .activity
            .last_touch()
            .is_some_and(|touched| ctx.now - touched >= Duration::days(STALE_AFTER_DAYS))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(2025, 6, 16)
            .expect("valid date")
            .and_hms_opt(10, 0, 0)
            .expect("valid time")
            .and_utc()
    }

    fn contact(activity: Option<ContactActivity>) -> ContactRecord {
        ContactRecord {
            id: "c-1".into(),
            name: "Ada".into(),
            timezone: "GMT".into(),
            activity,
            ..Default::default()
        }
    }

    #[test]
    fn recent_call_is_warm() {
        let c = contact(Some(ContactActivity {
            last_call_date: Some(now() - Duration::days(2)),
            total_deals: 4,
            ..Default::default()
        }));
        assert_eq!(classify_contact(&c, now()), PriorityLabel::Warm);
    }

    #[test]
    fn recent_email_counts_as_most_recent_touch() {
        let c = contact(Some(ContactActivity {
            last_call_date: Some(now() - Duration::days(60)),
            last_email_date: Some(now() - Duration::days(7)),
            ..Default::default()
        }));
        assert_eq!(classify_contact(&c, now()), PriorityLabel::Warm);
    }

    #[test]
    fn deals_are_checked_before_staleness() {
        let c = contact(Some(ContactActivity {
            last_call_date: Some(now() - Duration::days(40)),
            total_deals: 3,
            ..Default::default()
        }));
        assert_eq!(classify_contact(&c, now()), PriorityLabel::HighValue);
    }

    #[test]
    fn client_flag_alone_is_high_value() {
        let mut c = contact(Some(ContactActivity::default()));
        c.is_client = true;
        assert_eq!(classify_contact(&c, now()), PriorityLabel::HighValue);
    }

    #[test]
    fn overdue_without_deals_needs_follow_up() {
        let c = contact(Some(ContactActivity {
            last_call_date: Some(now() - Duration::days(10)),
            is_overdue: true,
            ..Default::default()
        }));
        assert_eq!(classify_contact(&c, now()), PriorityLabel::FollowUp);
    }

    #[test]
    fn stale_or_pending_contacts_need_follow_up() {
        let stale = contact(Some(ContactActivity {
            last_email_date: Some(now() - Duration::days(30)),
            ..Default::default()
        }));
        assert_eq!(classify_contact(&stale, now()), PriorityLabel::FollowUp);

        let pending = contact(Some(ContactActivity {
            pending_tasks: 1,
            ..Default::default()
        }));
        assert_eq!(classify_contact(&pending, now()), PriorityLabel::FollowUp);
    }

    #[test]
    fn middling_activity_and_bare_entries_are_cold() {
        let lukewarm = contact(Some(ContactActivity {
            last_call_date: Some(now() - Duration::days(12)),
            ..Default::default()
        }));
        assert_eq!(classify_contact(&lukewarm, now()), PriorityLabel::Cold);

        let mut bare = contact(None);
        bare.is_client = true;
        assert_eq!(classify_contact(&bare, now()), PriorityLabel::Cold);
    }

    #[test]
    fn classification_is_deterministic_for_a_fixed_now() {
        let c = contact(Some(ContactActivity {
            last_call_date: Some(now() - Duration::days(31)),
            ..Default::default()
        }));
        let first = classify_contact(&c, now());
        for _ in 0..5 {
            assert_eq!(classify_contact(&c, now()), first);
        }
    }
}
