//! Resolving time: whole calendar days an issue has been outstanding.

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

use crate::entity::{Issue, IssueState};

/// Days between the report date and today, counted on the calendar of
/// `now`'s time zone (time of day is ignored).
///
/// Returns `None` when the state is Resolved or Completed. A report date
/// later than `now` gives a negative count; it is not rejected.
pub fn resolving_days<Tz: TimeZone>(
    reported: &DateTime<Utc>,
    state: &IssueState,
    now: &DateTime<Tz>,
) -> Option<i64> {
    if state.is_terminal() {
        return None;
    }

    let reported_day = reported.with_timezone(&now.timezone()).date_naive();
    let today = now.date_naive();
    Some(today.signed_duration_since(reported_day).num_days())
}

/// An issue paired with its resolving time, as listed on dashboards.
#[derive(Debug, Clone, Serialize)]
pub struct IssueWithResolvingTime {
    #[serde(flatten)]
    pub issue: Issue,
    pub resolving_time: Option<i64>,
}

impl IssueWithResolvingTime {
    pub fn new<Tz: TimeZone>(issue: Issue, now: &DateTime<Tz>) -> Self {
        let resolving_time = resolving_days(&issue.date_reported, &issue.state, now);
        Self {
            issue,
            resolving_time,
        }
    }
}

pub fn with_resolving_times<Tz: TimeZone>(
    issues: Vec<Issue>,
    now: &DateTime<Tz>,
) -> Vec<IssueWithResolvingTime> {
    issues
        .into_iter()
        .map(|issue| IssueWithResolvingTime::new(issue, now))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset};

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_open_issue_counts_days() {
        let now = at("2025-03-20T12:00:00Z");
        let reported = now - Duration::days(10);
        assert_eq!(resolving_days(&reported, &IssueState::New, &now), Some(10));
        assert_eq!(
            resolving_days(&reported, &IssueState::InProgress, &now),
            Some(10)
        );
    }

    #[test]
    fn test_terminal_states_have_no_resolving_time() {
        let now = at("2025-03-20T12:00:00Z");
        let reported = now - Duration::days(5);
        for label in ["Resolved", "resolved", "COMPLETED", "completed"] {
            let state = IssueState::from(label);
            assert_eq!(resolving_days(&reported, &state, &now), None, "{}", label);
        }
    }

    #[test]
    fn test_free_form_state_still_counts() {
        let now = at("2025-03-20T12:00:00Z");
        let reported = now - Duration::days(3);
        let state = IssueState::from("Blocked");
        assert_eq!(resolving_days(&reported, &state, &now), Some(3));
    }

    #[test]
    fn test_calendar_days_not_elapsed_hours() {
        // Two minutes apart but on different calendar days.
        let reported = at("2025-03-19T23:59:00Z");
        let now = at("2025-03-20T00:01:00Z");
        assert_eq!(resolving_days(&reported, &IssueState::New, &now), Some(1));

        // Almost a full day apart on the same calendar day.
        let reported = at("2025-03-20T00:01:00Z");
        let now = at("2025-03-20T23:59:00Z");
        assert_eq!(resolving_days(&reported, &IssueState::New, &now), Some(0));
    }

    #[test]
    fn test_calendar_follows_callers_time_zone() {
        // 22:00 UTC on the 19th is already the 20th at UTC+5.
        let reported = at("2025-03-19T22:00:00Z");
        let zone = FixedOffset::east_opt(5 * 3600).unwrap();
        let now = at("2025-03-21T10:00:00Z").with_timezone(&zone);
        assert_eq!(resolving_days(&reported, &IssueState::New, &now), Some(1));

        let now_utc = at("2025-03-21T10:00:00Z");
        assert_eq!(
            resolving_days(&reported, &IssueState::New, &now_utc),
            Some(2)
        );
    }

    #[test]
    fn test_future_report_date_is_negative() {
        let now = at("2025-03-20T12:00:00Z");
        let reported = now + Duration::days(4);
        assert_eq!(resolving_days(&reported, &IssueState::New, &now), Some(-4));
    }
}
