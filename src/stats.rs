//! Aggregate views over a snapshot of issues.
//!
//! Every view is a pure function of the issue slice it is given; none of
//! them read shared state, so they can be computed in any order.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::Issue;
use crate::error::Result;
use crate::storage::IssueRepository;

/// Number of entries in the longest-unresolved list.
pub const TOP_UNRESOLVED_LIMIT: usize = 5;

/// Only resolutions this recent count towards the average.
pub const RESOLUTION_WINDOW_DAYS: i64 = 30;

/// Largest window a `chrono::Duration` can hold.
pub const MAX_RESOLUTION_WINDOW_DAYS: i64 = i64::MAX / 86_400_000;

/// Ordering of the "longest unresolved" list.
///
/// The dashboard this list was modelled on sorts by report date descending,
/// which surfaces the newest open issues rather than the oldest. That
/// ordering is kept as [`DEFAULT_UNRESOLVED_RANKING`] until the intent is
/// confirmed; `OldestFirst` ranks by age.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedRanking {
    #[default]
    MostRecentFirst,
    OldestFirst,
}

pub const DEFAULT_UNRESOLVED_RANKING: UnresolvedRanking = UnresolvedRanking::MostRecentFirst;

/// Tunables for [`Statistics::compute`].
#[derive(Debug, Clone, Copy)]
pub struct StatsOptions {
    pub window_days: i64,
    pub top_limit: usize,
    pub ranking: UnresolvedRanking,
}

impl Default for StatsOptions {
    fn default() -> Self {
        Self {
            window_days: RESOLUTION_WINDOW_DAYS,
            top_limit: TOP_UNRESOLVED_LIMIT,
            ranking: DEFAULT_UNRESOLVED_RANKING,
        }
    }
}

/// Category name -> issue count. Every issue lands in exactly one bucket.
pub fn issues_per_category(issues: &[Issue]) -> BTreeMap<String, usize> {
    count_by(issues, |issue| Some(issue.category.name.clone()))
}

/// State label -> issue count.
pub fn issues_per_status(issues: &[Issue]) -> BTreeMap<String, usize> {
    count_by(issues, |issue| Some(issue.state.to_string()))
}

/// Assignee full name -> issue count. Unassigned issues are skipped.
pub fn issues_per_staff(issues: &[Issue]) -> BTreeMap<String, usize> {
    count_by(issues, |issue| issue.assignee_name().map(str::to_string))
}

fn count_by<F>(issues: &[Issue], key: F) -> BTreeMap<String, usize>
where
    F: Fn(&Issue) -> Option<String>,
{
    let mut counts = BTreeMap::new();
    for issue in issues {
        if let Some(k) = key(issue) {
            *counts.entry(k).or_insert(0) += 1;
        }
    }
    counts
}

/// Mean whole days from report to resolution, over issues in state
/// Resolved whose resolution falls within `window_days` of `now`.
///
/// Returns 0.0 when no issue qualifies. A window too large for a
/// `Duration` places no limit on how old a resolution may be.
pub fn average_resolution_days(issues: &[Issue], now: &DateTime<Utc>, window_days: i64) -> f64 {
    let window = Duration::try_days(window_days);

    let durations: Vec<i64> = issues
        .iter()
        .filter(|issue| issue.state.is_resolved())
        .filter_map(|issue| issue.date_resolved.map(|resolved| (issue, resolved)))
        .filter(|(_, resolved)| window.map_or(true, |w| *now - *resolved <= w))
        .map(|(issue, resolved)| (resolved - issue.date_reported).num_days())
        .collect();

    if durations.is_empty() {
        return 0.0;
    }

    durations.iter().sum::<i64>() as f64 / durations.len() as f64
}

/// Issues not in state Resolved, ranked per `ranking`, at most `limit`.
///
/// Completed issues are not excluded here; only Resolved is.
pub fn longest_unresolved(issues: &[Issue], limit: usize, ranking: UnresolvedRanking) -> Vec<Issue> {
    let mut unresolved: Vec<&Issue> = issues
        .iter()
        .filter(|issue| !issue.state.is_resolved())
        .collect();

    match ranking {
        UnresolvedRanking::MostRecentFirst => {
            unresolved.sort_by(|a, b| b.date_reported.cmp(&a.date_reported))
        }
        UnresolvedRanking::OldestFirst => {
            unresolved.sort_by(|a, b| a.date_reported.cmp(&b.date_reported))
        }
    }

    unresolved.into_iter().take(limit).cloned().collect()
}

/// Category name -> issues in that category, in input order.
pub fn group_by_category(issues: &[Issue]) -> BTreeMap<String, Vec<Issue>> {
    let mut groups: BTreeMap<String, Vec<Issue>> = BTreeMap::new();
    for issue in issues {
        groups
            .entry(issue.category.name.clone())
            .or_default()
            .push(issue.clone());
    }
    groups
}

/// The statistics page: all five views computed from one snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct Statistics {
    pub total_issues: usize,
    pub issues_per_category: BTreeMap<String, usize>,
    pub issues_per_status: BTreeMap<String, usize>,
    pub issues_per_staff: BTreeMap<String, usize>,
    pub average_resolution_time: f64,
    pub longest_unresolved: Vec<Issue>,
}

impl Statistics {
    pub fn compute(issues: &[Issue], now: &DateTime<Utc>, options: &StatsOptions) -> Self {
        Self {
            total_issues: issues.len(),
            issues_per_category: issues_per_category(issues),
            issues_per_status: issues_per_status(issues),
            issues_per_staff: issues_per_staff(issues),
            average_resolution_time: average_resolution_days(issues, now, options.window_days),
            longest_unresolved: longest_unresolved(issues, options.top_limit, options.ranking),
        }
    }

    /// Fetch every issue and compute the views.
    ///
    /// If the fetch fails the error is returned and nothing is computed.
    pub fn collect<R>(repo: &R, now: &DateTime<Utc>, options: &StatsOptions) -> Result<Self>
    where
        R: IssueRepository + ?Sized,
    {
        let issues = repo.fetch_all_issues()?;
        tracing::debug!(count = issues.len(), "computing statistics");
        Ok(Self::compute(&issues, now, options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{CategoryRef, IssueState, NewIssue, UserRef};
    use crate::error::HelpdeskError;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-06-30T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn issue(id: i64, category: &str, state: &str, reported_days_ago: i64) -> Issue {
        let mut issue = Issue::new(
            id,
            format!("Issue {}", id),
            CategoryRef {
                id: category.len() as i64,
                name: category.to_string(),
            },
            UserRef::new(100, "Reporter"),
            now() - Duration::days(reported_days_ago),
        );
        issue.state = IssueState::from(state);
        issue
    }

    fn resolved(id: i64, reported_days_ago: i64, resolved_days_ago: i64) -> Issue {
        let mut issue = issue(id, "Network", "Resolved", reported_days_ago);
        issue.date_resolved = Some(now() - Duration::days(resolved_days_ago));
        issue
    }

    fn assigned(mut issue: Issue, name: Option<&str>) -> Issue {
        issue.assignee = Some(UserRef {
            id: 7,
            full_name: name.map(str::to_string),
        });
        issue
    }

    #[test]
    fn test_category_counts_cover_every_issue() {
        let issues = vec![
            issue(1, "Network", "New", 1),
            issue(2, "Hardware", "New", 2),
            issue(3, "Network", "Resolved", 3),
            issue(4, "Software", "In Progress", 4),
        ];
        let counts = issues_per_category(&issues);
        assert_eq!(counts.values().sum::<usize>(), issues.len());
        assert_eq!(counts["Network"], 2);
        assert_eq!(counts["Hardware"], 1);
        assert_eq!(counts["Software"], 1);
    }

    #[test]
    fn test_status_counts_keep_raw_labels() {
        let issues = vec![
            issue(1, "Network", "New", 1),
            issue(2, "Network", "new", 2),
            issue(3, "Network", "Blocked", 3),
        ];
        let counts = issues_per_status(&issues);
        assert_eq!(counts["New"], 1);
        assert_eq!(counts["new"], 1);
        assert_eq!(counts["Blocked"], 1);
    }

    #[test]
    fn test_staff_counts_skip_unassigned() {
        let issues = vec![
            assigned(issue(1, "Network", "In Progress", 1), Some("Alex Kim")),
            assigned(issue(2, "Network", "In Progress", 2), Some("Alex Kim")),
            assigned(issue(3, "Network", "New", 3), None),
            issue(4, "Network", "New", 4),
        ];
        let counts = issues_per_staff(&issues);
        assert_eq!(counts.len(), 1);
        assert_eq!(counts["Alex Kim"], 2);
        assert!(counts.values().sum::<usize>() <= issues.len());
    }

    #[test]
    fn test_average_empty_is_zero() {
        assert_eq!(average_resolution_days(&[], &now(), 30), 0.0);
        let issues = vec![issue(1, "Network", "New", 10)];
        assert_eq!(average_resolution_days(&issues, &now(), 30), 0.0);
    }

    #[test]
    fn test_average_with_oversized_window() {
        let issues = vec![resolved(1, 5, 2)];
        assert_eq!(average_resolution_days(&[], &now(), i64::MAX), 0.0);
        assert_eq!(average_resolution_days(&issues, &now(), i64::MAX), 3.0);
        assert_eq!(
            average_resolution_days(&issues, &now(), MAX_RESOLUTION_WINDOW_DAYS),
            3.0
        );
    }

    #[test]
    fn test_average_counts_recent_resolutions() {
        // Reported 5 days ago, resolved 2 days ago: 3 days.
        let issues = vec![resolved(1, 5, 2)];
        assert_eq!(average_resolution_days(&issues, &now(), 30), 3.0);

        let issues = vec![resolved(1, 5, 2), resolved(2, 20, 10)];
        assert_eq!(average_resolution_days(&issues, &now(), 30), 6.5);
    }

    #[test]
    fn test_average_respects_window_and_state() {
        let mut completed = resolved(3, 8, 1);
        completed.state = IssueState::Completed;
        let mut missing_date = resolved(4, 8, 1);
        missing_date.date_resolved = None;

        let issues = vec![
            resolved(1, 5, 2),
            // Resolved 31 days ago: outside the window.
            resolved(2, 60, 31),
            completed,
            missing_date,
        ];
        assert_eq!(average_resolution_days(&issues, &now(), 30), 3.0);
    }

    #[test]
    fn test_average_window_boundary_is_inclusive() {
        let issues = vec![resolved(1, 40, 30)];
        assert_eq!(average_resolution_days(&issues, &now(), 30), 10.0);
    }

    #[test]
    fn test_longest_unresolved_excludes_resolved() {
        let issues = vec![
            issue(1, "Network", "New", 1),
            issue(2, "Network", "resolved", 2),
            issue(3, "Network", "Completed", 3),
            issue(4, "Network", "RESOLVED", 4),
        ];
        let top = longest_unresolved(&issues, TOP_UNRESOLVED_LIMIT, UnresolvedRanking::default());
        let ids: Vec<i64> = top.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_longest_unresolved_default_is_most_recent_first() {
        let issues: Vec<Issue> = (1..=8).map(|n| issue(n, "Network", "New", n * 3)).collect();
        let top = longest_unresolved(&issues, TOP_UNRESOLVED_LIMIT, DEFAULT_UNRESOLVED_RANKING);
        assert_eq!(top.len(), 5);
        let ids: Vec<i64> = top.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_longest_unresolved_oldest_first() {
        let issues: Vec<Issue> = (1..=8).map(|n| issue(n, "Network", "New", n * 3)).collect();
        let top = longest_unresolved(&issues, 3, UnresolvedRanking::OldestFirst);
        let ids: Vec<i64> = top.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![8, 7, 6]);
    }

    #[test]
    fn test_group_by_category() {
        let issues = vec![
            issue(1, "Network", "New", 1),
            issue(2, "Hardware", "New", 2),
            issue(3, "Network", "New", 3),
        ];
        let groups = group_by_category(&issues);
        assert_eq!(groups.len(), 2);
        let network: Vec<i64> = groups["Network"].iter().map(|i| i.id).collect();
        assert_eq!(network, vec![1, 3]);
    }

    #[test]
    fn test_compute_bundles_all_views() {
        let issues = vec![
            assigned(issue(1, "Network", "In Progress", 4), Some("Alex Kim")),
            resolved(2, 5, 2),
            issue(3, "Hardware", "New", 1),
        ];
        let stats = Statistics::compute(&issues, &now(), &StatsOptions::default());
        assert_eq!(stats.total_issues, 3);
        assert_eq!(stats.issues_per_category["Network"], 2);
        assert_eq!(stats.issues_per_status["Resolved"], 1);
        assert_eq!(stats.issues_per_staff["Alex Kim"], 1);
        assert_eq!(stats.average_resolution_time, 3.0);
        assert_eq!(stats.longest_unresolved.len(), 2);
    }

    struct UnreachableStore;

    impl IssueRepository for UnreachableStore {
        fn fetch_all_issues(&self) -> Result<Vec<Issue>> {
            Err(HelpdeskError::Storage("connection refused".to_string()))
        }
        fn fetch_issue(&self, _id: i64) -> Result<Option<Issue>> {
            Err(HelpdeskError::Storage("connection refused".to_string()))
        }
        fn fetch_issues_by_category(&self, _category_id: i64) -> Result<Vec<Issue>> {
            Err(HelpdeskError::Storage("connection refused".to_string()))
        }
        fn fetch_issues_assigned_to(&self, _user_id: i64) -> Result<Vec<Issue>> {
            Err(HelpdeskError::Storage("connection refused".to_string()))
        }
        fn fetch_issues_created_by(&self, _user_id: i64) -> Result<Vec<Issue>> {
            Err(HelpdeskError::Storage("connection refused".to_string()))
        }
        fn insert_issue(&self, _issue: &NewIssue) -> Result<Issue> {
            Err(HelpdeskError::Storage("connection refused".to_string()))
        }
        fn update_issue(&self, _issue: &Issue) -> Result<()> {
            Err(HelpdeskError::Storage("connection refused".to_string()))
        }
    }

    #[test]
    fn test_collect_fails_without_partial_results() {
        let result = Statistics::collect(&UnreachableStore, &now(), &StatsOptions::default());
        assert!(matches!(result, Err(HelpdeskError::Storage(_))));
    }
}
