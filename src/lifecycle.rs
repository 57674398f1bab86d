//! Issue lifecycle: staff and manager actions as pure `Issue -> Issue`
//! functions.
//!
//! Nothing here touches storage. Callers fetch the current issue, call
//! [`apply`], and persist the returned value.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::{Issue, IssueState, NewComment, UserRef};
use crate::error::{HelpdeskError, Result};
use crate::storage::IssueRepository;

/// How strictly actions are checked against the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransitionPolicy {
    /// Every action applies regardless of the current state, and
    /// `UpdateState` accepts any label.
    #[default]
    Permissive,
    /// Actions must follow [`is_allowed`]; free-form and terminal labels
    /// are rejected by `UpdateState`.
    Strict,
}

/// An action requested against an issue.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Manager assigns a staff member. Only the id is recorded; the display
    /// name is filled in when the issue is next read.
    Assign { staff_id: i64 },
    /// Staff member takes the issue and starts work.
    Nominate { staff: UserRef },
    Resolve { resolution: String },
    /// Set an arbitrary state label.
    UpdateState { state: String },
    Finalize,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Assign { .. } => "assign",
            Action::Nominate { .. } => "nominate",
            Action::Resolve { .. } => "resolve",
            Action::UpdateState { .. } => "update the state of",
            Action::Finalize => "finalize",
        }
    }

    /// State the issue ends up in, if the action changes it.
    fn target_state(&self) -> Option<IssueState> {
        match self {
            Action::Assign { .. } => None,
            Action::Nominate { .. } => Some(IssueState::InProgress),
            Action::Resolve { .. } => Some(IssueState::Resolved),
            Action::UpdateState { state } => Some(IssueState::from(state.as_str())),
            Action::Finalize => Some(IssueState::Completed),
        }
    }
}

/// The allowed-transition table used by [`TransitionPolicy::Strict`].
pub fn is_allowed(from: &IssueState, to: &IssueState) -> bool {
    use IssueState::*;

    matches!(
        (from, to),
        (New, InProgress)
            | (InProgress, InProgress)
            | (InProgress, Resolved)
            | (Resolved, Completed)
            | (Resolved, InProgress)
            | (Other(_), InProgress)
    )
}

fn check(issue: &Issue, action: &Action) -> Result<()> {
    let rejected = || HelpdeskError::InvalidTransition {
        from: issue.state.to_string(),
        action: action.name(),
    };

    match (action, action.target_state()) {
        (Action::Assign { .. }, _) => {
            if issue.state.is_terminal() {
                return Err(rejected());
            }
        }
        (Action::UpdateState { .. }, Some(target)) => {
            let target = target.canonical();
            if !target.is_known()
                || target.is_terminal()
                || !is_allowed(&issue.state.canonical(), &target)
            {
                return Err(rejected());
            }
        }
        (_, Some(target)) => {
            if !is_allowed(&issue.state.canonical(), &target) {
                return Err(rejected());
            }
        }
        (_, None) => {}
    }

    Ok(())
}

/// Apply `action` to `issue`, returning the updated issue.
///
/// `now` stamps the resolution date for `Resolve` and `Finalize`.
pub fn apply(
    issue: &Issue,
    action: &Action,
    now: DateTime<Utc>,
    policy: TransitionPolicy,
) -> Result<Issue> {
    if policy == TransitionPolicy::Strict {
        check(issue, action)?;
    }

    let mut updated = match action {
        Action::Assign { staff_id } => Issue {
            assignee: Some(UserRef::id_only(*staff_id)),
            ..issue.clone()
        },
        Action::Nominate { staff } => Issue {
            state: IssueState::InProgress,
            assignee: Some(staff.clone()),
            ..issue.clone()
        },
        Action::Resolve { resolution } => Issue {
            resolution_details: Some(resolution.clone()),
            state: IssueState::Resolved,
            date_resolved: Some(now),
            ..issue.clone()
        },
        Action::UpdateState { state } => {
            let state = IssueState::from(state.as_str());
            Issue {
                state: match policy {
                    TransitionPolicy::Strict => state.canonical(),
                    TransitionPolicy::Permissive => state,
                },
                ..issue.clone()
            }
        }
        Action::Finalize => Issue {
            state: IssueState::Completed,
            date_resolved: Some(now),
            ..issue.clone()
        },
    };

    // A reopened issue has no resolution.
    if policy == TransitionPolicy::Strict
        && issue.state.is_terminal()
        && !updated.state.is_terminal()
    {
        updated.date_resolved = None;
        updated.resolution_details = None;
    }

    tracing::info!(
        issue = issue.id,
        action = action.name(),
        from = %issue.state,
        to = %updated.state,
        "applied issue action"
    );

    Ok(updated)
}

/// Fetch issue `id`, apply `action` and persist the result.
///
/// Returns the issue as read back, so names derived by the store (such as
/// the assignee of an `Assign`) are filled in.
pub fn execute<R>(
    repo: &R,
    id: i64,
    action: &Action,
    now: DateTime<Utc>,
    policy: TransitionPolicy,
) -> Result<Issue>
where
    R: IssueRepository + ?Sized,
{
    let current = repo
        .fetch_issue(id)?
        .ok_or_else(|| HelpdeskError::not_found("Issue", id))?;

    let updated = apply(&current, action, now, policy)?;
    repo.update_issue(&updated)?;

    repo.fetch_issue(id)?
        .ok_or_else(|| HelpdeskError::not_found("Issue", id))
}

/// Build a comment for `issue`. The issue itself is left untouched.
pub fn comment(issue: &Issue, user_id: i64, text: String, now: DateTime<Utc>) -> NewComment {
    NewComment {
        issue_id: issue.id,
        user_id,
        text,
        date: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::CategoryRef;
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-06-30T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn new_issue() -> Issue {
        let mut issue = Issue::new(
            42,
            "Printer offline".to_string(),
            CategoryRef {
                id: 1,
                name: "Hardware".to_string(),
            },
            UserRef::new(5, "Sam Reporter"),
            now() - Duration::days(3),
        );
        issue.description = "Third floor printer is not responding".to_string();
        issue
    }

    fn permissive(issue: &Issue, action: Action) -> Issue {
        apply(issue, &action, now(), TransitionPolicy::Permissive).unwrap()
    }

    #[test]
    fn test_assign_sets_id_only_and_keeps_state() {
        let issue = new_issue();
        let assigned = permissive(&issue, Action::Assign { staff_id: 9 });

        assert_eq!(assigned.state, IssueState::New);
        assert_eq!(assigned.assignee, Some(UserRef::id_only(9)));
        // Copy-on-write: the original is unchanged.
        assert!(issue.assignee.is_none());
    }

    #[test]
    fn test_nominate_moves_to_in_progress() {
        let staff = UserRef::new(9, "Alex Kim");
        let nominated = permissive(
            &new_issue(),
            Action::Nominate {
                staff: staff.clone(),
            },
        );

        assert_eq!(nominated.state, IssueState::InProgress);
        assert_eq!(nominated.assignee, Some(staff));
        assert!(nominated.date_resolved.is_none());
    }

    #[test]
    fn test_resolve_sets_details_and_date() {
        let resolved = permissive(
            &new_issue(),
            Action::Resolve {
                resolution: "Replaced network card".to_string(),
            },
        );

        assert_eq!(resolved.state, IssueState::Resolved);
        assert_eq!(
            resolved.resolution_details.as_deref(),
            Some("Replaced network card")
        );
        assert_eq!(resolved.date_resolved, Some(now()));
        assert!(resolved.date_resolved.unwrap() >= resolved.date_reported);
    }

    #[test]
    fn test_finalize_overwrites_resolution_date() {
        let resolved = apply(
            &new_issue(),
            &Action::Resolve {
                resolution: "Rebooted".to_string(),
            },
            now() - Duration::days(1),
            TransitionPolicy::Permissive,
        )
        .unwrap();

        let finalized = permissive(&resolved, Action::Finalize);
        assert_eq!(finalized.state, IssueState::Completed);
        assert_eq!(finalized.date_resolved, Some(now()));
        assert_eq!(finalized.resolution_details.as_deref(), Some("Rebooted"));
    }

    #[test]
    fn test_update_state_accepts_any_label() {
        let updated = permissive(
            &new_issue(),
            Action::UpdateState {
                state: "Blocked".to_string(),
            },
        );
        assert_eq!(updated.state.to_string(), "Blocked");

        let updated = permissive(
            &new_issue(),
            Action::UpdateState {
                state: "in progress".to_string(),
            },
        );
        assert_eq!(updated.state.to_string(), "in progress");
    }

    #[test]
    fn test_permissive_allows_actions_on_completed_issue() {
        let completed = permissive(&new_issue(), Action::Finalize);
        let reassigned = permissive(&completed, Action::Assign { staff_id: 3 });
        assert_eq!(reassigned.state, IssueState::Completed);
        assert_eq!(reassigned.assignee, Some(UserRef::id_only(3)));
    }

    #[test]
    fn test_comment_does_not_touch_issue() {
        let issue = new_issue();
        let before = issue.clone();
        let c = comment(&issue, 9, "Checking cables".to_string(), now());

        assert_eq!(c.issue_id, 42);
        assert_eq!(c.user_id, 9);
        assert_eq!(c.text, "Checking cables");
        assert_eq!(issue, before);
    }

    #[test]
    fn test_strict_follows_workflow() {
        let strict = TransitionPolicy::Strict;
        let issue = new_issue();

        let issue = apply(&issue, &Action::Assign { staff_id: 9 }, now(), strict).unwrap();
        let issue = apply(
            &issue,
            &Action::Nominate {
                staff: UserRef::new(9, "Alex Kim"),
            },
            now(),
            strict,
        )
        .unwrap();
        let issue = apply(
            &issue,
            &Action::Resolve {
                resolution: "Fixed".to_string(),
            },
            now(),
            strict,
        )
        .unwrap();
        let issue = apply(&issue, &Action::Finalize, now(), strict).unwrap();
        assert_eq!(issue.state, IssueState::Completed);
    }

    #[test]
    fn test_strict_reopen_clears_resolution() {
        let strict = TransitionPolicy::Strict;
        let nominate = Action::Nominate {
            staff: UserRef::new(9, "Alex Kim"),
        };

        let issue = apply(&new_issue(), &nominate, now(), strict).unwrap();
        let issue = apply(
            &issue,
            &Action::Resolve {
                resolution: "Fixed".to_string(),
            },
            now(),
            strict,
        )
        .unwrap();
        assert!(issue.date_resolved.is_some());

        let reopened = apply(&issue, &nominate, now(), strict).unwrap();
        assert_eq!(reopened.state, IssueState::InProgress);
        assert!(reopened.date_resolved.is_none());
        assert!(reopened.resolution_details.is_none());

        // Permissive keeps the old resolution date.
        let reopened = permissive(&issue, nominate);
        assert!(reopened.date_resolved.is_some());
    }

    #[test]
    fn test_strict_rejects_out_of_table_actions() {
        let strict = TransitionPolicy::Strict;
        let issue = new_issue();

        let err = apply(&issue, &Action::Finalize, now(), strict).unwrap_err();
        assert!(matches!(
            err,
            HelpdeskError::InvalidTransition { ref from, action: "finalize" } if from == "New"
        ));

        let err = apply(
            &issue,
            &Action::Resolve {
                resolution: "x".to_string(),
            },
            now(),
            strict,
        );
        assert!(err.is_err());

        let completed = permissive(&issue, Action::Finalize);
        assert!(apply(&completed, &Action::Assign { staff_id: 1 }, now(), strict).is_err());
    }

    #[test]
    fn test_strict_update_state_requires_known_non_terminal_label() {
        let strict = TransitionPolicy::Strict;
        let issue = new_issue();

        for label in ["Blocked", "Resolved", "Completed"] {
            let action = Action::UpdateState {
                state: label.to_string(),
            };
            assert!(apply(&issue, &action, now(), strict).is_err(), "{}", label);
        }

        let action = Action::UpdateState {
            state: "in progress".to_string(),
        };
        let updated = apply(&issue, &action, now(), strict).unwrap();
        assert_eq!(updated.state, IssueState::InProgress);
    }

    struct OneIssue(std::cell::RefCell<Issue>);

    impl IssueRepository for OneIssue {
        fn fetch_all_issues(&self) -> Result<Vec<Issue>> {
            Ok(vec![self.0.borrow().clone()])
        }
        fn fetch_issue(&self, id: i64) -> Result<Option<Issue>> {
            let issue = self.0.borrow();
            Ok((issue.id == id).then(|| issue.clone()))
        }
        fn fetch_issues_by_category(&self, _: i64) -> Result<Vec<Issue>> {
            self.fetch_all_issues()
        }
        fn fetch_issues_assigned_to(&self, _: i64) -> Result<Vec<Issue>> {
            self.fetch_all_issues()
        }
        fn fetch_issues_created_by(&self, _: i64) -> Result<Vec<Issue>> {
            self.fetch_all_issues()
        }
        fn insert_issue(&self, _: &crate::entity::NewIssue) -> Result<Issue> {
            Err(HelpdeskError::Storage("read-only".to_string()))
        }
        fn update_issue(&self, issue: &Issue) -> Result<()> {
            *self.0.borrow_mut() = issue.clone();
            Ok(())
        }
    }

    #[test]
    fn test_execute_persists_result() {
        let repo = OneIssue(std::cell::RefCell::new(new_issue()));
        let resolved = execute(
            &repo,
            42,
            &Action::Resolve {
                resolution: "Power cycled".to_string(),
            },
            now(),
            TransitionPolicy::Permissive,
        )
        .unwrap();

        assert_eq!(resolved.state, IssueState::Resolved);
        assert_eq!(repo.0.borrow().state, IssueState::Resolved);
    }

    #[test]
    fn test_execute_missing_issue() {
        let repo = OneIssue(std::cell::RefCell::new(new_issue()));
        let err = execute(&repo, 7, &Action::Finalize, now(), TransitionPolicy::Permissive)
            .unwrap_err();
        assert!(matches!(err, HelpdeskError::NotFound { kind: "Issue", .. }));
    }

    #[test]
    fn test_execute_rejected_action_leaves_store_untouched() {
        let repo = OneIssue(std::cell::RefCell::new(new_issue()));
        let result = execute(&repo, 42, &Action::Finalize, now(), TransitionPolicy::Strict);
        assert!(result.is_err());
        assert_eq!(repo.0.borrow().state, IssueState::New);
    }

    #[test]
    fn test_transition_table() {
        use IssueState::*;
        assert!(is_allowed(&New, &InProgress));
        assert!(is_allowed(&Resolved, &InProgress));
        assert!(is_allowed(&Other("Blocked".to_string()), &InProgress));
        assert!(!is_allowed(&New, &Completed));
        assert!(!is_allowed(&Completed, &InProgress));
        assert!(!is_allowed(&InProgress, &New));
    }
}
