//! Knowledge-base views built from resolved issues.

use std::collections::BTreeMap;

use crate::entity::{Issue, NewArticle};
use crate::error::{HelpdeskError, Result};
use crate::stats::group_by_category;

/// Resolved issues grouped by category name.
///
/// With `selected`, only that category's issues are returned (matched
/// case-insensitively); an unknown category yields an empty map.
pub fn articles_by_category(
    issues: &[Issue],
    selected: Option<&str>,
) -> BTreeMap<String, Vec<Issue>> {
    let resolved: Vec<Issue> = issues
        .iter()
        .filter(|issue| issue.state.is_resolved())
        .cloned()
        .collect();

    let mut groups = group_by_category(&resolved);
    if let Some(name) = selected {
        groups.retain(|category, _| category.eq_ignore_ascii_case(name));
    }
    groups
}

/// Build an article from an issue that has been resolved or completed.
///
/// Blank title or description fall back to the issue's own.
pub fn draft_article(issue: &Issue, title: &str, description: &str) -> Result<NewArticle> {
    if !issue.state.is_terminal() {
        return Err(HelpdeskError::Validation(format!(
            "Issue {} is '{}'; only resolved issues can be published",
            issue.id, issue.state
        )));
    }

    let title = match title.trim() {
        "" => issue.title.clone(),
        t => t.to_string(),
    };
    let description = match description.trim() {
        "" => issue.description.clone(),
        d => d.to_string(),
    };

    Ok(NewArticle {
        issue_id: issue.id,
        title,
        description,
        resolution_details: issue.resolution_details.clone(),
        date_resolved: issue.date_resolved,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{CategoryRef, IssueState, UserRef};
    use chrono::{Duration, Utc};

    fn issue(id: i64, category: &str, state: IssueState) -> Issue {
        let mut issue = Issue::new(
            id,
            format!("Issue {}", id),
            CategoryRef {
                id: 1,
                name: category.to_string(),
            },
            UserRef::new(2, "Sam Reporter"),
            Utc::now() - Duration::days(4),
        );
        issue.description = "Laptop will not boot".to_string();
        if state.is_terminal() {
            issue.resolution_details = Some("Reseated the RAM".to_string());
            issue.date_resolved = Some(Utc::now());
        }
        issue.state = state;
        issue
    }

    fn sample() -> Vec<Issue> {
        vec![
            issue(1, "Hardware", IssueState::Resolved),
            issue(2, "Hardware", IssueState::New),
            issue(3, "Network", IssueState::Resolved),
            issue(4, "Network", IssueState::Completed),
            issue(5, "Software", IssueState::from("resolved")),
        ]
    }

    #[test]
    fn test_groups_only_resolved() {
        let groups = articles_by_category(&sample(), None);
        assert_eq!(groups.len(), 3);
        assert_eq!(groups["Hardware"].len(), 1);
        assert_eq!(groups["Network"].len(), 1);
        assert_eq!(groups["Network"][0].id, 3);
        assert_eq!(groups["Software"][0].id, 5);
    }

    #[test]
    fn test_selected_category() {
        let groups = articles_by_category(&sample(), Some("network"));
        assert_eq!(groups.len(), 1);
        assert!(groups.contains_key("Network"));

        assert!(articles_by_category(&sample(), Some("Printers")).is_empty());
    }

    #[test]
    fn test_draft_from_resolved_issue() {
        let resolved = issue(7, "Hardware", IssueState::Resolved);
        let draft = draft_article(&resolved, "Boot failures", "").unwrap();

        assert_eq!(draft.issue_id, 7);
        assert_eq!(draft.title, "Boot failures");
        assert_eq!(draft.description, "Laptop will not boot");
        assert_eq!(draft.resolution_details.as_deref(), Some("Reseated the RAM"));
        assert_eq!(draft.date_resolved, resolved.date_resolved);
    }

    #[test]
    fn test_draft_from_completed_issue() {
        let completed = issue(8, "Network", IssueState::Completed);
        let draft = draft_article(&completed, "", "").unwrap();
        assert_eq!(draft.title, "Issue 8");
    }

    #[test]
    fn test_draft_from_open_issue_fails() {
        let open = issue(9, "Network", IssueState::InProgress);
        let result = draft_article(&open, "x", "y");
        assert!(matches!(result, Err(HelpdeskError::Validation(_))));
    }
}
