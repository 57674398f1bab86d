// src/export/issues.rs
//! Open and closed issue listings

use std::path::Path;

use chrono::{DateTime, Utc};

use crate::entity::Issue;
use crate::resolution::resolving_days;
use crate::Result;

use super::utils::{format_date, format_timestamp, table_cell, write_export_file};
use super::GeneratedFile;

fn open_row(issue: &Issue, now: &DateTime<Utc>) -> String {
    let days = resolving_days(&issue.date_reported, &issue.state, now)
        .map(|d| d.to_string())
        .unwrap_or_default();

    format!(
        "| #{} | {} | {} | {} | {} | {} | {} |\n",
        issue.id,
        table_cell(&issue.title),
        table_cell(&issue.category.name),
        issue.state,
        issue.assignee_name().unwrap_or("-"),
        format_date(&issue.date_reported),
        days,
    )
}

fn closed_row(issue: &Issue) -> String {
    format!(
        "| #{} | {} | {} | {} | {} | {} |\n",
        issue.id,
        table_cell(&issue.title),
        table_cell(&issue.category.name),
        issue.state,
        issue
            .date_resolved
            .as_ref()
            .map(format_date)
            .unwrap_or_else(|| "-".to_string()),
        table_cell(issue.resolution_details.as_deref().unwrap_or("")),
    )
}

/// Generate issues/open.md, oldest report first
fn generate_open(issues: &[&Issue], export_dir: &Path, now: &DateTime<Utc>) -> Result<GeneratedFile> {
    let mut content = String::from("# Open Issues\n\n");
    content.push_str("> Generated by helpdesk. Do not edit directly.\n\n");

    if issues.is_empty() {
        content.push_str("*No open issues.*\n\n");
    } else {
        content.push_str("| Id | Title | Category | State | Assignee | Reported | Days open |\n");
        content.push_str("|----|-------|----------|-------|----------|----------|-----------|\n");

        let mut sorted = issues.to_vec();
        sorted.sort_by_key(|i| (i.date_reported, i.id));
        for issue in sorted {
            content.push_str(&open_row(issue, now));
        }
        content.push('\n');
    }

    content.push_str("---\n\n");
    content.push_str(&format!("*Last updated: {}*\n", format_timestamp(now)));

    write_export_file(&export_dir.join("issues/open.md"), &content)?;

    Ok(GeneratedFile {
        relative_path: "issues/open.md".to_string(),
        entity_count: issues.len(),
    })
}

/// Generate issues/closed.md, most recently resolved first
fn generate_closed(issues: &[&Issue], export_dir: &Path, now: &DateTime<Utc>) -> Result<GeneratedFile> {
    let mut content = String::from("# Closed Issues\n\n");
    content.push_str("> Generated by helpdesk. Do not edit directly.\n\n");

    if issues.is_empty() {
        content.push_str("*No closed issues.*\n\n");
    } else {
        content.push_str("| Id | Title | Category | State | Resolved | Resolution |\n");
        content.push_str("|----|-------|----------|-------|----------|------------|\n");

        let mut sorted = issues.to_vec();
        sorted.sort_by(|a, b| b.date_resolved.cmp(&a.date_resolved));
        for issue in sorted {
            content.push_str(&closed_row(issue));
        }
        content.push('\n');
    }

    content.push_str("---\n\n");
    content.push_str(&format!("*Last updated: {}*\n", format_timestamp(now)));

    write_export_file(&export_dir.join("issues/closed.md"), &content)?;

    Ok(GeneratedFile {
        relative_path: "issues/closed.md".to_string(),
        entity_count: issues.len(),
    })
}

/// Generate issue listing files
pub fn generate(issues: &[Issue], export_dir: &Path, now: &DateTime<Utc>) -> Result<Vec<GeneratedFile>> {
    let (closed, open): (Vec<&Issue>, Vec<&Issue>) =
        issues.iter().partition(|i| i.state.is_terminal());

    Ok(vec![
        generate_open(&open, export_dir, now)?,
        generate_closed(&closed, export_dir, now)?,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{CategoryRef, IssueState, UserRef};
    use chrono::Duration;
    use tempfile::TempDir;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-06-30T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn issue(id: i64, title: &str, state: IssueState, days_ago: i64) -> Issue {
        let mut issue = Issue::new(
            id,
            title.to_string(),
            CategoryRef {
                id: 1,
                name: "Network".to_string(),
            },
            UserRef::new(2, "Sam Reporter"),
            now() - Duration::days(days_ago),
        );
        if state.is_terminal() {
            issue.date_resolved = Some(now());
            issue.resolution_details = Some("Swapped | cable".to_string());
        }
        issue.state = state;
        issue
    }

    #[test]
    fn test_open_row_shows_days_open() {
        let mut i = issue(3, "VPN drops", IssueState::InProgress, 10);
        i.assignee = Some(UserRef::new(4, "Alex Kim"));
        let row = open_row(&i, &now());
        assert_eq!(
            row,
            "| #3 | VPN drops | Network | In Progress | Alex Kim | 2025-06-20 | 10 |\n"
        );
    }

    #[test]
    fn test_closed_row_escapes_resolution() {
        let row = closed_row(&issue(5, "Printer", IssueState::Completed, 3));
        assert!(row.contains("Swapped \\| cable"));
        assert!(row.contains("2025-06-30"));
    }

    #[test]
    fn test_generate_splits_open_and_closed() {
        let tmp = TempDir::new().unwrap();
        let issues = vec![
            issue(1, "Wifi", IssueState::New, 2),
            issue(2, "Printer", IssueState::Resolved, 5),
            issue(3, "Monitor", IssueState::from("Blocked"), 1),
            issue(4, "Laptop", IssueState::Completed, 9),
        ];

        let files = generate(&issues, tmp.path(), &now()).unwrap();
        assert_eq!(files[0].relative_path, "issues/open.md");
        assert_eq!(files[0].entity_count, 2);
        assert_eq!(files[1].relative_path, "issues/closed.md");
        assert_eq!(files[1].entity_count, 2);

        let open = std::fs::read_to_string(tmp.path().join("issues/open.md")).unwrap();
        assert!(open.contains("Wifi"));
        assert!(open.contains("Blocked"));
        assert!(!open.contains("Printer"));
        // Oldest first
        assert!(open.find("Wifi").unwrap() < open.find("Monitor").unwrap());
    }

    #[test]
    fn test_generate_empty() {
        let tmp = TempDir::new().unwrap();
        generate(&[], tmp.path(), &now()).unwrap();
        let closed = std::fs::read_to_string(tmp.path().join("issues/closed.md")).unwrap();
        assert!(closed.contains("*No closed issues.*"));
    }
}
