//! Issue filtering for `helpdesk list` and the `issue_list` tool.

use chrono::{DateTime, Utc};

use crate::entity::{Issue, IssueState};

/// Parsed issue filter from a query string.
///
/// Filters are given as prefixed tokens:
/// - `category:network` - Category name, case-insensitive
/// - `state:in-progress` - State label, case-insensitive
/// - `assignee:alex` - Substring of the assignee's full name
/// - `reporter:sam` - Substring of the reporter's full name
/// - `reported:>2025-01-01` - Reported after date
/// - `reported:<2025-12-31` - Reported before date
///
/// Any other words must all appear in the title or description.
#[derive(Debug, Default, Clone)]
pub struct IssueFilter {
    pub category: Option<String>,
    pub state: Option<IssueState>,
    pub assignee: Option<String>,
    pub reporter: Option<String>,
    pub reported_after: Option<DateTime<Utc>>,
    pub reported_before: Option<DateTime<Utc>>,
    /// Lowercased free-text words.
    pub terms: Vec<String>,
}

impl IssueFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if filter has any constraints.
    pub fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.state.is_none()
            && self.assignee.is_none()
            && self.reporter.is_none()
            && self.reported_after.is_none()
            && self.reported_before.is_none()
            && self.terms.is_empty()
    }

    pub fn matches(&self, issue: &Issue) -> bool {
        if let Some(category) = &self.category {
            if !issue.category.name.eq_ignore_ascii_case(category) {
                return false;
            }
        }
        if let Some(state) = &self.state {
            if !same_label(issue.state.label(), state.label()) {
                return false;
            }
        }
        if let Some(assignee) = &self.assignee {
            if !contains_ci(issue.assignee_name(), assignee) {
                return false;
            }
        }
        if let Some(reporter) = &self.reporter {
            if !contains_ci(issue.reporter.full_name.as_deref(), reporter) {
                return false;
            }
        }
        if let Some(after) = self.reported_after {
            if issue.date_reported <= after {
                return false;
            }
        }
        if let Some(before) = self.reported_before {
            if issue.date_reported >= before {
                return false;
            }
        }

        let haystack = format!("{} {}", issue.title, issue.description).to_lowercase();
        self.terms.iter().all(|term| haystack.contains(term))
    }

    pub fn apply(&self, issues: Vec<Issue>) -> Vec<Issue> {
        issues.into_iter().filter(|i| self.matches(i)).collect()
    }
}

fn contains_ci(value: Option<&str>, needle: &str) -> bool {
    value
        .map(|v| v.to_lowercase().contains(&needle.to_lowercase()))
        .unwrap_or(false)
}

/// Parse a raw query string into an [`IssueFilter`].
///
/// # Examples
///
/// ```ignore
/// let filter = parse_query("category:network state:new vpn");
/// assert_eq!(filter.category, Some("network".to_string()));
/// assert_eq!(filter.terms, vec!["vpn"]);
/// ```
pub fn parse_query(raw: &str) -> IssueFilter {
    let mut filter = IssueFilter::default();

    for token in raw.split_whitespace() {
        if let Some(value) = token.strip_prefix("category:") {
            filter.category = Some(value.replace(['-', '_'], " "));
        } else if let Some(value) = token.strip_prefix("state:") {
            filter.state = Some(IssueState::from(value).canonical());
        } else if let Some(value) = token.strip_prefix("assignee:") {
            filter.assignee = Some(value.to_string());
        } else if let Some(value) = token.strip_prefix("reporter:") {
            filter.reporter = Some(value.to_string());
        } else if let Some(value) = token.strip_prefix("reported:>") {
            filter.reported_after = parse_date(value);
        } else if let Some(value) = token.strip_prefix("reported:<") {
            filter.reported_before = parse_date(value);
        } else {
            filter.terms.push(token.to_lowercase());
        }
    }

    filter
}

/// State labels compare case-insensitively, with '-' and '_' as spaces.
fn same_label(a: &str, b: &str) -> bool {
    let normalize = |s: &str| s.replace(['-', '_'], " ").to_lowercase();
    normalize(a) == normalize(b)
}

/// Parse a date string into DateTime<Utc>.
/// Supports ISO 8601 date format (YYYY-MM-DD) or full datetime.
fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    // Date only, midnight UTC
    if let Ok(date) = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        let datetime = date.and_hms_opt(0, 0, 0)?;
        return Some(DateTime::from_naive_utc_and_offset(datetime, Utc));
    }

    None
}
