// src/entity/issue.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle label of an issue.
///
/// Only the exact known labels parse to their variants. Any other text,
/// including a differently cased "resolved", is kept verbatim in
/// [`IssueState::Other`] so that reads and per-state counts show what staff
/// typed. The terminal checks and [`IssueState::canonical`] compare labels
/// case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum IssueState {
    #[default]
    New,
    InProgress,
    Resolved,
    Completed,
    Other(String),
}

impl IssueState {
    /// Labels of the known states, in workflow order.
    pub const KNOWN: [&'static str; 4] = ["New", "In Progress", "Resolved", "Completed"];

    /// Resolved or Completed: no resolving time applies.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.known(),
            Some(IssueState::Resolved | IssueState::Completed)
        )
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.known(), Some(IssueState::Resolved))
    }

    /// The known state this label names, ignoring case and treating '-' and
    /// '_' as spaces. Free-form labels stay as they are.
    pub fn canonical(&self) -> IssueState {
        self.known().unwrap_or_else(|| self.clone())
    }

    fn known(&self) -> Option<IssueState> {
        match self {
            IssueState::Other(label) => {
                let normalized = label.trim().to_lowercase().replace(['-', '_'], " ");
                match normalized.as_str() {
                    "new" => Some(IssueState::New),
                    "in progress" | "inprogress" => Some(IssueState::InProgress),
                    "resolved" => Some(IssueState::Resolved),
                    "completed" => Some(IssueState::Completed),
                    _ => None,
                }
            }
            known => Some(known.clone()),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, IssueState::Other(_))
    }

    pub fn label(&self) -> &str {
        match self {
            IssueState::New => "New",
            IssueState::InProgress => "In Progress",
            IssueState::Resolved => "Resolved",
            IssueState::Completed => "Completed",
            IssueState::Other(label) => label,
        }
    }
}

impl std::fmt::Display for IssueState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for IssueState {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "New" => IssueState::New,
            "In Progress" => IssueState::InProgress,
            "Resolved" => IssueState::Resolved,
            "Completed" => IssueState::Completed,
            _ => IssueState::Other(s.to_string()),
        })
    }
}

impl From<String> for IssueState {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(state) => state,
            Err(never) => match never {},
        }
    }
}

impl From<&str> for IssueState {
    fn from(s: &str) -> Self {
        IssueState::from(s.to_string())
    }
}

impl From<IssueState> for String {
    fn from(state: IssueState) -> Self {
        state.label().to_string()
    }
}

/// Category reference carried by value on an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: i64,
    pub name: String,
}

/// User reference carried by value on an issue.
///
/// `full_name` is filled in by the store when the issue is read; an
/// assignment only supplies the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: i64,
    pub full_name: Option<String>,
}

impl UserRef {
    pub fn new(id: i64, full_name: impl Into<String>) -> Self {
        Self {
            id,
            full_name: Some(full_name.into()),
        }
    }

    pub fn id_only(id: i64) -> Self {
        Self {
            id,
            full_name: None,
        }
    }
}

/// A support ticket.
///
/// Issues are values: lifecycle actions build a new `Issue` rather than
/// editing one in place (see [`crate::lifecycle`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub resolution_details: Option<String>,
    pub category: CategoryRef,
    pub state: IssueState,
    pub date_reported: DateTime<Utc>,
    pub date_resolved: Option<DateTime<Utc>>,
    pub reporter: UserRef,
    pub assignee: Option<UserRef>,
}

impl Issue {
    pub fn new(
        id: i64,
        title: String,
        category: CategoryRef,
        reporter: UserRef,
        date_reported: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title,
            description: String::new(),
            resolution_details: None,
            category,
            state: IssueState::New,
            date_reported,
            date_resolved: None,
            reporter,
            assignee: None,
        }
    }

    pub fn assignee_name(&self) -> Option<&str> {
        self.assignee.as_ref().and_then(|a| a.full_name.as_deref())
    }
}

/// Insert payload for a freshly reported issue.
#[derive(Debug, Clone)]
pub struct NewIssue {
    pub title: String,
    pub description: String,
    pub category_id: i64,
    pub reporter_id: i64,
    pub date_reported: DateTime<Utc>,
}

impl NewIssue {
    pub fn new(title: String, description: String, category_id: i64, reporter_id: i64) -> Self {
        Self {
            title,
            description,
            category_id,
            reporter_id,
            date_reported: Utc::now(),
        }
    }
}
