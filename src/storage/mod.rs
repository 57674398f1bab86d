mod sqlite_store;

pub use sqlite_store::{SqliteStore, HELPDESK_DIR};

use crate::entity::{Issue, NewIssue};
use crate::error::Result;

/// Issue persistence as seen by the rest of the crate.
///
/// Aggregations and lifecycle handlers take a repository rather than
/// reaching for a global store, so tests can hand them any implementation.
pub trait IssueRepository {
    fn fetch_all_issues(&self) -> Result<Vec<Issue>>;

    /// `Ok(None)` when no issue has this id.
    fn fetch_issue(&self, id: i64) -> Result<Option<Issue>>;

    fn fetch_issues_by_category(&self, category_id: i64) -> Result<Vec<Issue>>;

    fn fetch_issues_assigned_to(&self, user_id: i64) -> Result<Vec<Issue>>;

    fn fetch_issues_created_by(&self, user_id: i64) -> Result<Vec<Issue>>;

    /// Store a new issue in state New and return it as read back.
    fn insert_issue(&self, issue: &NewIssue) -> Result<Issue>;

    /// Overwrite the stored issue with the same id. Last write wins.
    fn update_issue(&self, issue: &Issue) -> Result<()>;
}
