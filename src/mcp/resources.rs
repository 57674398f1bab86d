//! MCP resource implementations for the helpdesk.
//!
//! Static resources cover the schema, statistics, issue listings and the
//! knowledge base; a single template addresses one issue by id.

use crate::config::HelpdeskConfig;
use crate::entity::IssueState;
use crate::knowledge::articles_by_category;
use crate::mcp::error::McpError;
use crate::resolution::with_resolving_times;
use crate::stats::Statistics;
use crate::storage::{IssueRepository, SqliteStore};
use chrono::{Local, Utc};
use rmcp::model::{RawResource, RawResourceTemplate, ReadResourceResult, ResourceContents};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

/// The helpdesk:// URI scheme prefix.
pub const HELPDESK_SCHEME: &str = "helpdesk://";

/// MIME type for all resource responses.
pub const RESOURCE_MIME_TYPE: &str = "application/json";

/// Static resource URIs (directly readable without parameters).
pub mod static_resources {
    pub const SCHEMA: &str = "helpdesk://schema";
    pub const STATS: &str = "helpdesk://stats";
    pub const ISSUES: &str = "helpdesk://issues";
    pub const ISSUES_UNRESOLVED: &str = "helpdesk://issues/unresolved";
    pub const KNOWLEDGE_BASE: &str = "helpdesk://knowledge-base";
}

/// Resource template URI patterns (require parameter substitution).
pub mod resource_templates {
    pub const ISSUE_BY_ID: &str = "helpdesk://issue/{id}";
}

fn static_resource(uri: &str, name: &str, title: &str, description: &str) -> RawResource {
    RawResource {
        uri: uri.to_string(),
        name: name.to_string(),
        title: Some(title.to_string()),
        description: Some(description.to_string()),
        mime_type: Some(RESOURCE_MIME_TYPE.to_string()),
        size: None,
        icons: None,
        meta: None,
    }
}

/// Build the list of static resources.
pub fn build_static_resources() -> Vec<RawResource> {
    vec![
        static_resource(
            static_resources::SCHEMA,
            "Schema",
            "Issue Model",
            "States, roles and transitions",
        ),
        static_resource(
            static_resources::STATS,
            "Stats",
            "Helpdesk Statistics",
            "Counts per category, state and staff; average resolution time; longest unresolved",
        ),
        static_resource(
            static_resources::ISSUES,
            "Issues",
            "All Issues",
            "Every issue with its resolving time",
        ),
        static_resource(
            static_resources::ISSUES_UNRESOLVED,
            "Unresolved Issues",
            "Unresolved Issues",
            "Issues not yet Resolved or Completed",
        ),
        static_resource(
            static_resources::KNOWLEDGE_BASE,
            "Knowledge Base",
            "Knowledge Base",
            "Resolved issues grouped by category",
        ),
    ]
}

/// Build the list of resource templates.
pub fn build_resource_templates() -> Vec<RawResourceTemplate> {
    vec![RawResourceTemplate {
        uri_template: resource_templates::ISSUE_BY_ID.to_string(),
        name: "Issue by ID".to_string(),
        title: Some("Single Issue".to_string()),
        description: Some("Get a single issue by id".to_string()),
        mime_type: Some(RESOURCE_MIME_TYPE.to_string()),
        icons: None,
    }]
}

/// Parse a resource URI and return the content.
pub async fn read_resource(
    uri: &str,
    store: &Arc<Mutex<SqliteStore>>,
    config: &HelpdeskConfig,
) -> Result<ReadResourceResult, McpError> {
    let path = uri
        .strip_prefix(HELPDESK_SCHEME)
        .ok_or_else(|| McpError::InvalidResourceUri {
            uri: uri.to_string(),
        })?;

    let store = store.lock().await;

    match path {
        "schema" => json_resource(uri, &schema()),
        "stats" => {
            let stats = Statistics::collect(&*store, &Utc::now(), &config.stats_options())?;
            json_resource(uri, &stats)
        }
        "issues" => {
            let issues = store.fetch_all_issues()?;
            json_resource(uri, &with_resolving_times(issues, &Local::now()))
        }
        "issues/unresolved" => {
            let issues: Vec<_> = store
                .fetch_all_issues()?
                .into_iter()
                .filter(|i| !i.state.is_terminal())
                .collect();
            json_resource(uri, &with_resolving_times(issues, &Local::now()))
        }
        "knowledge-base" => {
            let issues = store.fetch_all_issues()?;
            json_resource(uri, &articles_by_category(&issues, None))
        }
        _ => {
            if let Some(id) = path.strip_prefix("issue/") {
                let id: i64 = id.parse().map_err(|_| McpError::InvalidResourceUri {
                    uri: uri.to_string(),
                })?;
                let issue = store.fetch_issue(id)?.ok_or_else(|| McpError::ResourceNotFound {
                    uri: uri.to_string(),
                })?;
                return json_resource(uri, &issue);
            }

            Err(McpError::ResourceNotFound {
                uri: uri.to_string(),
            })
        }
    }
}

fn schema() -> serde_json::Value {
    serde_json::json!({
        "states": IssueState::KNOWN,
        "terminal_states": ["Resolved", "Completed"],
        "roles": [crate::entity::ROLE_USER, crate::entity::ROLE_IT_STAFF, crate::entity::ROLE_MANAGER],
        "actions": {
            "assign": "Manager sets the assignee; state unchanged",
            "nominate": "Staff takes the issue; state becomes In Progress",
            "comment": "Appends a comment; issue unchanged",
            "resolve": "State becomes Resolved; resolution details and date recorded",
            "update_state": "Sets the state label",
            "finalize": "State becomes Completed; resolution date refreshed"
        },
        "strict_transitions": [
            ["New", "In Progress"],
            ["In Progress", "Resolved"],
            ["Resolved", "Completed"],
            ["Resolved", "In Progress"]
        ]
    })
}

fn json_resource<T: Serialize>(uri: &str, value: &T) -> Result<ReadResourceResult, McpError> {
    let text = serde_json::to_string_pretty(value).map_err(|e| McpError::InternalError {
        message: format!("Failed to serialize resource: {}", e),
    })?;

    Ok(ReadResourceResult {
        contents: vec![ResourceContents::TextResourceContents {
            uri: uri.to_string(),
            mime_type: Some(RESOURCE_MIME_TYPE.to_string()),
            text,
            meta: None,
        }],
    })
}
