//! MCP tool types and helpers for the helpdesk.
//!
//! This module contains parameter types, result types, and validation helpers
//! for MCP tools. The actual tool implementations are in mod.rs within the
//! #[tool_router] impl block.

use crate::entity::{Comment, Issue, User};
use crate::mcp::error::{validation, McpError};
use crate::resolution::IssueWithResolvingTime;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// ============================================================================
// Parameter and Result Types
// ============================================================================

/// Parameters for issue_report tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct IssueReportParams {
    /// Short summary (required, 1-500 characters)
    pub title: String,
    /// Longer description of the problem
    pub description: Option<String>,
    /// Category name or id
    pub category: String,
    /// Reporting user: username or id
    pub reporter: String,
}

/// Parameters for tools that only need an issue id
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct IssueIdParams {
    /// Issue id
    pub id: i64,
}

/// Parameters for issue_list tool
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct IssueListParams {
    /// Filter query, e.g. "category:network state:in-progress vpn"
    pub query: Option<String>,
    /// Only issues assigned to this user (username or id)
    pub assigned_to: Option<String>,
    /// Only issues reported by this user (username or id)
    pub reported_by: Option<String>,
    /// Maximum results (default 50, max 100)
    pub limit: Option<u32>,
    /// Offset for pagination
    pub offset: Option<u32>,
}

/// Parameters for issue_assign and issue_nominate tools
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct IssueStaffParams {
    /// Issue id
    pub id: i64,
    /// Staff member: username or id. Must have the IT Staff role.
    pub staff: String,
}

/// Parameters for issue_comment tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct IssueCommentParams {
    /// Issue id
    pub id: i64,
    /// Commenting user: username or id
    pub user: String,
    /// Comment text
    pub text: String,
}

/// Parameters for issue_resolve tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct IssueResolveParams {
    /// Issue id
    pub id: i64,
    /// What fixed the issue
    pub resolution: String,
}

/// Parameters for issue_update_state tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct IssueUpdateStateParams {
    /// Issue id
    pub id: i64,
    /// New state label
    pub state: String,
}

/// Parameters for knowledge_base tool
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct KnowledgeBaseParams {
    /// Only this category (case-insensitive)
    pub category: Option<String>,
}

/// Result of issue_list tool
#[derive(Debug, Clone, Serialize)]
pub struct IssueListResult {
    pub issues: Vec<IssueWithResolvingTime>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

/// Result of issue_get tool
#[derive(Debug, Clone, Serialize)]
pub struct IssueDetail {
    #[serde(flatten)]
    pub issue: Issue,
    pub resolving_time: Option<i64>,
    pub keywords: Vec<String>,
    pub comments: Vec<Comment>,
}

// ============================================================================
// Validation Helpers
// ============================================================================

pub fn validate_title(title: &str) -> Result<(), McpError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(McpError::TitleRequired);
    }
    if trimmed.len() > validation::MAX_TITLE_LENGTH {
        return Err(McpError::TitleTooLong {
            max: validation::MAX_TITLE_LENGTH,
            actual: trimmed.len(),
        });
    }
    Ok(())
}

/// Reject empty or oversized free text.
pub fn validate_text(field: &str, text: &str) -> Result<(), McpError> {
    if text.trim().is_empty() {
        return Err(McpError::ValidationFailed {
            field: field.to_string(),
            message: "must not be empty".to_string(),
        });
    }
    if text.len() > validation::MAX_TEXT_SIZE {
        return Err(McpError::TextTooLarge {
            max: validation::MAX_TEXT_SIZE,
            actual: text.len(),
        });
    }
    Ok(())
}

pub fn validate_optional_text(field: &str, text: &Option<String>) -> Result<(), McpError> {
    match text {
        Some(t) if !t.is_empty() => validate_text(field, t),
        _ => Ok(()),
    }
}

pub fn require_staff(user: &User) -> Result<(), McpError> {
    if !user.is_staff() {
        return Err(McpError::ValidationFailed {
            field: "staff".to_string(),
            message: format!("{} is not IT staff (role '{}')", user.username, user.role),
        });
    }
    Ok(())
}

/// Clamp pagination to the allowed range.
pub fn page_bounds(limit: Option<u32>, offset: Option<u32>) -> (usize, usize) {
    let limit = limit
        .map(|l| (l as usize).clamp(1, validation::MAX_LIMIT))
        .unwrap_or(validation::DEFAULT_LIMIT);
    (limit, offset.unwrap_or(0) as usize)
}
