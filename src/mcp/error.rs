//! MCP-specific error types and mapping to JSON-RPC error codes.

use crate::error::HelpdeskError;
use rmcp::model::ErrorCode;
use rmcp::ErrorData as RmcpError;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

/// Custom MCP error codes (in the -32000 to -32099 range for server errors)
pub mod error_codes {
    pub const NOT_FOUND: i32 = -32001;
    pub const INVALID_TRANSITION: i32 = -32002;
    pub const VALIDATION_FAILED: i32 = -32003;
    pub const RESOURCE_NOT_FOUND: i32 = -32005;
    pub const INVALID_RESOURCE_URI: i32 = -32006;
    pub const STORAGE_ERROR: i32 = -32010;
    pub const INTERNAL_ERROR: i32 = -32011;
}

/// MCP-specific error types with detailed context.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum McpError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: String, id: String },

    #[error("Cannot {action} an issue in state '{from}'")]
    InvalidTransition { from: String, action: String },

    #[error("Validation failed for field '{field}': {message}")]
    ValidationFailed { field: String, message: String },

    #[error("Title is required")]
    TitleRequired,

    #[error("Title too long: {actual} characters (max {max})")]
    TitleTooLong { max: usize, actual: usize },

    #[error("Text too large: {actual} bytes (max {max})")]
    TextTooLarge { max: usize, actual: usize },

    #[error("Resource not found: {uri}")]
    ResourceNotFound { uri: String },

    #[error("Invalid resource URI: {uri}")]
    InvalidResourceUri { uri: String },

    #[error("Storage error: {message}")]
    StorageError { message: String },

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

impl McpError {
    /// Get the JSON-RPC error code for this error type.
    pub fn error_code(&self) -> i32 {
        match self {
            McpError::NotFound { .. } => error_codes::NOT_FOUND,
            McpError::InvalidTransition { .. } => error_codes::INVALID_TRANSITION,
            McpError::ValidationFailed { .. }
            | McpError::TitleRequired
            | McpError::TitleTooLong { .. }
            | McpError::TextTooLarge { .. } => error_codes::VALIDATION_FAILED,
            McpError::ResourceNotFound { .. } => error_codes::RESOURCE_NOT_FOUND,
            McpError::InvalidResourceUri { .. } => error_codes::INVALID_RESOURCE_URI,
            McpError::StorageError { .. } => error_codes::STORAGE_ERROR,
            McpError::InternalError { .. } => error_codes::INTERNAL_ERROR,
        }
    }

    /// Get the error type name for the data payload.
    pub fn error_type(&self) -> &'static str {
        match self {
            McpError::NotFound { .. } => "NotFound",
            McpError::InvalidTransition { .. } => "InvalidTransition",
            McpError::ValidationFailed { .. } => "ValidationFailed",
            McpError::TitleRequired => "TitleRequired",
            McpError::TitleTooLong { .. } => "TitleTooLong",
            McpError::TextTooLarge { .. } => "TextTooLarge",
            McpError::ResourceNotFound { .. } => "ResourceNotFound",
            McpError::InvalidResourceUri { .. } => "InvalidResourceUri",
            McpError::StorageError { .. } => "StorageError",
            McpError::InternalError { .. } => "InternalError",
        }
    }

    /// Convert to rmcp ErrorData for JSON-RPC response.
    pub fn to_rmcp_error(&self) -> RmcpError {
        RmcpError {
            code: ErrorCode(self.error_code()),
            message: self.to_string().into(),
            data: Some(json!({
                "error_type": self.error_type(),
                "details": self.clone()
            })),
        }
    }
}

impl From<McpError> for RmcpError {
    fn from(err: McpError) -> Self {
        err.to_rmcp_error()
    }
}

impl From<HelpdeskError> for McpError {
    fn from(err: HelpdeskError) -> Self {
        match err {
            HelpdeskError::NotFound { kind, id } => McpError::NotFound {
                kind: kind.to_string(),
                id,
            },
            HelpdeskError::InvalidTransition { from, action } => McpError::InvalidTransition {
                from,
                action: action.to_string(),
            },
            HelpdeskError::Validation(message) => McpError::ValidationFailed {
                field: "request".to_string(),
                message,
            },
            HelpdeskError::NotInitialized | HelpdeskError::AlreadyInitialized => {
                McpError::StorageError {
                    message: err.to_string(),
                }
            }
            HelpdeskError::Storage(message) => McpError::StorageError { message },
            HelpdeskError::Io(e) => McpError::StorageError {
                message: format!("IO error: {}", e),
            },
            HelpdeskError::Config(message) | HelpdeskError::Server(message) => {
                McpError::InternalError { message }
            }
            HelpdeskError::Json(e) => McpError::InternalError {
                message: format!("JSON error: {}", e),
            },
            HelpdeskError::Yaml(e) => McpError::InternalError {
                message: format!("YAML error: {}", e),
            },
        }
    }
}

impl From<HelpdeskError> for RmcpError {
    fn from(err: HelpdeskError) -> Self {
        McpError::from(err).to_rmcp_error()
    }
}

/// Validation constants.
pub mod validation {
    pub const MAX_TITLE_LENGTH: usize = 500;
    pub const MAX_TEXT_SIZE: usize = 102_400; // 100KB
    pub const DEFAULT_LIMIT: usize = 50;
    pub const MAX_LIMIT: usize = 100;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_mapping() {
        let err = McpError::NotFound {
            kind: "Issue".to_string(),
            id: "7".to_string(),
        };
        assert_eq!(err.error_code(), error_codes::NOT_FOUND);

        let err = McpError::ValidationFailed {
            field: "title".to_string(),
            message: "too short".to_string(),
        };
        assert_eq!(err.error_code(), error_codes::VALIDATION_FAILED);
    }

    #[test]
    fn test_from_helpdesk_error() {
        let mcp_err: McpError = HelpdeskError::not_found("Issue", 7).into();
        assert!(matches!(mcp_err, McpError::NotFound { ref id, .. } if id == "7"));
        assert_eq!(mcp_err.to_string(), "Issue not found: 7");

        let mcp_err: McpError = HelpdeskError::InvalidTransition {
            from: "New".to_string(),
            action: "finalize",
        }
        .into();
        assert_eq!(mcp_err.error_code(), error_codes::INVALID_TRANSITION);
    }

    #[test]
    fn test_to_rmcp_error() {
        let err = McpError::TitleRequired;
        let rmcp_err = err.to_rmcp_error();
        assert_eq!(rmcp_err.code, ErrorCode(error_codes::VALIDATION_FAILED));
        assert!(rmcp_err.message.contains("Title is required"));
    }
}
