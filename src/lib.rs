pub mod cli;
pub mod config;
pub mod entity;
pub mod error;
pub mod export;
pub mod knowledge;
pub mod lifecycle;
pub mod mcp;
pub mod resolution;
pub mod search;
pub mod stats;
pub mod storage;

pub use error::{HelpdeskError, Result};
pub use mcp::HelpdeskServer;
pub use storage::{IssueRepository, SqliteStore};
