// src/entity/comment.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A comment on an issue. Comments are append-only children; adding one
/// never changes the issue record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub issue_id: i64,
    pub user_id: i64,
    pub user_full_name: Option<String>,
    pub text: String,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewComment {
    pub issue_id: i64,
    pub user_id: i64,
    pub text: String,
    pub date: DateTime<Utc>,
}
