// src/entity/lookup.rs
//! Flat reference records keyed by an integer id.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// A row of the state reference table. Issues carry their state as an
/// [`IssueState`](super::IssueState) label; this table lists the labels
/// offered to staff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyword {
    pub id: i64,
    pub name: String,
}

/// A keyword attached to an issue (denormalized with the keyword text).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueKeyword {
    pub id: i64,
    pub issue_id: i64,
    pub keyword_id: i64,
    pub keyword: String,
}
