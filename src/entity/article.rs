// src/entity/article.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A published writeup derived from a resolved issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeBaseArticle {
    pub id: i64,
    pub issue_id: i64,
    pub issue_title: String,
    pub issue_description: String,
    pub title: String,
    pub description: String,
    pub resolution_details: Option<String>,
    pub date_resolved: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewArticle {
    pub issue_id: i64,
    pub title: String,
    pub description: String,
    pub resolution_details: Option<String>,
    pub date_resolved: Option<DateTime<Utc>>,
}
