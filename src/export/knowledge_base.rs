// src/export/knowledge_base.rs
//! One markdown page per category of resolved issues

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::entity::{Issue, KnowledgeBaseArticle};
use crate::knowledge::articles_by_category;
use crate::Result;

use super::utils::{format_date, format_timestamp, slugify, write_export_file};
use super::{yaml_frontmatter, GeneratedFile};

#[derive(Serialize)]
struct CategoryFrontmatter<'a> {
    category: &'a str,
    resolved_issues: usize,
    articles: usize,
}

fn format_entry(issue: &Issue, articles: &[&KnowledgeBaseArticle]) -> String {
    let mut entry = format!("## #{} {}\n\n", issue.id, issue.title);

    if let Some(resolved) = &issue.date_resolved {
        entry.push_str(&format!("**Resolved:** {}\n\n", format_date(resolved)));
    }
    if !issue.description.is_empty() {
        entry.push_str(&format!("{}\n\n", issue.description));
    }
    if let Some(details) = &issue.resolution_details {
        entry.push_str(&format!("**Resolution:** {}\n\n", details));
    }

    for article in articles {
        entry.push_str(&format!("### {}\n\n", article.title));
        if !article.description.is_empty() {
            entry.push_str(&format!("{}\n\n", article.description));
        }
    }

    entry
}

fn generate_category(
    category: &str,
    issues: &[Issue],
    articles: &HashMap<i64, Vec<&KnowledgeBaseArticle>>,
    export_dir: &Path,
    now: &DateTime<Utc>,
) -> Result<GeneratedFile> {
    let article_count = issues
        .iter()
        .map(|i| articles.get(&i.id).map(Vec::len).unwrap_or(0))
        .sum();

    let mut content = yaml_frontmatter(&CategoryFrontmatter {
        category,
        resolved_issues: issues.len(),
        articles: article_count,
    })?;
    content.push('\n');
    content.push_str(&format!("# {}\n\n", category));

    for issue in issues {
        let published = articles.get(&issue.id).map(Vec::as_slice).unwrap_or(&[]);
        content.push_str(&format_entry(issue, published));
    }

    content.push_str("---\n\n");
    content.push_str(&format!("*Last updated: {}*\n", format_timestamp(now)));

    let relative_path = format!("knowledge-base/{}.md", slugify(category));
    write_export_file(&export_dir.join(&relative_path), &content)?;

    Ok(GeneratedFile {
        relative_path,
        entity_count: issues.len(),
    })
}

/// Generate knowledge-base pages, one per category with resolved issues
pub fn generate(
    issues: &[Issue],
    articles: &[KnowledgeBaseArticle],
    export_dir: &Path,
    now: &DateTime<Utc>,
) -> Result<Vec<GeneratedFile>> {
    let mut by_issue: HashMap<i64, Vec<&KnowledgeBaseArticle>> = HashMap::new();
    for article in articles {
        by_issue.entry(article.issue_id).or_default().push(article);
    }

    articles_by_category(issues, None)
        .iter()
        .map(|(category, resolved)| generate_category(category, resolved, &by_issue, export_dir, now))
        .collect()
}
