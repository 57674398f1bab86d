// src/export/mod.rs
//! Markdown export
//!
//! Writes a browsable copy of the helpdesk: a README with the statistics
//! page, open and closed issue listings, and the knowledge base grouped by
//! category. The export is a derived view and is rebuilt from scratch each
//! time.

mod issues;
mod knowledge_base;
mod readme;
pub mod utils;

use std::path::Path;

use chrono::{DateTime, Utc};

use crate::stats::{Statistics, StatsOptions};
use crate::storage::{IssueRepository, SqliteStore};
use crate::Result;

pub use self::utils::slugify;

/// Directory name under `.helpdesk/`
pub const EXPORT_DIR: &str = "export";

/// Counts from one export run
#[derive(Debug, Default)]
pub struct ExportStats {
    pub open_issues: usize,
    pub closed_issues: usize,
    pub kb_categories: usize,
    pub files_generated: Vec<String>,
}

/// Result of generating a single export file
pub struct GeneratedFile {
    pub relative_path: String,
    pub entity_count: usize,
}

/// Generate the full export into `export_dir`, replacing any previous one.
pub fn generate_export(
    store: &SqliteStore,
    export_dir: &Path,
    now: &DateTime<Utc>,
    options: &StatsOptions,
) -> Result<ExportStats> {
    let issues = store.fetch_all_issues()?;
    let articles = store.list_articles()?;
    let statistics = Statistics::compute(&issues, now, options);

    let mut stats = ExportStats::default();
    utils::clear_export_dir(export_dir)?;

    for file in issues::generate(&issues, export_dir, now)? {
        if file.relative_path.ends_with("open.md") {
            stats.open_issues = file.entity_count;
        } else {
            stats.closed_issues = file.entity_count;
        }
        stats.files_generated.push(file.relative_path);
    }

    let kb_files = knowledge_base::generate(&issues, &articles, export_dir, now)?;
    stats.kb_categories = kb_files.len();
    stats
        .files_generated
        .extend(kb_files.into_iter().map(|f| f.relative_path));

    // README last so it can link everything above
    readme::generate(&statistics, &stats, options.window_days, export_dir, now)?;
    stats.files_generated.push("README.md".to_string());

    tracing::info!(
        files = stats.files_generated.len(),
        dir = %export_dir.display(),
        "exported helpdesk"
    );
    Ok(stats)
}

/// Generate a YAML frontmatter block
pub fn yaml_frontmatter<T: serde::Serialize>(data: &T) -> Result<String> {
    let yaml = serde_yaml::to_string(data)?;
    Ok(format!("---\n{}---\n", yaml))
}
