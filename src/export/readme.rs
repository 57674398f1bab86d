// src/export/readme.rs
//! README index with the statistics page

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::stats::Statistics;
use crate::Result;

use super::utils::{format_date, format_timestamp, table_cell, write_export_file};
use super::ExportStats;

fn count_table(heading: &str, label: &str, counts: &BTreeMap<String, usize>) -> String {
    let mut section = format!("### {}\n\n", heading);

    if counts.is_empty() {
        section.push_str("*None.*\n\n");
        return section;
    }

    section.push_str(&format!("| {} | Issues |\n", label));
    section.push_str("|------|--------|\n");
    for (key, count) in counts {
        section.push_str(&format!("| {} | {} |\n", table_cell(key), count));
    }
    section.push('\n');
    section
}

/// Generate README.md
pub fn generate(
    statistics: &Statistics,
    stats: &ExportStats,
    window_days: i64,
    export_dir: &Path,
    now: &DateTime<Utc>,
) -> Result<()> {
    let mut content = String::from("# Helpdesk\n\n");
    content.push_str("> Generated by helpdesk. Do not edit directly.\n\n");

    content.push_str("## Summary\n\n");
    content.push_str("| Type | Count |\n");
    content.push_str("|------|-------|\n");
    content.push_str(&format!("| Issues | {} |\n", statistics.total_issues));
    content.push_str(&format!("| Open | {} |\n", stats.open_issues));
    content.push_str(&format!("| Closed | {} |\n", stats.closed_issues));
    content.push_str(&format!("| Knowledge-base categories | {} |\n", stats.kb_categories));
    content.push('\n');

    if statistics.total_issues == 0 {
        content.push_str("*No issues yet. Use `helpdesk report` to file the first one.*\n\n");
    } else {
        content.push_str("## Statistics\n\n");
        content.push_str(&format!(
            "Average resolution time (last {} days): **{:.1} days**\n\n",
            window_days, statistics.average_resolution_time
        ));

        content.push_str(&count_table("By Category", "Category", &statistics.issues_per_category));
        content.push_str(&count_table("By State", "State", &statistics.issues_per_status));
        content.push_str(&count_table("By Staff", "Staff", &statistics.issues_per_staff));

        if !statistics.longest_unresolved.is_empty() {
            content.push_str("### Longest Unresolved\n\n");
            for issue in &statistics.longest_unresolved {
                content.push_str(&format!(
                    "- `#{}` **{}** `{}`  \n  _Reported {}_\n",
                    issue.id,
                    issue.title,
                    issue.state,
                    format_date(&issue.date_reported),
                ));
            }
            content.push('\n');
        }

        content.push_str("## Quick Links\n\n");
        content.push_str("- [Open issues](issues/open.md)\n");
        content.push_str("- [Closed issues](issues/closed.md)\n");
        for path in stats
            .files_generated
            .iter()
            .filter(|p| p.starts_with("knowledge-base/"))
        {
            content.push_str(&format!("- [{}]({})\n", path, path));
        }
        content.push('\n');
    }

    content.push_str("---\n\n");
    content.push_str(&format!("*Generated: {}*\n", format_timestamp(now)));

    write_export_file(&export_dir.join("README.md"), &content)
}
