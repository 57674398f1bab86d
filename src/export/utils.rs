// src/export/utils.rs
//! Helpers shared by the export writers

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::Result;

/// Convert a title to a file-name-safe slug
///
/// - Converts to lowercase
/// - Replaces spaces and special chars with hyphens
/// - Collapses consecutive hyphens
/// - Trims leading/trailing hyphens
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_was_hyphen = true; // trims leading hyphens

    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }

    if slug.ends_with('-') {
        slug.pop();
    }

    if slug.is_empty() {
        slug = "uncategorized".to_string();
    }

    slug
}

/// Remove a previous export so stale files do not linger
pub fn clear_export_dir(export_dir: &Path) -> Result<()> {
    if export_dir.exists() {
        fs::remove_dir_all(export_dir)?;
    }
    Ok(())
}

/// Write content to a file, creating parent directories if needed
pub fn write_export_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}

/// Format a DateTime as YYYY-MM-DD
pub fn format_date(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d").to_string()
}

/// Format a DateTime as a full timestamp for footers
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Escape pipes so free text does not break a markdown table row
pub fn table_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Network"), "network");
        assert_eq!(slugify("Email & Calendar"), "email-calendar");
    }

    #[test]
    fn test_slugify_consecutive_specials() {
        assert_eq!(slugify("VPN   / Remote"), "vpn-remote");
        assert_eq!(slugify("---printers---"), "printers");
    }

    #[test]
    fn test_slugify_empty() {
        assert_eq!(slugify(""), "uncategorized");
        assert_eq!(slugify("日本語"), "uncategorized");
    }

    #[test]
    fn test_table_cell_escapes() {
        assert_eq!(table_cell("a|b\nc"), "a\\|b c");
    }

    #[test]
    fn test_write_creates_parents() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("a/b/c.md");
        write_export_file(&path, "hello").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "hello");
    }

    #[test]
    fn test_clear_missing_dir_is_ok() {
        let tmp = TempDir::new().unwrap();
        clear_export_dir(&tmp.path().join("nope")).unwrap();
    }
}
