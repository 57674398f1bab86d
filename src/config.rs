use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{HelpdeskError, Result};
use crate::lifecycle::TransitionPolicy;
use crate::stats::{
    StatsOptions, UnresolvedRanking, MAX_RESOLUTION_WINDOW_DAYS, RESOLUTION_WINDOW_DAYS,
    TOP_UNRESOLVED_LIMIT,
};

pub const CONFIG_FILE: &str = "config.yaml";

/// Project configuration, read from `.helpdesk/config.yaml`.
///
/// Every field is optional in the file; missing ones take the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HelpdeskConfig {
    pub transition_policy: TransitionPolicy,
    pub unresolved_ranking: UnresolvedRanking,
    pub top_unresolved_limit: usize,
    pub resolution_window_days: i64,
}

impl Default for HelpdeskConfig {
    fn default() -> Self {
        Self {
            transition_policy: TransitionPolicy::default(),
            unresolved_ranking: UnresolvedRanking::default(),
            top_unresolved_limit: TOP_UNRESOLVED_LIMIT,
            resolution_window_days: RESOLUTION_WINDOW_DAYS,
        }
    }
}

impl HelpdeskConfig {
    /// Load the config from a helpdesk directory. A missing file yields the
    /// defaults.
    pub fn load(helpdesk_dir: &Path) -> Result<Self> {
        let path = helpdesk_dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Self = serde_yaml::from_str(&content)
            .map_err(|e| HelpdeskError::Config(format!("{}: {}", path.display(), e)))?;

        if !(0..=MAX_RESOLUTION_WINDOW_DAYS).contains(&config.resolution_window_days) {
            return Err(HelpdeskError::Config(format!(
                "resolution_window_days must be between 0 and {}",
                MAX_RESOLUTION_WINDOW_DAYS
            )));
        }

        tracing::debug!(?config, "loaded config");
        Ok(config)
    }

    /// Write the config, used by `init` to leave an editable file behind.
    pub fn save(&self, helpdesk_dir: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        fs::write(helpdesk_dir.join(CONFIG_FILE), yaml)?;
        Ok(())
    }

    pub fn stats_options(&self) -> StatsOptions {
        StatsOptions {
            window_days: self.resolution_window_days,
            top_limit: self.top_unresolved_limit,
            ranking: self.unresolved_ranking,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = HelpdeskConfig::default();
        assert_eq!(config.transition_policy, TransitionPolicy::Permissive);
        assert_eq!(config.unresolved_ranking, UnresolvedRanking::MostRecentFirst);
        assert_eq!(config.top_unresolved_limit, 5);
        assert_eq!(config.resolution_window_days, 30);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = HelpdeskConfig::load(tmp.path()).unwrap();
        assert_eq!(config, HelpdeskConfig::default());
    }

    #[test]
    fn test_partial_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE),
            "transition_policy: strict\nunresolved_ranking: oldest_first\n",
        )
        .unwrap();

        let config = HelpdeskConfig::load(tmp.path()).unwrap();
        assert_eq!(config.transition_policy, TransitionPolicy::Strict);
        assert_eq!(config.unresolved_ranking, UnresolvedRanking::OldestFirst);
        assert_eq!(config.top_unresolved_limit, 5);

        let options = config.stats_options();
        assert_eq!(options.ranking, UnresolvedRanking::OldestFirst);
        assert_eq!(options.window_days, 30);
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "transition_policy: sometimes\n").unwrap();

        let result = HelpdeskConfig::load(tmp.path());
        assert!(matches!(result, Err(HelpdeskError::Config(_))));
    }

    #[test]
    fn test_window_days_out_of_range() {
        let tmp = TempDir::new().unwrap();
        for value in ["-1", "9223372036854775807"] {
            fs::write(
                tmp.path().join(CONFIG_FILE),
                format!("resolution_window_days: {}\n", value),
            )
            .unwrap();
            let result = HelpdeskConfig::load(tmp.path());
            assert!(matches!(result, Err(HelpdeskError::Config(_))));
        }

        fs::write(
            tmp.path().join(CONFIG_FILE),
            format!("resolution_window_days: {}\n", MAX_RESOLUTION_WINDOW_DAYS),
        )
        .unwrap();
        let config = HelpdeskConfig::load(tmp.path()).unwrap();
        assert_eq!(config.resolution_window_days, MAX_RESOLUTION_WINDOW_DAYS);
    }

    #[test]
    fn test_save_then_load() {
        let tmp = TempDir::new().unwrap();
        let config = HelpdeskConfig {
            top_unresolved_limit: 10,
            ..HelpdeskConfig::default()
        };
        config.save(tmp.path()).unwrap();
        assert_eq!(HelpdeskConfig::load(tmp.path()).unwrap(), config);
    }
}
