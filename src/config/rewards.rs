//! Reward catalog loading from rewards.toml
//!
//! The catalog of purchasable rewards can be customised with a TOML file. When the
//! file does not exist the built-in catalog is used.

use crate::{
    core::reward::{Reward, RewardCatalog, RewardId},
    errors::{Error, Result},
};
use serde::Deserialize;
use std::path::Path;

/// Structure of the whole rewards.toml file
#[derive(Debug, Deserialize)]
pub struct RewardsFile {
    /// Reward entries, in display order
    pub rewards: Vec<RewardConfig>,
}

/// One `[[rewards]]` entry
#[derive(Debug, Deserialize, Clone)]
pub struct RewardConfig {
    /// Stable id, referenced by users' unlocked rewards
    pub id: String,
    /// Display title
    pub title: String,
    /// What the reward unlocks
    pub description: String,
    /// Points needed to unlock
    pub point_cost: i64,
    /// Icon identifier
    #[serde(default = "default_icon")]
    pub icon_name: String,
}

fn default_icon() -> String {
    "gift".to_string()
}

impl From<RewardConfig> for Reward {
    fn from(config: RewardConfig) -> Self {
        Self {
            id: RewardId::new(config.id),
            title: config.title,
            description: config.description,
            point_cost: config.point_cost,
            icon_name: config.icon_name,
        }
    }
}

/// Parses a catalog from TOML text.
///
/// # Errors
/// Returns an error if the TOML is invalid, a field is missing, a cost is negative
/// or an id is repeated.
pub fn parse_catalog(contents: &str) -> Result<RewardCatalog> {
    let file: RewardsFile = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse rewards.toml: {e}"),
    })?;
    RewardCatalog::new(file.rewards.into_iter().map(Reward::from).collect())
}

/// Loads the catalog from `path`, or the built-in catalog if the file is absent.
///
/// # Errors
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<RewardCatalog> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::info!(?path, "No rewards file found, using built-in catalog");
        return Ok(RewardCatalog::default());
    }
    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read rewards file {}: {e}", path.display()),
    })?;
    let catalog = parse_catalog(&contents)?;
    tracing::info!(?path, rewards = catalog.rewards().len(), "Loaded reward catalog");
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::reward::RewardCategory;

    #[test]
    fn test_parse_reward_catalog() {
        let toml_str = r#"
            [[rewards]]
            id = "dark-theme"
            title = "Dark Theme"
            description = "A darker look"
            point_cost = 150
            icon_name = "moon"

            [[rewards]]
            id = "streak-freeze"
            title = "Streak Freeze"
            description = "Protect your streak for a day"
            point_cost = 300
        "#;

        let catalog = parse_catalog(toml_str).unwrap();
        assert_eq!(catalog.rewards().len(), 2);
        assert_eq!(catalog.rewards()[0].category(), RewardCategory::Themes);
        assert_eq!(catalog.rewards()[1].icon_name, "gift");
        assert_eq!(catalog.rewards()[1].point_cost, 300);
    }

    #[test]
    fn test_parse_rejects_negative_cost() {
        let toml_str = r#"
            [[rewards]]
            id = "bad"
            title = "Bad"
            description = "Negative"
            point_cost = -1
        "#;
        assert!(matches!(parse_catalog(toml_str), Err(Error::Config { .. })));
    }

    #[test]
    fn test_missing_file_falls_back_to_built_in() {
        let catalog = load_catalog("definitely/not/here/rewards.toml").unwrap();
        assert_eq!(catalog, RewardCatalog::default());
    }
}
