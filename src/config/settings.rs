//! Application settings from environment variables.
//!
//! Everything has a sensible default so the binary runs with an empty environment.
//! Values are usually supplied through a `.env` file loaded at startup.

use std::path::PathBuf;

/// Default directory for uploaded blobs
pub const DEFAULT_BLOB_ROOT: &str = "data/blobs";
/// Default reward catalog file
pub const DEFAULT_REWARDS_CONFIG: &str = "rewards.toml";

/// Runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Database connection URL (`DATABASE_URL`)
    pub database_url: String,
    /// Root directory for the local blob store (`BLOB_ROOT`)
    pub blob_root: PathBuf,
    /// Reward catalog file (`REWARDS_CONFIG`)
    pub rewards_config: PathBuf,
    /// Signed-in user, if any (`REGRETLESS_USER_ID`)
    pub user_id: Option<String>,
}

impl Settings {
    /// Reads settings from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`, which returns the value for a key if set.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            database_url: non_empty("DATABASE_URL")
                .unwrap_or_else(|| super::database::DEFAULT_DATABASE_URL.to_string()),
            blob_root: non_empty("BLOB_ROOT")
                .map_or_else(|| PathBuf::from(DEFAULT_BLOB_ROOT), PathBuf::from),
            rewards_config: non_empty("REWARDS_CONFIG")
                .map_or_else(|| PathBuf::from(DEFAULT_REWARDS_CONFIG), PathBuf::from),
            user_id: non_empty("REGRETLESS_USER_ID"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_when_unset() {
        let settings = Settings::from_lookup(|_| None);
        assert_eq!(
            settings.database_url,
            super::super::database::DEFAULT_DATABASE_URL
        );
        assert_eq!(settings.blob_root, PathBuf::from(DEFAULT_BLOB_ROOT));
        assert_eq!(settings.user_id, None);
    }

    #[test]
    fn test_values_from_environment() {
        let env: HashMap<&str, &str> = [
            ("DATABASE_URL", "sqlite::memory:"),
            ("BLOB_ROOT", "/tmp/blobs"),
            ("REGRETLESS_USER_ID", "user-42"),
            ("REWARDS_CONFIG", "  "),
        ]
        .into_iter()
        .collect();
        let settings = Settings::from_lookup(|key| env.get(key).map(ToString::to_string));

        assert_eq!(settings.database_url, "sqlite::memory:");
        assert_eq!(settings.blob_root, PathBuf::from("/tmp/blobs"));
        assert_eq!(settings.user_id.as_deref(), Some("user-42"));
        assert_eq!(settings.rewards_config, PathBuf::from(DEFAULT_REWARDS_CONFIG));
    }
}
