//! Reward catalog - rewards purchasable with points, plus filtering and search.
//!
//! Categories are derived from keywords in the reward title, first match wins:
//! "Theme"/"Color" then "Avatar" then "Pack"/"Premium", anything else is a feature.

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable reward identifier (a slug such as `custom-avatar`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RewardId(pub String);

impl RewardId {
    /// Creates an id from anything string-like.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RewardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A catalog entry. Whether a given user has unlocked it lives in their ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    /// Stable identifier
    pub id: RewardId,
    /// Display title (also drives the category)
    pub title: String,
    /// What the reward unlocks
    pub description: String,
    /// Points needed to unlock
    pub point_cost: i64,
    /// Icon identifier
    pub icon_name: String,
}

impl Reward {
    /// Category derived from the title.
    #[must_use]
    pub fn category(&self) -> RewardCategory {
        let title = self.title.as_str();
        if title.contains("Theme") || title.contains("Color") {
            RewardCategory::Themes
        } else if title.contains("Avatar") {
            RewardCategory::Avatars
        } else if title.contains("Pack") || title.contains("Premium") {
            RewardCategory::Boosters
        } else {
            RewardCategory::Features
        }
    }

    fn matches_search(&self, needle_lower: &str) -> bool {
        self.title.to_lowercase().contains(needle_lower)
            || self.description.to_lowercase().contains(needle_lower)
    }
}

/// Filter categories. `All` disables category filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewardCategory {
    /// No category filter
    All,
    /// Color themes
    Themes,
    /// Avatar options
    Avatars,
    /// Content packs and premium boosts
    Boosters,
    /// Everything else
    Features,
}

/// The set of rewards offered to users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardCatalog {
    rewards: Vec<Reward>,
}

impl RewardCatalog {
    /// Builds a catalog, rejecting negative costs and duplicate ids.
    pub fn new(rewards: Vec<Reward>) -> Result<Self> {
        for (index, reward) in rewards.iter().enumerate() {
            if reward.point_cost < 0 {
                return Err(Error::Config {
                    message: format!("Reward '{}' has a negative cost", reward.id),
                });
            }
            if rewards[..index].iter().any(|r| r.id == reward.id) {
                return Err(Error::Config {
                    message: format!("Duplicate reward id '{}'", reward.id),
                });
            }
        }
        Ok(Self { rewards })
    }

    /// All rewards in catalog order.
    #[must_use]
    pub fn rewards(&self) -> &[Reward] {
        &self.rewards
    }

    /// Looks up a reward by id.
    pub fn get(&self, id: &RewardId) -> Result<&Reward> {
        self.rewards
            .iter()
            .find(|r| &r.id == id)
            .ok_or_else(|| Error::NotFound {
                reward_id: id.to_string(),
            })
    }

    /// Filters this catalog. See [`filter`].
    #[must_use]
    pub fn filter(&self, category: RewardCategory, search_text: &str) -> Vec<&Reward> {
        filter(&self.rewards, category, search_text)
    }
}

impl Default for RewardCatalog {
    fn default() -> Self {
        Self {
            rewards: vec![
                Reward {
                    id: RewardId::new("custom-avatar"),
                    title: "Custom Avatar".to_string(),
                    description: "Unlock special avatar options".to_string(),
                    point_cost: 100,
                    icon_name: "person.crop.circle".to_string(),
                },
                Reward {
                    id: RewardId::new("theme-colors"),
                    title: "Theme Colors".to_string(),
                    description: "Unlock custom app color themes".to_string(),
                    point_cost: 250,
                    icon_name: "paintpalette".to_string(),
                },
                Reward {
                    id: RewardId::new("meditation-pack"),
                    title: "Meditation Pack".to_string(),
                    description: "Unlock premium guided meditations".to_string(),
                    point_cost: 500,
                    icon_name: "brain.head.profile".to_string(),
                },
            ],
        }
    }
}

/// Filters `rewards` by category and search text, combined with AND.
///
/// The category must match exactly unless it is [`RewardCategory::All`]. Search is
/// a case-insensitive substring match on title or description; empty text matches
/// everything.
#[must_use]
pub fn filter<'a>(
    rewards: &'a [Reward],
    category: RewardCategory,
    search_text: &str,
) -> Vec<&'a Reward> {
    let needle = search_text.to_lowercase();
    rewards
        .iter()
        .filter(|r| category == RewardCategory::All || r.category() == category)
        .filter(|r| needle.is_empty() || r.matches_search(&needle))
        .collect()
}
