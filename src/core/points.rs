//! Point transactions and the activity award table.
//!
//! Every change to a user's balance is a [`PointTransaction`]: positive amounts are
//! awards, negative amounts are spends. [`Activity`] maps the things a user can do
//! in the app to a fixed award.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Why a transaction happened. Serialized with the stored reason labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointReason {
    /// A session was tracked
    #[serde(rename = "Session Logged")]
    SessionLogged,
    /// A daily streak was kept
    #[serde(rename = "Daily Streak")]
    DailyStreak,
    /// A streak milestone was reached
    #[serde(rename = "Streak Milestone")]
    StreakMilestone,
    /// A daily goal was met
    #[serde(rename = "Goal Completed")]
    GoalCompleted,
    /// A story was posted to the community
    #[serde(rename = "Story Shared")]
    StoryShared,
    /// Likes, comments and other community actions
    #[serde(rename = "Community Engagement")]
    CommunityEngagement,
    /// Bonus for earning a milestone
    #[serde(rename = "Achievement Unlocked")]
    AchievementUnlocked,
    /// Points spent on a reward
    #[serde(rename = "Reward Purchased")]
    RewardPurchased,
    /// Exercises, reading and other in-app tools
    #[serde(rename = "App Usage")]
    AppUsage,
    /// Balance carried over from history recorded without transactions
    #[serde(rename = "Opening Balance")]
    OpeningBalance,
}

impl PointReason {
    /// Description used when the caller does not supply one.
    #[must_use]
    pub const fn default_description(self) -> &'static str {
        match self {
            Self::SessionLogged => "Logged a vaping session",
            Self::DailyStreak => "Daily streak maintained",
            Self::StreakMilestone => "Reached a streak milestone",
            Self::GoalCompleted => "Completed a daily goal",
            Self::StoryShared => "Shared a story with the community",
            Self::CommunityEngagement => "Engaged with the community",
            Self::AchievementUnlocked => "Unlocked an achievement",
            Self::RewardPurchased => "Purchased a reward",
            Self::AppUsage => "Used the app features",
            Self::OpeningBalance => "Balance carried over",
        }
    }
}

/// One delta to a point balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointTransaction {
    /// Unique identifier
    pub id: Uuid,
    /// When the transaction was recorded
    pub timestamp: DateTime<Utc>,
    /// Signed amount (positive = award, negative = spend)
    pub amount: i64,
    /// Category of the change
    pub reason: PointReason,
    /// Human-readable description
    pub description: String,
}

impl PointTransaction {
    /// Creates a transaction stamped at `timestamp` with a fresh id.
    #[must_use]
    pub fn new(
        timestamp: DateTime<Utc>,
        amount: i64,
        reason: PointReason,
        description: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            amount,
            reason,
            description: description
                .unwrap_or_else(|| reason.default_description().to_string()),
        }
    }
}

/// Things a user can do that earn points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Activity {
    /// Tracked a session
    SessionLogged,
    /// Posted a story
    StoryShared,
    /// Liked a story or comment
    StoryLiked,
    /// Commented on a story
    CommentPosted,
    /// Read an educational article
    ContentRead,
    /// Finished a breathing exercise
    BreathingExercise,
    /// Finished a distraction game
    DistractionGame,
    /// Wrote a gratitude journal entry
    GratitudeJournal,
    /// Took a five-minute break
    MindfulBreak,
    /// Read affirmations
    Affirmations,
}

impl Activity {
    /// Points awarded for this activity.
    #[must_use]
    pub const fn points(self) -> i64 {
        match self {
            Self::SessionLogged | Self::StoryLiked => 5,
            Self::CommentPosted | Self::ContentRead | Self::Affirmations => 10,
            Self::BreathingExercise | Self::GratitudeJournal | Self::MindfulBreak => 15,
            Self::DistractionGame => 20,
            Self::StoryShared => 25,
        }
    }

    /// Transaction reason recorded for this activity.
    #[must_use]
    pub const fn reason(self) -> PointReason {
        match self {
            Self::SessionLogged => PointReason::SessionLogged,
            Self::StoryShared => PointReason::StoryShared,
            Self::StoryLiked | Self::CommentPosted => PointReason::CommunityEngagement,
            Self::ContentRead
            | Self::BreathingExercise
            | Self::DistractionGame
            | Self::GratitudeJournal
            | Self::MindfulBreak
            | Self::Affirmations => PointReason::AppUsage,
        }
    }

    /// Transaction description recorded for this activity.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::SessionLogged => "Tracking a session",
            Self::StoryShared => "Sharing your story",
            Self::StoryLiked => "Engaging with the community",
            Self::CommentPosted => "Commenting on a story",
            Self::ContentRead => "Learning about vaping",
            Self::BreathingExercise => "Completing a breathing exercise",
            Self::DistractionGame => "Completing a distraction game",
            Self::GratitudeJournal => "Completing a gratitude journal entry",
            Self::MindfulBreak => "Taking a 5-minute break",
            Self::Affirmations => "Reading affirmations",
        }
    }
}
