//! Milestone evaluation.
//!
//! A fixed table of threshold rules decides which achievements a user has newly
//! earned. Evaluation is pure: it reads a snapshot of counters plus the titles
//! already earned and returns fresh [`Milestone`] values without touching either.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// An earned achievement. Titles are unique within one user's milestone list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    /// Unique identifier
    pub id: Uuid,
    /// Title, also the uniqueness key
    pub title: String,
    /// What was achieved
    pub description: String,
    /// Bonus points attached to the milestone
    pub points_awarded: i64,
    /// When it was earned
    pub date_achieved: DateTime<Utc>,
    /// Icon identifier
    pub icon_name: String,
}

/// Counter a rule is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    /// Total tracked sessions
    EventCount,
    /// Current clean streak in days
    StreakDays,
    /// Current point balance
    PointBalance,
    /// Comments posted
    CommentCount,
    /// Likes given
    LikeCount,
}

/// Snapshot of the counters the rule table looks at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MilestoneCounters {
    /// Total tracked sessions
    pub event_count: u64,
    /// Current clean streak in days
    pub streak_days: u32,
    /// Current point balance
    pub point_balance: i64,
    /// Comments posted
    pub comment_count: u64,
    /// Likes given
    pub like_count: u64,
}

impl MilestoneCounters {
    fn value(&self, counter: Counter) -> i64 {
        let wide = |v: u64| i64::try_from(v).unwrap_or(i64::MAX);
        match counter {
            Counter::EventCount => wide(self.event_count),
            Counter::StreakDays => i64::from(self.streak_days),
            Counter::PointBalance => self.point_balance,
            Counter::CommentCount => wide(self.comment_count),
            Counter::LikeCount => wide(self.like_count),
        }
    }
}

/// One threshold rule: `counter >= threshold` earns the milestone once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MilestoneRule {
    /// Milestone title (uniqueness key)
    pub title: &'static str,
    /// Milestone description
    pub description: &'static str,
    /// Counter the rule reads
    pub counter: Counter,
    /// Inclusive threshold
    pub threshold: i64,
    /// Bonus points
    pub points: i64,
    /// Icon identifier
    pub icon_name: &'static str,
}

impl MilestoneRule {
    /// Whether the counters satisfy this rule.
    #[must_use]
    pub fn is_met(&self, counters: &MilestoneCounters) -> bool {
        counters.value(self.counter) >= self.threshold
    }

    fn award(&self, now: DateTime<Utc>) -> Milestone {
        Milestone {
            id: Uuid::new_v4(),
            title: self.title.to_string(),
            description: self.description.to_string(),
            points_awarded: self.points,
            date_achieved: now,
            icon_name: self.icon_name.to_string(),
        }
    }
}

/// The full rule table.
pub const MILESTONE_RULES: [MilestoneRule; 8] = [
    MilestoneRule {
        title: "Track 5 Sessions",
        description: "Log 5 vaping sessions in the tracking tool",
        counter: Counter::EventCount,
        threshold: 5,
        points: 50,
        icon_name: "doc.text.magnifyingglass",
    },
    MilestoneRule {
        title: "Track 20 Sessions",
        description: "Log 20 vaping sessions in the tracking tool",
        counter: Counter::EventCount,
        threshold: 20,
        points: 100,
        icon_name: "doc.text.magnifyingglass",
    },
    MilestoneRule {
        title: "3-Day Streak",
        description: "Stay vape-free for 3 days in a row",
        counter: Counter::StreakDays,
        threshold: 3,
        points: 75,
        icon_name: "calendar.badge.clock",
    },
    MilestoneRule {
        title: "Weekly Streak",
        description: "Stay vape-free for 7 consecutive days",
        counter: Counter::StreakDays,
        threshold: 7,
        points: 150,
        icon_name: "calendar",
    },
    MilestoneRule {
        title: "Century Club",
        description: "Earn 100 points in the app",
        counter: Counter::PointBalance,
        threshold: 100,
        points: 50,
        icon_name: "star.circle.fill",
    },
    MilestoneRule {
        title: "High Achiever",
        description: "Earn 500 points in the app",
        counter: Counter::PointBalance,
        threshold: 500,
        points: 100,
        icon_name: "star.circle.fill",
    },
    MilestoneRule {
        title: "Supportive Friend",
        description: "Comment on 5 peer stories",
        counter: Counter::CommentCount,
        threshold: 5,
        points: 75,
        icon_name: "bubble.left.fill",
    },
    MilestoneRule {
        title: "Community Supporter",
        description: "Like 10 peer stories or comments",
        counter: Counter::LikeCount,
        threshold: 10,
        points: 50,
        icon_name: "hand.thumbsup.fill",
    },
];

/// Stateless evaluator over [`MILESTONE_RULES`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MilestoneEvaluator;

impl MilestoneEvaluator {
    /// Returns one milestone, dated `now`, for every rule that is met and whose
    /// title is not in `already_earned`. Rules are independent; several may fire
    /// in a single call. Table order is preserved.
    #[must_use]
    pub fn evaluate(
        counters: &MilestoneCounters,
        already_earned: &HashSet<String>,
        now: DateTime<Utc>,
    ) -> Vec<Milestone> {
        let earned: Vec<Milestone> = MILESTONE_RULES
            .iter()
            .filter(|rule| rule.is_met(counters) && !already_earned.contains(rule.title))
            .map(|rule| rule.award(now))
            .collect();

        tracing::debug!(
            ?counters,
            newly_earned = earned.len(),
            "Evaluated milestone rules"
        );
        earned
    }
}
