//! Core ledger logic - framework-agnostic habit tracking, points, milestones, rewards
//! and savings. Nothing in here performs I/O.

pub mod habit_log;
pub mod ledger;
pub mod milestone;
pub mod points;
pub mod reward;
pub mod savings;

pub use habit_log::{CravingLevel, HabitEvent, HabitLog, Intensity, Mood, Trigger};
pub use ledger::{
    EngagementCounters, LedgerEvent, LedgerSnapshot, ProgressLedger, UserProfile,
};
pub use milestone::{Milestone, MilestoneCounters, MilestoneEvaluator, MILESTONE_RULES};
pub use points::{Activity, PointReason, PointTransaction};
pub use reward::{Reward, RewardCatalog, RewardCategory, RewardId};
pub use savings::{Savings, SavingsEstimator, SavingsInputs};
