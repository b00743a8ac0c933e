//! Progress ledger - the authoritative record of one user's points and progress.
//!
//! All balance changes go through the ledger and each one is recorded as a
//! [`PointTransaction`], milestone bonuses included, so the balance always equals
//! the sum of the transaction history. After every award or logged session the
//! milestone rules are evaluated once and any newly earned milestones are appended
//! and paid out.
//!
//! The ledger performs no I/O. Changes that need persisting are queued as
//! [`LedgerEvent`]s and handed to the caller through [`ProgressLedger::drain_events`].

use crate::{
    core::{
        habit_log::{HabitEvent, HabitLog},
        milestone::{Milestone, MilestoneCounters, MilestoneEvaluator},
        points::{Activity, PointReason, PointTransaction},
        reward::{Reward, RewardCatalog, RewardId},
        savings::{Savings, SavingsEstimator, SavingsInputs},
    },
    errors::{Error, Result},
};
use chrono::{DateTime, Days, NaiveDate, Utc};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Default number of sessions a user aims to stay under each day
pub const DEFAULT_DAILY_GOAL: u32 = 10;

/// Profile data the ledger needs for goals and savings.
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    /// Backend user id
    pub user_id: String,
    /// Display name
    pub username: String,
    /// When the user joined
    pub join_date: DateTime<Utc>,
    /// Weekly spending before cutting down
    pub weekly_spending: Option<f64>,
    /// Original sessions per active day
    pub daily_frequency: Option<u32>,
    /// Original active days per week
    pub days_per_week: Option<u32>,
    /// Start of the cessation plan
    pub plan_start: Option<DateTime<Utc>>,
    /// Maximum sessions per day the user is aiming for
    pub daily_goal: u32,
}

impl UserProfile {
    /// Profile with no spending baseline and the default daily goal.
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        username: impl Into<String>,
        join_date: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
            join_date,
            weekly_spending: None,
            daily_frequency: None,
            days_per_week: None,
            plan_start: None,
            daily_goal: DEFAULT_DAILY_GOAL,
        }
    }
}

/// Community engagement tallies used by the engagement milestones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngagementCounters {
    /// Comments posted
    pub comments: u64,
    /// Likes given
    pub likes: u64,
    /// Stories shared
    pub stories: u64,
}

/// A change the ledger made that the surrounding layers may want to persist or
/// show to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerEvent {
    /// A transaction was appended to the history
    TransactionRecorded(PointTransaction),
    /// A milestone was earned
    MilestoneEarned(Milestone),
    /// A reward moved from locked to unlocked
    RewardUnlocked {
        /// The reward
        reward_id: RewardId,
        /// Points paid
        cost: i64,
    },
    /// A session was logged
    SessionLogged(HabitEvent),
    /// The daily goal changed
    DailyGoalUpdated {
        /// New goal
        goal: u32,
    },
}

/// Everything needed to rebuild a ledger from storage.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerSnapshot {
    /// Profile data
    pub profile: UserProfile,
    /// Balance as last stored by the backend
    pub stored_balance: i64,
    /// Transaction history, any order
    pub transactions: Vec<PointTransaction>,
    /// Earned milestones, in earn order
    pub milestones: Vec<Milestone>,
    /// Unlocked reward ids, in unlock order
    pub unlocked_rewards: Vec<RewardId>,
    /// Logged sessions, in log order
    pub events: Vec<HabitEvent>,
    /// Engagement tallies
    pub engagement: EngagementCounters,
}

/// Points, milestones, unlocked rewards and session history for one user.
#[derive(Debug, Clone)]
pub struct ProgressLedger {
    profile: UserProfile,
    balance: i64,
    transactions: Vec<PointTransaction>,
    milestones: Vec<Milestone>,
    earned_titles: HashSet<String>,
    unlocked_rewards: Vec<RewardId>,
    habit_log: HabitLog,
    engagement: EngagementCounters,
    streak_days: u32,
    daily_count: usize,
    weekly_count: usize,
    pending: Vec<LedgerEvent>,
}

impl ProgressLedger {
    /// Creates an empty ledger for a new user.
    #[must_use]
    pub fn new(profile: UserProfile) -> Self {
        let mut ledger = Self {
            profile,
            balance: 0,
            transactions: Vec::new(),
            milestones: Vec::new(),
            earned_titles: HashSet::new(),
            unlocked_rewards: Vec::new(),
            habit_log: HabitLog::new(),
            engagement: EngagementCounters::default(),
            streak_days: 0,
            daily_count: 0,
            weekly_count: 0,
            pending: Vec::new(),
        };
        ledger.refresh_counters(Utc::now().date_naive());
        ledger
    }

    /// Rebuilds a ledger from stored state.
    ///
    /// Transactions are sorted oldest first and their sum is the balance. If the
    /// stored balance is higher (older data paid milestone bonuses without
    /// recording a transaction), the difference is booked as an opening-balance
    /// transaction dated at the join date and queued for persistence. A lower
    /// stored balance is a stale total and is ignored. Duplicate milestone titles
    /// keep their first occurrence.
    #[must_use]
    pub fn restore(snapshot: LedgerSnapshot) -> Self {
        let LedgerSnapshot {
            profile,
            stored_balance,
            mut transactions,
            milestones: stored_milestones,
            unlocked_rewards: stored_unlocked,
            events,
            engagement,
        } = snapshot;

        transactions.sort_by_key(|t| t.timestamp);

        let mut earned_titles = HashSet::new();
        let mut milestones = Vec::with_capacity(stored_milestones.len());
        for milestone in stored_milestones {
            if earned_titles.insert(milestone.title.clone()) {
                milestones.push(milestone);
            } else {
                warn!(title = %milestone.title, "Dropping duplicate milestone from storage");
            }
        }

        let mut unlocked_rewards: Vec<RewardId> = Vec::with_capacity(stored_unlocked.len());
        for id in stored_unlocked {
            if !unlocked_rewards.contains(&id) {
                unlocked_rewards.push(id);
            }
        }

        let mut habit_log = HabitLog::new();
        for event in events {
            habit_log.append(event);
        }

        let mut ledger = Self {
            balance: transactions.iter().map(|t| t.amount).sum(),
            profile,
            transactions,
            milestones,
            earned_titles,
            unlocked_rewards,
            habit_log,
            engagement,
            streak_days: 0,
            daily_count: 0,
            weekly_count: 0,
            pending: Vec::new(),
        };

        let difference = stored_balance - ledger.balance;
        if difference < 0 {
            // The history is authoritative; the stored total is stale.
            warn!(
                user_id = %ledger.profile.user_id,
                stored_balance,
                transaction_sum = ledger.balance,
                "Stored balance is behind transaction history, keeping history"
            );
        } else if difference > 0 {
            warn!(
                user_id = %ledger.profile.user_id,
                stored_balance,
                transaction_sum = ledger.balance,
                "Stored balance exceeds transaction history, booking opening balance"
            );
            let opening = PointTransaction::new(
                ledger.profile.join_date,
                difference,
                PointReason::OpeningBalance,
                None,
            );
            ledger.record(opening);
            ledger.transactions.sort_by_key(|t| t.timestamp);
        }

        ledger.refresh_counters(Utc::now().date_naive());
        ledger
    }

    /// Awards `amount` points, then pays out any milestones that became earned.
    ///
    /// Returns the newly earned milestones (possibly empty).
    ///
    /// # Errors
    /// `InvalidAmount` if `amount` is zero or negative; nothing changes.
    pub fn award_points(
        &mut self,
        amount: i64,
        reason: PointReason,
        description: Option<String>,
    ) -> Result<Vec<Milestone>> {
        if amount <= 0 {
            return Err(Error::InvalidAmount { amount });
        }
        let now = Utc::now();
        self.credit(amount, reason, description, now);
        Ok(self.check_milestones(now))
    }

    /// Appends a session, refreshes derived counts and pays out any milestones
    /// that became earned.
    pub fn log_habit_event(&mut self, event: HabitEvent) -> Vec<Milestone> {
        let now = Utc::now();
        debug!(event_id = %event.id, "Logging habit event");
        self.habit_log.append(event.clone());
        self.pending.push(LedgerEvent::SessionLogged(event));
        self.check_milestones(now)
    }

    /// Logs a session and awards the session-tracking points.
    pub fn track_session(&mut self, event: HabitEvent) -> Vec<Milestone> {
        let mut earned = self.log_habit_event(event);
        earned.extend(self.record_activity(Activity::SessionLogged));
        earned
    }

    /// Records an in-app activity: bumps engagement tallies and awards the
    /// activity's points.
    pub fn record_activity(&mut self, activity: Activity) -> Vec<Milestone> {
        match activity {
            Activity::StoryLiked => self.engagement.likes += 1,
            Activity::CommentPosted => self.engagement.comments += 1,
            Activity::StoryShared => self.engagement.stories += 1,
            _ => {}
        }
        let now = Utc::now();
        self.credit(
            activity.points(),
            activity.reason(),
            Some(activity.description().to_string()),
            now,
        );
        self.check_milestones(now)
    }

    /// Unlocks `reward`, deducting its cost once.
    ///
    /// Returns the spend transaction.
    ///
    /// # Errors
    /// - `AlreadyUnlocked` if the reward was unlocked before (checked first, so a
    ///   repeat purchase never reports a balance problem)
    /// - `InsufficientPoints` if the balance is below the cost
    /// - `InvalidAmount` if the reward carries a negative cost
    pub fn purchase_reward(&mut self, reward: &Reward) -> Result<PointTransaction> {
        if self.is_unlocked(&reward.id) {
            return Err(Error::AlreadyUnlocked {
                reward_id: reward.id.to_string(),
            });
        }
        if reward.point_cost < 0 {
            return Err(Error::InvalidAmount {
                amount: reward.point_cost,
            });
        }
        if self.balance < reward.point_cost {
            return Err(Error::InsufficientPoints {
                balance: self.balance,
                cost: reward.point_cost,
            });
        }

        let spend = PointTransaction::new(
            Utc::now(),
            -reward.point_cost,
            PointReason::RewardPurchased,
            Some(format!("Purchased: {}", reward.title)),
        );
        self.record(spend.clone());
        self.unlocked_rewards.push(reward.id.clone());
        self.pending.push(LedgerEvent::RewardUnlocked {
            reward_id: reward.id.clone(),
            cost: reward.point_cost,
        });

        info!(
            user_id = %self.profile.user_id,
            reward_id = %reward.id,
            cost = reward.point_cost,
            balance = self.balance,
            "Reward unlocked"
        );
        Ok(spend)
    }

    /// Looks the reward up in `catalog` and purchases it.
    ///
    /// # Errors
    /// `NotFound` if the id is not in the catalog, otherwise as
    /// [`purchase_reward`](Self::purchase_reward).
    pub fn purchase_reward_by_id(
        &mut self,
        catalog: &RewardCatalog,
        reward_id: &RewardId,
    ) -> Result<PointTransaction> {
        let reward = catalog.get(reward_id)?;
        self.purchase_reward(reward)
    }

    /// Transactions from the start of the day `days` days ago onward, newest first.
    #[must_use]
    pub fn get_recent_transactions(&self, days: u32) -> Vec<&PointTransaction> {
        self.recent_transactions_as_of(days, Utc::now().date_naive())
    }

    /// Net points for the window used by
    /// [`get_recent_transactions`](Self::get_recent_transactions). May be negative.
    #[must_use]
    pub fn total_for_period(&self, days: u32) -> i64 {
        self.get_recent_transactions(days)
            .iter()
            .map(|t| t.amount)
            .sum()
    }

    fn recent_transactions_as_of(&self, days: u32, today: NaiveDate) -> Vec<&PointTransaction> {
        let window_start = today
            .checked_sub_days(Days::new(u64::from(days)))
            .and_then(|start| start.and_hms_opt(0, 0, 0))
            .map_or(DateTime::<Utc>::MIN_UTC, |start| start.and_utc());

        let mut recent: Vec<&PointTransaction> = self
            .transactions
            .iter()
            .filter(|t| t.timestamp >= window_start)
            .collect();
        recent.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        recent
    }

    /// Sets the daily session goal.
    ///
    /// # Errors
    /// `InvalidGoal` if `goal` is not positive.
    pub fn update_daily_goal(&mut self, goal: i64) -> Result<()> {
        let goal = u32::try_from(goal)
            .ok()
            .filter(|g| *g > 0)
            .ok_or(Error::InvalidGoal { goal })?;
        self.profile.daily_goal = goal;
        self.pending.push(LedgerEvent::DailyGoalUpdated { goal });
        info!(user_id = %self.profile.user_id, goal, "Daily goal updated");
        Ok(())
    }

    /// Sessions left today before reaching the daily goal.
    #[must_use]
    pub fn daily_goal_remaining(&self) -> u32 {
        let today = u32::try_from(self.daily_count).unwrap_or(u32::MAX);
        self.profile.daily_goal.saturating_sub(today)
    }

    /// Estimated savings as of `now`.
    #[must_use]
    pub fn savings(&self, now: DateTime<Utc>) -> Savings {
        let start = self.profile.plan_start.unwrap_or(self.profile.join_date);
        SavingsEstimator::estimate(&SavingsInputs {
            weekly_spending: self.profile.weekly_spending,
            daily_frequency: self.profile.daily_frequency,
            days_per_week: self.profile.days_per_week,
            plan_start: self.profile.plan_start,
            join_date: self.profile.join_date,
            now,
            actual_event_count: self.habit_log.count_since(start),
        })
    }

    /// Takes the queued change events, oldest first.
    pub fn drain_events(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.pending)
    }

    /// Counter snapshot fed to the milestone rules.
    #[must_use]
    pub fn counters(&self) -> MilestoneCounters {
        MilestoneCounters {
            event_count: u64::try_from(self.habit_log.len()).unwrap_or(u64::MAX),
            streak_days: self.streak_days,
            point_balance: self.balance,
            comment_count: self.engagement.comments,
            like_count: self.engagement.likes,
        }
    }

    /// Current point balance
    #[must_use]
    pub const fn balance(&self) -> i64 {
        self.balance
    }

    /// Current clean streak in days
    #[must_use]
    pub const fn streak_days(&self) -> u32 {
        self.streak_days
    }

    /// Sessions logged today
    #[must_use]
    pub const fn daily_count(&self) -> usize {
        self.daily_count
    }

    /// Sessions logged this week
    #[must_use]
    pub const fn weekly_count(&self) -> usize {
        self.weekly_count
    }

    /// Earned milestones in earn order
    #[must_use]
    pub fn milestones(&self) -> &[Milestone] {
        &self.milestones
    }

    /// Whether a milestone with this title has been earned
    #[must_use]
    pub fn has_milestone(&self, title: &str) -> bool {
        self.earned_titles.contains(title)
    }

    /// Transaction history, oldest first
    #[must_use]
    pub fn transactions(&self) -> &[PointTransaction] {
        &self.transactions
    }

    /// Unlocked reward ids in unlock order
    #[must_use]
    pub fn unlocked_rewards(&self) -> &[RewardId] {
        &self.unlocked_rewards
    }

    /// Whether the reward has been unlocked
    #[must_use]
    pub fn is_unlocked(&self, reward_id: &RewardId) -> bool {
        self.unlocked_rewards.contains(reward_id)
    }

    /// Catalog rewards this user has unlocked
    #[must_use]
    pub fn unlocked_in<'a>(&self, catalog: &'a RewardCatalog) -> Vec<&'a Reward> {
        catalog
            .rewards()
            .iter()
            .filter(|r| self.is_unlocked(&r.id))
            .collect()
    }

    /// Session history
    #[must_use]
    pub const fn habit_log(&self) -> &HabitLog {
        &self.habit_log
    }

    /// Engagement tallies
    #[must_use]
    pub const fn engagement(&self) -> EngagementCounters {
        self.engagement
    }

    /// Profile data
    #[must_use]
    pub const fn profile(&self) -> &UserProfile {
        &self.profile
    }

    fn record(&mut self, transaction: PointTransaction) {
        self.balance += transaction.amount;
        self.transactions.push(transaction.clone());
        self.pending.push(LedgerEvent::TransactionRecorded(transaction));
    }

    fn credit(
        &mut self,
        amount: i64,
        reason: PointReason,
        description: Option<String>,
        now: DateTime<Utc>,
    ) {
        self.record(PointTransaction::new(now, amount, reason, description));
        info!(
            user_id = %self.profile.user_id,
            amount,
            ?reason,
            balance = self.balance,
            "Points awarded"
        );
    }

    fn refresh_counters(&mut self, today: NaiveDate) {
        self.streak_days = self.habit_log.consecutive_event_free_days_ending(today);
        self.daily_count = self.habit_log.count_on_date(today);
        self.weekly_count = self.habit_log.count_in_week_of(today);
    }

    // Single pass: bonuses paid here are seen by the next evaluation, not this one.
    fn check_milestones(&mut self, now: DateTime<Utc>) -> Vec<Milestone> {
        self.refresh_counters(now.date_naive());
        let earned = MilestoneEvaluator::evaluate(&self.counters(), &self.earned_titles, now);

        for milestone in &earned {
            self.earned_titles.insert(milestone.title.clone());
            self.milestones.push(milestone.clone());
            self.pending.push(LedgerEvent::MilestoneEarned(milestone.clone()));
            self.record(PointTransaction::new(
                now,
                milestone.points_awarded,
                PointReason::AchievementUnlocked,
                Some(format!("Milestone: {}", milestone.title)),
            ));
            info!(
                user_id = %self.profile.user_id,
                title = %milestone.title,
                points = milestone.points_awarded,
                "Milestone earned"
            );
        }

        earned
    }
}
