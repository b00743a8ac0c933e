//! Shared test utilities for Regretless.
//!
//! This module provides helpers for setting up an in-memory document store and
//! building sessions and ledgers with sensible defaults.

#![allow(clippy::unwrap_used)]

use crate::{
    core::{
        CravingLevel, EngagementCounters, HabitEvent, Intensity, LedgerSnapshot, Mood,
        PointReason, PointTransaction, ProgressLedger, Trigger, UserProfile,
    },
    errors::Result,
    store::SqliteDocumentStore,
};
use chrono::{Duration, NaiveDate, Utc};
use std::path::PathBuf;

/// Creates a document store on an in-memory `SQLite` database with all tables
/// initialized. This is the standard setup for store tests.
pub async fn setup_test_store() -> Result<SqliteDocumentStore> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(SqliteDocumentStore::new(db))
}

/// A session logged right now.
///
/// # Defaults
/// * `intensity`: 3
/// * `trigger`: stress
/// * `mood`: anxious
/// * `craving_level`: 7
pub fn sample_event() -> HabitEvent {
    HabitEvent::new(
        Utc::now(),
        Intensity::new(3).unwrap(),
        Trigger::Stress,
        Mood::Anxious,
        CravingLevel::new(7).unwrap(),
    )
}

/// A sample session at noon UTC on `date`.
pub fn event_on(date: NaiveDate) -> HabitEvent {
    HabitEvent {
        timestamp: date.and_hms_opt(12, 0, 0).unwrap().and_utc(),
        ..sample_event()
    }
}

/// A sample session exactly `days` days before now.
pub fn event_days_ago(days: i64) -> HabitEvent {
    HabitEvent {
        timestamp: Utc::now() - Duration::days(days),
        ..sample_event()
    }
}

fn test_profile() -> UserProfile {
    UserProfile::new("test-user", "tester", Utc::now() - Duration::days(30))
}

/// An empty ledger for a user who joined 30 days ago.
pub fn test_ledger() -> ProgressLedger {
    ProgressLedger::new(test_profile())
}

/// A ledger holding `points` from a single app-usage transaction, with no
/// milestones earned.
pub fn funded_ledger(points: i64) -> ProgressLedger {
    let profile = test_profile();
    let funding = PointTransaction::new(profile.join_date, points, PointReason::AppUsage, None);
    ProgressLedger::restore(LedgerSnapshot {
        profile,
        stored_balance: points,
        transactions: vec![funding],
        milestones: Vec::new(),
        unlocked_rewards: Vec::new(),
        events: Vec::new(),
        engagement: EngagementCounters::default(),
    })
}

/// A fresh directory path under the system temp dir, unique per call.
pub fn scratch_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("regretless-{name}-{}", uuid::Uuid::new_v4()))
}
