//! Habit log - append-only record of tracked vaping sessions.
//!
//! Every logged session is kept in insertion order. Read queries (daily and weekly
//! counts, the clean streak, trigger and mood breakdowns) are linear scans over the
//! log and never mutate it. Days are UTC calendar days.

use crate::errors::{Error, Result};
use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Session intensity on a 1-5 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Intensity(u8);

impl Intensity {
    /// Lowest allowed intensity
    pub const MIN: u8 = 1;
    /// Highest allowed intensity
    pub const MAX: u8 = 5;

    /// Creates an intensity, rejecting values outside 1-5.
    pub fn new(value: i64) -> Result<Self> {
        bounded("intensity", value, Self::MIN, Self::MAX).map(Self)
    }

    /// Returns the raw scale value.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Intensity {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Intensity> for u8 {
    fn from(value: Intensity) -> Self {
        value.0
    }
}

/// Craving level on a 1-10 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct CravingLevel(u8);

impl CravingLevel {
    /// Lowest allowed craving level
    pub const MIN: u8 = 1;
    /// Highest allowed craving level
    pub const MAX: u8 = 10;

    /// Creates a craving level, rejecting values outside 1-10.
    pub fn new(value: i64) -> Result<Self> {
        bounded("cravingLevel", value, Self::MIN, Self::MAX).map(Self)
    }

    /// Returns the raw scale value.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for CravingLevel {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<CravingLevel> for u8 {
    fn from(value: CravingLevel) -> Self {
        value.0
    }
}

fn bounded(field: &'static str, value: i64, min: u8, max: u8) -> Result<u8> {
    if value < i64::from(min) || value > i64::from(max) {
        return Err(Error::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    // Range-checked above, always fits in u8.
    u8::try_from(value).map_err(|_| Error::OutOfRange {
        field,
        value,
        min,
        max,
    })
}

/// What prompted a session. Serialized with the labels shown to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Trigger {
    /// Stress or anxiety
    #[serde(rename = "Stress or anxiety")]
    Stress,
    /// Social situations
    #[serde(rename = "Social situations")]
    Social,
    /// Boredom
    #[serde(rename = "Boredom")]
    Boredom,
    /// After meals
    #[serde(rename = "After meals")]
    AfterMeals,
    /// When drinking alcohol
    #[serde(rename = "When drinking alcohol")]
    Alcohol,
    /// Morning routine
    #[serde(rename = "Morning routine")]
    Morning,
    /// To aid concentration
    #[serde(rename = "To aid concentration")]
    Concentration,
}

impl Trigger {
    /// Every trigger, in display order.
    pub const ALL: [Self; 7] = [
        Self::Stress,
        Self::Social,
        Self::Boredom,
        Self::AfterMeals,
        Self::Alcohol,
        Self::Morning,
        Self::Concentration,
    ];
}

/// How the user felt around a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Mood {
    /// Anxious
    Anxious,
    /// Stressed
    Stressed,
    /// Bored
    Bored,
    /// Happy
    Happy,
    /// Sad
    Sad,
    /// Angry
    Angry,
    /// Neutral
    Neutral,
}

impl Mood {
    /// Every mood, in display order.
    pub const ALL: [Self; 7] = [
        Self::Anxious,
        Self::Stressed,
        Self::Bored,
        Self::Happy,
        Self::Sad,
        Self::Angry,
        Self::Neutral,
    ];
}

/// One tracked session. Immutable once logged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitEvent {
    /// Unique identifier
    pub id: Uuid,
    /// When the session happened
    pub timestamp: DateTime<Utc>,
    /// Session intensity (1-5)
    pub intensity: Intensity,
    /// What prompted the session
    pub trigger: Trigger,
    /// Mood at the time
    pub mood: Mood,
    /// Free-text note
    pub note: Option<String>,
    /// Where it happened
    pub location: Option<String>,
    /// Craving level (1-10)
    pub craving_level: CravingLevel,
}

impl HabitEvent {
    /// Creates an event with a fresh id and no note or location.
    #[must_use]
    pub fn new(
        timestamp: DateTime<Utc>,
        intensity: Intensity,
        trigger: Trigger,
        mood: Mood,
        craving_level: CravingLevel,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            intensity,
            trigger,
            mood,
            note: None,
            location: None,
            craving_level,
        }
    }

    /// Attaches a free-text note.
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Attaches a location.
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Calendar day (UTC) the event falls on.
    #[must_use]
    pub fn day(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}

/// Append-only, insertion-ordered collection of [`HabitEvent`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HabitLog {
    events: Vec<HabitEvent>,
}

impl HabitLog {
    /// Creates an empty log.
    #[must_use]
    pub const fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Appends an event. Bounded scales are enforced by their types.
    pub fn append(&mut self, event: HabitEvent) {
        self.events.push(event);
    }

    /// All events in insertion order.
    #[must_use]
    pub fn events(&self) -> &[HabitEvent] {
        &self.events
    }

    /// Total number of logged events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether nothing has been logged yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of events on the given calendar day.
    #[must_use]
    pub fn count_on_date(&self, date: NaiveDate) -> usize {
        self.events.iter().filter(|e| e.day() == date).count()
    }

    /// Number of events at or after `since`.
    #[must_use]
    pub fn count_since(&self, since: DateTime<Utc>) -> usize {
        self.events.iter().filter(|e| e.timestamp >= since).count()
    }

    /// Number of events in the week (Monday start) containing `today`.
    #[must_use]
    pub fn count_in_week_of(&self, today: NaiveDate) -> usize {
        let week_start = today - Days::new(u64::from(today.weekday().num_days_from_monday()));
        self.events
            .iter()
            .filter(|e| e.day() >= week_start && e.day() <= today)
            .count()
    }

    /// Clean streak ending on `today`, counting today itself.
    ///
    /// - No events at all counts as one clean day.
    /// - An event on `today` resets the streak to zero.
    /// - Otherwise the streak is the number of calendar days from the latest
    ///   event's day up to and including `today` (latest event three days ago
    ///   gives 4).
    #[must_use]
    pub fn consecutive_event_free_days_ending(&self, today: NaiveDate) -> u32 {
        let has_event_today = self.events.iter().any(|e| e.day() == today);
        let mut streak = u32::from(!has_event_today);

        if let Some(last_day) = self.events.iter().map(HabitEvent::day).max() {
            if last_day < today {
                let gap = (today - last_day).num_days();
                streak = u32::try_from(gap.max(0) + 1).unwrap_or(u32::MAX);
            }
        }

        streak
    }

    /// Clean streak ending on the current UTC day.
    #[must_use]
    pub fn consecutive_event_free_days_ending_today(&self) -> u32 {
        self.consecutive_event_free_days_ending(Utc::now().date_naive())
    }

    /// Event count per trigger. Every trigger is present, zero when unused.
    #[must_use]
    pub fn trigger_breakdown(&self) -> BTreeMap<Trigger, usize> {
        let mut counts: BTreeMap<Trigger, usize> = Trigger::ALL.iter().map(|t| (*t, 0)).collect();
        for event in &self.events {
            *counts.entry(event.trigger).or_default() += 1;
        }
        counts
    }

    /// Event count per mood. Every mood is present, zero when unused.
    #[must_use]
    pub fn mood_breakdown(&self) -> BTreeMap<Mood, usize> {
        let mut counts: BTreeMap<Mood, usize> = Mood::ALL.iter().map(|m| (*m, 0)).collect();
        for event in &self.events {
            *counts.entry(event.mood).or_default() += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::{event_days_ago, event_on, sample_event};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_bounded_scales_reject_out_of_range() {
        assert!(Intensity::new(0).is_err());
        assert!(Intensity::new(6).is_err());
        assert_eq!(Intensity::new(5).unwrap().get(), 5);
        assert!(CravingLevel::new(11).is_err());
        assert!(matches!(
            CravingLevel::new(-1),
            Err(Error::OutOfRange {
                field: "cravingLevel",
                value: -1,
                min: 1,
                max: 10
            })
        ));
    }

    #[test]
    fn test_empty_log_counts_as_one_clean_day() {
        let log = HabitLog::new();
        assert_eq!(log.consecutive_event_free_days_ending(day(2025, 5, 10)), 1);
    }

    #[test]
    fn test_event_today_resets_streak() {
        let today = day(2025, 5, 10);
        let mut log = HabitLog::new();
        log.append(event_on(today));
        assert_eq!(log.consecutive_event_free_days_ending(today), 0);
    }

    #[test]
    fn test_streak_counts_gap_plus_today() {
        let today = day(2025, 5, 10);
        let mut log = HabitLog::new();
        log.append(event_on(day(2025, 5, 1)));
        log.append(event_on(day(2025, 5, 7)));
        assert_eq!(log.consecutive_event_free_days_ending(today), 4);
    }

    #[test]
    fn test_streak_ending_today_uses_current_day() {
        let mut log = HabitLog::new();
        assert_eq!(log.consecutive_event_free_days_ending_today(), 1);

        log.append(event_days_ago(3));
        assert_eq!(log.consecutive_event_free_days_ending_today(), 4);

        log.append(sample_event());
        assert_eq!(log.consecutive_event_free_days_ending_today(), 0);
    }

    #[test]
    fn test_streak_uses_latest_event_not_last_inserted() {
        let today = day(2025, 5, 10);
        let mut log = HabitLog::new();
        log.append(event_on(day(2025, 5, 8)));
        log.append(event_on(day(2025, 5, 2)));
        assert_eq!(log.consecutive_event_free_days_ending(today), 3);
    }

    #[test]
    fn test_counts_by_day_and_since() {
        let today = day(2025, 5, 14); // Wednesday
        let mut log = HabitLog::new();
        log.append(event_on(day(2025, 5, 11))); // previous Sunday
        log.append(event_on(day(2025, 5, 12))); // Monday
        log.append(event_on(today));
        log.append(event_on(today));

        assert_eq!(log.count_on_date(today), 2);
        assert_eq!(log.count_on_date(day(2025, 5, 13)), 0);
        assert_eq!(log.count_in_week_of(today), 3);

        let since = day(2025, 5, 12).and_hms_opt(0, 0, 0).unwrap().and_utc();
        assert_eq!(log.count_since(since), 3);
    }

    #[test]
    fn test_breakdowns_cover_every_variant() {
        let mut log = HabitLog::new();
        log.append(sample_event());
        let mut bored = sample_event();
        bored.trigger = Trigger::Boredom;
        bored.mood = Mood::Bored;
        log.append(bored);

        let triggers = log.trigger_breakdown();
        assert_eq!(triggers.len(), Trigger::ALL.len());
        assert_eq!(triggers[&Trigger::Stress], 1);
        assert_eq!(triggers[&Trigger::Boredom], 1);
        assert_eq!(triggers[&Trigger::Alcohol], 0);

        let moods = log.mood_breakdown();
        assert_eq!(moods[&Mood::Anxious], 1);
        assert_eq!(moods[&Mood::Bored], 1);
    }

    #[test]
    fn test_trigger_serializes_with_display_label() {
        let json = serde_json::to_string(&Trigger::AfterMeals).unwrap();
        assert_eq!(json, "\"After meals\"");
        let mood: Mood = serde_json::from_str("\"Happy\"").unwrap();
        assert_eq!(mood, Mood::Happy);
    }
}
