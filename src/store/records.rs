//! Typed records for stored documents.
//!
//! Every document read from the backend is decoded into one of these structs before
//! it reaches the ledger. Missing required fields, wrong types and out-of-range scale
//! values fail with `MalformedRecord` instead of being patched with defaults. Field
//! names match the stored camelCase keys.

use super::Fields;
use crate::{
    core::{
        CravingLevel, EngagementCounters, HabitEvent, Intensity, Milestone, Mood,
        PointReason, PointTransaction, RewardId, Trigger, UserProfile,
        ledger::DEFAULT_DAILY_GOAL,
    },
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use serde::{
    Deserialize, Deserializer, Serialize,
    de::{DeserializeOwned, Error as _},
};
use uuid::Uuid;

/// Decodes `fields` into `T`, reporting failures against `collection`.
pub fn decode_record<T: DeserializeOwned>(collection: &str, fields: Fields) -> Result<T> {
    serde_json::from_value(serde_json::Value::Object(fields)).map_err(|e| Error::MalformedRecord {
        collection: collection.to_string(),
        message: e.to_string(),
    })
}

/// Encodes a record into a field map.
pub fn encode_record<T: Serialize>(record: &T) -> Result<Fields> {
    match serde_json::to_value(record)? {
        serde_json::Value::Object(fields) => Ok(fields),
        other => Err(Error::Storage {
            message: format!("record did not encode to an object: {other}"),
        }),
    }
}

fn parse_document_id(collection: &str, document_id: &str) -> Result<Uuid> {
    Uuid::parse_str(document_id).map_err(|e| Error::MalformedRecord {
        collection: collection.to_string(),
        message: format!("document id {document_id:?} is not a UUID: {e}"),
    })
}

const fn default_daily_goal() -> u32 {
    DEFAULT_DAILY_GOAL
}

fn positive_goal<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let goal = i64::deserialize(deserializer)?;
    u32::try_from(goal)
        .ok()
        .filter(|g| *g > 0)
        .ok_or_else(|| D::Error::custom(Error::InvalidGoal { goal }))
}

/// The user document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// Display name
    pub username: String,
    /// Sign-in email
    pub email: String,
    /// When the user joined
    pub join_date: DateTime<Utc>,
    /// Clean streak at last write
    #[serde(default)]
    pub streak_days: u32,
    /// Point balance at last write
    #[serde(default)]
    pub total_points_earned: i64,
    /// Daily session goal
    #[serde(default = "default_daily_goal", deserialize_with = "positive_goal")]
    pub daily_vaping_goal: u32,
    /// Weekly spending before cutting down
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekly_spending: Option<f64>,
    /// Original sessions per active day
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vaping_frequency: Option<u32>,
    /// Original active days per week
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_per_week_vaping: Option<u32>,
    /// Start of the cessation plan
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_start_date: Option<DateTime<Utc>>,
    /// Unlocked reward ids
    #[serde(default)]
    pub unlocked_rewards: Vec<RewardId>,
    /// Profile picture URL
    #[serde(
        default,
        rename = "profileImageURL",
        skip_serializing_if = "Option::is_none"
    )]
    pub profile_image_url: Option<String>,
    /// Comments posted
    #[serde(default)]
    pub comment_count: u64,
    /// Likes given
    #[serde(default)]
    pub like_count: u64,
    /// Stories shared
    #[serde(default)]
    pub story_count: u64,
}

impl UserRecord {
    /// Fresh record for a newly registered profile.
    #[must_use]
    pub fn for_profile(profile: &UserProfile, email: impl Into<String>) -> Self {
        Self {
            username: profile.username.clone(),
            email: email.into(),
            join_date: profile.join_date,
            streak_days: 0,
            total_points_earned: 0,
            daily_vaping_goal: profile.daily_goal,
            weekly_spending: profile.weekly_spending,
            vaping_frequency: profile.daily_frequency,
            days_per_week_vaping: profile.days_per_week,
            plan_start_date: profile.plan_start,
            unlocked_rewards: Vec::new(),
            profile_image_url: None,
            comment_count: 0,
            like_count: 0,
            story_count: 0,
        }
    }

    /// Ledger profile for `user_id`.
    #[must_use]
    pub fn profile(&self, user_id: &str) -> UserProfile {
        UserProfile {
            user_id: user_id.to_string(),
            username: self.username.clone(),
            join_date: self.join_date,
            weekly_spending: self.weekly_spending,
            daily_frequency: self.vaping_frequency,
            days_per_week: self.days_per_week_vaping,
            plan_start: self.plan_start_date,
            daily_goal: self.daily_vaping_goal,
        }
    }

    /// Engagement tallies
    #[must_use]
    pub const fn engagement(&self) -> EngagementCounters {
        EngagementCounters {
            comments: self.comment_count,
            likes: self.like_count,
            stories: self.story_count,
        }
    }
}

/// A document in the `milestones` subcollection. The document id is the
/// milestone id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneRecord {
    /// Title
    pub title: String,
    /// Description
    pub description: String,
    /// Bonus points
    pub points_awarded: i64,
    /// When it was earned
    pub date_achieved: DateTime<Utc>,
    /// Icon identifier
    pub icon_name: String,
}

impl MilestoneRecord {
    /// Decodes a stored milestone.
    pub fn decode(document_id: &str, fields: Fields) -> Result<Milestone> {
        let id = parse_document_id("milestones", document_id)?;
        let record: Self = decode_record("milestones", fields)?;
        Ok(Milestone {
            id,
            title: record.title,
            description: record.description,
            points_awarded: record.points_awarded,
            date_achieved: record.date_achieved,
            icon_name: record.icon_name,
        })
    }
}

impl From<&Milestone> for MilestoneRecord {
    fn from(milestone: &Milestone) -> Self {
        Self {
            title: milestone.title.clone(),
            description: milestone.description.clone(),
            points_awarded: milestone.points_awarded,
            date_achieved: milestone.date_achieved,
            icon_name: milestone.icon_name.clone(),
        }
    }
}

/// A document in the `pointTransactions` subcollection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointTransactionRecord {
    /// Signed amount
    pub amount: i64,
    /// Reason label
    pub reason: PointReason,
    /// Description, the reason's default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// When it was recorded
    pub timestamp: DateTime<Utc>,
}

impl PointTransactionRecord {
    /// Decodes a stored transaction.
    pub fn decode(document_id: &str, fields: Fields) -> Result<PointTransaction> {
        let id = parse_document_id("pointTransactions", document_id)?;
        let record: Self = decode_record("pointTransactions", fields)?;
        Ok(PointTransaction {
            id,
            timestamp: record.timestamp,
            amount: record.amount,
            reason: record.reason,
            description: record
                .description
                .unwrap_or_else(|| record.reason.default_description().to_string()),
        })
    }
}

impl From<&PointTransaction> for PointTransactionRecord {
    fn from(transaction: &PointTransaction) -> Self {
        Self {
            amount: transaction.amount,
            reason: transaction.reason,
            description: Some(transaction.description.clone()),
            timestamp: transaction.timestamp,
        }
    }
}

/// A document in the `sessions` subcollection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitEventRecord {
    /// When the session happened
    pub date: DateTime<Utc>,
    /// Intensity (1-5)
    pub intensity: Intensity,
    /// Trigger label
    pub trigger: Trigger,
    /// Mood label
    pub mood: Mood,
    /// Free-text note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Craving level (1-10)
    pub craving_level: CravingLevel,
}

impl HabitEventRecord {
    /// Decodes a stored session.
    pub fn decode(document_id: &str, fields: Fields) -> Result<HabitEvent> {
        let id = parse_document_id("sessions", document_id)?;
        let record: Self = decode_record("sessions", fields)?;
        Ok(HabitEvent {
            id,
            timestamp: record.date,
            intensity: record.intensity,
            trigger: record.trigger,
            mood: record.mood,
            note: record.notes,
            location: record.location,
            craving_level: record.craving_level,
        })
    }
}

impl From<&HabitEvent> for HabitEventRecord {
    fn from(event: &HabitEvent) -> Self {
        Self {
            date: event.timestamp,
            intensity: event.intensity,
            trigger: event.trigger,
            mood: event.mood,
            notes: event.note.clone(),
            location: event.location.clone(),
            craving_level: event.craving_level,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::sample_event;
    use serde_json::json;

    fn fields(value: serde_json::Value) -> Fields {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_user_record_defaults_optional_fields() {
        let record: UserRecord = decode_record(
            "users",
            fields(json!({
                "username": "sam",
                "email": "sam@example.com",
                "joinDate": "2025-04-12T08:00:00Z"
            })),
        )
        .unwrap();
        assert_eq!(record.total_points_earned, 0);
        assert_eq!(record.daily_vaping_goal, 10);
        assert!(record.unlocked_rewards.is_empty());
        assert_eq!(record.profile("u1").daily_goal, 10);
    }

    #[test]
    fn test_user_record_requires_join_date() {
        let result: Result<UserRecord> = decode_record(
            "users",
            fields(json!({"username": "sam", "email": "sam@example.com"})),
        );
        assert!(matches!(
            result,
            Err(Error::MalformedRecord { collection, message })
                if collection == "users" && message.contains("joinDate")
        ));
    }

    #[test]
    fn test_user_record_rejects_non_positive_goal() {
        for goal in [0, -3] {
            let result: Result<UserRecord> = decode_record(
                "users",
                fields(json!({
                    "username": "sam",
                    "email": "sam@example.com",
                    "joinDate": "2025-04-12T08:00:00Z",
                    "dailyVapingGoal": goal
                })),
            );
            assert!(matches!(
                result,
                Err(Error::MalformedRecord { message, .. }) if message.contains("Invalid daily goal")
            ));
        }
    }

    #[test]
    fn test_user_record_rejects_wrong_types() {
        let result: Result<UserRecord> = decode_record(
            "users",
            fields(json!({
                "username": "sam",
                "email": "sam@example.com",
                "joinDate": "2025-04-12T08:00:00Z",
                "totalPointsEarned": "lots"
            })),
        );
        assert!(matches!(result, Err(Error::MalformedRecord { .. })));
    }

    #[test]
    fn test_user_record_uses_stored_key_names() {
        let profile = UserProfile::new("u1", "sam", Utc::now());
        let mut record = UserRecord::for_profile(&profile, "sam@example.com");
        record.profile_image_url = Some("file:///tmp/u1.jpg".to_string());
        let encoded = encode_record(&record).unwrap();
        assert!(encoded.contains_key("totalPointsEarned"));
        assert!(encoded.contains_key("dailyVapingGoal"));
        assert!(encoded.contains_key("unlockedRewards"));
        assert!(encoded.contains_key("profileImageURL"));
        assert!(!encoded.contains_key("weeklySpending"));
    }

    #[test]
    fn test_milestone_record_round_trip() {
        let milestone = Milestone {
            id: Uuid::new_v4(),
            title: "Century Club".to_string(),
            description: "Earn 100 points in the app".to_string(),
            points_awarded: 50,
            date_achieved: Utc::now(),
            icon_name: "star.circle.fill".to_string(),
        };
        let encoded = encode_record(&MilestoneRecord::from(&milestone)).unwrap();
        assert_eq!(encoded["pointsAwarded"], json!(50));
        let decoded = MilestoneRecord::decode(&milestone.id.to_string(), encoded).unwrap();
        assert_eq!(decoded, milestone);
    }

    #[test]
    fn test_milestone_requires_uuid_document_id() {
        let milestone = fields(json!({
            "title": "Century Club",
            "description": "d",
            "pointsAwarded": 50,
            "dateAchieved": "2025-04-12T08:00:00Z",
            "iconName": "star"
        }));
        let result = MilestoneRecord::decode("not-a-uuid", milestone);
        assert!(matches!(result, Err(Error::MalformedRecord { .. })));
    }

    #[test]
    fn test_transaction_description_falls_back_to_reason() {
        let id = Uuid::new_v4();
        let tx = PointTransactionRecord::decode(
            &id.to_string(),
            fields(json!({
                "amount": 25,
                "reason": "Story Shared",
                "timestamp": "2025-04-12T08:00:00Z"
            })),
        )
        .unwrap();
        assert_eq!(tx.id, id);
        assert_eq!(tx.description, "Shared a story with the community");
    }

    #[test]
    fn test_transaction_unknown_reason_is_malformed() {
        let result = PointTransactionRecord::decode(
            &Uuid::new_v4().to_string(),
            fields(json!({
                "amount": 25,
                "reason": "Free Money",
                "timestamp": "2025-04-12T08:00:00Z"
            })),
        );
        assert!(matches!(result, Err(Error::MalformedRecord { .. })));
    }

    #[test]
    fn test_session_out_of_range_intensity_is_malformed() {
        let result = HabitEventRecord::decode(
            &Uuid::new_v4().to_string(),
            fields(json!({
                "date": "2025-04-12T08:00:00Z",
                "intensity": 9,
                "trigger": "Boredom",
                "mood": "Bored",
                "cravingLevel": 3
            })),
        );
        assert!(matches!(
            result,
            Err(Error::MalformedRecord { message, .. }) if message.contains("intensity")
        ));
    }

    #[test]
    fn test_session_record_round_trip() {
        let event = sample_event().with_note("after class").with_location("school");
        let encoded = encode_record(&HabitEventRecord::from(&event)).unwrap();
        assert_eq!(encoded["trigger"], json!("Stress or anxiety"));
        let decoded = HabitEventRecord::decode(&event.id.to_string(), encoded).unwrap();
        assert_eq!(decoded, event);
    }
}
