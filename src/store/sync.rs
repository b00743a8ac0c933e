//! Moves ledger state between a [`DocumentStore`] and a [`ProgressLedger`].

use super::{
    BlobStore, DocumentStore, Fields, IdentityProvider,
    records::{
        HabitEventRecord, MilestoneRecord, PointTransactionRecord, UserRecord, decode_record,
        encode_record,
    },
};
use crate::{
    core::{LedgerEvent, LedgerSnapshot, ProgressLedger, UserProfile},
    errors::{Error, Result},
};
use serde_json::Value;
use tracing::{debug, info, instrument};

/// Subcollection holding earned milestones
pub const MILESTONES: &str = "milestones";
/// Subcollection holding the point transaction history
pub const POINT_TRANSACTIONS: &str = "pointTransactions";
/// Subcollection holding logged sessions
pub const SESSIONS: &str = "sessions";

/// Creates the user document for a new profile and returns an empty ledger.
///
/// # Errors
/// Fails if the user already has a document or the write fails.
#[instrument(skip(store, profile), fields(user_id = %profile.user_id))]
pub async fn register_user<S: DocumentStore>(
    store: &S,
    profile: UserProfile,
    email: &str,
) -> Result<ProgressLedger> {
    let record = UserRecord::for_profile(&profile, email);
    store
        .create_user_document(&profile.user_id, encode_record(&record)?)
        .await?;
    info!("Registered user");
    Ok(ProgressLedger::new(profile))
}

/// Loads a user's ledger from their document and subcollections.
///
/// If the stored balance disagrees with the transaction history, the corrected
/// totals (and any opening-balance transaction) are written back before returning.
///
/// # Errors
/// - `DocumentNotFound` if the user has no document
/// - `MalformedRecord` if any stored document fails to decode
#[instrument(skip(store))]
pub async fn load_ledger<S: DocumentStore>(store: &S, user_id: &str) -> Result<ProgressLedger> {
    let fields = store
        .get_user_document(user_id)
        .await?
        .ok_or_else(|| Error::DocumentNotFound {
            user_id: user_id.to_string(),
        })?;
    let user: UserRecord = decode_record("users", fields)?;

    let milestones = store
        .list_subcollection(user_id, MILESTONES)
        .await?
        .into_iter()
        .map(|(id, fields)| MilestoneRecord::decode(&id, fields))
        .collect::<Result<Vec<_>>>()?;
    let transactions = store
        .list_subcollection(user_id, POINT_TRANSACTIONS)
        .await?
        .into_iter()
        .map(|(id, fields)| PointTransactionRecord::decode(&id, fields))
        .collect::<Result<Vec<_>>>()?;
    let events = store
        .list_subcollection(user_id, SESSIONS)
        .await?
        .into_iter()
        .map(|(id, fields)| HabitEventRecord::decode(&id, fields))
        .collect::<Result<Vec<_>>>()?;

    debug!(
        milestones = milestones.len(),
        transactions = transactions.len(),
        sessions = events.len(),
        "Loaded subcollections"
    );

    let mut ledger = ProgressLedger::restore(LedgerSnapshot {
        profile: user.profile(user_id),
        stored_balance: user.total_points_earned,
        transactions,
        milestones,
        unlocked_rewards: user.unlocked_rewards.clone(),
        events,
        engagement: user.engagement(),
    });

    let reconciliation = ledger.drain_events();
    if !reconciliation.is_empty() || user.total_points_earned != ledger.balance() {
        persist_events(store, user_id, &ledger, &reconciliation).await?;
    }

    Ok(ledger)
}

/// Loads the ledger of whoever `identity` reports as signed in.
///
/// # Errors
/// `NotAuthenticated` when nobody is signed in, otherwise as [`load_ledger`].
pub async fn load_current_ledger<S: DocumentStore, I: IdentityProvider>(
    store: &S,
    identity: &I,
) -> Result<ProgressLedger> {
    let user_id = identity.current_user_id().ok_or(Error::NotAuthenticated)?;
    load_ledger(store, &user_id).await
}

/// Writes drained ledger events to the store.
///
/// Transactions, milestones and sessions go to their subcollections keyed by
/// their ids, so persisting the same events twice is harmless. The user document
/// always receives the ledger's current totals.
///
/// # Errors
/// Fails on the first write that fails; earlier writes stay in place.
#[instrument(skip(store, ledger, events), fields(events = events.len()))]
pub async fn persist_events<S: DocumentStore>(
    store: &S,
    user_id: &str,
    ledger: &ProgressLedger,
    events: &[LedgerEvent],
) -> Result<()> {
    for event in events {
        match event {
            LedgerEvent::TransactionRecorded(transaction) => {
                store
                    .append_subcollection_document(
                        user_id,
                        POINT_TRANSACTIONS,
                        &transaction.id.to_string(),
                        encode_record(&PointTransactionRecord::from(transaction))?,
                    )
                    .await?;
            }
            LedgerEvent::MilestoneEarned(milestone) => {
                store
                    .append_subcollection_document(
                        user_id,
                        MILESTONES,
                        &milestone.id.to_string(),
                        encode_record(&MilestoneRecord::from(milestone))?,
                    )
                    .await?;
            }
            LedgerEvent::SessionLogged(habit_event) => {
                store
                    .append_subcollection_document(
                        user_id,
                        SESSIONS,
                        &habit_event.id.to_string(),
                        encode_record(&HabitEventRecord::from(habit_event))?,
                    )
                    .await?;
            }
            // Carried by the user document totals below.
            LedgerEvent::RewardUnlocked { .. } | LedgerEvent::DailyGoalUpdated { .. } => {}
        }
    }

    store
        .update_user_fields(user_id, ledger_totals(ledger)?)
        .await?;
    debug!(balance = ledger.balance(), "Persisted ledger events");
    Ok(())
}

fn ledger_totals(ledger: &ProgressLedger) -> Result<Fields> {
    let engagement = ledger.engagement();
    let mut fields = Fields::new();
    fields.insert("totalPointsEarned".into(), Value::from(ledger.balance()));
    fields.insert("streakDays".into(), Value::from(ledger.streak_days()));
    fields.insert(
        "unlockedRewards".into(),
        serde_json::to_value(ledger.unlocked_rewards())?,
    );
    fields.insert(
        "dailyVapingGoal".into(),
        Value::from(ledger.profile().daily_goal),
    );
    fields.insert("commentCount".into(), Value::from(engagement.comments));
    fields.insert("likeCount".into(), Value::from(engagement.likes));
    fields.insert("storyCount".into(), Value::from(engagement.stories));
    Ok(fields)
}

/// Uploads a profile picture and records its URL on the user document.
///
/// Returns the URL.
///
/// # Errors
/// Fails if the upload fails or the user has no document.
#[instrument(skip(store, blobs, bytes), fields(size = bytes.len()))]
pub async fn upload_profile_image<S: DocumentStore, B: BlobStore>(
    store: &S,
    blobs: &B,
    user_id: &str,
    bytes: &[u8],
) -> Result<String> {
    let url = blobs
        .upload(bytes, &format!("profile_images/{user_id}.jpg"))
        .await?;

    let mut fields = Fields::new();
    fields.insert("profileImageURL".into(), Value::from(url.clone()));
    store.update_user_fields(user_id, fields).await?;

    info!(%url, "Profile image uploaded");
    Ok(url)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        core::{Activity, PointReason, RewardCatalog, RewardId},
        store::{LocalBlobStore, SqliteDocumentStore, StaticIdentity},
        test_utils::{event_days_ago, sample_event, scratch_dir, setup_test_store},
    };
    use chrono::{Duration, Utc};
    use serde_json::json;

    fn profile(user_id: &str) -> UserProfile {
        UserProfile::new(user_id, "sam", Utc::now() - Duration::days(30))
    }

    #[tokio::test]
    async fn test_persisted_ledger_loads_back() -> Result<()> {
        let store = setup_test_store().await?;
        let mut ledger = register_user(&store, profile("u1"), "sam@example.com").await?;

        ledger.track_session(event_days_ago(2));
        ledger.record_activity(Activity::StoryShared);
        ledger.award_points(100, PointReason::AppUsage, None)?;
        ledger.purchase_reward_by_id(&RewardCatalog::default(), &RewardId::new("custom-avatar"))?;
        ledger.update_daily_goal(4)?;
        let events = ledger.drain_events();
        persist_events(&store, "u1", &ledger, &events).await?;

        let loaded = load_ledger(&store, "u1").await?;
        assert_eq!(loaded.balance(), ledger.balance());
        assert_eq!(loaded.transactions().len(), ledger.transactions().len());
        assert_eq!(loaded.milestones(), ledger.milestones());
        assert_eq!(loaded.habit_log().len(), 1);
        assert!(loaded.is_unlocked(&RewardId::new("custom-avatar")));
        assert_eq!(loaded.profile().daily_goal, 4);
        assert_eq!(loaded.engagement().stories, 1);
        assert_eq!(loaded.streak_days(), ledger.streak_days());

        let doc = store.get_user_document("u1").await?.unwrap();
        assert_eq!(doc["totalPointsEarned"], json!(ledger.balance()));
        assert_eq!(doc["unlockedRewards"], json!(["custom-avatar"]));
        Ok(())
    }

    #[tokio::test]
    async fn test_persisting_events_twice_is_idempotent() -> Result<()> {
        let store = setup_test_store().await?;
        let mut ledger = register_user(&store, profile("u1"), "sam@example.com").await?;
        ledger.track_session(sample_event());
        let events = ledger.drain_events();

        persist_events(&store, "u1", &ledger, &events).await?;
        persist_events(&store, "u1", &ledger, &events).await?;

        assert_eq!(store.list_subcollection("u1", SESSIONS).await?.len(), 1);
        assert_eq!(store.list_subcollection("u1", POINT_TRANSACTIONS).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_legacy_balance_is_reconciled_on_load() -> Result<()> {
        let store = setup_test_store().await?;
        let fields = json!({
            "username": "sam",
            "email": "sam@example.com",
            "joinDate": "2025-01-05T10:00:00Z",
            "totalPointsEarned": 150
        });
        store
            .create_user_document("legacy", fields.as_object().unwrap().clone())
            .await?;

        let ledger = load_ledger(&store, "legacy").await?;
        assert_eq!(ledger.balance(), 150);

        let stored = store.list_subcollection("legacy", POINT_TRANSACTIONS).await?;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].1["reason"], json!("Opening Balance"));

        // Second load finds a consistent history and writes nothing new.
        let again = load_ledger(&store, "legacy").await?;
        assert_eq!(again.balance(), 150);
        assert_eq!(store.list_subcollection("legacy", POINT_TRANSACTIONS).await?.len(), 1);
        Ok(())
    }

    /// Delegates to the in-memory store but refuses user document updates.
    struct RejectingTotals(SqliteDocumentStore);

    impl DocumentStore for RejectingTotals {
        async fn get_user_document(&self, user_id: &str) -> Result<Option<Fields>> {
            self.0.get_user_document(user_id).await
        }

        async fn create_user_document(&self, user_id: &str, fields: Fields) -> Result<()> {
            self.0.create_user_document(user_id, fields).await
        }

        async fn update_user_fields(&self, _user_id: &str, _fields: Fields) -> Result<()> {
            Err(Error::Storage {
                message: "user document unavailable".to_string(),
            })
        }

        async fn append_subcollection_document(
            &self,
            user_id: &str,
            collection: &str,
            document_id: &str,
            fields: Fields,
        ) -> Result<()> {
            self.0
                .append_subcollection_document(user_id, collection, document_id, fields)
                .await
        }

        async fn list_subcollection(
            &self,
            user_id: &str,
            collection: &str,
        ) -> Result<Vec<(String, Fields)>> {
            self.0.list_subcollection(user_id, collection).await
        }
    }

    #[tokio::test]
    async fn test_failed_totals_update_keeps_saved_points() -> Result<()> {
        let store = setup_test_store().await?;
        let mut ledger = register_user(&store, profile("u1"), "sam@example.com").await?;
        ledger.award_points(80, PointReason::AppUsage, None)?;
        let events = ledger.drain_events();

        let flaky = RejectingTotals(store.clone());
        let result = persist_events(&flaky, "u1", &ledger, &events).await;
        assert!(matches!(result, Err(Error::Storage { .. })));

        let doc = store.get_user_document("u1").await?.unwrap();
        assert_eq!(doc["totalPointsEarned"], json!(0));

        let reloaded = load_ledger(&store, "u1").await?;
        assert_eq!(reloaded.balance(), 80);
        assert_eq!(reloaded.transactions().len(), 1);
        assert_eq!(reloaded.transactions()[0].reason, PointReason::AppUsage);

        let doc = store.get_user_document("u1").await?.unwrap();
        assert_eq!(doc["totalPointsEarned"], json!(80));
        assert_eq!(store.list_subcollection("u1", POINT_TRANSACTIONS).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_corrupt_user_document_is_malformed() -> Result<()> {
        use crate::entities::user_document;
        use sea_orm::{ActiveModelTrait, Set};

        let store = setup_test_store().await?;
        user_document::ActiveModel {
            user_id: Set("u1".to_string()),
            fields: Set("{not json".to_string()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(store.connection())
        .await?;

        let result = load_ledger(&store, "u1").await;
        assert!(matches!(
            result,
            Err(Error::MalformedRecord { collection, .. }) if collection == "users"
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_zero_daily_goal_fails_closed() -> Result<()> {
        let store = setup_test_store().await?;
        let fields = json!({
            "username": "sam",
            "email": "sam@example.com",
            "joinDate": "2025-01-05T10:00:00Z",
            "dailyVapingGoal": 0
        });
        store
            .create_user_document("u1", fields.as_object().unwrap().clone())
            .await?;

        let result = load_ledger(&store, "u1").await;
        assert!(matches!(result, Err(Error::MalformedRecord { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_load_missing_user_fails() -> Result<()> {
        let store = setup_test_store().await?;
        let result = load_ledger(&store, "ghost").await;
        assert!(matches!(result, Err(Error::DocumentNotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_session_fails_closed() -> Result<()> {
        let store = setup_test_store().await?;
        register_user(&store, profile("u1"), "sam@example.com").await?;
        let bad = json!({"date": "2025-01-05T10:00:00Z", "intensity": 3});
        store
            .append_subcollection_document(
                "u1",
                SESSIONS,
                &uuid::Uuid::new_v4().to_string(),
                bad.as_object().unwrap().clone(),
            )
            .await?;

        let result = load_ledger(&store, "u1").await;
        assert!(matches!(
            result,
            Err(Error::MalformedRecord { collection, .. }) if collection == SESSIONS
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_load_current_ledger_requires_sign_in() -> Result<()> {
        let store = setup_test_store().await?;
        register_user(&store, profile("u1"), "sam@example.com").await?;

        let signed_out = load_current_ledger(&store, &StaticIdentity::signed_out()).await;
        assert!(matches!(signed_out, Err(Error::NotAuthenticated)));

        let ledger = load_current_ledger(&store, &StaticIdentity::signed_in("u1")).await?;
        assert_eq!(ledger.profile().username, "sam");
        Ok(())
    }

    #[tokio::test]
    async fn test_upload_profile_image_sets_url() -> Result<()> {
        let store = setup_test_store().await?;
        let blobs = LocalBlobStore::new(scratch_dir("profile_image"));
        register_user(&store, profile("u1"), "sam@example.com").await?;

        let url = upload_profile_image(&store, &blobs, "u1", b"\xFF\xD8\xFF").await?;
        assert!(url.starts_with("file://"));
        assert!(url.ends_with("profile_images/u1.jpg"));

        let doc = store.get_user_document("u1").await?.unwrap();
        assert_eq!(doc["profileImageURL"], json!(url));
        Ok(())
    }
}
