use dotenvy::dotenv;
use regretless::{
    config::{database, rewards, settings::Settings},
    errors::Result,
    store::{SqliteDocumentStore, StaticIdentity, sync},
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, non-fatal since env vars can be set externally
    dotenv().ok();
    let settings = Settings::from_env();
    info!(
        blob_root = %settings.blob_root.display(),
        rewards_config = %settings.rewards_config.display(),
        "Loaded settings"
    );

    // 3. Connect and make sure the document tables exist
    let db = database::create_connection(&settings.database_url)
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;
    let store = SqliteDocumentStore::new(db);

    // 4. Reward catalog
    let catalog = rewards::load_catalog(&settings.rewards_config)
        .inspect_err(|e| error!("Failed to load reward catalog: {}", e))?;

    // 5. Summarize the configured user's progress
    let identity = StaticIdentity::from(settings.user_id.clone());
    let ledger = match sync::load_current_ledger(&store, &identity).await {
        Ok(ledger) => ledger,
        Err(regretless::errors::Error::NotAuthenticated) => {
            warn!("REGRETLESS_USER_ID is not set, nothing to summarize");
            return Ok(());
        }
        Err(e) => {
            error!("Failed to load ledger: {}", e);
            return Err(e);
        }
    };

    let savings = ledger.savings(chrono::Utc::now());
    let unlocked: Vec<&str> = ledger
        .unlocked_in(&catalog)
        .into_iter()
        .map(|r| r.title.as_str())
        .collect();
    info!(
        user = %ledger.profile().username,
        balance = ledger.balance(),
        streak_days = ledger.streak_days(),
        sessions_today = ledger.daily_count(),
        sessions_this_week = ledger.weekly_count(),
        goal_remaining = ledger.daily_goal_remaining(),
        milestones = ledger.milestones().len(),
        ?unlocked,
        saved = %format!("{:.2}", savings.current),
        yearly = %format!("{:.2}", savings.yearly),
        "Progress summary"
    );

    for milestone in ledger.milestones() {
        info!(
            title = %milestone.title,
            points = milestone.points_awarded,
            achieved = %milestone.date_achieved.date_naive(),
            "Milestone"
        );
    }

    Ok(())
}
