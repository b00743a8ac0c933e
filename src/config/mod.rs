/// Database configuration and connection management
pub mod database;

/// Reward catalog loading from rewards.toml
pub mod rewards;

/// Runtime settings from environment variables
pub mod settings;
