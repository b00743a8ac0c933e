//! Unified error type for the progress ledger and its storage boundary.
//!
//! Ledger rule violations (`InvalidAmount`, `InsufficientPoints`, `AlreadyUnlocked`,
//! `NotFound`) are returned as values so callers can tell exactly which invariant
//! blocked an operation. Backend failures are wrapped and passed through untouched.

use thiserror::Error;

/// All errors produced by this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// A point award was requested with a non-positive amount
    #[error("Invalid point amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: i64,
    },

    /// The balance does not cover the reward's cost
    #[error("Not enough points: balance {balance}, cost {cost}")]
    InsufficientPoints {
        /// Current point balance
        balance: i64,
        /// Point cost of the reward
        cost: i64,
    },

    /// The reward has already been purchased
    #[error("Reward already unlocked: {reward_id}")]
    AlreadyUnlocked {
        /// Identifier of the reward
        reward_id: String,
    },

    /// The referenced reward is not in the catalog
    #[error("Reward not found: {reward_id}")]
    NotFound {
        /// Identifier that failed to resolve
        reward_id: String,
    },

    /// A bounded scale value was outside its declared range
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        /// Name of the bounded field
        field: &'static str,
        /// The rejected value
        value: i64,
        /// Inclusive lower bound
        min: u8,
        /// Inclusive upper bound
        max: u8,
    },

    /// The daily goal must be a positive number of sessions
    #[error("Invalid daily goal: {goal}")]
    InvalidGoal {
        /// The rejected goal
        goal: i64,
    },

    /// A stored record could not be decoded into its typed form
    #[error("Malformed {collection} record: {message}")]
    MalformedRecord {
        /// Collection (or document kind) the record came from
        collection: String,
        /// What was wrong with it
        message: String,
    },

    /// No user document exists for the given user
    #[error("User document not found: {user_id}")]
    DocumentNotFound {
        /// The user whose document is missing
        user_id: String,
    },

    /// No authenticated user is available
    #[error("No authenticated user")]
    NotAuthenticated,

    /// Invalid or unreadable configuration
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Backend storage failure not covered by a more specific variant
    #[error("Storage error: {message}")]
    Storage {
        /// Error message
        message: String,
    },

    /// Database failure from `SeaORM`
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Filesystem failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
