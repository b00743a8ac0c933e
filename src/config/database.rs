//! Database configuration for the document store.
//!
//! This module handles `SQLite` connections and table creation using `SeaORM`. Tables
//! are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust structs without hand-written SQL.

use crate::entities::{SubcollectionDocument, UserDocument};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Default `SQLite` location, created on first connect.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/regretless.sqlite?mode=rwc";

/// Connects to the database at `database_url`.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    tracing::debug!(database_url, "Connecting to database");
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates the document tables if they do not exist yet.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut user_table = schema.create_table_from_entity(UserDocument);
    let mut subcollection_table = schema.create_table_from_entity(SubcollectionDocument);

    user_table.if_not_exists();
    subcollection_table.if_not_exists();

    db.execute(builder.build(&user_table)).await?;
    db.execute(builder.build(&subcollection_table)).await?;

    Ok(())
}
