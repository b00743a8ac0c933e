//! Subcollection document entity - documents nested under a user, such as
//! `milestones`, `pointTransactions` and `sessions`.
//!
//! Rows are read back in insertion order (by `id`).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Subcollection document database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "subcollection_documents")]
pub struct Model {
    /// Unique identifier for the row, also the insertion order
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning user id
    pub user_id: String,
    /// Subcollection name (e.g. `"milestones"`)
    pub collection: String,
    /// Document id within the subcollection
    pub document_id: String,
    /// JSON object holding the document's fields
    pub fields: String,
    /// When the document was written
    pub created_at: DateTimeUtc,
}

/// Subcollection documents are keyed by `user_id` without a foreign key, since
/// writes may arrive before the user document exists.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
