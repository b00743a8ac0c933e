//! User document entity - one JSON document of profile and progress fields per user.
//!
//! Fields are stored as a serialized JSON object in `fields` so the table mirrors a
//! schemaless document store. Typed decoding happens in `store::records`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User document database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_documents")]
pub struct Model {
    /// Unique identifier for the row
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Backend user id that owns the document
    #[sea_orm(unique)]
    pub user_id: String,
    /// JSON object holding the document's fields
    pub fields: String,
    /// When the document was last written
    pub updated_at: DateTimeUtc,
}

/// User documents have no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
