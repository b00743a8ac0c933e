//! `SQLite` document store built on `SeaORM`.
//!
//! User documents and subcollection documents are rows holding a JSON object. All
//! writes go through a database transaction so a failed write leaves nothing behind.

use super::{DocumentStore, Fields};
use crate::{
    entities::{SubcollectionDocument, UserDocument, subcollection_document, user_document},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};

/// Document store on a `SeaORM` connection.
#[derive(Debug, Clone)]
pub struct SqliteDocumentStore {
    db: DatabaseConnection,
}

impl SqliteDocumentStore {
    /// Wraps an open connection. Tables must already exist.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Underlying connection
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

fn encode(fields: &Fields) -> Result<String> {
    serde_json::to_string(fields).map_err(Into::into)
}

fn decode(collection: &str, raw: &str) -> Result<Fields> {
    let value = serde_json::from_str(raw).map_err(|e| Error::MalformedRecord {
        collection: collection.to_string(),
        message: format!("stored document is not valid JSON: {e}"),
    })?;
    match value {
        serde_json::Value::Object(fields) => Ok(fields),
        other => Err(Error::MalformedRecord {
            collection: collection.to_string(),
            message: format!("expected a JSON object, found {other}"),
        }),
    }
}

impl DocumentStore for SqliteDocumentStore {
    async fn get_user_document(&self, user_id: &str) -> Result<Option<Fields>> {
        let row = UserDocument::find()
            .filter(user_document::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?;
        row.map(|r| decode("users", &r.fields)).transpose()
    }

    async fn create_user_document(&self, user_id: &str, fields: Fields) -> Result<()> {
        let txn = self.db.begin().await?;

        let existing = UserDocument::find()
            .filter(user_document::Column::UserId.eq(user_id))
            .one(&txn)
            .await?;
        if existing.is_some() {
            return Err(Error::Storage {
                message: format!("User document already exists: {user_id}"),
            });
        }

        user_document::ActiveModel {
            user_id: Set(user_id.to_string()),
            fields: Set(encode(&fields)?),
            updated_at: Set(chrono::Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        tracing::debug!(user_id, "Created user document");
        Ok(())
    }

    async fn update_user_fields(&self, user_id: &str, fields: Fields) -> Result<()> {
        let txn = self.db.begin().await?;

        let row = UserDocument::find()
            .filter(user_document::Column::UserId.eq(user_id))
            .one(&txn)
            .await?
            .ok_or_else(|| Error::DocumentNotFound {
                user_id: user_id.to_string(),
            })?;

        let mut merged = decode("users", &row.fields)?;
        merged.extend(fields);

        let mut active: user_document::ActiveModel = row.into();
        active.fields = Set(encode(&merged)?);
        active.updated_at = Set(chrono::Utc::now());
        active.update(&txn).await?;

        txn.commit().await?;
        tracing::debug!(user_id, "Updated user document");
        Ok(())
    }

    async fn append_subcollection_document(
        &self,
        user_id: &str,
        collection: &str,
        document_id: &str,
        fields: Fields,
    ) -> Result<()> {
        let txn = self.db.begin().await?;
        let encoded = encode(&fields)?;

        let existing = SubcollectionDocument::find()
            .filter(subcollection_document::Column::UserId.eq(user_id))
            .filter(subcollection_document::Column::Collection.eq(collection))
            .filter(subcollection_document::Column::DocumentId.eq(document_id))
            .one(&txn)
            .await?;

        if let Some(row) = existing {
            let mut active: subcollection_document::ActiveModel = row.into();
            active.fields = Set(encoded);
            active.update(&txn).await?;
        } else {
            subcollection_document::ActiveModel {
                user_id: Set(user_id.to_string()),
                collection: Set(collection.to_string()),
                document_id: Set(document_id.to_string()),
                fields: Set(encoded),
                created_at: Set(chrono::Utc::now()),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;
        tracing::debug!(user_id, collection, document_id, "Wrote subcollection document");
        Ok(())
    }

    async fn list_subcollection(
        &self,
        user_id: &str,
        collection: &str,
    ) -> Result<Vec<(String, Fields)>> {
        let rows = SubcollectionDocument::find()
            .filter(subcollection_document::Column::UserId.eq(user_id))
            .filter(subcollection_document::Column::Collection.eq(collection))
            .order_by_asc(subcollection_document::Column::Id)
            .all(&self.db)
            .await?;

        rows.into_iter()
            .map(|r| decode(collection, &r.fields).map(|fields| (r.document_id, fields)))
            .collect()
    }
}
