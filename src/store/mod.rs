//! Backend contracts and their local implementations.
//!
//! The ledger never talks to the backend itself. These traits describe the three
//! services it relies on (a per-user document store, an identity provider and a
//! blob store); `sync` moves ledger state across that boundary.

pub mod blob;
pub mod document;
pub mod identity;
pub mod records;
pub mod sync;

use crate::errors::Result;
use std::future::Future;

pub use blob::LocalBlobStore;
pub use document::SqliteDocumentStore;
pub use identity::StaticIdentity;

/// Field map of one document.
pub type Fields = serde_json::Map<String, serde_json::Value>;

/// Per-user document storage with named subcollections.
///
/// A reported success means the write is durable.
pub trait DocumentStore {
    /// Fetches a user's document, `None` if it does not exist.
    fn get_user_document(&self, user_id: &str)
    -> impl Future<Output = Result<Option<Fields>>> + Send;

    /// Creates a user's document. Fails if one already exists.
    fn create_user_document(
        &self,
        user_id: &str,
        fields: Fields,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Merges `fields` into an existing user document.
    ///
    /// Fails with `DocumentNotFound` if the user has no document.
    fn update_user_fields(
        &self,
        user_id: &str,
        fields: Fields,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Writes a document into one of the user's subcollections, replacing any
    /// document with the same id.
    fn append_subcollection_document(
        &self,
        user_id: &str,
        collection: &str,
        document_id: &str,
        fields: Fields,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Lists a subcollection as `(document_id, fields)` pairs in insertion order.
    fn list_subcollection(
        &self,
        user_id: &str,
        collection: &str,
    ) -> impl Future<Output = Result<Vec<(String, Fields)>>> + Send;
}

/// Source of the signed-in user's id.
pub trait IdentityProvider {
    /// The current user's id, `None` when signed out.
    fn current_user_id(&self) -> Option<String>;
}

/// Binary object storage.
pub trait BlobStore {
    /// Stores `bytes` at `path` and returns a URL for it.
    fn upload(&self, bytes: &[u8], path: &str) -> impl Future<Output = Result<String>> + Send;
}
