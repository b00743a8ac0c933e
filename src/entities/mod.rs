//! Entity module - Contains the SeaORM entities backing the document store.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod subcollection_document;
pub mod user_document;

// Re-export specific types to avoid conflicts
pub use subcollection_document::{
    Entity as SubcollectionDocument, Model as SubcollectionDocumentModel,
};
pub use user_document::{Entity as UserDocument, Model as UserDocumentModel};
