use axum::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::auth::repo_types::{NewUser, User};

#[cfg(test)]
pub mod memory;

/// A schema-less JSON record as stored in a collection.
pub type Document = Map<String, Value>;

/// Field under which the generated identifier is exposed on every document.
pub const ID_FIELD: &str = "_id";

/// Document collections served by the API. Users live in their own typed table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    FlashSale,
    Products,
    Reverie,
}

impl Collection {
    pub fn table(self) -> &'static str {
        match self {
            Collection::FlashSale => "flash_sale",
            Collection::Products => "products",
            Collection::Reverie => "reverie",
        }
    }
}

/// Acknowledgement returned after a single-document insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertOneResult {
    pub acknowledged: bool,
    pub inserted_id: Uuid,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("duplicate key: {0}")]
    Duplicate(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Fails with [`StoreError::Duplicate`] if the email is already taken.
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError>;

    /// All documents of a collection in insertion order.
    async fn find_all(&self, collection: Collection) -> Result<Vec<Document>, StoreError>;

    async fn find_by_id(
        &self,
        collection: Collection,
        id: Uuid,
    ) -> Result<Option<Document>, StoreError>;

    /// Documents whose string `field` equals `value`, ignoring case.
    async fn find_by_field_ignore_case(
        &self,
        collection: Collection,
        field: &str,
        value: &str,
    ) -> Result<Vec<Document>, StoreError>;

    /// Inserts `doc` under a freshly generated identifier. Any `_id` on the
    /// incoming document is dropped.
    async fn insert_one(
        &self,
        collection: Collection,
        doc: Document,
    ) -> Result<InsertOneResult, StoreError>;
}

/// Merges the identifier into a stored document the way it is served.
pub fn with_id(mut doc: Document, id: Uuid) -> Document {
    doc.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
    doc
}
