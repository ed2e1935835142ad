use std::collections::HashMap;

use axum::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{with_id, Collection, Document, DocumentStore, InsertOneResult, StoreError, ID_FIELD};
use crate::auth::repo_types::{NewUser, User};

/// In-process store backing the router tests.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<Vec<User>>,
    collections: RwLock<HashMap<Collection, Vec<(Uuid, Document)>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn users(&self) -> Vec<User> {
        self.users.read().await.clone()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate(user.email));
        }
        let user = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            created_at: OffsetDateTime::now_utc(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_all(&self, collection: Collection) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .map(|docs| docs.iter().map(|(id, d)| with_id(d.clone(), *id)).collect())
            .unwrap_or_default())
    }

    async fn find_by_id(
        &self,
        collection: Collection,
        id: Uuid,
    ) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections.get(&collection).and_then(|docs| {
            docs.iter()
                .find(|(doc_id, _)| *doc_id == id)
                .map(|(doc_id, d)| with_id(d.clone(), *doc_id))
        }))
    }

    async fn find_by_field_ignore_case(
        &self,
        collection: Collection,
        field: &str,
        value: &str,
    ) -> Result<Vec<Document>, StoreError> {
        let wanted = value.to_lowercase();
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, d)| {
                        d.get(field)
                            .and_then(|v| v.as_str())
                            .is_some_and(|s| s.to_lowercase() == wanted)
                    })
                    .map(|(id, d)| with_id(d.clone(), *id))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn insert_one(
        &self,
        collection: Collection,
        mut doc: Document,
    ) -> Result<InsertOneResult, StoreError> {
        doc.remove(ID_FIELD);
        let id = Uuid::new_v4();
        self.collections
            .write()
            .await
            .entry(collection)
            .or_default()
            .push((id, doc));
        Ok(InsertOneResult {
            acknowledged: true,
            inserted_id: id,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Ada".into(),
            email: email.into(),
            password_hash: "$argon2id$placeholder".into(),
        }
    }

    #[tokio::test]
    async fn insert_user_twice_is_duplicate() {
        let store = MemoryStore::new();
        let first = store.insert_user(new_user("ada@example.com")).await.unwrap();

        let err = store.insert_user(new_user("ada@example.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(ref email) if email == "ada@example.com"));

        let users = store.users().await;
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].id, first.id);
    }

    #[tokio::test]
    async fn insert_one_replaces_caller_id() {
        let store = MemoryStore::new();
        let Value::Object(doc) = json!({ "_id": "mine", "x": 1 }) else {
            unreachable!()
        };
        let result = store.insert_one(Collection::Reverie, doc).await.unwrap();

        let stored = store
            .find_by_id(Collection::Reverie, result.inserted_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored[ID_FIELD], json!(result.inserted_id.to_string()));
        assert_eq!(stored["x"], json!(1));
    }
}
