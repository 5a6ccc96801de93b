use std::collections::HashMap;

use async_trait::async_trait;
use rpc_kit::{Classify, StoreErrorKind};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::model::User;

/// Failure reported by a [`UserStore`], classified so the service can map
/// it to a response code.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct StoreError {
    pub kind: StoreErrorKind,
    pub message: String,
}

impl StoreError {
    pub fn new(kind: StoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    fn no_rows(uuid: Uuid) -> Self {
        Self::new(StoreErrorKind::NoRows, format!("no user with uuid {uuid}"))
    }

    fn email_taken(email: &str) -> Self {
        Self::new(
            StoreErrorKind::UniqueViolation,
            format!("a user with email {email:?} already exists"),
        )
    }
}

impl Classify for StoreError {
    fn kind(&self) -> StoreErrorKind {
        self.kind
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence seam of the users service.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Creates a user with a fresh UUID. E-mails are unique.
    async fn insert(&self, email: &str) -> StoreResult<User>;

    async fn get_by_uuid(&self, uuid: Uuid) -> StoreResult<User>;

    async fn get_by_email(&self, email: &str) -> StoreResult<User>;

    async fn update_by_uuid(&self, uuid: Uuid, email: &str) -> StoreResult<User>;

    async fn delete_by_uuid(&self, uuid: Uuid) -> StoreResult<()>;
}

/// In-process [`UserStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn email_owner<'a>(users: &'a HashMap<Uuid, User>, email: &str) -> Option<&'a User> {
    users.values().find(|user| user.email == email)
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert(&self, email: &str) -> StoreResult<User> {
        let mut users = self.users.write().await;
        if email_owner(&users, email).is_some() {
            return Err(StoreError::email_taken(email));
        }
        let user = User {
            uuid: Uuid::new_v4(),
            email: email.to_string(),
        };
        users.insert(user.uuid, user.clone());
        Ok(user)
    }

    async fn get_by_uuid(&self, uuid: Uuid) -> StoreResult<User> {
        self.users
            .read()
            .await
            .get(&uuid)
            .cloned()
            .ok_or_else(|| StoreError::no_rows(uuid))
    }

    async fn get_by_email(&self, email: &str) -> StoreResult<User> {
        let users = self.users.read().await;
        email_owner(&users, email).cloned().ok_or_else(|| {
            StoreError::new(StoreErrorKind::NoRows, format!("no user with email {email:?}"))
        })
    }

    async fn update_by_uuid(&self, uuid: Uuid, email: &str) -> StoreResult<User> {
        let mut users = self.users.write().await;
        if email_owner(&users, email).is_some_and(|owner| owner.uuid != uuid) {
            return Err(StoreError::email_taken(email));
        }
        let user = users.get_mut(&uuid).ok_or_else(|| StoreError::no_rows(uuid))?;
        user.email = email.to_string();
        Ok(user.clone())
    }

    async fn delete_by_uuid(&self, uuid: Uuid) -> StoreResult<()> {
        self.users
            .write()
            .await
            .remove(&uuid)
            .map(|_| ())
            .ok_or_else(|| StoreError::no_rows(uuid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn emails_are_unique() {
        let store = MemoryStore::new();
        let first = store.insert("a@b.com").await.unwrap();
        let err = store.insert("a@b.com").await.unwrap_err();
        assert_eq!(err.kind(), StoreErrorKind::UniqueViolation);

        let second = store.insert("c@d.com").await.unwrap();
        let err = store.update_by_uuid(second.uuid, "a@b.com").await.unwrap_err();
        assert_eq!(err.kind, StoreErrorKind::UniqueViolation);

        // keeping one's own address is not a conflict
        let same = store.update_by_uuid(first.uuid, "a@b.com").await.unwrap();
        assert_eq!(same, first);
    }

    #[tokio::test]
    async fn missing_rows_are_reported() {
        let store = MemoryStore::new();
        let unknown = Uuid::new_v4();
        assert_eq!(store.get_by_uuid(unknown).await.unwrap_err().kind, StoreErrorKind::NoRows);
        assert_eq!(store.get_by_email("x@y.z").await.unwrap_err().kind, StoreErrorKind::NoRows);
        assert_eq!(
            store.update_by_uuid(unknown, "x@y.z").await.unwrap_err().kind,
            StoreErrorKind::NoRows
        );
        assert_eq!(store.delete_by_uuid(unknown).await.unwrap_err().kind, StoreErrorKind::NoRows);
    }

    #[tokio::test]
    async fn lookups_find_inserted_users() {
        let store = MemoryStore::new();
        let user = store.insert("a@b.com").await.unwrap();
        assert_eq!(store.get_by_uuid(user.uuid).await.unwrap(), user);
        assert_eq!(store.get_by_email("a@b.com").await.unwrap(), user);

        store.delete_by_uuid(user.uuid).await.unwrap();
        assert!(store.get_by_uuid(user.uuid).await.is_err());
    }
}
