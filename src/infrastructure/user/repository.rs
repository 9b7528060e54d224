//! In-memory user repository implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::user::{NewUser, User, UserId, UserRepository};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<UserId, User>,
    /// Index for email -> user ID lookup
    email_index: HashMap<String, UserId>,
    last_id: u64,
}

/// In-memory implementation of UserRepository
///
/// Both maps live behind one lock so that the email uniqueness check and the
/// insert are atomic.
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users
    pub async fn len(&self) -> usize {
        self.tables.read().await.users.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get(&self, id: UserId) -> Result<Option<User>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(&id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let tables = self.tables.read().await;

        Ok(tables
            .email_index
            .get(email)
            .and_then(|id| tables.users.get(id))
            .cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, DomainError> {
        let mut tables = self.tables.write().await;

        if tables.email_index.contains_key(&user.email) {
            return Err(DomainError::conflict(format!(
                "Email '{}' already exists",
                user.email
            )));
        }

        tables.last_id += 1;
        let id = UserId::new(tables.last_id);
        let user = User::new(id, user);

        tables.email_index.insert(user.email().to_string(), id);
        tables.users.insert(id, user.clone());

        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let mut tables = self.tables.write().await;

        match tables.users.get_mut(&user.id()) {
            Some(stored) => {
                *stored = user.clone();
                Ok(user.clone())
            }
            None => Err(DomainError::not_found(format!("User '{}' not found", user.id()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::{Membership, Profile};
    use chrono::Utc;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            password_hash: "hashed_password".to_string(),
            membership: Membership::new_member(Utc::now()),
        }
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let repo = InMemoryUserRepository::new();

        let first = repo.create(new_user("a@x.com")).await.unwrap();
        let second = repo.create(new_user("b@x.com")).await.unwrap();

        assert_eq!(first.id(), UserId::new(1));
        assert_eq!(second.id(), UserId::new(2));
    }

    #[tokio::test]
    async fn test_get_and_get_by_email() {
        let repo = InMemoryUserRepository::new();
        let user = repo.create(new_user("a@x.com")).await.unwrap();

        let by_id = repo.get(user.id()).await.unwrap().unwrap();
        assert_eq!(by_id.email(), "a@x.com");

        let by_email = repo.get_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(by_email.id(), user.id());

        assert!(repo.get(UserId::new(99)).await.unwrap().is_none());
        assert!(repo.get_by_email("A@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email() {
        let repo = InMemoryUserRepository::new();

        repo.create(new_user("a@x.com")).await.unwrap();
        let result = repo.create(new_user("a@x.com")).await;

        assert!(matches!(result, Err(DomainError::Conflict { .. })));
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_update() {
        let repo = InMemoryUserRepository::new();
        let mut user = repo.create(new_user("a@x.com")).await.unwrap();

        user.set_profile(Profile {
            first_name: "Ada".to_string(),
            ..Profile::default()
        });
        repo.update(&user).await.unwrap();

        let stored = repo.get(user.id()).await.unwrap().unwrap();
        assert_eq!(stored.profile().first_name, "Ada");
    }

    #[tokio::test]
    async fn test_update_missing_user() {
        let repo = InMemoryUserRepository::new();
        let other = InMemoryUserRepository::new();
        let user = other.create(new_user("a@x.com")).await.unwrap();

        let result = repo.update(&user).await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_email_exists() {
        let repo = InMemoryUserRepository::new();
        repo.create(new_user("a@x.com")).await.unwrap();

        assert!(repo.email_exists("a@x.com").await.unwrap());
        assert!(!repo.email_exists("b@x.com").await.unwrap());
    }
}
