use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{UserError, UserResult};
use crate::models::User;

/// Persistence port for the user aggregate
///
/// `get`, `update` and `delete` report a missing record as
/// [`UserError::NotFound`]; every other failure is [`UserError::Storage`].
/// `update` receives the fully merged aggregate.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user
    async fn create(&self, user: &User) -> UserResult<()>;

    /// Fetch a user by id
    async fn get(&self, id: &str) -> UserResult<User>;

    /// Fetch every user
    async fn get_all(&self) -> UserResult<Vec<User>>;

    /// Overwrite the stored fields of an existing user
    async fn update(&self, user: &User) -> UserResult<()>;

    /// Remove a user by id
    async fn delete(&self, id: &str) -> UserResult<()>;
}

/// In-memory implementation of UserRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: &User) -> UserResult<()> {
        let mut users = self.users.write().await;

        if users.contains_key(&user.id) {
            return Err(UserError::Storage(format!(
                "duplicate key: user {} already exists",
                user.id
            )));
        }

        users.insert(user.id.clone(), user.clone());
        tracing::debug!(user_id = %user.id, "Inserted user");
        Ok(())
    }

    async fn get(&self, id: &str) -> UserResult<User> {
        self.users
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| UserError::NotFound(id.to_string()))
    }

    async fn get_all(&self) -> UserResult<Vec<User>> {
        let users = self.users.read().await;
        let mut all: Vec<User> = users.values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(all)
    }

    async fn update(&self, user: &User) -> UserResult<()> {
        let mut users = self.users.write().await;

        match users.get_mut(&user.id) {
            Some(stored) => {
                stored.clone_from(user);
                tracing::debug!(user_id = %user.id, "Updated user");
                Ok(())
            }
            None => Err(UserError::NotFound(user.id.clone())),
        }
    }

    async fn delete(&self, id: &str) -> UserResult<()> {
        match self.users.write().await.remove(id) {
            Some(_) => {
                tracing::debug!(user_id = %id, "Deleted user");
                Ok(())
            }
            None => Err(UserError::NotFound(id.to_string())),
        }
    }
}
