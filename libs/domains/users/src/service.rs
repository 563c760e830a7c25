//! User Service - use-case orchestration over the repository port

use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::instrument;
use validator::Validate;

use crate::error::{UserError, UserResult};
use crate::id::{IdGenerator, uuid_generator};
use crate::models::{CreateUser, UpdateUser, User, UserResponse};
use crate::repository::UserRepository;

/// User service providing the create/get/update/delete/list use-cases
///
/// The only caller of the repository. Holds no mutable state, so clones
/// share the repository and the id generator.
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
    next_id: IdGenerator,
}

impl<R: UserRepository> UserService<R> {
    /// Service that assigns random UUIDs to new users
    pub fn new(repository: R) -> Self {
        Self::with_id_generator(repository, uuid_generator())
    }

    /// Service with an injected id generator
    pub fn with_id_generator(repository: R, next_id: IdGenerator) -> Self {
        Self {
            repository: Arc::new(repository),
            next_id,
        }
    }

    /// Create a new user
    #[instrument(skip(self, cancel, input), fields(user_name = %input.name))]
    pub async fn create_user(
        &self,
        cancel: &CancellationToken,
        input: CreateUser,
    ) -> UserResult<UserResponse> {
        input.validate()?;

        let user = User::new(
            (self.next_id)(),
            input.name,
            &input.email,
            input.phone_number,
        )?;

        until_cancelled(cancel, self.repository.create(&user))
            .await
            .map_err(|e| e.within("failed to create user"))?;

        tracing::info!(user_id = %user.id, "User created");
        Ok(user.into())
    }

    /// Get a user by ID
    #[instrument(skip(self, cancel))]
    pub async fn get_user(&self, cancel: &CancellationToken, id: &str) -> UserResult<UserResponse> {
        let user = until_cancelled(cancel, self.repository.get(id))
            .await
            .map_err(|e| e.within("failed to get user"))?;

        Ok(user.into())
    }

    /// Apply a partial update.
    ///
    /// Read-modify-write: two concurrent updates of the same user race and
    /// the later write wins. An empty update still reads and writes back.
    #[instrument(skip(self, cancel, input))]
    pub async fn update_user(
        &self,
        cancel: &CancellationToken,
        id: &str,
        input: UpdateUser,
    ) -> UserResult<UserResponse> {
        input.validate()?;

        let mut user = until_cancelled(cancel, self.repository.get(id))
            .await
            .map_err(|e| e.within("failed to load user for update"))?;

        user.apply_update(input)?;

        until_cancelled(cancel, self.repository.update(&user))
            .await
            .map_err(|e| e.within("failed to update user"))?;

        tracing::info!(user_id = %user.id, "User updated");
        Ok(user.into())
    }

    /// Delete a user
    #[instrument(skip(self, cancel))]
    pub async fn delete_user(&self, cancel: &CancellationToken, id: &str) -> UserResult<()> {
        until_cancelled(cancel, self.repository.delete(id))
            .await
            .map_err(|e| e.within("failed to delete user"))?;

        tracing::info!(user_id = %id, "User deleted");
        Ok(())
    }

    /// List every user
    #[instrument(skip(self, cancel))]
    pub async fn list_users(&self, cancel: &CancellationToken) -> UserResult<Vec<UserResponse>> {
        let users = until_cancelled(cancel, self.repository.get_all())
            .await
            .map_err(|e| e.within("failed to list users"))?;

        Ok(users.into_iter().map(UserResponse::from).collect())
    }
}

impl<R: UserRepository> Clone for UserService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            next_id: Arc::clone(&self.next_id),
        }
    }
}

/// Drive `operation` unless `cancel` fires first.
///
/// An already-cancelled token wins without polling `operation`, so the store
/// is never touched.
async fn until_cancelled<T, F>(cancel: &CancellationToken, operation: F) -> UserResult<T>
where
    F: Future<Output = UserResult<T>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            tracing::debug!("Store call aborted by caller");
            Err(UserError::Cancelled)
        }
        result = operation => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::sequential_generator;
    use crate::repository::{InMemoryUserRepository, MockUserRepository};
    use std::time::Duration;

    fn john() -> CreateUser {
        CreateUser {
            name: "John Doe".to_string(),
            email: "JOHN@EXAMPLE.COM".to_string(),
            phone_number: 123456789,
        }
    }

    fn service() -> UserService<InMemoryUserRepository> {
        UserService::with_id_generator(InMemoryUserRepository::new(), sequential_generator("user"))
    }

    fn storage_down() -> UserError {
        UserError::Storage("connection reset by peer".to_string())
    }

    #[tokio::test]
    async fn test_create_user_uses_injected_id_and_normalizes_email() {
        let service = service();
        let cancel = CancellationToken::new();

        let created = service.create_user(&cancel, john()).await.unwrap();

        assert_eq!(created.id, "user-1");
        assert_eq!(created.email, "john@example.com");
        assert_eq!(service.get_user(&cancel, "user-1").await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_create_user_validation_skips_store() {
        let mut repo = MockUserRepository::new();
        repo.expect_create().never();
        let service = UserService::new(repo);

        let input = CreateUser {
            email: "not-an-email".to_string(),
            ..john()
        };
        let result = service.create_user(&CancellationToken::new(), input).await;

        assert!(matches!(result, Err(UserError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_user_blank_name_is_rejected_by_aggregate() {
        let mut repo = MockUserRepository::new();
        repo.expect_create().never();
        let service = UserService::new(repo);

        let input = CreateUser {
            name: "  ".to_string(),
            ..john()
        };
        let result = service.create_user(&CancellationToken::new(), input).await;

        assert!(matches!(result, Err(UserError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_user_wraps_storage_error_with_cause() {
        let mut repo = MockUserRepository::new();
        repo.expect_create()
            .withf(|user| user.id == "fixed-id" && user.email == "john@example.com")
            .times(1)
            .returning(|_| Err(storage_down()));
        let service = UserService::with_id_generator(repo, Arc::new(|| "fixed-id".to_string()));

        let err = service
            .create_user(&CancellationToken::new(), john())
            .await
            .unwrap_err();

        match err {
            UserError::Storage(msg) => {
                assert!(msg.starts_with("failed to create user"));
                assert!(msg.contains("connection reset by peer"));
            }
            other => panic!("expected storage error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let result = service()
            .get_user(&CancellationToken::new(), "missing-id")
            .await;

        assert!(matches!(result, Err(UserError::NotFound(ref id)) if id == "missing-id"));
    }

    #[tokio::test]
    async fn test_get_user_storage_error_is_not_not_found() {
        let mut repo = MockUserRepository::new();
        repo.expect_get().returning(|_| Err(storage_down()));
        let service = UserService::new(repo);

        let err = service
            .get_user(&CancellationToken::new(), "u-1")
            .await
            .unwrap_err();

        assert!(matches!(err, UserError::Storage(_)));
        assert!(err.to_string().contains("failed to get user"));
    }

    #[tokio::test]
    async fn test_update_user_preserves_unspecified_fields() {
        let service = service();
        let cancel = CancellationToken::new();
        let created = service
            .create_user(
                &cancel,
                CreateUser {
                    name: "Old".to_string(),
                    email: "old@x.com".to_string(),
                    phone_number: 1,
                },
            )
            .await
            .unwrap();

        let updated = service
            .update_user(
                &cancel,
                &created.id,
                UpdateUser {
                    name: Some("New".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let expected = UserResponse {
            id: created.id.clone(),
            name: "New".to_string(),
            email: "old@x.com".to_string(),
            phone_number: 1,
        };
        assert_eq!(updated, expected);
        assert_eq!(service.get_user(&cancel, &created.id).await.unwrap(), expected);
    }

    #[tokio::test]
    async fn test_update_user_not_found_skips_write() {
        let mut repo = MockUserRepository::new();
        repo.expect_get()
            .returning(|id| Err(UserError::NotFound(id.to_string())));
        repo.expect_update().never();
        let service = UserService::new(repo);

        let err = service
            .update_user(
                &CancellationToken::new(),
                "missing-id",
                UpdateUser {
                    name: Some("New".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_update_user_empty_request_still_round_trips() {
        let stored = User::new("u-1", "Old", "old@x.com", 1).unwrap();
        let mut repo = MockUserRepository::new();
        let fetched = stored.clone();
        repo.expect_get()
            .times(1)
            .returning(move |_| Ok(fetched.clone()));
        let expected = stored.clone();
        repo.expect_update()
            .withf(move |user| *user == expected)
            .times(1)
            .returning(|_| Ok(()));
        let service = UserService::new(repo);

        let result = service
            .update_user(&CancellationToken::new(), "u-1", UpdateUser::default())
            .await
            .unwrap();

        assert_eq!(result, UserResponse::from(stored));
    }

    #[tokio::test]
    async fn test_update_user_wraps_write_failure() {
        let mut repo = MockUserRepository::new();
        repo.expect_get()
            .returning(|_| Ok(User::new("u-1", "Old", "old@x.com", 1).unwrap()));
        repo.expect_update().returning(|_| Err(storage_down()));
        let service = UserService::new(repo);

        let err = service
            .update_user(&CancellationToken::new(), "u-1", UpdateUser::default())
            .await
            .unwrap_err();

        assert!(matches!(err, UserError::Storage(ref msg) if msg.starts_with("failed to update user")));
    }

    #[tokio::test]
    async fn test_update_user_deleted_between_read_and_write_is_not_found() {
        let mut repo = MockUserRepository::new();
        repo.expect_get()
            .times(1)
            .returning(|_| Ok(User::new("u-1", "Old", "old@x.com", 1).unwrap()));
        repo.expect_update()
            .times(1)
            .returning(|user| Err(UserError::NotFound(user.id.clone())));
        let service = UserService::new(repo);

        let input = UpdateUser {
            name: Some("New".to_string()),
            ..Default::default()
        };
        let err = service
            .update_user(&CancellationToken::new(), "u-1", input)
            .await
            .unwrap_err();

        assert!(matches!(err, UserError::NotFound(ref id) if id == "u-1"));
    }

    #[tokio::test]
    async fn test_update_user_invalid_field_skips_store() {
        let mut repo = MockUserRepository::new();
        repo.expect_get().never();
        repo.expect_update().never();
        let service = UserService::new(repo);

        let result = service
            .update_user(
                &CancellationToken::new(),
                "u-1",
                UpdateUser {
                    phone_number: Some(-1),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(UserError::Validation(_))));
    }

    #[tokio::test]
    async fn test_delete_user_twice() {
        let service = service();
        let cancel = CancellationToken::new();
        let created = service.create_user(&cancel, john()).await.unwrap();

        service.delete_user(&cancel, &created.id).await.unwrap();
        let second = service.delete_user(&cancel, &created.id).await;

        assert!(matches!(second, Err(UserError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_user_wraps_storage_error() {
        let mut repo = MockUserRepository::new();
        repo.expect_delete().returning(|_| Err(storage_down()));
        let service = UserService::new(repo);

        let err = service
            .delete_user(&CancellationToken::new(), "u-1")
            .await
            .unwrap_err();

        assert!(err.to_string().contains("failed to delete user"));
        assert!(err.to_string().contains("connection reset by peer"));
    }

    #[tokio::test]
    async fn test_list_users_empty() {
        let users = service().list_users(&CancellationToken::new()).await.unwrap();
        assert!(users.is_empty());
    }

    #[tokio::test]
    async fn test_list_users_projects_every_user() {
        let service = service();
        let cancel = CancellationToken::new();
        service.create_user(&cancel, john()).await.unwrap();
        service
            .create_user(
                &cancel,
                CreateUser {
                    name: "Jane Roe".to_string(),
                    email: "jane@example.com".to_string(),
                    phone_number: 0,
                },
            )
            .await
            .unwrap();

        let users = service.list_users(&cancel).await.unwrap();

        let ids: Vec<&str> = users.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, ["user-1", "user-2"]);
    }

    #[tokio::test]
    async fn test_cancelled_token_never_reaches_store() {
        let mut repo = MockUserRepository::new();
        repo.expect_create().never();
        repo.expect_get().never();
        repo.expect_get_all().never();
        repo.expect_delete().never();
        let service = UserService::new(repo);

        let cancel = CancellationToken::new();
        cancel.cancel();

        assert!(service.create_user(&cancel, john()).await.unwrap_err().is_cancelled());
        assert!(service.get_user(&cancel, "u-1").await.unwrap_err().is_cancelled());
        assert!(
            service
                .update_user(&cancel, "u-1", UpdateUser::default())
                .await
                .unwrap_err()
                .is_cancelled()
        );
        assert!(service.delete_user(&cancel, "u-1").await.unwrap_err().is_cancelled());
        assert!(service.list_users(&cancel).await.unwrap_err().is_cancelled());
    }

    #[tokio::test]
    async fn test_cancellation_aborts_outstanding_store_call() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let result = until_cancelled(&cancel, async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok::<_, UserError>(())
        })
        .await;

        assert!(matches!(result, Err(UserError::Cancelled)));
    }
}
