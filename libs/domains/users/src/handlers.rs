use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use utoipa::{OpenApi, ToSchema};

use crate::error::UserResult;
use crate::extract::ValidatedJson;
use crate::models::{CreateUser, UpdateUser, UserResponse};
use crate::repository::UserRepository;
use crate::service::UserService;

/// OpenAPI documentation for the Users API
#[derive(OpenApi)]
#[openapi(
    paths(list_users, create_user, get_user, update_user, delete_user),
    components(schemas(UserResponse, CreateUser, UpdateUser, MessageResponse)),
    tags(
        (name = "Users", description = "User management endpoints (MongoDB)")
    )
)]
pub struct ApiDoc;

/// Confirmation body for operations without a resource to return
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

struct HandlerState<R: UserRepository> {
    service: UserService<R>,
    /// Parent of every per-request token; cancelled on server shutdown
    shutdown: CancellationToken,
}

/// Create the users router
///
/// Cancelling `shutdown` aborts the store calls of requests still in flight.
pub fn router<R: UserRepository + 'static>(
    service: UserService<R>,
    shutdown: CancellationToken,
) -> Router {
    let state = Arc::new(HandlerState { service, shutdown });

    Router::new()
        .route("/", get(list_users).post(create_user))
        .route(
            "/{id}",
            get(get_user).patch(update_user).delete(delete_user),
        )
        .with_state(state)
}

/// List all users
#[utoipa::path(
    get,
    path = "",
    tag = "Users",
    responses(
        (status = 200, description = "All users", body = Vec<UserResponse>),
        (status = 500, description = "Storage failure")
    )
)]
async fn list_users<R: UserRepository>(
    State(state): State<Arc<HandlerState<R>>>,
) -> UserResult<Json<Vec<UserResponse>>> {
    let cancel = state.shutdown.child_token();
    let users = state.service.list_users(&cancel).await?;
    Ok(Json(users))
}

/// Create a new user
#[utoipa::path(
    post,
    path = "",
    tag = "Users",
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid input"),
        (status = 500, description = "Storage failure")
    )
)]
async fn create_user<R: UserRepository>(
    State(state): State<Arc<HandlerState<R>>>,
    ValidatedJson(input): ValidatedJson<CreateUser>,
) -> UserResult<impl IntoResponse> {
    let cancel = state.shutdown.child_token();
    let user = state.service.create_user(&cancel, input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Get a user by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Users",
    params(
        ("id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 404, description = "No user with this ID"),
        (status = 500, description = "Storage failure")
    )
)]
async fn get_user<R: UserRepository>(
    State(state): State<Arc<HandlerState<R>>>,
    Path(id): Path<String>,
) -> UserResult<Json<UserResponse>> {
    let cancel = state.shutdown.child_token();
    let user = state.service.get_user(&cancel, &id).await?;
    Ok(Json(user))
}

/// Update the fields present in the body
#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Users",
    params(
        ("id" = String, Path, description = "User ID")
    ),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "No user with this ID"),
        (status = 500, description = "Storage failure")
    )
)]
async fn update_user<R: UserRepository>(
    State(state): State<Arc<HandlerState<R>>>,
    Path(id): Path<String>,
    ValidatedJson(input): ValidatedJson<UpdateUser>,
) -> UserResult<Json<UserResponse>> {
    let cancel = state.shutdown.child_token();
    let user = state.service.update_user(&cancel, &id, input).await?;
    Ok(Json(user))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Users",
    params(
        ("id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 404, description = "No user with this ID"),
        (status = 500, description = "Storage failure")
    )
)]
async fn delete_user<R: UserRepository>(
    State(state): State<Arc<HandlerState<R>>>,
    Path(id): Path<String>,
) -> UserResult<Json<MessageResponse>> {
    let cancel = state.shutdown.child_token();
    state.service.delete_user(&cancel, &id).await?;
    Ok(Json(MessageResponse {
        message: "User deleted successfully".to_string(),
    }))
}
