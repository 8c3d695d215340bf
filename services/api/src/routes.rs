//! API service routes

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;

use crate::{
    error::ApiError,
    models::{NewUser, UpdateUser, UserResponse},
    state::AppState,
};

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let users = Router::new()
        .route("/users", post(create_user).get(get_users))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        );

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", users)
        .with_state(state)
}

/// Health check endpoint; reports whether the database is reachable
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database_up = common::database::health_check(&state.db_pool)
        .await
        .unwrap_or(false);

    let status = if database_up { "healthy" } else { "degraded" };
    Json(json!({
        "status": status,
        "database": database_up,
    }))
}

/// Create a new user
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<NewUser>,
) -> Result<impl IntoResponse, ApiError> {
    let existing = state
        .user_repository
        .find_by_login_id(&payload.login_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to check login_id: {}", e);
            ApiError::InternalServerError
        })?;
    if existing.is_some() {
        return Err(ApiError::BadRequest("login_id already exists".to_string()));
    }

    let user = state.user_repository.create(&payload).await.map_err(|e| {
        tracing::error!("Failed to create user: {}", e);
        ApiError::InternalServerError
    })?;

    Ok((
        StatusCode::CREATED,
        Json(UserResponse::from_user(&user, state.timezone)),
    ))
}

/// Get all users
pub async fn get_users(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let users = state.user_repository.get_all().await.map_err(|e| {
        tracing::error!("Failed to get users: {}", e);
        ApiError::InternalServerError
    })?;

    let users: Vec<UserResponse> = users
        .iter()
        .map(|user| UserResponse::from_user(user, state.timezone))
        .collect();

    Ok(Json(users))
}

/// Get a user by ID
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .user_repository
        .find_by_id(id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get user: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or(ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(UserResponse::from_user(&user, state.timezone)))
}

/// Update a user by ID
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateUser>,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(login_id) = &payload.login_id {
        let existing = state
            .user_repository
            .find_by_login_id(login_id)
            .await
            .map_err(|e| {
                tracing::error!("Failed to check login_id: {}", e);
                ApiError::InternalServerError
            })?;
        if existing.is_some_and(|other| other.id != id) {
            return Err(ApiError::BadRequest("login_id already exists".to_string()));
        }
    }

    let user = state
        .user_repository
        .update(id, &payload)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update user: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or(ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(UserResponse::from_user(&user, state.timezone)))
}

/// Delete a user by ID
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = state.user_repository.delete(id).await.map_err(|e| {
        tracing::error!("Failed to delete user: {}", e);
        ApiError::InternalServerError
    })?;

    if deleted {
        Ok(Json(json!({"message": "User deleted successfully"})))
    } else {
        Err(ApiError::NotFound("User not found".to_string()))
    }
}
