use crate::core::error::ApiError;
use crate::core::state::AppState;
use crate::models::response::ApiResponse;
use crate::models::user::{User, UserPayload};
use crate::utils::time;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::info;

pub const CREATED_MESSAGE: &str = "Utilisateur créé avec succès";
pub const UPDATED_MESSAGE: &str = "Utilisateur mis à jour avec succès";
pub const DELETED_MESSAGE: &str = "Utilisateur supprimé avec succès";

/// A body that is not declared as JSON counts as an empty payload, so it fails
/// the required-fields rule rather than JSON parsing.
fn read_payload(payload: Result<Json<UserPayload>, JsonRejection>) -> Result<UserPayload, ApiError> {
    match payload {
        Ok(Json(payload)) => Ok(payload),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(UserPayload::default()),
        Err(rejection) => Err(ApiError::InvalidBody(rejection.body_text())),
    }
}

/// List all users, newest first
///
/// GET /api/users
pub async fn list_users_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let users = state.store.list().await?;

    info!(count = users.len(), "Users listed");

    Ok((StatusCode::OK, Json(ApiResponse::list(users))).into_response())
}

/// Fetch one user
///
/// GET /api/users/{id}
pub async fn get_user_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let user = state
        .store
        .find(&id)
        .await?
        .ok_or(ApiError::NotFound(id))?;

    info!(id = %user.id, fullname = %user.fullname, "User fetched");

    Ok((StatusCode::OK, Json(ApiResponse::data(user))).into_response())
}

/// Create a user
///
/// POST /api/users
pub async fn create_user_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<UserPayload>, JsonRejection>,
) -> Result<Response, ApiError> {
    let payload = read_payload(payload)?;

    info!(
        fullname = ?payload.fullname,
        study_level = ?payload.study_level,
        age = ?payload.age,
        "Creating user"
    );

    let fields = payload.validate()?;
    let user = User::create(fields, time::now());

    state.store.insert(&user).await?;

    info!(id = %user.id, fullname = %user.fullname, "User created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(user, CREATED_MESSAGE)),
    )
        .into_response())
}

/// Replace a user's mutable fields
///
/// PUT /api/users/{id}
pub async fn update_user_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<UserPayload>, JsonRejection>,
) -> Result<Response, ApiError> {
    let payload = read_payload(payload)?;

    info!(
        id = %id,
        fullname = ?payload.fullname,
        study_level = ?payload.study_level,
        age = ?payload.age,
        "Updating user"
    );

    let fields = payload.validate()?;

    // Existence is checked before the write
    let mut user = state
        .store
        .find(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(id.clone()))?;

    user.apply(fields, time::now_after(user.updated_at));

    // Zero rows means the user was deleted between the two round trips
    if state.store.update(&user).await? == 0 {
        return Err(ApiError::NotFound(id));
    }

    info!(id = %user.id, fullname = %user.fullname, "User updated");

    Ok((
        StatusCode::OK,
        Json(ApiResponse::with_message(user, UPDATED_MESSAGE)),
    )
        .into_response())
}

/// Delete a user
///
/// DELETE /api/users/{id}
pub async fn delete_user_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    if state.store.delete(&id).await? == 0 {
        return Err(ApiError::NotFound(id));
    }

    info!(id = %id, "User deleted");

    Ok((
        StatusCode::OK,
        Json(ApiResponse::<()>::message(DELETED_MESSAGE)),
    )
        .into_response())
}
