use axum::{
    extract::{
        Json, Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};

use crate::{
    AppState,
    error::AppError,
    models::{
        CreateUsersResult, DeleteUsersRequest, DeleteUsersResult, NewUser, UpdateUsersResult,
        User, UserUpdate,
    },
};

#[axum::debug_handler]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, AppError> {
    Ok(Json(state.store.list().await?))
}

#[axum::debug_handler]
pub async fn get_user(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<User>, AppError> {
    let Path(raw) = path?;
    let id: i64 = raw
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid user ID".to_string()))?;

    let user = state
        .cache
        .read_through(id, || state.store.get(id))
        .await?;

    Ok(Json(user))
}

#[axum::debug_handler]
pub async fn create_users(
    State(state): State<AppState>,
    payload: Result<Json<Vec<NewUser>>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateUsersResult>), AppError> {
    let Json(inputs) = payload?;
    let result = state.store.create_many(inputs).await?;

    tracing::info!(
        "Created {} users, rejected {}",
        result.created.len(),
        result.errors.len()
    );
    Ok((StatusCode::CREATED, Json(result)))
}

#[axum::debug_handler]
pub async fn update_users(
    State(state): State<AppState>,
    payload: Result<Json<Vec<UserUpdate>>, JsonRejection>,
) -> Result<Json<UpdateUsersResult>, AppError> {
    let Json(inputs) = payload?;
    let result = state.store.update_many(inputs).await?;

    let ids: Vec<i64> = result.updated.iter().map(|u| u.id).collect();
    state.cache.invalidate(&ids).await;

    Ok(Json(result))
}

#[axum::debug_handler]
pub async fn delete_users(
    State(state): State<AppState>,
    payload: Result<Json<DeleteUsersRequest>, JsonRejection>,
) -> Result<Json<DeleteUsersResult>, AppError> {
    let Json(req) = payload?;
    let result = state.store.delete_many(req.ids).await?;

    state.cache.invalidate(&result.deleted).await;

    Ok(Json(result))
}
