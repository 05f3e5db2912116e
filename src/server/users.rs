use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use super::response::{ApiError, ApiResponse};
use super::{AppState, run_blocking};
use crate::auth::SessionId;
use crate::controllers::{CreateUserRequest, UpdateUserRequest, UserController};

pub async fn create_user(
    SessionId(session): SessionId,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let controller = UserController::new(state.store.clone());
    let user = run_blocking(move || controller.create_user(&session, &req)).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(user))))
}

pub async fn list_users(
    SessionId(session): SessionId,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let users = UserController::new(state.store.clone()).list_users(&session)?;
    Ok(Json(ApiResponse::success(users)))
}

pub async fn get_user(
    SessionId(session): SessionId,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let user = UserController::new(state.store.clone()).get_user(&session, &id)?;
    Ok(Json(ApiResponse::success(user)))
}

pub async fn update_user(
    SessionId(session): SessionId,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let controller = UserController::new(state.store.clone());
    let user = run_blocking(move || controller.update_user(&session, &id, &req)).await?;

    Ok(Json(ApiResponse::success(user)))
}

pub async fn delete_user(
    SessionId(session): SessionId,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    UserController::new(state.store.clone()).delete_user(&session, &id)?;
    Ok(StatusCode::NO_CONTENT)
}
