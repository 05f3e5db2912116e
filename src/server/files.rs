use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use super::AppState;
use super::response::{ApiError, ApiResponse};
use crate::auth::SessionId;
use crate::controllers::{CreateFileRequest, FileController};

pub async fn root(
    SessionId(session): SessionId,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let file = FileController::new(state.store.clone()).root(&session)?;
    Ok(Json(ApiResponse::success(file)))
}

pub async fn create_file(
    SessionId(session): SessionId,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateFileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let file = FileController::new(state.store.clone()).create_file(&session, &req)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(file))))
}

pub async fn get_file(
    SessionId(session): SessionId,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let file = FileController::new(state.store.clone()).get_file(&session, &id)?;
    Ok(Json(ApiResponse::success(file)))
}

pub async fn children(
    SessionId(session): SessionId,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let files = FileController::new(state.store.clone()).children(&session, &id)?;
    Ok(Json(ApiResponse::success(files)))
}

pub async fn permissions(
    SessionId(session): SessionId,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let permissions = FileController::new(state.store.clone()).permissions(&session, &id)?;
    Ok(Json(ApiResponse::success(permissions)))
}
