use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use super::response::{ApiError, ApiResponse};
use super::{AppState, run_blocking};
use crate::auth::SessionId;
use crate::controllers::{LoginRequest, SessionController};

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let controller = SessionController::new(state.store.clone());
    let session = run_blocking(move || controller.login(&req)).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(session))))
}

pub async fn logout(
    SessionId(session): SessionId,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    SessionController::new(state.store.clone()).logout(&session)?;
    Ok(StatusCode::NO_CONTENT)
}
