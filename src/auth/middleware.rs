use std::sync::Arc;

use axum::{
    Json,
    extract::FromRequestParts,
    http::{HeaderValue, StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::server::AppState;

/// The raw session id presented by the caller as `Authorization: Bearer <id>`.
///
/// Extraction only checks the header shape; whether the session exists is
/// decided by the controllers, which answer `Unauthorized` for unknown ids.
pub struct SessionId(pub String);

#[derive(Debug)]
pub enum AuthError {
    MissingAuth,
    InvalidScheme,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = match self {
            AuthError::MissingAuth => "Authentication required",
            AuthError::InvalidScheme => "Invalid authorization scheme",
        };

        let body = json!({ "data": null, "error": message });

        let mut response = (StatusCode::UNAUTHORIZED, Json(body)).into_response();
        response.headers_mut().insert(
            "WWW-Authenticate",
            HeaderValue::from_static("Bearer realm=\"filesync\""),
        );
        response
    }
}

impl FromRequestParts<Arc<AppState>> for SessionId {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or(AuthError::MissingAuth)?;

        let session_id = extract_bearer(header)?;
        Ok(SessionId(session_id.to_string()))
    }
}

fn extract_bearer(header: &str) -> Result<&str, AuthError> {
    let id = header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidScheme)?
        .trim();

    if id.is_empty() {
        return Err(AuthError::MissingAuth);
    }
    Ok(id)
}
