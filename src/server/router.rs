use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::{
    Router,
    routing::{delete, get, post},
};

use super::{files, sessions, users};
use crate::store::Store;

pub struct AppState {
    pub store: Arc<dyn Store>,
}

impl AppState {
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    tracing::info!(
        "{} {} {} {}ms",
        method,
        uri.path(),
        status.as_u16(),
        latency.as_millis()
    );

    response
}

fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        // Session routes
        .route("/sessions", post(sessions::login))
        .route("/sessions/current", delete(sessions::logout))
        // User routes
        .route("/users", post(users::create_user).get(users::list_users))
        .route(
            "/users/{id}",
            get(users::get_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        )
        // File routes
        .route("/files", post(files::create_file))
        .route("/files/root", get(files::root))
        .route("/files/{id}", get(files::get_file))
        .route("/files/{id}/children", get(files::children))
        .route("/files/{id}/permissions", get(files::permissions))
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api", api_router())
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::store::SqliteStore;

    fn app() -> Router {
        let store = SqliteStore::in_memory().unwrap();
        store.initialize().unwrap();
        create_router(Arc::new(AppState::new(Arc::new(store))))
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_auth_is_unauthorized() {
        let response = app()
            .oneshot(Request::get("/api/users").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().contains_key("WWW-Authenticate"));
        let body = body_json(response).await;
        assert_eq!(body["error"], "Authentication required");
    }

    #[tokio::test]
    async fn test_unknown_session_is_unauthorized() {
        let response = app()
            .oneshot(
                Request::get("/api/files/root")
                    .header("Authorization", "Bearer not-a-session")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert!(body["data"].is_null());
    }

    #[tokio::test]
    async fn test_bad_login_is_unauthorized() {
        let response = app()
            .oneshot(
                Request::post("/api/sessions")
                    .header("Content-Type", "application/json")
                    .body(Body::from(
                        r#"{"email":"nobody@example.com","password":"123456"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
