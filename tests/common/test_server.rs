use std::sync::Arc;

use filesync::auth::PasswordHasher;
use filesync::controllers::provision_user;
use filesync::server::{AppState, create_router};
use filesync::store::{FileStore, PermissionStore, SqliteStore, Store, UserStore};
use serde_json::{Value, json};
use tempfile::TempDir;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "admin-password";

/// An in-process server bound to an ephemeral port, backed by a fresh
/// database with one admin user.
pub struct TestServer {
    pub temp_dir: TempDir,
    pub base_url: String,
    pub store: Arc<dyn Store>,
    pub admin_session: String,
    client: reqwest::Client,
    server: tokio::task::JoinHandle<()>,
}

impl TestServer {
    pub async fn start() -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");
        let store = SqliteStore::new(temp_dir.path().join("filesync.db")).expect("open store");
        store.initialize().expect("initialize store");
        let store: Arc<dyn Store> = Arc::new(store);

        provision_user(
            store.as_ref(),
            &PasswordHasher::new(),
            ADMIN_EMAIL,
            ADMIN_PASSWORD,
            true,
        )
        .expect("provision admin");

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let port = listener.local_addr().expect("local addr").port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let app = create_router(Arc::new(AppState::new(store.clone())));
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve");
        });

        let client = reqwest::Client::new();
        let mut server = Self {
            temp_dir,
            base_url,
            store,
            admin_session: String::new(),
            client,
            server,
        };
        server.admin_session = server.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
        server
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Logs in and returns the session id, panicking on failure.
    pub async fn login(&self, email: &str, password: &str) -> String {
        let resp = self
            .client
            .post(self.url("/api/sessions"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("login request");
        assert_eq!(resp.status(), 201, "login failed for {email}");

        let body: Value = resp.json().await.expect("parse login response");
        body["data"]["id"].as_str().expect("session id").to_string()
    }

    pub async fn create_user(
        &self,
        session: &str,
        email: &str,
        password: &str,
    ) -> reqwest::Response {
        self.client
            .post(self.url("/api/users"))
            .bearer_auth(session)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("create user request")
    }

    /// Row counts of (users, files, permissions).
    pub fn counts(&self) -> (usize, usize, usize) {
        (
            self.store.all_users().expect("users").len(),
            self.store.all_files().expect("files").len(),
            self.store.all_permissions().expect("permissions").len(),
        )
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.server.abort();
    }
}
