//! CLI integration tests for filesync admin commands.
//!
//! Each test uses an isolated temp directory for the database, ensuring tests
//! can run in parallel safely.

#![allow(deprecated)] // Command::cargo_bin deprecation only affects custom build dirs

use std::path::Path;

use assert_cmd::Command;
use assert_fs::TempDir;
use filesync::store::{FileStore, PermissionStore, SqliteStore, UserStore};
use predicates::prelude::*;
use serde_json::Value;

struct TestContext {
    temp_dir: TempDir,
}

impl TestContext {
    fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("failed to create temp dir"),
        }
    }

    fn data_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    fn data_dir_str(&self) -> String {
        self.data_dir().to_string_lossy().to_string()
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("filesync").expect("failed to find binary");
        cmd.env("NO_COLOR", "1");
        cmd
    }

    fn init(&self) -> assert_cmd::assert::Assert {
        self.cmd()
            .args([
                "admin",
                "init",
                "--data-dir",
                &self.data_dir_str(),
                "--email",
                "admin@example.com",
                "--non-interactive",
            ])
            .assert()
    }

    fn add_user(&self, email: &str) -> assert_cmd::assert::Assert {
        self.cmd()
            .args([
                "admin",
                "user",
                "add",
                "--data-dir",
                &self.data_dir_str(),
                "--email",
                email,
                "--password",
                "123456",
                "--non-interactive",
            ])
            .assert()
    }

    fn users_json(&self) -> Vec<Value> {
        let output = self
            .cmd()
            .args([
                "admin",
                "user",
                "list",
                "--data-dir",
                &self.data_dir_str(),
                "--json",
            ])
            .output()
            .expect("failed to run user list");
        assert!(output.status.success());
        serde_json::from_slice(&output.stdout).expect("user list is not JSON")
    }

    fn store(&self) -> SqliteStore {
        SqliteStore::new(self.data_dir().join("filesync.db")).expect("open store")
    }
}

#[test]
fn test_init_creates_admin_with_root() {
    let ctx = TestContext::new();

    ctx.init()
        .success()
        .stdout(predicate::str::contains("Admin user created: admin@example.com"))
        .stdout(predicate::str::contains("Generated password"));

    let users = ctx.users_json();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["email"], "admin@example.com");
    assert_eq!(users[0]["is_admin"], true);
    assert!(users[0]["root_id"].is_string());
}

#[test]
fn test_init_twice_fails() {
    let ctx = TestContext::new();
    ctx.init().success();

    ctx.init()
        .failure()
        .stderr(predicate::str::contains("already initialized"));

    assert_eq!(ctx.users_json().len(), 1);
}

#[test]
fn test_init_non_interactive_requires_email() {
    let ctx = TestContext::new();

    ctx.cmd()
        .args([
            "admin",
            "init",
            "--data-dir",
            &ctx.data_dir_str(),
            "--non-interactive",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--email is required"));
}

#[test]
fn test_user_add_provisions_root_and_permission() {
    let ctx = TestContext::new();
    ctx.init().success();

    ctx.add_user("Test@Example.com")
        .success()
        .stdout(predicate::str::contains("Created user \"test@example.com\""));

    let users = ctx.users_json();
    let user = users
        .iter()
        .find(|u| u["email"] == "test@example.com")
        .expect("user listed");
    assert_eq!(user["is_admin"], false);

    let user_id = user["id"].as_str().unwrap();
    let root_id = user["root_id"].as_str().unwrap();

    let store = ctx.store();
    let stored = store.get_user(user_id).unwrap().unwrap();
    assert_ne!(stored.password, "123456");

    let root = store.get_file(root_id).unwrap().unwrap();
    assert!(root.is_root);
    assert_eq!(root.owner_id, user_id);

    let permissions = store.file_permissions(root_id).unwrap();
    assert_eq!(permissions.len(), 1);
    assert!(permissions[0].is_owner);
}

#[test]
fn test_user_add_duplicate_fails_cleanly() {
    let ctx = TestContext::new();
    ctx.init().success();
    ctx.add_user("test@example.com").success();

    ctx.add_user("test@example.com")
        .failure()
        .stderr(predicate::str::contains("already registered"));

    let store = ctx.store();
    assert_eq!(store.all_users().unwrap().len(), 2);
    assert_eq!(store.all_files().unwrap().len(), 2);
    assert_eq!(store.all_permissions().unwrap().len(), 2);
}

#[test]
fn test_user_remove() {
    let ctx = TestContext::new();
    ctx.init().success();
    ctx.add_user("test@example.com").success();

    let users = ctx.users_json();
    let user_id = users
        .iter()
        .find(|u| u["email"] == "test@example.com")
        .and_then(|u| u["id"].as_str())
        .unwrap()
        .to_string();

    ctx.cmd()
        .args([
            "admin",
            "user",
            "remove",
            "--data-dir",
            &ctx.data_dir_str(),
            "--user-id",
            &user_id,
            "--non-interactive",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--yes is required"));

    ctx.cmd()
        .args([
            "admin",
            "user",
            "remove",
            "--data-dir",
            &ctx.data_dir_str(),
            "--user-id",
            &user_id,
            "--yes",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted user 'test@example.com'"));

    let store = ctx.store();
    assert_eq!(store.all_users().unwrap().len(), 1);
    assert_eq!(store.all_files().unwrap().len(), 1);
    assert_eq!(store.all_permissions().unwrap().len(), 1);
}

#[test]
fn test_commands_require_init() {
    let ctx = TestContext::new();

    ctx.cmd()
        .args(["admin", "user", "list", "--data-dir", &ctx.data_dir_str()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("filesync admin init"));

    ctx.cmd()
        .args(["serve", "--data-dir", &ctx.data_dir_str(), "--port", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Server not initialized"));
}
