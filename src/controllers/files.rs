use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use super::authenticate;
use crate::error::{Error, Result};
use crate::store::{FileStore, PermissionStore, Store};
use crate::types::{File, ItemType, Permission, User};
use crate::validation::validate_file_name;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateFileRequest {
    /// Defaults to the caller's root directory.
    #[serde(default)]
    pub parent_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub is_directory: bool,
}

pub struct FileController {
    store: Arc<dyn Store>,
}

impl FileController {
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    fn permission(&self, user: &User, file_id: &str) -> Result<Option<Permission>> {
        self.store.get_permission(ItemType::File, file_id, &user.id)
    }

    fn readable_file(&self, user: &User, id: &str) -> Result<File> {
        let file = self.store.get_file(id)?.ok_or(Error::NotFound)?;

        match self.permission(user, &file.id)? {
            Some(p) if p.allows_read() => Ok(file),
            _ => Err(Error::Forbidden),
        }
    }

    pub fn root(&self, session_id: &str) -> Result<File> {
        let user = authenticate(self.store.as_ref(), session_id)?;
        self.store.user_root_file(&user.id)?.ok_or(Error::NotFound)
    }

    pub fn get_file(&self, session_id: &str, id: &str) -> Result<File> {
        let user = authenticate(self.store.as_ref(), session_id)?;
        self.readable_file(&user, id)
    }

    pub fn children(&self, session_id: &str, id: &str) -> Result<Vec<File>> {
        let user = authenticate(self.store.as_ref(), session_id)?;
        let dir = self.readable_file(&user, id)?;

        if !dir.is_directory {
            return Err(Error::Validation(format!("'{}' is not a directory", dir.id)));
        }
        self.store.list_children(&dir.id)
    }

    /// Creates a file or directory under a directory the caller can write
    /// to. The caller becomes owner of the new item.
    pub fn create_file(&self, session_id: &str, req: &CreateFileRequest) -> Result<File> {
        let user = authenticate(self.store.as_ref(), session_id)?;
        validate_file_name(&req.name)?;

        let parent = match &req.parent_id {
            Some(id) => self.store.get_file(id)?.ok_or(Error::NotFound)?,
            None => self.store.user_root_file(&user.id)?.ok_or(Error::NotFound)?,
        };

        if !parent.is_directory {
            return Err(Error::Validation(format!(
                "parent '{}' is not a directory",
                parent.id
            )));
        }

        match self.permission(&user, &parent.id)? {
            Some(p) if p.allows_write() => {}
            _ => return Err(Error::Forbidden),
        }

        let now = Utc::now();
        let file = File {
            id: Uuid::new_v4().to_string(),
            owner_id: user.id.clone(),
            name: req.name.clone(),
            is_directory: req.is_directory,
            is_root: false,
            parent_id: Some(parent.id),
            created_at: now,
            updated_at: now,
        };
        let permission = Permission::owner(ItemType::File, &file.id, &user.id, now);

        self.store.create_file_with_owner(&file, &permission)?;

        tracing::debug!(file_id = %file.id, owner_id = %user.id, "Created file");
        Ok(file)
    }

    /// Owner only.
    pub fn permissions(&self, session_id: &str, id: &str) -> Result<Vec<Permission>> {
        let user = authenticate(self.store.as_ref(), session_id)?;
        let file = self.store.get_file(id)?.ok_or(Error::NotFound)?;

        match self.permission(&user, &file.id)? {
            Some(p) if p.is_owner => self.store.file_permissions(&file.id),
            _ => Err(Error::Forbidden),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::PasswordHasher;
    use crate::controllers::{LoginRequest, SessionController, provision_user};
    use crate::store::SqliteStore;

    struct Fixture {
        controller: FileController,
        alice: String,
        bob: String,
    }

    fn setup() -> Fixture {
        let store = SqliteStore::in_memory().unwrap();
        store.initialize().unwrap();
        let store: Arc<dyn Store> = Arc::new(store);
        let hasher = PasswordHasher::new();
        let sessions = SessionController::new(store.clone());

        let session_for = |email: &str| {
            provision_user(store.as_ref(), &hasher, email, "password", false).unwrap();
            sessions
                .login(&LoginRequest {
                    email: email.to_string(),
                    password: "password".to_string(),
                })
                .unwrap()
                .id
        };

        let alice = session_for("alice@example.com");
        let bob = session_for("bob@example.com");

        Fixture {
            controller: FileController::new(store),
            alice,
            bob,
        }
    }

    fn dir(name: &str, parent_id: Option<String>) -> CreateFileRequest {
        CreateFileRequest {
            parent_id,
            name: name.to_string(),
            is_directory: true,
        }
    }

    #[test]
    fn test_root_and_children() {
        let f = setup();
        let root = f.controller.root(&f.alice).unwrap();
        assert!(root.is_root);

        let docs = f.controller.create_file(&f.alice, &dir("docs", None)).unwrap();
        assert_eq!(docs.parent_id.as_deref(), Some(root.id.as_str()));

        let children = f.controller.children(&f.alice, &root.id).unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].id, docs.id);

        let perms = f.controller.permissions(&f.alice, &docs.id).unwrap();
        assert_eq!(perms.len(), 1);
        assert!(perms[0].is_owner);
    }

    #[test]
    fn test_other_users_files_are_off_limits() {
        let f = setup();
        let alice_root = f.controller.root(&f.alice).unwrap();

        assert!(matches!(
            f.controller.get_file(&f.bob, &alice_root.id),
            Err(Error::Forbidden)
        ));
        assert!(matches!(
            f.controller.children(&f.bob, &alice_root.id),
            Err(Error::Forbidden)
        ));
        assert!(matches!(
            f.controller
                .create_file(&f.bob, &dir("intruder", Some(alice_root.id.clone()))),
            Err(Error::Forbidden)
        ));
        assert!(matches!(
            f.controller.permissions(&f.bob, &alice_root.id),
            Err(Error::Forbidden)
        ));
    }

    #[test]
    fn test_create_file_rules() {
        let f = setup();
        let note = f
            .controller
            .create_file(
                &f.alice,
                &CreateFileRequest {
                    parent_id: None,
                    name: "note.md".to_string(),
                    is_directory: false,
                },
            )
            .unwrap();

        assert!(matches!(
            f.controller.create_file(&f.alice, &dir("inner", Some(note.id.clone()))),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            f.controller.create_file(&f.alice, &dir("note.md", None)),
            Err(Error::Conflict(_))
        ));
        assert!(matches!(
            f.controller.create_file(&f.alice, &dir("..", None)),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            f.controller.create_file(&f.alice, &dir("x", Some("missing".to_string()))),
            Err(Error::NotFound)
        ));
        assert!(matches!(
            f.controller.children(&f.alice, &note.id),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_unknown_session() {
        let f = setup();
        assert!(matches!(f.controller.root("nope"), Err(Error::Unauthorized)));
    }
}
