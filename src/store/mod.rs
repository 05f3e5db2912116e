mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::types::*;

/// The rows written by a single user provisioning: the user, its root
/// directory and the permission making the user owner of that directory.
#[derive(Debug, Clone)]
pub struct Provisioning {
    pub user: User,
    pub root: File,
    pub permission: Permission,
}

pub trait UserStore {
    /// All users ordered by creation time.
    fn all_users(&self) -> Result<Vec<User>>;
    fn get_user(&self, id: &str) -> Result<Option<User>>;
    fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    fn update_user(&self, user: &User) -> Result<()>;
    fn has_admin_user(&self) -> Result<bool>;
}

pub trait FileStore {
    /// All files ordered by creation time.
    fn all_files(&self) -> Result<Vec<File>>;
    fn get_file(&self, id: &str) -> Result<Option<File>>;
    /// The root directory of a user, or None if the user was never provisioned.
    fn user_root_file(&self, user_id: &str) -> Result<Option<File>>;
    fn list_children(&self, parent_id: &str) -> Result<Vec<File>>;
}

pub trait PermissionStore {
    /// All permissions ordered by creation time.
    fn all_permissions(&self) -> Result<Vec<Permission>>;
    fn file_permissions(&self, file_id: &str) -> Result<Vec<Permission>>;
    fn get_permission_by_id(&self, id: &str) -> Result<Option<Permission>>;
    fn get_permission(
        &self,
        item_type: ItemType,
        item_id: &str,
        user_id: &str,
    ) -> Result<Option<Permission>>;
}

pub trait SessionStore {
    fn create_session(&self, session: &Session) -> Result<()>;
    fn get_session(&self, id: &str) -> Result<Option<Session>>;
    fn delete_session(&self, id: &str) -> Result<bool>;
}

/// Store defines the database interface.
///
/// Methods that write rows across several tables run in a single
/// transaction: either every row is committed or none is.
pub trait Store: UserStore + FileStore + PermissionStore + SessionStore + Send + Sync {
    fn initialize(&self) -> Result<()>;

    /// Inserts the user, its root directory and the owner permission.
    /// A duplicate email fails with `Error::Conflict`.
    fn provision_user(&self, provisioning: &Provisioning) -> Result<()>;

    /// Inserts a file together with the permission granting its creator
    /// ownership.
    fn create_file_with_owner(&self, file: &File, permission: &Permission) -> Result<()>;

    /// Deletes a user along with the files they own (and everything below
    /// them), the permissions on those files and the user's sessions.
    fn delete_user(&self, id: &str) -> Result<bool>;

    fn close(&self) -> Result<()>;
}
