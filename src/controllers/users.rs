use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use super::authenticate;
use crate::auth::PasswordHasher;
use crate::error::{Error, Result};
use crate::store::{Provisioning, Store, UserStore};
use crate::types::{File, ItemType, Permission, User};
use crate::validation::{normalize_email, validate_email, validate_password};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub is_admin: Option<bool>,
}

/// Creates a user together with its root directory and the permission
/// making the user owner of it. Nothing is written unless all three rows are.
///
/// This performs no authorization; callers decide who may provision users.
/// The returned user still carries its password hash.
pub fn provision_user(
    store: &dyn Store,
    hasher: &PasswordHasher,
    email: &str,
    password: &str,
    is_admin: bool,
) -> Result<User> {
    let email = normalize_email(email);
    validate_email(&email)?;
    validate_password(password)?;

    // The unique index catches races; this check gives the common case a
    // clean error before paying for the hash.
    if store.get_user_by_email(&email)?.is_some() {
        tracing::warn!(%email, "Rejected user creation: email already registered");
        return Err(Error::Conflict(format!(
            "email '{email}' is already registered"
        )));
    }

    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4().to_string(),
        email,
        password: hasher.hash(password)?,
        is_admin,
        created_at: now,
        updated_at: now,
    };
    let root = File::new_root(&user.id, now);
    let permission = Permission::owner(ItemType::File, &root.id, &user.id, now);

    let provisioning = Provisioning {
        user,
        root,
        permission,
    };
    store.provision_user(&provisioning)?;

    tracing::info!(
        user_id = %provisioning.user.id,
        root_id = %provisioning.root.id,
        is_admin,
        "Provisioned user"
    );
    Ok(provisioning.user)
}

pub struct UserController {
    store: Arc<dyn Store>,
    hasher: PasswordHasher,
}

impl UserController {
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            hasher: PasswordHasher::new(),
        }
    }

    fn admin(&self, session_id: &str) -> Result<User> {
        let caller = authenticate(self.store.as_ref(), session_id)?;
        if !caller.is_admin {
            return Err(Error::Forbidden);
        }
        Ok(caller)
    }

    fn self_or_admin(&self, session_id: &str, user_id: &str) -> Result<User> {
        let caller = authenticate(self.store.as_ref(), session_id)?;
        if caller.id != user_id && !caller.is_admin {
            return Err(Error::Forbidden);
        }
        Ok(caller)
    }

    /// Admin only. Returns the new user without its password hash.
    pub fn create_user(&self, session_id: &str, req: &CreateUserRequest) -> Result<User> {
        self.admin(session_id)?;

        let user = provision_user(
            self.store.as_ref(),
            &self.hasher,
            &req.email,
            &req.password,
            req.is_admin,
        )?;
        Ok(user.redacted())
    }

    pub fn get_user(&self, session_id: &str, id: &str) -> Result<User> {
        self.self_or_admin(session_id, id)?;

        let user = self.store.get_user(id)?.ok_or(Error::NotFound)?;
        Ok(user.redacted())
    }

    pub fn list_users(&self, session_id: &str) -> Result<Vec<User>> {
        self.admin(session_id)?;

        let users = self.store.all_users()?;
        Ok(users.into_iter().map(User::redacted).collect())
    }

    /// Users may edit themselves; admins may edit anyone. Only admins can
    /// change the admin flag, and never their own.
    pub fn update_user(&self, session_id: &str, id: &str, req: &UpdateUserRequest) -> Result<User> {
        let caller = self.self_or_admin(session_id, id)?;

        let mut user = self.store.get_user(id)?.ok_or(Error::NotFound)?;

        if let Some(is_admin) = req.is_admin {
            if is_admin != user.is_admin {
                if !caller.is_admin {
                    return Err(Error::Forbidden);
                }
                if caller.id == user.id {
                    return Err(Error::Validation(
                        "cannot change your own admin status".into(),
                    ));
                }
                user.is_admin = is_admin;
            }
        }

        if let Some(email) = &req.email {
            let email = normalize_email(email);
            validate_email(&email)?;
            if email != user.email {
                if self.store.get_user_by_email(&email)?.is_some() {
                    return Err(Error::Conflict(format!(
                        "email '{email}' is already registered"
                    )));
                }
                user.email = email;
            }
        }

        if let Some(password) = &req.password {
            validate_password(password)?;
            user.password = self.hasher.hash(password)?;
        }

        user.updated_at = Utc::now();
        self.store.update_user(&user)?;

        tracing::info!(user_id = %user.id, updated_by = %caller.id, "Updated user");
        Ok(user.redacted())
    }

    /// Admin only. Removes the user with everything they own.
    pub fn delete_user(&self, session_id: &str, id: &str) -> Result<()> {
        let caller = self.admin(session_id)?;
        if caller.id == id {
            return Err(Error::Validation("cannot delete your own account".into()));
        }

        if !self.store.delete_user(id)? {
            return Err(Error::NotFound);
        }

        tracing::info!(user_id = %id, deleted_by = %caller.id, "Deleted user");
        Ok(())
    }
}
