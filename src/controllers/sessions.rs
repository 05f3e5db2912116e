use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::PasswordHasher;
use crate::error::{Error, Result};
use crate::store::{SessionStore, Store, UserStore};
use crate::types::{Session, User};
use crate::validation::normalize_email;

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Resolves a session id to the user it belongs to.
pub fn authenticate(store: &dyn Store, session_id: &str) -> Result<User> {
    let session = store.get_session(session_id)?.ok_or(Error::Unauthorized)?;
    store.get_user(&session.user_id)?.ok_or(Error::Unauthorized)
}

pub struct SessionController {
    store: Arc<dyn Store>,
    hasher: PasswordHasher,
}

impl SessionController {
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            hasher: PasswordHasher::new(),
        }
    }

    /// Opens a session for valid credentials. Unknown emails and wrong
    /// passwords fail the same way.
    pub fn login(&self, req: &LoginRequest) -> Result<Session> {
        let email = normalize_email(&req.email);
        let Some(user) = self.store.get_user_by_email(&email)? else {
            self.hasher.verify_dummy(&req.password);
            return Err(Error::Unauthorized);
        };

        if !self.hasher.verify(&req.password, &user.password)? {
            tracing::debug!(user_id = %user.id, "Login rejected: wrong password");
            return Err(Error::Unauthorized);
        }

        let session = Session {
            id: Uuid::new_v4().to_string(),
            user_id: user.id,
            created_at: Utc::now(),
        };
        self.store.create_session(&session)?;

        tracing::info!(user_id = %session.user_id, "Session opened");
        Ok(session)
    }

    pub fn logout(&self, session_id: &str) -> Result<()> {
        if !self.store.delete_session(session_id)? {
            return Err(Error::Unauthorized);
        }
        Ok(())
    }
}
