mod middleware;
mod password;

pub use middleware::{AuthError, SessionId};
pub use password::{PasswordHasher, generate_password};
