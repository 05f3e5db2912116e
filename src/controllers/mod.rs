//! Controllers implement the API operations independently of HTTP.
//!
//! Every operation takes the caller's session id first, resolves it to a
//! user and enforces authorization before touching the store.

mod files;
mod sessions;
mod users;

pub use files::{CreateFileRequest, FileController};
pub use sessions::{LoginRequest, SessionController, authenticate};
pub use users::{CreateUserRequest, UpdateUserRequest, UserController, provision_user};
