//! # filesync
//!
//! A multi-user file sync server, usable both as a standalone binary and as
//! a library.
//!
//! Creating a user provisions, in one transaction, the user row, the user's
//! root directory and the permission making the user its owner.
//!
//! ## Library Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use filesync::server::{AppState, create_router};
//! use filesync::store::{SqliteStore, Store};
//!
//! let store = SqliteStore::new("./data/filesync.db").unwrap();
//! store.initialize().unwrap();
//!
//! let router = create_router(Arc::new(AppState::new(Arc::new(store))));
//! // Serve with axum...
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Includes CLI module. Disable with `default-features = false`.

pub mod auth;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod controllers;
pub mod error;
pub mod server;
pub mod store;
pub mod types;
pub mod validation;
