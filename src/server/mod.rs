mod files;
pub mod response;
mod router;
mod sessions;
mod users;

pub use router::{AppState, create_router};

use crate::error::Result;
use response::ApiError;

/// Runs a controller call on the blocking pool. Used for operations that
/// hash passwords, which would otherwise stall the async workers.
pub(crate) async fn run_blocking<T, F>(f: F) -> std::result::Result<T, ApiError>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(result) => result.map_err(ApiError::from),
        Err(e) => {
            tracing::error!("Blocking task failed: {e}");
            Err(ApiError::internal("Internal server error"))
        }
    }
}
