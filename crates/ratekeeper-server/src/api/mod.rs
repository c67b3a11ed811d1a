// ABOUTME: API module containing all HTTP handler functions for the ratekeeper JSON API.
// ABOUTME: Organized into sub-modules for user auth, rate record CRUD, and the admin view.

pub mod admin;
pub mod datas;
pub mod users;

use axum::extract::FromRequest;
use ulid::Ulid;

use crate::error::ApiError;

/// `axum::Json` with body rejections reported as [`ApiError::Validation`].
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// Run store work (SQLite access, bcrypt hashing) on the blocking pool so it
/// never stalls the async workers.
pub(crate) async fn blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|err| ApiError::Internal(err.to_string()))?
}

/// Parse a path identifier. Anything that is not a valid id cannot name a
/// stored record, so it is reported as not found.
pub(crate) fn parse_id(raw: &str) -> Result<Ulid, ApiError> {
    raw.parse::<Ulid>()
        .map_err(|_| ApiError::NotFound("Data not found"))
}
