// ABOUTME: Error type shared by the user and record stores.
// ABOUTME: Distinguishes client-caused failures (duplicate, missing, invalid) from backend faults.

use ratekeeper_core::ValidationError;
use thiserror::Error;
use ulid::Ulid;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid stored id: {0}")]
    InvalidId(#[from] ulid::DecodeError),

    #[error("password hashing error: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("username already exists: {0}")]
    DuplicateKey(String),

    #[error("a current record already exists: {0}")]
    AlreadyExists(Ulid),

    #[error("record not found: {0}")]
    NotFound(Ulid),

    #[error("database connection lock poisoned")]
    Poisoned,
}

/// True when SQLite rejected a write because of a UNIQUE/CHECK constraint.
pub(crate) fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}
