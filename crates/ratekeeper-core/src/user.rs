// ABOUTME: Defines the User account and the username/password pair submitted by clients.
// ABOUTME: Passwords only ever live here in hashed form; plaintext stays in Credentials.

use serde::Deserialize;
use ulid::Ulid;

use crate::error::ValidationError;

/// A stored account. `password_hash` is a bcrypt hash, never plaintext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub user_id: Ulid,
    pub username: String,
    pub password_hash: String,
}

/// A username/password pair as sent to the register and login endpoints.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Both fields must be non-empty.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.username.is_empty() {
            return Err(ValidationError::MissingField("username"));
        }
        if self.password.is_empty() {
            return Err(ValidationError::MissingField("password"));
        }
        Ok(())
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
