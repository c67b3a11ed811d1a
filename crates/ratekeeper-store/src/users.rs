// ABOUTME: Credential store persisting user accounts with bcrypt-hashed passwords.
// ABOUTME: Provides registration, lookup by username, password comparison, and user counting.

use rusqlite::{OptionalExtension, params};
use ratekeeper_core::{Credentials, User};
use ulid::Ulid;

use crate::db::{SharedConnection, lock};
use crate::error::{StoreError, is_constraint_violation};

/// Persists users. Usernames are unique at the schema level.
#[derive(Clone)]
pub struct UserStore {
    conn: SharedConnection,
    hash_cost: u32,
}

impl UserStore {
    pub(crate) fn new(conn: SharedConnection, hash_cost: u32) -> Self {
        Self { conn, hash_cost }
    }

    /// Hash the password and insert a new user.
    /// Fails with `DuplicateKey` if the username is taken.
    pub fn register(&self, credentials: &Credentials) -> Result<User, StoreError> {
        credentials.validate()?;
        let password_hash = bcrypt::hash(&credentials.password, self.hash_cost)?;
        let user = User {
            user_id: Ulid::new(),
            username: credentials.username.clone(),
            password_hash,
        };

        let conn = lock(&self.conn)?;
        let inserted = conn.execute(
            "INSERT INTO users (user_id, username, password_hash) VALUES (?1, ?2, ?3)",
            params![user.user_id.to_string(), user.username, user.password_hash],
        );
        match inserted {
            Ok(_) => {
                tracing::debug!("registered user {}", user.username);
                Ok(user)
            }
            Err(e) if is_constraint_violation(&e) => {
                Err(StoreError::DuplicateKey(user.username))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let conn = lock(&self.conn)?;
        let row = conn
            .query_row(
                "SELECT user_id, username, password_hash FROM users WHERE username = ?1",
                params![username],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;

        let Some((user_id, username, password_hash)) = row else {
            return Ok(None);
        };
        Ok(Some(User {
            user_id: user_id.parse::<Ulid>()?,
            username,
            password_hash,
        }))
    }

    /// Check a plaintext password against the user's stored hash.
    pub fn compare_password(&self, user: &User, password: &str) -> Result<bool, StoreError> {
        Ok(bcrypt::verify(password, &user.password_hash)?)
    }

    pub fn count_users(&self) -> Result<u64, StoreError> {
        let conn = lock(&self.conn)?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }
}
