// ABOUTME: Startup seeding of the admin account.
// ABOUTME: Creates the configured admin user when no user with that name exists yet.

use ratekeeper_core::Credentials;
use ratekeeper_store::{StoreError, UserStore};

/// What seeding did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Created,
    AlreadyExists,
}

/// Ensure an admin account named `username` exists.
pub fn seed_admin(
    users: &UserStore,
    username: &str,
    password: &str,
) -> Result<SeedOutcome, StoreError> {
    if users.find_by_username(username)?.is_some() {
        tracing::info!("default admin user already exists");
        return Ok(SeedOutcome::AlreadyExists);
    }

    match users.register(&Credentials::new(username, password)) {
        Ok(_) => {
            tracing::info!("default admin user created");
            Ok(SeedOutcome::Created)
        }
        // Another process seeded between the lookup and the insert.
        Err(StoreError::DuplicateKey(_)) => Ok(SeedOutcome::AlreadyExists),
        Err(e) => Err(e),
    }
}
