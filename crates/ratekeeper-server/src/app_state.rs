// ABOUTME: Shared application state for the ratekeeper HTTP server.
// ABOUTME: Bundles the stores, token service, and configuration built once at startup.

use std::sync::Arc;

use ratekeeper_store::{Database, RecordStore, UserStore};

use crate::config::ServerConfig;
use crate::token::TokenService;

/// Shared application state accessible by all Axum handlers.
pub struct AppState {
    pub users: UserStore,
    pub records: RecordStore,
    pub tokens: Arc<TokenService>,
    pub config: ServerConfig,
}

/// Type alias for the Arc-wrapped state used with Axum's State extractor.
pub type SharedState = Arc<AppState>;

impl AppState {
    /// Wire stores and the token service from an opened database and config.
    pub fn new(db: &Database, config: ServerConfig) -> Self {
        Self {
            users: db.users(config.hash_cost),
            records: db.records(),
            tokens: Arc::new(TokenService::new(&config.jwt_secret, config.token_ttl)),
            config,
        }
    }
}
