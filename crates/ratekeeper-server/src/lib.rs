// ABOUTME: HTTP server for ratekeeper, providing the JSON rate API and admin authentication.
// ABOUTME: Uses Axum with shared state holding the stores, token service, and configuration.

pub mod api;
pub mod app_state;
pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod seed;
pub mod token;

pub use app_state::{AppState, SharedState};
pub use config::{ConfigError, ServerConfig};
pub use error::ApiError;
pub use routes::create_router;
pub use seed::{SeedOutcome, seed_admin};
pub use token::{Claims, TokenError, TokenService};
