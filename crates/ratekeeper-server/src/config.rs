// ABOUTME: Configuration loading and validation for the ratekeeper server.
// ABOUTME: Reads environment variables, applies defaults, and refuses to start without a signing secret.

use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_PORT: u16 = 1000;
pub const DEFAULT_DATABASE_PATH: &str = "ratekeeper.db";
pub const DEFAULT_STATIC_DIR: &str = "public";
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 86_400;
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
/// Well-known seed password. Deployments must override it with ADMIN_PASSWORD.
pub const DEFAULT_ADMIN_PASSWORD: &str = "sansoe4455";
pub const DEFAULT_HASH_COST: u32 = 10;

const MIN_HASH_COST: u32 = 4;
const MAX_HASH_COST: u32 = 31;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JWT_SECRET is not set; refusing to start without a token signing secret")]
    MissingSecret,

    #[error("PORT is not a valid port number: {0}")]
    InvalidPort(String),

    #[error("BIND_HOST is not a valid IP address: {0}")]
    InvalidBind(String),

    #[error("TOKEN_TTL_SECS is not a whole number of seconds: {0}")]
    InvalidTtl(String),

    #[error("BCRYPT_COST must be between 4 and 31: {0}")]
    InvalidHashCost(String),
}

/// Server configuration loaded from environment variables.
#[derive(Clone)]
pub struct ServerConfig {
    pub database_path: PathBuf,
    pub jwt_secret: String,
    pub bind: SocketAddr,
    pub static_dir: PathBuf,
    /// `None` issues tokens without an expiry.
    pub token_ttl: Option<Duration>,
    /// Also guard the record mutation routes with bearer auth.
    pub protect_writes: bool,
    pub admin_username: String,
    pub admin_password: String,
    pub hash_cost: u32,
}

impl ServerConfig {
    /// A configuration with every default applied and the given secret.
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            jwt_secret: jwt_secret.into(),
            bind: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            token_ttl: Some(Duration::from_secs(DEFAULT_TOKEN_TTL_SECS)),
            protect_writes: false,
            admin_username: DEFAULT_ADMIN_USERNAME.to_string(),
            admin_password: DEFAULT_ADMIN_PASSWORD.to_string(),
            hash_cost: DEFAULT_HASH_COST,
        }
    }

    /// Load configuration from environment variables with sensible defaults.
    ///
    /// Environment variables:
    /// - DATABASE_PATH: SQLite file (default: ratekeeper.db)
    /// - JWT_SECRET: token signing secret (required)
    /// - PORT: listen port (default: 1000)
    /// - BIND_HOST: listen address (default: 0.0.0.0)
    /// - STATIC_DIR: static asset directory (default: public)
    /// - TOKEN_TTL_SECS: token lifetime, 0 for non-expiring tokens (default: 86400)
    /// - PROTECT_WRITES: require auth on record mutation routes (default: false)
    /// - ADMIN_USERNAME / ADMIN_PASSWORD: seeded admin credential
    /// - BCRYPT_COST: password hash cost (default: 10)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup. Empty values
    /// count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let jwt_secret = var("JWT_SECRET").ok_or(ConfigError::MissingSecret)?;
        let mut config = Self::new(jwt_secret);

        if let Some(path) = var("DATABASE_PATH") {
            config.database_path = PathBuf::from(path);
        }

        if let Some(port) = var("PORT") {
            let port = port
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(port))?;
            config.bind.set_port(port);
        }

        if let Some(host) = var("BIND_HOST") {
            let ip = host
                .parse::<IpAddr>()
                .map_err(|_| ConfigError::InvalidBind(host))?;
            config.bind.set_ip(ip);
        }

        if let Some(dir) = var("STATIC_DIR") {
            config.static_dir = PathBuf::from(dir);
        }

        if let Some(ttl) = var("TOKEN_TTL_SECS") {
            let secs = ttl
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidTtl(ttl))?;
            config.token_ttl = (secs > 0).then(|| Duration::from_secs(secs));
        }

        config.protect_writes = var("PROTECT_WRITES")
            .map(|v| v == "true" || v == "1" || v == "yes")
            .unwrap_or(false);

        if let Some(username) = var("ADMIN_USERNAME") {
            config.admin_username = username;
        }
        if let Some(password) = var("ADMIN_PASSWORD") {
            config.admin_password = password;
        }

        if let Some(cost) = var("BCRYPT_COST") {
            config.hash_cost = cost
                .parse::<u32>()
                .ok()
                .filter(|c| (MIN_HASH_COST..=MAX_HASH_COST).contains(c))
                .ok_or(ConfigError::InvalidHashCost(cost))?;
        }

        Ok(config)
    }

    /// True when the seeded admin still uses the well-known password.
    pub fn uses_default_admin_password(&self) -> bool {
        self.admin_password == DEFAULT_ADMIN_PASSWORD
    }
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("database_path", &self.database_path)
            .field("jwt_secret", &"<redacted>")
            .field("bind", &self.bind)
            .field("static_dir", &self.static_dir)
            .field("token_ttl", &self.token_ttl)
            .field("protect_writes", &self.protect_writes)
            .field("admin_username", &self.admin_username)
            .field("admin_password", &"<redacted>")
            .field("hash_cost", &self.hash_cost)
            .finish()
    }
}
