// src/config.rs

use std::env;
use dotenvy::dotenv;

/// Default shareable link length (alphanumeric characters).
pub const DEFAULT_LINK_LENGTH: usize = 12;

/// How long a session token stays verifiable after its deadline.
pub const DEFAULT_SESSION_RETENTION_MINUTES: i64 = 24 * 60;

/// Which `QuizStore` backend the binary wires up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Postgres,
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub store: StoreKind,
    pub database_url: Option<String>,
    /// Secret shared with the identity provider that signs bearer tokens.
    pub jwt_secret: String,
    /// Secret used to sign taker session tokens.
    pub session_secret: String,
    pub session_retention_minutes: i64,
    pub link_length: usize,
    /// Role allowed to act on any quiz. `None` disables the override.
    pub admin_role: Option<String>,
    pub bind_addr: String,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let store = match env::var("STORE").unwrap_or_default().to_lowercase().as_str() {
            "memory" => StoreKind::Memory,
            _ => StoreKind::Postgres,
        };

        let database_url = env::var("DATABASE_URL").ok();
        if store == StoreKind::Postgres && database_url.is_none() {
            panic!("DATABASE_URL must be set when STORE=postgres");
        }

        let jwt_secret = env::var("JWT_SECRET")
            .expect("JWT_SECRET must be set");

        let session_secret = env::var("SESSION_SECRET")
            .expect("SESSION_SECRET must be set");

        let session_retention_minutes = env::var("SESSION_RETENTION_MINUTES")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_SESSION_RETENTION_MINUTES);

        let link_length = env::var("LINK_LENGTH")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .map(|v| v.clamp(8, 32))
            .unwrap_or(DEFAULT_LINK_LENGTH);

        let admin_role = match env::var("ADMIN_ROLE") {
            Ok(role) if role.trim().is_empty() => None,
            Ok(role) => Some(role),
            Err(_) => Some("admin".to_string()),
        };

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        Self {
            store,
            database_url,
            jwt_secret,
            session_secret,
            session_retention_minutes,
            link_length,
            admin_role,
            bind_addr,
            rust_log,
        }
    }

    /// In-memory configuration with fixed secrets, for tests and local runs.
    pub fn for_memory(jwt_secret: &str, session_secret: &str) -> Self {
        Self {
            store: StoreKind::Memory,
            database_url: None,
            jwt_secret: jwt_secret.to_string(),
            session_secret: session_secret.to_string(),
            session_retention_minutes: DEFAULT_SESSION_RETENTION_MINUTES,
            link_length: DEFAULT_LINK_LENGTH,
            admin_role: Some("admin".to_string()),
            bind_addr: "127.0.0.1:0".to_string(),
            rust_log: "error".to_string(),
        }
    }
}
