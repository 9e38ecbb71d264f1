/// Configuration management for the post service
///
/// This module handles loading and managing configuration from environment
/// variables.
use std::time::Duration;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Post store behavior
    pub store: StoreConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins
    pub allowed_origins: String,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL
    pub url: String,
    /// Max connections in pool
    pub max_connections: u32,
}

/// Post store behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Upper bound for any single store operation, in seconds
    pub op_timeout_secs: u64,
}

impl StoreConfig {
    pub fn op_timeout(&self) -> Duration {
        Duration::from_secs(self.op_timeout_secs)
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let allowed_origins = match std::env::var("CORS_ALLOWED_ORIGINS") {
            Ok(value) => value,
            Err(_) if app_env.eq_ignore_ascii_case("production") => {
                bail!("CORS_ALLOWED_ORIGINS must be set in production")
            }
            Err(_) => "http://localhost:3000".to_string(),
        };
        if app_env.eq_ignore_ascii_case("production") && allowed_origins.trim() == "*" {
            bail!("CORS_ALLOWED_ORIGINS cannot be '*' in production");
        }

        Ok(Config {
            app: AppConfig {
                env: app_env,
                host: std::env::var("POST_SERVICE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("POST_SERVICE_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(8080),
            },
            cors: CorsConfig { allowed_origins },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "postgresql://localhost/linkboard".to_string()),
                max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|c| c.parse().ok())
                    .unwrap_or(10),
            },
            store: StoreConfig {
                op_timeout_secs: match std::env::var("STORE_OP_TIMEOUT_SECS") {
                    Ok(raw) => raw
                        .parse()
                        .with_context(|| format!("invalid STORE_OP_TIMEOUT_SECS '{raw}'"))?,
                    Err(_) => 10,
                },
            },
        })
    }
}
