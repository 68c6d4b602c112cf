//! Server configuration management

use crate::error::{ApiError, Result};
use carlot::listing::{DEFAULT_MAX_PAGE_SIZE, DEFAULT_PAGE_SIZE};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// SQLite connection string
    pub database_url: String,

    /// Directory uploaded images are written to
    pub media_dir: String,

    /// Secret the anti-forgery tokens are derived from
    #[serde(skip_serializing)]
    pub csrf_secret: String,

    /// Listing page size when the request names none
    pub default_page_size: u64,

    /// Largest page size a request may ask for
    pub max_page_size: u64,

    /// Maximum request body size, covering the uploaded image
    pub max_upload_bytes: usize,

    /// Whether to seed sample terms and cars on startup
    pub seed_sample_data: bool,

    /// CORS allowed origins
    pub cors_origins: Vec<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let csrf_secret = match std::env::var("CSRF_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ => {
                warn!("CSRF_SECRET not set; generated a per-process secret, forms will not survive a restart");
                random_secret()
            }
        };

        Ok(Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_var("PORT", "3000")?,
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:./data/carlot.db".to_string()),
            media_dir: std::env::var("MEDIA_DIR").unwrap_or_else(|_| "./data/media".to_string()),
            csrf_secret,
            default_page_size: parse_var("DEFAULT_PAGE_SIZE", &DEFAULT_PAGE_SIZE.to_string())?,
            max_page_size: parse_var("MAX_PAGE_SIZE", &DEFAULT_MAX_PAGE_SIZE.to_string())?,
            max_upload_bytes: parse_var("MAX_UPLOAD_BYTES", "10485760")?, // 10 MiB
            seed_sample_data: std::env::var("SEED_SAMPLE_DATA")
                .map(|s| s.to_lowercase() != "false")
                .unwrap_or(true),
            cors_origins: std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "*".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: &str) -> Result<T> {
    std::env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .map_err(|_| ApiError::Config(format!("Invalid {} value", name)))
}

fn random_secret() -> String {
    format!("{}{}", uuid::Uuid::new_v4().simple(), uuid::Uuid::new_v4().simple())
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            database_url: "sqlite:./data/carlot.db".to_string(),
            media_dir: "./data/media".to_string(),
            csrf_secret: random_secret(),
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
            max_upload_bytes: 10 * 1024 * 1024,
            seed_sample_data: true,
            cors_origins: vec!["*".to_string()],
        }
    }
}
