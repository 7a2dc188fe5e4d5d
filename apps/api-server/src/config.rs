//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use blogicum_infra::database::DatabaseConfig;

/// Where uploaded media lives and the URL prefix it is served under.
#[derive(Debug, Clone)]
pub struct MediaConfig {
    pub root: PathBuf,
    pub url: String,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    pub media: MediaConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL").ok().map(|url| {
            let mut config = DatabaseConfig::new(url);
            if let Some(max) = parse_var("DB_MAX_CONNECTIONS") {
                config.max_connections = max;
            }
            if let Some(min) = parse_var("DB_MIN_CONNECTIONS") {
                config.min_connections = min;
            }
            config
        });

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("PORT").unwrap_or(8080),
            database,
            media: MediaConfig {
                root: env::var("MEDIA_ROOT")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("media")),
                url: normalize_url_prefix(
                    &env::var("MEDIA_URL").unwrap_or_else(|_| "/media".to_string()),
                ),
            },
        }
    }
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.parse().ok())
}

/// `media/` and `/media/` both become `/media`.
fn normalize_url_prefix(raw: &str) -> String {
    format!("/{}", raw.trim_matches('/'))
}
