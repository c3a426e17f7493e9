//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use cadence_core::services::PublisherConfig;
use cadence_infra::database::DatabaseConfig;
use cadence_infra::publish::InstagramConfig;

/// Where uploaded images are written and the URL prefix they are served under.
#[derive(Debug, Clone)]
pub struct AssetConfig {
    pub dir: String,
    pub public_url: String,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    /// Bearer secret guarding the sweep trigger. `None` leaves it open.
    pub cron_secret: Option<String>,
    pub instagram: Option<InstagramConfig>,
    pub publisher: PublisherConfig,
    pub assets: AssetConfig,
}

fn parsed<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = non_empty("DATABASE_URL").map(|url| {
            let mut config = DatabaseConfig::new(url);
            config.max_connections = parsed("DB_MAX_CONNECTIONS", config.max_connections);
            config.min_connections = parsed("DB_MIN_CONNECTIONS", config.min_connections);
            config
        });

        let instagram = InstagramConfig::from_env();
        let defaults = PublisherConfig::default();
        let publisher = PublisherConfig {
            settle_delay: Duration::from_secs(parsed(
                "PUBLISH_SETTLE_SECS",
                defaults.settle_delay.as_secs(),
            )),
            claim_ttl: Duration::from_secs(parsed(
                "PUBLISH_CLAIM_TTL_SECS",
                defaults.claim_ttl.as_secs(),
            )),
            platform_timeout: instagram
                .as_ref()
                .map_or(defaults.platform_timeout, |ig| ig.timeout),
        };

        let port = parsed("PORT", 8080);
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let assets = AssetConfig {
            dir: env::var("ASSET_DIR").unwrap_or_else(|_| "./uploads".to_string()),
            public_url: non_empty("ASSET_PUBLIC_URL")
                .unwrap_or_else(|| format!("http://{host}:{port}/uploads")),
        };

        Self {
            host,
            port,
            database,
            cron_secret: non_empty("CRON_SECRET"),
            instagram,
            publisher,
            assets,
        }
    }
}
