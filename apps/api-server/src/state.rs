//! Application state - shared across all handlers.

use std::sync::Arc;

use cadence_core::ports::{
    AssetStore, Clock, Delay, PostRepository, PublishCapability, SettingsRepository, SystemClock,
};
use cadence_core::services::{Publisher, PublisherConfig, SchedulingService};
use cadence_infra::{
    InMemoryPostRepository, InMemorySettingsRepository, InstagramPublisher, LocalAssetStore,
    TokioDelay, UnconfiguredPublisher,
};

#[cfg(feature = "postgres")]
use cadence_infra::database::{
    DatabaseConnections, PostgresPostRepository, PostgresSettingsRepository,
};

use crate::config::AppConfig;

/// Which post store the server runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Postgres,
    Memory,
}

impl StoreKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKind::Postgres => "postgres",
            StoreKind::Memory => "memory",
        }
    }
}

/// Ports the state is assembled from.
pub struct Components {
    pub posts: Arc<dyn PostRepository>,
    pub settings: Arc<dyn SettingsRepository>,
    pub assets: Arc<dyn AssetStore>,
    pub platform: Arc<dyn PublishCapability>,
    pub delay: Arc<dyn Delay>,
    pub clock: Arc<dyn Clock>,
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub scheduling: Arc<SchedulingService>,
    pub publisher: Arc<Publisher>,
    pub platform: Arc<dyn PublishCapability>,
    pub assets: Arc<dyn AssetStore>,
    pub cron_secret: Option<Arc<str>>,
    pub store: StoreKind,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let (posts, settings, store) = Self::repositories(config).await;

        let assets: Arc<dyn AssetStore> = Arc::new(LocalAssetStore::new(
            &config.assets.dir,
            &config.assets.public_url,
        ));

        let platform: Arc<dyn PublishCapability> = match &config.instagram {
            Some(instagram) => match InstagramPublisher::new(instagram.clone()) {
                Ok(publisher) => {
                    tracing::info!(account_id = %instagram.account_id, "Instagram publishing enabled");
                    Arc::new(publisher)
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to build Instagram client. Publishing disabled.");
                    Arc::new(UnconfiguredPublisher)
                }
            },
            None => {
                tracing::warn!("Instagram credentials not set. Due posts will fail until configured.");
                Arc::new(UnconfiguredPublisher)
            }
        };

        let state = Self::from_components(
            Components {
                posts,
                settings,
                assets,
                platform,
                delay: Arc::new(TokioDelay),
                clock: Arc::new(SystemClock),
            },
            config.publisher.clone(),
            config.cron_secret.clone(),
            store,
        );

        tracing::info!(store = store.as_str(), "Application state initialized");
        state
    }

    /// Wire the services over a given set of ports.
    pub fn from_components(
        components: Components,
        publisher_config: PublisherConfig,
        cron_secret: Option<String>,
        store: StoreKind,
    ) -> Self {
        let Components {
            posts,
            settings,
            assets,
            platform,
            delay,
            clock,
        } = components;

        let scheduling = Arc::new(SchedulingService::new(
            posts.clone(),
            settings,
            assets.clone(),
            clock.clone(),
        ));
        let publisher = Arc::new(Publisher::new(
            posts,
            platform.clone(),
            delay,
            clock,
            publisher_config,
        ));

        Self {
            scheduling,
            publisher,
            platform,
            assets,
            cron_secret: cron_secret.map(Arc::from),
            store,
        }
    }

    #[cfg(feature = "postgres")]
    async fn repositories(
        config: &AppConfig,
    ) -> (Arc<dyn PostRepository>, Arc<dyn SettingsRepository>, StoreKind) {
        if let Some(db_config) = &config.database {
            match DatabaseConnections::init(db_config).await {
                Ok(connections) => {
                    return (
                        Arc::new(PostgresPostRepository::new(connections.main.clone())),
                        Arc::new(PostgresSettingsRepository::new(connections.main)),
                        StoreKind::Postgres,
                    );
                }
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        "Failed to connect to database. Using in-memory fallback."
                    );
                }
            }
        } else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
        }
        Self::in_memory()
    }

    #[cfg(not(feature = "postgres"))]
    async fn repositories(
        _config: &AppConfig,
    ) -> (Arc<dyn PostRepository>, Arc<dyn SettingsRepository>, StoreKind) {
        tracing::info!("Running without postgres feature - using in-memory repositories");
        Self::in_memory()
    }

    fn in_memory() -> (Arc<dyn PostRepository>, Arc<dyn SettingsRepository>, StoreKind) {
        (
            Arc::new(InMemoryPostRepository::new()),
            Arc::new(InMemorySettingsRepository::new()),
            StoreKind::Memory,
        )
    }
}
