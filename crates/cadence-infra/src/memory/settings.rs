use async_trait::async_trait;
use tokio::sync::RwLock;

use cadence_core::domain::Settings;
use cadence_core::error::RepoError;
use cadence_core::ports::SettingsRepository;

/// Settings singleton held in memory, starting from the defaults.
pub struct InMemorySettingsRepository {
    current: RwLock<Settings>,
}

impl InMemorySettingsRepository {
    pub fn new() -> Self {
        Self::with(Settings::default())
    }

    pub fn with(settings: Settings) -> Self {
        Self {
            current: RwLock::new(settings),
        }
    }
}

impl Default for InMemorySettingsRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SettingsRepository for InMemorySettingsRepository {
    async fn get(&self) -> Result<Settings, RepoError> {
        Ok(self.current.read().await.clone())
    }

    async fn save(&self, settings: Settings) -> Result<Settings, RepoError> {
        *self.current.write().await = settings.clone();
        Ok(settings)
    }
}
