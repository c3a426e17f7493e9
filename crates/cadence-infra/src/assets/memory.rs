use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use cadence_core::ports::{AssetError, AssetStore, StoredAsset};

use super::local::object_key;

pub const MEMORY_ASSET_BASE: &str = "memory://assets";

/// Asset store kept in process memory, for tests and storage-less runs.
pub struct InMemoryAssetStore {
    objects: RwLock<HashMap<String, StoredAsset>>,
}

impl InMemoryAssetStore {
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
        }
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

impl Default for InMemoryAssetStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AssetStore for InMemoryAssetStore {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        content_type: &str,
    ) -> Result<String, AssetError> {
        let key = object_key(filename);
        self.objects.write().await.insert(
            key.clone(),
            StoredAsset {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(format!("{MEMORY_ASSET_BASE}/{key}"))
    }

    async fn delete(&self, url: &str) -> Result<(), AssetError> {
        let key = url
            .strip_prefix(MEMORY_ASSET_BASE)
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(|| AssetError::ForeignUrl(url.to_string()))?;
        self.objects
            .write()
            .await
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| AssetError::NotFound(key.to_string()))
    }

    async fn read(&self, key: &str) -> Result<StoredAsset, AssetError> {
        self.objects
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| AssetError::NotFound(key.to_string()))
    }
}
