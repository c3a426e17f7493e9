use async_trait::async_trait;

/// Blob storage for uploaded images.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Store bytes and return the public URL posts reference.
    async fn upload(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        content_type: &str,
    ) -> Result<String, AssetError>;

    /// Remove the asset behind a public URL.
    async fn delete(&self, url: &str) -> Result<(), AssetError>;

    /// Read an asset back by its storage key. Stores whose public URLs are
    /// served elsewhere leave this unsupported.
    async fn read(&self, key: &str) -> Result<StoredAsset, AssetError> {
        Err(AssetError::NotFound(key.to_string()))
    }
}

/// Asset bytes with the content type they are served as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAsset {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Asset storage errors.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("Asset not found: {0}")]
    NotFound(String),

    #[error("Asset URL not owned by this store: {0}")]
    ForeignUrl(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}
