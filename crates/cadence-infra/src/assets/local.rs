//! Filesystem asset store. Files live under `root/images/`, and their public
//! URLs are `public_base/images/<name>`.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use uuid::Uuid;

use cadence_core::ports::{AssetError, AssetStore, StoredAsset};

/// Stores uploads on local disk.
pub struct LocalAssetStore {
    root: PathBuf,
    public_base: String,
}

impl LocalAssetStore {
    pub fn new(root: impl Into<PathBuf>, public_base: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base: public_base.into().trim_end_matches('/').to_string(),
        }
    }

    fn url_for(&self, key: &str) -> String {
        format!("{}/{}", self.public_base, key)
    }

    fn key_of<'a>(&self, url: &'a str) -> Result<&'a str, AssetError> {
        url.strip_prefix(&self.public_base)
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(|| AssetError::ForeignUrl(url.to_string()))
    }

    /// Resolve a key to a path inside `root`, refusing anything that could
    /// step outside it.
    fn path_of(&self, key: &str) -> Result<PathBuf, AssetError> {
        let relative = Path::new(key);
        let contained = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !contained {
            return Err(AssetError::NotFound(key.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

/// `images/<millis>-<random>.<ext>`, keeping only a short alphanumeric
/// extension from the client's filename.
pub(crate) fn object_key(filename: &str) -> String {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| "jpg".to_string());
    let millis = chrono::Utc::now().timestamp_millis();
    let random = Uuid::new_v4().simple().to_string();
    format!("images/{millis}-{}.{ext}", &random[..8])
}

pub(crate) fn content_type_for(key: &str) -> &'static str {
    let ext = key.rsplit_once('.').map(|(_, ext)| ext).unwrap_or_default();
    match ext {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "heic" => "image/heic",
        _ => "application/octet-stream",
    }
}

fn backend(e: std::io::Error) -> AssetError {
    AssetError::Backend(e.to_string())
}

#[async_trait]
impl AssetStore for LocalAssetStore {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        content_type: &str,
    ) -> Result<String, AssetError> {
        let key = object_key(filename);
        let path = self.path_of(&key)?;
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir).await.map_err(backend)?;
        }
        tokio::fs::write(&path, &bytes).await.map_err(backend)?;

        tracing::debug!(key = %key, size = bytes.len(), content_type, "Asset stored");
        Ok(self.url_for(&key))
    }

    async fn delete(&self, url: &str) -> Result<(), AssetError> {
        let key = self.key_of(url)?;
        let path = self.path_of(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(AssetError::NotFound(key.to_string())),
            Err(e) => Err(backend(e)),
        }
    }

    async fn read(&self, key: &str) -> Result<StoredAsset, AssetError> {
        let path = self.path_of(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(StoredAsset {
                bytes,
                content_type: content_type_for(key).to_string(),
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(AssetError::NotFound(key.to_string())),
            Err(e) => Err(backend(e)),
        }
    }
}
