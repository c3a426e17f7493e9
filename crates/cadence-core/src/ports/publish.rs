//! Publish capability port - the external platform's two-phase contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Opaque handle for staged content awaiting commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerHandle(pub String);

impl ContainerHandle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Account the capability publishes to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountInfo {
    pub id: String,
    pub username: Option<String>,
    pub name: Option<String>,
}

/// Publishing platform abstraction (Instagram Graph API, test doubles).
#[async_trait]
pub trait PublishCapability: Send + Sync {
    /// Stage an image and caption. First phase.
    async fn create_container(
        &self,
        image_url: &str,
        caption: &str,
    ) -> Result<ContainerHandle, PublishError>;

    /// Make a staged container live, returning the platform's post id.
    async fn commit(&self, container: &ContainerHandle) -> Result<String, PublishError>;

    /// Look up the account credentials point at.
    async fn account(&self) -> Result<AccountInfo, PublishError> {
        Err(PublishError::Unsupported)
    }
}

/// Platform publish errors.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("Failed to create media container: {0}")]
    ContainerRejected(String),

    #[error("Failed to publish media: {0}")]
    CommitRejected(String),

    #[error("Platform unreachable: {0}")]
    Transport(String),

    #[error("Publishing is not configured")]
    NotConfigured,

    #[error("Operation not supported by this platform")]
    Unsupported,
}
