use async_trait::async_trait;

use cadence_core::ports::{AccountInfo, ContainerHandle, PublishCapability, PublishError};

/// Stand-in when no platform credentials are configured. Every due post fails
/// with [`PublishError::NotConfigured`] instead of the sweep erroring out.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredPublisher;

#[async_trait]
impl PublishCapability for UnconfiguredPublisher {
    async fn create_container(
        &self,
        _image_url: &str,
        _caption: &str,
    ) -> Result<ContainerHandle, PublishError> {
        Err(PublishError::NotConfigured)
    }

    async fn commit(&self, _container: &ContainerHandle) -> Result<String, PublishError> {
        Err(PublishError::NotConfigured)
    }

    async fn account(&self) -> Result<AccountInfo, PublishError> {
        Err(PublishError::NotConfigured)
    }
}
