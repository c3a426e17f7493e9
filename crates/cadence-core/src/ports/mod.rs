//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod assets;
mod publish;
mod repository;
mod runtime;

pub use assets::{AssetError, AssetStore, StoredAsset};
pub use publish::{AccountInfo, ContainerHandle, PublishCapability, PublishError};
pub use repository::{
    BaseRepository, Claim, PostRepository, SettingsRepository, StatusGuard, UpdateOutcome,
};
pub use runtime::{Clock, Delay, SystemClock};
