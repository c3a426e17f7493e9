//! Asset stores for uploaded images.

mod local;
mod memory;

pub use local::LocalAssetStore;
pub use memory::{InMemoryAssetStore, MEMORY_ASSET_BASE};
