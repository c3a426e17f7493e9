//! # Cadence Infrastructure
//!
//! Concrete implementations of the ports defined in `cadence-core`.
//! This crate contains database, asset storage, and platform integrations.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external database, in-memory only
//! - `postgres` - PostgreSQL database support via SeaORM

pub mod assets;
pub mod database;
pub mod memory;
pub mod publish;
pub mod runtime;

// Re-exports - In-Memory
pub use assets::{InMemoryAssetStore, LocalAssetStore};
pub use memory::{InMemoryPostRepository, InMemorySettingsRepository};

pub use database::DatabaseConfig;
#[cfg(feature = "postgres")]
pub use database::{DatabaseConnections, PostgresPostRepository, PostgresSettingsRepository};

pub use publish::{InstagramConfig, InstagramPublisher, UnconfiguredPublisher};
pub use runtime::TokioDelay;
