//! In-memory repositories - used as fallback when no database is configured.

mod posts;
mod settings;

pub use posts::InMemoryPostRepository;
pub use settings::InMemorySettingsRepository;
