//! Publishing platform clients.

mod instagram;
mod unconfigured;

pub use instagram::{DEFAULT_API_BASE, InstagramConfig, InstagramPublisher};
pub use unconfigured::UnconfiguredPublisher;
