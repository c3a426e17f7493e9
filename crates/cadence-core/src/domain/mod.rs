//! Domain entities - the core business objects.

mod post;
mod settings;

pub use post::{Post, PostEdit, PostStatus, StatusTransition};
pub use settings::{PostFrequency, PreferredTime, Settings, SettingsPatch, parse_timezone};
