//! Settings entity for SeaORM - a single row with id 1.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use cadence_core::domain::{Settings, parse_timezone};
use cadence_core::error::RepoError;

pub const SINGLETON_ID: i32 = 1;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub post_frequency: String,
    pub preferred_time: String,
    pub timezone: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Stored settings are re-validated on the way out.
impl TryFrom<Model> for Settings {
    type Error = RepoError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let corrupt = |e: cadence_core::DomainError| RepoError::Corrupt(format!("settings: {e}"));
        Ok(Self {
            post_frequency: model.post_frequency.parse().map_err(corrupt)?,
            preferred_time: model.preferred_time.parse().map_err(corrupt)?,
            timezone: parse_timezone(&model.timezone).map_err(corrupt)?,
        })
    }
}

impl From<Settings> for ActiveModel {
    fn from(settings: Settings) -> Self {
        Self {
            id: Set(SINGLETON_ID),
            post_frequency: Set(settings.post_frequency.as_str().to_string()),
            preferred_time: Set(settings.preferred_time.to_string()),
            timezone: Set(settings.timezone.name().to_string()),
        }
    }
}
