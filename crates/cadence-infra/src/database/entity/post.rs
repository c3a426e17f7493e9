//! Post entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::NotSet, Set};

use cadence_core::domain::PostStatus;

/// Stored post status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum Status {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "scheduled")]
    Scheduled,
    #[sea_orm(string_value = "published")]
    Published,
    #[sea_orm(string_value = "failed")]
    Failed,
}

impl From<PostStatus> for Status {
    fn from(status: PostStatus) -> Self {
        match status {
            PostStatus::Pending => Status::Pending,
            PostStatus::Scheduled => Status::Scheduled,
            PostStatus::Published => Status::Published,
            PostStatus::Failed => Status::Failed,
        }
    }
}

impl From<Status> for PostStatus {
    fn from(status: Status) -> Self {
        match status {
            Status::Pending => PostStatus::Pending,
            Status::Scheduled => PostStatus::Scheduled,
            Status::Published => PostStatus::Published,
            Status::Failed => PostStatus::Failed,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub image_url: String,
    #[sea_orm(column_type = "Text")]
    pub caption: String,
    pub scheduled_at: DateTimeWithTimeZone,
    pub is_pinned: bool,
    pub status: Status,
    pub published_at: Option<DateTimeWithTimeZone>,
    pub platform_post_id: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub error_message: Option<String>,
    pub claim_token: Option<Uuid>,
    pub claimed_until: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain Post.
impl From<Model> for cadence_core::domain::Post {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            image_url: model.image_url,
            caption: model.caption,
            scheduled_at: model.scheduled_at.into(),
            is_pinned: model.is_pinned,
            status: model.status.into(),
            published_at: model.published_at.map(Into::into),
            platform_post_id: model.platform_post_id,
            error_message: model.error_message,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

/// Conversion from Domain Post to SeaORM ActiveModel.
///
/// Claim columns are left untouched so saving a post never releases or steals
/// a sweep's claim.
impl From<cadence_core::domain::Post> for ActiveModel {
    fn from(post: cadence_core::domain::Post) -> Self {
        Self {
            id: Set(post.id),
            image_url: Set(post.image_url),
            caption: Set(post.caption),
            scheduled_at: Set(post.scheduled_at.into()),
            is_pinned: Set(post.is_pinned),
            status: Set(post.status.into()),
            published_at: Set(post.published_at.map(Into::into)),
            platform_post_id: Set(post.platform_post_id),
            error_message: Set(post.error_message),
            claim_token: NotSet,
            claimed_until: NotSet,
            created_at: Set(post.created_at.into()),
            updated_at: Set(post.updated_at.into()),
        }
    }
}
