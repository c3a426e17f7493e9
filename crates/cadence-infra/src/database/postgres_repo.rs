//! PostgreSQL repository implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, Condition, DbConn, EntityTrait, QueryFilter, QueryOrder, UpdateMany, Value,
};
use uuid::Uuid;

use cadence_core::domain::{Post, PostEdit, PostStatus, Settings, StatusTransition};
use cadence_core::error::RepoError;
use cadence_core::ports::{Claim, PostRepository, SettingsRepository, StatusGuard, UpdateOutcome};

use super::entity::post::{self, Entity as PostEntity};
use super::entity::settings::{self, Entity as SettingsEntity, SINGLETON_ID};
use super::postgres_base::{PostgresBaseRepository, query_error, write_error};

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

fn db_time(at: DateTime<Utc>) -> DateTimeWithTimeZone {
    at.into()
}

fn statuses(from: &[PostStatus]) -> Vec<post::Status> {
    from.iter().copied().map(post::Status::from).collect()
}

/// Set the columns a transition owns, clearing the ones it does not.
fn apply_transition(update: UpdateMany<PostEntity>, transition: StatusTransition) -> UpdateMany<PostEntity> {
    let no_time = Value::from(Option::<DateTimeWithTimeZone>::None);
    let no_text = Value::from(Option::<String>::None);

    let update = update
        .col_expr(post::Column::Status, Expr::value(post::Status::from(transition.target_status())))
        .col_expr(post::Column::UpdatedAt, Expr::value(db_time(Utc::now())))
        .col_expr(post::Column::ClaimToken, Expr::value(Option::<Uuid>::None))
        .col_expr(post::Column::ClaimedUntil, Expr::value(no_time.clone()));

    match transition {
        StatusTransition::Published {
            published_at,
            platform_post_id,
        } => update
            .col_expr(post::Column::PublishedAt, Expr::value(Some(db_time(published_at))))
            .col_expr(post::Column::PlatformPostId, Expr::value(Some(platform_post_id)))
            .col_expr(post::Column::ErrorMessage, Expr::value(no_text)),
        StatusTransition::Failed { error_message } => update
            .col_expr(post::Column::PublishedAt, Expr::value(no_time))
            .col_expr(post::Column::PlatformPostId, Expr::value(no_text))
            .col_expr(post::Column::ErrorMessage, Expr::value(Some(error_message))),
        StatusTransition::Requeued { scheduled_at } => {
            let update = update
                .col_expr(post::Column::PublishedAt, Expr::value(no_time))
                .col_expr(post::Column::PlatformPostId, Expr::value(no_text.clone()))
                .col_expr(post::Column::ErrorMessage, Expr::value(no_text));
            match scheduled_at {
                Some(at) => update.col_expr(post::Column::ScheduledAt, Expr::value(db_time(at))),
                None => update,
            }
        }
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn list(&self) -> Result<Vec<Post>, RepoError> {
        let result = PostEntity::find()
            .order_by_asc(post::Column::ScheduledAt)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn list_due(&self, now: DateTime<Utc>) -> Result<Vec<Post>, RepoError> {
        let result = PostEntity::find()
            .filter(post::Column::Status.is_in(statuses(PostStatus::DUE_ELIGIBLE)))
            .filter(post::Column::ScheduledAt.lte(db_time(now)))
            .order_by_asc(post::Column::ScheduledAt)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn list_pinned(&self) -> Result<Vec<Post>, RepoError> {
        let result = PostEntity::find()
            .filter(post::Column::IsPinned.eq(true))
            .order_by_asc(post::Column::ScheduledAt)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn insert_batch(&self, posts: Vec<Post>) -> Result<Vec<Post>, RepoError> {
        if posts.is_empty() {
            return Ok(posts);
        }

        let models: Vec<post::ActiveModel> = posts.iter().cloned().map(Into::into).collect();
        PostEntity::insert_many(models)
            .exec_without_returning(&self.db)
            .await
            .map_err(write_error)?;

        tracing::debug!(count = posts.len(), "Inserted post batch");
        Ok(posts)
    }

    async fn claim(&self, id: Uuid, claim: Claim, now: DateTime<Utc>) -> Result<bool, RepoError> {
        let result = PostEntity::update_many()
            .col_expr(post::Column::ClaimToken, Expr::value(Some(claim.token)))
            .col_expr(post::Column::ClaimedUntil, Expr::value(Some(db_time(claim.expires_at))))
            .filter(post::Column::Id.eq(id))
            .filter(post::Column::Status.is_in(statuses(PostStatus::DUE_ELIGIBLE)))
            .filter(
                Condition::any()
                    .add(post::Column::ClaimToken.is_null())
                    .add(post::Column::ClaimedUntil.lt(db_time(now))),
            )
            .exec(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.rows_affected == 1)
    }

    async fn update_status(
        &self,
        id: Uuid,
        guard: StatusGuard,
        transition: StatusTransition,
    ) -> Result<UpdateOutcome, RepoError> {
        let mut update = PostEntity::update_many()
            .filter(post::Column::Id.eq(id))
            .filter(post::Column::Status.is_in(statuses(guard.from)));
        if let Some(token) = guard.claim_token {
            update = update.filter(post::Column::ClaimToken.eq(token));
        }

        let result = apply_transition(update, transition)
            .exec(&self.db)
            .await
            .map_err(query_error)?;

        self.outcome(id, result.rows_affected).await
    }

    async fn update_details(
        &self,
        id: Uuid,
        edit: PostEdit,
        now: DateTime<Utc>,
    ) -> Result<UpdateOutcome, RepoError> {
        let mut update = PostEntity::update_many()
            .col_expr(post::Column::UpdatedAt, Expr::value(db_time(now)))
            .filter(post::Column::Id.eq(id))
            .filter(post::Column::Status.is_in(statuses(PostStatus::EDITABLE)))
            .filter(
                Condition::any()
                    .add(post::Column::ClaimToken.is_null())
                    .add(post::Column::ClaimedUntil.lt(db_time(now))),
            );
        if let Some(caption) = edit.caption {
            update = update.col_expr(post::Column::Caption, Expr::value(caption));
        }
        if let Some(at) = edit.scheduled_at {
            update = update
                .col_expr(post::Column::ScheduledAt, Expr::value(db_time(at)))
                .col_expr(post::Column::IsPinned, Expr::value(true));
        }

        let result = update.exec(&self.db).await.map_err(query_error)?;
        self.outcome(id, result.rows_affected).await
    }
}

impl PostgresPostRepository {
    /// Tell a conditional write that matched nothing apart from a missing row.
    async fn outcome(&self, id: Uuid, rows_affected: u64) -> Result<UpdateOutcome, RepoError> {
        if rows_affected > 0 {
            return Ok(UpdateOutcome::Applied);
        }

        let exists = PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(query_error)?
            .is_some();
        Ok(if exists {
            UpdateOutcome::Conflict
        } else {
            UpdateOutcome::NotFound
        })
    }
}

/// PostgreSQL settings repository.
pub struct PostgresSettingsRepository {
    db: DbConn,
}

impl PostgresSettingsRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SettingsRepository for PostgresSettingsRepository {
    async fn get(&self) -> Result<Settings, RepoError> {
        if let Some(model) = SettingsEntity::find_by_id(SINGLETON_ID)
            .one(&self.db)
            .await
            .map_err(query_error)?
        {
            return Settings::try_from(model);
        }

        let defaults = Settings::default();
        let model: settings::ActiveModel = defaults.clone().into();
        SettingsEntity::insert(model)
            .on_conflict(OnConflict::column(settings::Column::Id).do_nothing().to_owned())
            .exec_without_returning(&self.db)
            .await
            .map_err(write_error)?;

        tracing::info!("Settings row created with defaults");
        Ok(defaults)
    }

    async fn save(&self, settings: Settings) -> Result<Settings, RepoError> {
        let model: settings::ActiveModel = settings.clone().into();
        SettingsEntity::insert(model)
            .on_conflict(
                OnConflict::column(settings::Column::Id)
                    .update_columns([
                        settings::Column::PostFrequency,
                        settings::Column::PreferredTime,
                        settings::Column::Timezone,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(write_error)?;

        Ok(settings)
    }
}
