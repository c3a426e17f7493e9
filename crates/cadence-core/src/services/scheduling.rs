//! Post scheduling - batch creation, edits, retries and deletion.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::{Post, PostEdit, PostStatus, Settings, SettingsPatch, StatusTransition};
use crate::error::{DomainError, RepoError};
use crate::ports::{AssetStore, Clock, PostRepository, SettingsRepository, StatusGuard, UpdateOutcome};
use crate::schedule::{SchedulePolicy, allocate};

/// Upper bound on slots returned by a schedule preview.
pub const MAX_PREVIEW_SLOTS: usize = 90;

/// One item of a batch create. A fixed `scheduled_at` pins the post.
#[derive(Debug, Clone)]
pub struct NewPostRequest {
    pub image_url: String,
    pub caption: String,
    pub scheduled_at: Option<DateTime<Utc>>,
}

/// Turn a batch request into posts ready to insert.
///
/// Pinned items keep their time; the rest get allocated slots in request
/// order, avoiding every day already held by an existing or new pin. Nothing
/// is allocated unless the whole batch validates.
pub fn plan_batch(
    requests: Vec<NewPostRequest>,
    existing_pinned: &[Post],
    settings: &Settings,
    now: DateTime<Utc>,
) -> Result<Vec<Post>, DomainError> {
    if requests.is_empty() {
        return Err(DomainError::Validation("batch contains no posts".to_string()));
    }

    let policy = SchedulePolicy::from_settings(settings);
    let mut pinned: BTreeSet<NaiveDate> = existing_pinned
        .iter()
        .map(|p| policy.local_date(p.scheduled_at))
        .collect();

    let mut unpinned = 0usize;
    for (index, request) in requests.iter().enumerate() {
        if request.image_url.trim().is_empty() {
            return Err(DomainError::Validation(format!(
                "post {index}: image_url is required"
            )));
        }
        match request.scheduled_at {
            Some(at) => {
                let day = policy.local_date(at);
                if !pinned.insert(day) {
                    return Err(DomainError::Validation(format!(
                        "post {index}: {day} already has a pinned post"
                    )));
                }
            }
            None => unpinned += 1,
        }
    }

    let mut slots = allocate(unpinned, &pinned, &policy, now).into_iter();
    let mut posts = Vec::with_capacity(requests.len());
    for request in requests {
        let (scheduled_at, is_pinned) = match request.scheduled_at {
            Some(at) => (at, true),
            None => match slots.next() {
                Some(at) => (at, false),
                None => {
                    return Err(DomainError::Validation(
                        "could not allocate a slot for every post".to_string(),
                    ));
                }
            },
        };
        posts.push(Post::new(
            request.image_url.trim().to_string(),
            request.caption,
            scheduled_at,
            is_pinned,
            now,
        ));
    }

    Ok(posts)
}

/// Scheduling use cases over the post and settings stores.
///
/// Pinned-day checks and the writes they guard run under `pins`, so two
/// requests in this process cannot pin the same day. Separate server
/// processes sharing one database are not serialized.
pub struct SchedulingService {
    posts: Arc<dyn PostRepository>,
    settings: Arc<dyn SettingsRepository>,
    assets: Arc<dyn AssetStore>,
    clock: Arc<dyn Clock>,
    pins: Mutex<()>,
}

impl SchedulingService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        settings: Arc<dyn SettingsRepository>,
        assets: Arc<dyn AssetStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            posts,
            settings,
            assets,
            clock,
            pins: Mutex::new(()),
        }
    }

    pub async fn list_posts(&self) -> Result<Vec<Post>, DomainError> {
        Ok(self.posts.list().await?)
    }

    pub async fn get_post(&self, id: Uuid) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::post_not_found(id))
    }

    /// Create a batch of posts, allocating times for the unpinned ones from a
    /// single settings and pinned-date snapshot taken before any write.
    pub async fn create_batch(&self, requests: Vec<NewPostRequest>) -> Result<Vec<Post>, DomainError> {
        let _pins = self.pins.lock().await;
        let settings = self.settings.get().await?;
        let existing_pinned = self.posts.list_pinned().await?;
        let now = self.clock.now();

        let planned = plan_batch(requests, &existing_pinned, &settings, now)?;
        let created = self.posts.insert_batch(planned).await?;

        tracing::info!(
            count = created.len(),
            pinned = created.iter().filter(|p| p.is_pinned).count(),
            frequency = %settings.post_frequency,
            "Post batch scheduled"
        );
        Ok(created)
    }

    /// The next `count` auto-allocation slots, without writing anything.
    pub async fn preview(&self, count: usize) -> Result<Vec<DateTime<Utc>>, DomainError> {
        if count > MAX_PREVIEW_SLOTS {
            return Err(DomainError::Validation(format!(
                "preview is limited to {MAX_PREVIEW_SLOTS} slots"
            )));
        }
        let settings = self.settings.get().await?;
        let policy = SchedulePolicy::from_settings(&settings);
        let pinned: BTreeSet<NaiveDate> = self
            .posts
            .list_pinned()
            .await?
            .iter()
            .map(|p| policy.local_date(p.scheduled_at))
            .collect();

        Ok(allocate(count, &pinned, &policy, self.clock.now()))
    }

    /// Edit caption or time. The write is conditional, so a post that a
    /// sweep claimed or finished in the meantime is reported as a conflict
    /// instead of being overwritten.
    pub async fn update_post(&self, id: Uuid, edit: PostEdit) -> Result<Post, DomainError> {
        let current = self.get_post(id).await?;
        if current.status == PostStatus::Published {
            return Err(DomainError::Conflict(
                "published posts cannot be edited".to_string(),
            ));
        }

        let _pins = self.pins.lock().await;
        if let Some(at) = edit.scheduled_at {
            let settings = self.settings.get().await?;
            let policy = SchedulePolicy::from_settings(&settings);
            let day = policy.local_date(at);
            let taken = self
                .posts
                .list_pinned()
                .await?
                .iter()
                .any(|p| p.id != id && policy.local_date(p.scheduled_at) == day);
            if taken {
                return Err(DomainError::Validation(format!(
                    "{day} already has a pinned post"
                )));
            }
        }

        match self.posts.update_details(id, edit, self.clock.now()).await? {
            UpdateOutcome::Applied => self.get_post(id).await,
            UpdateOutcome::NotFound => Err(DomainError::post_not_found(id)),
            UpdateOutcome::Conflict => {
                tracing::warn!(post_id = %id, "Edit lost to a concurrent publish");
                Err(DomainError::Conflict(
                    "post is being published or was already published".to_string(),
                ))
            }
        }
    }

    /// Send a failed post back to `pending` so the next sweep picks it up.
    pub async fn retry_post(&self, id: Uuid) -> Result<Post, DomainError> {
        let outcome = self
            .posts
            .update_status(
                id,
                StatusGuard::from_status(&[PostStatus::Failed]),
                StatusTransition::Requeued { scheduled_at: None },
            )
            .await?;

        match outcome {
            UpdateOutcome::Applied => {
                tracing::info!(post_id = %id, "Failed post requeued");
                self.get_post(id).await
            }
            UpdateOutcome::NotFound => Err(DomainError::post_not_found(id)),
            UpdateOutcome::Conflict => Err(DomainError::Conflict(
                "only failed posts can be retried".to_string(),
            )),
        }
    }

    /// Delete a post, then try to remove its image. Asset cleanup failures are
    /// logged and never block the delete.
    pub async fn delete_post(&self, id: Uuid) -> Result<(), DomainError> {
        let post = self.get_post(id).await?;
        match self.posts.delete(id).await {
            Ok(()) => {}
            Err(RepoError::NotFound) => return Err(DomainError::post_not_found(id)),
            Err(e) => return Err(e.into()),
        }

        if let Err(e) = self.assets.delete(&post.image_url).await {
            tracing::warn!(
                post_id = %id,
                image_url = %post.image_url,
                error = %e,
                "Failed to delete post image"
            );
        }
        tracing::info!(post_id = %id, "Post deleted");
        Ok(())
    }

    pub async fn settings(&self) -> Result<Settings, DomainError> {
        Ok(self.settings.get().await?)
    }

    pub async fn update_settings(&self, patch: SettingsPatch) -> Result<Settings, DomainError> {
        let current = self.settings.get().await?;
        let updated = current.apply(&patch)?;
        let saved = self.settings.save(updated).await?;
        tracing::info!(
            frequency = %saved.post_frequency,
            preferred_time = %saved.preferred_time,
            timezone = %saved.timezone,
            "Settings updated"
        );
        Ok(saved)
    }
}
