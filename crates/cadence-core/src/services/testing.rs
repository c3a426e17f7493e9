//! Test doubles for the service tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use crate::domain::{Post, PostEdit, PostStatus, Settings, StatusTransition};
use crate::error::RepoError;
use crate::ports::{
    AssetError, AssetStore, BaseRepository, Claim, Clock, ContainerHandle, Delay, PostRepository,
    PublishCapability, PublishError, SettingsRepository, StatusGuard, UpdateOutcome,
};

pub fn ny(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    chrono_tz::America::New_York
        .with_ymd_and_hms(y, m, d, h, min, 0)
        .unwrap()
        .with_timezone(&Utc)
}

pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[derive(Default)]
pub struct RecordingDelay {
    waits: Mutex<Vec<Duration>>,
}

impl RecordingDelay {
    pub fn waits(&self) -> Vec<Duration> {
        self.waits.lock().unwrap().clone()
    }
}

#[async_trait]
impl Delay for RecordingDelay {
    async fn wait(&self, duration: Duration) {
        self.waits.lock().unwrap().push(duration);
    }
}

#[derive(Default)]
pub struct FakePosts {
    rows: Mutex<HashMap<Uuid, (Post, Option<Claim>)>>,
    fail_listing: AtomicBool,
    publish_before_edit: Mutex<Option<String>>,
}

impl FakePosts {
    pub fn all(&self) -> Vec<Post> {
        let mut posts: Vec<Post> = self.rows.lock().unwrap().values().map(|(p, _)| p.clone()).collect();
        posts.sort_by_key(|p| (p.scheduled_at, p.id));
        posts
    }

    pub fn due(&self, now: DateTime<Utc>) -> Vec<Post> {
        self.all().into_iter().filter(|p| p.is_due(now)).collect()
    }

    pub fn force_status(&self, id: Uuid, transition: StatusTransition) {
        let mut rows = self.rows.lock().unwrap();
        let (post, _) = rows.get_mut(&id).unwrap();
        let at = post.updated_at;
        post.apply(&transition, at);
    }

    pub fn fail_listing(&self) {
        self.fail_listing.store(true, Ordering::SeqCst);
    }

    /// Have a sweep claim and publish the post right before the next edit
    /// is written, as if it finished between the edit's read and write.
    pub fn publish_before_next_edit(&self, platform_post_id: &str) {
        *self.publish_before_edit.lock().unwrap() = Some(platform_post_id.to_string());
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for FakePosts {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.rows.lock().unwrap().get(&id).map(|(p, _)| p.clone()))
    }

    async fn save(&self, entity: Post) -> Result<Post, RepoError> {
        let mut rows = self.rows.lock().unwrap();
        let claim = rows.get(&entity.id).and_then(|(_, c)| *c);
        rows.insert(entity.id, (entity.clone(), claim));
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        match self.rows.lock().unwrap().remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepoError::NotFound),
        }
    }
}

#[async_trait]
impl PostRepository for FakePosts {
    async fn list(&self) -> Result<Vec<Post>, RepoError> {
        Ok(self.all())
    }

    async fn list_due(&self, now: DateTime<Utc>) -> Result<Vec<Post>, RepoError> {
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(RepoError::Connection("store offline".into()));
        }
        Ok(self.due(now))
    }

    async fn list_pinned(&self) -> Result<Vec<Post>, RepoError> {
        // Let concurrent callers interleave between this read and their write.
        tokio::task::yield_now().await;
        Ok(self.all().into_iter().filter(|p| p.is_pinned).collect())
    }

    async fn insert_batch(&self, posts: Vec<Post>) -> Result<Vec<Post>, RepoError> {
        let mut rows = self.rows.lock().unwrap();
        for post in &posts {
            rows.insert(post.id, (post.clone(), None));
        }
        Ok(posts)
    }

    async fn claim(&self, id: Uuid, claim: Claim, now: DateTime<Utc>) -> Result<bool, RepoError> {
        let mut rows = self.rows.lock().unwrap();
        let Some((post, held)) = rows.get_mut(&id) else {
            return Ok(false);
        };
        let free = held.is_none_or(|c| c.expires_at < now);
        if post.status.is_due_eligible() && free {
            *held = Some(claim);
            return Ok(true);
        }
        Ok(false)
    }

    async fn update_status(
        &self,
        id: Uuid,
        guard: StatusGuard,
        transition: StatusTransition,
    ) -> Result<UpdateOutcome, RepoError> {
        let mut rows = self.rows.lock().unwrap();
        let Some((post, held)) = rows.get_mut(&id) else {
            return Ok(UpdateOutcome::NotFound);
        };
        if !guard.admits(post.status, held.map(|c| c.token)) {
            return Ok(UpdateOutcome::Conflict);
        }
        let at = post.updated_at;
        post.apply(&transition, at);
        *held = None;
        Ok(UpdateOutcome::Applied)
    }

    async fn update_details(
        &self,
        id: Uuid,
        edit: PostEdit,
        now: DateTime<Utc>,
    ) -> Result<UpdateOutcome, RepoError> {
        let racing_publish = self.publish_before_edit.lock().unwrap().take();
        if let Some(platform_post_id) = racing_publish {
            let claim = Claim {
                token: Uuid::new_v4(),
                expires_at: now + chrono::Duration::minutes(5),
            };
            if self.claim(id, claim, now).await? {
                self.update_status(
                    id,
                    StatusGuard::claimed(claim.token),
                    StatusTransition::Published {
                        published_at: now,
                        platform_post_id,
                    },
                )
                .await?;
            }
        }

        let mut rows = self.rows.lock().unwrap();
        let Some((post, held)) = rows.get_mut(&id) else {
            return Ok(UpdateOutcome::NotFound);
        };
        let claimed = held.is_some_and(|c| c.expires_at >= now);
        if claimed || !PostStatus::EDITABLE.contains(&post.status) {
            return Ok(UpdateOutcome::Conflict);
        }
        post.edit(&edit, now);
        Ok(UpdateOutcome::Applied)
    }
}

#[derive(Default)]
pub struct FakeSettings {
    current: Mutex<Option<Settings>>,
}

#[async_trait]
impl SettingsRepository for FakeSettings {
    async fn get(&self) -> Result<Settings, RepoError> {
        Ok(self
            .current
            .lock()
            .unwrap()
            .get_or_insert_with(Settings::default)
            .clone())
    }

    async fn save(&self, settings: Settings) -> Result<Settings, RepoError> {
        *self.current.lock().unwrap() = Some(settings.clone());
        Ok(settings)
    }
}

#[derive(Default)]
pub struct FakeAssets {
    fail: AtomicBool,
    deleted: Mutex<Vec<String>>,
}

impl FakeAssets {
    pub fn fail_deletes(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl AssetStore for FakeAssets {
    async fn upload(&self, _bytes: Vec<u8>, filename: &str, _content_type: &str) -> Result<String, AssetError> {
        Ok(format!("https://cdn/{filename}"))
    }

    async fn delete(&self, url: &str) -> Result<(), AssetError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AssetError::Backend("bucket unavailable".into()));
        }
        self.deleted.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

/// Platform double that fails for posts whose caption matches.
#[derive(Default)]
pub struct FakePlatform {
    fail_container: Option<String>,
    fail_commit: Option<String>,
    containers: AtomicUsize,
    commits: AtomicUsize,
}

impl FakePlatform {
    pub fn failing_container_for(caption: &str) -> Self {
        Self {
            fail_container: Some(caption.to_string()),
            ..Default::default()
        }
    }

    pub fn failing_commit_for(caption: &str) -> Self {
        Self {
            fail_commit: Some(caption.to_string()),
            ..Default::default()
        }
    }

    pub fn containers(&self) -> usize {
        self.containers.load(Ordering::SeqCst)
    }

    pub fn commits(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PublishCapability for FakePlatform {
    async fn create_container(&self, _image_url: &str, caption: &str) -> Result<ContainerHandle, PublishError> {
        let n = self.containers.fetch_add(1, Ordering::SeqCst);
        if self.fail_container.as_deref() == Some(caption) {
            return Err(PublishError::ContainerRejected("unsupported image".into()));
        }
        Ok(ContainerHandle(format!("{caption}:{n}")))
    }

    async fn commit(&self, container: &ContainerHandle) -> Result<String, PublishError> {
        let n = self.commits.fetch_add(1, Ordering::SeqCst);
        let caption = container.as_str().split(':').next().unwrap_or_default();
        if self.fail_commit.as_deref() == Some(caption) {
            return Err(PublishError::CommitRejected("media not ready".into()));
        }
        Ok(format!("ig-{n}"))
    }
}
