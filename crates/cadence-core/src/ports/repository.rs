use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Post, PostEdit, PostStatus, Settings, StatusTransition};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Save an entity (create or update).
    async fn save(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// A sweep's exclusive hold on a post while it talks to the platform.
///
/// Claims live beside the status column and never change it, so readers keep
/// seeing `pending`/`scheduled` until the terminal write lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Claim {
    pub token: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// Preconditions for a conditional status write.
#[derive(Debug, Clone, Copy)]
pub struct StatusGuard {
    /// The row must currently be in one of these statuses.
    pub from: &'static [PostStatus],
    /// When set, the row must still hold this claim token.
    pub claim_token: Option<Uuid>,
}

impl StatusGuard {
    /// Terminal write for a post claimed by a sweep.
    pub fn claimed(token: Uuid) -> Self {
        Self {
            from: PostStatus::DUE_ELIGIBLE,
            claim_token: Some(token),
        }
    }

    pub fn from_status(from: &'static [PostStatus]) -> Self {
        Self {
            from,
            claim_token: None,
        }
    }

    pub fn admits(&self, status: PostStatus, held_token: Option<Uuid>) -> bool {
        self.from.contains(&status)
            && match self.claim_token {
                Some(token) => held_token == Some(token),
                None => true,
            }
    }
}

/// Result of a conditional write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Applied,
    NotFound,
    /// The row exists but no longer satisfies the guard.
    Conflict,
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// All posts, earliest `scheduled_at` first.
    async fn list(&self) -> Result<Vec<Post>, RepoError>;

    /// Due-eligible posts with `scheduled_at <= now`, earliest first.
    async fn list_due(&self, now: DateTime<Utc>) -> Result<Vec<Post>, RepoError>;

    /// Every pinned post, whatever its status.
    async fn list_pinned(&self) -> Result<Vec<Post>, RepoError>;

    /// Insert a batch of new posts in one write.
    async fn insert_batch(&self, posts: Vec<Post>) -> Result<Vec<Post>, RepoError>;

    /// Take the claim on a due-eligible post. Succeeds when the row is
    /// unclaimed or its previous claim expired before `now`.
    async fn claim(&self, id: Uuid, claim: Claim, now: DateTime<Utc>) -> Result<bool, RepoError>;

    /// Apply a status transition if `guard` still holds. Clears any claim.
    async fn update_status(
        &self,
        id: Uuid,
        guard: StatusGuard,
        transition: StatusTransition,
    ) -> Result<UpdateOutcome, RepoError>;

    /// Apply user edits if the post is still [`PostStatus::EDITABLE`] and no
    /// sweep holds a live claim on it. Touches only caption, schedule, pin
    /// and `updated_at`.
    async fn update_details(
        &self,
        id: Uuid,
        edit: PostEdit,
        now: DateTime<Utc>,
    ) -> Result<UpdateOutcome, RepoError>;
}

/// Settings singleton storage.
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Current settings, created with defaults on first access.
    async fn get(&self) -> Result<Settings, RepoError>;

    /// Replace the stored settings.
    async fn save(&self, settings: Settings) -> Result<Settings, RepoError>;
}
