//! In-memory post repository - used when no database is configured.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use cadence_core::domain::{Post, PostEdit, PostStatus, StatusTransition};
use cadence_core::error::RepoError;
use cadence_core::ports::{
    BaseRepository, Claim, PostRepository, StatusGuard, UpdateOutcome,
};

struct Row {
    post: Post,
    claim: Option<Claim>,
}

/// Post storage backed by a HashMap behind an async RwLock.
///
/// Note: Data is lost on process restart.
pub struct InMemoryPostRepository {
    store: RwLock<HashMap<Uuid, Row>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
        }
    }

    async fn collect(&self, keep: impl Fn(&Post) -> bool) -> Vec<Post> {
        let store = self.store.read().await;
        let mut posts: Vec<Post> = store
            .values()
            .map(|row| &row.post)
            .filter(|post| keep(post))
            .cloned()
            .collect();
        posts.sort_by_key(|post| (post.scheduled_at, post.created_at));
        posts
    }
}

impl Default for InMemoryPostRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let store = self.store.read().await;
        Ok(store.get(&id).map(|row| row.post.clone()))
    }

    async fn save(&self, entity: Post) -> Result<Post, RepoError> {
        let mut store = self.store.write().await;
        match store.get_mut(&entity.id) {
            Some(row) => row.post = entity.clone(),
            None => {
                store.insert(
                    entity.id,
                    Row {
                        post: entity.clone(),
                        claim: None,
                    },
                );
            }
        }
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut store = self.store.write().await;
        store.remove(&id).map(|_| ()).ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn list(&self) -> Result<Vec<Post>, RepoError> {
        Ok(self.collect(|_| true).await)
    }

    async fn list_due(&self, now: DateTime<Utc>) -> Result<Vec<Post>, RepoError> {
        Ok(self.collect(|post| post.is_due(now)).await)
    }

    async fn list_pinned(&self) -> Result<Vec<Post>, RepoError> {
        Ok(self.collect(|post| post.is_pinned).await)
    }

    async fn insert_batch(&self, posts: Vec<Post>) -> Result<Vec<Post>, RepoError> {
        let mut store = self.store.write().await;
        if let Some(dup) = posts.iter().find(|post| store.contains_key(&post.id)) {
            return Err(RepoError::Constraint(format!("post {} already exists", dup.id)));
        }
        for post in &posts {
            store.insert(
                post.id,
                Row {
                    post: post.clone(),
                    claim: None,
                },
            );
        }
        Ok(posts)
    }

    async fn claim(&self, id: Uuid, claim: Claim, now: DateTime<Utc>) -> Result<bool, RepoError> {
        let mut store = self.store.write().await;
        let Some(row) = store.get_mut(&id) else {
            return Ok(false);
        };

        let free = row.claim.is_none_or(|held| held.expires_at < now);
        if !row.post.status.is_due_eligible() || !free {
            return Ok(false);
        }

        row.claim = Some(claim);
        Ok(true)
    }

    async fn update_status(
        &self,
        id: Uuid,
        guard: StatusGuard,
        transition: StatusTransition,
    ) -> Result<UpdateOutcome, RepoError> {
        let mut store = self.store.write().await;
        let Some(row) = store.get_mut(&id) else {
            return Ok(UpdateOutcome::NotFound);
        };

        let held = row.claim.map(|claim| claim.token);
        if !guard.admits(row.post.status, held) {
            return Ok(UpdateOutcome::Conflict);
        }

        row.post.apply(&transition, Utc::now());
        row.claim = None;
        Ok(UpdateOutcome::Applied)
    }

    async fn update_details(
        &self,
        id: Uuid,
        edit: PostEdit,
        now: DateTime<Utc>,
    ) -> Result<UpdateOutcome, RepoError> {
        let mut store = self.store.write().await;
        let Some(row) = store.get_mut(&id) else {
            return Ok(UpdateOutcome::NotFound);
        };

        let claimed = row.claim.is_some_and(|held| held.expires_at >= now);
        if claimed || !PostStatus::EDITABLE.contains(&row.post.status) {
            return Ok(UpdateOutcome::Conflict);
        }

        row.post.edit(&edit, now);
        Ok(UpdateOutcome::Applied)
    }
}
