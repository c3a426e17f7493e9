//! Publish state machine - drives due posts to `published` or `failed`.
//!
//! A sweep lists due posts once, then handles them one at a time:
//!
//! 1. claim the row so overlapping sweeps leave it alone,
//! 2. stage the image with the platform,
//! 3. wait for the platform to settle the container,
//! 4. commit, then write the terminal status guarded by the claim.
//!
//! Anything that goes wrong for one post is recorded against that post and the
//! sweep moves on. Only failing to list due posts aborts the sweep.

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::domain::{Post, PostStatus, StatusTransition};
use crate::error::DomainError;
use crate::ports::{
    Claim, Clock, ContainerHandle, Delay, PostRepository, PublishCapability, PublishError,
    StatusGuard, UpdateOutcome,
};

/// Shortest wait the platform accepts between container creation and commit.
pub const MIN_SETTLE_DELAY: Duration = Duration::from_secs(2);

/// Assumed per-request timeout of the platform client when none is given.
pub const DEFAULT_PLATFORM_TIMEOUT: Duration = Duration::from_secs(30);

/// Publisher tuning.
#[derive(Debug, Clone)]
pub struct PublisherConfig {
    /// Wait between the two phases. Values below [`MIN_SETTLE_DELAY`] are raised.
    pub settle_delay: Duration,
    /// How long a claim shields a post from other sweeps. Values below
    /// [`PublisherConfig::min_claim_ttl`] are raised.
    pub claim_ttl: Duration,
    /// Upper bound on one platform call.
    pub platform_timeout: Duration,
}

impl PublisherConfig {
    /// A claim must outlive the settle wait plus both platform calls.
    pub fn min_claim_ttl(&self) -> Duration {
        self.settle_delay.max(MIN_SETTLE_DELAY) + self.platform_timeout * 2
    }
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            settle_delay: MIN_SETTLE_DELAY,
            claim_ttl: Duration::from_secs(300),
            platform_timeout: DEFAULT_PLATFORM_TIMEOUT,
        }
    }
}

/// Outcome for one post touched by a sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct PostPublishResult {
    pub id: Uuid,
    pub status: PostStatus,
    pub platform_post_id: Option<String>,
    pub error: Option<String>,
}

/// Summary of a sweep.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweepReport {
    pub processed_count: usize,
    pub results: Vec<PostPublishResult>,
}

impl SweepReport {
    pub fn published(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.status == PostStatus::Published && r.error.is_none())
            .count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.published()
    }
}

/// The platform's two-phase protocol with its settle wait as an explicit step.
pub struct TwoPhasePublish<'a> {
    platform: &'a dyn PublishCapability,
    delay: &'a dyn Delay,
    settle_delay: Duration,
}

impl<'a> TwoPhasePublish<'a> {
    pub fn new(platform: &'a dyn PublishCapability, delay: &'a dyn Delay, settle_delay: Duration) -> Self {
        Self {
            platform,
            delay,
            settle_delay: settle_delay.max(MIN_SETTLE_DELAY),
        }
    }

    pub async fn stage(&self, post: &Post) -> Result<ContainerHandle, PublishError> {
        self.platform
            .create_container(&post.image_url, &post.caption)
            .await
    }

    pub async fn settle(&self) {
        self.delay.wait(self.settle_delay).await;
    }

    pub async fn commit(&self, container: &ContainerHandle) -> Result<String, PublishError> {
        self.platform.commit(container).await
    }

    /// Run all three steps, returning the platform's post id.
    pub async fn run(&self, post: &Post) -> Result<String, PublishError> {
        let container = self.stage(post).await?;
        tracing::debug!(post_id = %post.id, container = %container.as_str(), "Media container created");
        self.settle().await;
        self.commit(&container).await
    }
}

/// Publishes due posts.
pub struct Publisher {
    posts: Arc<dyn PostRepository>,
    platform: Arc<dyn PublishCapability>,
    delay: Arc<dyn Delay>,
    clock: Arc<dyn Clock>,
    config: PublisherConfig,
}

impl Publisher {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        platform: Arc<dyn PublishCapability>,
        delay: Arc<dyn Delay>,
        clock: Arc<dyn Clock>,
        mut config: PublisherConfig,
    ) -> Self {
        let floor = config.min_claim_ttl();
        if config.claim_ttl < floor {
            tracing::warn!(
                configured_secs = config.claim_ttl.as_secs(),
                floor_secs = floor.as_secs(),
                "Claim TTL shorter than one publish, raising it"
            );
            config.claim_ttl = floor;
        }
        Self {
            posts,
            platform,
            delay,
            clock,
            config,
        }
    }

    /// Publish every due post, earliest first.
    pub async fn sweep(&self) -> Result<SweepReport, DomainError> {
        let started = self.clock.now();
        let due = self.posts.list_due(started).await.map_err(|e| {
            tracing::error!(error = %e, "Publish sweep could not list due posts");
            DomainError::from(e)
        })?;

        if due.is_empty() {
            tracing::debug!("Publish sweep found no due posts");
            return Ok(SweepReport::default());
        }
        tracing::info!(due = due.len(), "Publish sweep started");

        let mut results = Vec::with_capacity(due.len());
        for post in &due {
            if let Some(result) = self.publish_one(post).await {
                results.push(result);
            }
        }

        let report = SweepReport {
            processed_count: results.len(),
            results,
        };
        tracing::info!(
            processed = report.processed_count,
            published = report.published(),
            failed = report.failed(),
            "Publish sweep finished"
        );
        Ok(report)
    }

    /// Handle one post. `None` means another sweep holds it.
    async fn publish_one(&self, post: &Post) -> Option<PostPublishResult> {
        let now = self.clock.now();
        let claim = Claim {
            token: Uuid::new_v4(),
            expires_at: now
                + chrono::Duration::from_std(self.config.claim_ttl)
                    .unwrap_or_else(|_| chrono::Duration::minutes(5)),
        };

        match self.posts.claim(post.id, claim, now).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::debug!(post_id = %post.id, "Post claimed by another sweep, skipping");
                return None;
            }
            Err(e) => {
                tracing::error!(post_id = %post.id, error = %e, "Failed to claim post");
                return Some(PostPublishResult {
                    id: post.id,
                    status: post.status,
                    platform_post_id: None,
                    error: Some(e.to_string()),
                });
            }
        }

        let procedure = TwoPhasePublish::new(
            self.platform.as_ref(),
            self.delay.as_ref(),
            self.config.settle_delay,
        );
        let transition = match procedure.run(post).await {
            Ok(platform_post_id) => StatusTransition::Published {
                published_at: self.clock.now(),
                platform_post_id,
            },
            Err(e) => {
                tracing::warn!(post_id = %post.id, error = %e, "Publish failed");
                StatusTransition::Failed {
                    error_message: e.to_string(),
                }
            }
        };

        let mut result = PostPublishResult {
            id: post.id,
            status: transition.target_status(),
            platform_post_id: match &transition {
                StatusTransition::Published {
                    platform_post_id, ..
                } => Some(platform_post_id.clone()),
                _ => None,
            },
            error: match &transition {
                StatusTransition::Failed { error_message } => Some(error_message.clone()),
                _ => None,
            },
        };

        match self
            .posts
            .update_status(post.id, StatusGuard::claimed(claim.token), transition)
            .await
        {
            Ok(UpdateOutcome::Applied) => {
                if result.status == PostStatus::Published {
                    tracing::info!(
                        post_id = %post.id,
                        platform_post_id = ?result.platform_post_id,
                        "Post published"
                    );
                }
            }
            Ok(UpdateOutcome::NotFound) => {
                tracing::warn!(post_id = %post.id, "Post deleted while publishing");
                if result.error.is_none() {
                    result.error = Some("post was deleted while publishing".to_string());
                }
            }
            Ok(UpdateOutcome::Conflict) => {
                tracing::warn!(post_id = %post.id, "Post changed while publishing");
                if result.error.is_none() {
                    result.error = Some("post changed while publishing".to_string());
                }
            }
            Err(e) => {
                tracing::error!(post_id = %post.id, error = %e, "Failed to record publish outcome");
                result.status = post.status;
                result.error = Some(e.to_string());
            }
        }

        Some(result)
    }
}
