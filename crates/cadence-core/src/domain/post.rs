use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Publish lifecycle of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Pending,
    Scheduled,
    Published,
    Failed,
}

impl PostStatus {
    /// Statuses a sweep may pick up once `scheduled_at` has passed.
    pub const DUE_ELIGIBLE: &'static [PostStatus] = &[PostStatus::Pending, PostStatus::Scheduled];

    /// Statuses whose caption and schedule may still change.
    pub const EDITABLE: &'static [PostStatus] =
        &[PostStatus::Pending, PostStatus::Scheduled, PostStatus::Failed];

    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Pending => "pending",
            PostStatus::Scheduled => "scheduled",
            PostStatus::Published => "published",
            PostStatus::Failed => "failed",
        }
    }

    pub fn is_due_eligible(&self) -> bool {
        Self::DUE_ELIGIBLE.contains(self)
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PostStatus::Pending),
            "scheduled" => Ok(PostStatus::Scheduled),
            "published" => Ok(PostStatus::Published),
            "failed" => Ok(PostStatus::Failed),
            other => Err(format!("unknown post status '{other}'")),
        }
    }
}

/// Post entity - an image scheduled for publication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub image_url: String,
    pub caption: String,
    pub scheduled_at: DateTime<Utc>,
    pub is_pinned: bool,
    pub status: PostStatus,
    pub published_at: Option<DateTime<Utc>>,
    pub platform_post_id: Option<String>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new scheduled post.
    pub fn new(
        image_url: String,
        caption: String,
        scheduled_at: DateTime<Utc>,
        is_pinned: bool,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            image_url,
            caption,
            scheduled_at,
            is_pinned,
            status: PostStatus::Scheduled,
            published_at: None,
            platform_post_id: None,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.status.is_due_eligible() && self.scheduled_at <= now
    }

    /// Apply a status transition, keeping the outcome fields consistent with
    /// the resulting status.
    pub fn apply(&mut self, transition: &StatusTransition, now: DateTime<Utc>) {
        self.status = transition.target_status();
        match transition {
            StatusTransition::Published {
                published_at,
                platform_post_id,
            } => {
                self.published_at = Some(*published_at);
                self.platform_post_id = Some(platform_post_id.clone());
                self.error_message = None;
            }
            StatusTransition::Failed { error_message } => {
                self.published_at = None;
                self.platform_post_id = None;
                self.error_message = Some(error_message.clone());
            }
            StatusTransition::Requeued { scheduled_at } => {
                self.published_at = None;
                self.platform_post_id = None;
                self.error_message = None;
                if let Some(at) = scheduled_at {
                    self.scheduled_at = *at;
                }
            }
        }
        self.updated_at = now;
    }

    /// Apply user edits. A new time pins the post. Status and outcome fields
    /// are left alone.
    pub fn edit(&mut self, edit: &PostEdit, now: DateTime<Utc>) {
        if let Some(caption) = &edit.caption {
            self.caption = caption.clone();
        }
        if let Some(at) = edit.scheduled_at {
            self.scheduled_at = at;
            self.is_pinned = true;
        }
        self.updated_at = now;
    }
}

/// User edits to a post's content and time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostEdit {
    pub caption: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
}

/// A terminal or retry status change, carrying the fields that go with it.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusTransition {
    Published {
        published_at: DateTime<Utc>,
        platform_post_id: String,
    },
    Failed {
        error_message: String,
    },
    /// Back to `pending`, optionally at a new time.
    Requeued {
        scheduled_at: Option<DateTime<Utc>>,
    },
}

impl StatusTransition {
    pub fn target_status(&self) -> PostStatus {
        match self {
            StatusTransition::Published { .. } => PostStatus::Published,
            StatusTransition::Failed { .. } => PostStatus::Failed,
            StatusTransition::Requeued { .. } => PostStatus::Pending,
        }
    }
}
