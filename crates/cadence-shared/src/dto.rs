//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One item of a batch create. Items with `scheduled_at` are pinned to that
/// instant; the rest are placed by the allocator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPostItem {
    pub image_url: String,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
}

/// Request to create a batch of posts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostsRequest {
    pub posts: Vec<NewPostItem>,
}

/// Partial update of a post. A new `scheduled_at` pins the post.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePostRequest {
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
}

/// A post as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: Uuid,
    pub image_url: String,
    pub caption: String,
    pub scheduled_at: DateTime<Utc>,
    pub is_pinned: bool,
    pub status: String,
    pub published_at: Option<DateTime<Utc>>,
    pub platform_post_id: Option<String>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Response to a batch create.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostsResponse {
    pub created: usize,
    pub posts: Vec<PostResponse>,
}

/// Current scheduling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsResponse {
    pub post_frequency: String,
    pub preferred_time: String,
    pub timezone: String,
}

/// Partial settings update; omitted fields keep their value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSettingsRequest {
    #[serde(default)]
    pub post_frequency: Option<String>,
    #[serde(default)]
    pub preferred_time: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
}

/// Upcoming auto-allocation slots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewResponse {
    pub slots: Vec<DateTime<Utc>>,
}

/// Outcome for one post in a publish sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepResultItem {
    pub id: Uuid,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform_post_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of a publish sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepResponse {
    pub processed_count: usize,
    pub results: Vec<SweepResultItem>,
}

/// Public URL of an uploaded image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub url: String,
}

/// Account the platform credentials point at.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountResponse {
    pub connected: bool,
    pub id: String,
    pub username: Option<String>,
    pub name: Option<String>,
}
