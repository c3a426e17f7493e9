use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use actix_web::{App, http::StatusCode, http::header, test, web};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Value, json};

use cadence_core::ports::{
    AccountInfo, ContainerHandle, Delay, PublishCapability, PublishError, SystemClock,
};
use cadence_core::services::PublisherConfig;
use cadence_infra::assets::MEMORY_ASSET_BASE;
use cadence_infra::{InMemoryAssetStore, InMemoryPostRepository, InMemorySettingsRepository};

use super::configure_routes;
use crate::state::{AppState, Components, StoreKind};

struct NoDelay;

#[async_trait]
impl Delay for NoDelay {
    async fn wait(&self, _duration: Duration) {}
}

/// Platform that publishes everything unless told to reject commits.
#[derive(Default)]
struct StubPlatform {
    reject_commits: bool,
    next_id: AtomicUsize,
}

#[async_trait]
impl PublishCapability for StubPlatform {
    async fn create_container(
        &self,
        _image_url: &str,
        _caption: &str,
    ) -> Result<ContainerHandle, PublishError> {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        Ok(ContainerHandle(format!("container-{n}")))
    }

    async fn commit(&self, container: &ContainerHandle) -> Result<String, PublishError> {
        if self.reject_commits {
            return Err(PublishError::CommitRejected("media not ready".to_string()));
        }
        Ok(format!("media-{}", container.as_str()))
    }

    async fn account(&self) -> Result<AccountInfo, PublishError> {
        Ok(AccountInfo {
            id: "1784".to_string(),
            username: Some("cadence.studio".to_string()),
            name: None,
        })
    }
}

fn state_with(platform: StubPlatform, cron_secret: Option<&str>) -> AppState {
    AppState::from_components(
        Components {
            posts: Arc::new(InMemoryPostRepository::new()),
            settings: Arc::new(InMemorySettingsRepository::new()),
            assets: Arc::new(InMemoryAssetStore::new()),
            platform: Arc::new(platform),
            delay: Arc::new(NoDelay),
            clock: Arc::new(SystemClock),
        },
        PublisherConfig::default(),
        cron_secret.map(str::to_string),
        StoreKind::Memory,
    )
}

fn state() -> AppState {
    state_with(StubPlatform::default(), None)
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .configure(configure_routes),
        )
        .await
    };
}

fn past_pin() -> Value {
    json!({
        "image_url": "https://cdn.example.com/due.jpg",
        "caption": "Due now",
        "scheduled_at": (Utc::now() - chrono::Duration::hours(1)).to_rfc3339(),
    })
}

#[actix_rt::test]
async fn test_health() {
    let app = app!(state());
    let req = test::TestRequest::get().uri("/api/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "ok");
    assert_eq!(body["store"], "memory");
}

#[actix_rt::test]
async fn test_create_batch_allocates_increasing_slots() {
    let app = app!(state());
    let req = test::TestRequest::post()
        .uri("/api/posts")
        .set_json(json!({"posts": [
            {"image_url": "https://cdn.example.com/1.jpg", "caption": "one"},
            {"image_url": "https://cdn.example.com/2.jpg"},
        ]}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["created"], 2);
    let first: DateTime<Utc> = serde_json::from_value(body["posts"][0]["scheduled_at"].clone()).unwrap();
    let second: DateTime<Utc> = serde_json::from_value(body["posts"][1]["scheduled_at"].clone()).unwrap();
    assert!(first > Utc::now());
    assert!(second > first);
    assert_eq!(body["posts"][0]["status"], "scheduled");
    assert_eq!(body["posts"][1]["caption"], "");

    let req = test::TestRequest::get().uri("/api/posts").to_request();
    let listed: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listed.as_array().map(Vec::len), Some(2));
}

#[actix_rt::test]
async fn test_invalid_batch_is_problem_document() {
    let app = app!(state());
    let req = test::TestRequest::post()
        .uri("/api/posts")
        .set_json(json!({"posts": []}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], 400);
    assert_eq!(body["title"], "Bad Request");
}

#[actix_rt::test]
async fn test_settings_round_trip_and_validation() {
    let app = app!(state());

    let req = test::TestRequest::get().uri("/api/settings").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["post_frequency"], "daily");
    assert_eq!(body["preferred_time"], "14:00");
    assert_eq!(body["timezone"], "America/New_York");

    let req = test::TestRequest::patch()
        .uri("/api/settings")
        .set_json(json!({"post_frequency": "hourly"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::patch()
        .uri("/api/settings")
        .set_json(json!({"post_frequency": "3x-week", "timezone": "Europe/London"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["post_frequency"], "3x-week");
    assert_eq!(body["preferred_time"], "14:00");
    assert_eq!(body["timezone"], "Europe/London");
}

#[actix_rt::test]
async fn test_preview() {
    let app = app!(state());

    let req = test::TestRequest::get()
        .uri("/api/schedule/preview?count=3")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["slots"].as_array().map(Vec::len), Some(3));

    let req = test::TestRequest::get()
        .uri("/api/schedule/preview?count=1000")
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_sweep_publishes_due_posts_once() {
    let app = app!(state());
    let req = test::TestRequest::post()
        .uri("/api/posts")
        .set_json(json!({"posts": [past_pin()]}))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let id = created["posts"][0]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::post().uri("/api/publish").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["processed_count"], 1);
    assert_eq!(body["results"][0]["status"], "published");
    assert_eq!(body["results"][0]["platform_post_id"], "media-container-0");

    let req = test::TestRequest::get().uri("/api/cron/publish").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["processed_count"], 0);

    let req = test::TestRequest::get()
        .uri(&format!("/api/posts/{id}"))
        .to_request();
    let post: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(post["status"], "published");
    assert!(post["published_at"].is_string());
}

#[actix_rt::test]
async fn test_sweep_requires_cron_secret_when_configured() {
    let app = app!(state_with(StubPlatform::default(), Some("s3cret")));

    let req = test::TestRequest::get().uri("/api/cron/publish").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/api/cron/publish")
        .insert_header((header::AUTHORIZATION, "Bearer wrong"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/api/cron/publish")
        .insert_header((header::AUTHORIZATION, "Bearer s3cret"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn test_failed_post_can_be_retried() {
    let platform = StubPlatform {
        reject_commits: true,
        ..Default::default()
    };
    let app = app!(state_with(platform, None));
    let req = test::TestRequest::post()
        .uri("/api/posts")
        .set_json(json!({"posts": [past_pin()]}))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let id = created["posts"][0]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri(&format!("/api/posts/{id}/retry"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::post().uri("/api/publish").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["results"][0]["status"], "failed");
    assert!(body["results"][0]["error"].as_str().unwrap().contains("media not ready"));

    let req = test::TestRequest::post()
        .uri(&format!("/api/posts/{id}/retry"))
        .to_request();
    let post: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(post["status"], "pending");
    assert!(post["error_message"].is_null());
}

#[actix_rt::test]
async fn test_edit_and_delete() {
    let app = app!(state());
    let req = test::TestRequest::post()
        .uri("/api/posts")
        .set_json(json!({"posts": [{"image_url": "https://cdn.example.com/1.jpg"}]}))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let id = created["posts"][0]["id"].as_str().unwrap().to_string();
    assert_eq!(created["posts"][0]["is_pinned"], false);

    let pinned_at = (Utc::now() + chrono::Duration::days(20)).to_rfc3339();
    let req = test::TestRequest::patch()
        .uri(&format!("/api/posts/{id}"))
        .set_json(json!({"caption": "Edited", "scheduled_at": pinned_at}))
        .to_request();
    let post: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(post["caption"], "Edited");
    assert_eq!(post["is_pinned"], true);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/posts/{id}"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["success"], true);

    let req = test::TestRequest::get()
        .uri(&format!("/api/posts/{id}"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_upload_then_serve() {
    let app = app!(state());
    let req = test::TestRequest::post()
        .uri("/api/upload?filename=sunrise.png")
        .insert_header((header::CONTENT_TYPE, "image/png"))
        .set_payload(vec![0x89, b'P', b'N', b'G'])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    let url = body["url"].as_str().unwrap().to_string();
    assert!(url.ends_with(".png"));

    let key = url.trim_start_matches(MEMORY_ASSET_BASE);
    let req = test::TestRequest::get()
        .uri(&format!("/uploads{key}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = test::read_body(resp).await;
    assert_eq!(bytes.as_ref(), &[0x89, b'P', b'N', b'G']);
}

#[actix_rt::test]
async fn test_upload_rejects_non_images() {
    let app = app!(state());
    let req = test::TestRequest::post()
        .uri("/api/upload?filename=notes.txt")
        .insert_header((header::CONTENT_TYPE, "text/plain"))
        .set_payload("hello")
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_platform_account() {
    let app = app!(state());
    let req = test::TestRequest::get()
        .uri("/api/platform/account")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["connected"], true);
    assert_eq!(body["username"], "cadence.studio");
}
