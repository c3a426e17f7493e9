//! Instagram Graph API client.
//!
//! Publishing an image takes two calls against the business account:
//! `POST /{account}/media` stages a container, `POST /{account}/media_publish`
//! makes it live. Both answer with `{"id": "..."}`.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use cadence_core::ports::{AccountInfo, ContainerHandle, PublishCapability, PublishError};
use cadence_core::services::DEFAULT_PLATFORM_TIMEOUT;

pub const DEFAULT_API_BASE: &str = "https://graph.facebook.com/v18.0";

/// Credentials and endpoint for one business account.
#[derive(Clone)]
pub struct InstagramConfig {
    pub api_base: String,
    pub account_id: String,
    pub access_token: String,
    pub timeout: Duration,
}

impl InstagramConfig {
    pub fn new(account_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            account_id: account_id.into(),
            access_token: access_token.into(),
            timeout: DEFAULT_PLATFORM_TIMEOUT,
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Read `INSTAGRAM_BUSINESS_ACCOUNT_ID`, `INSTAGRAM_ACCESS_TOKEN` and
    /// `INSTAGRAM_API_BASE`. `None` when either credential is missing.
    pub fn from_env() -> Option<Self> {
        let account_id = non_empty_env("INSTAGRAM_BUSINESS_ACCOUNT_ID")?;
        let access_token = non_empty_env("INSTAGRAM_ACCESS_TOKEN")?;
        let config = Self::new(account_id, access_token);
        Some(match non_empty_env("INSTAGRAM_API_BASE") {
            Some(base) => config.with_api_base(base),
            None => config,
        })
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl fmt::Debug for InstagramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstagramConfig")
            .field("api_base", &self.api_base)
            .field("account_id", &self.account_id)
            .field("access_token", &"[redacted]")
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Serialize)]
struct CreateContainerBody<'a> {
    image_url: &'a str,
    caption: &'a str,
    access_token: &'a str,
}

#[derive(Serialize)]
struct PublishBody<'a> {
    creation_id: &'a str,
    access_token: &'a str,
}

#[derive(Deserialize)]
struct IdResponse {
    id: String,
}

/// [`PublishCapability`] backed by the Graph API.
pub struct InstagramPublisher {
    client: reqwest::Client,
    config: InstagramConfig,
}

impl InstagramPublisher {
    pub fn new(config: InstagramConfig) -> Result<Self, PublishError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PublishError::Transport(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn endpoint(&self, edge: &str) -> String {
        format!("{}/{}/{}", self.config.api_base, self.config.account_id, edge)
    }

    /// Send a request and pull the `id` out of a successful answer. Non-2xx
    /// answers become `rejected(status: body)`.
    async fn call_for_id(
        &self,
        request: reqwest::RequestBuilder,
        rejected: fn(String) -> PublishError,
    ) -> Result<String, PublishError> {
        let response = request
            .send()
            .await
            .map_err(|e| PublishError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, body = %body, "Graph API rejected request");
            return Err(rejected(format!("{status}: {body}")));
        }

        let body: IdResponse = response
            .json()
            .await
            .map_err(|e| rejected(format!("unexpected response: {e}")))?;
        Ok(body.id)
    }
}

#[async_trait]
impl PublishCapability for InstagramPublisher {
    async fn create_container(
        &self,
        image_url: &str,
        caption: &str,
    ) -> Result<ContainerHandle, PublishError> {
        let request = self.client.post(self.endpoint("media")).json(&CreateContainerBody {
            image_url,
            caption,
            access_token: &self.config.access_token,
        });

        let id = self
            .call_for_id(request, PublishError::ContainerRejected)
            .await?;
        Ok(ContainerHandle(id))
    }

    async fn commit(&self, container: &ContainerHandle) -> Result<String, PublishError> {
        let request = self
            .client
            .post(self.endpoint("media_publish"))
            .json(&PublishBody {
                creation_id: container.as_str(),
                access_token: &self.config.access_token,
            });

        self.call_for_id(request, PublishError::CommitRejected).await
    }

    async fn account(&self) -> Result<AccountInfo, PublishError> {
        let url = format!("{}/{}", self.config.api_base, self.config.account_id);
        let response = self
            .client
            .get(url)
            .query(&[
                ("fields", "id,username,name"),
                ("access_token", self.config.access_token.as_str()),
            ])
            .send()
            .await
            .map_err(|e| PublishError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PublishError::Transport(format!(
                "account lookup failed with status {status}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| PublishError::Transport(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn publisher(server: &MockServer) -> InstagramPublisher {
        let config = InstagramConfig::new("1784", "token-1").with_api_base(server.uri());
        InstagramPublisher::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_create_container_posts_image_and_caption() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/1784/media"))
            .and(body_json(json!({
                "image_url": "https://cdn.example.com/a.jpg",
                "caption": "Sunrise",
                "access_token": "token-1",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "c-42"})))
            .expect(1)
            .mount(&server)
            .await;

        let handle = publisher(&server)
            .create_container("https://cdn.example.com/a.jpg", "Sunrise")
            .await
            .unwrap();

        assert_eq!(handle, ContainerHandle("c-42".to_string()));
    }

    #[tokio::test]
    async fn test_commit_returns_media_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/1784/media_publish"))
            .and(body_json(json!({"creation_id": "c-42", "access_token": "token-1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "m-7"})))
            .mount(&server)
            .await;

        let id = publisher(&server)
            .commit(&ContainerHandle("c-42".to_string()))
            .await
            .unwrap();

        assert_eq!(id, "m-7");
    }

    #[tokio::test]
    async fn test_rejection_carries_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/1784/media"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({"error": {"message": "Invalid image"}})),
            )
            .mount(&server)
            .await;

        let err = publisher(&server)
            .create_container("https://cdn.example.com/a.jpg", "")
            .await
            .unwrap_err();

        match err {
            PublishError::ContainerRejected(message) => {
                assert!(message.starts_with("400"));
                assert!(message.contains("Invalid image"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_commit_rejection_is_commit_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/1784/media_publish"))
            .respond_with(ResponseTemplate::new(500).set_body_string("down"))
            .mount(&server)
            .await;

        let err = publisher(&server)
            .commit(&ContainerHandle("c-1".to_string()))
            .await
            .unwrap_err();

        assert!(matches!(err, PublishError::CommitRejected(_)));
    }

    #[tokio::test]
    async fn test_account_lookup() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/1784"))
            .and(query_param("fields", "id,username,name"))
            .and(query_param("access_token", "token-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "1784",
                "username": "cadence.studio",
                "name": "Cadence Studio",
            })))
            .mount(&server)
            .await;

        let account = publisher(&server).account().await.unwrap();

        assert_eq!(account.id, "1784");
        assert_eq!(account.username.as_deref(), Some("cadence.studio"));
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = InstagramConfig::new("1784", "secret-token");
        let printed = format!("{config:?}");
        assert!(!printed.contains("secret-token"));
    }
}
