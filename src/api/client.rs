use crate::core::error::ApiError;
use crate::models::article::{Article, ArticleDetail, Comment, CreateArticleRequest, NewComment};
use crate::models::topic::{CreateTopicRequest, Topic};
use crate::models::user::{AuthResponse, LoginRequest, RegisterRequest, UpdateUserRequest, User};
use crate::stores::session_store::SessionStore;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// REST client for the forum Backend API
///
/// Reads the bearer token from the shared [`SessionStore`] on every request,
/// so a login or logout is picked up without rebuilding the client.
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    session: Arc<SessionStore>,
}

/// Error payload returned by the backend on 4xx
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        session: Arc<SessionStore>,
    ) -> Result<Self, ApiError> {
        let base_url = base_url.into();
        let trimmed = base_url.trim().trim_end_matches('/');
        if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
            return Err(ApiError::InvalidBaseUrl(base_url));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: trimmed.to_string(),
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attach the stored token, if any
    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.get_token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn check_status(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ApiError::Unauthorized {
                status: status.as_u16(),
            });
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(|body| body.message.or(body.error))
            .unwrap_or_else(|| {
                if text.trim().is_empty() {
                    status.canonical_reason().unwrap_or("error").to_string()
                } else {
                    text
                }
            });

        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = Self::check_status(request.send().await?).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn send_empty(&self, request: RequestBuilder) -> Result<(), ApiError> {
        Self::check_status(request.send().await?).await?;
        Ok(())
    }

    pub async fn login(&self, credentials: &LoginRequest) -> Result<AuthResponse, ApiError> {
        debug!(identifier = %credentials.email_or_username, "POST /auth/login");
        let request = self.client.post(self.url("/auth/login")).json(credentials);
        self.send_json(request).await
    }

    pub async fn register(&self, registration: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        debug!(username = %registration.username, "POST /auth/register");
        let request = self.client.post(self.url("/auth/register")).json(registration);
        self.send_json(request).await
    }

    /// Verify the stored token and fetch the user it belongs to
    pub async fn me(&self) -> Result<User, ApiError> {
        debug!("GET /auth/me");
        let request = self.authorized(self.client.get(self.url("/auth/me")));
        self.send_json(request).await
    }

    pub async fn update_me(&self, changes: &UpdateUserRequest) -> Result<User, ApiError> {
        debug!("PUT /users/me");
        let request = self.authorized(self.client.put(self.url("/users/me")).json(changes));
        self.send_json(request).await
    }

    pub async fn list_articles(&self) -> Result<Vec<Article>, ApiError> {
        debug!("GET /posts");
        let request = self.authorized(self.client.get(self.url("/posts")));
        self.send_json(request).await
    }

    pub async fn get_article(&self, id: u64) -> Result<ArticleDetail, ApiError> {
        debug!(article_id = id, "GET /posts/:id");
        let request = self.authorized(self.client.get(self.url(&format!("/posts/{}", id))));
        self.send_json(request).await
    }

    pub async fn create_article(&self, article: &CreateArticleRequest) -> Result<ArticleDetail, ApiError> {
        debug!(topic_id = article.topic_id, "POST /posts");
        let request = self.authorized(self.client.post(self.url("/posts")).json(article));
        self.send_json(request).await
    }

    pub async fn add_comment(&self, article_id: u64, content: &str) -> Result<Comment, ApiError> {
        debug!(article_id, "POST /posts/:id/comments");
        let body = NewComment {
            content: content.to_string(),
        };
        let request = self.authorized(
            self.client
                .post(self.url(&format!("/posts/{}/comments", article_id)))
                .json(&body),
        );
        self.send_json(request).await
    }

    pub async fn list_topics(&self) -> Result<Vec<Topic>, ApiError> {
        debug!("GET /topics");
        let request = self.authorized(self.client.get(self.url("/topics")));
        self.send_json(request).await
    }

    pub async fn create_topic(&self, topic: &CreateTopicRequest) -> Result<Topic, ApiError> {
        debug!(title = %topic.title, "POST /topics");
        let request = self.authorized(self.client.post(self.url("/topics")).json(topic));
        self.send_json(request).await
    }

    pub async fn subscribe(&self, topic_id: u64) -> Result<(), ApiError> {
        debug!(topic_id, "POST /users/me/subscriptions/:topicId");
        let request = self.authorized(
            self.client
                .post(self.url(&format!("/users/me/subscriptions/{}", topic_id))),
        );
        self.send_empty(request).await
    }

    pub async fn unsubscribe(&self, topic_id: u64) -> Result<(), ApiError> {
        debug!(topic_id, "DELETE /users/me/subscriptions/:topicId");
        let request = self.authorized(
            self.client
                .delete(self.url(&format!("/users/me/subscriptions/{}", topic_id))),
        );
        self.send_empty(request).await
    }
}
