use serde::{Deserialize, Serialize};

/// Authenticated user as returned by `GET /auth/me`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub username: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    /// `None` when the backend did not send subscription data (login/register
    /// responses), which is different from an empty list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscriptions: Option<Vec<TopicSummary>>,
}

/// Topic entry embedded in a user's subscription list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicSummary {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl User {
    pub fn new(id: u64, username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            email: email.into(),
            created_at: None,
            updated_at: None,
            subscriptions: None,
        }
    }

    pub fn with_subscriptions(mut self, subscriptions: Vec<TopicSummary>) -> Self {
        self.subscriptions = Some(subscriptions);
        self
    }

    /// Ids of subscribed topics, or `None` if subscriptions are unknown
    pub fn subscribed_topic_ids(&self) -> Option<Vec<u64>> {
        self.subscriptions
            .as_ref()
            .map(|subs| subs.iter().map(|topic| topic.id).collect())
    }

    pub fn is_subscribed_to(&self, topic_id: u64) -> Option<bool> {
        self.subscriptions
            .as_ref()
            .map(|subs| subs.iter().any(|topic| topic.id == topic_id))
    }
}

impl TopicSummary {
    pub fn new(id: u64, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Body of `POST /auth/login`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email_or_username: String,
    pub password: String,
}

/// Body of `POST /auth/register`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Response of login and register
///
/// Some backend versions only return the token; the user is then fetched
/// with a follow-up `GET /auth/me`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    #[serde(default)]
    pub user: Option<User>,
}

/// Body of `PUT /users/me`, absent fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl UpdateUserRequest {
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.email.is_none() && self.password.is_none()
    }
}
