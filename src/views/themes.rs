use crate::core::error::{ValidationError, ViewError};
use crate::models::topic::{CreateTopicRequest, Topic};
use crate::services::auth::AuthService;
use std::sync::Arc;
use tracing::info;

/// Topic list with per-topic subscribe toggles
pub struct ThemesView {
    auth: Arc<AuthService>,
    topics: Vec<Topic>,
}

impl ThemesView {
    pub fn new(auth: Arc<AuthService>) -> Self {
        Self {
            auth,
            topics: Vec::new(),
        }
    }

    pub async fn load(&mut self) -> Result<&[Topic], ViewError> {
        self.topics = self.auth.api().list_topics().await?;
        info!(count = self.topics.len(), "Topics loaded");
        Ok(&self.topics)
    }

    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    /// The session snapshot wins; the topic's own flag is used only while
    /// the user's subscriptions are unknown
    pub fn is_subscribed(&self, topic: &Topic) -> bool {
        self.auth
            .session()
            .current_user()
            .and_then(|user| user.is_subscribed_to(topic.id))
            .or(topic.subscribed)
            .unwrap_or(false)
    }

    /// Flip the subscription for `topic_id`, returning the new state
    pub async fn toggle(&mut self, topic_id: u64) -> Result<bool, ViewError> {
        if !self.auth.session().is_authenticated() {
            return Err(ViewError::NotAuthenticated);
        }

        let subscribed = match self.topics.iter().find(|topic| topic.id == topic_id) {
            Some(topic) => self.is_subscribed(topic),
            None => self
                .auth
                .session()
                .current_user()
                .and_then(|user| user.is_subscribed_to(topic_id))
                .unwrap_or(false),
        };

        if subscribed {
            self.auth.unsubscribe(topic_id).await?;
        } else {
            self.auth.subscribe(topic_id).await?;
        }

        let now_subscribed = !subscribed;
        if let Some(topic) = self.topics.iter_mut().find(|topic| topic.id == topic_id) {
            topic.subscribed = Some(now_subscribed);
        }
        Ok(now_subscribed)
    }

    pub async fn create_topic(&mut self, title: &str, description: &str) -> Result<&Topic, ViewError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ValidationError::Required("Title").into());
        }

        let request = CreateTopicRequest {
            title: title.to_string(),
            description: description.trim().to_string(),
        };
        let topic = self.auth.api().create_topic(&request).await?;
        info!(topic_id = topic.id, title = %topic.title, "Topic created");

        self.topics.push(topic);
        Ok(&self.topics[self.topics.len() - 1])
    }
}
