use crate::api::client::ApiClient;
use crate::core::error::ViewError;
use crate::models::article::ArticleDetail;
use crate::models::topic::Topic;
use crate::validation::forms::ArticleForm;
use std::sync::Arc;
use tracing::info;

/// New-article form with its topic picker
pub struct CreateArticleView {
    api: Arc<ApiClient>,
    topics: Vec<Topic>,
}

impl CreateArticleView {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            topics: Vec::new(),
        }
    }

    pub async fn load_topics(&mut self) -> Result<&[Topic], ViewError> {
        self.topics = self.api.list_topics().await?;
        Ok(&self.topics)
    }

    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    pub async fn submit(&self, form: ArticleForm) -> Result<ArticleDetail, ViewError> {
        let request = form.validate()?;
        let created = self.api.create_article(&request).await?;
        info!(article_id = created.article.id, topic_id = request.topic_id, "Article created");
        Ok(created)
    }
}
