use crate::api::client::ApiClient;
use crate::core::error::{ValidationError, ViewError};
use crate::models::article::{ArticleDetail, Comment};
use std::sync::Arc;
use tracing::info;

/// Single article with its comment thread
pub struct ArticleDetailView {
    api: Arc<ApiClient>,
    detail: Option<ArticleDetail>,
}

impl ArticleDetailView {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api, detail: None }
    }

    pub async fn load(&mut self, article_id: u64) -> Result<&ArticleDetail, ViewError> {
        let detail = self.api.get_article(article_id).await?;
        info!(article_id, comments = detail.comments.len(), "Article loaded");
        Ok(&*self.detail.insert(detail))
    }

    pub fn detail(&self) -> Option<&ArticleDetail> {
        self.detail.as_ref()
    }

    pub fn comments(&self) -> &[Comment] {
        self.detail
            .as_ref()
            .map(|detail| detail.comments.as_slice())
            .unwrap_or_default()
    }

    /// Post a comment on the loaded article and append it to the thread
    pub async fn submit_comment(&mut self, text: &str) -> Result<&Comment, ViewError> {
        let content = text.trim();
        if content.is_empty() {
            return Err(ValidationError::Required("Comment").into());
        }

        let detail = self.detail.as_mut().ok_or(ViewError::NotLoaded)?;
        let article_id = detail.article.id;
        let comment = self.api.add_comment(article_id, content).await?;
        info!(article_id, comment_id = comment.id, "Comment added");

        detail.comments.push(comment);
        Ok(&detail.comments[detail.comments.len() - 1])
    }
}
