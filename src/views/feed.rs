use crate::api::client::ApiClient;
use crate::core::error::ViewError;
use crate::models::article::Article;
use crate::models::user::User;
use crate::stores::session_store::SessionStore;
use crate::views::task::ViewTask;
use futures_util::StreamExt;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Newest first
    #[default]
    Date,
    Title,
    Author,
}

impl SortOrder {
    fn compare(self, a: &Article, b: &Article) -> Ordering {
        match self {
            SortOrder::Date => b.created_at.cmp(&a.created_at),
            SortOrder::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            SortOrder::Author => a
                .author_name
                .to_lowercase()
                .cmp(&b.author_name.to_lowercase()),
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "date" => Ok(SortOrder::Date),
            "title" => Ok(SortOrder::Title),
            "author" => Ok(SortOrder::Author),
            other => Err(format!("Unknown sort order '{}', expected date, title or author", other)),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SortOrder::Date => "date",
            SortOrder::Title => "title",
            SortOrder::Author => "author",
        };
        f.write_str(name)
    }
}

#[derive(Default)]
struct FeedState {
    articles: Vec<Article>,
    /// `None` until a snapshot with known subscriptions arrives
    topic_ids: Option<Vec<u64>>,
    sort: SortOrder,
}

impl FeedState {
    fn derive(&self) -> Vec<Article> {
        let mut visible: Vec<Article> = match &self.topic_ids {
            Some(ids) => self
                .articles
                .iter()
                .filter(|article| ids.contains(&article.topic_id))
                .cloned()
                .collect(),
            None => self.articles.clone(),
        };
        visible.sort_by(|a, b| self.sort.compare(a, b));
        visible
    }
}

struct FeedShared {
    state: Mutex<FeedState>,
    visible: watch::Sender<Vec<Article>>,
}

impl FeedShared {
    fn update(&self, apply: impl FnOnce(&mut FeedState)) {
        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        apply(&mut state);
        self.visible.send_replace(state.derive());
    }
}

/// Article list scoped to the current user's subscriptions
///
/// Re-filters on its own whenever the session publishes a user whose
/// subscriptions are known, so a subscribe elsewhere shows up without a reload.
pub struct ArticlesFeed {
    api: Arc<ApiClient>,
    shared: Arc<FeedShared>,
    _task: ViewTask,
}

impl ArticlesFeed {
    /// Must be called inside a tokio runtime
    pub fn new(api: Arc<ApiClient>, session: &SessionStore) -> Self {
        let (visible, _) = watch::channel(Vec::new());
        let state = FeedState {
            topic_ids: session.current_user().and_then(|user| user.subscribed_topic_ids()),
            ..FeedState::default()
        };
        let shared = Arc::new(FeedShared {
            state: Mutex::new(state),
            visible,
        });

        let mut users = session.subscribe();
        let listener = Arc::clone(&shared);
        let task = ViewTask::spawn(async move {
            while let Some(user) = users.next().await {
                if let Some(ids) = user.as_ref().and_then(User::subscribed_topic_ids) {
                    debug!(topics = ids.len(), "Subscriptions changed, re-filtering feed");
                    listener.update(|state| state.topic_ids = Some(ids));
                }
            }
        });

        Self {
            api,
            shared,
            _task: task,
        }
    }

    pub async fn load(&self) -> Result<Vec<Article>, ViewError> {
        let articles = self.api.list_articles().await?;
        info!(count = articles.len(), "Articles loaded");
        self.set_articles(articles);
        Ok(self.visible())
    }

    pub fn set_articles(&self, articles: Vec<Article>) {
        self.shared.update(|state| state.articles = articles);
    }

    pub fn set_sort(&self, sort: SortOrder) {
        self.shared.update(|state| state.sort = sort);
    }

    pub fn sort(&self) -> SortOrder {
        self.shared
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .sort
    }

    pub fn visible(&self) -> Vec<Article> {
        self.shared.visible.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<Vec<Article>> {
        self.shared.visible.subscribe()
    }
}
