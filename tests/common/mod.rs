#![allow(dead_code)]

use axum::extract::{Path, State};
use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use dashmap::DashMap;
use forum_client::core::config::Config;
use forum_client::core::state::AppState;
use forum_client::models::article::{Article, ArticleDetail, Comment, CreateArticleRequest, NewComment};
use forum_client::models::topic::{CreateTopicRequest, Topic};
use forum_client::models::user::{
    AuthResponse, LoginRequest, RegisterRequest, TopicSummary, UpdateUserRequest, User,
};
use forum_client::stores::token_store::TokenStore;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub const ALICE_TOKEN: &str = "abc";
pub const ALICE_PASSWORD: &str = "Secret123!";

/// In-memory forum backend speaking the same REST contract as the real one
pub struct MockBackend {
    pub users: DashMap<u64, User>,
    passwords: DashMap<u64, String>,
    pub tokens: DashMap<String, u64>,
    topics: DashMap<u64, Topic>,
    pub articles: DashMap<u64, ArticleDetail>,
    next_id: AtomicU64,
    pub me_calls: AtomicUsize,
    pub login_calls: AtomicUsize,
    pub requests: AtomicUsize,
    me_delay_ms: AtomicU64,
}

impl MockBackend {
    fn seeded() -> Self {
        let backend = Self {
            users: DashMap::new(),
            passwords: DashMap::new(),
            tokens: DashMap::new(),
            topics: DashMap::new(),
            articles: DashMap::new(),
            next_id: AtomicU64::new(100),
            me_calls: AtomicUsize::new(0),
            login_calls: AtomicUsize::new(0),
            requests: AtomicUsize::new(0),
            me_delay_ms: AtomicU64::new(0),
        };

        backend
            .users
            .insert(1, User::new(1, "alice", "a@x.com").with_subscriptions(vec![]));
        backend.passwords.insert(1, ALICE_PASSWORD.to_string());

        for (id, title) in [(1, "Rust"), (2, "Async"), (3, "Web")] {
            backend.topics.insert(
                id,
                Topic {
                    id,
                    title: title.to_string(),
                    description: format!("All about {}", title),
                    subscribed: None,
                    created_at: None,
                    updated_at: None,
                },
            );
        }

        for (id, topic_id, title, created_at) in [
            (1, 1, "Ownership", "2024-01-10T10:00:00"),
            (2, 2, "Futures", "2024-03-01T09:00:00"),
            (3, 3, "Routing", "2024-02-15T12:00:00"),
            (4, 2, "Pinning", "2024-01-01T08:00:00"),
        ] {
            backend.articles.insert(
                id,
                ArticleDetail {
                    article: Article {
                        id,
                        title: title.to_string(),
                        content: format!("{} explained", title),
                        topic_id,
                        topic_title: backend
                            .topics
                            .get(&topic_id)
                            .map(|t| t.title.clone())
                            .unwrap_or_default(),
                        author_id: Some(1),
                        author_name: "alice".to_string(),
                        created_at: created_at.to_string(),
                    },
                    comments: vec![],
                },
            );
        }

        backend
    }

    /// Delay every `GET /auth/me` so concurrent callers overlap
    pub fn set_me_delay(&self, delay: Duration) {
        self.me_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn me_calls(&self) -> usize {
        self.me_calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    fn authenticate(&self, headers: &HeaderMap) -> Result<u64, StatusCode> {
        let token = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(StatusCode::UNAUTHORIZED)?;
        self.tokens
            .get(token)
            .map(|entry| *entry.value())
            .ok_or(StatusCode::UNAUTHORIZED)
    }

    fn user(&self, id: u64) -> Result<User, StatusCode> {
        self.users
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or(StatusCode::NOT_FOUND)
    }
}

type Shared = State<Arc<MockBackend>>;

async fn login(State(backend): Shared, Json(body): Json<LoginRequest>) -> Result<Json<AuthResponse>, StatusCode> {
    backend.requests.fetch_add(1, Ordering::SeqCst);
    backend.login_calls.fetch_add(1, Ordering::SeqCst);

    let user = backend
        .users
        .iter()
        .find(|entry| {
            entry.username == body.email_or_username || entry.email == body.email_or_username
        })
        .map(|entry| entry.value().clone())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let matches = backend
        .passwords
        .get(&user.id)
        .map(|password| *password == body.password)
        .unwrap_or(false);
    if !matches {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let token = if user.id == 1 {
        ALICE_TOKEN.to_string()
    } else {
        format!("token-{}", user.id)
    };
    backend.tokens.insert(token.clone(), user.id);

    // Login responses carry the bare user, without subscriptions
    Ok(Json(AuthResponse {
        token,
        user: Some(User::new(user.id, user.username, user.email)),
    }))
}

async fn register(
    State(backend): Shared,
    Json(body): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, Json<serde_json::Value>)> {
    backend.requests.fetch_add(1, Ordering::SeqCst);

    let taken = backend
        .users
        .iter()
        .any(|entry| entry.username == body.username || entry.email == body.email);
    if taken {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "message": "Username or email already in use" })),
        ));
    }

    let id = backend.next_id();
    backend.users.insert(
        id,
        User::new(id, body.username, body.email).with_subscriptions(vec![]),
    );
    backend.passwords.insert(id, body.password);

    let token = format!("token-{}", id);
    backend.tokens.insert(token.clone(), id);

    // No user in the body, the client has to ask /auth/me
    Ok(Json(AuthResponse { token, user: None }))
}

async fn me(State(backend): Shared, headers: HeaderMap) -> Result<Json<User>, StatusCode> {
    backend.requests.fetch_add(1, Ordering::SeqCst);
    backend.me_calls.fetch_add(1, Ordering::SeqCst);

    let delay = backend.me_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }

    let id = backend.authenticate(&headers)?;
    backend.user(id).map(Json)
}

async fn update_me(
    State(backend): Shared,
    headers: HeaderMap,
    Json(body): Json<UpdateUserRequest>,
) -> Result<Json<User>, StatusCode> {
    backend.requests.fetch_add(1, Ordering::SeqCst);
    let id = backend.authenticate(&headers)?;

    let mut user = backend.users.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    if let Some(username) = body.username {
        user.username = username;
    }
    if let Some(email) = body.email {
        user.email = email;
    }
    if let Some(password) = body.password {
        backend.passwords.insert(id, password);
    }
    Ok(Json(user.clone()))
}

async fn list_posts(State(backend): Shared) -> Json<Vec<Article>> {
    backend.requests.fetch_add(1, Ordering::SeqCst);
    let mut articles: Vec<Article> = backend
        .articles
        .iter()
        .map(|entry| entry.article.clone())
        .collect();
    articles.sort_by_key(|article| article.id);
    Json(articles)
}

async fn get_post(State(backend): Shared, Path(id): Path<u64>) -> Result<Json<ArticleDetail>, StatusCode> {
    backend.requests.fetch_add(1, Ordering::SeqCst);
    backend
        .articles
        .get(&id)
        .map(|entry| Json(entry.value().clone()))
        .ok_or(StatusCode::NOT_FOUND)
}

async fn create_post(
    State(backend): Shared,
    headers: HeaderMap,
    Json(body): Json<CreateArticleRequest>,
) -> Result<Json<ArticleDetail>, StatusCode> {
    backend.requests.fetch_add(1, Ordering::SeqCst);
    let author = backend.user(backend.authenticate(&headers)?)?;
    let topic_title = backend
        .topics
        .get(&body.topic_id)
        .map(|t| t.title.clone())
        .ok_or(StatusCode::BAD_REQUEST)?;

    let id = backend.next_id();
    let detail = ArticleDetail {
        article: Article {
            id,
            title: body.title,
            content: body.content,
            topic_id: body.topic_id,
            topic_title,
            author_id: Some(author.id),
            author_name: author.username,
            created_at: "2024-04-01T00:00:00".to_string(),
        },
        comments: vec![],
    };
    backend.articles.insert(id, detail.clone());
    Ok(Json(detail))
}

async fn add_comment(
    State(backend): Shared,
    headers: HeaderMap,
    Path(post_id): Path<u64>,
    Json(body): Json<NewComment>,
) -> Result<Json<Comment>, StatusCode> {
    backend.requests.fetch_add(1, Ordering::SeqCst);
    let author = backend.user(backend.authenticate(&headers)?)?;

    let comment = Comment {
        id: backend.next_id(),
        post_id: Some(post_id),
        author_id: Some(author.id),
        author_name: author.username,
        content: body.content,
        created_at: None,
    };
    let mut detail = backend.articles.get_mut(&post_id).ok_or(StatusCode::NOT_FOUND)?;
    detail.comments.push(comment.clone());
    Ok(Json(comment))
}

async fn list_topics(State(backend): Shared, headers: HeaderMap) -> Json<Vec<Topic>> {
    backend.requests.fetch_add(1, Ordering::SeqCst);
    let subscriptions = backend
        .authenticate(&headers)
        .ok()
        .and_then(|id| backend.user(id).ok())
        .and_then(|user| user.subscribed_topic_ids());

    let mut topics: Vec<Topic> = backend
        .topics
        .iter()
        .map(|entry| {
            let mut topic = entry.value().clone();
            topic.subscribed = subscriptions.as_ref().map(|ids| ids.contains(&topic.id));
            topic
        })
        .collect();
    topics.sort_by_key(|topic| topic.id);
    Json(topics)
}

async fn create_topic(
    State(backend): Shared,
    headers: HeaderMap,
    Json(body): Json<CreateTopicRequest>,
) -> Result<Json<Topic>, StatusCode> {
    backend.requests.fetch_add(1, Ordering::SeqCst);
    backend.authenticate(&headers)?;

    let topic = Topic {
        id: backend.next_id(),
        title: body.title,
        description: body.description,
        subscribed: Some(false),
        created_at: None,
        updated_at: None,
    };
    backend.topics.insert(topic.id, topic.clone());
    Ok(Json(topic))
}

async fn subscribe(State(backend): Shared, headers: HeaderMap, Path(topic_id): Path<u64>) -> StatusCode {
    backend.requests.fetch_add(1, Ordering::SeqCst);
    let id = match backend.authenticate(&headers) {
        Ok(id) => id,
        Err(status) => return status,
    };
    let topic = match backend.topics.get(&topic_id) {
        Some(topic) => TopicSummary::new(topic.id, topic.title.clone(), topic.description.clone()),
        None => return StatusCode::NOT_FOUND,
    };

    if let Some(mut user) = backend.users.get_mut(&id) {
        let subscriptions = user.subscriptions.get_or_insert_with(Vec::new);
        if !subscriptions.iter().any(|t| t.id == topic_id) {
            subscriptions.push(topic);
        }
    }
    StatusCode::NO_CONTENT
}

async fn unsubscribe(State(backend): Shared, headers: HeaderMap, Path(topic_id): Path<u64>) -> StatusCode {
    backend.requests.fetch_add(1, Ordering::SeqCst);
    let id = match backend.authenticate(&headers) {
        Ok(id) => id,
        Err(status) => return status,
    };

    if let Some(mut user) = backend.users.get_mut(&id) {
        if let Some(subscriptions) = user.subscriptions.as_mut() {
            subscriptions.retain(|t| t.id != topic_id);
        }
    }
    StatusCode::NO_CONTENT
}

pub struct TestServer {
    pub base_url: String,
    pub backend: Arc<MockBackend>,
    handle: JoinHandle<()>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub async fn spawn_backend() -> TestServer {
    let backend = Arc::new(MockBackend::seeded());

    let app = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register))
        .route("/api/auth/me", get(me))
        .route("/api/users/me", axum::routing::put(update_me))
        .route("/api/posts", get(list_posts).post(create_post))
        .route("/api/posts/{id}", get(get_post))
        .route("/api/posts/{id}/comments", post(add_comment))
        .route("/api/topics", get(list_topics).post(create_topic))
        .route(
            "/api/users/me/subscriptions/{topic_id}",
            post(subscribe).delete(unsubscribe),
        )
        .with_state(Arc::clone(&backend));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestServer {
        base_url: format!("http://{}/api", addr),
        backend,
        handle,
    }
}

pub fn app_state(base_url: &str, tokens: Arc<dyn TokenStore>) -> AppState {
    let config = Config::from_toml(&format!(
        "[api]\nbase_url = \"{}\"\ntimeout_secs = 5\n",
        base_url
    ))
    .unwrap();
    AppState::with_token_store(config, tokens).unwrap()
}
