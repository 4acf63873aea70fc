// Application state (AppState)

use crate::api::client::ApiClient;
use crate::core::config::Config;
use crate::guards::auth_guard::AuthGuard;
use crate::guards::guest_guard::GuestGuard;
use crate::navigation::navigator::Navigator;
use crate::services::auth::AuthService;
use crate::services::bootstrap::SessionBootstrap;
use crate::stores::session_store::SessionStore;
use crate::stores::token_store::{FileTokenStore, TokenStore};
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;

/// Shared application state
///
/// Every view and command is handed the same session, so a login or
/// subscription change made through one is seen by all others.
#[derive(Clone)]
pub struct AppState {
    /// Persisted token and current-user snapshot
    pub session: Arc<SessionStore>,

    pub api: Arc<ApiClient>,

    pub auth: Arc<AuthService>,

    /// One-shot session restore, shared by the startup path and the guards
    pub bootstrap: Arc<SessionBootstrap>,

    pub navigator: Arc<Navigator>,

    pub config: Arc<Config>,
}

impl AppState {
    /// Wire the client against the token file named in `config`
    pub fn new(config: Config) -> Result<Self> {
        let tokens = Arc::new(FileTokenStore::new(config.storage.token_path.clone()));
        Self::with_token_store(config, tokens)
    }

    pub fn with_token_store(config: Config, tokens: Arc<dyn TokenStore>) -> Result<Self> {
        let config = Arc::new(config);
        let session = Arc::new(SessionStore::new(tokens));

        let api = Arc::new(
            ApiClient::new(
                config.api.base_url.clone(),
                Duration::from_secs(config.api.timeout_secs),
                Arc::clone(&session),
            )
            .context("Failed to create API client")?,
        );

        let auth = Arc::new(AuthService::new(Arc::clone(&api)));
        let bootstrap = Arc::new(SessionBootstrap::new(Arc::clone(&auth)));
        let navigator = Arc::new(Navigator::new(
            AuthGuard::new(Arc::clone(&auth), Arc::clone(&bootstrap)),
            GuestGuard::new(Arc::clone(&session)),
        ));

        Ok(Self {
            session,
            api,
            auth,
            bootstrap,
            navigator,
            config,
        })
    }
}
