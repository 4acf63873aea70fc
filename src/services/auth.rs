use crate::api::client::ApiClient;
use crate::core::error::{ApiError, SessionError};
use crate::models::user::{AuthResponse, LoginRequest, RegisterRequest, UpdateUserRequest, User};
use crate::stores::session_store::SessionStore;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Session mutations backed by the Backend API
///
/// Apart from the bootstrap, this is the only writer of the [`SessionStore`].
/// A failed request never touches the stored token or snapshot unless noted.
pub struct AuthService {
    api: Arc<ApiClient>,
    session: Arc<SessionStore>,
}

impl AuthService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        let session = Arc::clone(api.session());
        Self { api, session }
    }

    pub fn api(&self) -> &Arc<ApiClient> {
        &self.api
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub async fn login(&self, credentials: &LoginRequest) -> Result<User, SessionError> {
        let response = self.api.login(credentials).await.map_err(|e| {
            warn!(identifier = %credentials.email_or_username, error = %e, "Login failed");
            e
        })?;
        let user = self.establish(response).await?;
        info!(user_id = user.id, username = %user.username, "Logged in");
        Ok(user)
    }

    pub async fn register(&self, registration: &RegisterRequest) -> Result<User, SessionError> {
        let response = self.api.register(registration).await.map_err(|e| {
            warn!(username = %registration.username, error = %e, "Registration failed");
            e
        })?;
        let user = self.establish(response).await?;
        info!(user_id = user.id, username = %user.username, "Registered");
        Ok(user)
    }

    /// Store the issued token and the user it belongs to
    async fn establish(&self, response: AuthResponse) -> Result<User, SessionError> {
        self.session.set_token(&response.token)?;

        match response.user {
            Some(user) => {
                self.session.set_current_user(Some(user.clone()));
                Ok(user)
            }
            None => match self.get_me().await {
                Ok(user) => Ok(user),
                Err(e) => {
                    // Token we cannot resolve to a user is useless
                    self.clear_if_current(Some(&response.token));
                    Err(e.into())
                }
            },
        }
    }

    pub fn logout(&self) {
        let user_id = self.session.current_user().map(|u| u.id);
        self.session.clear();
        info!(user_id = ?user_id, "Logged out");
    }

    /// Fetch the user for the stored token and replace the snapshot
    ///
    /// The snapshot is only replaced if the same token is still stored when
    /// the response arrives; otherwise the user is returned unpublished.
    pub async fn get_me(&self) -> Result<User, ApiError> {
        let issued_for = self.session.get_token();
        let user = self.api.me().await?;
        self.publish(issued_for.as_deref(), &user);
        Ok(user)
    }

    /// `get_me`, clearing the session when the backend rejects the token
    ///
    /// Only the session the request was issued for is cleared, a login that
    /// completed meanwhile survives.
    pub async fn verify(&self) -> Result<User, ApiError> {
        let issued_for = self.session.get_token();
        match self.get_me().await {
            Ok(user) => Ok(user),
            Err(e) => {
                self.clear_if_current(issued_for.as_deref());
                Err(e)
            }
        }
    }

    fn publish(&self, issued_for: Option<&str>, user: &User) {
        let current = self.session.get_token();
        if issued_for.is_some() && current.as_deref() == issued_for {
            self.session.set_current_user(Some(user.clone()));
        } else {
            debug!(user_id = user.id, "Session changed while request was in flight, response dropped");
        }
    }

    fn clear_if_current(&self, issued_for: Option<&str>) {
        if self.session.get_token().as_deref() == issued_for {
            self.logout();
        } else {
            debug!("Session changed while request was in flight, keeping it");
        }
    }

    /// Cached snapshot when present, otherwise one verification request
    pub async fn current_or_fetch(&self) -> Result<User, ApiError> {
        match self.session.current_user() {
            Some(user) => Ok(user),
            None => self.get_me().await,
        }
    }

    pub async fn update_me(&self, changes: &UpdateUserRequest) -> Result<User, ApiError> {
        let issued_for = self.session.get_token();
        let user = self.api.update_me(changes).await?;
        self.publish(issued_for.as_deref(), &user);
        info!(user_id = user.id, "Profile updated");
        Ok(user)
    }

    /// Subscribe, then refresh the whole snapshot from the backend
    pub async fn subscribe(&self, topic_id: u64) -> Result<User, ApiError> {
        self.api.subscribe(topic_id).await?;
        info!(topic_id, "Subscribed to topic");
        self.get_me().await
    }

    pub async fn unsubscribe(&self, topic_id: u64) -> Result<User, ApiError> {
        self.api.unsubscribe(topic_id).await?;
        info!(topic_id, "Unsubscribed from topic");
        self.get_me().await
    }
}
