use crate::core::error::ViewError;
use crate::models::user::{TopicSummary, User};
use crate::navigation::route::Route;
use crate::services::auth::AuthService;
use crate::validation::forms::ProfileForm;
use std::sync::Arc;
use tracing::info;

/// Account settings and subscription list of the logged-in user
pub struct ProfileView {
    auth: Arc<AuthService>,
    user: Option<User>,
    pub form: ProfileForm,
}

impl ProfileView {
    pub fn new(auth: Arc<AuthService>) -> Self {
        Self {
            auth,
            user: None,
            form: ProfileForm::default(),
        }
    }

    /// Prefill the form, from the cached snapshot when there is one
    pub async fn open(&mut self) -> Result<&User, ViewError> {
        let user = self.auth.current_or_fetch().await?;
        self.prefill(&user);
        Ok(&*self.user.insert(user))
    }

    fn prefill(&mut self, user: &User) {
        self.form = ProfileForm {
            username: user.username.clone(),
            email: user.email.clone(),
            password: String::new(),
        };
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub async fn save(&mut self) -> Result<&User, ViewError> {
        let current = self.user.as_ref().ok_or(ViewError::NotLoaded)?;
        let changes = self.form.clone().validate(&current.username, &current.email)?;

        let updated = self.auth.update_me(&changes).await?;
        self.prefill(&updated);
        Ok(&*self.user.insert(updated))
    }

    /// Subscriptions of the live snapshot, or of the user loaded on open
    pub fn subscriptions(&self) -> Vec<TopicSummary> {
        self.auth
            .session()
            .current_user()
            .or_else(|| self.user.clone())
            .and_then(|user| user.subscriptions)
            .unwrap_or_default()
    }

    pub async fn unsubscribe(&mut self, topic_id: u64) -> Result<(), ViewError> {
        let user = self.auth.unsubscribe(topic_id).await?;
        self.user = Some(user);
        Ok(())
    }

    pub fn logout(&mut self) -> Route {
        self.auth.logout();
        self.user = None;
        self.form = ProfileForm::default();
        info!("Logged out from profile");
        Route::Home
    }
}
