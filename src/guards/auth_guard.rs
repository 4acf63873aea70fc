use crate::guards::outcome::{GuardOutcome, Navigation};
use crate::navigation::route::Route;
use crate::services::auth::AuthService;
use crate::services::bootstrap::SessionBootstrap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Gate for views that need a logged-in user
///
/// Decision order:
/// 1. settle the bootstrap if it needs no request
/// 2. no token: redirect to login now
/// 3. cached user: allow now, without re-verifying the token
/// 4. otherwise wait for the bootstrap, then verify with `GET /auth/me` if
///    the snapshot is still missing; failure clears the session
#[derive(Clone)]
pub struct AuthGuard {
    auth: Arc<AuthService>,
    bootstrap: Arc<SessionBootstrap>,
}

impl AuthGuard {
    pub fn new(auth: Arc<AuthService>, bootstrap: Arc<SessionBootstrap>) -> Self {
        Self { auth, bootstrap }
    }

    pub fn check(&self) -> GuardOutcome {
        self.bootstrap.try_settle();

        let session = self.auth.session();
        if session.get_token().is_none() {
            debug!("No token, redirecting to login");
            return GuardOutcome::redirect(Route::Login);
        }

        if session.current_user().is_some() {
            return GuardOutcome::allow();
        }

        let auth = Arc::clone(&self.auth);
        let bootstrap = Arc::clone(&self.bootstrap);

        GuardOutcome::Deferred(Box::pin(async move {
            // Joins an in-flight bootstrap instead of racing it
            bootstrap.initialize().await;

            let session = auth.session();
            if session.current_user().is_some() {
                return Navigation::Allow;
            }
            if session.get_token().is_none() {
                debug!("Session cleared during bootstrap, redirecting to login");
                return Navigation::Redirect(Route::Login);
            }

            debug!("Verifying stored token");
            match auth.verify().await {
                Ok(_) if auth.session().current_user().is_some() => Navigation::Allow,
                Ok(_) => {
                    debug!("Logged out during verification, redirecting to login");
                    Navigation::Redirect(Route::Login)
                }
                Err(e) => {
                    warn!(error = %e, "Token verification failed, redirecting to login");
                    Navigation::Redirect(Route::Login)
                }
            }
        }))
    }
}
