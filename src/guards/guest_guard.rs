use crate::guards::outcome::GuardOutcome;
use crate::navigation::route::Route;
use crate::stores::session_store::SessionStore;
use std::sync::Arc;
use tracing::debug;

/// Gate for login/register: users holding a token go to the landing view
#[derive(Clone)]
pub struct GuestGuard {
    session: Arc<SessionStore>,
}

impl GuestGuard {
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self { session }
    }

    pub fn check(&self) -> GuardOutcome {
        if self.session.is_authenticated() {
            debug!(landing = %Route::LANDING, "Already authenticated, leaving guest-only view");
            return GuardOutcome::redirect(Route::LANDING);
        }
        GuardOutcome::allow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guards::outcome::Navigation;
    use crate::stores::token_store::MemoryTokenStore;

    #[test]
    fn test_guest_allowed() {
        let guard = GuestGuard::new(Arc::new(SessionStore::in_memory()));
        assert_eq!(guard.check().immediate(), Some(&Navigation::Allow));
    }

    #[test]
    fn test_token_holder_redirected_to_landing() {
        let session = SessionStore::new(Arc::new(MemoryTokenStore::with_token("abc")));
        let guard = GuestGuard::new(Arc::new(session));
        assert_eq!(
            guard.check().immediate(),
            Some(&Navigation::Redirect(Route::Articles))
        );
    }
}
