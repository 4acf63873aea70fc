use crate::guards::auth_guard::AuthGuard;
use crate::guards::guest_guard::GuestGuard;
use crate::guards::outcome::{GuardOutcome, Navigation};
use crate::navigation::route::{GuardPolicy, Route};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;
use tracing::{debug, info, warn};

const MAX_REDIRECTS: usize = 3;

/// How a call to [`Navigator::navigate`] ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationEnd {
    /// Landed on this route, possibly after redirects
    Arrived(Route),
    /// A later navigation started before this one resolved
    Superseded,
    /// Redirects did not settle
    RedirectLoop(Route),
}

/// Runs route guards and tracks the active route
///
/// Only the most recent navigation may publish its result, so a slow
/// verification cannot move the user after they went elsewhere.
pub struct Navigator {
    auth_guard: AuthGuard,
    guest_guard: GuestGuard,
    current: watch::Sender<Route>,
    generation: AtomicU64,
}

impl Navigator {
    pub fn new(auth_guard: AuthGuard, guest_guard: GuestGuard) -> Self {
        let (current, _) = watch::channel(Route::Home);
        Self {
            auth_guard,
            guest_guard,
            current,
            generation: AtomicU64::new(0),
        }
    }

    pub fn current(&self) -> Route {
        self.current.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<Route> {
        self.current.subscribe()
    }

    pub fn guard(&self, route: &Route) -> GuardOutcome {
        match route.guard_policy() {
            GuardPolicy::Public => GuardOutcome::allow(),
            GuardPolicy::AuthRequired => self.auth_guard.check(),
            GuardPolicy::GuestOnly => self.guest_guard.check(),
        }
    }

    pub async fn navigate(&self, target: Route) -> NavigationEnd {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let mut route = target;

        for _ in 0..=MAX_REDIRECTS {
            let decision = self.guard(&route).resolve().await;

            if self.generation.load(Ordering::SeqCst) != ticket {
                debug!(route = %route, "Navigation superseded, dropping result");
                return NavigationEnd::Superseded;
            }

            match decision {
                Navigation::Allow => {
                    info!(route = %route, "Navigated");
                    self.current.send_replace(route.clone());
                    return NavigationEnd::Arrived(route);
                }
                Navigation::Redirect(next) => {
                    debug!(from = %route, to = %next, "Guard redirected");
                    route = next;
                }
            }
        }

        warn!(route = %route, "Too many redirects, navigation abandoned");
        NavigationEnd::RedirectLoop(route)
    }
}
