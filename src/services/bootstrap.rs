use crate::services::auth::AuthService;
use futures_util::future::{self, BoxFuture, FutureExt, Shared};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, warn};

type Attempt = Shared<BoxFuture<'static, ()>>;

/// One-shot reconciliation of the persisted token with a verified user
///
/// The first call to [`initialize`](Self::initialize) starts the attempt on
/// its own task, every caller awaits that same attempt, and every later call
/// returns immediately. A caller that is dropped only stops waiting; the
/// attempt still runs to completion. Failures are logged and end in a
/// logged-out session.
pub struct SessionBootstrap {
    auth: Arc<AuthService>,
    attempt: OnceLock<Attempt>,
    done: Arc<AtomicBool>,
}

impl SessionBootstrap {
    pub fn new(auth: Arc<AuthService>) -> Self {
        Self {
            auth,
            attempt: OnceLock::new(),
            done: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Must be called inside a tokio runtime
    pub async fn initialize(&self) {
        let attempt = self
            .attempt
            .get_or_init(|| {
                let auth = Arc::clone(&self.auth);
                let done = Arc::clone(&self.done);
                let handle = tokio::spawn(async move {
                    reconcile(&auth).await;
                    done.store(true, Ordering::SeqCst);
                });

                async move {
                    if let Err(e) = handle.await {
                        warn!(error = %e, "Session bootstrap task did not complete");
                    }
                }
                .boxed()
                .shared()
            })
            .clone();

        attempt.await;
    }

    /// Whether the single attempt has completed
    pub fn is_done(&self) -> bool {
        self.done.load(Ordering::SeqCst)
    }

    /// Complete the attempt without a request when none is needed
    ///
    /// Returns `true` if the bootstrap is finished after this call.
    pub fn try_settle(&self) -> bool {
        if self.is_done() {
            return true;
        }

        let session = self.auth.session();
        if session.get_token().is_none() || session.current_user().is_some() {
            let mut settled = false;
            // No-op when another caller already started the attempt
            self.attempt.get_or_init(|| {
                settled = true;
                future::ready(()).boxed().shared()
            });
            if settled {
                self.done.store(true, Ordering::SeqCst);
            }
        }

        self.is_done()
    }
}

async fn reconcile(auth: &AuthService) {
    let session = auth.session();

    if session.get_token().is_none() {
        debug!("No stored token, session bootstrap skipped");
        return;
    }

    if let Some(user) = session.current_user() {
        debug!(user_id = user.id, "Snapshot already present, session bootstrap skipped");
        return;
    }

    match auth.verify().await {
        Ok(user) => {
            info!(user_id = user.id, username = %user.username, "Stored session restored");
        }
        Err(e) => {
            warn!(error = %e, "Stored session could not be verified, cleared it");
        }
    }
}
