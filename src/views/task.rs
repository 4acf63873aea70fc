use std::future::Future;
use tokio::task::JoinHandle;

/// Background task owned by a view
///
/// Aborted when dropped, so a torn-down view stops reacting to the session.
pub struct ViewTask {
    handle: JoinHandle<()>,
}

impl ViewTask {
    pub fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            handle: tokio::spawn(future),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for ViewTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
