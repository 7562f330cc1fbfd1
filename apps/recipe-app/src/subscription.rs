//! Handles for background listeners.

use std::future::Future;

use tokio::task::JoinHandle;

/// Owns a spawned listener task. Dropping the handle or calling
/// [`Subscription::unsubscribe`] stops the listener.
#[must_use = "dropping a Subscription stops its listener"]
pub struct Subscription {
    name: &'static str,
    handle: JoinHandle<()>,
}

impl Subscription {
    pub(crate) fn spawn<F>(name: &'static str, listener: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tracing::debug!(subscription = name, "Listener started");
        Self {
            name,
            handle: tokio::spawn(listener),
        }
    }

    pub fn unsubscribe(self) {
        // Drop does the work.
    }

    pub fn is_active(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.handle.abort();
        tracing::debug!(subscription = self.name, "Listener stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_unsubscribe_aborts_listener() {
        let (tx, rx) = oneshot::channel::<()>();

        let subscription = Subscription::spawn("test", async move {
            let _held = tx;
            std::future::pending::<()>().await;
        });
        assert!(subscription.is_active());

        subscription.unsubscribe();

        // The aborted task drops its sender without sending.
        assert!(rx.await.is_err());
    }
}
