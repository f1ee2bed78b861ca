//! The session store: an owned, observable holder of [`SessionState`].

use std::sync::Arc;

use tokio::sync::watch;

use super::state::SessionState;

/// Holds the current session state and notifies subscribers of every change.
///
/// Owned by the application root and handed to whatever needs identity; clones share
/// the same state.
#[derive(Debug, Clone)]
pub struct SessionStore {
    tx: Arc<watch::Sender<SessionState>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    /// Creates a store in the `Loading` state.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(SessionState::Loading);
        SessionStore { tx: Arc::new(tx) }
    }

    /// Publishes a state. Subscribers are notified only if it differs from the current one.
    pub fn publish(&self, state: SessionState) -> bool {
        self.tx.send_if_modified(|current| {
            if *current == state {
                false
            } else {
                *current = state;
                true
            }
        })
    }

    pub fn current(&self) -> SessionState {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.tx.subscribe()
    }

    /// Waits until the state satisfies `predicate` and returns it.
    pub async fn wait_for(&self, predicate: impl FnMut(&SessionState) -> bool) -> SessionState {
        let mut rx = self.subscribe();
        match rx.wait_for(predicate).await {
            Ok(state) => state.clone(),
            // The sender lives as long as `self`.
            Err(_) => self.current(),
        }
    }

    /// Waits until the state has left `Loading`.
    pub async fn wait_until_settled(&self) -> SessionState {
        self.wait_for(SessionState::is_settled).await
    }
}
