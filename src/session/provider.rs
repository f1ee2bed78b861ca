//! The identity provider seam.
//!
//! Sign-in itself happens elsewhere; the client only consumes the provider's cached
//! session and its change notifications.

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::broadcast;

use crate::types::Session;

use super::transitions::AuthChange;

/// Capacity of the change-notification channel.
const CHANGE_CHANNEL_CAPACITY: usize = 16;

/// Source of the externally issued session.
pub trait IdentityProvider: Send + Sync {
    /// Resolves the session persisted from an earlier sign-in, if any.
    fn cached_session(&self) -> impl Future<Output = Option<Session>> + Send;

    /// Subscribes to session changes. Only changes after the call are delivered.
    fn subscribe(&self) -> broadcast::Receiver<AuthChange>;
}

/// A provider backed by a fixed session, with manually pushed notifications.
#[derive(Debug)]
pub struct StaticIdentityProvider {
    cached: Mutex<Option<Session>>,
    cached_delay: Duration,
    changes: broadcast::Sender<AuthChange>,
}

impl StaticIdentityProvider {
    pub fn new(cached: Option<Session>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        StaticIdentityProvider {
            cached: Mutex::new(cached),
            cached_delay: Duration::ZERO,
            changes,
        }
    }

    /// Delays the cached-session check, to let notifications win the race.
    pub fn with_cached_delay(mut self, delay: Duration) -> Self {
        self.cached_delay = delay;
        self
    }

    /// Pushes a change to subscribers and updates the cached session to match.
    pub fn notify(&self, change: AuthChange) {
        let cached = match &change {
            AuthChange::SignedIn(s) | AuthChange::TokenRefreshed(s) => Some(s.clone()),
            AuthChange::SignedOut => None,
        };
        if let Ok(mut slot) = self.cached.lock() {
            *slot = cached;
        }
        // No subscribers is fine.
        let _ = self.changes.send(change);
    }
}

impl IdentityProvider for StaticIdentityProvider {
    async fn cached_session(&self) -> Option<Session> {
        let cached = self.cached.lock().ok().and_then(|s| s.clone());
        if !self.cached_delay.is_zero() {
            tokio::time::sleep(self.cached_delay).await;
        }
        cached
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthChange> {
        self.changes.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{leader_identity, session_for};

    #[tokio::test]
    async fn notify_reaches_subscribers_and_updates_cache() {
        let provider = StaticIdentityProvider::new(None);
        let mut rx = provider.subscribe();
        let session = session_for(&leader_identity());

        provider.notify(AuthChange::SignedIn(session.clone()));

        assert_eq!(rx.recv().await.unwrap(), AuthChange::SignedIn(session.clone()));
        assert_eq!(provider.cached_session().await, Some(session));

        provider.notify(AuthChange::SignedOut);
        assert_eq!(provider.cached_session().await, None);
    }
}
