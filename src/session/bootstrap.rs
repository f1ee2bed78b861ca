//! The session bootstrap loop.
//!
//! Reconciles the identity provider's session with the backend profile and publishes the
//! result to a [`SessionStore`]. Runs until cancelled.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::api::ApiErrorKind;
use crate::effects::{ApiEffect, ApiInterpreter, ApiResponse, Effect};

use super::provider::IdentityProvider;
use super::state::SessionState;
use super::store::SessionStore;
use super::transitions::{AuthChange, BootstrapEvent, BootstrapState, ProfileOutcome, apply};

/// User-initiated requests into a running [`SessionBootstrap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BootstrapCommand {
    RetryProfile,
}

/// Cloneable handle for sending user actions to a running bootstrap.
#[derive(Debug, Clone)]
pub struct BootstrapHandle {
    commands: mpsc::UnboundedSender<BootstrapCommand>,
}

impl BootstrapHandle {
    /// Asks the bootstrap to fetch the profile again after a failed fetch.
    ///
    /// Ignored unless the profile is in the failed state. Returns false once the
    /// bootstrap has stopped.
    pub fn retry_profile(&self) -> bool {
        self.commands.send(BootstrapCommand::RetryProfile).is_ok()
    }
}

/// Drives session reconciliation for the application root.
pub struct SessionBootstrap<A, P> {
    api: Arc<A>,
    provider: Arc<P>,
    store: SessionStore,
    changes: broadcast::Receiver<AuthChange>,
    commands_tx: mpsc::UnboundedSender<BootstrapCommand>,
    commands: mpsc::UnboundedReceiver<BootstrapCommand>,
}

impl<A, P> SessionBootstrap<A, P>
where
    A: ApiInterpreter + 'static,
    P: IdentityProvider + 'static,
{
    /// Creates the bootstrap and subscribes to change notifications immediately, so no
    /// change issued after construction is missed.
    pub fn new(api: Arc<A>, provider: Arc<P>, store: SessionStore) -> Self {
        let changes = provider.subscribe();
        let (commands_tx, commands) = mpsc::unbounded_channel();
        SessionBootstrap {
            api,
            provider,
            store,
            changes,
            commands_tx,
            commands,
        }
    }

    /// Returns a handle for user actions. Take it before calling [`run`](Self::run).
    pub fn handle(&self) -> BootstrapHandle {
        BootstrapHandle {
            commands: self.commands_tx.clone(),
        }
    }

    /// Runs the bootstrap loop.
    ///
    /// The cached-session check, change notifications, user commands, and completed
    /// profile fetches are multiplexed into one sequence of events. Navigation and prompt effects go to
    /// `outbox`; profile fetches run on spawned tasks and report back as events.
    #[instrument(skip_all)]
    pub async fn run(mut self, outbox: mpsc::UnboundedSender<Effect>, shutdown: CancellationToken) {
        let provider = Arc::clone(&self.provider);
        let cached = async move { provider.cached_session().await };
        tokio::pin!(cached);
        let mut cached_pending = true;
        let mut changes_open = true;

        let (loaded_tx, mut loaded_rx) = mpsc::unbounded_channel::<BootstrapEvent>();
        let mut state = BootstrapState::new();

        loop {
            let event = tokio::select! {
                _ = shutdown.cancelled() => {
                    debug!("Session bootstrap stopping");
                    break;
                }

                session = &mut cached, if cached_pending => {
                    cached_pending = false;
                    debug!(found = session.is_some(), "Cached session check resolved");
                    BootstrapEvent::CachedSession(session)
                }

                change = self.changes.recv(), if changes_open => {
                    match change {
                        Ok(change) => BootstrapEvent::AuthChanged(change),
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!(skipped, "Missed session change notifications");
                            continue;
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            debug!("Identity provider closed its notification channel");
                            changes_open = false;
                            continue;
                        }
                    }
                }

                Some(command) = self.commands.recv() => match command {
                    BootstrapCommand::RetryProfile => BootstrapEvent::ProfileRetryRequested,
                },

                Some(event) = loaded_rx.recv() => event,
            };

            log_event(&event);
            let (next, effects) = apply(&state, event);
            state = next;
            self.store.publish(state.session.clone());

            for effect in effects {
                self.dispatch(effect, &state.session, &loaded_tx, &outbox, &shutdown);
            }
        }
    }

    fn dispatch(
        &self,
        effect: Effect,
        session: &SessionState,
        loaded_tx: &mpsc::UnboundedSender<BootstrapEvent>,
        outbox: &mpsc::UnboundedSender<Effect>,
        shutdown: &CancellationToken,
    ) {
        match effect {
            Effect::Api(ApiEffect::FetchProfile) => {
                let Some(user_id) = session.user_id().cloned() else {
                    return;
                };
                let token = session.token().cloned();
                let api = Arc::clone(&self.api);
                let tx = loaded_tx.clone();
                let shutdown = shutdown.clone();

                debug!(user_id = %user_id, "Fetching profile");
                tokio::spawn(async move {
                    let result = tokio::select! {
                        _ = shutdown.cancelled() => return,
                        r = api.interpret(ApiEffect::FetchProfile, token) => r,
                    };
                    let outcome = match result.and_then(ApiResponse::into_profile) {
                        Ok(Some(profile)) => ProfileOutcome::Found(profile),
                        Ok(None) => ProfileOutcome::NotFound,
                        Err(e) if e.kind == ApiErrorKind::NotFound => ProfileOutcome::NotFound,
                        Err(e) => {
                            warn!(error = %e, "Profile fetch failed");
                            ProfileOutcome::Failed(e.message)
                        }
                    };
                    let _ = tx.send(BootstrapEvent::ProfileLoaded { user_id, outcome });
                });
            }
            other => {
                if outbox.send(other).is_err() {
                    debug!("Effect outbox closed, dropping effect");
                }
            }
        }
    }
}

fn log_event(event: &BootstrapEvent) {
    match event {
        BootstrapEvent::AuthChanged(AuthChange::SignedIn(session)) => {
            info!(user_id = %session.user_id(), "Signed in");
        }
        BootstrapEvent::AuthChanged(AuthChange::SignedOut) => info!("Signed out"),
        BootstrapEvent::ProfileRetryRequested => info!("Profile retry requested"),
        BootstrapEvent::ProfileLoaded { user_id, outcome } => {
            let found = matches!(outcome, ProfileOutcome::Found(_));
            debug!(user_id = %user_id, found, "Profile fetch completed");
        }
        _ => {}
    }
}
