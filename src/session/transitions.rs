//! Session bootstrap transitions.
//!
//! Pure functions from `(state, event)` to `(state, effects)`. The cached-session check
//! and change notifications race; correctness rests on the profile guard, which is keyed
//! by the signed-in user and not by which path resolved first:
//! - a profile fetch is issued only when the guard does not already hold the user
//! - sign-out clears the guard, so the next login fetches again
//! - a cached result never overrides a newer change notification

use crate::effects::{ApiEffect, Effect, Route};
use crate::types::{Profile, Session, UserId};

use super::state::{ProfileState, SessionState};

/// A session change reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthChange {
    SignedIn(Session),
    /// The same login with a new access token.
    TokenRefreshed(Session),
    SignedOut,
}

/// What a profile fetch produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileOutcome {
    Found(Profile),
    NotFound,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum BootstrapEvent {
    /// The cached-session check resolved.
    CachedSession(Option<Session>),
    AuthChanged(AuthChange),
    ProfileLoaded {
        user_id: UserId,
        outcome: ProfileOutcome,
    },
    /// The user asked to try a failed profile fetch again.
    ProfileRetryRequested,
}

/// Bootstrap state: the published session plus the one-shot fetch guard.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BootstrapState {
    pub session: SessionState,

    /// The user whose profile fetch has been issued for the current login.
    profile_guard: Option<UserId>,
}

impl BootstrapState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn profile_guard(&self) -> Option<&UserId> {
        self.profile_guard.as_ref()
    }
}

/// Applies an event, returning the next state and the effects to perform.
pub fn apply(state: &BootstrapState, event: BootstrapEvent) -> (BootstrapState, Vec<Effect>) {
    match event {
        BootstrapEvent::CachedSession(Some(session)) => match state.session {
            SessionState::Loading => sign_in(state, session),
            // A change notification already settled the state and is newer.
            _ => (state.clone(), vec![]),
        },

        BootstrapEvent::CachedSession(None) => match state.session {
            SessionState::Loading => (
                BootstrapState {
                    session: SessionState::Unauthenticated,
                    profile_guard: None,
                },
                vec![],
            ),
            _ => (state.clone(), vec![]),
        },

        BootstrapEvent::AuthChanged(AuthChange::SignedIn(session)) => sign_in(state, session),

        BootstrapEvent::AuthChanged(AuthChange::TokenRefreshed(session)) => {
            sign_in(state, session)
        }

        BootstrapEvent::AuthChanged(AuthChange::SignedOut) => (
            BootstrapState {
                session: SessionState::Unauthenticated,
                profile_guard: None,
            },
            vec![Effect::Navigate(Route::Root)],
        ),

        BootstrapEvent::ProfileLoaded { user_id, outcome } => {
            profile_loaded(state, &user_id, outcome)
        }

        BootstrapEvent::ProfileRetryRequested => match &state.session {
            SessionState::Authenticated {
                session,
                profile: ProfileState::FetchFailed(_),
            } => (
                BootstrapState {
                    session: SessionState::Authenticated {
                        session: session.clone(),
                        profile: ProfileState::Fetching,
                    },
                    profile_guard: Some(session.user_id().clone()),
                },
                vec![Effect::Api(ApiEffect::FetchProfile)],
            ),
            _ => (state.clone(), vec![]),
        },
    }
}

/// Installs a session. The profile is fetched only if the guard does not already hold
/// this user; otherwise the token is swapped and the profile kept.
fn sign_in(state: &BootstrapState, session: Session) -> (BootstrapState, Vec<Effect>) {
    let user_id = session.user_id().clone();

    if state.profile_guard.as_ref() == Some(&user_id)
        && let SessionState::Authenticated { profile, .. } = &state.session
    {
        return (
            BootstrapState {
                session: SessionState::Authenticated {
                    session,
                    profile: profile.clone(),
                },
                profile_guard: state.profile_guard.clone(),
            },
            vec![],
        );
    }

    (
        BootstrapState {
            session: SessionState::Authenticated {
                session,
                profile: ProfileState::Fetching,
            },
            profile_guard: Some(user_id),
        },
        vec![Effect::Api(ApiEffect::FetchProfile)],
    )
}

fn profile_loaded(
    state: &BootstrapState,
    user_id: &UserId,
    outcome: ProfileOutcome,
) -> (BootstrapState, Vec<Effect>) {
    let session = match &state.session {
        SessionState::Authenticated {
            session,
            profile: ProfileState::Fetching,
        } if session.user_id() == user_id => session.clone(),
        // Result for a user who signed out or was replaced, or a duplicate.
        _ => return (state.clone(), vec![]),
    };

    let (profile, effects) = match outcome {
        ProfileOutcome::Found(p) => (ProfileState::Present(p), vec![]),
        ProfileOutcome::NotFound => (ProfileState::NotFound, vec![Effect::PromptProfileSetup]),
        ProfileOutcome::Failed(message) => (ProfileState::FetchFailed(message), vec![]),
    };

    (
        BootstrapState {
            session: SessionState::Authenticated { session, profile },
            profile_guard: state.profile_guard.clone(),
        },
        effects,
    )
}
