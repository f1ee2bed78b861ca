//! Session and profile state as seen by the rest of the client.

use crate::types::{AccessToken, Identity, Profile, Session, UserId};

/// Where the signed-in user's profile stands.
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileState {
    /// The one fetch for this login is in flight.
    Fetching,
    Present(Profile),
    /// The backend has no profile for this user yet.
    NotFound,
    /// The fetch failed; carries the error message.
    FetchFailed(String),
}

/// The identity state published to subscribers.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    /// Neither the cached check nor a change notification has resolved yet.
    #[default]
    Loading,
    Unauthenticated,
    Authenticated {
        session: Session,
        profile: ProfileState,
    },
}

/// Why an authenticated user has no profile to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoProfileReason {
    Fetching,
    NotFound,
    FetchFailed,
}

/// Coarse view of [`SessionState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Loading,
    Unauthenticated,
    AuthenticatedNoProfile { reason: NoProfileReason },
    AuthenticatedWithProfile,
}

impl SessionState {
    pub fn status(&self) -> SessionStatus {
        match self {
            SessionState::Loading => SessionStatus::Loading,
            SessionState::Unauthenticated => SessionStatus::Unauthenticated,
            SessionState::Authenticated { profile, .. } => match profile {
                ProfileState::Present(_) => SessionStatus::AuthenticatedWithProfile,
                ProfileState::Fetching => SessionStatus::AuthenticatedNoProfile {
                    reason: NoProfileReason::Fetching,
                },
                ProfileState::NotFound => SessionStatus::AuthenticatedNoProfile {
                    reason: NoProfileReason::NotFound,
                },
                ProfileState::FetchFailed(_) => SessionStatus::AuthenticatedNoProfile {
                    reason: NoProfileReason::FetchFailed,
                },
            },
        }
    }

    /// True once the state has left `Loading`.
    pub fn is_settled(&self) -> bool {
        !matches!(self, SessionState::Loading)
    }

    /// True when settled and no profile fetch is in flight.
    pub fn is_profile_resolved(&self) -> bool {
        match self {
            SessionState::Loading => false,
            SessionState::Unauthenticated => true,
            SessionState::Authenticated { profile, .. } => {
                !matches!(profile, ProfileState::Fetching)
            }
        }
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionState::Authenticated { session, .. } => Some(session),
            _ => None,
        }
    }

    pub fn token(&self) -> Option<&AccessToken> {
        self.session().map(|s| &s.access_token)
    }

    pub fn user_id(&self) -> Option<&UserId> {
        self.session().map(|s| s.user_id())
    }

    pub fn profile(&self) -> Option<&Profile> {
        match self {
            SessionState::Authenticated {
                profile: ProfileState::Present(p),
                ..
            } => Some(p),
            _ => None,
        }
    }

    /// The identity to show for the signed-in user: the profile's when present,
    /// otherwise the one the identity provider issued.
    pub fn display_identity(&self) -> Option<Identity> {
        match self.profile() {
            Some(profile) => Some(profile.identity()),
            None => self.session().map(|s| s.identity.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{leader_identity, profile_for, session_for};

    fn authenticated(profile: ProfileState) -> SessionState {
        SessionState::Authenticated {
            session: session_for(&leader_identity()),
            profile,
        }
    }

    #[test]
    fn status_distinguishes_missing_from_failed_profile() {
        assert_eq!(SessionState::Loading.status(), SessionStatus::Loading);
        assert_eq!(
            authenticated(ProfileState::NotFound).status(),
            SessionStatus::AuthenticatedNoProfile {
                reason: NoProfileReason::NotFound
            }
        );
        assert_eq!(
            authenticated(ProfileState::FetchFailed("boom".into())).status(),
            SessionStatus::AuthenticatedNoProfile {
                reason: NoProfileReason::FetchFailed
            }
        );
        assert_eq!(
            authenticated(ProfileState::Present(profile_for(&leader_identity()))).status(),
            SessionStatus::AuthenticatedWithProfile
        );
    }

    #[test]
    fn display_identity_prefers_profile() {
        let mut profile = profile_for(&leader_identity());
        profile.username = "captain-renamed".into();
        let state = authenticated(ProfileState::Present(profile));
        assert_eq!(state.display_identity().unwrap().display_name, "captain-renamed");

        let state = authenticated(ProfileState::NotFound);
        assert_eq!(state.display_identity().unwrap().display_name, "captain");
        assert_eq!(SessionState::Unauthenticated.display_identity(), None);
    }

    #[test]
    fn profile_resolution() {
        assert!(!SessionState::Loading.is_profile_resolved());
        assert!(SessionState::Unauthenticated.is_profile_resolved());
        assert!(!authenticated(ProfileState::Fetching).is_profile_resolved());
        assert!(authenticated(ProfileState::NotFound).is_profile_resolved());
    }
}
