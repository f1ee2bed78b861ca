//! Backend API effect types.
//!
//! These types describe backend calls as data, without executing them. The HTTP
//! interpreter in `crate::api` executes them; tests substitute a recording mock.

use serde::{Deserialize, Serialize};

use crate::api::ApiError;
use crate::types::{CreatedTeam, Identity, Profile, TeamId, Tournament, TournamentId, UserId};

/// A backend API call.
///
/// Effects carry no credentials. The interpreter is handed the bearer token of the
/// current session separately, so effects can be logged verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ApiEffect {
    /// Fetch the profile of the session's user.
    FetchProfile,

    /// Fetch a tournament by its public slug. The only unauthenticated call.
    FetchTournament { slug: String },

    /// Create a team with the session's user as leader.
    CreateTeam {
        tournament_id: TournamentId,
        name: String,
    },

    /// Look up candidate teammates by username fragment.
    SearchMembers { query: String },

    /// Attach members to an existing team in a single batch.
    AddTeamMembers {
        team_id: TeamId,
        user_ids: Vec<UserId>,
    },
}

impl ApiEffect {
    /// Returns true if the call needs a bearer token.
    pub fn requires_auth(&self) -> bool {
        !matches!(self, ApiEffect::FetchTournament { .. })
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            ApiEffect::FetchProfile => "fetch_profile",
            ApiEffect::FetchTournament { .. } => "fetch_tournament",
            ApiEffect::CreateTeam { .. } => "create_team",
            ApiEffect::SearchMembers { .. } => "search_members",
            ApiEffect::AddTeamMembers { .. } => "add_team_members",
        }
    }
}

/// The response to an [`ApiEffect`].
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    /// `None` when the user has not completed a profile yet.
    Profile(Option<Profile>),
    Tournament(Tournament),
    TeamCreated(CreatedTeam),
    Candidates(Vec<Identity>),
    MembersAdded,
}

impl ApiResponse {
    fn variant_name(&self) -> &'static str {
        match self {
            ApiResponse::Profile(_) => "profile",
            ApiResponse::Tournament(_) => "tournament",
            ApiResponse::TeamCreated(_) => "team_created",
            ApiResponse::Candidates(_) => "candidates",
            ApiResponse::MembersAdded => "members_added",
        }
    }

    pub fn into_profile(self) -> Result<Option<Profile>, ApiError> {
        match self {
            ApiResponse::Profile(profile) => Ok(profile),
            other => Err(ApiError::unexpected_response("profile", other.variant_name())),
        }
    }

    pub fn into_tournament(self) -> Result<Tournament, ApiError> {
        match self {
            ApiResponse::Tournament(t) => Ok(t),
            other => Err(ApiError::unexpected_response("tournament", other.variant_name())),
        }
    }

    pub fn into_created_team(self) -> Result<CreatedTeam, ApiError> {
        match self {
            ApiResponse::TeamCreated(team) => Ok(team),
            other => Err(ApiError::unexpected_response("team_created", other.variant_name())),
        }
    }

    pub fn into_candidates(self) -> Result<Vec<Identity>, ApiError> {
        match self {
            ApiResponse::Candidates(candidates) => Ok(candidates),
            other => Err(ApiError::unexpected_response("candidates", other.variant_name())),
        }
    }

    pub fn into_members_added(self) -> Result<(), ApiError> {
        match self {
            ApiResponse::MembersAdded => Ok(()),
            other => Err(ApiError::unexpected_response("members_added", other.variant_name())),
        }
    }
}
