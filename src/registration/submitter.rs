//! Side-effecting registration calls: create the team, then attach its members.
//!
//! The two calls are not transactional. If adding members fails the team stays created,
//! and finalizing may be retried; nothing is rolled back.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, instrument};

use crate::api::{ApiError, ApiErrorKind};
use crate::effects::{ApiEffect, ApiInterpreter, ApiResponse};
use crate::roster::RosterSet;
use crate::types::{AccessToken, CreatedTeam, TeamId, TournamentId, UserId};

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("team name must not be empty")]
    EmptyName,

    /// The client-side guard: one team per workflow instance.
    #[error("team {team_id} was already created")]
    AlreadyCreated { team_id: TeamId },

    #[error("roster has no leader")]
    NoLeader,

    #[error("roster is led by {roster_leader}, but team leader is {team_leader}")]
    LeaderMismatch {
        roster_leader: UserId,
        team_leader: UserId,
    },

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl RegistrationError {
    pub fn kind(&self) -> ApiErrorKind {
        match self {
            RegistrationError::EmptyName
            | RegistrationError::NoLeader
            | RegistrationError::LeaderMismatch { .. } => ApiErrorKind::Validation,
            RegistrationError::AlreadyCreated { .. } => ApiErrorKind::Conflict,
            RegistrationError::Api(e) => e.kind,
        }
    }
}

/// How a finalize completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalizeOutcome {
    /// Leader-only roster; no member call was made.
    SoloRegistered,
    MembersAdded { count: usize },
}

/// Issues the registration calls for one workflow instance.
pub struct RegistrationSubmitter<A> {
    api: Arc<A>,
    token: Option<AccessToken>,
    created: Option<CreatedTeam>,
}

impl<A: ApiInterpreter> RegistrationSubmitter<A> {
    pub fn new(api: Arc<A>, token: Option<AccessToken>) -> Self {
        RegistrationSubmitter {
            api,
            token,
            created: None,
        }
    }

    /// Creates the team. At most one creation succeeds per submitter.
    ///
    /// The name is trimmed before it is sent.
    #[instrument(skip(self, tournament_id), fields(tournament_id = %tournament_id))]
    pub async fn create_team(
        &mut self,
        tournament_id: &TournamentId,
        name: &str,
    ) -> Result<CreatedTeam, RegistrationError> {
        if let Some(team) = &self.created {
            return Err(RegistrationError::AlreadyCreated {
                team_id: team.id.clone(),
            });
        }

        let name = name.trim();
        if name.is_empty() {
            return Err(RegistrationError::EmptyName);
        }

        let effect = ApiEffect::CreateTeam {
            tournament_id: tournament_id.clone(),
            name: name.to_string(),
        };
        let team = self
            .api
            .interpret(effect, self.token.clone())
            .await
            .and_then(ApiResponse::into_created_team)?;

        info!(team_id = %team.id, name = %team.name, "Team created");
        self.created = Some(team.clone());
        Ok(team)
    }

    /// Attaches every non-leader on the roster to the team in one batch.
    #[instrument(skip_all, fields(team_id = %team.id, size = roster.size()))]
    pub async fn finalize(
        &self,
        team: &CreatedTeam,
        roster: &RosterSet,
    ) -> Result<FinalizeOutcome, RegistrationError> {
        let leader = roster.leader().ok_or(RegistrationError::NoLeader)?;
        if leader.user_id != team.leader_id {
            return Err(RegistrationError::LeaderMismatch {
                roster_leader: leader.user_id.clone(),
                team_leader: team.leader_id.clone(),
            });
        }

        if roster.is_leader_only() {
            info!("Solo registration, no members to add");
            return Ok(FinalizeOutcome::SoloRegistered);
        }

        let user_ids = roster.member_ids();
        let count = user_ids.len();
        let effect = ApiEffect::AddTeamMembers {
            team_id: team.id.clone(),
            user_ids,
        };
        self.api
            .interpret(effect, self.token.clone())
            .await
            .and_then(ApiResponse::into_members_added)?;

        info!(count, "Team members added");
        Ok(FinalizeOutcome::MembersAdded { count })
    }

    pub fn created(&self) -> Option<&CreatedTeam> {
        self.created.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MockApi, leader_identity, players, sample_tournament};

    fn submitter(api: &Arc<MockApi>) -> RegistrationSubmitter<MockApi> {
        RegistrationSubmitter::new(Arc::clone(api), Some(AccessToken::new("jwt")))
    }

    fn backend() -> Arc<MockApi> {
        Arc::new(MockApi::backend(
            &leader_identity(),
            None,
            sample_tournament(5),
            players(6),
        ))
    }

    fn roster_with(members: u32) -> RosterSet {
        let mut roster = RosterSet::new(5);
        roster.initialize_with_leader(&leader_identity()).unwrap();
        roster.add_members(&players(members)).unwrap();
        roster
    }

    #[tokio::test]
    async fn second_create_is_a_conflict_without_request() {
        let api = backend();
        let mut submitter = submitter(&api);
        let tournament = TournamentId::new("tour-1");

        let team = submitter.create_team(&tournament, "  Night Owls ").await.unwrap();
        assert_eq!(team.name, "Night Owls");

        let err = submitter.create_team(&tournament, "Night Owls").await.unwrap_err();
        assert_eq!(err.kind(), ApiErrorKind::Conflict);
        assert_eq!(api.count("create_team"), 1);
    }

    #[tokio::test]
    async fn empty_name_is_rejected_locally() {
        let api = backend();
        let mut submitter = submitter(&api);

        let err = submitter
            .create_team(&TournamentId::new("tour-1"), "   ")
            .await
            .unwrap_err();
        assert!(matches!(err, RegistrationError::EmptyName));
        assert_eq!(err.kind(), ApiErrorKind::Validation);
        assert!(api.calls().is_empty());
        assert!(submitter.created().is_none());
    }

    #[tokio::test]
    async fn failed_create_can_be_resubmitted() {
        let api = backend();
        api.fail_next("create_team", ApiError::network("timed out"));
        let mut submitter = submitter(&api);
        let tournament = TournamentId::new("tour-1");

        let err = submitter.create_team(&tournament, "Owls").await.unwrap_err();
        assert_eq!(err.kind(), ApiErrorKind::Network);
        assert!(submitter.created().is_none());

        submitter.create_team(&tournament, "Owls").await.unwrap();
        assert_eq!(api.count("create_team"), 2);
    }

    #[tokio::test]
    async fn solo_roster_skips_member_call() {
        let api = backend();
        let mut submitter = submitter(&api);
        let team = submitter
            .create_team(&TournamentId::new("tour-1"), "Solo")
            .await
            .unwrap();

        let outcome = submitter.finalize(&team, &roster_with(0)).await.unwrap();

        assert_eq!(outcome, FinalizeOutcome::SoloRegistered);
        assert_eq!(api.count("add_team_members"), 0);
    }

    #[tokio::test]
    async fn members_are_added_in_one_batch() {
        let api = backend();
        let mut submitter = submitter(&api);
        let team = submitter
            .create_team(&TournamentId::new("tour-1"), "Owls")
            .await
            .unwrap();

        let outcome = submitter.finalize(&team, &roster_with(3)).await.unwrap();

        assert_eq!(outcome, FinalizeOutcome::MembersAdded { count: 3 });
        let adds: Vec<ApiEffect> = api
            .calls()
            .into_iter()
            .filter(|e| e.name() == "add_team_members")
            .collect();
        assert_eq!(
            adds,
            vec![ApiEffect::AddTeamMembers {
                team_id: TeamId::new("team-1"),
                user_ids: vec!["u-1".into(), "u-2".into(), "u-3".into()],
            }]
        );
    }

    #[tokio::test]
    async fn failed_member_add_leaves_team_created_and_retryable() {
        let api = backend();
        let mut submitter = submitter(&api);
        let team = submitter
            .create_team(&TournamentId::new("tour-1"), "Owls")
            .await
            .unwrap();
        api.fail_next("add_team_members", ApiError::from_status(503, None));

        let err = submitter.finalize(&team, &roster_with(2)).await.unwrap_err();
        assert_eq!(err.kind(), ApiErrorKind::Network);
        assert!(submitter.created().is_some());

        let outcome = submitter.finalize(&team, &roster_with(2)).await.unwrap();
        assert_eq!(outcome, FinalizeOutcome::MembersAdded { count: 2 });
        assert_eq!(api.count("create_team"), 1);
    }

    #[tokio::test]
    async fn roster_led_by_someone_else_is_rejected() {
        let api = backend();
        let mut submitter = submitter(&api);
        let team = submitter
            .create_team(&TournamentId::new("tour-1"), "Owls")
            .await
            .unwrap();

        let mut roster = RosterSet::new(5);
        roster.initialize_with_leader(&players(1)[0]).unwrap();

        let err = submitter.finalize(&team, &roster).await.unwrap_err();
        assert!(matches!(err, RegistrationError::LeaderMismatch { .. }));
        assert_eq!(api.count("add_team_members"), 0);
    }
}
