//! Shared test utilities: arbitrary generators for property-based testing, fixtures,
//! and a recording mock of the backend.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use proptest::prelude::*;

use crate::api::ApiError;
use crate::effects::{ApiEffect, ApiInterpreter, ApiResponse};
use crate::types::{
    AccessToken, CreatedTeam, Identity, Profile, Session, TeamId, Tournament, TournamentId, UserId,
};
use crate::workflow::{StepEvent, WorkflowStatus, WorkflowStep};

// ─── Strategies ───────────────────────────────────────────────────────────────

/// User ids drawn from a small pool so that collisions actually happen.
pub fn arb_user_id() -> impl Strategy<Value = UserId> {
    (0u8..16).prop_map(|n| UserId::new(format!("u-{}", n)))
}

pub fn arb_identity() -> impl Strategy<Value = Identity> {
    (arb_user_id(), "[a-z]{3,10}", prop::option::of("https://cdn/[a-z]{4}\\.png"))
        .prop_map(|(id, name, avatar)| Identity {
            id,
            display_name: name,
            avatar_ref: avatar,
        })
}

/// One step of a random roster workload.
#[derive(Debug, Clone)]
pub enum RosterOp {
    Add(Vec<Identity>),
    Remove(UserId),
    RemoveLeader,
    Reseed,
}

pub fn arb_roster_op() -> impl Strategy<Value = RosterOp> {
    prop_oneof![
        4 => prop::collection::vec(arb_identity(), 0..6).prop_map(RosterOp::Add),
        2 => arb_user_id().prop_map(RosterOp::Remove),
        1 => Just(RosterOp::RemoveLeader),
        1 => Just(RosterOp::Reseed),
    ]
}

pub fn arb_workflow_step() -> impl Strategy<Value = WorkflowStep> {
    prop_oneof![
        Just(WorkflowStep::CreateTeam),
        Just(WorkflowStep::AssembleRoster),
        Just(WorkflowStep::FinalizeSummary),
    ]
}

pub fn arb_workflow_status() -> impl Strategy<Value = WorkflowStatus> {
    prop_oneof![
        3 => arb_workflow_step().prop_map(WorkflowStatus::InProgress),
        1 => Just(WorkflowStatus::Finished),
    ]
}

pub fn arb_step_event() -> impl Strategy<Value = StepEvent> {
    prop_oneof![
        Just(StepEvent::TeamCreated),
        Just(StepEvent::ContinueToSummary),
        Just(StepEvent::RegistrationFinalized),
    ]
}

// ─── Fixtures ─────────────────────────────────────────────────────────────────

pub fn leader_identity() -> Identity {
    Identity::new("leader-1", "captain")
}

pub fn session_for(identity: &Identity) -> Session {
    Session::new(
        AccessToken::new(format!("jwt-{}", identity.id)),
        identity.clone(),
    )
}

pub fn profile_for(identity: &Identity) -> Profile {
    Profile {
        id: identity.id.clone(),
        username: identity.display_name.clone(),
        full_name: None,
        photo_url: identity.avatar_ref.clone(),
        game_ids: Default::default(),
        social_links: Default::default(),
    }
}

pub fn sample_tournament(max_team_size: u32) -> Tournament {
    Tournament {
        id: TournamentId::new("tour-1"),
        slug: "spring-cup".to_string(),
        name: "Spring Cup".to_string(),
        max_team_size: Some(max_team_size),
        max_teams: Some(16),
        start_date: None,
        game: Some("Valorant".to_string()),
        description: None,
        image_url: None,
    }
}

/// Users `player1..=playerN` with ids `u-1..=u-N`.
pub fn players(n: u32) -> Vec<Identity> {
    (1..=n)
        .map(|i| Identity::new(format!("u-{}", i), format!("player{}", i)))
        .collect()
}

// ─── Mock Backend ─────────────────────────────────────────────────────────────

type Responder = Box<dyn Fn(&ApiEffect) -> Result<ApiResponse, ApiError> + Send + Sync>;
type Delay = Box<dyn Fn(&ApiEffect) -> Duration + Send + Sync>;

/// A recording `ApiInterpreter`.
///
/// Every effect is logged with the token it was sent with. Failures can be queued per
/// effect name with [`fail_next`](Self::fail_next); otherwise the responder answers.
pub struct MockApi {
    responder: Responder,
    delay: Delay,
    calls: Mutex<Vec<(ApiEffect, Option<AccessToken>)>>,
    failures: Mutex<HashMap<&'static str, VecDeque<ApiError>>>,
}

impl MockApi {
    pub fn new(
        responder: impl Fn(&ApiEffect) -> Result<ApiResponse, ApiError> + Send + Sync + 'static,
    ) -> Self {
        MockApi {
            responder: Box::new(responder),
            delay: Box::new(|_| Duration::ZERO),
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
        }
    }

    /// Answers searches from a user directory by case-insensitive username substring.
    pub fn directory(users: Vec<Identity>) -> Self {
        Self::new(move |effect| match effect {
            ApiEffect::SearchMembers { query } => Ok(ApiResponse::Candidates(search(&users, query))),
            other => Err(ApiError::network(format!("unexpected effect: {:?}", other))),
        })
    }

    /// A well-behaved backend for the whole registration flow.
    pub fn backend(
        leader: &Identity,
        profile: Option<Profile>,
        tournament: Tournament,
        users: Vec<Identity>,
    ) -> Self {
        let leader_id = leader.id.clone();
        Self::new(move |effect| match effect {
            ApiEffect::FetchProfile => Ok(ApiResponse::Profile(profile.clone())),
            ApiEffect::FetchTournament { slug } if *slug == tournament.slug => {
                Ok(ApiResponse::Tournament(tournament.clone()))
            }
            ApiEffect::FetchTournament { slug } => Err(ApiError::from_status(
                404,
                Some(format!("tournament {:?} not found", slug)),
            )),
            ApiEffect::CreateTeam {
                tournament_id,
                name,
            } => Ok(ApiResponse::TeamCreated(CreatedTeam {
                id: TeamId::new("team-1"),
                name: name.clone(),
                tournament_id: tournament_id.clone(),
                leader_id: leader_id.clone(),
                slug: None,
            })),
            ApiEffect::SearchMembers { query } => Ok(ApiResponse::Candidates(search(&users, query))),
            ApiEffect::AddTeamMembers { .. } => Ok(ApiResponse::MembersAdded),
        })
    }

    pub fn with_delay(
        mut self,
        delay: impl Fn(&ApiEffect) -> Duration + Send + Sync + 'static,
    ) -> Self {
        self.delay = Box::new(delay);
        self
    }

    /// Delays search responses by a per-query amount.
    pub fn with_search_delay(self, delay: impl Fn(&str) -> Duration + Send + Sync + 'static) -> Self {
        self.with_delay(move |effect| match effect {
            ApiEffect::SearchMembers { query } => delay(query),
            _ => Duration::ZERO,
        })
    }

    /// Makes the next call of the named effect fail with `error`.
    pub fn fail_next(&self, effect_name: &'static str, error: ApiError) {
        self.failures
            .lock()
            .unwrap()
            .entry(effect_name)
            .or_default()
            .push_back(error);
    }

    pub fn calls(&self) -> Vec<ApiEffect> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(e, _)| e.clone())
            .collect()
    }

    /// Raw tokens in call order.
    pub fn tokens(&self) -> Vec<Option<String>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, t)| t.as_ref().map(|t| t.as_str().to_string()))
            .collect()
    }

    pub fn count(&self, effect_name: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(e, _)| e.name() == effect_name)
            .count()
    }

    pub fn search_queries(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|e| match e {
                ApiEffect::SearchMembers { query } => Some(query),
                _ => None,
            })
            .collect()
    }
}

fn search(users: &[Identity], query: &str) -> Vec<Identity> {
    let needle = query.to_lowercase();
    users
        .iter()
        .filter(|u| u.display_name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

impl ApiInterpreter for MockApi {
    async fn interpret(
        &self,
        effect: ApiEffect,
        token: Option<AccessToken>,
    ) -> Result<ApiResponse, ApiError> {
        let token = token.filter(|t| !t.is_empty());
        if effect.requires_auth() && token.is_none() {
            return Err(ApiError::auth("not signed in"));
        }

        self.calls
            .lock()
            .unwrap()
            .push((effect.clone(), token));

        let delay = (self.delay)(&effect);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let queued = self
            .failures
            .lock()
            .unwrap()
            .get_mut(effect.name())
            .and_then(|q| q.pop_front());
        match queued {
            Some(error) => Err(error),
            None => (self.responder)(&effect),
        }
    }
}
