//! The team formation engine.
//!
//! Orchestrates one registration visit: it owns the roster, the member search, and the
//! submitter, and gates every write action on the active step. All steps can be viewed
//! at any time; only the active one accepts writes.
//!
//! Dropping the engine abandons the visit. Pending searches are cancelled; a team that
//! was already created stays created on the backend.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::api::{ApiError, ApiErrorKind};
use crate::config::SearchConfig;
use crate::effects::{ApiEffect, ApiInterpreter, ApiResponse, Effect, Route};
use crate::registration::{FinalizeOutcome, RegistrationError, RegistrationSubmitter};
use crate::roster::{AddOutcome, RemoveOutcome, RosterEntry, RosterError, RosterSet};
use crate::search::{MemberSearch, SearchOutcome, ToggleOutcome};
use crate::session::SessionState;
use crate::types::{AccessToken, CreatedTeam, Identity, TeamId, Tournament, UserId};

use super::steps::{
    StepEvent, StepStatus, TransitionError, WorkflowStatus, WorkflowStep, next_status,
};

/// Errors from workflow actions.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("not signed in")]
    NotAuthenticated,

    #[error("{step} is not the active step ({status})")]
    StepNotActive {
        step: WorkflowStep,
        status: WorkflowStatus,
    },

    #[error(transparent)]
    Roster(#[from] RosterError),

    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Transition(#[from] TransitionError),
}

impl WorkflowError {
    pub fn kind(&self) -> ApiErrorKind {
        match self {
            WorkflowError::NotAuthenticated => ApiErrorKind::Auth,
            WorkflowError::StepNotActive { .. } | WorkflowError::Transition(_) => {
                ApiErrorKind::Validation
            }
            WorkflowError::Roster(e) => e.kind(),
            WorkflowError::Registration(e) => e.kind(),
            WorkflowError::Api(e) => e.kind,
        }
    }

    /// True for the duplicate-submission guard, which blocks without a message.
    pub fn is_silent(&self) -> bool {
        matches!(
            self,
            WorkflowError::Registration(RegistrationError::AlreadyCreated { .. })
        )
    }

    /// The message shown inline next to the failed action.
    pub fn user_message(&self) -> String {
        match self {
            WorkflowError::Api(e) | WorkflowError::Registration(RegistrationError::Api(e)) => {
                e.message.clone()
            }
            other => other.to_string(),
        }
    }
}

/// What the summary step shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrationSummary {
    pub tournament_name: String,
    pub team_id: TeamId,
    pub team_name: String,
    pub entries: Vec<RosterEntry>,
}

/// One in-memory run of the registration process for a tournament and user.
pub struct TeamFormationEngine<A> {
    tournament: Tournament,
    status: WorkflowStatus,
    viewing: WorkflowStep,
    team_name: String,
    roster: RosterSet,
    search: MemberSearch<A>,
    submitter: RegistrationSubmitter<A>,
    last_error: Option<String>,
}

impl<A: ApiInterpreter + 'static> TeamFormationEngine<A> {
    /// Opens the workflow for a tournament.
    ///
    /// Requires a signed-in session. The tournament is fetched publicly by slug. The
    /// leader is seeded from the profile when one exists, else from the session identity.
    #[instrument(skip(api, session, config))]
    pub async fn load(
        api: Arc<A>,
        session: &SessionState,
        slug: &str,
        config: &SearchConfig,
    ) -> Result<Self, WorkflowError> {
        let (Some(token), Some(leader)) = (session.token().cloned(), session.display_identity())
        else {
            return Err(WorkflowError::NotAuthenticated);
        };

        let tournament = api
            .interpret(
                ApiEffect::FetchTournament {
                    slug: slug.to_string(),
                },
                None,
            )
            .await
            .and_then(ApiResponse::into_tournament)?;

        info!(
            tournament_id = %tournament.id,
            capacity = tournament.team_capacity(),
            "Registration workflow opened"
        );
        Self::new(api, token, leader, tournament, config)
    }

    /// Creates the workflow for an already fetched tournament.
    pub fn new(
        api: Arc<A>,
        token: AccessToken,
        leader: Identity,
        tournament: Tournament,
        config: &SearchConfig,
    ) -> Result<Self, WorkflowError> {
        let mut roster = RosterSet::new(tournament.team_capacity());
        roster.initialize_with_leader(&leader)?;

        Ok(TeamFormationEngine {
            tournament,
            status: WorkflowStatus::default(),
            viewing: WorkflowStep::CreateTeam,
            team_name: String::new(),
            roster,
            search: MemberSearch::new(Arc::clone(&api), config.clone(), Some(token.clone())),
            submitter: RegistrationSubmitter::new(api, Some(token)),
            last_error: None,
        })
    }

    // ─── Navigation ──────────────────────────────────────────────────────────

    /// Switches the inspected step. Always allowed; does not change progress.
    pub fn view_step(&mut self, step: WorkflowStep) {
        self.viewing = step;
    }

    pub fn viewing(&self) -> WorkflowStep {
        self.viewing
    }

    pub fn status(&self) -> WorkflowStatus {
        self.status
    }

    pub fn step_status(&self, step: WorkflowStep) -> StepStatus {
        self.status.step_status(step)
    }

    fn require_active(&self, step: WorkflowStep) -> Result<(), WorkflowError> {
        if self.status.active_step() == Some(step) {
            Ok(())
        } else {
            Err(WorkflowError::StepNotActive {
                step,
                status: self.status,
            })
        }
    }

    /// Records the outcome of a write action: success clears the inline error and failure
    /// sets it, except for the duplicate-submission guard.
    fn record<T>(&mut self, result: Result<T, WorkflowError>) -> Result<T, WorkflowError> {
        match &result {
            Ok(_) => self.last_error = None,
            Err(e) if e.is_silent() => {}
            Err(e) => {
                warn!(error = %e, kind = %e.kind(), "Workflow action failed");
                self.last_error = Some(e.user_message());
            }
        }
        result
    }

    fn advance(&mut self, event: StepEvent) -> Result<(), WorkflowError> {
        self.status = next_status(self.status, event)?;
        if let Some(step) = self.status.active_step() {
            self.viewing = step;
        }
        Ok(())
    }

    // ─── Create Team ─────────────────────────────────────────────────────────

    pub fn set_team_name(&mut self, name: impl Into<String>) -> Result<(), WorkflowError> {
        let result = self.require_active(WorkflowStep::CreateTeam);
        if result.is_ok() {
            self.team_name = name.into();
        }
        self.record(result)
    }

    /// Creates the team and moves on to roster assembly.
    ///
    /// Once a team exists this fails with a conflict before anything else is checked,
    /// and no request is sent.
    pub async fn create_team(&mut self) -> Result<CreatedTeam, WorkflowError> {
        if let Some(team) = self.submitter.created() {
            return Err(WorkflowError::Registration(
                RegistrationError::AlreadyCreated {
                    team_id: team.id.clone(),
                },
            ));
        }

        let result = match self.require_active(WorkflowStep::CreateTeam) {
            Ok(()) => self
                .submitter
                .create_team(&self.tournament.id, &self.team_name)
                .await
                .map_err(WorkflowError::from),
            Err(e) => Err(e),
        };
        let result = match result {
            Ok(team) => self.advance(StepEvent::TeamCreated).map(|()| team),
            Err(e) => Err(e),
        };
        self.record(result)
    }

    // ─── Assemble Roster ─────────────────────────────────────────────────────

    /// Replaces the search query; the lookup fires after the quiet period.
    pub fn set_search_query(&mut self, query: impl Into<String>) -> Result<(), WorkflowError> {
        let result = self.require_active(WorkflowStep::AssembleRoster);
        if result.is_ok() {
            self.search.set_query(query);
        }
        self.record(result)
    }

    /// Waits for the lookup of the current query to report back.
    pub async fn settle_search(&mut self) -> Option<SearchOutcome> {
        self.search.settle().await
    }

    /// Applies lookup responses that have already arrived.
    pub fn poll_search(&mut self) -> Vec<SearchOutcome> {
        self.search.drain_ready()
    }

    /// Candidates for display: roster members hidden, selected first.
    pub fn visible_candidates(&self) -> Vec<Identity> {
        self.search.visible_results(&self.roster)
    }

    pub fn search_error(&self) -> Option<&str> {
        self.search.error()
    }

    /// Selects or deselects a visible candidate. Roster members and users outside the
    /// current results come back as [`ToggleOutcome::Unavailable`].
    pub fn toggle_candidate(&mut self, candidate: &Identity) -> Result<ToggleOutcome, WorkflowError> {
        let result = self
            .require_active(WorkflowStep::AssembleRoster)
            .map(|()| self.search.toggle(candidate, &self.roster));
        self.record(result)
    }

    /// Adds the selected candidates to the roster and clears the search.
    ///
    /// A batch that would overflow the roster is rejected as a whole; the outcome reports
    /// it and the inline error explains how many slots are left.
    pub fn confirm_selection(&mut self) -> Result<AddOutcome, WorkflowError> {
        let result = self
            .require_active(WorkflowStep::AssembleRoster)
            .and_then(|()| {
                self.search
                    .confirm(&mut self.roster)
                    .map_err(WorkflowError::from)
            });
        let result = self.record(result);

        if let Ok(outcome) = &result
            && outcome.is_rejected()
        {
            let remaining = self.roster.remaining_capacity();
            self.last_error = Some(format!(
                "only {} more member{} can join this team",
                remaining,
                if remaining == 1 { "" } else { "s" }
            ));
        }
        result
    }

    pub fn remove_member(&mut self, user_id: &UserId) -> Result<RemoveOutcome, WorkflowError> {
        let result = self
            .require_active(WorkflowStep::AssembleRoster)
            .map(|()| self.roster.remove_member(user_id));
        self.record(result)
    }

    /// Moves on to the summary. The roster need not be full.
    pub fn continue_to_summary(&mut self) -> Result<(), WorkflowError> {
        let result = self
            .require_active(WorkflowStep::AssembleRoster)
            .and_then(|()| self.advance(StepEvent::ContinueToSummary));
        if result.is_ok() {
            self.search.clear();
        }
        self.record(result)
    }

    // ─── Finalize ────────────────────────────────────────────────────────────

    /// Attaches the roster to the team and finishes the workflow.
    ///
    /// On success the returned effects tell the application root where to navigate. On
    /// failure the workflow stays on the summary step and finalize may be retried.
    pub async fn finalize(&mut self) -> Result<Vec<Effect>, WorkflowError> {
        let result = match self.require_active(WorkflowStep::FinalizeSummary) {
            Ok(()) => self.finalize_team().await,
            Err(e) => Err(e),
        };
        let result = match result {
            Ok(outcome) => self.advance(StepEvent::RegistrationFinalized).map(|()| {
                info!(?outcome, slug = %self.tournament.slug, "Registration finalized");
                vec![Effect::Navigate(Route::Tournament {
                    slug: self.tournament.slug.clone(),
                })]
            }),
            Err(e) => Err(e),
        };
        self.record(result)
    }

    async fn finalize_team(&self) -> Result<FinalizeOutcome, WorkflowError> {
        let team = self.submitter.created().ok_or(TransitionError {
            from: self.status,
            event: StepEvent::RegistrationFinalized,
        })?;
        Ok(self.submitter.finalize(team, &self.roster).await?)
    }

    // ─── Inspection ──────────────────────────────────────────────────────────

    /// The summary, available once the team has an id.
    pub fn summary(&self) -> Option<RegistrationSummary> {
        let team = self.submitter.created()?;
        Some(RegistrationSummary {
            tournament_name: self.tournament.name.clone(),
            team_id: team.id.clone(),
            team_name: team.name.clone(),
            entries: self.roster.entries().to_vec(),
        })
    }

    pub fn team(&self) -> Option<&CreatedTeam> {
        self.submitter.created()
    }

    pub fn team_name(&self) -> &str {
        &self.team_name
    }

    pub fn roster(&self) -> &RosterSet {
        &self.roster
    }

    pub fn tournament(&self) -> &Tournament {
        &self.tournament
    }

    pub fn search(&self) -> &MemberSearch<A> {
        &self.search
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

impl<A> std::fmt::Debug for TeamFormationEngine<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TeamFormationEngine")
            .field("tournament", &self.tournament.slug)
            .field("status", &self.status)
            .field("viewing", &self.viewing)
            .field("roster_size", &self.roster.size())
            .field("last_error", &self.last_error)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod engine_tests;
