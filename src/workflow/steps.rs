//! Step transitions for the team formation workflow.
//!
//! Pure functions for computing the next workflow status from the current status and a
//! step event. Steps advance strictly in order:
//! CreateTeam -> AssembleRoster -> FinalizeSummary -> Finished.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// One of the three workflow steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStep {
    CreateTeam,
    AssembleRoster,
    FinalizeSummary,
}

impl WorkflowStep {
    pub const ALL: [WorkflowStep; 3] = [
        WorkflowStep::CreateTeam,
        WorkflowStep::AssembleRoster,
        WorkflowStep::FinalizeSummary,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            WorkflowStep::CreateTeam => "Create team",
            WorkflowStep::AssembleRoster => "Add members",
            WorkflowStep::FinalizeSummary => "Summary",
        }
    }
}

impl fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Where the workflow stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "status", content = "step", rename_all = "snake_case")]
pub enum WorkflowStatus {
    InProgress(WorkflowStep),
    /// Registration completed; no step accepts writes.
    Finished,
}

impl Default for WorkflowStatus {
    fn default() -> Self {
        WorkflowStatus::InProgress(WorkflowStep::CreateTeam)
    }
}

/// How a step presents relative to the active one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// Done; inspect-only.
    Completed,
    /// The only step accepting writes.
    Active,
    /// Not reached yet.
    Locked,
}

impl WorkflowStatus {
    pub fn active_step(&self) -> Option<WorkflowStep> {
        match self {
            WorkflowStatus::InProgress(step) => Some(*step),
            WorkflowStatus::Finished => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, WorkflowStatus::Finished)
    }

    pub fn step_status(&self, step: WorkflowStep) -> StepStatus {
        match self {
            WorkflowStatus::Finished => StepStatus::Completed,
            WorkflowStatus::InProgress(active) if step < *active => StepStatus::Completed,
            WorkflowStatus::InProgress(active) if step == *active => StepStatus::Active,
            WorkflowStatus::InProgress(_) => StepStatus::Locked,
        }
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowStatus::InProgress(step) => write!(f, "{}", step),
            WorkflowStatus::Finished => f.write_str("Finished"),
        }
    }
}

/// Something that happened in the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepEvent {
    /// The backend created the team.
    TeamCreated,
    /// The user chose to move on from roster assembly.
    ContinueToSummary,
    /// Members were attached (or the roster was solo).
    RegistrationFinalized,
}

/// Error returned when a step transition is invalid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition from {from} on {event:?}")]
pub struct TransitionError {
    pub from: WorkflowStatus,
    pub event: StepEvent,
}

/// Computes the next status.
///
/// Each event is valid from exactly one step; everything else is an error and leaves
/// the caller's status untouched.
pub fn next_status(
    current: WorkflowStatus,
    event: StepEvent,
) -> Result<WorkflowStatus, TransitionError> {
    use WorkflowStep::*;

    match (current, event) {
        (WorkflowStatus::InProgress(CreateTeam), StepEvent::TeamCreated) => {
            Ok(WorkflowStatus::InProgress(AssembleRoster))
        }
        (WorkflowStatus::InProgress(AssembleRoster), StepEvent::ContinueToSummary) => {
            Ok(WorkflowStatus::InProgress(FinalizeSummary))
        }
        (WorkflowStatus::InProgress(FinalizeSummary), StepEvent::RegistrationFinalized) => {
            Ok(WorkflowStatus::Finished)
        }
        (from, event) => Err(TransitionError { from, event }),
    }
}
