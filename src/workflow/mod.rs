//! The three-step team formation workflow.
//!
//! - **CreateTeam**: name the team; the backend assigns it an id
//! - **AssembleRoster**: search for teammates and add them to the roster
//! - **FinalizeSummary**: review the roster and attach it to the team
//!
//! [`steps`] holds the pure transition function; [`engine`] wires it to the roster,
//! search, and submitter.
//!
//! # Key Invariants
//!
//! 1. **Single creation**: a workflow instance creates at most one team. A second
//!    attempt is a conflict and sends no request.
//!
//! 2. **Active-step writes**: only the active step accepts write actions; completed
//!    steps are inspect-only.
//!
//! 3. **Summary needs a team**: FinalizeSummary is reachable only after the team has an
//!    id.

pub mod engine;
pub mod steps;

pub use engine::{RegistrationSummary, TeamFormationEngine, WorkflowError};
pub use steps::{StepEvent, StepStatus, TransitionError, WorkflowStatus, WorkflowStep, next_status};
