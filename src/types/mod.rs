//! Core domain types for team registration.
//!
//! Identifiers, identities, sessions, and the backend records the workflow reads.

pub mod identity;
pub mod ids;
pub mod tournament;

pub use identity::{Identity, Profile, Session};
pub use ids::{AccessToken, TeamId, TournamentId, UserId};
pub use tournament::{CreatedTeam, Tournament};
