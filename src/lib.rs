//! Team Registration - a client for forming a team and registering it for a tournament.
//!
//! This library provides the session bootstrap, the roster and member search, and the
//! three-step registration workflow, running against the tournament backend's REST API.

pub mod api;
pub mod config;
pub mod effects;
pub mod registration;
pub mod roster;
pub mod search;
pub mod session;
pub mod types;
pub mod workflow;

#[cfg(test)]
mod test_utils;
