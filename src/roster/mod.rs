//! Roster assembly.
//!
//! The roster is pure state: it owns no I/O and is mutated only through the operations
//! on [`RosterSet`].

pub mod set;

#[cfg(test)]
mod property_tests;

pub use set::{AddOutcome, RemoveOutcome, Role, RosterEntry, RosterError, RosterSet};
