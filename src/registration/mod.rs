//! Team creation and member attachment against the backend.

pub mod submitter;

pub use submitter::{FinalizeOutcome, RegistrationError, RegistrationSubmitter};
