//! Member search: debounced remote lookup of candidate teammates.

pub mod selection;
pub mod service;

pub use selection::{Selection, ToggleOutcome, visible_results};
pub use service::{MemberSearch, SearchOutcome};
