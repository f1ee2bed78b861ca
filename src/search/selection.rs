//! Candidate selection and result ordering.
//!
//! Pure helpers used by [`MemberSearch`](super::MemberSearch): which candidates the user
//! has picked, and how the result list is presented.

use crate::roster::RosterSet;
use crate::types::{Identity, UserId};

/// Result of toggling a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Selected,
    Deselected,
    /// Selecting would exceed the roster's remaining capacity; nothing changed.
    LimitReached { remaining: usize },
    /// The candidate is already on the roster or not among the current results.
    Unavailable,
}

/// The candidates picked in the current search, in the order they were picked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    picked: Vec<Identity>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects an unselected candidate, or deselects a selected one.
    ///
    /// Deselecting is always allowed. Selecting is refused once the selection already
    /// fills the `remaining` roster slots.
    pub fn toggle(&mut self, candidate: &Identity, remaining: usize) -> ToggleOutcome {
        if let Some(index) = self.picked.iter().position(|c| c.id == candidate.id) {
            self.picked.remove(index);
            return ToggleOutcome::Deselected;
        }
        if self.picked.len() >= remaining {
            return ToggleOutcome::LimitReached { remaining };
        }
        self.picked.push(candidate.clone());
        ToggleOutcome::Selected
    }

    pub fn is_selected(&self, user_id: &UserId) -> bool {
        self.picked.iter().any(|c| &c.id == user_id)
    }

    pub fn picked(&self) -> &[Identity] {
        &self.picked
    }

    pub fn len(&self) -> usize {
        self.picked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.picked.is_empty()
    }

    /// Empties the selection, returning what was picked.
    pub fn take(&mut self) -> Vec<Identity> {
        std::mem::take(&mut self.picked)
    }
}

/// Orders search results for display.
///
/// Candidates already on the roster are dropped. The rest are stably partitioned:
/// selected candidates first, then the others, each group keeping the order the backend
/// returned.
pub fn visible_results(
    results: &[Identity],
    roster: &RosterSet,
    selection: &Selection,
) -> Vec<Identity> {
    let (selected, unselected): (Vec<&Identity>, Vec<&Identity>) = results
        .iter()
        .filter(|c| !roster.contains(&c.id))
        .partition(|c| selection.is_selected(&c.id));

    selected.into_iter().chain(unselected).cloned().collect()
}
