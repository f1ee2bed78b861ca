//! The roster being assembled for a team.
//!
//! Invariants held by every operation:
//! - entry 0 is the leader, and it is the only leader
//! - no user id appears twice
//! - the size never exceeds the capacity

use serde::Serialize;
use thiserror::Error;

use crate::api::ApiErrorKind;
use crate::types::{Identity, UserId};

/// A roster member's role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Leader,
    Member,
}

/// One member of the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterEntry {
    pub user_id: UserId,
    pub display_name: String,
    pub avatar_ref: Option<String>,
    pub role: Role,
}

impl RosterEntry {
    fn from_identity(identity: &Identity, role: Role) -> Self {
        RosterEntry {
            user_id: identity.id.clone(),
            display_name: identity.display_name.clone(),
            avatar_ref: identity.avatar_ref.clone(),
            role,
        }
    }

    pub fn is_leader(&self) -> bool {
        self.role == Role::Leader
    }
}

/// Result of a batch add.
///
/// Either the whole batch of new candidates is accepted, or all of them are rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddOutcome {
    /// Candidates appended to the roster.
    pub accepted: usize,

    /// New candidates refused because the batch would exceed capacity.
    pub rejected: usize,

    /// Candidates skipped because they were already on the roster or repeated in the batch.
    pub duplicates: usize,
}

impl AddOutcome {
    pub fn is_rejected(&self) -> bool {
        self.rejected > 0
    }
}

/// Result of removing a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    /// The leader cannot be removed; the roster is unchanged.
    LeaderProtected,
    NotPresent,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterError {
    #[error("roster is already led by {existing}, cannot seed {attempted}")]
    LeaderMismatch { existing: UserId, attempted: UserId },

    #[error("roster has no leader yet")]
    LeaderNotSeeded,
}

impl RosterError {
    pub fn kind(&self) -> ApiErrorKind {
        ApiErrorKind::Validation
    }
}

/// An ordered, unique-by-user set of team members with a fixed capacity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterSet {
    entries: Vec<RosterEntry>,
    capacity: usize,
}

impl RosterSet {
    /// Creates an empty roster. A capacity below 1 is raised to 1 for the leader.
    pub fn new(capacity: usize) -> Self {
        RosterSet {
            entries: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Seeds the leader.
    ///
    /// Seeding again with the same identity is a no-op.
    pub fn initialize_with_leader(&mut self, identity: &Identity) -> Result<(), RosterError> {
        match self.entries.first() {
            Some(leader) if leader.user_id == identity.id => Ok(()),
            Some(leader) => Err(RosterError::LeaderMismatch {
                existing: leader.user_id.clone(),
                attempted: identity.id.clone(),
            }),
            None => {
                self.entries
                    .push(RosterEntry::from_identity(identity, Role::Leader));
                Ok(())
            }
        }
    }

    /// Appends every candidate not already present, or none of them if the new ones
    /// would not all fit.
    pub fn add_members(&mut self, candidates: &[Identity]) -> Result<AddOutcome, RosterError> {
        if self.entries.is_empty() {
            return Err(RosterError::LeaderNotSeeded);
        }

        let mut fresh: Vec<&Identity> = Vec::with_capacity(candidates.len());
        let mut duplicates = 0;
        for candidate in candidates {
            if self.contains(&candidate.id) || fresh.iter().any(|c| c.id == candidate.id) {
                duplicates += 1;
            } else {
                fresh.push(candidate);
            }
        }

        if fresh.len() > self.remaining_capacity() {
            return Ok(AddOutcome {
                accepted: 0,
                rejected: fresh.len(),
                duplicates,
            });
        }

        let accepted = fresh.len();
        self.entries.extend(
            fresh
                .into_iter()
                .map(|c| RosterEntry::from_identity(c, Role::Member)),
        );
        Ok(AddOutcome {
            accepted,
            rejected: 0,
            duplicates,
        })
    }

    pub fn remove_member(&mut self, user_id: &UserId) -> RemoveOutcome {
        match self.entries.iter().position(|e| &e.user_id == user_id) {
            Some(0) => RemoveOutcome::LeaderProtected,
            Some(index) => {
                self.entries.remove(index);
                RemoveOutcome::Removed
            }
            None => RemoveOutcome::NotPresent,
        }
    }

    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.size() >= self.capacity
    }

    pub fn remaining_capacity(&self) -> usize {
        self.capacity.saturating_sub(self.size())
    }

    /// True when only the leader is on the roster (or nobody, before seeding).
    pub fn is_leader_only(&self) -> bool {
        self.size() <= 1
    }

    pub fn contains(&self, user_id: &UserId) -> bool {
        self.entries.iter().any(|e| &e.user_id == user_id)
    }

    pub fn leader(&self) -> Option<&RosterEntry> {
        self.entries.first()
    }

    pub fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }

    /// Non-leader user ids in roster order.
    pub fn member_ids(&self) -> Vec<UserId> {
        self.entries
            .iter()
            .skip(1)
            .map(|e| e.user_id.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(n: u32) -> Identity {
        Identity::new(format!("u-{}", n), format!("player{}", n))
    }

    fn seeded(capacity: usize) -> RosterSet {
        let mut roster = RosterSet::new(capacity);
        roster.initialize_with_leader(&user(0)).unwrap();
        roster
    }

    #[test]
    fn leader_is_seeded_at_index_zero() {
        let roster = seeded(3);
        assert_eq!(roster.size(), 1);
        let leader = roster.leader().unwrap();
        assert_eq!(leader.user_id, UserId::new("u-0"));
        assert_eq!(leader.role, Role::Leader);
        assert!(roster.is_leader_only());
    }

    #[test]
    fn seeding_twice_with_same_identity_is_noop() {
        let mut roster = seeded(3);
        let before = roster.clone();
        roster.initialize_with_leader(&user(0)).unwrap();
        assert_eq!(roster, before);
    }

    #[test]
    fn seeding_with_another_identity_fails() {
        let mut roster = seeded(3);
        let err = roster.initialize_with_leader(&user(7)).unwrap_err();
        assert_eq!(
            err,
            RosterError::LeaderMismatch {
                existing: UserId::new("u-0"),
                attempted: UserId::new("u-7"),
            }
        );
        assert_eq!(err.kind(), ApiErrorKind::Validation);
        assert_eq!(roster.size(), 1);
    }

    #[test]
    fn adding_before_seeding_fails() {
        let mut roster = RosterSet::new(3);
        assert_eq!(
            roster.add_members(&[user(1)]),
            Err(RosterError::LeaderNotSeeded)
        );
    }

    #[test]
    fn fill_then_reject_whole_batch() {
        let mut roster = seeded(5);

        let outcome = roster
            .add_members(&[user(1), user(2), user(3), user(4)])
            .unwrap();
        assert_eq!(outcome.accepted, 4);
        assert_eq!(roster.size(), 5);
        assert!(roster.is_full());

        let outcome = roster.add_members(&[user(5)]).unwrap();
        assert_eq!(outcome.accepted, 0);
        assert_eq!(outcome.rejected, 1);
        assert!(outcome.is_rejected());
        assert_eq!(roster.size(), 5);
    }

    #[test]
    fn oversized_batch_is_rejected_entirely() {
        let mut roster = seeded(3);
        let outcome = roster.add_members(&[user(1), user(2), user(3)]).unwrap();
        assert_eq!(
            outcome,
            AddOutcome {
                accepted: 0,
                rejected: 3,
                duplicates: 0
            }
        );
        assert!(roster.is_leader_only());
    }

    #[test]
    fn duplicates_do_not_count_against_capacity() {
        let mut roster = seeded(3);
        roster.add_members(&[user(1)]).unwrap();

        let outcome = roster
            .add_members(&[user(0), user(1), user(2), user(2)])
            .unwrap();
        assert_eq!(outcome.accepted, 1);
        assert_eq!(outcome.duplicates, 3);
        assert_eq!(roster.member_ids(), vec![UserId::new("u-1"), UserId::new("u-2")]);
    }

    #[test]
    fn leader_cannot_be_removed() {
        let mut roster = seeded(3);
        roster.add_members(&[user(1)]).unwrap();

        assert_eq!(
            roster.remove_member(&UserId::new("u-0")),
            RemoveOutcome::LeaderProtected
        );
        assert_eq!(roster.size(), 2);
        assert_eq!(roster.remove_member(&UserId::new("u-1")), RemoveOutcome::Removed);
        assert_eq!(
            roster.remove_member(&UserId::new("u-1")),
            RemoveOutcome::NotPresent
        );
        assert!(roster.is_leader_only());
    }

    #[test]
    fn zero_capacity_still_fits_leader() {
        let mut roster = RosterSet::new(0);
        roster.initialize_with_leader(&user(0)).unwrap();
        assert_eq!(roster.capacity(), 1);
        assert!(roster.is_full());
        assert_eq!(roster.remaining_capacity(), 0);
    }

    #[test]
    fn removal_frees_capacity() {
        let mut roster = seeded(2);
        roster.add_members(&[user(1)]).unwrap();
        assert!(roster.add_members(&[user(2)]).unwrap().is_rejected());

        roster.remove_member(&UserId::new("u-1"));
        assert_eq!(roster.add_members(&[user(2)]).unwrap().accepted, 1);
        assert_eq!(roster.entries()[1].display_name, "player2");
    }
}
