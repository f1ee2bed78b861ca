//! Property-based tests for roster invariants.
//!
//! Random sequences of adds and removes are applied to a seeded roster; after every
//! step the leader must sit alone at index 0, ids must be unique, and the size must
//! stay within capacity.

use std::collections::HashSet;

use proptest::prelude::*;

use crate::test_utils::{RosterOp, arb_identity, arb_roster_op};
use crate::types::UserId;

use super::set::{RemoveOutcome, Role, RosterSet};

fn assert_invariants(roster: &RosterSet, leader: &UserId) -> Result<(), TestCaseError> {
    prop_assert!(roster.size() <= roster.capacity());

    let entries = roster.entries();
    prop_assert_eq!(&entries[0].user_id, leader);
    prop_assert_eq!(entries[0].role, Role::Leader);
    prop_assert!(entries[1..].iter().all(|e| e.role == Role::Member));

    let unique: HashSet<&UserId> = entries.iter().map(|e| &e.user_id).collect();
    prop_assert_eq!(unique.len(), entries.len());
    Ok(())
}

proptest! {
    #[test]
    fn invariants_hold_for_any_operation_sequence(
        capacity in 1usize..8,
        leader in arb_identity(),
        ops in prop::collection::vec(arb_roster_op(), 0..30),
    ) {
        let mut roster = RosterSet::new(capacity);
        roster.initialize_with_leader(&leader).unwrap();

        for op in ops {
            match op {
                RosterOp::Add(batch) => {
                    let before = roster.size();
                    let outcome = roster.add_members(&batch).unwrap();
                    prop_assert_eq!(outcome.accepted + outcome.rejected + outcome.duplicates, batch.len());
                    prop_assert!(outcome.accepted == 0 || outcome.rejected == 0);
                    prop_assert_eq!(roster.size(), before + outcome.accepted);
                }
                RosterOp::Remove(id) => {
                    let outcome = roster.remove_member(&id);
                    if id == leader.id {
                        prop_assert_eq!(outcome, RemoveOutcome::LeaderProtected);
                    }
                }
                RosterOp::RemoveLeader => {
                    prop_assert_eq!(roster.remove_member(&leader.id), RemoveOutcome::LeaderProtected);
                }
                RosterOp::Reseed => {
                    let before = roster.clone();
                    roster.initialize_with_leader(&leader).unwrap();
                    prop_assert_eq!(&roster, &before);
                }
            }
            assert_invariants(&roster, &leader.id)?;
        }
    }

    #[test]
    fn member_ids_exclude_leader(
        leader in arb_identity(),
        batch in prop::collection::vec(arb_identity(), 0..6),
    ) {
        let mut roster = RosterSet::new(10);
        roster.initialize_with_leader(&leader).unwrap();
        roster.add_members(&batch).unwrap();

        let ids = roster.member_ids();
        prop_assert_eq!(ids.len(), roster.size() - 1);
        prop_assert!(!ids.contains(&leader.id));
    }
}
