use crate::types::{Address, Hash32};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Running vote count for a changing epoch.
///
/// Votes are tallied per proposed hash, but a voter is counted at most once
/// per epoch id: the `voters` set spans every hash, so a second vote by the
/// same identity (even for a different hash) is a duplicate.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VoteTally {
    per_hash: BTreeMap<Hash32, u64>,
    voters: BTreeSet<Address>,
}

impl VoteTally {
    pub fn has_voted(&self, voter: &Address) -> bool {
        self.voters.contains(voter)
    }

    /// Record a vote, returning the updated count for `hash`, or `None` if
    /// this voter was already counted for any hash.
    pub fn record(&mut self, voter: Address, hash: Hash32) -> Option<u64> {
        if !self.voters.insert(voter) {
            return None;
        }
        let n = self.per_hash.entry(hash).or_insert(0);
        *n += 1;
        Some(*n)
    }

    pub fn voted_for(&self, hash: &Hash32) -> u64 {
        self.per_hash.get(hash).copied().unwrap_or(0)
    }

    pub fn total_voters(&self) -> u64 {
        self.voters.len() as u64
    }
}

/// Supermajority test: more than two thirds of the current group, with
/// integer floor semantics (group of 4 needs 3; group of 6 needs 5).
pub fn quorum_reached(voted: u64, group_size: u64) -> bool {
    voted > group_size * 2 / 3
}
