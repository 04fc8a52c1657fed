use crate::consensus::quorum::VoteTally;
use crate::types::Epoch;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The in-flight proposal: an unconfirmed epoch plus its running tally.
/// Held as one value so a proposal without a tally is unrepresentable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChangingEpoch {
    pub epoch: Epoch,
    pub tally: VoteTally,
}

/// Epoch state container: the active epoch, at most one changing epoch, and
/// an append-only archive of superseded epochs keyed by id.
///
/// No consensus rules live here; the epoch manager is the only mutator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EpochStore {
    active: Epoch,
    changing: Option<ChangingEpoch>,
    history: BTreeMap<u64, Epoch>,
}

impl EpochStore {
    pub fn new(genesis: Epoch) -> Self {
        Self { active: genesis, changing: None, history: BTreeMap::new() }
    }

    pub fn active(&self) -> &Epoch {
        &self.active
    }

    pub fn changing(&self) -> Option<&ChangingEpoch> {
        self.changing.as_ref()
    }

    pub fn changing_mut(&mut self) -> Option<&mut ChangingEpoch> {
        self.changing.as_mut()
    }

    /// Look up an epoch by id: the active epoch or any archived one.
    pub fn get(&self, id: u64) -> Option<&Epoch> {
        if self.active.id == id {
            Some(&self.active)
        } else {
            self.history.get(&id)
        }
    }

    /// Replace the active epoch, returning the previous one so the caller
    /// can archive it.
    pub fn set_active(&mut self, epoch: Epoch) -> Epoch {
        std::mem::replace(&mut self.active, epoch)
    }

    /// Install an unconfirmed epoch with an empty tally.
    pub fn set_changing(&mut self, epoch: Epoch) {
        self.changing = Some(ChangingEpoch { epoch, tally: VoteTally::default() });
    }

    pub fn clear_changing(&mut self) -> Option<ChangingEpoch> {
        self.changing.take()
    }

    pub fn archive(&mut self, epoch: Epoch) {
        self.history.insert(epoch.id, epoch);
    }

    /// Every confirmed epoch with `id <= max_id`, ascending.
    pub fn list_up_to(&self, max_id: u64) -> Vec<&Epoch> {
        let mut out: Vec<&Epoch> = self.history.range(..=max_id).map(|(_, e)| e).collect();
        if self.active.id <= max_id {
            out.push(&self.active);
        }
        out.sort_by_key(|e| e.id);
        out
    }
}
