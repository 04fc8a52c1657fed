//! Epoch lifecycle state machine: propose-then-vote rotation of the
//! validator peer set.
//!
//! The machine has two states, read off the store contents rather than an
//! explicit enum: **stable** (no changing epoch) and **proposed** (one
//! unconfirmed epoch collecting votes). Promotion is atomic with the vote
//! that crosses quorum: that vote archives the old active epoch, activates
//! the proposal and clears the changing slot in one step. Every rejection
//! leaves state untouched; retry is the caller's business.

use crate::codec::{self, DecodeError};
use crate::consensus::quorum::quorum_reached;
use crate::events::{Event, EventSink};
use crate::metrics::metrics;
use crate::store::EpochStore;
use crate::types::{Address, Epoch, Hash32, PeerRecord};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error, PartialEq)]
pub enum EpochError {
    #[error("caller {0} may not perform this operation")]
    Unauthorized(Address),
    #[error("invalid epoch transition: {reason}")]
    InvalidTransition { reason: &'static str },
    #[error("peer list decode failed: {0}")]
    Decode(#[from] DecodeError),
}

/// Caller authorization, injected by the embedding node. The surrounding
/// chain decides who may submit proposals and how voters authenticate;
/// this component only consumes the verdicts.
pub trait AuthPolicy {
    fn may_propose(&self, caller: &Address) -> bool;
    fn is_validator(&self, active: &Epoch, caller: &Address) -> bool;
}

/// Default policy: proposals are open to any caller the node has already
/// authenticated; voters must be members of the current active peer set.
#[derive(Clone, Copy, Debug, Default)]
pub struct ActiveSetPolicy;

impl AuthPolicy for ActiveSetPolicy {
    fn may_propose(&self, _caller: &Address) -> bool {
        true
    }

    fn is_validator(&self, active: &Epoch, caller: &Address) -> bool {
        active.contains(caller)
    }
}

pub struct EpochManager<P: AuthPolicy = ActiveSetPolicy> {
    store: EpochStore,
    policy: P,
}

impl EpochManager<ActiveSetPolicy> {
    /// Start a fresh chain from a genesis peer set, active immediately.
    pub fn genesis(peers: Vec<PeerRecord>, start_height: u64) -> Self {
        Self::with_policy(peers, start_height, ActiveSetPolicy)
    }
}

impl<P: AuthPolicy> EpochManager<P> {
    pub fn with_policy(peers: Vec<PeerRecord>, start_height: u64, policy: P) -> Self {
        let genesis = Epoch { id: 1, hash: codec::peers_hash(&peers), peers, start_height };
        Self::from_store(EpochStore::new(genesis), policy)
    }

    /// Resume from a restored store (node restart).
    pub fn from_store(store: EpochStore, policy: P) -> Self {
        let m = metrics();
        m.active_epoch_id.set(store.active().id as i64);
        m.group_size.set(store.active().group_size() as i64);
        Self { store, policy }
    }

    pub fn name(&self) -> &'static str {
        "oryn-node-manager"
    }

    pub fn store(&self) -> &EpochStore {
        &self.store
    }

    /// Submit the next epoch's peer list. Valid only while stable, with a
    /// start height strictly above the active epoch's.
    pub fn propose(
        &mut self,
        caller: Address,
        start_height: u64,
        raw_peers: &[u8],
        sink: &mut impl EventSink,
    ) -> Result<(), EpochError> {
        if !self.policy.may_propose(&caller) {
            return Err(EpochError::Unauthorized(caller));
        }
        if self.store.changing().is_some() {
            return Err(EpochError::InvalidTransition { reason: "a proposal is already outstanding" });
        }
        let active = self.store.active();
        if start_height <= active.start_height {
            warn!(
                start_height,
                active_start = active.start_height,
                "propose rejected: start height not above active epoch"
            );
            return Err(EpochError::InvalidTransition {
                reason: "start height must exceed the active epoch's",
            });
        }
        let peers = codec::decode_peers(raw_peers)?;
        let epoch = Epoch { id: active.id + 1, hash: codec::peers_hash(&peers), peers, start_height };
        let group_size = active.group_size();
        let encoded = codec::encode_epoch(&epoch);
        info!(
            id = epoch.id,
            start_height,
            peers = epoch.peers.len(),
            hash = %epoch.hash,
            "epoch proposed"
        );
        self.store.set_changing(epoch);
        metrics().proposals.inc();
        sink.emit(Event::Proposed { epoch: encoded });
        sink.emit(Event::ConsensusSigned {
            method: "propose",
            input: raw_peers.to_vec(),
            signer: caller,
            size: group_size,
        });
        Ok(())
    }

    /// Record a vote on the changing epoch. Voting weight is one per member
    /// of the *active* peer set; each member is counted once per epoch id.
    /// Returns true when this vote reached quorum and promoted the epoch.
    pub fn vote(
        &mut self,
        caller: Address,
        epoch_id: u64,
        epoch_hash: Hash32,
        sink: &mut impl EventSink,
    ) -> Result<bool, EpochError> {
        let group_size = self.store.active().group_size();
        if !self.policy.is_validator(self.store.active(), &caller) {
            metrics().votes_rejected.inc();
            return Err(EpochError::Unauthorized(caller));
        }

        let (voted_number, promotable) = {
            let Some(changing) = self.store.changing_mut() else {
                metrics().votes_rejected.inc();
                return Err(EpochError::InvalidTransition { reason: "no epoch is changing" });
            };
            if changing.epoch.id != epoch_id {
                metrics().votes_rejected.inc();
                return Err(EpochError::InvalidTransition { reason: "vote targets a different epoch id" });
            }
            let Some(voted_number) = changing.tally.record(caller, epoch_hash) else {
                metrics().votes_rejected.inc();
                return Err(EpochError::InvalidTransition { reason: "caller already voted on this epoch" });
            };
            // Only votes for the proposal's own hash can promote it.
            let quorum = epoch_hash == changing.epoch.hash && quorum_reached(voted_number, group_size);
            (voted_number, quorum.then(|| changing.epoch.clone()))
        };

        metrics().votes.inc();
        info!(epoch_id, voter = %caller, voted_number, group_size, "vote recorded");
        sink.emit(Event::Voted { epoch_id, epoch_hash, voted_number, group_size });

        let promoted = match promotable {
            Some(next) => {
                self.store.clear_changing();
                let old = self.store.set_active(next.clone());
                self.store.archive(old.clone());
                let m = metrics();
                m.epoch_changes.inc();
                m.active_epoch_id.set(next.id as i64);
                m.group_size.set(next.group_size() as i64);
                info!(old = old.id, new = next.id, start_height = next.start_height, "epoch changed");
                sink.emit(Event::EpochChanged {
                    epoch: codec::encode_epoch(&old),
                    next_epoch: codec::encode_epoch(&next),
                });
                true
            }
            None => false,
        };

        sink.emit(Event::ConsensusSigned {
            method: "vote",
            input: epoch_hash.as_bytes().to_vec(),
            signer: caller,
            size: group_size,
        });
        Ok(promoted)
    }

    // ── Read-only views ───────────────────────────────────────────────────

    /// Encoded active epoch.
    pub fn epoch(&self) -> Vec<u8> {
        codec::encode_epoch(self.store.active())
    }

    pub fn changing_epoch(&self) -> Option<Vec<u8>> {
        self.store.changing().map(|c| codec::encode_epoch(&c.epoch))
    }

    pub fn epoch_by_id(&self, id: u64) -> Option<Vec<u8>> {
        self.store.get(id).map(codec::encode_epoch)
    }

    /// Light-client commitment for a stored epoch, 1:1 with its encoding.
    pub fn proof(&self, id: u64) -> Option<Vec<u8>> {
        self.store.get(id).map(codec::encode_proof)
    }

    // JSON renderings for external tooling.

    pub fn current_epoch_json(&self) -> String {
        serde_json::to_string(self.store.active()).unwrap_or_default()
    }

    pub fn changing_epoch_json(&self) -> String {
        match self.store.changing() {
            Some(c) => serde_json::to_string(&c.epoch).unwrap_or_default(),
            None => "null".into(),
        }
    }

    pub fn epoch_list_json(&self, max_id: u64) -> String {
        serde_json::to_string(&self.store.list_up_to(max_id)).unwrap_or_default()
    }
}
