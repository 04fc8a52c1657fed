//! Wire codec for peer lists and epoch envelopes.
//!
//! Peer lists travel as nested RLP: an outer list holding, per peer, a
//! two-element list `[public_key, address]`. The encoding is deterministic:
//! the epoch hash is keccak over these exact bytes, so any re-encoding of
//! the same peers must produce the same fingerprint.

use crate::types::{keccak256, Epoch, Hash32, PeerRecord, ADDRESS_LEN, PUBLIC_KEY_LEN};
use rlp::{Rlp, RlpStream};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum DecodeError {
    #[error("malformed rlp: {0}")]
    Rlp(#[from] rlp::DecoderError),
    #[error("expected an rlp list")]
    ExpectedList,
    #[error("peer {index}: expected 2 fields, got {got}")]
    FieldCount { index: usize, got: usize },
    #[error("peer {index}: public key is {got} bytes, expected 33")]
    KeyLength { index: usize, got: usize },
    #[error("peer {index}: address is {got} bytes, expected 20")]
    AddressLength { index: usize, got: usize },
    #[error("epoch envelope: expected 4 fields, got {got}")]
    EpochFieldCount { got: usize },
    #[error("epoch envelope: hash is {got} bytes, expected 32")]
    HashLength { got: usize },
}

/// Encode an ordered peer list.
pub fn encode_peers(peers: &[PeerRecord]) -> Vec<u8> {
    let mut s = RlpStream::new_list(peers.len());
    for p in peers {
        s.begin_list(2);
        s.append(&p.public_key.as_bytes());
        s.append(&p.address.as_bytes());
    }
    s.out().to_vec()
}

/// Decode a peer list, enforcing list shape, field count and exact field
/// lengths. A record with a wrong-sized field is rejected, never truncated
/// or padded. Allocation is bounded by the actual input size; item counts
/// come from walking the payload, not from attacker-declared totals.
pub fn decode_peers(raw: &[u8]) -> Result<Vec<PeerRecord>, DecodeError> {
    let rlp = Rlp::new(raw);
    if !rlp.is_list() {
        return Err(DecodeError::ExpectedList);
    }
    let count = rlp.item_count()?;
    let mut peers = Vec::with_capacity(count);
    for index in 0..count {
        let item = rlp.at(index)?;
        let fields = item.item_count()?;
        if fields != 2 {
            return Err(DecodeError::FieldCount { index, got: fields });
        }
        let key = item.at(0)?.data()?;
        if key.len() != PUBLIC_KEY_LEN {
            return Err(DecodeError::KeyLength { index, got: key.len() });
        }
        let addr = item.at(1)?.data()?;
        if addr.len() != ADDRESS_LEN {
            return Err(DecodeError::AddressLength { index, got: addr.len() });
        }
        let mut public_key = [0u8; PUBLIC_KEY_LEN];
        public_key.copy_from_slice(key);
        let mut address = [0u8; ADDRESS_LEN];
        address.copy_from_slice(addr);
        peers.push(PeerRecord {
            public_key: crate::types::PublicKey(public_key),
            address: crate::types::Address(address),
        });
    }
    Ok(peers)
}

/// Content hash binding a proposal to its exact peer list encoding.
pub fn peers_hash(peers: &[PeerRecord]) -> Hash32 {
    keccak256(&encode_peers(peers))
}

/// Deterministic epoch envelope carried by `epoch()`/`getEpochByID`, the
/// proof commitment and every event payload:
/// `RLP([id, start_height, peers, hash])`.
pub fn encode_epoch(epoch: &Epoch) -> Vec<u8> {
    let mut s = RlpStream::new_list(4);
    s.append(&epoch.id);
    s.append(&epoch.start_height);
    s.append_raw(&encode_peers(&epoch.peers), 1);
    s.append(&epoch.hash.as_bytes());
    s.out().to_vec()
}

pub fn decode_epoch(raw: &[u8]) -> Result<Epoch, DecodeError> {
    let rlp = Rlp::new(raw);
    if !rlp.is_list() {
        return Err(DecodeError::ExpectedList);
    }
    let fields = rlp.item_count()?;
    if fields != 4 {
        return Err(DecodeError::EpochFieldCount { got: fields });
    }
    let id: u64 = rlp.val_at(0)?;
    let start_height: u64 = rlp.val_at(1)?;
    let peers = decode_peers(rlp.at(2)?.as_raw())?;
    let hash_raw = rlp.at(3)?.data()?;
    if hash_raw.len() != 32 {
        return Err(DecodeError::HashLength { got: hash_raw.len() });
    }
    let mut hash = [0u8; 32];
    hash.copy_from_slice(hash_raw);
    Ok(Epoch { id, peers, start_height, hash: Hash32(hash) })
}

/// Opaque light-client commitment for a stored epoch:
/// `RLP([id, keccak(encoded epoch)])`. One-to-one with the epoch's encoding;
/// nothing more is promised about its structure.
pub fn encode_proof(epoch: &Epoch) -> Vec<u8> {
    let digest = keccak256(&encode_epoch(epoch));
    let mut s = RlpStream::new_list(2);
    s.append(&epoch.id);
    s.append(&digest.as_bytes());
    s.out().to_vec()
}
