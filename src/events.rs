use crate::types::{Address, Hash32};
use serde::Serialize;

/// Governance events, appended in commit order. Emission is decoupled from
/// transport: state-changing operations push into an injected [`EventSink`]
/// and the embedding node decides where the log goes.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Event {
    /// A new epoch was proposed. Payload is the encoded epoch envelope.
    Proposed { epoch: Vec<u8> },
    /// A qualifying vote was recorded.
    Voted { epoch_id: u64, epoch_hash: Hash32, voted_number: u64, group_size: u64 },
    /// Quorum was reached and the changing epoch became active.
    EpochChanged { epoch: Vec<u8>, next_epoch: Vec<u8> },
    /// Audit record of an accepted consensus call: method name, raw input,
    /// caller, and the size of the active validator group.
    ConsensusSigned { method: &'static str, input: Vec<u8>, signer: Address, size: u64 },
}

pub trait EventSink {
    fn emit(&mut self, event: Event);
}

/// Ordered in-memory log. Useful for tests and for embedders that flush the
/// log themselves after each committed operation.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<Event>,
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: Event) {
        self.events.push(event);
    }
}
