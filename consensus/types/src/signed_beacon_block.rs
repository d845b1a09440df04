use crate::{BeaconBlock, Epoch, EthSpec, Hash256, Signature, Slot};
use serde::{Deserialize, Serialize};
use ssz_derive::Encode;
use tree_hash_derive::TreeHash;

/// A `BeaconBlock` and a signature from its proposer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, TreeHash)]
#[serde(bound = "E: EthSpec")]
pub struct SignedBeaconBlock<E: EthSpec> {
    pub message: BeaconBlock<E>,
    pub signature: Signature,
}

impl<E: EthSpec> SignedBeaconBlock<E> {
    pub fn slot(&self) -> Slot {
        self.message.slot()
    }

    pub fn epoch(&self) -> Epoch {
        self.message.epoch()
    }

    pub fn proposer_index(&self) -> u64 {
        self.message.proposer_index()
    }

    pub fn parent_root(&self) -> Hash256 {
        self.message.parent_root()
    }

    pub fn state_root(&self) -> Hash256 {
        self.message.state_root()
    }

    /// The block root used by fork choice: the root of the message, not of
    /// the signed container.
    pub fn canonical_root(&self) -> Hash256 {
        self.message.canonical_root()
    }
}
