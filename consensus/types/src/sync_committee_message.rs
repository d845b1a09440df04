use crate::{Hash256, Signature, Slot};
use serde::{Deserialize, Serialize};
use ssz_derive::{Decode, Encode};
use tree_hash_derive::TreeHash;

/// A validator's signature over the beacon block root observed at `slot`.
/// Fork ≥ Altair only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode, TreeHash)]
pub struct SyncCommitteeMessage {
    pub slot: Slot,
    pub beacon_block_root: Hash256,
    #[serde(with = "serde_utils::quoted_u64")]
    pub validator_index: u64,
    /// Signature by the validator over `beacon_block_root`.
    pub signature: Signature,
}

impl SyncCommitteeMessage {
    pub fn new(
        slot: Slot,
        beacon_block_root: Hash256,
        validator_index: u64,
        signature: Signature,
    ) -> Self {
        Self {
            slot,
            beacon_block_root,
            validator_index,
            signature,
        }
    }
}
