use crate::{AggregateSignature, BitVector, EthSpec};
use serde::{Deserialize, Serialize};
use ssz_derive::{Decode, Encode};
use tree_hash_derive::TreeHash;

/// The aggregate of all sync committee signatures included in a block body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode, TreeHash)]
#[serde(bound = "E: EthSpec")]
pub struct SyncAggregate<E: EthSpec> {
    pub sync_committee_bits: BitVector<E::SyncCommitteeSize>,
    pub sync_committee_signature: AggregateSignature,
}

impl<E: EthSpec> SyncAggregate<E> {
    /// New aggregate to be used as the seed for aggregating other signatures,
    /// and as the body field for slots with no observed participation.
    pub fn new() -> Self {
        Self {
            sync_committee_bits: BitVector::new(),
            sync_committee_signature: AggregateSignature::infinity(),
        }
    }

    pub fn num_set_bits(&self) -> usize {
        self.sync_committee_bits.num_set_bits()
    }
}

impl<E: EthSpec> Default for SyncAggregate<E> {
    fn default() -> Self {
        Self::new()
    }
}
