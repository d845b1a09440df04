use crate::{AggregateSignature, BitVector, EthSpec, Hash256, Slot};
use serde::{Deserialize, Serialize};
use ssz_derive::{Decode, Encode};
use tree_hash_derive::TreeHash;

/// An aggregate of `SyncCommitteeMessage`s within a single subcommittee.
///
/// Produced by the sync-message pool; the duties engine only wraps it in a
/// proof and broadcasts it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode, TreeHash)]
#[serde(bound = "E: EthSpec")]
pub struct SyncCommitteeContribution<E: EthSpec> {
    pub slot: Slot,
    pub beacon_block_root: Hash256,
    #[serde(with = "serde_utils::quoted_u64")]
    pub subcommittee_index: u64,
    pub aggregation_bits: BitVector<E::SyncSubcommitteeSize>,
    pub signature: AggregateSignature,
}

impl<E: EthSpec> SyncCommitteeContribution<E> {
    pub fn num_set_aggregation_bits(&self) -> usize {
        self.aggregation_bits.num_set_bits()
    }
}
