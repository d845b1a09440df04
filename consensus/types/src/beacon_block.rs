use crate::{
    BeaconBlockBodyAltair, BeaconBlockBodyBase, BeaconBlockBodyBellatrix, ChainSpec, Epoch,
    EthSpec, ExecutionPayload, FixedBytesExtended, Hash256, SignedRoot, Slot, SyncAggregate,
};
use serde::{Deserialize, Serialize};
use ssz_derive::{Decode, Encode};
use superstruct::superstruct;
use tree_hash::TreeHash;
use tree_hash_derive::TreeHash;

/// Dispatch an expression over whichever fork variant `self` holds.
macro_rules! with_block_variant {
    ($self:ident, $block:ident => $e:expr) => {
        match $self {
            BeaconBlock::Base($block) => $e,
            BeaconBlock::Altair($block) => $e,
            BeaconBlock::Bellatrix($block) => $e,
        }
    };
}

/// A block of the `BeaconChain`.
///
/// This *superstruct* abstracts over the hard-fork; the same skeleton
/// (slot, proposer, parents, roots) repeats with a fork-specific body.
#[superstruct(
    variants(Base, Altair, Bellatrix),
    variant_attributes(
        derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode, TreeHash),
        serde(bound = "E: EthSpec", deny_unknown_fields),
    )
)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, TreeHash)]
#[serde(untagged)]
#[serde(bound = "E: EthSpec")]
#[ssz(enum_behaviour = "transparent")]
#[tree_hash(enum_behaviour = "transparent")]
pub struct BeaconBlock<E: EthSpec> {
    #[superstruct(getter(copy))]
    pub slot: Slot,
    #[superstruct(getter(copy))]
    #[serde(with = "serde_utils::quoted_u64")]
    pub proposer_index: u64,
    #[superstruct(getter(copy))]
    pub parent_root: Hash256,
    #[superstruct(getter(copy))]
    pub state_root: Hash256,
    #[superstruct(only(Base))]
    pub body: BeaconBlockBodyBase<E>,
    #[superstruct(only(Altair))]
    pub body: BeaconBlockBodyAltair<E>,
    #[superstruct(only(Bellatrix))]
    pub body: BeaconBlockBodyBellatrix<E>,
}

impl<E: EthSpec> SignedRoot for BeaconBlock<E> {}

impl<E: EthSpec> BeaconBlock<E> {
    /// A genesis-style block: base fork, zero roots, no operations.
    pub fn empty(spec: &ChainSpec) -> Self {
        Self::Base(BeaconBlockBase {
            slot: spec.genesis_slot,
            proposer_index: 0,
            parent_root: Hash256::zero(),
            state_root: Hash256::zero(),
            body: BeaconBlockBodyBase::empty(),
        })
    }

    /// The epoch this block belongs to.
    pub fn epoch(&self) -> Epoch {
        self.slot().epoch(E::slots_per_epoch())
    }

    /// The block root used by fork choice and gossip: the hash tree root of
    /// the (unsigned) message.
    pub fn canonical_root(&self) -> Hash256 {
        self.tree_hash_root()
    }

    pub fn body_root(&self) -> Hash256 {
        with_block_variant!(self, block => block.body.tree_hash_root())
    }

    /// Update the post-state root once state transition has computed it.
    pub fn set_state_root(&mut self, state_root: Hash256) {
        with_block_variant!(self, block => block.state_root = state_root)
    }

    /// The sync aggregate included in the body, if the fork has one.
    pub fn sync_aggregate(&self) -> Option<&SyncAggregate<E>> {
        match self {
            BeaconBlock::Base(_) => None,
            BeaconBlock::Altair(block) => Some(&block.body.sync_aggregate),
            BeaconBlock::Bellatrix(block) => Some(&block.body.sync_aggregate),
        }
    }

    /// The execution payload included in the body, if the fork has one.
    pub fn execution_payload(&self) -> Option<&ExecutionPayload<E>> {
        match self {
            BeaconBlock::Base(_) | BeaconBlock::Altair(_) => None,
            BeaconBlock::Bellatrix(block) => Some(&block.body.execution_payload),
        }
    }

    pub fn attestations_len(&self) -> usize {
        with_block_variant!(self, block => block.body.attestations.len())
    }

    pub fn deposits_len(&self) -> usize {
        with_block_variant!(self, block => block.body.deposits.len())
    }

    pub fn voluntary_exits_len(&self) -> usize {
        with_block_variant!(self, block => block.body.voluntary_exits.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MainnetEthSpec;

    type E = MainnetEthSpec;

    #[test]
    fn base_block_has_no_sync_aggregate() {
        let spec = ChainSpec::mainnet();
        let block = BeaconBlock::<E>::empty(&spec);
        assert!(block.sync_aggregate().is_none());
        assert!(block.execution_payload().is_none());
    }

    #[test]
    fn altair_block_dispatches() {
        let block = BeaconBlock::<E>::Altair(BeaconBlockAltair {
            slot: Slot::new(1),
            proposer_index: 0,
            parent_root: Hash256::zero(),
            state_root: Hash256::zero(),
            body: BeaconBlockBodyAltair::empty(),
        });
        assert!(block.sync_aggregate().is_some());
        assert!(block.execution_payload().is_none());

        let block = BeaconBlock::<E>::Bellatrix(BeaconBlockBellatrix {
            slot: Slot::new(1),
            proposer_index: 0,
            parent_root: Hash256::zero(),
            state_root: Hash256::zero(),
            body: BeaconBlockBodyBellatrix::empty(),
        });
        assert!(block.sync_aggregate().is_some());
        assert!(block.execution_payload().is_some());
    }

    #[test]
    fn state_root_update_changes_root() {
        let spec = ChainSpec::mainnet();
        let mut block = BeaconBlock::<E>::empty(&spec);
        let before = block.canonical_root();
        block.set_state_root(Hash256::repeat_byte(1));
        assert_ne!(block.canonical_root(), before);
    }
}
