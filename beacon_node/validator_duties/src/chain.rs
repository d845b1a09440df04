//! The engine's view of the chain DAG and fork choice, defined by interface.
//!
//! The embedding node implements [`ChainView`]; the engine never touches state
//! transition or fork choice directly.

use std::marker::PhantomData;
use std::sync::Arc;
use tokio::sync::oneshot;
use types::{
    BeaconBlock, Checkpoint, CommitteeIndex, Deposit, Epoch, Eth1Data, EthSpec, ExecutionPayload,
    Fork, Hash256, PublicKeyBytes, SignedBeaconBlock, Slot, SyncCommittee, Validator,
};

/// A (block root, slot) reference into the chain DAG.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRef {
    pub root: Hash256,
    pub slot: Slot,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChainError {
    /// Pending deposits could not be resolved; the proposal must be skipped.
    Eth1DepositsUnavailable,
    /// The requested epoch is not computable from the given head.
    EpochOutOfRange { epoch: Epoch },
    /// Sync committees do not exist before Altair.
    PreAltair,
    StoreError(String),
}

/// Committees, checkpoints and validator keys for one epoch, as seen from a
/// particular head block.
pub struct EpochRef<E: EthSpec> {
    pub epoch: Epoch,
    /// Attestation source: the justified checkpoint.
    pub justified_checkpoint: Checkpoint,
    /// Attestation target: the epoch boundary block.
    pub target: Checkpoint,
    pub committees_per_slot: u64,
    /// `committees[slot_offset][committee_index]` is the list of member
    /// validator indices.
    pub committees: Vec<Vec<Vec<u64>>>,
    /// Registry keys, indexed by validator index.
    pub validator_keys: Vec<PublicKeyBytes>,
    pub _phantom: PhantomData<E>,
}

impl<E: EthSpec> EpochRef<E> {
    pub fn committees_at_slot(&self, slot: Slot) -> &[Vec<u64>] {
        let offset = slot
            .as_u64()
            .saturating_sub(self.epoch.start_slot(E::slots_per_epoch()).as_u64())
            as usize;
        self.committees.get(offset).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn committee(&self, slot: Slot, index: CommitteeIndex) -> Option<&[u64]> {
        self.committees_at_slot(slot)
            .get(index as usize)
            .map(Vec::as_slice)
    }

    pub fn pubkey(&self, validator_index: u64) -> Option<PublicKeyBytes> {
        self.validator_keys.get(validator_index as usize).copied()
    }
}

/// Everything the engine needs from the node to assemble a block at a slot.
pub struct ProposalContext<E: EthSpec> {
    pub parent_root: Hash256,
    /// From the ETH1 monitor, or the fallback vote.
    pub eth1_data: Eth1Data,
    pub deposits: Vec<Deposit>,
    /// From the execution-layer payload provider; unused pre-Bellatrix.
    pub execution_payload: ExecutionPayload<E>,
}

/// The fork-choice / chain DAG collaborator.
///
/// All methods are synchronous; the implementation is expected to answer from
/// caches owned by a single task (see the cooperative scheduling notes in the
/// crate docs).
pub trait ChainView<E: EthSpec>: Send + Sync + 'static {
    fn head(&self) -> BlockRef;

    /// The ancestor of `head` at `slot` (identity when `head.slot <= slot`).
    fn block_at_slot(&self, head: &BlockRef, slot: Slot) -> BlockRef;

    fn get_proposer(&self, head: &BlockRef, slot: Slot) -> Option<u64>;

    fn get_epoch_ref(&self, head: &BlockRef, epoch: Epoch)
        -> Result<Arc<EpochRef<E>>, ChainError>;

    fn fork_at_epoch(&self, epoch: Epoch) -> Fork;

    fn genesis_validators_root(&self) -> Hash256;

    /// The sync committee that owns messages for `slot`.
    fn sync_committee_at_slot(&self, slot: Slot) -> Result<Arc<SyncCommittee<E>>, ChainError>;

    /// The head state's current-period sync committee.
    fn current_sync_committee(&self) -> Result<Arc<SyncCommittee<E>>, ChainError>;

    /// The head state's next-period sync committee.
    fn next_sync_committee(&self) -> Result<Arc<SyncCommittee<E>>, ChainError>;

    /// The head state's validator registry.
    fn state_validators(&self) -> Arc<Vec<Validator>>;

    fn validator_balance(&self, validator_index: u64) -> Option<u64>;

    /// Advance a clone of the head state to `slot` and gather block inputs.
    fn proposal_context(&self, head: &BlockRef, slot: Slot)
        -> Result<ProposalContext<E>, ChainError>;

    /// Fill in the post-state root of an assembled block.
    fn complete_state_root(&self, block: BeaconBlock<E>) -> Result<BeaconBlock<E>, ChainError>;

    /// Resolves when a block for `slot` arrives via gossip.
    ///
    /// The receiver is dropped without a send if no block arrives.
    fn expect_block(&self, slot: Slot) -> oneshot::Receiver<BlockRef>;

    /// Insert a self-produced block into the chain store, returning the new
    /// head reference.
    fn store_block(&self, block: SignedBeaconBlock<E>) -> Result<BlockRef, ChainError>;
}
