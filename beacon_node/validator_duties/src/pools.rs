//! Operation-pool collaborators, defined by interface.

use types::{
    Attestation, CommitteeIndex, EthSpec, Hash256, SignedVoluntaryExit, Slot, SyncAggregate,
    SyncCommitteeContribution,
};

pub trait AttestationPool<E: EthSpec>: Send + Sync + 'static {
    /// Aggregated attestations suitable for block inclusion, best first.
    fn get_attestations_for_block(&self) -> Vec<Attestation<E>>;

    /// The pool's best aggregate for `(slot, committee_index)`, if any.
    fn get_aggregated_attestation(
        &self,
        slot: Slot,
        committee_index: CommitteeIndex,
    ) -> Option<Attestation<E>>;
}

pub trait ExitPool: Send + Sync + 'static {
    /// Voluntary exits suitable for block inclusion.
    fn get_beacon_block_exits(&self) -> Vec<SignedVoluntaryExit>;
}

pub trait SyncCommitteeMessagePool<E: EthSpec>: Send + Sync + 'static {
    /// The sync aggregate to embed in a block building on `beacon_block_root`.
    ///
    /// Returns the empty aggregate when no messages are known.
    fn produce_sync_aggregate(&self, beacon_block_root: Hash256) -> SyncAggregate<E>;

    /// The best contribution for a subcommittee, if any messages are pooled.
    fn produce_contribution(
        &self,
        slot: Slot,
        beacon_block_root: Hash256,
        subcommittee_index: u64,
    ) -> Option<SyncCommitteeContribution<E>>;
}
