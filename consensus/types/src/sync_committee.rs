use crate::{EthSpec, FixedVector, PublicKeyBytes, SyncSubnetId};
use serde::{Deserialize, Serialize};
use ssz_derive::{Decode, Encode};
use std::collections::HashMap;
use tree_hash_derive::TreeHash;

/// The rotating committee of validators that sign the beacon block root every
/// slot. Fork ≥ Altair only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode, TreeHash)]
#[serde(bound = "E: EthSpec")]
pub struct SyncCommittee<E: EthSpec> {
    pub pubkeys: FixedVector<PublicKeyBytes, E::SyncCommitteeSize>,
    pub aggregate_pubkey: PublicKeyBytes,
}

impl<E: EthSpec> SyncCommittee<E> {
    pub fn contains(&self, pubkey: &PublicKeyBytes) -> bool {
        self.pubkeys.iter().any(|committee_key| committee_key == pubkey)
    }

    /// All positions of `pubkey` in the committee.
    ///
    /// A validator may occur more than once when the committee is sampled with
    /// replacement.
    pub fn positions_of(&self, pubkey: &PublicKeyBytes) -> Vec<usize> {
        self.pubkeys
            .iter()
            .enumerate()
            .filter(|(_, committee_key)| *committee_key == pubkey)
            .map(|(i, _)| i)
            .collect()
    }

    /// For a validator pubkey, the subcommittees it belongs to and its
    /// position(s) within each.
    pub fn subcommittee_positions_for_public_key(
        &self,
        pubkey: &PublicKeyBytes,
    ) -> HashMap<SyncSubnetId, Vec<usize>> {
        let mut map: HashMap<SyncSubnetId, Vec<usize>> = HashMap::new();
        for position in self.positions_of(pubkey) {
            let subcommittee_size = E::sync_subcommittee_size();
            let subnet_id = SyncSubnetId::new((position / subcommittee_size) as u64);
            map.entry(subnet_id)
                .or_default()
                .push(position % subcommittee_size);
        }
        map
    }
}
