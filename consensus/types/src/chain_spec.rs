use crate::{Epoch, EthSpec, Fork, ForkData, ForkName, Hash256, Slot};
use tree_hash::TreeHash;

/// Each of the BLS signature domains.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Domain {
    BeaconProposer,
    BeaconAttester,
    Randao,
    Deposit,
    VoluntaryExit,
    SelectionProof,
    AggregateAndProof,
    SyncCommittee,
    SyncCommitteeSelectionProof,
    ContributionAndProof,
}

/// Holds all the "constants" for a BeaconChain.
///
/// Contains only the subset of the full preset that the duties engine needs;
/// chain-specific values come from the named constructors.
#[derive(Clone, PartialEq, Debug)]
pub struct ChainSpec {
    pub genesis_slot: Slot,
    pub seconds_per_slot: u64,

    /*
     * Fork schedule.
     */
    pub genesis_fork_version: [u8; 4],
    pub altair_fork_version: [u8; 4],
    pub altair_fork_epoch: Option<Epoch>,
    pub bellatrix_fork_version: [u8; 4],
    pub bellatrix_fork_epoch: Option<Epoch>,

    /*
     * Gossip and duty constants.
     */
    pub epochs_per_sync_committee_period: Epoch,
    pub target_aggregators_per_committee: u64,
    pub attestation_subnet_count: u64,
    pub attestation_propagation_slot_range: u64,

    /*
     * Signature domains.
     */
    domain_beacon_proposer: u32,
    domain_beacon_attester: u32,
    domain_randao: u32,
    domain_deposit: u32,
    domain_voluntary_exit: u32,
    domain_selection_proof: u32,
    domain_aggregate_and_proof: u32,
    domain_sync_committee: u32,
    domain_sync_committee_selection_proof: u32,
    domain_contribution_and_proof: u32,
}

impl ChainSpec {
    /// Returns the name of the fork which is active at `epoch`.
    pub fn fork_name_at_epoch(&self, epoch: Epoch) -> ForkName {
        match self.bellatrix_fork_epoch {
            Some(fork_epoch) if epoch >= fork_epoch => ForkName::Bellatrix,
            _ => match self.altair_fork_epoch {
                Some(fork_epoch) if epoch >= fork_epoch => ForkName::Altair,
                _ => ForkName::Base,
            },
        }
    }

    pub fn fork_name_at_slot<E: EthSpec>(&self, slot: Slot) -> ForkName {
        self.fork_name_at_epoch(slot.epoch(E::slots_per_epoch()))
    }

    /// Returns the fork version for a named fork.
    pub fn fork_version_for_name(&self, fork_name: ForkName) -> [u8; 4] {
        match fork_name {
            ForkName::Base => self.genesis_fork_version,
            ForkName::Altair => self.altair_fork_version,
            ForkName::Bellatrix => self.bellatrix_fork_version,
        }
    }

    /// Returns the epoch at which a named fork activates, if scheduled.
    pub fn fork_epoch(&self, fork_name: ForkName) -> Option<Epoch> {
        match fork_name {
            ForkName::Base => Some(Epoch::new(0)),
            ForkName::Altair => self.altair_fork_epoch,
            ForkName::Bellatrix => self.bellatrix_fork_epoch,
        }
    }

    /// Returns the `Fork` container (previous/current version pair) active at `epoch`.
    pub fn fork_at_epoch(&self, epoch: Epoch) -> Fork {
        let current_fork_name = self.fork_name_at_epoch(epoch);
        let previous_fork_name = current_fork_name.previous_fork().unwrap_or(current_fork_name);
        let epoch = self
            .fork_epoch(current_fork_name)
            .unwrap_or_else(|| Epoch::new(0));

        Fork {
            previous_version: self.fork_version_for_name(previous_fork_name),
            current_version: self.fork_version_for_name(current_fork_name),
            epoch,
        }
    }

    /// Get the domain number, unmodified by the fork.
    ///
    /// Spec v0.12.1
    pub fn get_domain_constant(&self, domain: Domain) -> u32 {
        match domain {
            Domain::BeaconProposer => self.domain_beacon_proposer,
            Domain::BeaconAttester => self.domain_beacon_attester,
            Domain::Randao => self.domain_randao,
            Domain::Deposit => self.domain_deposit,
            Domain::VoluntaryExit => self.domain_voluntary_exit,
            Domain::SelectionProof => self.domain_selection_proof,
            Domain::AggregateAndProof => self.domain_aggregate_and_proof,
            Domain::SyncCommittee => self.domain_sync_committee,
            Domain::SyncCommitteeSelectionProof => self.domain_sync_committee_selection_proof,
            Domain::ContributionAndProof => self.domain_contribution_and_proof,
        }
    }

    /// Get the domain that represents the fork meta and signature domain.
    ///
    /// Spec v0.12.1
    pub fn get_domain(
        &self,
        epoch: Epoch,
        domain: Domain,
        fork: &Fork,
        genesis_validators_root: Hash256,
    ) -> Hash256 {
        let fork_version = fork.get_fork_version(epoch);
        self.compute_domain(domain, fork_version, genesis_validators_root)
    }

    /// Compute a domain by applying the given `fork_version`.
    pub fn compute_domain(
        &self,
        domain: Domain,
        fork_version: [u8; 4],
        genesis_validators_root: Hash256,
    ) -> Hash256 {
        let domain_constant = self.get_domain_constant(domain);

        let mut domain = [0; 32];
        domain[0..4].copy_from_slice(&domain_constant.to_le_bytes());
        domain[4..].copy_from_slice(
            Self::compute_fork_data_root(fork_version, genesis_validators_root)
                .as_slice()
                .get(..28)
                .expect("fork data root is 32 bytes so first 28 bytes should exist"),
        );

        Hash256::from(domain)
    }

    /// Return the 32-byte fork data root for the `current_version` and `genesis_validators_root`.
    ///
    /// This is used primarily in signature domains to avoid collisions across forks/chains.
    pub fn compute_fork_data_root(
        current_version: [u8; 4],
        genesis_validators_root: Hash256,
    ) -> Hash256 {
        ForkData {
            current_version,
            genesis_validators_root,
        }
        .tree_hash_root()
    }

    /// Returns a `ChainSpec` compatible with the Ethereum Foundation mainnet.
    pub fn mainnet() -> Self {
        Self {
            genesis_slot: Slot::new(0),
            seconds_per_slot: 12,
            genesis_fork_version: [0, 0, 0, 0],
            altair_fork_version: [1, 0, 0, 0],
            altair_fork_epoch: Some(Epoch::new(74240)),
            bellatrix_fork_version: [2, 0, 0, 0],
            bellatrix_fork_epoch: Some(Epoch::new(144896)),
            epochs_per_sync_committee_period: Epoch::new(256),
            target_aggregators_per_committee: 16,
            attestation_subnet_count: 64,
            attestation_propagation_slot_range: 32,
            domain_beacon_proposer: 0,
            domain_beacon_attester: 1,
            domain_randao: 2,
            domain_deposit: 3,
            domain_voluntary_exit: 4,
            domain_selection_proof: 5,
            domain_aggregate_and_proof: 6,
            domain_sync_committee: 7,
            domain_sync_committee_selection_proof: 8,
            domain_contribution_and_proof: 9,
        }
    }

    /// Returns a small-preset `ChainSpec` suitable for testing.
    pub fn minimal() -> Self {
        Self {
            seconds_per_slot: 6,
            altair_fork_version: [1, 0, 0, 1],
            altair_fork_epoch: None,
            bellatrix_fork_version: [2, 0, 0, 1],
            bellatrix_fork_epoch: None,
            epochs_per_sync_committee_period: Epoch::new(8),
            ..ChainSpec::mainnet()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fork_name_ordering() {
        let mut spec = ChainSpec::minimal();
        spec.altair_fork_epoch = Some(Epoch::new(2));
        spec.bellatrix_fork_epoch = Some(Epoch::new(4));

        assert_eq!(spec.fork_name_at_epoch(Epoch::new(0)), ForkName::Base);
        assert_eq!(spec.fork_name_at_epoch(Epoch::new(1)), ForkName::Base);
        assert_eq!(spec.fork_name_at_epoch(Epoch::new(2)), ForkName::Altair);
        assert_eq!(spec.fork_name_at_epoch(Epoch::new(3)), ForkName::Altair);
        assert_eq!(spec.fork_name_at_epoch(Epoch::new(4)), ForkName::Bellatrix);
        assert_eq!(
            spec.fork_name_at_epoch(Epoch::new(u64::MAX)),
            ForkName::Bellatrix
        );
    }

    #[test]
    fn domains_are_distinct() {
        use crate::FixedBytesExtended;

        let spec = ChainSpec::mainnet();
        let fork = spec.fork_at_epoch(Epoch::new(0));
        let root = Hash256::zero();

        let domains = [
            Domain::BeaconProposer,
            Domain::BeaconAttester,
            Domain::Randao,
            Domain::SelectionProof,
            Domain::AggregateAndProof,
            Domain::SyncCommittee,
            Domain::SyncCommitteeSelectionProof,
            Domain::ContributionAndProof,
            Domain::VoluntaryExit,
        ];
        let mut seen = std::collections::HashSet::new();
        for domain in domains {
            assert!(seen.insert(spec.get_domain(Epoch::new(0), domain, &fork, root)));
        }
    }

    #[test]
    fn fork_at_epoch_spans_boundary() {
        let mut spec = ChainSpec::minimal();
        spec.altair_fork_epoch = Some(Epoch::new(5));

        let fork = spec.fork_at_epoch(Epoch::new(6));
        assert_eq!(fork.previous_version, spec.genesis_fork_version);
        assert_eq!(fork.current_version, spec.altair_fork_version);
        assert_eq!(fork.epoch, Epoch::new(5));

        // Before the fork boundary the previous version applies.
        assert_eq!(fork.get_fork_version(Epoch::new(4)), spec.genesis_fork_version);
        assert_eq!(fork.get_fork_version(Epoch::new(5)), spec.altair_fork_version);
    }
}
