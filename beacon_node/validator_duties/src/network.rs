//! Gossip validation and broadcast collaborators, defined by interface.

use types::{
    Attestation, AttesterSlashing, EthSpec, ProposerSlashing, SignedAggregateAndProof,
    SignedBeaconBlock, SignedContributionAndProof, SignedVoluntaryExit, SubnetId,
    SyncCommitteeMessage, SyncSubnetId,
};

/// The outcome of gossip validation.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationResult {
    Accept,
    /// Not propagation-worthy for the network at large, but well-formed.
    Ignore,
    Reject(String),
}

impl ValidationResult {
    /// Self-produced messages are broadcast on `Accept` *and* `Ignore`.
    pub fn broadcast_eligible(&self) -> bool {
        !matches!(self, ValidationResult::Reject(_))
    }

    pub fn reject_reason(self) -> Option<String> {
        match self {
            ValidationResult::Reject(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Re-validates messages before broadcast, including self-produced ones.
pub trait GossipValidator<E: EthSpec>: Send + Sync + 'static {
    fn validate_beacon_block(&self, block: &SignedBeaconBlock<E>) -> ValidationResult;

    fn validate_attestation(
        &self,
        attestation: &Attestation<E>,
        subnet_id: SubnetId,
    ) -> ValidationResult;

    fn validate_aggregate_and_proof(
        &self,
        aggregate: &SignedAggregateAndProof<E>,
    ) -> ValidationResult;

    fn validate_sync_committee_message(
        &self,
        message: &SyncCommitteeMessage,
        subnet_id: SyncSubnetId,
    ) -> ValidationResult;

    fn validate_sync_committee_contribution(
        &self,
        contribution: &SignedContributionAndProof<E>,
    ) -> ValidationResult;

    fn validate_voluntary_exit(&self, exit: &SignedVoluntaryExit) -> ValidationResult;

    fn validate_attester_slashing(&self, slashing: &AttesterSlashing<E>) -> ValidationResult;

    fn validate_proposer_slashing(&self, slashing: &ProposerSlashing) -> ValidationResult;
}

/// Topic-specific broadcast onto the gossip network.
pub trait Network<E: EthSpec>: Send + Sync + 'static {
    fn broadcast_beacon_block(&self, block: &SignedBeaconBlock<E>);

    fn broadcast_attestation(&self, subnet_id: SubnetId, attestation: &Attestation<E>);

    fn broadcast_aggregate_and_proof(&self, aggregate: &SignedAggregateAndProof<E>);

    fn broadcast_sync_committee_message(
        &self,
        subnet_id: SyncSubnetId,
        message: &SyncCommitteeMessage,
    );

    fn broadcast_sync_committee_contribution(&self, contribution: &SignedContributionAndProof<E>);

    fn broadcast_voluntary_exit(&self, exit: &SignedVoluntaryExit);

    fn broadcast_attester_slashing(&self, slashing: &AttesterSlashing<E>);

    fn broadcast_proposer_slashing(&self, slashing: &ProposerSlashing);
}
