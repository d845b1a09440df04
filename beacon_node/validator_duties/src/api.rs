//! The engine's externally-facing submission surface (REST ingress lands
//! here).
//!
//! Every handler runs the message through gossip validation; `Accept` and
//! `Ignore` are broadcast-eligible, `Reject` is returned to the caller
//! verbatim.

use crate::{DutyEngine, DutyEngineTypes};
use tracing::warn;
use types::{
    Attestation, AttesterSlashing, ProposerSlashing, SignedAggregateAndProof, SignedBeaconBlock,
    SignedContributionAndProof, SignedVoluntaryExit, SubnetId,
};

impl<T: DutyEngineTypes> DutyEngine<T> {
    pub fn send_attestation(&self, attestation: Attestation<T::EthSpec>) -> Result<(), String> {
        let head = self.chain.head();
        let epoch = attestation
            .data
            .slot
            .epoch(<T::EthSpec as types::EthSpec>::slots_per_epoch());
        let epoch_ref = self
            .chain
            .get_epoch_ref(&head, epoch)
            .map_err(|e| format!("cannot resolve committees: {:?}", e))?;
        let subnet_id = SubnetId::compute_subnet_for_attestation::<T::EthSpec>(
            &attestation.data,
            epoch_ref.committees_per_slot,
            &self.spec,
        )
        .map_err(|e| format!("cannot compute subnet: {:?}", e))?;

        if let Some(reason) = self
            .gossip_validator
            .validate_attestation(&attestation, subnet_id)
            .reject_reason()
        {
            return Err(reason);
        }
        self.network.broadcast_attestation(subnet_id, &attestation);
        Ok(())
    }

    pub fn send_aggregate_and_proof(
        &self,
        aggregate: SignedAggregateAndProof<T::EthSpec>,
    ) -> Result<(), String> {
        if let Some(reason) = self
            .gossip_validator
            .validate_aggregate_and_proof(&aggregate)
            .reject_reason()
        {
            return Err(reason);
        }
        self.network.broadcast_aggregate_and_proof(&aggregate);
        Ok(())
    }

    pub fn send_voluntary_exit(&self, exit: SignedVoluntaryExit) -> Result<(), String> {
        if let Some(reason) = self
            .gossip_validator
            .validate_voluntary_exit(&exit)
            .reject_reason()
        {
            return Err(reason);
        }
        self.network.broadcast_voluntary_exit(&exit);
        Ok(())
    }

    pub fn send_attester_slashing(
        &self,
        slashing: AttesterSlashing<T::EthSpec>,
    ) -> Result<(), String> {
        if let Some(reason) = self
            .gossip_validator
            .validate_attester_slashing(&slashing)
            .reject_reason()
        {
            return Err(reason);
        }
        self.network.broadcast_attester_slashing(&slashing);
        Ok(())
    }

    pub fn send_proposer_slashing(&self, slashing: ProposerSlashing) -> Result<(), String> {
        if let Some(reason) = self
            .gossip_validator
            .validate_proposer_slashing(&slashing)
            .reject_reason()
        {
            return Err(reason);
        }
        self.network.broadcast_proposer_slashing(&slashing);
        Ok(())
    }

    /// Broadcast an externally signed block and insert it into the chain DAG.
    ///
    /// Returns whether the store accepted the block; a broadcastable block
    /// that the store rejects is not an error for the submitter.
    pub fn send_beacon_block(&self, block: SignedBeaconBlock<T::EthSpec>) -> Result<bool, String> {
        if let Some(reason) = self
            .gossip_validator
            .validate_beacon_block(&block)
            .reject_reason()
        {
            return Err(reason);
        }
        self.network.broadcast_beacon_block(&block);

        match self.chain.store_block(block) {
            Ok(_) => Ok(true),
            Err(e) => {
                warn!(error = ?e, "Gossip-eligible block was not accepted by the store");
                Ok(false)
            }
        }
    }

    pub fn send_sync_committee_contribution(
        &self,
        contribution: SignedContributionAndProof<T::EthSpec>,
    ) -> Result<(), String> {
        if let Some(reason) = self
            .gossip_validator
            .validate_sync_committee_contribution(&contribution)
            .reject_reason()
        {
            return Err(reason);
        }
        self.network.broadcast_sync_committee_contribution(&contribution);
        Ok(())
    }
}
