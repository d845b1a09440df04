//! The attestation and aggregation paths.
//!
//! Attestations are fire-and-forget: each (validator, committee) pair gets a
//! detached signing task once it has passed the slashing gate. Aggregation
//! runs as a joined phase at two thirds of the slot: slot signatures are
//! gathered in parallel, elected aggregators wrap the pool's best aggregate
//! in a signed proof.

use crate::chain::{BlockRef, EpochRef};
use crate::{metrics, DutyEngine, DutyEngineTypes};
use attached_validators::AttachedValidator;
use futures::future::join_all;
use logging::crit;
use signing_method::{SignableMessage, SigningContext};
use slashing_protection::NotSafe;
use std::sync::Arc;
use tracing::{debug, error, info, trace, warn};
use types::{
    AggregateAndProof, Attestation, AttestationData, CommitteeIndex, Domain, EthSpec,
    SelectionProof, SignedAggregateAndProof, Slot, SubnetId,
};

/// A locally attached member of a slot's committee, eligible to aggregate.
struct AggregationDuty {
    committee_index: CommitteeIndex,
    committee_len: usize,
    validator_index: u64,
    validator: Arc<AttachedValidator>,
}

impl<T: DutyEngineTypes> DutyEngine<T> {
    /// Produce attestations for all attached validators with a duty at `slot`.
    ///
    /// Spawns a detached task per attestation; failures are logged inside the
    /// tasks and never reach the slot driver.
    pub(crate) fn attest(&self, head: &BlockRef, slot: Slot) {
        if slot + T::EthSpec::slots_per_epoch() < head.slot {
            warn!(
                head_slot = %head.slot,
                slot = %slot,
                "Attestation slot is more than an epoch behind the head, skipping"
            );
            return;
        }

        // A head newer than the slot means we attest against the rewound view.
        let attestation_head = self.chain.block_at_slot(head, slot);
        if attestation_head != *head {
            debug!(
                head_root = ?head.root,
                attestation_root = ?attestation_head.root,
                slot = %slot,
                "Attesting against an ancestor of the head"
            );
        }

        let epoch = slot.epoch(T::EthSpec::slots_per_epoch());
        let epoch_ref = match self.chain.get_epoch_ref(&attestation_head, epoch) {
            Ok(epoch_ref) => epoch_ref,
            Err(e) => {
                error!(slot = %slot, error = ?e, "Cannot resolve committees for attestation");
                return;
            }
        };

        for (committee_index, committee) in epoch_ref.committees_at_slot(slot).iter().enumerate() {
            for (committee_position, &validator_index) in committee.iter().enumerate() {
                let Some(pubkey) = epoch_ref.pubkey(validator_index) else {
                    continue;
                };
                let Some(validator) = self.validators.get(&pubkey) else {
                    continue;
                };
                validator.set_index(validator_index);

                let data = AttestationData {
                    slot,
                    index: committee_index as u64,
                    beacon_block_root: attestation_head.root,
                    source: epoch_ref.justified_checkpoint,
                    target: epoch_ref.target,
                };

                // The slashing gate precedes any signature request for this
                // validator and slot.
                let fork = self.chain.fork_at_epoch(data.target.epoch);
                let domain = self.spec.get_domain(
                    data.target.epoch,
                    Domain::BeaconAttester,
                    &fork,
                    self.chain.genesis_validators_root(),
                );
                let signing_root = data.signing_root(domain);
                match self.slashing_protection.check_and_insert_attestation(
                    &pubkey,
                    data.source.epoch,
                    data.target.epoch,
                    signing_root,
                ) {
                    Ok(_) => {}
                    Err(NotSafe::InvalidAttestation(e)) => {
                        warn!(
                            validator = ?pubkey,
                            slot = %slot,
                            error = ?e,
                            "Attestation would violate slashing protection, skipping validator"
                        );
                        continue;
                    }
                    Err(e) => {
                        error!(
                            validator = ?pubkey,
                            slot = %slot,
                            error = ?e,
                            "Slashing protection failure, skipping validator"
                        );
                        continue;
                    }
                }

                let service = self.clone();
                let committee_len = committee.len();
                let committees_per_slot = epoch_ref.committees_per_slot;
                self.executor.spawn(
                    async move {
                        service
                            .sign_and_publish_attestation(
                                data,
                                committee_position,
                                committee_len,
                                committees_per_slot,
                                validator,
                            )
                            .await
                    },
                    "attestation_publish",
                );
            }
        }
    }

    /// Top level of the detached attestation task: all failures end here, as
    /// log entries.
    async fn sign_and_publish_attestation(
        self,
        data: AttestationData,
        committee_position: usize,
        committee_len: usize,
        committees_per_slot: u64,
        validator: Arc<AttachedValidator>,
    ) {
        let epoch = data.target.epoch;
        let signing_context = SigningContext {
            domain: Domain::BeaconAttester,
            epoch,
            fork: self.chain.fork_at_epoch(epoch),
            genesis_validators_root: self.chain.genesis_validators_root(),
        };

        let signature = match validator
            .signing_method()
            .get_signature::<T::EthSpec>(
                SignableMessage::AttestationData(&data),
                signing_context,
                &self.spec,
            )
            .await
        {
            Ok(signature) => signature,
            Err(e) => {
                metrics::inc_counter_vec(&metrics::SIGNER_FAILURES, &[metrics::ATTESTATION]);
                warn!(
                    validator = ?validator.voting_pubkey(),
                    slot = %data.slot,
                    error = ?e,
                    "Failed to sign attestation"
                );
                return;
            }
        };

        let mut attestation =
            match Attestation::<T::EthSpec>::empty_for_signing(committee_len, data.clone()) {
                Ok(attestation) => attestation,
                Err(e) => {
                    crit!(
                        validator = ?validator.voting_pubkey(),
                        error = ?e,
                        "Invalid committee length during attestation signing"
                    );
                    return;
                }
            };
        if let Err(e) = attestation.add_signature(&signature, committee_position) {
            crit!(
                validator = ?validator.voting_pubkey(),
                error = ?e,
                "Unable to add signature to attestation"
            );
            return;
        }

        // Recomputed from scratch every slot; never cached.
        let subnet_id = match SubnetId::compute_subnet::<T::EthSpec>(
            data.slot,
            data.index,
            committees_per_slot,
            &self.spec,
        ) {
            Ok(subnet_id) => subnet_id,
            Err(e) => {
                crit!(error = ?e, "Subnet computation failed");
                return;
            }
        };

        if let Some(reason) = self
            .gossip_validator
            .validate_attestation(&attestation, subnet_id)
            .reject_reason()
        {
            crit!(
                validator = ?validator.voting_pubkey(),
                slot = %data.slot,
                %reason,
                "Own attestation failed gossip validation"
            );
            return;
        }

        self.network.broadcast_attestation(subnet_id, &attestation);
        metrics::inc_counter(&metrics::ATTESTATIONS_PUBLISHED);
        if let Some(delay) = self.seconds_since_deadline(data.slot, self.attestation_offset()) {
            metrics::observe_vec(
                &metrics::DUTY_SEND_DELAY_SECONDS,
                &[metrics::ATTESTATION],
                delay,
            );
        }

        if self.config.dump_enabled {
            crate::dump::dump_attestation(&self.config.dump_dir, &attestation);
        }

        trace!(
            validator = ?validator.voting_pubkey(),
            slot = %data.slot,
            committee_index = data.index,
            subnet = %subnet_id,
            head_block = ?data.beacon_block_root,
            "Published attestation"
        );
    }

    /// Produce `SignedAggregateAndProof`s for every attached validator elected
    /// as an aggregator at `slot`.
    pub(crate) async fn publish_aggregates(&self, head: &BlockRef, slot: Slot) {
        let attestation_head = self.chain.block_at_slot(head, slot);
        let epoch = slot.epoch(T::EthSpec::slots_per_epoch());
        let epoch_ref = match self.chain.get_epoch_ref(&attestation_head, epoch) {
            Ok(epoch_ref) => epoch_ref,
            Err(e) => {
                error!(slot = %slot, error = ?e, "Cannot resolve committees for aggregation");
                return;
            }
        };

        let mut duties = Vec::new();
        for (committee_index, committee) in epoch_ref.committees_at_slot(slot).iter().enumerate() {
            for &validator_index in committee {
                let Some(pubkey) = epoch_ref.pubkey(validator_index) else {
                    continue;
                };
                let Some(validator) = self.validators.get(&pubkey) else {
                    continue;
                };
                duties.push(AggregationDuty {
                    committee_index: committee_index as u64,
                    committee_len: committee.len(),
                    validator_index,
                    validator,
                });
            }
        }
        if duties.is_empty() {
            return;
        }

        // Await all slot signatures in parallel.
        let signing_futures = duties.into_iter().map(|duty| {
            let service = self.clone();
            async move {
                match service
                    .request_slot_signature(&duty.validator, slot, epoch)
                    .await
                {
                    Ok(selection_proof) => Some((duty, selection_proof)),
                    Err(e) => {
                        metrics::inc_counter_vec(
                            &metrics::SIGNER_FAILURES,
                            &[metrics::SELECTION_PROOF],
                        );
                        warn!(
                            validator = ?duty.validator.voting_pubkey(),
                            slot = %slot,
                            error = ?e,
                            "Failed to sign slot signature"
                        );
                        None
                    }
                }
            }
        });

        for (duty, selection_proof) in join_all(signing_futures).await.into_iter().flatten() {
            match selection_proof.is_aggregator(duty.committee_len, &self.spec) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    crit!(error = ?e, "Aggregator selection failed");
                    continue;
                }
            }

            let Some(aggregate_and_proof) = self.make_aggregate_and_proof(
                &epoch_ref,
                slot,
                duty.committee_index,
                duty.validator_index,
                selection_proof,
            ) else {
                // Pool miss: nothing to aggregate for this committee.
                continue;
            };

            let signing_context = SigningContext {
                domain: Domain::AggregateAndProof,
                epoch,
                fork: self.chain.fork_at_epoch(epoch),
                genesis_validators_root: self.chain.genesis_validators_root(),
            };
            let signature = match duty
                .validator
                .signing_method()
                .get_signature::<T::EthSpec>(
                    SignableMessage::SignedAggregateAndProof(&aggregate_and_proof),
                    signing_context,
                    &self.spec,
                )
                .await
            {
                Ok(signature) => signature,
                Err(e) => {
                    metrics::inc_counter_vec(&metrics::SIGNER_FAILURES, &[metrics::AGGREGATE]);
                    warn!(
                        validator = ?duty.validator.voting_pubkey(),
                        slot = %slot,
                        error = ?e,
                        "Failed to sign aggregate and proof"
                    );
                    continue;
                }
            };
            let signed = SignedAggregateAndProof {
                message: aggregate_and_proof,
                signature,
            };

            if let Some(reason) = self
                .gossip_validator
                .validate_aggregate_and_proof(&signed)
                .reject_reason()
            {
                crit!(
                    aggregator = signed.message.aggregator_index,
                    slot = %slot,
                    %reason,
                    "Own aggregate failed gossip validation"
                );
                continue;
            }

            self.network.broadcast_aggregate_and_proof(&signed);
            metrics::inc_counter(&metrics::AGGREGATES_PUBLISHED);
            if let Some(delay) = self.seconds_since_deadline(slot, self.aggregate_offset()) {
                metrics::observe_vec(
                    &metrics::DUTY_SEND_DELAY_SECONDS,
                    &[metrics::AGGREGATE],
                    delay,
                );
            }

            info!(
                aggregator = signed.message.aggregator_index,
                signatures = signed.message.aggregate.num_set_aggregation_bits(),
                committee_index = signed.message.aggregate.data.index,
                slot = %slot,
                "Published aggregate attestation"
            );
        }
    }

    /// Wrap the pool's aggregate for `(slot, committee_index)` in a proof.
    ///
    /// Returns `None` on a pool miss. A non-member aggregator is a programmer
    /// error upstream in committee resolution.
    fn make_aggregate_and_proof(
        &self,
        epoch_ref: &EpochRef<T::EthSpec>,
        slot: Slot,
        committee_index: CommitteeIndex,
        validator_index: u64,
        selection_proof: SelectionProof,
    ) -> Option<AggregateAndProof<T::EthSpec>> {
        let committee = epoch_ref.committee(slot, committee_index)?;
        assert!(
            committee.contains(&validator_index),
            "aggregator {} must be a member of committee {} at slot {}",
            validator_index,
            committee_index,
            slot
        );

        let aggregate = self
            .attestation_pool
            .get_aggregated_attestation(slot, committee_index)?;

        Some(AggregateAndProof {
            aggregator_index: validator_index,
            aggregate,
            selection_proof: selection_proof.into(),
        })
    }
}
