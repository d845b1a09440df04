//! Sync-committee message and contribution paths (fork ≥ Altair), plus the
//! bulk submission entry point used by the external API.

use crate::chain::{BlockRef, ChainError};
use crate::{dump, metrics, DutyEngine, DutyEngineTypes};
use attached_validators::AttachedValidator;
use futures::future::join_all;
use logging::crit;
use signing_method::{SignableMessage, SigningContext};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, trace, warn};
use types::{
    ContributionAndProof, Domain, EthSpec, Hash256, SignedContributionAndProof, Slot,
    SyncAggregatorSelectionData, SyncCommitteeMessage, SyncSelectionProof, SyncSubnetId,
};

/// A locally attached sync-committee member, per subcommittee.
struct ContributionDuty {
    validator: Arc<AttachedValidator>,
    validator_index: u64,
    subnet_id: SyncSubnetId,
}

impl<T: DutyEngineTypes> DutyEngine<T> {
    /// Publish a `SyncCommitteeMessage` per attached member of the committee
    /// owning `slot`'s messages. Fire-and-forget, like attestations.
    pub(crate) fn publish_sync_committee_messages(&self, head: &BlockRef, slot: Slot) {
        if !self
            .spec
            .fork_name_at_slot::<T::EthSpec>(slot)
            .altair_enabled()
        {
            trace!(slot = %slot, "Sync committees are not active yet");
            return;
        }

        // The committee active at `slot + 1`, so that the final slot of a
        // period is served by the period that owns its message.
        let sync_committee = match self.chain.sync_committee_at_slot(slot + 1) {
            Ok(sync_committee) => sync_committee,
            Err(ChainError::PreAltair) => return,
            Err(e) => {
                error!(slot = %slot, error = ?e, "Cannot resolve sync committee");
                return;
            }
        };

        for (pubkey, validator) in self.validators.iter() {
            let Some(validator_index) = validator.index() else {
                continue;
            };
            for (subnet_id, _positions) in
                sync_committee.subcommittee_positions_for_public_key(pubkey)
            {
                let service = self.clone();
                let validator = validator.clone();
                let beacon_block_root = head.root;
                self.executor.spawn(
                    async move {
                        service
                            .sign_and_publish_sync_message(
                                slot,
                                beacon_block_root,
                                validator_index,
                                validator,
                                subnet_id,
                            )
                            .await
                    },
                    "sync_message_publish",
                );
            }
        }
    }

    async fn sign_and_publish_sync_message(
        self,
        slot: Slot,
        beacon_block_root: Hash256,
        validator_index: u64,
        validator: Arc<AttachedValidator>,
        subnet_id: SyncSubnetId,
    ) {
        let epoch = slot.epoch(T::EthSpec::slots_per_epoch());
        let signing_context = SigningContext {
            domain: Domain::SyncCommittee,
            epoch,
            fork: self.chain.fork_at_epoch(epoch),
            genesis_validators_root: self.chain.genesis_validators_root(),
        };

        let signature = match validator
            .signing_method()
            .get_signature::<T::EthSpec>(
                SignableMessage::SyncCommitteeSignature {
                    beacon_block_root,
                    slot,
                },
                signing_context,
                &self.spec,
            )
            .await
        {
            Ok(signature) => signature,
            Err(e) => {
                metrics::inc_counter_vec(&metrics::SIGNER_FAILURES, &[metrics::SYNC_MESSAGE]);
                warn!(
                    validator = ?validator.voting_pubkey(),
                    slot = %slot,
                    error = ?e,
                    "Failed to sign sync committee message"
                );
                return;
            }
        };

        let message =
            SyncCommitteeMessage::new(slot, beacon_block_root, validator_index, signature);

        if let Some(reason) = self
            .gossip_validator
            .validate_sync_committee_message(&message, subnet_id)
            .reject_reason()
        {
            crit!(
                validator_index,
                slot = %slot,
                %reason,
                "Own sync committee message failed gossip validation"
            );
            return;
        }

        self.network
            .broadcast_sync_committee_message(subnet_id, &message);
        metrics::inc_counter(&metrics::SYNC_MESSAGES_PUBLISHED);
        if let Some(delay) = self.seconds_since_deadline(slot, self.attestation_offset()) {
            metrics::observe_vec(
                &metrics::DUTY_SEND_DELAY_SECONDS,
                &[metrics::SYNC_MESSAGE],
                delay,
            );
        }

        trace!(
            validator_index,
            slot = %slot,
            subnet = %subnet_id,
            head_block = ?beacon_block_root,
            "Published sync committee message"
        );
    }

    /// Produce `SignedContributionAndProof`s for every attached subcommittee
    /// aggregator at `slot`. Joined phase, parallel selection-proof signing.
    pub(crate) async fn publish_sync_committee_contributions(&self, head: &BlockRef, slot: Slot) {
        if !self
            .spec
            .fork_name_at_slot::<T::EthSpec>(slot)
            .altair_enabled()
        {
            return;
        }
        let sync_committee = match self.chain.sync_committee_at_slot(slot + 1) {
            Ok(sync_committee) => sync_committee,
            Err(ChainError::PreAltair) => return,
            Err(e) => {
                error!(slot = %slot, error = ?e, "Cannot resolve sync committee");
                return;
            }
        };

        let mut duties = Vec::new();
        for (pubkey, validator) in self.validators.iter() {
            let Some(validator_index) = validator.index() else {
                continue;
            };
            for (subnet_id, _positions) in
                sync_committee.subcommittee_positions_for_public_key(pubkey)
            {
                duties.push(ContributionDuty {
                    validator: validator.clone(),
                    validator_index,
                    subnet_id,
                });
            }
        }
        if duties.is_empty() {
            return;
        }

        let epoch = slot.epoch(T::EthSpec::slots_per_epoch());
        let signing_futures = duties.into_iter().map(|duty| {
            let service = self.clone();
            async move {
                let selection_data = SyncAggregatorSelectionData {
                    slot,
                    subcommittee_index: duty.subnet_id.as_u64(),
                };
                let signing_context = SigningContext {
                    domain: Domain::SyncCommitteeSelectionProof,
                    epoch,
                    fork: service.chain.fork_at_epoch(epoch),
                    genesis_validators_root: service.chain.genesis_validators_root(),
                };
                match duty
                    .validator
                    .signing_method()
                    .get_signature::<T::EthSpec>(
                        SignableMessage::SyncSelectionProof(&selection_data),
                        signing_context,
                        &service.spec,
                    )
                    .await
                {
                    Ok(signature) => Some((duty, SyncSelectionProof::from(signature))),
                    Err(e) => {
                        metrics::inc_counter_vec(
                            &metrics::SIGNER_FAILURES,
                            &[metrics::SYNC_SELECTION_PROOF],
                        );
                        warn!(
                            validator = ?duty.validator.voting_pubkey(),
                            slot = %slot,
                            error = ?e,
                            "Failed to sign sync selection proof"
                        );
                        None
                    }
                }
            }
        });

        for (duty, selection_proof) in join_all(signing_futures).await.into_iter().flatten() {
            if !selection_proof
                .is_aggregator::<T::EthSpec>()
                .unwrap_or(false)
            {
                continue;
            }

            let Some(contribution) =
                self.sync_message_pool
                    .produce_contribution(slot, head.root, duty.subnet_id.as_u64())
            else {
                // Pool miss: no messages for this subcommittee.
                continue;
            };

            let contribution_and_proof = ContributionAndProof {
                aggregator_index: duty.validator_index,
                contribution,
                selection_proof: selection_proof.into(),
            };

            let signing_context = SigningContext {
                domain: Domain::ContributionAndProof,
                epoch,
                fork: self.chain.fork_at_epoch(epoch),
                genesis_validators_root: self.chain.genesis_validators_root(),
            };
            let signature = match duty
                .validator
                .signing_method()
                .get_signature::<T::EthSpec>(
                    SignableMessage::SignedContributionAndProof(&contribution_and_proof),
                    signing_context,
                    &self.spec,
                )
                .await
            {
                Ok(signature) => signature,
                Err(e) => {
                    metrics::inc_counter_vec(
                        &metrics::SIGNER_FAILURES,
                        &[metrics::SYNC_CONTRIBUTION],
                    );
                    warn!(
                        validator = ?duty.validator.voting_pubkey(),
                        slot = %slot,
                        error = ?e,
                        "Failed to sign contribution and proof"
                    );
                    continue;
                }
            };
            let signed = SignedContributionAndProof {
                message: contribution_and_proof,
                signature,
            };

            if let Some(reason) = self
                .gossip_validator
                .validate_sync_committee_contribution(&signed)
                .reject_reason()
            {
                crit!(
                    aggregator = signed.message.aggregator_index,
                    slot = %slot,
                    %reason,
                    "Own sync contribution failed gossip validation"
                );
                continue;
            }

            self.network.broadcast_sync_committee_contribution(&signed);
            metrics::inc_counter(&metrics::SYNC_CONTRIBUTIONS_PUBLISHED);
            if let Some(delay) = self.seconds_since_deadline(slot, self.aggregate_offset()) {
                metrics::observe_vec(
                    &metrics::DUTY_SEND_DELAY_SECONDS,
                    &[metrics::SYNC_CONTRIBUTION],
                    delay,
                );
            }

            if self.config.dump_enabled {
                dump::dump_sync_contribution(&self.config.dump_dir, &signed);
            }

            info!(
                aggregator = signed.message.aggregator_index,
                signatures = signed.message.contribution.num_set_aggregation_bits(),
                subcommittee = signed.message.contribution.subcommittee_index,
                slot = %slot,
                "Published sync contribution"
            );
        }
    }

    /// Bulk sync-committee message submission (external API path).
    ///
    /// Messages are partitioned by sync-committee period against the head
    /// state: only the current and next period are routable. The returned
    /// vector preserves the input order, one `Result` per input message.
    pub async fn send_sync_committee_messages(
        &self,
        messages: Vec<SyncCommitteeMessage>,
    ) -> Vec<Result<(), String>> {
        let head = self.chain.head();
        let current_period = match head
            .slot
            .epoch(T::EthSpec::slots_per_epoch())
            .sync_committee_period(&self.spec)
        {
            Ok(period) => period,
            Err(e) => {
                return messages
                    .iter()
                    .map(|_| Err(format!("cannot compute sync committee period: {:?}", e)))
                    .collect()
            }
        };
        let next_period = current_period + 1;

        let state_validators = self.chain.state_validators();
        let current_committee = self.chain.current_sync_committee();
        let next_committee = self.chain.next_sync_committee();

        let mut results = Vec::with_capacity(messages.len());
        let mut dispatch: HashMap<SyncSubnetId, Vec<SyncCommitteeMessage>> = HashMap::new();

        for message in &messages {
            let outcome = (|| -> Result<Vec<SyncSubnetId>, String> {
                let message_period = message
                    .slot
                    .epoch(T::EthSpec::slots_per_epoch())
                    .sync_committee_period(&self.spec)
                    .map_err(|e| format!("cannot compute sync committee period: {:?}", e))?;

                let committee = if message_period == current_period {
                    &current_committee
                } else if message_period == next_period {
                    &next_committee
                } else {
                    return Err(format!(
                        "sync committee period {} is neither current ({}) nor next",
                        message_period, current_period
                    ));
                };
                let committee = committee
                    .as_ref()
                    .map_err(|e| format!("sync committee unavailable: {:?}", e))?;

                let pubkey = state_validators
                    .get(message.validator_index as usize)
                    .map(|v| v.pubkey)
                    .ok_or_else(|| {
                        format!("unknown validator index {}", message.validator_index)
                    })?;

                let positions = committee.subcommittee_positions_for_public_key(&pubkey);
                if positions.is_empty() {
                    return Err(format!(
                        "validator {} is not in the period's sync committee",
                        message.validator_index
                    ));
                }

                for subnet_id in positions.keys() {
                    if let Some(reason) = self
                        .gossip_validator
                        .validate_sync_committee_message(message, *subnet_id)
                        .reject_reason()
                    {
                        return Err(reason);
                    }
                }

                Ok(positions.keys().copied().collect())
            })();

            match outcome {
                Ok(subnets) => {
                    results.push(Ok(()));
                    for subnet_id in subnets {
                        dispatch.entry(subnet_id).or_default().push(message.clone());
                    }
                }
                Err(reason) => {
                    debug!(
                        validator_index = message.validator_index,
                        slot = %message.slot,
                        %reason,
                        "Rejecting submitted sync committee message"
                    );
                    results.push(Err(reason));
                }
            }
        }

        // Per-subcommittee sends run concurrently.
        let send_futures = dispatch.into_iter().map(|(subnet_id, messages)| {
            let service = self.clone();
            async move {
                for message in &messages {
                    service
                        .network
                        .broadcast_sync_committee_message(subnet_id, message);
                }
            }
        });
        join_all(send_futures).await;

        results
    }
}
