//! The block proposal path: resolve the proposer, assemble a fork-appropriate
//! block from the pools, pass the slashing gate, sign, broadcast, store.

use crate::chain::{BlockRef, ChainError};
use crate::{dump, metrics, DutyEngine, DutyEngineTypes};
use attached_validators::AttachedValidator;
use logging::crit;
use signing_method::{Error as SigningError, SignableMessage, SigningContext};
use slashing_protection::NotSafe;
use std::sync::Arc;
use tracing::{debug, error, info, trace};
use types::typenum::Unsigned;
use types::{
    BeaconBlock, BeaconBlockAltair, BeaconBlockBase, BeaconBlockBellatrix, BeaconBlockBodyAltair,
    BeaconBlockBodyBase, BeaconBlockBodyBellatrix, Domain, EthSpec, FixedBytesExtended, ForkName,
    Hash256, SignedBeaconBlock, Signature, Slot, VariableList,
};

#[derive(Debug)]
pub enum BlockError {
    SignerFailure(SigningError),
    SlashingProtectionTripped(NotSafe),
    Chain(ChainError),
    InvalidOperationList(String),
    GossipRejected(String),
}

impl From<ChainError> for BlockError {
    fn from(e: ChainError) -> Self {
        BlockError::Chain(e)
    }
}

impl<T: DutyEngineTypes> DutyEngine<T> {
    /// Produce a block for `slot` if one of our validators is its proposer.
    ///
    /// Returns the new head on success and the unchanged `head` on any skip
    /// or failure; the slot driver never sees an error.
    pub(crate) async fn propose(&self, head: BlockRef, slot: Slot) -> BlockRef {
        if head.slot >= slot {
            debug!(
                head_slot = %head.slot,
                slot = %slot,
                "Chain already advanced past proposal slot"
            );
            return head;
        }

        let Some(proposer_index) = self.chain.get_proposer(&head, slot) else {
            trace!(slot = %slot, "No proposer known for slot");
            return head;
        };
        let state_validators = self.chain.state_validators();
        let Some(validator) = self.validators.get_by_index(&state_validators, proposer_index)
        else {
            trace!(slot = %slot, proposer_index, "Proposer is not one of ours");
            return head;
        };

        match self.publish_block(head, slot, proposer_index, validator).await {
            Ok(new_head) => new_head,
            Err(BlockError::SlashingProtectionTripped(e)) => {
                crit!(
                    slot = %slot,
                    proposer_index,
                    error = ?e,
                    "Block proposal would violate slashing protection"
                );
                head
            }
            Err(e) => {
                error!(slot = %slot, proposer_index, error = ?e, "Error whilst producing block");
                head
            }
        }
    }

    async fn publish_block(
        &self,
        head: BlockRef,
        slot: Slot,
        proposer_index: u64,
        validator: Arc<AttachedValidator>,
    ) -> Result<BlockRef, BlockError> {
        let epoch = slot.epoch(T::EthSpec::slots_per_epoch());
        let fork = self.chain.fork_at_epoch(epoch);
        let genesis_validators_root = self.chain.genesis_validators_root();

        let randao_reveal = validator
            .signing_method()
            .get_signature::<T::EthSpec>(
                SignableMessage::RandaoReveal(epoch),
                SigningContext {
                    domain: Domain::Randao,
                    epoch,
                    fork,
                    genesis_validators_root,
                },
                &self.spec,
            )
            .await
            .map_err(|e| {
                metrics::inc_counter_vec(&metrics::SIGNER_FAILURES, &[metrics::RANDAO]);
                BlockError::SignerFailure(e)
            })?;

        let block = self.make_block_for(&head, slot, proposer_index, randao_reveal)?;
        let block_root = block.canonical_root();

        // The protection record must be durable before the signer sees the block.
        let domain = self
            .spec
            .get_domain(epoch, Domain::BeaconProposer, &fork, genesis_validators_root);
        let signing_root = block.signing_root(domain);
        self.slashing_protection
            .check_and_insert_block_proposal(&validator.voting_pubkey(), slot, signing_root)
            .map_err(BlockError::SlashingProtectionTripped)?;

        let signature = validator
            .signing_method()
            .get_signature::<T::EthSpec>(
                SignableMessage::BeaconBlock(&block),
                SigningContext {
                    domain: Domain::BeaconProposer,
                    epoch,
                    fork,
                    genesis_validators_root,
                },
                &self.spec,
            )
            .await
            .map_err(|e| {
                metrics::inc_counter_vec(&metrics::SIGNER_FAILURES, &[metrics::BLOCK]);
                BlockError::SignerFailure(e)
            })?;

        let signed_block = SignedBeaconBlock {
            message: block,
            signature,
        };

        if let Some(reason) = self
            .gossip_validator
            .validate_beacon_block(&signed_block)
            .reject_reason()
        {
            return Err(BlockError::GossipRejected(reason));
        }

        // Broadcast before storing: propagation beats local bookkeeping.
        self.network.broadcast_beacon_block(&signed_block);
        metrics::inc_counter(&metrics::BEACON_BLOCKS_PROPOSED);

        info!(
            slot = %slot,
            root = ?block_root,
            attestations = signed_block.message.attestations_len(),
            deposits = signed_block.message.deposits_len(),
            exits = signed_block.message.voluntary_exits_len(),
            graffiti = %self.config.graffiti.as_utf8_lossy(),
            "Published beacon block"
        );

        if self.config.dump_enabled {
            dump::dump_signed_block(&self.config.dump_dir, &signed_block, block_root);
        }

        match self.chain.store_block(signed_block) {
            Ok(new_head) => Ok(new_head),
            Err(e) => {
                error!(root = ?block_root, error = ?e, "Unable to store own block");
                Ok(head)
            }
        }
    }

    /// Assemble an unsigned block on top of `head`.
    fn make_block_for(
        &self,
        head: &BlockRef,
        slot: Slot,
        proposer_index: u64,
        randao_reveal: Signature,
    ) -> Result<BeaconBlock<T::EthSpec>, BlockError> {
        let ctx = self.chain.proposal_context(head, slot)?;

        let mut attestations = self.attestation_pool.get_attestations_for_block();
        attestations.truncate(<T::EthSpec as EthSpec>::MaxAttestations::to_usize());
        let attestations = VariableList::new(attestations)
            .map_err(|e| BlockError::InvalidOperationList(format!("{:?}", e)))?;

        let mut voluntary_exits = self.exit_pool.get_beacon_block_exits();
        voluntary_exits.truncate(<T::EthSpec as EthSpec>::MaxVoluntaryExits::to_usize());
        let voluntary_exits = VariableList::new(voluntary_exits)
            .map_err(|e| BlockError::InvalidOperationList(format!("{:?}", e)))?;

        let mut deposits = ctx.deposits;
        deposits.truncate(<T::EthSpec as EthSpec>::MaxDeposits::to_usize());
        let deposits = VariableList::new(deposits)
            .map_err(|e| BlockError::InvalidOperationList(format!("{:?}", e)))?;

        let graffiti = self.config.graffiti;

        let block = match self.spec.fork_name_at_slot::<T::EthSpec>(slot) {
            ForkName::Base => BeaconBlock::Base(BeaconBlockBase {
                slot,
                proposer_index,
                parent_root: ctx.parent_root,
                state_root: Hash256::zero(),
                body: BeaconBlockBodyBase {
                    randao_reveal,
                    eth1_data: ctx.eth1_data,
                    graffiti,
                    proposer_slashings: <_>::default(),
                    attester_slashings: <_>::default(),
                    attestations,
                    deposits,
                    voluntary_exits,
                },
            }),
            ForkName::Altair => BeaconBlock::Altair(BeaconBlockAltair {
                slot,
                proposer_index,
                parent_root: ctx.parent_root,
                state_root: Hash256::zero(),
                body: BeaconBlockBodyAltair {
                    randao_reveal,
                    eth1_data: ctx.eth1_data,
                    graffiti,
                    proposer_slashings: <_>::default(),
                    attester_slashings: <_>::default(),
                    attestations,
                    deposits,
                    voluntary_exits,
                    sync_aggregate: self.sync_message_pool.produce_sync_aggregate(ctx.parent_root),
                },
            }),
            ForkName::Bellatrix => BeaconBlock::Bellatrix(BeaconBlockBellatrix {
                slot,
                proposer_index,
                parent_root: ctx.parent_root,
                state_root: Hash256::zero(),
                body: BeaconBlockBodyBellatrix {
                    randao_reveal,
                    eth1_data: ctx.eth1_data,
                    graffiti,
                    proposer_slashings: <_>::default(),
                    attester_slashings: <_>::default(),
                    attestations,
                    deposits,
                    voluntary_exits,
                    sync_aggregate: self.sync_message_pool.produce_sync_aggregate(ctx.parent_root),
                    execution_payload: ctx.execution_payload,
                },
            }),
        };

        self.chain
            .complete_state_root(block)
            .map_err(BlockError::Chain)
    }
}
