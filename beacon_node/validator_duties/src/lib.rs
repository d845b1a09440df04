//! The validator duties engine.
//!
//! On every slot tick the engine determines which consensus-layer actions the
//! locally attached validators owe the network (block proposals,
//! attestations, aggregations, sync-committee messages and contributions) and
//! executes them within the slot's time budget, gated by the slashing
//! protection store.
//!
//! The engine orchestrates its collaborators but implements none of them:
//! fork choice ([`chain::ChainView`]), the operation pools ([`pools`]),
//! gossip validation and broadcast ([`network`]) and the signing backends
//! (`signing_method`) are all consumed by interface.
//!
//! ## Scheduling
//!
//! All engine logic is driven by one spawned task per slot tick; collaborator
//! calls are synchronous cache reads and the only suspension points are
//! signature requests, clock waits and network sends. Fire-and-forget duties
//! (individual attestations and sync messages) are detached via the
//! `TaskExecutor` and catch their own failures.

pub mod action_tracker;
pub mod api;
pub mod attestation_service;
pub mod block_service;
pub mod chain;
pub mod config;
pub mod doppelganger;
pub mod dump;
pub mod metrics;
pub mod network;
pub mod pools;
pub mod sync_committee_service;
pub mod test_utils;

use crate::action_tracker::ActionTracker;
use crate::chain::{BlockRef, ChainView};
use crate::config::Config;
use crate::doppelganger::DoppelgangerGate;
use crate::network::{GossipValidator, Network};
use crate::pools::{AttestationPool, ExitPool, SyncCommitteeMessagePool};
use attached_validators::AttachedValidators;
use logging::crit;
use slashing_protection::SlashingDatabase;
use slot_clock::SlotClock;
use std::cmp;
use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;
use task_executor::TaskExecutor;
use tokio::time::{sleep, sleep_until, timeout_at, Instant};
use tracing::{debug, error, info, trace, warn};
use types::{ChainSpec, Epoch, EthSpec, SelectionProof, Slot, SubnetId};

/// The slot is divided into thirds: attest at 1/3, aggregate at 2/3.
pub const INTERVALS_PER_SLOT: u64 = 3;

/// Attestations go out this fraction of the way through the slot.
pub const ATTESTATION_SLOT_OFFSET_DIVISOR: u64 = INTERVALS_PER_SLOT;
/// Sync committee messages share the attestation point of the slot, so that
/// messages always precede contributions.
pub const SYNC_MESSAGE_SLOT_OFFSET_DIVISOR: u64 = INTERVALS_PER_SLOT;
const _: () = assert!(ATTESTATION_SLOT_OFFSET_DIVISOR == SYNC_MESSAGE_SLOT_OFFSET_DIVISOR);

/// Extra propagation delay granted to a block that arrives before the
/// attestation cutoff, bounded by `attestation_deadline + BLOCK_PROPAGATION_DELAY`.
pub const BLOCK_PROPAGATION_DELAY: Duration = Duration::from_millis(1000);

/// How many slots ahead duties are registered with the `ActionTracker`.
pub const SUBNET_SUBSCRIPTION_LEAD_TIME_SLOTS: u64 = 34;

/// Aggregation is skipped in the first slots after genesis.
pub const MIN_AGGREGATION_SLOT: u64 = 2;

/// Concrete collaborator types for a `DutyEngine`.
pub trait DutyEngineTypes: Send + Sync + Sized + 'static {
    type EthSpec: EthSpec;
    type SlotClock: SlotClock + 'static;
    type ChainView: ChainView<Self::EthSpec>;
    type AttestationPool: AttestationPool<Self::EthSpec>;
    type ExitPool: ExitPool;
    type SyncMessagePool: SyncCommitteeMessagePool<Self::EthSpec>;
    type GossipValidator: GossipValidator<Self::EthSpec>;
    type Network: Network<Self::EthSpec>;
}

/// Helper to minimise `Arc` usage.
pub struct Inner<T: DutyEngineTypes> {
    pub chain: Arc<T::ChainView>,
    pub attestation_pool: Arc<T::AttestationPool>,
    pub exit_pool: Arc<T::ExitPool>,
    pub sync_message_pool: Arc<T::SyncMessagePool>,
    pub gossip_validator: Arc<T::GossipValidator>,
    pub network: Arc<T::Network>,
    pub validators: AttachedValidators,
    pub slashing_protection: SlashingDatabase,
    pub slot_clock: T::SlotClock,
    pub executor: TaskExecutor,
    pub spec: Arc<ChainSpec>,
    pub config: Config,
    pub action_tracker: ActionTracker,
    pub doppelganger: DoppelgangerGate,
}

/// The orchestrator, driven by the clock on each slot.
pub struct DutyEngine<T: DutyEngineTypes> {
    inner: Arc<Inner<T>>,
}

impl<T: DutyEngineTypes> Clone for DutyEngine<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: DutyEngineTypes> Deref for DutyEngine<T> {
    type Target = Inner<T>;

    fn deref(&self) -> &Self::Target {
        self.inner.deref()
    }
}

/// Builds a `DutyEngine`.
pub struct DutyEngineBuilder<T: DutyEngineTypes> {
    chain: Option<Arc<T::ChainView>>,
    attestation_pool: Option<Arc<T::AttestationPool>>,
    exit_pool: Option<Arc<T::ExitPool>>,
    sync_message_pool: Option<Arc<T::SyncMessagePool>>,
    gossip_validator: Option<Arc<T::GossipValidator>>,
    network: Option<Arc<T::Network>>,
    validators: Option<AttachedValidators>,
    slashing_protection: Option<SlashingDatabase>,
    slot_clock: Option<T::SlotClock>,
    executor: Option<TaskExecutor>,
    spec: Option<Arc<ChainSpec>>,
    config: Config,
}

impl<T: DutyEngineTypes> Default for DutyEngineBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: DutyEngineTypes> DutyEngineBuilder<T> {
    pub fn new() -> Self {
        Self {
            chain: None,
            attestation_pool: None,
            exit_pool: None,
            sync_message_pool: None,
            gossip_validator: None,
            network: None,
            validators: None,
            slashing_protection: None,
            slot_clock: None,
            executor: None,
            spec: None,
            config: Config::default(),
        }
    }

    pub fn chain(mut self, chain: Arc<T::ChainView>) -> Self {
        self.chain = Some(chain);
        self
    }

    pub fn attestation_pool(mut self, pool: Arc<T::AttestationPool>) -> Self {
        self.attestation_pool = Some(pool);
        self
    }

    pub fn exit_pool(mut self, pool: Arc<T::ExitPool>) -> Self {
        self.exit_pool = Some(pool);
        self
    }

    pub fn sync_message_pool(mut self, pool: Arc<T::SyncMessagePool>) -> Self {
        self.sync_message_pool = Some(pool);
        self
    }

    pub fn gossip_validator(mut self, gossip_validator: Arc<T::GossipValidator>) -> Self {
        self.gossip_validator = Some(gossip_validator);
        self
    }

    pub fn network(mut self, network: Arc<T::Network>) -> Self {
        self.network = Some(network);
        self
    }

    pub fn validators(mut self, validators: AttachedValidators) -> Self {
        self.validators = Some(validators);
        self
    }

    pub fn slashing_protection(mut self, slashing_protection: SlashingDatabase) -> Self {
        self.slashing_protection = Some(slashing_protection);
        self
    }

    pub fn slot_clock(mut self, slot_clock: T::SlotClock) -> Self {
        self.slot_clock = Some(slot_clock);
        self
    }

    pub fn executor(mut self, executor: TaskExecutor) -> Self {
        self.executor = Some(executor);
        self
    }

    pub fn spec(mut self, spec: Arc<ChainSpec>) -> Self {
        self.spec = Some(spec);
        self
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<DutyEngine<T>, String> {
        let validators = self
            .validators
            .ok_or("Cannot build DutyEngine without validators")?;
        let slashing_protection = self
            .slashing_protection
            .ok_or("Cannot build DutyEngine without slashing_protection")?;
        let slot_clock = self
            .slot_clock
            .ok_or("Cannot build DutyEngine without slot_clock")?;

        // Every attached validator must have a protection record before any
        // signature can be requested.
        slashing_protection
            .register_validators(validators.iter().map(|(pubkey, _)| pubkey))
            .map_err(|e| format!("Unable to register validators: {:?}", e))?;

        let startup_epoch = slot_clock
            .now()
            .unwrap_or_else(|| slot_clock.genesis_slot())
            .epoch(T::EthSpec::slots_per_epoch());
        let config = self.config;
        let doppelganger = DoppelgangerGate::new(config.doppelganger_detection, startup_epoch);

        if config.doppelganger_detection {
            info!(
                broadcast_start_epoch = %doppelganger.broadcast_start_epoch(),
                "Doppelganger detection enabled, duties are held back"
            );
        }

        Ok(DutyEngine {
            inner: Arc::new(Inner {
                chain: self.chain.ok_or("Cannot build DutyEngine without chain")?,
                attestation_pool: self
                    .attestation_pool
                    .ok_or("Cannot build DutyEngine without attestation_pool")?,
                exit_pool: self
                    .exit_pool
                    .ok_or("Cannot build DutyEngine without exit_pool")?,
                sync_message_pool: self
                    .sync_message_pool
                    .ok_or("Cannot build DutyEngine without sync_message_pool")?,
                gossip_validator: self
                    .gossip_validator
                    .ok_or("Cannot build DutyEngine without gossip_validator")?,
                network: self
                    .network
                    .ok_or("Cannot build DutyEngine without network")?,
                validators,
                slashing_protection,
                slot_clock,
                executor: self
                    .executor
                    .ok_or("Cannot build DutyEngine without executor")?,
                spec: self.spec.ok_or("Cannot build DutyEngine without spec")?,
                config,
                action_tracker: ActionTracker::default(),
                doppelganger,
            }),
        })
    }
}

impl<T: DutyEngineTypes> DutyEngine<T> {
    pub fn builder() -> DutyEngineBuilder<T> {
        DutyEngineBuilder::new()
    }

    /// Starts the service which runs `on_slot` on every slot tick.
    pub fn start_update_service(self) -> Result<(), String> {
        let duration_to_next_slot = self
            .slot_clock
            .duration_to_next_slot()
            .ok_or("Unable to determine duration to next slot")?;

        info!(
            next_update_millis = duration_to_next_slot.as_millis(),
            "Duty engine started"
        );

        let executor = self.executor.clone();
        let slot_duration = self.slot_clock.slot_duration();

        let interval_fut = async move {
            let mut last_slot = self
                .slot_clock
                .now()
                .unwrap_or_else(|| self.slot_clock.genesis_slot());

            loop {
                if let Some(duration_to_next_slot) = self.slot_clock.duration_to_next_slot() {
                    sleep(duration_to_next_slot).await;

                    let Some(current_slot) = self.slot_clock.now() else {
                        error!("Failed to read slot clock");
                        sleep(slot_duration).await;
                        continue;
                    };

                    self.on_slot(last_slot, current_slot).await;
                    last_slot = current_slot;
                } else {
                    error!("Failed to read slot clock");
                    // If we can't read the slot clock, just wait another slot.
                    sleep(slot_duration).await;
                }
            }
        };

        executor.spawn(interval_fut, "duty_engine");
        Ok(())
    }

    /// Perform all duties owed between `last_slot` (exclusive) and
    /// `current_slot` (inclusive).
    ///
    /// Never returns an error: every failure is logged at the site that can
    /// describe it, and the engine proceeds to its best-effort remainder.
    pub async fn on_slot(&self, last_slot: Slot, current_slot: Slot) {
        if self.validators.is_empty() {
            trace!(slot = %current_slot, "No attached validators, nothing to do");
            return;
        }

        let head = self.chain.head();

        if !self.is_synced(&head, current_slot) {
            metrics::inc_counter(&metrics::ENGINE_NOT_SYNCED);
            warn!(
                head_slot = %head.slot,
                wall_slot = %current_slot,
                next_attestation_slot = ?self.action_tracker.next_attestation_slot(current_slot),
                next_proposal_slot = ?self.action_tracker.next_proposal_slot(current_slot),
                "Head is too far behind wall clock, skipping duties"
            );
            self.update_validator_metrics();
            return;
        }

        let current_epoch = current_slot.epoch(T::EthSpec::slots_per_epoch());
        if !self.doppelganger.allows_broadcast(current_epoch) {
            debug!(
                epoch = %current_epoch,
                broadcast_start_epoch = %self.doppelganger.broadcast_start_epoch(),
                "Doppelganger detection in progress, holding duties back"
            );
            return;
        }

        self.register_duties(current_slot).await;

        // Catch up any slots the node slept through, proposals first so that
        // a late proposal can still extend the chain the attestations vote on.
        let mut head = head;
        let mut slot = last_slot + 1;
        while slot < current_slot {
            head = self.propose(head, slot).await;
            self.attest(&head, slot);
            slot += 1;
        }
        // The proposal may advance the head, but the post-wait head is
        // re-read from the chain either way.
        self.propose(head, current_slot).await;

        // Wait for a block to arrive, or the attestation cutoff, whichever is
        // sooner. A block that does arrive is granted an extra propagation
        // delay before we attest to it.
        if let Some(deadline) = self.attestation_cutoff_instant(current_slot) {
            let block_arrival = self.chain.expect_block(current_slot);
            if (timeout_at(deadline, block_arrival).await).is_ok_and(|res| res.is_ok()) {
                let after_arrival = Instant::now() + BLOCK_PROPAGATION_DELAY;
                let cap = deadline + BLOCK_PROPAGATION_DELAY;
                sleep_until(cmp::min(after_arrival, cap)).await;
            }
        } else {
            warn!(slot = %current_slot, "Unable to compute attestation cutoff");
        }

        let head = self.chain.head();
        self.attest(&head, current_slot);
        self.publish_sync_committee_messages(&head, current_slot);
        self.update_validator_metrics();

        if current_slot > MIN_AGGREGATION_SLOT {
            if let Some(aggregate_cutoff) = self.aggregate_cutoff_instant(current_slot) {
                sleep_until(aggregate_cutoff).await;
            }
            let head = self.chain.head();
            futures::future::join(
                self.publish_aggregates(&head, current_slot),
                self.publish_sync_committee_contributions(&head, current_slot),
            )
            .await;
        }

        self.action_tracker.prune(current_slot);
        trace!(slot = %current_slot, "Slot duties completed");
    }

    /// Whether the head is close enough to the wall clock for duties to be safe.
    ///
    /// This is an acknowledged placeholder heuristic: distance-to-head alone
    /// says nothing about peers or block arrival.
    fn is_synced(&self, head: &BlockRef, wall_slot: Slot) -> bool {
        head.slot + self.config.sync_horizon >= wall_slot
    }

    /// Register duties for the subscription lookahead window with the tracker.
    async fn register_duties(&self, wall_slot: Slot) {
        let head = self.chain.head();
        let state_validators = self.chain.state_validators();

        for slot in (wall_slot.as_u64()..wall_slot.as_u64() + SUBNET_SUBSCRIPTION_LEAD_TIME_SLOTS)
            .map(Slot::new)
        {
            if let Some(proposer) = self.chain.get_proposer(&head, slot) {
                if self
                    .validators
                    .get_by_index(&state_validators, proposer)
                    .is_some()
                {
                    self.action_tracker.register_proposal(slot, proposer);
                }
            }

            let epoch = slot.epoch(T::EthSpec::slots_per_epoch());
            let epoch_ref = match self.chain.get_epoch_ref(&head, epoch) {
                Ok(epoch_ref) => epoch_ref,
                Err(e) => {
                    debug!(slot = %slot, error = ?e, "Cannot resolve committees for duty registration");
                    continue;
                }
            };

            for (committee_index, committee) in
                epoch_ref.committees_at_slot(slot).iter().enumerate()
            {
                for &validator_index in committee {
                    let Some(pubkey) = epoch_ref.pubkey(validator_index) else {
                        continue;
                    };
                    let Some(validator) = self.validators.get(&pubkey) else {
                        continue;
                    };
                    if self
                        .action_tracker
                        .has_attestation_duty(slot, validator_index)
                    {
                        continue;
                    }

                    let subnet_id = match SubnetId::compute_subnet::<T::EthSpec>(
                        slot,
                        committee_index as u64,
                        epoch_ref.committees_per_slot,
                        &self.spec,
                    ) {
                        Ok(subnet_id) => subnet_id,
                        Err(e) => {
                            crit!(error = ?e, "Subnet computation failed");
                            continue;
                        }
                    };

                    let selection_proof = match self
                        .request_slot_signature(&validator, slot, epoch)
                        .await
                    {
                        Ok(proof) => proof,
                        Err(e) => {
                            debug!(
                                validator = ?pubkey,
                                slot = %slot,
                                error = ?e,
                                "Slot signature for duty registration failed"
                            );
                            continue;
                        }
                    };
                    let is_aggregator = selection_proof
                        .is_aggregator(committee.len(), &self.spec)
                        .unwrap_or(false);

                    self.action_tracker.register_attestation_duty(
                        slot,
                        subnet_id,
                        validator_index,
                        is_aggregator,
                    );
                }
            }
        }
    }

    /// Request a slot-only signature, used for aggregator selection.
    pub(crate) async fn request_slot_signature(
        &self,
        validator: &Arc<attached_validators::AttachedValidator>,
        slot: Slot,
        epoch: Epoch,
    ) -> Result<SelectionProof, signing_method::Error> {
        let signing_context = signing_method::SigningContext {
            domain: types::Domain::SelectionProof,
            epoch,
            fork: self.chain.fork_at_epoch(epoch),
            genesis_validators_root: self.chain.genesis_validators_root(),
        };
        validator
            .signing_method()
            .get_signature::<T::EthSpec>(
                signing_method::SignableMessage::SelectionProof(slot),
                signing_context,
                &self.spec,
            )
            .await
            .map(SelectionProof::from)
    }

    /// Update the per-validator balance gauges.
    ///
    /// Only the first 64 validators by registry iteration order are labelled;
    /// iteration order is unspecified, so the label identity is not stable
    /// across restarts.
    fn update_validator_metrics(&self) {
        for (_, validator) in self.validators.iter().take(64) {
            let Some(index) = validator.index() else {
                continue;
            };
            if let Some(balance) = self.chain.validator_balance(index) {
                metrics::set_gauge_vec(
                    &metrics::VALIDATOR_BALANCE_GWEI,
                    &[&index.to_string()],
                    balance as i64,
                );
            }
        }
    }

    /// The offset into the slot at which attestations (and sync messages) go out.
    pub(crate) fn attestation_offset(&self) -> Duration {
        self.slot_clock.slot_duration() / ATTESTATION_SLOT_OFFSET_DIVISOR as u32
    }

    /// The offset into the slot at which aggregates (and contributions) go out.
    pub(crate) fn aggregate_offset(&self) -> Duration {
        2 * self.slot_clock.slot_duration() / INTERVALS_PER_SLOT as u32
    }

    /// The instant one third into `slot`.
    fn attestation_cutoff_instant(&self, slot: Slot) -> Option<Instant> {
        self.slot_offset_instant(slot, self.attestation_offset())
    }

    /// The instant two thirds into `slot`.
    fn aggregate_cutoff_instant(&self, slot: Slot) -> Option<Instant> {
        self.slot_offset_instant(slot, self.aggregate_offset())
    }

    fn slot_offset_instant(&self, slot: Slot, offset: Duration) -> Option<Instant> {
        let start = self.slot_clock.start_of(slot)?;
        let now = self.slot_clock.now_duration()?;
        let remaining = (start + offset).checked_sub(now).unwrap_or(Duration::ZERO);
        Some(Instant::now() + remaining)
    }

    /// Seconds between now and the deadline `offset` into `slot`; negative when
    /// the duty went out ahead of its deadline.
    pub(crate) fn seconds_since_deadline(&self, slot: Slot, offset: Duration) -> Option<f64> {
        let deadline = self.slot_clock.start_of(slot)? + offset;
        let now = self.slot_clock.now_duration()?;
        Some(now.as_secs_f64() - deadline.as_secs_f64())
    }
}
