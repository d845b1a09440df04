//! Mock collaborators and a harness for driving the engine in tests.

use crate::chain::{BlockRef, ChainError, ChainView, EpochRef, ProposalContext};
use crate::config::Config;
use crate::network::{GossipValidator, Network, ValidationResult};
use crate::pools::{AttestationPool, ExitPool, SyncCommitteeMessagePool};
use crate::{DutyEngine, DutyEngineTypes};
use attached_validators::AttachedValidators;
use parking_lot::{Mutex, RwLock};
use slashing_protection::{SlashingDatabase, SLASHING_PROTECTION_FILENAME};
use slot_clock::{ManualSlotClock, SlotClock};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;
use task_executor::test_utils::TestRuntime;
use tempfile::TempDir;
use tokio::sync::oneshot;
use types::{
    AggregateSignature, Attestation, AttestationData, AttesterSlashing, BeaconBlock, BitVector,
    ChainSpec, Checkpoint, CommitteeIndex, Epoch, EthSpec, FixedBytesExtended, FixedVector, Fork,
    Hash256, Keypair, MinimalEthSpec, ProposerSlashing, PublicKeyBytes, SignedAggregateAndProof,
    SignedBeaconBlock, SignedContributionAndProof, SignedVoluntaryExit, Slot, SubnetId,
    SyncAggregate, SyncCommittee, SyncCommitteeContribution, SyncCommitteeMessage, SyncSubnetId,
    Validator,
};

pub type E = MinimalEthSpec;

/// Collaborator bindings used throughout the engine tests.
pub struct TestTypes;

impl DutyEngineTypes for TestTypes {
    type EthSpec = E;
    type SlotClock = ManualSlotClock;
    type ChainView = MockChainView;
    type AttestationPool = MockAttestationPool;
    type ExitPool = MockExitPool;
    type SyncMessagePool = MockSyncMessagePool;
    type GossipValidator = MockGossipValidator;
    type Network = RecordingNetwork;
}

/// A `ChainSpec` with Altair active from genesis, for sync-committee tests.
pub fn altair_spec() -> ChainSpec {
    let mut spec = ChainSpec::minimal();
    spec.altair_fork_epoch = Some(Epoch::new(0));
    spec
}

fn sync_committee_from(pubkeys: &[PublicKeyBytes]) -> Arc<SyncCommittee<E>> {
    let committee_size = E::sync_committee_size();
    let cycled = (0..committee_size)
        .map(|i| {
            pubkeys
                .get(i % pubkeys.len().max(1))
                .copied()
                .unwrap_or_else(PublicKeyBytes::empty)
        })
        .collect::<Vec<_>>();
    Arc::new(SyncCommittee {
        pubkeys: FixedVector::new(cycled).expect("committee construction uses the exact length"),
        aggregate_pubkey: PublicKeyBytes::empty(),
    })
}

/// A programmable, in-memory chain view.
///
/// Every slot has a single committee containing all validators.
pub struct MockChainView {
    pub spec: Arc<ChainSpec>,
    head: RwLock<BlockRef>,
    pub proposers: RwLock<HashMap<Slot, u64>>,
    pub validators: Arc<Vec<Validator>>,
    pub justified: RwLock<Checkpoint>,
    current_committee: Arc<SyncCommittee<E>>,
    next_committee: Arc<SyncCommittee<E>>,
    expectations: Mutex<HashMap<Slot, Vec<oneshot::Sender<BlockRef>>>>,
    pub stored_blocks: Mutex<Vec<SignedBeaconBlock<E>>>,
    pub eth1_unavailable: RwLock<bool>,
    genesis_validators_root: Hash256,
}

impl MockChainView {
    pub fn new(
        spec: Arc<ChainSpec>,
        validators: Arc<Vec<Validator>>,
        next_committee_pubkeys: &[PublicKeyBytes],
    ) -> Self {
        let own_pubkeys = validators.iter().map(|v| v.pubkey).collect::<Vec<_>>();
        Self {
            spec,
            head: RwLock::new(BlockRef {
                root: Hash256::repeat_byte(0xaa),
                slot: Slot::new(0),
            }),
            proposers: RwLock::new(HashMap::new()),
            current_committee: sync_committee_from(&own_pubkeys),
            next_committee: sync_committee_from(next_committee_pubkeys),
            validators,
            justified: RwLock::new(Checkpoint::default()),
            expectations: Mutex::new(HashMap::new()),
            stored_blocks: Mutex::new(Vec::new()),
            eth1_unavailable: RwLock::new(false),
            genesis_validators_root: Hash256::repeat_byte(0x01),
        }
    }

    pub fn set_head(&self, root: Hash256, slot: Slot) {
        *self.head.write() = BlockRef { root, slot };
    }

    pub fn set_proposer(&self, slot: Slot, validator_index: u64) {
        self.proposers.write().insert(slot, validator_index);
    }

    /// Deliver a gossip block to anyone awaiting `expect_block(slot)`.
    ///
    /// Returns `false` when nothing is waiting yet.
    pub fn try_deliver_block(&self, slot: Slot, block: BlockRef) -> bool {
        let mut expectations = self.expectations.lock();
        match expectations.remove(&slot) {
            Some(senders) => {
                *self.head.write() = block;
                for sender in senders {
                    let _ = sender.send(block);
                }
                true
            }
            None => false,
        }
    }

    fn head_period(&self) -> u64 {
        self.head
            .read()
            .slot
            .epoch(E::slots_per_epoch())
            .sync_committee_period(&self.spec)
            .unwrap_or(0)
    }
}

impl ChainView<E> for MockChainView {
    fn head(&self) -> BlockRef {
        *self.head.read()
    }

    fn block_at_slot(&self, head: &BlockRef, slot: Slot) -> BlockRef {
        if head.slot <= slot {
            *head
        } else {
            BlockRef {
                root: Hash256::from_low_u64_be(slot.as_u64().max(1)),
                slot,
            }
        }
    }

    fn get_proposer(&self, _head: &BlockRef, slot: Slot) -> Option<u64> {
        self.proposers.read().get(&slot).copied()
    }

    fn get_epoch_ref(
        &self,
        head: &BlockRef,
        epoch: Epoch,
    ) -> Result<Arc<EpochRef<E>>, ChainError> {
        let all_indices = (0..self.validators.len() as u64).collect::<Vec<_>>();
        let committees = (0..E::slots_per_epoch())
            .map(|_| vec![all_indices.clone()])
            .collect();
        Ok(Arc::new(EpochRef {
            epoch,
            justified_checkpoint: *self.justified.read(),
            target: Checkpoint {
                epoch,
                root: head.root,
            },
            committees_per_slot: 1,
            committees,
            validator_keys: self.validators.iter().map(|v| v.pubkey).collect(),
            _phantom: PhantomData,
        }))
    }

    fn fork_at_epoch(&self, epoch: Epoch) -> Fork {
        self.spec.fork_at_epoch(epoch)
    }

    fn genesis_validators_root(&self) -> Hash256 {
        self.genesis_validators_root
    }

    fn sync_committee_at_slot(&self, slot: Slot) -> Result<Arc<SyncCommittee<E>>, ChainError> {
        let period = slot
            .epoch(E::slots_per_epoch())
            .sync_committee_period(&self.spec)
            .map_err(|_| ChainError::EpochOutOfRange {
                epoch: slot.epoch(E::slots_per_epoch()),
            })?;
        let head_period = self.head_period();
        if period == head_period {
            Ok(self.current_committee.clone())
        } else if period == head_period + 1 {
            Ok(self.next_committee.clone())
        } else {
            Err(ChainError::EpochOutOfRange {
                epoch: slot.epoch(E::slots_per_epoch()),
            })
        }
    }

    fn current_sync_committee(&self) -> Result<Arc<SyncCommittee<E>>, ChainError> {
        Ok(self.current_committee.clone())
    }

    fn next_sync_committee(&self) -> Result<Arc<SyncCommittee<E>>, ChainError> {
        Ok(self.next_committee.clone())
    }

    fn state_validators(&self) -> Arc<Vec<Validator>> {
        self.validators.clone()
    }

    fn validator_balance(&self, _validator_index: u64) -> Option<u64> {
        Some(32_000_000_000)
    }

    fn proposal_context(
        &self,
        head: &BlockRef,
        _slot: Slot,
    ) -> Result<ProposalContext<E>, ChainError> {
        if *self.eth1_unavailable.read() {
            return Err(ChainError::Eth1DepositsUnavailable);
        }
        Ok(ProposalContext {
            parent_root: head.root,
            eth1_data: Default::default(),
            deposits: Vec::new(),
            execution_payload: Default::default(),
        })
    }

    fn complete_state_root(&self, mut block: BeaconBlock<E>) -> Result<BeaconBlock<E>, ChainError> {
        block.set_state_root(Hash256::repeat_byte(0x22));
        Ok(block)
    }

    fn expect_block(&self, slot: Slot) -> oneshot::Receiver<BlockRef> {
        let (tx, rx) = oneshot::channel();
        self.expectations.lock().entry(slot).or_default().push(tx);
        rx
    }

    fn store_block(&self, block: SignedBeaconBlock<E>) -> Result<BlockRef, ChainError> {
        let new_head = BlockRef {
            root: block.canonical_root(),
            slot: block.slot(),
        };
        self.stored_blocks.lock().push(block);
        *self.head.write() = new_head;
        Ok(new_head)
    }
}

/// Everything the engine handed to the network, in broadcast order.
#[derive(Debug, Clone)]
pub enum NetworkEvent {
    Block(SignedBeaconBlock<E>),
    Attestation(SubnetId, Attestation<E>),
    Aggregate(SignedAggregateAndProof<E>),
    SyncMessage(SyncSubnetId, SyncCommitteeMessage),
    SyncContribution(SignedContributionAndProof<E>),
    VoluntaryExit(SignedVoluntaryExit),
    AttesterSlashing(AttesterSlashing<E>),
    ProposerSlashing(ProposerSlashing),
}

#[derive(Default)]
pub struct RecordingNetwork {
    events: Mutex<Vec<(tokio::time::Instant, NetworkEvent)>>,
}

impl RecordingNetwork {
    fn record(&self, event: NetworkEvent) {
        self.events
            .lock()
            .push((tokio::time::Instant::now(), event));
    }

    pub fn events(&self) -> Vec<NetworkEvent> {
        self.events
            .lock()
            .iter()
            .map(|(_, event)| event.clone())
            .collect()
    }

    pub fn timed_events(&self) -> Vec<(tokio::time::Instant, NetworkEvent)> {
        self.events.lock().clone()
    }

    pub fn clear(&self) {
        self.events.lock().clear()
    }
}

impl Network<E> for RecordingNetwork {
    fn broadcast_beacon_block(&self, block: &SignedBeaconBlock<E>) {
        self.record(NetworkEvent::Block(block.clone()))
    }

    fn broadcast_attestation(&self, subnet_id: SubnetId, attestation: &Attestation<E>) {
        self.record(NetworkEvent::Attestation(subnet_id, attestation.clone()))
    }

    fn broadcast_aggregate_and_proof(&self, aggregate: &SignedAggregateAndProof<E>) {
        self.record(NetworkEvent::Aggregate(aggregate.clone()))
    }

    fn broadcast_sync_committee_message(
        &self,
        subnet_id: SyncSubnetId,
        message: &SyncCommitteeMessage,
    ) {
        self.record(NetworkEvent::SyncMessage(subnet_id, message.clone()))
    }

    fn broadcast_sync_committee_contribution(
        &self,
        contribution: &SignedContributionAndProof<E>,
    ) {
        self.record(NetworkEvent::SyncContribution(contribution.clone()))
    }

    fn broadcast_voluntary_exit(&self, exit: &SignedVoluntaryExit) {
        self.record(NetworkEvent::VoluntaryExit(exit.clone()))
    }

    fn broadcast_attester_slashing(&self, slashing: &AttesterSlashing<E>) {
        self.record(NetworkEvent::AttesterSlashing(slashing.clone()))
    }

    fn broadcast_proposer_slashing(&self, slashing: &ProposerSlashing) {
        self.record(NetworkEvent::ProposerSlashing(slashing.clone()))
    }
}

/// Gossip validator that accepts everything unless a per-topic override is set.
#[derive(Default)]
pub struct MockGossipValidator {
    overrides: RwLock<HashMap<&'static str, ValidationResult>>,
}

pub mod topics {
    pub const BEACON_BLOCK: &str = "beacon_block";
    pub const ATTESTATION: &str = "attestation";
    pub const AGGREGATE: &str = "aggregate";
    pub const SYNC_MESSAGE: &str = "sync_message";
    pub const SYNC_CONTRIBUTION: &str = "sync_contribution";
    pub const VOLUNTARY_EXIT: &str = "voluntary_exit";
    pub const ATTESTER_SLASHING: &str = "attester_slashing";
    pub const PROPOSER_SLASHING: &str = "proposer_slashing";
}

impl MockGossipValidator {
    pub fn set(&self, topic: &'static str, result: ValidationResult) {
        self.overrides.write().insert(topic, result);
    }

    fn get(&self, topic: &str) -> ValidationResult {
        self.overrides
            .read()
            .get(topic)
            .cloned()
            .unwrap_or(ValidationResult::Accept)
    }
}

impl GossipValidator<E> for MockGossipValidator {
    fn validate_beacon_block(&self, _block: &SignedBeaconBlock<E>) -> ValidationResult {
        self.get(topics::BEACON_BLOCK)
    }

    fn validate_attestation(
        &self,
        _attestation: &Attestation<E>,
        _subnet_id: SubnetId,
    ) -> ValidationResult {
        self.get(topics::ATTESTATION)
    }

    fn validate_aggregate_and_proof(
        &self,
        _aggregate: &SignedAggregateAndProof<E>,
    ) -> ValidationResult {
        self.get(topics::AGGREGATE)
    }

    fn validate_sync_committee_message(
        &self,
        _message: &SyncCommitteeMessage,
        _subnet_id: SyncSubnetId,
    ) -> ValidationResult {
        self.get(topics::SYNC_MESSAGE)
    }

    fn validate_sync_committee_contribution(
        &self,
        _contribution: &SignedContributionAndProof<E>,
    ) -> ValidationResult {
        self.get(topics::SYNC_CONTRIBUTION)
    }

    fn validate_voluntary_exit(&self, _exit: &SignedVoluntaryExit) -> ValidationResult {
        self.get(topics::VOLUNTARY_EXIT)
    }

    fn validate_attester_slashing(&self, _slashing: &AttesterSlashing<E>) -> ValidationResult {
        self.get(topics::ATTESTER_SLASHING)
    }

    fn validate_proposer_slashing(&self, _slashing: &ProposerSlashing) -> ValidationResult {
        self.get(topics::PROPOSER_SLASHING)
    }
}

#[derive(Default)]
pub struct MockAttestationPool {
    pub for_block: RwLock<Vec<Attestation<E>>>,
    /// When `false`, `get_aggregated_attestation` simulates a pool miss.
    pub provide_aggregates: RwLock<bool>,
}

impl MockAttestationPool {
    pub fn providing() -> Self {
        Self {
            for_block: RwLock::new(Vec::new()),
            provide_aggregates: RwLock::new(true),
        }
    }
}

impl AttestationPool<E> for MockAttestationPool {
    fn get_attestations_for_block(&self) -> Vec<Attestation<E>> {
        self.for_block.read().clone()
    }

    fn get_aggregated_attestation(
        &self,
        slot: Slot,
        committee_index: CommitteeIndex,
    ) -> Option<Attestation<E>> {
        if !*self.provide_aggregates.read() {
            return None;
        }
        let data = AttestationData {
            slot,
            index: committee_index,
            ..Default::default()
        };
        Attestation::empty_for_signing(8, data).ok()
    }
}

#[derive(Default)]
pub struct MockExitPool {
    pub exits: Mutex<Vec<SignedVoluntaryExit>>,
}

impl ExitPool for MockExitPool {
    fn get_beacon_block_exits(&self) -> Vec<SignedVoluntaryExit> {
        self.exits.lock().clone()
    }
}

#[derive(Default)]
pub struct MockSyncMessagePool {
    /// When `false`, `produce_contribution` simulates a pool miss.
    pub provide_contributions: RwLock<bool>,
}

impl MockSyncMessagePool {
    pub fn providing() -> Self {
        Self {
            provide_contributions: RwLock::new(true),
        }
    }
}

impl SyncCommitteeMessagePool<E> for MockSyncMessagePool {
    fn produce_sync_aggregate(&self, _beacon_block_root: Hash256) -> SyncAggregate<E> {
        SyncAggregate::new()
    }

    fn produce_contribution(
        &self,
        slot: Slot,
        beacon_block_root: Hash256,
        subcommittee_index: u64,
    ) -> Option<SyncCommitteeContribution<E>> {
        if !*self.provide_contributions.read() {
            return None;
        }
        Some(SyncCommitteeContribution {
            slot,
            beacon_block_root,
            subcommittee_index,
            aggregation_bits: BitVector::new(),
            signature: AggregateSignature::infinity(),
        })
    }
}

/// A complete engine wired to mocks, with `validator_count` local validators
/// registered in the state from genesis.
pub struct TestHarness {
    pub engine: DutyEngine<TestTypes>,
    pub chain: Arc<MockChainView>,
    pub network: Arc<RecordingNetwork>,
    pub gossip: Arc<MockGossipValidator>,
    pub attestation_pool: Arc<MockAttestationPool>,
    pub sync_pool: Arc<MockSyncMessagePool>,
    pub clock: ManualSlotClock,
    pub keypairs: Vec<Keypair>,
    _slashing_dir: TempDir,
    _runtime: TestRuntime,
}

impl TestHarness {
    /// Must be called from within a tokio runtime.
    pub fn new(validator_count: usize) -> Self {
        Self::with_spec_and_config(
            validator_count,
            0,
            ChainSpec::minimal(),
            Config::default(),
        )
    }

    pub fn altair(validator_count: usize) -> Self {
        Self::with_spec_and_config(validator_count, 0, altair_spec(), Config::default())
    }

    pub fn with_spec_and_config(
        local_count: usize,
        remote_count: usize,
        spec: ChainSpec,
        config: Config,
    ) -> Self {
        let spec = Arc::new(spec);
        let keypairs = (0..local_count + remote_count)
            .map(|_| Keypair::random())
            .collect::<Vec<_>>();
        let validators = Arc::new(
            keypairs
                .iter()
                .map(|keypair| Validator {
                    pubkey: keypair.pk.compress(),
                    ..Validator::default()
                })
                .collect::<Vec<_>>(),
        );

        // The next-period committee is deliberately made of strangers, so that
        // period-boundary routing is observable.
        let strangers = (0..4)
            .map(|_| Keypair::random().pk.compress())
            .collect::<Vec<_>>();
        let chain = Arc::new(MockChainView::new(spec.clone(), validators.clone(), &strangers));

        let clock = ManualSlotClock::new(
            Slot::new(0),
            Duration::from_secs(0),
            Duration::from_secs(spec.seconds_per_slot),
        );

        let mut attached = AttachedValidators::new();
        for keypair in keypairs.iter().take(local_count) {
            attached.add_local(keypair.clone(), &validators);
        }
        for keypair in keypairs.iter().skip(local_count) {
            // A remote signer that nothing listens on: connections fail fast.
            attached.add_remote(keypair.pk.compress(), "http://127.0.0.1:1/", false, &validators);
        }

        let slashing_dir = tempfile::tempdir().expect("couldn't create temporary directory");
        let slashing_protection =
            SlashingDatabase::create(&slashing_dir.path().join(SLASHING_PROTECTION_FILENAME))
                .expect("create slashing database");

        let runtime = TestRuntime::default();
        let network = Arc::new(RecordingNetwork::default());
        let gossip = Arc::new(MockGossipValidator::default());
        let attestation_pool = Arc::new(MockAttestationPool::providing());
        let sync_pool = Arc::new(MockSyncMessagePool::providing());

        let engine = DutyEngine::<TestTypes>::builder()
            .chain(chain.clone())
            .attestation_pool(attestation_pool.clone())
            .exit_pool(Arc::new(MockExitPool::default()))
            .sync_message_pool(sync_pool.clone())
            .gossip_validator(gossip.clone())
            .network(network.clone())
            .validators(attached)
            .slashing_protection(slashing_protection)
            .slot_clock(clock.clone())
            .executor(runtime.task_executor.clone())
            .spec(spec)
            .config(config)
            .build()
            .expect("engine builds");

        Self {
            engine,
            chain,
            network,
            gossip,
            attestation_pool,
            sync_pool,
            clock,
            keypairs,
            _slashing_dir: slashing_dir,
            _runtime: runtime,
        }
    }

    pub fn pubkey(&self, i: usize) -> PublicKeyBytes {
        self.keypairs[i].pk.compress()
    }

    /// Advance the manual clock to `current` and run the slot handler.
    pub async fn run_slot(&self, last_slot: u64, current_slot: u64) {
        self.clock.set_slot(current_slot);
        self.engine
            .on_slot(Slot::new(last_slot), Slot::new(current_slot))
            .await;
        self.drain_tasks().await;
    }

    /// Give detached duty tasks a chance to finish.
    pub async fn drain_tasks(&self) {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    pub fn attestation_count(&self) -> usize {
        self.network
            .events()
            .iter()
            .filter(|e| matches!(e, NetworkEvent::Attestation(..)))
            .count()
    }

    pub fn block_count(&self) -> usize {
        self.network
            .events()
            .iter()
            .filter(|e| matches!(e, NetworkEvent::Block(..)))
            .count()
    }

    pub fn sync_message_count(&self) -> usize {
        self.network
            .events()
            .iter()
            .filter(|e| matches!(e, NetworkEvent::SyncMessage(..)))
            .count()
    }
}
