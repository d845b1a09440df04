//! End-to-end tests driving the duty engine against mock collaborators with a
//! paused runtime clock.

use slashing_protection::{InvalidAttestation, NotSafe};
use std::time::Duration;
use types::{Epoch, EthSpec, Hash256, MinimalEthSpec, Slot};
use validator_duties::config::Config;
use validator_duties::chain::BlockRef;
use validator_duties::metrics;
use validator_duties::network::ValidationResult;
use validator_duties::pools::AttestationPool;
use validator_duties::test_utils::{topics, NetworkEvent, TestHarness};

type E = MinimalEthSpec;

fn counter_value(counter: &metrics::Result<metrics::IntCounter>) -> u64 {
    counter.as_ref().map(|c| c.get()).unwrap_or(0)
}

#[tokio::test(start_paused = true)]
async fn happy_proposal() {
    let harness = TestHarness::new(1);
    let blocks_before = counter_value(&metrics::BEACON_BLOCKS_PROPOSED);

    harness.chain.set_head(Hash256::repeat_byte(0xaa), Slot::new(3));
    harness.chain.set_proposer(Slot::new(4), 0);

    harness.run_slot(3, 4).await;

    // One block broadcast, then stored, with the proposer metric bumped.
    assert_eq!(harness.block_count(), 1);
    let stored = harness.chain.stored_blocks.lock().clone();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].slot(), Slot::new(4));
    assert_eq!(stored[0].proposer_index(), 0);
    // Tests share the global metrics registry, so only a lower bound is exact.
    assert!(counter_value(&metrics::BEACON_BLOCKS_PROPOSED) >= blocks_before + 1);
    // The head advanced to our own block.
    assert_eq!(harness.chain.head().slot, Slot::new(4));
    assert_eq!(harness.chain.head().root, stored[0].canonical_root());
}

#[tokio::test(start_paused = true)]
async fn double_proposal_is_stopped_by_the_slashing_gate() {
    let harness = TestHarness::new(1);

    let original_head = BlockRef {
        root: Hash256::repeat_byte(0xaa),
        slot: Slot::new(3),
    };
    harness.chain.set_head(original_head.root, original_head.slot);
    harness.chain.set_proposer(Slot::new(4), 0);
    harness.run_slot(3, 4).await;
    assert_eq!(harness.block_count(), 1);

    // Re-run the same slot with a different body (the pool now has content),
    // as if the node restarted with stale state.
    harness.network.clear();
    harness.chain.set_head(original_head.root, original_head.slot);
    *harness.attestation_pool.for_block.write() = vec![harness
        .attestation_pool
        .get_aggregated_attestation(Slot::new(3), 0)
        .unwrap()];

    harness.run_slot(3, 4).await;

    // The second, conflicting proposal never reached the network.
    assert_eq!(harness.block_count(), 0);
    assert_eq!(harness.chain.stored_blocks.lock().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn surround_vote_skips_only_the_offending_validator() {
    let harness = TestHarness::new(2);

    // Validator 0 has already attested source=3, target=7.
    harness
        .engine
        .slashing_protection
        .check_and_insert_attestation(
            &harness.pubkey(0),
            Epoch::new(3),
            Epoch::new(7),
            Hash256::repeat_byte(0x55),
        )
        .unwrap();

    // The engine now builds attestations with source=2, target=8, which would
    // surround the earlier vote.
    *harness.chain.justified.write() = types::Checkpoint {
        epoch: Epoch::new(2),
        root: Hash256::repeat_byte(0x66),
    };
    let slot = Epoch::new(8).start_slot(E::slots_per_epoch());
    harness
        .chain
        .set_head(Hash256::repeat_byte(0xaa), slot - 1u64);

    harness.run_slot(slot.as_u64() - 1, slot.as_u64()).await;

    // Only validator 1 attested.
    assert_eq!(harness.attestation_count(), 1);

    // And the store still refuses the surround for validator 0.
    assert!(matches!(
        harness.engine.slashing_protection.check_and_insert_attestation(
            &harness.pubkey(0),
            Epoch::new(2),
            Epoch::new(8),
            Hash256::repeat_byte(0x77),
        ),
        Err(NotSafe::InvalidAttestation(
            InvalidAttestation::NewSurroundsPrev { .. }
        ))
    ));
}

#[tokio::test(start_paused = true)]
async fn catch_up_proposes_and_attests_every_missed_slot() {
    let harness = TestHarness::new(1);

    harness.chain.set_head(Hash256::repeat_byte(0xaa), Slot::new(95));
    for slot in 96..=100 {
        harness.chain.set_proposer(Slot::new(slot), 0);
    }

    harness.run_slot(95, 100).await;

    let stored = harness.chain.stored_blocks.lock().clone();
    let stored_slots = stored.iter().map(|b| b.slot().as_u64()).collect::<Vec<_>>();
    assert_eq!(stored_slots, vec![96, 97, 98, 99, 100]);

    // Each block extends the one the engine just produced.
    for pair in stored.windows(2) {
        assert_eq!(pair[1].parent_root(), pair[0].canonical_root());
    }

    // Attestations were attempted per caught-up slot in order. All five slots
    // share target epoch 12, so only the first survives the double-vote gate;
    // its slot proves the catch-up loop attested before reaching slot 100.
    let attestations = harness
        .network
        .events()
        .iter()
        .filter_map(|e| match e {
            NetworkEvent::Attestation(_, attestation) => Some(attestation.clone()),
            _ => None,
        })
        .collect::<Vec<_>>();
    assert_eq!(attestations.len(), 1);
    assert_eq!(attestations[0].data.slot, Slot::new(96));
}

#[tokio::test(start_paused = true)]
async fn late_block_gets_a_propagation_delay_before_attesting() {
    let harness = TestHarness::new(1);
    harness.chain.set_head(Hash256::repeat_byte(0xaa), Slot::new(3));

    let started = tokio::time::Instant::now();
    let chain = harness.chain.clone();
    let delivery = tokio::spawn(async move {
        // The block for slot 4 arrives 1.5s into the slot (cutoff is 2s).
        tokio::time::sleep(Duration::from_millis(1500)).await;
        let block = BlockRef {
            root: Hash256::repeat_byte(0xbb),
            slot: Slot::new(4),
        };
        while !chain.try_deliver_block(Slot::new(4), block) {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    });

    harness.run_slot(3, 4).await;
    delivery.await.unwrap();

    let events = harness.network.timed_events();
    let (attestation_at, attestation) = events
        .iter()
        .find_map(|(at, event)| match event {
            NetworkEvent::Attestation(_, attestation) => Some((*at, attestation.clone())),
            _ => None,
        })
        .expect("an attestation was broadcast");

    // Sent at arrival + 1000ms, i.e. 2.5s into the slot, not at the 2s cutoff.
    let elapsed = attestation_at - started;
    assert!(elapsed >= Duration::from_millis(2500), "elapsed: {elapsed:?}");
    assert!(elapsed < Duration::from_millis(2700), "elapsed: {elapsed:?}");

    // And it votes for the delivered block.
    assert_eq!(attestation.data.beacon_block_root, Hash256::repeat_byte(0xbb));
}

#[tokio::test(start_paused = true)]
async fn aggregates_follow_attestations_at_two_thirds() {
    let harness = TestHarness::new(2);
    harness.chain.set_head(Hash256::repeat_byte(0xaa), Slot::new(3));

    let started = tokio::time::Instant::now();
    harness.run_slot(3, 4).await;

    let events = harness.network.timed_events();
    let attestation_times = events
        .iter()
        .filter(|(_, e)| matches!(e, NetworkEvent::Attestation(..)))
        .map(|(at, _)| *at)
        .collect::<Vec<_>>();
    let aggregate_times = events
        .iter()
        .filter(|(_, e)| matches!(e, NetworkEvent::Aggregate(..)))
        .map(|(at, _)| *at)
        .collect::<Vec<_>>();

    assert_eq!(attestation_times.len(), 2);
    // Small committees make every validator an aggregator.
    assert_eq!(aggregate_times.len(), 2);

    // Aggregates start at 2/3 of the 6s slot and never precede attestations.
    for aggregate_at in &aggregate_times {
        assert!(*aggregate_at - started >= Duration::from_secs(4));
        for attestation_at in &attestation_times {
            assert!(attestation_at <= aggregate_at);
        }
    }
}

#[tokio::test(start_paused = true)]
async fn early_slots_skip_aggregation() {
    let harness = TestHarness::new(1);
    harness.chain.set_head(Hash256::repeat_byte(0xaa), Slot::new(1));

    harness.run_slot(1, 2).await;

    assert!(harness.attestation_count() > 0);
    assert!(!harness
        .network
        .events()
        .iter()
        .any(|e| matches!(e, NetworkEvent::Aggregate(..))));
}

#[tokio::test(start_paused = true)]
async fn pre_altair_slots_produce_no_sync_messages() {
    let harness = TestHarness::new(1);
    harness.chain.set_head(Hash256::repeat_byte(0xaa), Slot::new(3));

    harness.run_slot(3, 4).await;

    assert!(harness.attestation_count() > 0);
    assert_eq!(harness.sync_message_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn sync_messages_precede_contributions() {
    let harness = TestHarness::altair(1);
    harness.chain.set_head(Hash256::repeat_byte(0xaa), Slot::new(3));

    harness.run_slot(3, 4).await;

    let events = harness.network.timed_events();
    let message_times = events
        .iter()
        .filter(|(_, e)| matches!(e, NetworkEvent::SyncMessage(..)))
        .map(|(at, _)| *at)
        .collect::<Vec<_>>();
    let contribution_times = events
        .iter()
        .filter(|(_, e)| matches!(e, NetworkEvent::SyncContribution(..)))
        .map(|(at, _)| *at)
        .collect::<Vec<_>>();

    assert!(!message_times.is_empty());
    assert!(!contribution_times.is_empty());
    for contribution_at in &contribution_times {
        for message_at in &message_times {
            assert!(message_at <= contribution_at);
        }
    }
}

#[tokio::test(start_paused = true)]
async fn final_slot_of_a_period_is_owned_by_the_next_period() {
    let harness = TestHarness::altair(1);

    // Period length is 8 epochs * 8 slots = 64 slots in the minimal preset.
    // At slot 62, messages belong to the current committee (which contains our
    // validator).
    harness.chain.set_head(Hash256::repeat_byte(0xaa), Slot::new(61));
    harness.run_slot(61, 62).await;
    assert!(harness.sync_message_count() > 0);

    // At slot 63 (the last slot of period 0), messages are routed against the
    // next period's committee, which contains only strangers.
    harness.network.clear();
    harness.chain.set_head(Hash256::repeat_byte(0xaa), Slot::new(62));
    harness.run_slot(62, 63).await;
    assert_eq!(harness.sync_message_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn bulk_sync_message_submission_preserves_order() {
    let harness = TestHarness::altair(1);
    harness.chain.set_head(Hash256::repeat_byte(0xaa), Slot::new(3));

    let good = types::SyncCommitteeMessage::new(
        Slot::new(3),
        Hash256::repeat_byte(0xaa),
        0,
        types::Signature::empty(),
    );
    let unknown_index = types::SyncCommitteeMessage::new(
        Slot::new(3),
        Hash256::repeat_byte(0xaa),
        999,
        types::Signature::empty(),
    );
    // Five periods in the future: neither current nor next.
    let wrong_period = types::SyncCommitteeMessage::new(
        Slot::new(5 * 64),
        Hash256::repeat_byte(0xaa),
        0,
        types::Signature::empty(),
    );

    let results = harness
        .engine
        .send_sync_committee_messages(vec![
            good.clone(),
            unknown_index.clone(),
            wrong_period.clone(),
        ])
        .await;

    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok());
    assert!(results[1].is_err());
    assert!(results[2].is_err());
    assert!(harness.sync_message_count() > 0);
}

#[tokio::test(start_paused = true)]
async fn failing_remote_signer_only_drops_its_own_duty() {
    // Validator 0 is local, validator 1 signs via an unreachable remote signer.
    let harness = TestHarness::with_spec_and_config(
        1,
        1,
        types::ChainSpec::minimal(),
        Config::default(),
    );
    harness.chain.set_head(Hash256::repeat_byte(0xaa), Slot::new(3));

    harness.run_slot(3, 4).await;
    // Leave generous room for the connection failure to resolve.
    tokio::time::sleep(Duration::from_secs(30)).await;

    // The local validator's attestation still went out.
    assert_eq!(harness.attestation_count(), 1);
}

/// An externally-signed block fixture. Signature validity is the mock gossip
/// validator's concern, so a placeholder signature is enough.
fn submitted_block() -> types::SignedBeaconBlock<E> {
    types::SignedBeaconBlock {
        message: types::BeaconBlock::empty(&types::ChainSpec::minimal()),
        signature: types::Signature::empty(),
    }
}

#[tokio::test(start_paused = true)]
async fn rejected_submissions_are_returned_verbatim() {
    let harness = TestHarness::new(1);
    harness
        .gossip
        .set(topics::BEACON_BLOCK, ValidationResult::Reject("bad block".into()));

    assert_eq!(
        harness.engine.send_beacon_block(submitted_block()),
        Err("bad block".to_string())
    );
    assert_eq!(harness.block_count(), 0);

    // An `Ignore` verdict is still broadcast-eligible.
    harness
        .gossip
        .set(topics::BEACON_BLOCK, ValidationResult::Ignore);
    assert_eq!(harness.engine.send_beacon_block(submitted_block()), Ok(true));
    assert_eq!(harness.block_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn doppelganger_holds_duties_until_the_window_elapses() {
    let mut config = Config::default();
    config.doppelganger_detection = true;
    let harness =
        TestHarness::with_spec_and_config(1, 0, types::ChainSpec::minimal(), config);

    // Built at epoch 0, so broadcasts may start at epoch 2.
    harness.chain.set_head(Hash256::repeat_byte(0xaa), Slot::new(3));
    harness.run_slot(3, 4).await;
    assert!(harness.network.events().is_empty());

    // Epoch 2 (slot 16 in the minimal preset) is allowed.
    harness.chain.set_head(Hash256::repeat_byte(0xaa), Slot::new(15));
    harness.run_slot(15, 16).await;
    assert!(harness.attestation_count() > 0);
}

#[tokio::test(start_paused = true)]
async fn far_behind_head_skips_duties() {
    let harness = TestHarness::new(1);
    let skipped_before = counter_value(&metrics::ENGINE_NOT_SYNCED);

    // Head at 0, wall clock at 100, horizon 32.
    harness.run_slot(99, 100).await;

    assert!(harness.network.events().is_empty());
    assert_eq!(
        counter_value(&metrics::ENGINE_NOT_SYNCED),
        skipped_before + 1
    );
}

#[tokio::test(start_paused = true)]
async fn eth1_outage_skips_only_the_proposal() {
    let harness = TestHarness::new(1);
    harness.chain.set_head(Hash256::repeat_byte(0xaa), Slot::new(3));
    harness.chain.set_proposer(Slot::new(4), 0);
    *harness.chain.eth1_unavailable.write() = true;

    harness.run_slot(3, 4).await;

    // No block, but the attestation duty still ran.
    assert_eq!(harness.block_count(), 0);
    assert!(harness.attestation_count() > 0);
}
