//! Records upcoming duties (subnet subscriptions, aggregator selections and
//! proposals) one lookahead window in advance, so that sync gating and the
//! subscription logic can see what is coming.

use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet};
use types::{Slot, SubnetId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttestationDuty {
    pub subnet_id: SubnetId,
    pub validator_index: u64,
    pub is_aggregator: bool,
}

#[derive(Default)]
pub struct ActionTracker {
    attestation_duties: Mutex<BTreeMap<Slot, Vec<AttestationDuty>>>,
    proposal_slots: Mutex<BTreeSet<(Slot, u64)>>,
}

impl ActionTracker {
    /// Record an upcoming attestation duty. Returns `false` when the duty was
    /// already known (so callers can skip re-computing selection proofs).
    pub fn register_attestation_duty(
        &self,
        slot: Slot,
        subnet_id: SubnetId,
        validator_index: u64,
        is_aggregator: bool,
    ) -> bool {
        let mut duties = self.attestation_duties.lock();
        let slot_duties = duties.entry(slot).or_default();
        if slot_duties
            .iter()
            .any(|duty| duty.validator_index == validator_index)
        {
            return false;
        }
        slot_duties.push(AttestationDuty {
            subnet_id,
            validator_index,
            is_aggregator,
        });
        true
    }

    /// Returns `true` if a duty for `(slot, validator_index)` is recorded.
    pub fn has_attestation_duty(&self, slot: Slot, validator_index: u64) -> bool {
        self.attestation_duties
            .lock()
            .get(&slot)
            .is_some_and(|duties| {
                duties
                    .iter()
                    .any(|duty| duty.validator_index == validator_index)
            })
    }

    pub fn register_proposal(&self, slot: Slot, validator_index: u64) {
        self.proposal_slots.lock().insert((slot, validator_index));
    }

    /// The first slot at or after `slot` with a recorded attestation duty.
    pub fn next_attestation_slot(&self, slot: Slot) -> Option<Slot> {
        self.attestation_duties
            .lock()
            .range(slot..)
            .next()
            .map(|(slot, _)| *slot)
    }

    /// The first slot at or after `slot` with a recorded proposal.
    pub fn next_proposal_slot(&self, slot: Slot) -> Option<Slot> {
        self.proposal_slots
            .lock()
            .range((slot, 0)..)
            .next()
            .map(|(slot, _)| *slot)
    }

    /// Subnets that need to be joined for `slot`.
    pub fn subscriptions_at(&self, slot: Slot) -> Vec<AttestationDuty> {
        self.attestation_duties
            .lock()
            .get(&slot)
            .cloned()
            .unwrap_or_default()
    }

    /// Drop records strictly before `slot`.
    pub fn prune(&self, slot: Slot) {
        self.attestation_duties.lock().retain(|s, _| *s >= slot);
        self.proposal_slots.lock().retain(|(s, _)| *s >= slot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_registration_is_rejected() {
        let tracker = ActionTracker::default();
        assert!(tracker.register_attestation_duty(Slot::new(1), SubnetId::new(0), 7, false));
        assert!(!tracker.register_attestation_duty(Slot::new(1), SubnetId::new(3), 7, true));
        assert!(tracker.has_attestation_duty(Slot::new(1), 7));
    }

    #[test]
    fn next_slots() {
        let tracker = ActionTracker::default();
        tracker.register_attestation_duty(Slot::new(5), SubnetId::new(0), 1, false);
        tracker.register_proposal(Slot::new(9), 1);

        assert_eq!(tracker.next_attestation_slot(Slot::new(0)), Some(Slot::new(5)));
        assert_eq!(tracker.next_attestation_slot(Slot::new(5)), Some(Slot::new(5)));
        assert_eq!(tracker.next_attestation_slot(Slot::new(6)), None);
        assert_eq!(tracker.next_proposal_slot(Slot::new(0)), Some(Slot::new(9)));

        tracker.prune(Slot::new(6));
        assert_eq!(tracker.next_attestation_slot(Slot::new(0)), None);
        assert_eq!(tracker.next_proposal_slot(Slot::new(0)), Some(Slot::new(9)));
    }
}
