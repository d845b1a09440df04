use crate::{AttestationData, ChainSpec, CommitteeIndex, EthSpec, Slot};
use safe_arith::{ArithError, SafeArith};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A subnet on the attestation gossip mesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubnetId(#[serde(with = "serde_utils::quoted_u64")] u64);

impl SubnetId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Compute the subnet for an attestation where `committees_per_slot` is the number of
    /// committees for the attestation's slot.
    pub fn compute_subnet_for_attestation<E: EthSpec>(
        attestation_data: &AttestationData,
        committees_per_slot: u64,
        spec: &ChainSpec,
    ) -> Result<SubnetId, ArithError> {
        Self::compute_subnet::<E>(
            attestation_data.slot,
            attestation_data.index,
            committees_per_slot,
            spec,
        )
    }

    /// Compute the subnet for an attestation with `slot` and `committee_index` where
    /// `committees_per_slot` is the number of committees for the slot.
    pub fn compute_subnet<E: EthSpec>(
        slot: Slot,
        committee_index: CommitteeIndex,
        committees_per_slot: u64,
        spec: &ChainSpec,
    ) -> Result<SubnetId, ArithError> {
        let slots_since_epoch_start: u64 = slot.as_u64().safe_rem(E::slots_per_epoch())?;

        let committees_since_epoch_start =
            committees_per_slot.safe_mul(slots_since_epoch_start)?;

        Ok(committees_since_epoch_start
            .safe_add(committee_index)?
            .safe_rem(spec.attestation_subnet_count)?
            .into())
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubnetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for SubnetId {
    fn from(x: u64) -> Self {
        Self(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MainnetEthSpec;

    #[test]
    fn subnet_wraps_within_subnet_count() {
        let spec = ChainSpec::mainnet();
        // Slot 1 with 4 committees per slot: subnet = 4 * 1 + index.
        let subnet = SubnetId::compute_subnet::<MainnetEthSpec>(Slot::new(1), 2, 4, &spec).unwrap();
        assert_eq!(subnet, SubnetId::new(6));

        // Large inputs wrap modulo 64.
        let subnet =
            SubnetId::compute_subnet::<MainnetEthSpec>(Slot::new(31), 63, 64, &spec).unwrap();
        assert_eq!(subnet.as_u64(), (31 * 64 + 63) % 64);
    }

    #[test]
    fn subnet_is_not_stable_across_slots_of_an_epoch() {
        let spec = ChainSpec::mainnet();
        let a = SubnetId::compute_subnet::<MainnetEthSpec>(Slot::new(0), 0, 4, &spec).unwrap();
        let b = SubnetId::compute_subnet::<MainnetEthSpec>(Slot::new(1), 0, 4, &spec).unwrap();
        assert_ne!(a, b);
    }
}
