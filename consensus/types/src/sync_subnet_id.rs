use crate::consts::altair::SYNC_COMMITTEE_SUBNET_COUNT;
use crate::EthSpec;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// A subnet on the sync committee gossip mesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SyncSubnetId(#[serde(with = "serde_utils::quoted_u64")] u64);

impl SyncSubnetId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Compute the subnet that owns a given sync committee position.
    pub fn from_committee_position<E: EthSpec>(position: usize) -> Self {
        Self((position / E::sync_subcommittee_size()) as u64)
    }

    /// Compute required subnets to subscribe to, given the sync committee indices.
    pub fn compute_subnets_for_sync_committee<E: EthSpec>(
        sync_committee_indices: &[u64],
    ) -> HashSet<Self> {
        let subcommittee_size = E::sync_subcommittee_size() as u64;

        sync_committee_indices
            .iter()
            .map(|index| Self(index / subcommittee_size))
            .collect()
    }

    /// All subnet ids, `0..SYNC_COMMITTEE_SUBNET_COUNT`.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..SYNC_COMMITTEE_SUBNET_COUNT).map(Self)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SyncSubnetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for SyncSubnetId {
    fn from(x: u64) -> Self {
        Self(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MainnetEthSpec;

    #[test]
    fn position_to_subnet() {
        // Mainnet subcommittees are 64 members wide.
        assert_eq!(
            SyncSubnetId::from_committee_position::<MainnetEthSpec>(0),
            SyncSubnetId::new(0)
        );
        assert_eq!(
            SyncSubnetId::from_committee_position::<MainnetEthSpec>(63),
            SyncSubnetId::new(0)
        );
        assert_eq!(
            SyncSubnetId::from_committee_position::<MainnetEthSpec>(64),
            SyncSubnetId::new(1)
        );
        assert_eq!(
            SyncSubnetId::from_committee_position::<MainnetEthSpec>(511),
            SyncSubnetId::new(7)
        );
    }
}
