use crate::ChainSpec;
use serde::{Deserialize, Serialize};
use ssz_types::typenum::{
    Unsigned, U1048576, U1073741824, U128, U16, U2, U2048, U256, U32, U4, U512, U64, U8,
};
use std::fmt::Debug;

/// A marker trait applied to presets (Mainnet, Minimal) that fixes the
/// compile-time container bounds.
pub trait EthSpec:
    'static + Default + Sync + Send + Clone + Debug + PartialEq + Eq + std::hash::Hash
{
    type SlotsPerEpoch: Unsigned + Clone + Sync + Send + Debug + PartialEq + Eq + std::hash::Hash;
    type MaxValidatorsPerCommittee: Unsigned
        + Clone
        + Sync
        + Send
        + Debug
        + PartialEq
        + Eq
        + std::hash::Hash;
    type SyncCommitteeSize: Unsigned + Clone + Sync + Send + Debug + PartialEq + Eq + std::hash::Hash;
    /// The number of members in each sync subcommittee, i.e.
    /// `SyncCommitteeSize / SYNC_COMMITTEE_SUBNET_COUNT`.
    type SyncSubcommitteeSize: Unsigned
        + Clone
        + Sync
        + Send
        + Debug
        + PartialEq
        + Eq
        + std::hash::Hash;
    /*
     * Max operations per block.
     */
    type MaxProposerSlashings: Unsigned + Clone + Sync + Send + Debug + PartialEq + Eq + std::hash::Hash;
    type MaxAttesterSlashings: Unsigned + Clone + Sync + Send + Debug + PartialEq + Eq + std::hash::Hash;
    type MaxAttestations: Unsigned + Clone + Sync + Send + Debug + PartialEq + Eq + std::hash::Hash;
    type MaxDeposits: Unsigned + Clone + Sync + Send + Debug + PartialEq + Eq + std::hash::Hash;
    type MaxVoluntaryExits: Unsigned + Clone + Sync + Send + Debug + PartialEq + Eq + std::hash::Hash;
    /*
     * Execution payload bounds.
     */
    type MaxBytesPerTransaction: Unsigned + Clone + Sync + Send + Debug + PartialEq + Eq + std::hash::Hash;
    type MaxTransactionsPerPayload: Unsigned + Clone + Sync + Send + Debug + PartialEq + Eq + std::hash::Hash;
    type BytesPerLogsBloom: Unsigned + Clone + Sync + Send + Debug + PartialEq + Eq + std::hash::Hash;
    type MaxExtraDataBytes: Unsigned + Clone + Sync + Send + Debug + PartialEq + Eq + std::hash::Hash;

    fn default_spec() -> ChainSpec;

    /// Returns the `SLOTS_PER_EPOCH` constant for this specification.
    fn slots_per_epoch() -> u64 {
        Self::SlotsPerEpoch::to_u64()
    }

    /// Returns the `SYNC_COMMITTEE_SIZE` constant for this specification.
    fn sync_committee_size() -> usize {
        Self::SyncCommitteeSize::to_usize()
    }

    /// Returns the size of each sync subcommittee.
    fn sync_subcommittee_size() -> usize {
        Self::SyncSubcommitteeSize::to_usize()
    }

    fn max_validators_per_committee() -> usize {
        Self::MaxValidatorsPerCommittee::to_usize()
    }
}

/// Ethereum Foundation specifications.
#[derive(Clone, PartialEq, Eq, Debug, Default, Hash, Serialize, Deserialize)]
pub struct MainnetEthSpec;

impl EthSpec for MainnetEthSpec {
    type SlotsPerEpoch = U32;
    type MaxValidatorsPerCommittee = U2048;
    type SyncCommitteeSize = U512;
    type SyncSubcommitteeSize = U64; // 512 committee size / 8 subnets
    type MaxProposerSlashings = U16;
    type MaxAttesterSlashings = U2;
    type MaxAttestations = U128;
    type MaxDeposits = U16;
    type MaxVoluntaryExits = U16;
    type MaxBytesPerTransaction = U1073741824; // 1,073,741,824
    type MaxTransactionsPerPayload = U1048576; // 1,048,576
    type BytesPerLogsBloom = U256;
    type MaxExtraDataBytes = U32;

    fn default_spec() -> ChainSpec {
        ChainSpec::mainnet()
    }
}

/// Ethereum Foundation minimal spec, used primarily in testing.
#[derive(Clone, PartialEq, Eq, Debug, Default, Hash, Serialize, Deserialize)]
pub struct MinimalEthSpec;

impl EthSpec for MinimalEthSpec {
    type SlotsPerEpoch = U8;
    type MaxValidatorsPerCommittee = U2048;
    type SyncCommitteeSize = U32;
    type SyncSubcommitteeSize = U4; // 32 committee size / 8 subnets
    type MaxProposerSlashings = U16;
    type MaxAttesterSlashings = U2;
    type MaxAttestations = U128;
    type MaxDeposits = U16;
    type MaxVoluntaryExits = U16;
    type MaxBytesPerTransaction = U1073741824;
    type MaxTransactionsPerPayload = U1048576;
    type BytesPerLogsBloom = U256;
    type MaxExtraDataBytes = U32;

    fn default_spec() -> ChainSpec {
        ChainSpec::minimal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::altair;

    #[test]
    fn subcommittee_sizes_divide_evenly() {
        assert_eq!(
            MainnetEthSpec::sync_committee_size(),
            MainnetEthSpec::sync_subcommittee_size() * altair::SYNC_COMMITTEE_SUBNET_COUNT as usize,
        );
        assert_eq!(
            MinimalEthSpec::sync_committee_size(),
            MinimalEthSpec::sync_subcommittee_size() * altair::SYNC_COMMITTEE_SUBNET_COUNT as usize,
        );
    }
}
