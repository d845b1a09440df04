use crate::consts::altair::{
    SYNC_COMMITTEE_SUBNET_COUNT, TARGET_AGGREGATORS_PER_SYNC_SUBCOMMITTEE,
};
use crate::{EthSpec, Signature};
use ethereum_hashing::hash;
use safe_arith::{ArithError, SafeArith};
use ssz::Encode;
use std::cmp;

/// A selection proof for a sync subcommittee, used to prove a validator's
/// right to aggregate that subcommittee's messages.
///
/// The signature itself comes back from the validator's signing backend;
/// this wrapper only implements the election predicate.
#[derive(PartialEq, Debug, Clone)]
pub struct SyncSelectionProof(Signature);

impl SyncSelectionProof {
    /// Returns the "modulo" used for determining if a `SyncSelectionProof` elects an aggregator.
    pub fn modulo<E: EthSpec>() -> Result<u64, ArithError> {
        Ok(cmp::max(
            1,
            (E::sync_committee_size() as u64)
                .safe_div(SYNC_COMMITTEE_SUBNET_COUNT)?
                .safe_div(TARGET_AGGREGATORS_PER_SYNC_SUBCOMMITTEE)?,
        ))
    }

    pub fn is_aggregator<E: EthSpec>(&self) -> Result<bool, ArithError> {
        self.is_aggregator_from_modulo(Self::modulo::<E>()?)
    }

    pub fn is_aggregator_from_modulo(&self, modulo: u64) -> Result<bool, ArithError> {
        let signature_hash = hash(&self.0.as_ssz_bytes());
        let signature_hash_int = u64::from_le_bytes(
            signature_hash
                .get(0..8)
                .expect("hash is 32 bytes")
                .try_into()
                .expect("first 8 bytes of signature should always convert to fixed array"),
        );

        signature_hash_int.safe_rem(modulo).map(|rem| rem == 0)
    }
}

impl From<SyncSelectionProof> for Signature {
    fn from(from: SyncSelectionProof) -> Signature {
        from.0
    }
}

impl From<Signature> for SyncSelectionProof {
    fn from(sig: Signature) -> Self {
        Self(sig)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MainnetEthSpec, MinimalEthSpec};

    #[test]
    fn modulo_matches_subcommittee_target() {
        // 512 / 8 / 4 = 16
        assert_eq!(SyncSelectionProof::modulo::<MainnetEthSpec>(), Ok(16));
        // 32 / 8 / 4 = 1
        assert_eq!(SyncSelectionProof::modulo::<MinimalEthSpec>(), Ok(1));
    }

    #[test]
    fn minimal_preset_always_aggregates() {
        let proof = SyncSelectionProof::from(Signature::empty());
        assert_eq!(proof.is_aggregator::<MinimalEthSpec>(), Ok(true));
    }
}
