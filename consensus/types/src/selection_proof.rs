use crate::{ChainSpec, Signature};
use ethereum_hashing::hash;
use safe_arith::{ArithError, SafeArith};
use ssz::Encode;
use std::cmp;

/// A slot signature, used to prove a validator's right to be an attestation
/// aggregator.
///
/// The signature itself comes back from the validator's signing backend;
/// this wrapper only implements the election predicate.
#[derive(PartialEq, Debug, Clone)]
pub struct SelectionProof(Signature);

impl SelectionProof {
    /// Returns the "modulo" used for determining if a `SelectionProof` elects an aggregator.
    pub fn modulo(committee_len: usize, spec: &ChainSpec) -> Result<u64, ArithError> {
        Ok(cmp::max(
            1,
            (committee_len as u64).safe_div(spec.target_aggregators_per_committee)?,
        ))
    }

    pub fn is_aggregator(
        &self,
        committee_len: usize,
        spec: &ChainSpec,
    ) -> Result<bool, ArithError> {
        self.is_aggregator_from_modulo(Self::modulo(committee_len, spec)?)
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

impl From<SelectionProof> for Signature {
    fn from(from: SelectionProof) -> Signature {
        from.0
    }
}

impl From<Signature> for SelectionProof {
    fn from(sig: Signature) -> Self {
        Self(sig)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modulo_is_at_least_one() {
        let spec = ChainSpec::mainnet();
        // Committees smaller than the aggregator target still elect aggregators.
        assert_eq!(SelectionProof::modulo(1, &spec), Ok(1));
        assert_eq!(SelectionProof::modulo(15, &spec), Ok(1));
        assert_eq!(SelectionProof::modulo(16, &spec), Ok(1));
        assert_eq!(SelectionProof::modulo(32, &spec), Ok(2));
        assert_eq!(SelectionProof::modulo(128, &spec), Ok(8));
    }

    #[test]
    fn modulo_one_always_aggregates() {
        let proof = SelectionProof::from(Signature::empty());
        assert_eq!(proof.is_aggregator_from_modulo(1), Ok(true));
    }
}
