use crate::{AggregateSignature, AttestationData, BitList, EthSpec, Signature};
use serde::{Deserialize, Serialize};
use ssz_derive::{Decode, Encode};
use tree_hash_derive::TreeHash;

#[derive(Debug, PartialEq)]
pub enum Error {
    SszTypesError(ssz_types::Error),
    AlreadySigned(usize),
}

/// Details an attestation that can be slashable.
///
/// Spec v0.12.1
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode, TreeHash)]
#[serde(bound = "E: EthSpec")]
pub struct Attestation<E: EthSpec> {
    pub aggregation_bits: BitList<E::MaxValidatorsPerCommittee>,
    pub data: AttestationData,
    pub signature: AggregateSignature,
}

impl<E: EthSpec> Attestation<E> {
    /// Produce an attestation with an all-zero aggregation bitfield and the
    /// infinity signature, ready for individual validators to sign.
    pub fn empty_for_signing(committee_length: usize, data: AttestationData) -> Result<Self, Error> {
        Ok(Self {
            aggregation_bits: BitList::with_capacity(committee_length)
                .map_err(Error::SszTypesError)?,
            data,
            signature: AggregateSignature::infinity(),
        })
    }

    /// Aggregate `signature` into `self`, setting the `committee_position`'th bit.
    ///
    /// Returns an `AlreadySigned` error if the bit was already set.
    pub fn add_signature(
        &mut self,
        signature: &Signature,
        committee_position: usize,
    ) -> Result<(), Error> {
        if self
            .aggregation_bits
            .get(committee_position)
            .map_err(Error::SszTypesError)?
        {
            Err(Error::AlreadySigned(committee_position))
        } else {
            self.aggregation_bits
                .set(committee_position, true)
                .map_err(Error::SszTypesError)?;

            self.signature.add_assign(signature);

            Ok(())
        }
    }

    pub fn num_set_aggregation_bits(&self) -> usize {
        self.aggregation_bits.num_set_bits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AttestationData, Keypair, MainnetEthSpec};

    #[test]
    fn double_signing_same_position_is_rejected() {
        let keypair = Keypair::random();
        let mut attestation = Attestation::<MainnetEthSpec>::empty_for_signing(
            4,
            AttestationData::default(),
        )
        .unwrap();

        let sig = keypair.sk.sign(crate::Hash256::repeat_byte(1));
        attestation.add_signature(&sig, 2).unwrap();
        assert_eq!(attestation.num_set_aggregation_bits(), 1);

        assert_eq!(
            attestation.add_signature(&sig, 2),
            Err(Error::AlreadySigned(2))
        );
    }
}
