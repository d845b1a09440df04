use crate::{Error, Hash256, PublicKey, DST, INFINITY_SIGNATURE, SIGNATURE_BYTES_LEN};
use blst::min_pk as blst_core;
use blst::BLST_ERROR;

/// A BLS signature on G2.
///
/// `point == None` encodes the point-at-infinity, which is the signature of
/// the empty aggregate and the placeholder in unsigned containers.
#[derive(Clone)]
pub struct Signature {
    point: Option<blst_core::Signature>,
}

impl Signature {
    /// Returns the point-at-infinity placeholder signature.
    pub fn empty() -> Self {
        Self { point: None }
    }

    pub(crate) fn from_point(point: blst_core::Signature) -> Self {
        Self { point: Some(point) }
    }

    pub(crate) fn point(&self) -> Option<&blst_core::Signature> {
        self.point.as_ref()
    }

    pub fn is_infinity(&self) -> bool {
        self.point.is_none()
    }

    pub fn serialize(&self) -> [u8; SIGNATURE_BYTES_LEN] {
        match &self.point {
            Some(point) => point.to_bytes(),
            None => INFINITY_SIGNATURE,
        }
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        if bytes == INFINITY_SIGNATURE {
            Ok(Self::empty())
        } else {
            Ok(Self {
                point: Some(blst_core::Signature::from_bytes(bytes)?),
            })
        }
    }

    /// Verify `self` against `msg` under `pk`.
    ///
    /// The infinity signature verifies nothing.
    pub fn verify(&self, pk: &PublicKey, msg: Hash256) -> bool {
        match &self.point {
            Some(point) => {
                point.verify(true, msg.as_slice(), DST, &[], pk.point(), true)
                    == BLST_ERROR::BLST_SUCCESS
            }
            None => false,
        }
    }
}

impl PartialEq for Signature {
    fn eq(&self, other: &Self) -> bool {
        self.serialize() == other.serialize()
    }
}

impl Eq for Signature {}

impl std::hash::Hash for Signature {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.serialize().hash(state)
    }
}

impl_ssz!(Signature, SIGNATURE_BYTES_LEN);
impl_tree_hash!(Signature, SIGNATURE_BYTES_LEN);
impl_serde_hex!(Signature);
impl_hex_debug_display!(Signature);
