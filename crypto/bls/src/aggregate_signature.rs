use crate::{Error, Signature, INFINITY_SIGNATURE, SIGNATURE_BYTES_LEN};
use blst::min_pk as blst_core;

/// An aggregate of BLS signatures on G2.
///
/// Starts at the point-at-infinity and accumulates signatures via
/// `add_assign`.
#[derive(Clone)]
pub struct AggregateSignature {
    point: Option<blst_core::Signature>,
}

impl AggregateSignature {
    /// Returns the empty aggregate (point-at-infinity).
    pub fn infinity() -> Self {
        Self { point: None }
    }

    /// Alias for `infinity`, named for unsigned container construction.
    pub fn empty() -> Self {
        Self::infinity()
    }

    pub fn is_infinity(&self) -> bool {
        self.point.is_none()
    }

    /// Aggregate another signature into `self`.
    ///
    /// Aggregating the infinity signature is a no-op.
    pub fn add_assign(&mut self, other: &Signature) {
        let Some(other_point) = other.point() else {
            return;
        };
        match &self.point {
            Some(self_point) => {
                let mut agg = blst_core::AggregateSignature::from_signature(self_point);
                // Points are already group-checked on deserialization.
                if agg.add_signature(other_point, false).is_ok() {
                    self.point = Some(agg.to_signature());
                }
            }
            None => self.point = Some(other_point.clone()),
        }
    }

    /// Aggregate another aggregate into `self`.
    pub fn add_assign_aggregate(&mut self, other: &Self) {
        let Some(other_point) = other.point.as_ref() else {
            return;
        };
        match &self.point {
            Some(self_point) => {
                let mut agg = blst_core::AggregateSignature::from_signature(self_point);
                if agg.add_signature(other_point, false).is_ok() {
                    self.point = Some(agg.to_signature());
                }
            }
            None => self.point = Some(other_point.clone()),
        }
    }

    pub fn serialize(&self) -> [u8; SIGNATURE_BYTES_LEN] {
        match &self.point {
            Some(point) => point.to_bytes(),
            None => INFINITY_SIGNATURE,
        }
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        if bytes == INFINITY_SIGNATURE {
            Ok(Self::infinity())
        } else {
            Ok(Self {
                point: Some(blst_core::Signature::from_bytes(bytes)?),
            })
        }
    }
}

impl PartialEq for AggregateSignature {
    fn eq(&self, other: &Self) -> bool {
        self.serialize() == other.serialize()
    }
}

impl Eq for AggregateSignature {}

impl_ssz!(AggregateSignature, SIGNATURE_BYTES_LEN);
impl_tree_hash!(AggregateSignature, SIGNATURE_BYTES_LEN);
impl_serde_hex!(AggregateSignature);
impl_hex_debug_display!(AggregateSignature);
