//! The `Slot` and `Epoch` types are defined as new types over u64 to enforce
//! type-safety between the two. Arithmetic saturates at the type bounds, the
//! same way wall-clock slot arithmetic behaves around genesis.

use crate::{ChainSpec, SignedRoot};
use safe_arith::{ArithError, SafeArith};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Rem, Sub, SubAssign};

#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slot(#[serde(with = "serde_utils::quoted_u64")] u64);

#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Epoch(#[serde(with = "serde_utils::quoted_u64")] u64);

macro_rules! impl_common {
    ($type: ident) => {
        impl $type {
            pub const fn new(slot: u64) -> $type {
                $type(slot)
            }

            pub const fn as_u64(&self) -> u64 {
                self.0
            }

            pub fn as_usize(&self) -> usize {
                self.0 as usize
            }

            pub fn max_value() -> $type {
                $type(u64::MAX)
            }

            pub fn saturating_sub<T: Into<$type>>(&self, other: T) -> $type {
                $type(self.0.saturating_sub(other.into().0))
            }

            pub fn saturating_add<T: Into<$type>>(&self, other: T) -> $type {
                $type(self.0.saturating_add(other.into().0))
            }
        }

        impl From<u64> for $type {
            fn from(x: u64) -> Self {
                $type(x)
            }
        }

        impl From<usize> for $type {
            fn from(x: usize) -> Self {
                $type(x as u64)
            }
        }

        impl From<$type> for u64 {
            fn from(x: $type) -> u64 {
                x.0
            }
        }

        impl From<$type> for usize {
            fn from(x: $type) -> usize {
                x.0 as usize
            }
        }

        impl Add<$type> for $type {
            type Output = $type;

            fn add(self, other: $type) -> $type {
                $type(self.0.saturating_add(other.0))
            }
        }

        impl Add<u64> for $type {
            type Output = $type;

            fn add(self, other: u64) -> $type {
                $type(self.0.saturating_add(other))
            }
        }

        impl AddAssign<$type> for $type {
            fn add_assign(&mut self, other: $type) {
                self.0 = self.0.saturating_add(other.0);
            }
        }

        impl AddAssign<u64> for $type {
            fn add_assign(&mut self, other: u64) {
                self.0 = self.0.saturating_add(other);
            }
        }

        impl Sub<$type> for $type {
            type Output = $type;

            fn sub(self, other: $type) -> $type {
                $type(self.0.saturating_sub(other.0))
            }
        }

        impl Sub<u64> for $type {
            type Output = $type;

            fn sub(self, other: u64) -> $type {
                $type(self.0.saturating_sub(other))
            }
        }

        impl SubAssign<$type> for $type {
            fn sub_assign(&mut self, other: $type) {
                self.0 = self.0.saturating_sub(other.0);
            }
        }

        impl SubAssign<u64> for $type {
            fn sub_assign(&mut self, other: u64) {
                self.0 = self.0.saturating_sub(other);
            }
        }

        impl Mul<u64> for $type {
            type Output = $type;

            fn mul(self, rhs: u64) -> $type {
                $type(self.0.saturating_mul(rhs))
            }
        }

        impl Div<u64> for $type {
            type Output = $type;

            fn div(self, rhs: u64) -> $type {
                $type(
                    self.0
                        .checked_div(rhs)
                        .expect("divisor must be non-zero"),
                )
            }
        }

        impl Rem<u64> for $type {
            type Output = $type;

            fn rem(self, modulus: u64) -> $type {
                $type(
                    self.0
                        .checked_rem(modulus)
                        .expect("modulus must be non-zero"),
                )
            }
        }

        impl PartialEq<u64> for $type {
            fn eq(&self, other: &u64) -> bool {
                self.0 == *other
            }
        }

        impl PartialOrd<u64> for $type {
            fn partial_cmp(&self, other: &u64) -> Option<std::cmp::Ordering> {
                self.0.partial_cmp(other)
            }
        }

        impl fmt::Display for $type {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl fmt::Debug for $type {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "{}({})", stringify!($type), self.0)
            }
        }

        impl ssz::Encode for $type {
            fn is_ssz_fixed_len() -> bool {
                <u64 as ssz::Encode>::is_ssz_fixed_len()
            }

            fn ssz_fixed_len() -> usize {
                <u64 as ssz::Encode>::ssz_fixed_len()
            }

            fn ssz_bytes_len(&self) -> usize {
                self.0.ssz_bytes_len()
            }

            fn ssz_append(&self, buf: &mut Vec<u8>) {
                self.0.ssz_append(buf)
            }
        }

        impl ssz::Decode for $type {
            fn is_ssz_fixed_len() -> bool {
                <u64 as ssz::Decode>::is_ssz_fixed_len()
            }

            fn ssz_fixed_len() -> usize {
                <u64 as ssz::Decode>::ssz_fixed_len()
            }

            fn from_ssz_bytes(bytes: &[u8]) -> Result<Self, ssz::DecodeError> {
                u64::from_ssz_bytes(bytes).map($type)
            }
        }

        impl tree_hash::TreeHash for $type {
            fn tree_hash_type() -> tree_hash::TreeHashType {
                tree_hash::TreeHashType::Basic
            }

            fn tree_hash_packed_encoding(&self) -> tree_hash::PackedEncoding {
                self.0.tree_hash_packed_encoding()
            }

            fn tree_hash_packing_factor() -> usize {
                <u64 as tree_hash::TreeHash>::tree_hash_packing_factor()
            }

            fn tree_hash_root(&self) -> tree_hash::Hash256 {
                tree_hash::TreeHash::tree_hash_root(&self.0)
            }
        }

        impl SafeArith for $type {
            const ZERO: Self = $type::new(0);
            const ONE: Self = $type::new(1);

            fn safe_add(&self, other: Self) -> Result<Self, ArithError> {
                self.0.safe_add(other.0).map($type)
            }

            fn safe_sub(&self, other: Self) -> Result<Self, ArithError> {
                self.0.safe_sub(other.0).map($type)
            }

            fn safe_mul(&self, other: Self) -> Result<Self, ArithError> {
                self.0.safe_mul(other.0).map($type)
            }

            fn safe_div(&self, other: Self) -> Result<Self, ArithError> {
                self.0.safe_div(other.0).map($type)
            }

            fn safe_rem(&self, other: Self) -> Result<Self, ArithError> {
                self.0.safe_rem(other.0).map($type)
            }

            fn safe_shl(&self, other: u32) -> Result<Self, ArithError> {
                self.0.safe_shl(other).map($type)
            }

            fn safe_shr(&self, other: u32) -> Result<Self, ArithError> {
                self.0.safe_shr(other).map($type)
            }
        }
    };
}

impl_common!(Slot);
impl_common!(Epoch);

impl Slot {
    /// Returns the epoch containing `self`.
    pub fn epoch(self, slots_per_epoch: u64) -> Epoch {
        Epoch::new(self.0 / slots_per_epoch)
    }

    pub fn is_genesis(self, genesis_slot: Slot) -> bool {
        self <= genesis_slot
    }
}

impl Epoch {
    /// Returns the first slot in the epoch.
    pub fn start_slot(self, slots_per_epoch: u64) -> Slot {
        Slot::new(self.0.saturating_mul(slots_per_epoch))
    }

    /// Returns the last slot in the epoch.
    pub fn end_slot(self, slots_per_epoch: u64) -> Slot {
        Slot::new(
            self.0
                .saturating_add(1)
                .saturating_mul(slots_per_epoch)
                .saturating_sub(1),
        )
    }

    /// Compute the sync committee period for `self`.
    pub fn sync_committee_period(self, spec: &ChainSpec) -> Result<u64, ArithError> {
        self.safe_div(spec.epochs_per_sync_committee_period)
            .map(|e| e.as_u64())
    }
}

impl SignedRoot for Slot {}
impl SignedRoot for Epoch {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_epoch_relationship() {
        assert_eq!(Slot::new(0).epoch(32), Epoch::new(0));
        assert_eq!(Slot::new(31).epoch(32), Epoch::new(0));
        assert_eq!(Slot::new(32).epoch(32), Epoch::new(1));

        assert_eq!(Epoch::new(2).start_slot(32), Slot::new(64));
        assert_eq!(Epoch::new(2).end_slot(32), Slot::new(95));
    }

    #[test]
    fn arith_saturates() {
        assert_eq!(Slot::new(0) - 1u64, Slot::new(0));
        assert_eq!(Epoch::new(0).saturating_sub(10u64), Epoch::new(0));
        assert_eq!(Slot::max_value() + 1u64, Slot::max_value());
    }

    #[test]
    fn serde_quoted() {
        let slot = Slot::new(42);
        let json = serde_json::to_string(&slot).unwrap();
        assert_eq!(json, "\"42\"");
        assert_eq!(serde_json::from_str::<Slot>(&json).unwrap(), slot);
    }
}
