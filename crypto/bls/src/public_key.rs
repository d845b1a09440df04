use crate::{Error, PublicKeyBytes, PUBLIC_KEY_BYTES_LEN};
use blst::min_pk as blst_core;
use std::hash::{Hash, Hasher};

/// A group-checked BLS public key, able to participate in signature
/// verification.
#[derive(Clone)]
pub struct PublicKey(blst_core::PublicKey);

impl PublicKey {
    pub(crate) fn from_point(point: blst_core::PublicKey) -> Self {
        Self(point)
    }

    pub(crate) fn point(&self) -> &blst_core::PublicKey {
        &self.0
    }

    /// Returns the compressed wire representation.
    pub fn serialize(&self) -> [u8; PUBLIC_KEY_BYTES_LEN] {
        self.0.to_bytes()
    }

    /// Returns `self` in the cheap-to-store compressed form.
    pub fn compress(&self) -> PublicKeyBytes {
        PublicKeyBytes::from(self)
    }

    /// Deserialize and group-check a compressed public key.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        Ok(Self(blst_core::PublicKey::key_validate(bytes)?))
    }

    pub fn as_hex_string(&self) -> String {
        format!("{:?}", self)
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.serialize() == other.serialize()
    }
}

impl Eq for PublicKey {}

impl Hash for PublicKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.serialize().hash(state)
    }
}

impl_ssz!(PublicKey, PUBLIC_KEY_BYTES_LEN);
impl_tree_hash!(PublicKey, PUBLIC_KEY_BYTES_LEN);
impl_serde_hex!(PublicKey);
impl_hex_debug_display!(PublicKey);
