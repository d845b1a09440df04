use crate::{Error, PublicKey, PUBLIC_KEY_BYTES_LEN};
use std::str::FromStr;

/// The compressed bytes of a BLS public key.
///
/// The bytes are not checked to represent a valid curve point; total ordering
/// is plain byte ordering.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PublicKeyBytes([u8; PUBLIC_KEY_BYTES_LEN]);

impl PublicKeyBytes {
    /// Returns all-zero bytes, which represents an unset key (not the identity
    /// point).
    pub fn empty() -> Self {
        Self([0; PUBLIC_KEY_BYTES_LEN])
    }

    pub fn serialize(&self) -> [u8; PUBLIC_KEY_BYTES_LEN] {
        self.0
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != PUBLIC_KEY_BYTES_LEN {
            return Err(Error::InvalidByteLength {
                got: bytes.len(),
                expected: PUBLIC_KEY_BYTES_LEN,
            });
        }
        let mut pk_bytes = [0; PUBLIC_KEY_BYTES_LEN];
        pk_bytes.copy_from_slice(bytes);
        Ok(Self(pk_bytes))
    }

    /// Group-check the bytes, yielding a key usable for verification.
    pub fn decompress(&self) -> Result<PublicKey, Error> {
        PublicKey::deserialize(&self.0)
    }

    pub fn as_hex_string(&self) -> String {
        format!("{:?}", self)
    }
}

impl Default for PublicKeyBytes {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<&PublicKey> for PublicKeyBytes {
    fn from(pk: &PublicKey) -> Self {
        Self(pk.serialize())
    }
}

impl From<PublicKey> for PublicKeyBytes {
    fn from(pk: PublicKey) -> Self {
        Self(pk.serialize())
    }
}

impl FromStr for PublicKeyBytes {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = serde_utils::hex::decode(s).map_err(|e| format!("{:?}", e))?;
        Self::deserialize(&bytes).map_err(|e| format!("{:?}", e))
    }
}

impl_ssz!(PublicKeyBytes, PUBLIC_KEY_BYTES_LEN);
impl_tree_hash!(PublicKeyBytes, PUBLIC_KEY_BYTES_LEN);
impl_serde_hex!(PublicKeyBytes);
impl_hex_debug_display!(PublicKeyBytes);
