use crate::{Error, Signature, INFINITY_SIGNATURE, SIGNATURE_BYTES_LEN};

/// The compressed bytes of a BLS signature, not checked for point validity.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignatureBytes([u8; SIGNATURE_BYTES_LEN]);

impl SignatureBytes {
    /// Returns the compressed point-at-infinity.
    pub fn empty() -> Self {
        Self(INFINITY_SIGNATURE)
    }

    pub fn serialize(&self) -> [u8; SIGNATURE_BYTES_LEN] {
        self.0
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != SIGNATURE_BYTES_LEN {
            return Err(Error::InvalidByteLength {
                got: bytes.len(),
                expected: SIGNATURE_BYTES_LEN,
            });
        }
        let mut sig_bytes = [0; SIGNATURE_BYTES_LEN];
        sig_bytes.copy_from_slice(bytes);
        Ok(Self(sig_bytes))
    }

    /// Point-check the bytes, yielding a usable signature.
    pub fn decompress(&self) -> Result<Signature, Error> {
        Signature::deserialize(&self.0)
    }
}

impl Default for SignatureBytes {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<&Signature> for SignatureBytes {
    fn from(sig: &Signature) -> Self {
        Self(sig.serialize())
    }
}

impl From<Signature> for SignatureBytes {
    fn from(sig: Signature) -> Self {
        Self(sig.serialize())
    }
}

impl_ssz!(SignatureBytes, SIGNATURE_BYTES_LEN);
impl_tree_hash!(SignatureBytes, SIGNATURE_BYTES_LEN);
impl_serde_hex!(SignatureBytes);
impl_hex_debug_display!(SignatureBytes);
