use crate::{Error, Hash256, PublicKey, Signature, DST, SECRET_KEY_BYTES_LEN};
use blst::min_pk as blst_core;
use rand::RngCore;
use zeroize::Zeroize;

/// A BLS secret key.
///
/// Deliberately has no `Debug`, `Display`, `Serialize` or `Clone`-via-bytes
/// surface beyond `serialize`, to make accidental key leakage hard.
#[derive(Clone)]
pub struct SecretKey(blst_core::SecretKey);

impl SecretKey {
    /// Generate a key from the system RNG.
    pub fn random() -> Self {
        let mut ikm = [0u8; SECRET_KEY_BYTES_LEN];
        rand::thread_rng().fill_bytes(&mut ikm);
        let sk = blst_core::SecretKey::key_gen(&ikm, &[])
            .expect("key_gen does not fail with 32 bytes of ikm");
        ikm.zeroize();
        Self(sk)
    }

    /// Returns the public key that corresponds to this secret key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_point(self.0.sk_to_pk())
    }

    /// Hash-to-curve sign `msg`.
    pub fn sign(&self, msg: Hash256) -> Signature {
        Signature::from_point(self.0.sign(msg.as_slice(), DST, &[]))
    }

    pub fn serialize(&self) -> [u8; SECRET_KEY_BYTES_LEN] {
        self.0.to_bytes()
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != SECRET_KEY_BYTES_LEN {
            return Err(Error::InvalidSecretKeyLength {
                got: bytes.len(),
                expected: SECRET_KEY_BYTES_LEN,
            });
        }
        Ok(Self(blst_core::SecretKey::from_bytes(bytes)?))
    }
}
