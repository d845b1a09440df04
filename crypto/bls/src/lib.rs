//! BLS12-381 primitives for signing consensus messages, backed by the
//! `blst` (supranational) implementation.
//!
//! Two flavours of each point type exist:
//!
//! - "Decompressed" types (`PublicKey`, `Signature`) hold a group-checked
//!   curve point and can participate in crypto operations.
//! - "Bytes" types (`PublicKeyBytes`, `SignatureBytes`) hold the compressed
//!   wire representation and are cheap to store, order and hash. They may
//!   contain bytes that do not represent a valid point; validity is only
//!   checked on decompression.

#[macro_use]
mod macros;

mod aggregate_signature;
mod keypair;
mod public_key;
mod public_key_bytes;
mod secret_key;
mod signature;
mod signature_bytes;

pub use aggregate_signature::AggregateSignature;
pub use fixed_bytes::Hash256;
pub use keypair::Keypair;
pub use public_key::PublicKey;
pub use public_key_bytes::PublicKeyBytes;
pub use secret_key::SecretKey;
pub use signature::Signature;
pub use signature_bytes::SignatureBytes;

pub const PUBLIC_KEY_BYTES_LEN: usize = 48;
pub const SIGNATURE_BYTES_LEN: usize = 96;
pub const SECRET_KEY_BYTES_LEN: usize = 32;

/// The compressed representation of the point-at-infinity on G2.
///
/// Used as the signature of the empty (pre-signing) aggregate.
pub const INFINITY_SIGNATURE: [u8; SIGNATURE_BYTES_LEN] = {
    let mut bytes = [0u8; SIGNATURE_BYTES_LEN];
    bytes[0] = 0xc0;
    bytes
};

/// Domain separation tag mandated for proof-of-possession BLS signatures.
pub const DST: &[u8] = b"BLS_SIG_BLS12381G2_XMD:SHA-256_SSWU_RO_POP_";

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// An error was raised from the `blst` library.
    BlstError(blst::BLST_ERROR),
    /// The provided bytes were an incorrect length.
    InvalidByteLength { got: usize, expected: usize },
    /// The provided secret key bytes were an incorrect length.
    InvalidSecretKeyLength { got: usize, expected: usize },
}

impl From<blst::BLST_ERROR> for Error {
    fn from(e: blst::BLST_ERROR) -> Error {
        Error::BlstError(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infinity_signature_round_trip() {
        let sig = Signature::empty();
        assert_eq!(sig.serialize(), INFINITY_SIGNATURE);
        let decoded = Signature::deserialize(&INFINITY_SIGNATURE).unwrap();
        assert_eq!(decoded, sig);
    }

    #[test]
    fn sign_and_verify() {
        let keypair = Keypair::random();
        let msg = Hash256::repeat_byte(0x42);
        let sig = keypair.sk.sign(msg);
        assert!(sig.verify(&keypair.pk, msg));
        assert!(!sig.verify(&keypair.pk, Hash256::repeat_byte(0x43)));
    }

    #[test]
    fn pubkey_bytes_ordering_is_byte_ordering() {
        let mut a = [0u8; PUBLIC_KEY_BYTES_LEN];
        let mut b = [0u8; PUBLIC_KEY_BYTES_LEN];
        a[0] = 1;
        b[0] = 2;
        assert!(PublicKeyBytes::deserialize(&a).unwrap() < PublicKeyBytes::deserialize(&b).unwrap());
    }

    #[test]
    fn aggregate_accumulates() {
        let keypair = Keypair::random();
        let msg = Hash256::repeat_byte(0x11);
        let sig = keypair.sk.sign(msg);

        let mut agg = AggregateSignature::infinity();
        assert_eq!(agg.serialize(), INFINITY_SIGNATURE);
        agg.add_assign(&sig);
        assert_ne!(agg.serialize(), INFINITY_SIGNATURE);
        assert_eq!(agg.serialize().to_vec(), sig.serialize().to_vec());
    }
}
