use crate::{PublicKey, SecretKey};
use std::fmt;
use std::sync::Arc;

/// A public and secret key pair.
#[derive(Clone)]
pub struct Keypair {
    pub pk: PublicKey,
    pub sk: Arc<SecretKey>,
}

impl Keypair {
    pub fn from_components(pk: PublicKey, sk: SecretKey) -> Self {
        Self {
            pk,
            sk: Arc::new(sk),
        }
    }

    /// Instantiates `Self` from a randomly generated secret key.
    pub fn random() -> Self {
        let sk = SecretKey::random();
        Self {
            pk: sk.public_key(),
            sk: Arc::new(sk),
        }
    }
}

/// Print the public key only, to avoid leaking the secret key.
impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.pk.fmt(f)
    }
}
