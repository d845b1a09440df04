//! The set of validators attached to this node, keyed by voting public key.
//!
//! Each attached validator routes signing either to a local keypair or to a
//! remote (Web3Signer-compatible) server. Validators are created once at
//! startup and live for the process lifetime; their registry index may be
//! discovered later, once the deposit is processed and the validator appears
//! in the state.

use parking_lot::RwLock;
use signing_method::SigningMethod;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use types::{Keypair, PublicKeyBytes, Validator};
use url::Url;

/// Timeout for a single remote signing request.
const REMOTE_SIGNER_TIMEOUT: Duration = Duration::from_secs(12);

/// Configuration-time description of a signing backend discovered at startup.
pub enum KeystoreDescriptor {
    Local {
        voting_keypair: Keypair,
    },
    Remote {
        voting_public_key: PublicKeyBytes,
        url: String,
        ignore_ssl_verification: bool,
    },
}

/// A validator handle: identity plus signing backend.
pub struct AttachedValidator {
    voting_pubkey: PublicKeyBytes,
    /// The registry index, discovered lazily on first activation sighting.
    index: RwLock<Option<u64>>,
    signing_method: Arc<SigningMethod>,
}

impl AttachedValidator {
    pub fn voting_pubkey(&self) -> PublicKeyBytes {
        self.voting_pubkey
    }

    pub fn index(&self) -> Option<u64> {
        *self.index.read()
    }

    /// Record the validator's registry index.
    ///
    /// The index is set-once: observing a *different* index for a previously
    /// indexed validator indicates state corruption and aborts the process.
    pub fn set_index(&self, index: u64) {
        let mut guard = self.index.write();
        match *guard {
            Some(existing) => assert_eq!(
                existing, index,
                "validator index for {:?} changed from {} to {}",
                self.voting_pubkey, existing, index
            ),
            None => {
                info!(
                    validator = ?self.voting_pubkey,
                    index,
                    "Validator index discovered"
                );
                *guard = Some(index)
            }
        }
    }

    pub fn signing_method(&self) -> Arc<SigningMethod> {
        self.signing_method.clone()
    }
}

/// Registry mapping voting public key to validator handle.
///
/// Iteration order is `HashMap` order: unspecified, and in particular not
/// stable across restarts.
#[derive(Default)]
pub struct AttachedValidators {
    validators: HashMap<PublicKeyBytes, Arc<AttachedValidator>>,
}

impl AttachedValidators {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a validator described by `descriptor`.
    pub fn add_from_descriptor(
        &mut self,
        descriptor: KeystoreDescriptor,
        state_validators: &[Validator],
    ) {
        match descriptor {
            KeystoreDescriptor::Local { voting_keypair } => {
                self.add_local(voting_keypair, state_validators)
            }
            KeystoreDescriptor::Remote {
                voting_public_key,
                url,
                ignore_ssl_verification,
            } => self.add_remote(
                voting_public_key,
                &url,
                ignore_ssl_verification,
                state_validators,
            ),
        }
    }

    /// Attach a validator with a local keypair.
    pub fn add_local(&mut self, voting_keypair: Keypair, state_validators: &[Validator]) {
        let voting_pubkey = voting_keypair.pk.compress();
        let signing_method = Arc::new(SigningMethod::LocalKeypair {
            voting_keypair: Arc::new(voting_keypair),
        });
        self.insert(voting_pubkey, signing_method, state_validators);
    }

    /// Attach a validator that signs via a remote Web3Signer-compatible server.
    ///
    /// A malformed URL is logged and the validator dropped; it must not abort
    /// startup for the other validators.
    pub fn add_remote(
        &mut self,
        voting_public_key: PublicKeyBytes,
        url: &str,
        ignore_ssl_verification: bool,
        state_validators: &[Validator],
    ) {
        let signing_url = match remote_signing_url(url, &voting_public_key) {
            Ok(url) => url,
            Err(e) => {
                warn!(
                    validator = ?voting_public_key,
                    url,
                    error = %e,
                    "Dropping remote validator with invalid signer URL"
                );
                return;
            }
        };

        let builder = reqwest::Client::builder()
            .timeout(REMOTE_SIGNER_TIMEOUT)
            .danger_accept_invalid_certs(ignore_ssl_verification);
        let http_client = match builder.build() {
            Ok(client) => client,
            Err(e) => {
                warn!(
                    validator = ?voting_public_key,
                    error = %e,
                    "Dropping remote validator, unable to build HTTP client"
                );
                return;
            }
        };

        let signing_method = Arc::new(SigningMethod::Web3Signer {
            signing_url,
            http_client,
            voting_public_key,
        });
        self.insert(voting_public_key, signing_method, state_validators);
    }

    fn insert(
        &mut self,
        voting_pubkey: PublicKeyBytes,
        signing_method: Arc<SigningMethod>,
        state_validators: &[Validator],
    ) {
        let index = state_validators
            .iter()
            .position(|v| v.pubkey == voting_pubkey)
            .map(|i| i as u64);

        if index.is_none() {
            // The deposit may simply not have been processed yet.
            debug!(
                validator = ?voting_pubkey,
                "Attached validator is not yet present in the state"
            );
        }

        let validator = Arc::new(AttachedValidator {
            voting_pubkey,
            index: RwLock::new(index),
            signing_method,
        });
        self.validators.insert(voting_pubkey, validator);
    }

    /// Returns the handle for `pubkey`, if attached.
    pub fn get(&self, pubkey: &PublicKeyBytes) -> Option<Arc<AttachedValidator>> {
        self.validators.get(pubkey).cloned()
    }

    /// Returns the handle for the validator at registry `index`, backfilling
    /// the handle's index on first sighting.
    pub fn get_by_index(
        &self,
        state_validators: &[Validator],
        index: u64,
    ) -> Option<Arc<AttachedValidator>> {
        let pubkey = state_validators.get(index as usize)?.pubkey;
        let validator = self.get(&pubkey)?;
        validator.set_index(index);
        Some(validator)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PublicKeyBytes, &Arc<AttachedValidator>)> {
        self.validators.iter()
    }

    pub fn num_validators(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

fn remote_signing_url(base: &str, pubkey: &PublicKeyBytes) -> Result<Url, String> {
    let base = Url::parse(base).map_err(|e| format!("invalid base URL: {}", e))?;
    base.join(&format!("api/v1/eth2/sign/{}", pubkey.as_hex_string()))
        .map_err(|e| format!("cannot construct signing URL: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with(keypairs: &[&Keypair]) -> Vec<Validator> {
        keypairs
            .iter()
            .map(|keypair| Validator {
                pubkey: keypair.pk.compress(),
                ..Validator::default()
            })
            .collect()
    }

    #[test]
    fn local_validator_index_resolved_at_startup() {
        let keypair = Keypair::random();
        let state = state_with(&[&keypair]);

        let mut validators = AttachedValidators::new();
        validators.add_local(keypair.clone(), &state);

        let handle = validators.get(&keypair.pk.compress()).unwrap();
        assert_eq!(handle.index(), Some(0));
    }

    #[test]
    fn missing_deposit_resolves_lazily() {
        let keypair = Keypair::random();

        let mut validators = AttachedValidators::new();
        validators.add_local(keypair.clone(), &[]);

        let handle = validators.get(&keypair.pk.compress()).unwrap();
        assert_eq!(handle.index(), None);

        // The validator later appears in the state at index 3.
        let mut state = state_with(&[&Keypair::random(), &Keypair::random(), &Keypair::random()]);
        state.push(Validator {
            pubkey: keypair.pk.compress(),
            ..Validator::default()
        });

        let handle = validators.get_by_index(&state, 3).unwrap();
        assert_eq!(handle.index(), Some(3));
    }

    #[test]
    #[should_panic]
    fn divergent_index_reassignment_panics() {
        let keypair = Keypair::random();
        let mut validators = AttachedValidators::new();
        validators.add_local(keypair.clone(), &[]);

        let handle = validators.get(&keypair.pk.compress()).unwrap();
        handle.set_index(1);
        handle.set_index(2);
    }

    #[test]
    fn invalid_remote_url_is_dropped_not_fatal() {
        let mut validators = AttachedValidators::new();
        validators.add_remote(PublicKeyBytes::empty(), "not a url", false, &[]);
        assert!(validators.is_empty());
    }
}
