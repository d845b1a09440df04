//! Provides methods for obtaining validator signatures, including:
//!
//! - Via a local `Keypair`.
//! - Via a remote signer (Web3Signer-compatible HTTP API).

use std::sync::Arc;
use types::*;
use url::Url;

pub use web3signer::ForkInfo;
use web3signer::{Web3SignerObject, Web3SignerRequest, Web3SignerResponse};

mod web3signer;

#[derive(Debug, PartialEq)]
pub enum Error {
    Web3SignerRequestFailed(String),
    Web3SignerJsonParsingFailed(String),
    InvalidSignatureReturned(String),
}

/// Enumerates all messages that can be signed by a validator.
pub enum SignableMessage<'a, E: EthSpec> {
    RandaoReveal(Epoch),
    BeaconBlock(&'a BeaconBlock<E>),
    AttestationData(&'a AttestationData),
    SignedAggregateAndProof(&'a AggregateAndProof<E>),
    SelectionProof(Slot),
    SyncSelectionProof(&'a SyncAggregatorSelectionData),
    SyncCommitteeSignature {
        beacon_block_root: Hash256,
        slot: Slot,
    },
    SignedContributionAndProof(&'a ContributionAndProof<E>),
    VoluntaryExit(&'a VoluntaryExit),
}

impl<'a, E: EthSpec> SignableMessage<'a, E> {
    /// Returns the `SignedRoot` for the contained message.
    ///
    /// The actual `SignedRoot` trait is not used since it parses in a
    /// type-sensitive manner.
    pub fn signing_root(&self, domain: Hash256) -> Hash256 {
        match self {
            SignableMessage::RandaoReveal(epoch) => epoch.signing_root(domain),
            SignableMessage::BeaconBlock(b) => b.signing_root(domain),
            SignableMessage::AttestationData(a) => a.signing_root(domain),
            SignableMessage::SignedAggregateAndProof(a) => a.signing_root(domain),
            SignableMessage::SelectionProof(slot) => slot.signing_root(domain),
            SignableMessage::SyncSelectionProof(s) => s.signing_root(domain),
            SignableMessage::SyncCommitteeSignature {
                beacon_block_root, ..
            } => beacon_block_root.signing_root(domain),
            SignableMessage::SignedContributionAndProof(c) => c.signing_root(domain),
            SignableMessage::VoluntaryExit(e) => e.signing_root(domain),
        }
    }
}

/// A method used by a validator to sign messages.
pub enum SigningMethod {
    /// A validator that is defined by a local keypair.
    LocalKeypair { voting_keypair: Arc<Keypair> },
    /// A validator that defers to a Web3Signer-compatible server for signing.
    Web3Signer {
        signing_url: Url,
        http_client: reqwest::Client,
        voting_public_key: PublicKeyBytes,
    },
}

/// The additional information used to construct a signature. Mostly useful for protecting from
/// replay attacks.
#[derive(Debug, Clone, Copy)]
pub struct SigningContext {
    pub domain: Domain,
    pub epoch: Epoch,
    pub fork: Fork,
    pub genesis_validators_root: Hash256,
}

impl SigningContext {
    /// Returns the `Hash256` to be mixed-in with the signature.
    pub fn domain_hash(&self, spec: &ChainSpec) -> Hash256 {
        spec.get_domain(
            self.epoch,
            self.domain,
            &self.fork,
            self.genesis_validators_root,
        )
    }
}

impl SigningMethod {
    /// Return whether this signing method requires a remote round trip per signature.
    pub fn is_remote(&self) -> bool {
        matches!(self, SigningMethod::Web3Signer { .. })
    }

    /// Return the signature of `signable_message`, with respect to the `signing_context`.
    pub async fn get_signature<E: EthSpec>(
        &self,
        signable_message: SignableMessage<'_, E>,
        signing_context: SigningContext,
        spec: &ChainSpec,
    ) -> Result<Signature, Error> {
        let domain_hash = signing_context.domain_hash(spec);
        let signing_root = signable_message.signing_root(domain_hash);

        let fork_info = Some(ForkInfo {
            fork: signing_context.fork,
            genesis_validators_root: signing_context.genesis_validators_root,
        });

        self.get_signature_from_root(signable_message, signing_root, fork_info)
            .await
    }

    pub async fn get_signature_from_root<E: EthSpec>(
        &self,
        signable_message: SignableMessage<'_, E>,
        signing_root: Hash256,
        fork_info: Option<ForkInfo>,
    ) -> Result<Signature, Error> {
        match self {
            SigningMethod::LocalKeypair { voting_keypair } => {
                Ok(voting_keypair.sk.sign(signing_root))
            }
            SigningMethod::Web3Signer {
                signing_url,
                http_client,
                ..
            } => {
                // Map the message into a Web3Signer type.
                let object = match signable_message {
                    SignableMessage::RandaoReveal(epoch) => {
                        Web3SignerObject::RandaoReveal { epoch }
                    }
                    SignableMessage::BeaconBlock(block) => Web3SignerObject::block(block),
                    SignableMessage::AttestationData(a) => Web3SignerObject::Attestation(a),
                    SignableMessage::SignedAggregateAndProof(a) => {
                        Web3SignerObject::AggregateAndProof(a)
                    }
                    SignableMessage::SelectionProof(slot) => {
                        Web3SignerObject::AggregationSlot { slot }
                    }
                    SignableMessage::SyncSelectionProof(s) => {
                        Web3SignerObject::SyncAggregatorSelectionData(s)
                    }
                    SignableMessage::SyncCommitteeSignature {
                        beacon_block_root,
                        slot,
                    } => Web3SignerObject::SyncCommitteeMessage {
                        beacon_block_root,
                        slot,
                    },
                    SignableMessage::SignedContributionAndProof(c) => {
                        Web3SignerObject::ContributionAndProof(c)
                    }
                    SignableMessage::VoluntaryExit(e) => Web3SignerObject::VoluntaryExit(e),
                };

                let message_type = object.message_type();

                let request = Web3SignerRequest {
                    message_type,
                    fork_info,
                    signing_root,
                    object,
                };

                // Request a signature from the Web3Signer instance via HTTP(S).
                let response: Web3SignerResponse = http_client
                    .post(signing_url.clone())
                    .json(&request)
                    .send()
                    .await
                    .map_err(|e| Error::Web3SignerRequestFailed(e.to_string()))?
                    .error_for_status()
                    .map_err(|e| Error::Web3SignerRequestFailed(e.to_string()))?
                    .json()
                    .await
                    .map_err(|e| Error::Web3SignerJsonParsingFailed(e.to_string()))?;

                response
                    .signature
                    .decompress()
                    .map_err(|e| Error::InvalidSignatureReturned(format!("{:?}", e)))
            }
        }
    }
}
