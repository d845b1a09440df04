use crate::{ContributionAndProof, EthSpec, Signature};
use serde::{Deserialize, Serialize};
use ssz_derive::{Decode, Encode};
use tree_hash_derive::TreeHash;

/// A signed `ContributionAndProof`, to be published on the
/// `sync_committee_contribution_and_proof` gossipsub topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode, TreeHash)]
#[serde(bound = "E: EthSpec")]
pub struct SignedContributionAndProof<E: EthSpec> {
    /// The `ContributionAndProof` that was signed.
    pub message: ContributionAndProof<E>,
    /// The validator's signature of `message`.
    pub signature: Signature,
}
