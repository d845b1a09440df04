use crate::{
    Attestation, AttesterSlashing, Deposit, Eth1Data, EthSpec, ExecutionPayload, Graffiti,
    ProposerSlashing, Signature, SignedVoluntaryExit, SyncAggregate, VariableList,
};
use serde::{Deserialize, Serialize};
use ssz_derive::{Decode, Encode};
use superstruct::superstruct;
use tree_hash_derive::TreeHash;

/// The body of a `BeaconChain` block, containing operations.
///
/// This *superstruct* abstracts over the hard-fork.
#[superstruct(
    variants(Base, Altair, Bellatrix),
    variant_attributes(
        derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode, TreeHash),
        serde(bound = "E: EthSpec", deny_unknown_fields),
    )
)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
#[serde(bound = "E: EthSpec")]
pub struct BeaconBlockBody<E: EthSpec> {
    pub randao_reveal: Signature,
    pub eth1_data: Eth1Data,
    pub graffiti: Graffiti,
    pub proposer_slashings: VariableList<ProposerSlashing, E::MaxProposerSlashings>,
    pub attester_slashings: VariableList<AttesterSlashing<E>, E::MaxAttesterSlashings>,
    pub attestations: VariableList<Attestation<E>, E::MaxAttestations>,
    pub deposits: VariableList<Deposit, E::MaxDeposits>,
    pub voluntary_exits: VariableList<SignedVoluntaryExit, E::MaxVoluntaryExits>,
    #[superstruct(only(Altair, Bellatrix))]
    pub sync_aggregate: SyncAggregate<E>,
    #[superstruct(only(Bellatrix))]
    pub execution_payload: ExecutionPayload<E>,
}

/// `empty()` constructors for each fork's body: no operations, the
/// placeholder randao reveal, and fork-specific fields zeroed.
macro_rules! impl_empty_body {
    ($variant:ident { $($extra_field:ident: $extra_value:expr),* $(,)? }) => {
        impl<E: EthSpec> $variant<E> {
            pub fn empty() -> Self {
                Self {
                    randao_reveal: Signature::empty(),
                    eth1_data: Eth1Data::default(),
                    graffiti: Graffiti::default(),
                    proposer_slashings: VariableList::default(),
                    attester_slashings: VariableList::default(),
                    attestations: VariableList::default(),
                    deposits: VariableList::default(),
                    voluntary_exits: VariableList::default(),
                    $($extra_field: $extra_value,)*
                }
            }
        }
    };
}

impl_empty_body!(BeaconBlockBodyBase {});
impl_empty_body!(BeaconBlockBodyAltair {
    sync_aggregate: SyncAggregate::new(),
});
impl_empty_body!(BeaconBlockBodyBellatrix {
    sync_aggregate: SyncAggregate::new(),
    execution_payload: ExecutionPayload::default(),
});
