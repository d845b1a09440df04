//! Types used by the validator duties engine and its collaborators.
//!
//! The basic guide is: use `SignedFoo` for container-plus-signature pairs and
//! keep every hashed container `TreeHash` so that signing roots can be
//! computed uniformly via `SignedRoot`.

pub mod aggregate_and_proof;
pub mod attestation;
pub mod attestation_data;
pub mod beacon_block;
pub mod beacon_block_body;
pub mod beacon_block_header;
pub mod chain_spec;
pub mod checkpoint;
pub mod consts;
pub mod deposit;
pub mod eth1_data;
pub mod eth_spec;
pub mod execution_payload;
pub mod fork;
pub mod fork_data;
pub mod fork_name;
pub mod graffiti;
pub mod indexed_attestation;
pub mod proposer_slashing;
pub mod selection_proof;
pub mod signed_aggregate_and_proof;
pub mod signed_beacon_block;
pub mod signing_data;
pub mod slot_epoch;
pub mod subnet_id;
pub mod sync_aggregate;
pub mod sync_aggregator_selection_data;
pub mod sync_committee;
pub mod sync_committee_contribution;
pub mod sync_committee_message;
pub mod sync_selection_proof;
pub mod sync_subnet_id;
pub mod validator;
pub mod voluntary_exit;

pub mod attester_slashing;
pub mod contribution_and_proof;
pub mod signed_contribution_and_proof;
pub mod signed_voluntary_exit;

pub use crate::aggregate_and_proof::AggregateAndProof;
pub use crate::attestation::{Attestation, Error as AttestationError};
pub use crate::attestation_data::AttestationData;
pub use crate::attester_slashing::AttesterSlashing;
pub use crate::beacon_block::{
    BeaconBlock, BeaconBlockAltair, BeaconBlockBase, BeaconBlockBellatrix,
};
pub use crate::beacon_block_body::{
    BeaconBlockBody, BeaconBlockBodyAltair, BeaconBlockBodyBase, BeaconBlockBodyBellatrix,
};
pub use crate::beacon_block_header::{BeaconBlockHeader, SignedBeaconBlockHeader};
pub use crate::chain_spec::{ChainSpec, Domain};
pub use crate::checkpoint::Checkpoint;
pub use crate::deposit::{Deposit, DepositData};
pub use crate::eth1_data::Eth1Data;
pub use crate::eth_spec::{EthSpec, MainnetEthSpec, MinimalEthSpec};
pub use crate::execution_payload::{ExecutionPayload, Transaction};
pub use crate::fork::Fork;
pub use crate::fork_data::ForkData;
pub use crate::fork_name::ForkName;
pub use crate::graffiti::{Graffiti, GraffitiString, GRAFFITI_BYTES_LEN};
pub use crate::indexed_attestation::IndexedAttestation;
pub use crate::proposer_slashing::ProposerSlashing;
pub use crate::selection_proof::SelectionProof;
pub use crate::signed_aggregate_and_proof::SignedAggregateAndProof;
pub use crate::signed_beacon_block::SignedBeaconBlock;
pub use crate::signed_contribution_and_proof::SignedContributionAndProof;
pub use crate::signed_voluntary_exit::SignedVoluntaryExit;
pub use crate::signing_data::{SignedRoot, SigningData};
pub use crate::slot_epoch::{Epoch, Slot};
pub use crate::subnet_id::SubnetId;
pub use crate::sync_aggregate::SyncAggregate;
pub use crate::sync_aggregator_selection_data::SyncAggregatorSelectionData;
pub use crate::sync_committee::SyncCommittee;
pub use crate::sync_committee_contribution::SyncCommitteeContribution;
pub use crate::sync_committee_message::SyncCommitteeMessage;
pub use crate::sync_selection_proof::SyncSelectionProof;
pub use crate::sync_subnet_id::SyncSubnetId;
pub use crate::validator::Validator;
pub use crate::voluntary_exit::VoluntaryExit;
pub use crate::contribution_and_proof::ContributionAndProof;

pub use bls::{
    AggregateSignature, Keypair, PublicKey, PublicKeyBytes, SecretKey, Signature, SignatureBytes,
};
pub use fixed_bytes::{Address, FixedBytesExtended, Hash256, Uint256};
pub use ssz_types::{typenum, BitList, BitVector, FixedVector, VariableList};

/// The index of a committee within a slot.
pub type CommitteeIndex = u64;
/// The index of a validator in the global registry.
pub type ValidatorIndex = u64;
