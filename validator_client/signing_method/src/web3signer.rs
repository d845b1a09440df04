//! Contains the types required to make JSON requests to Web3Signer servers.

use serde::{Deserialize, Serialize};
use types::*;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageType {
    AggregationSlot,
    AggregateAndProof,
    Attestation,
    Block,
    BlockV2,
    RandaoReveal,
    SyncCommitteeMessage,
    SyncCommitteeSelectionProof,
    SyncCommitteeContributionAndProof,
    VoluntaryExit,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct ForkInfo {
    pub fork: Fork,
    pub genesis_validators_root: Hash256,
}

#[derive(Debug, Serialize)]
#[serde(bound = "E: EthSpec", rename_all = "snake_case")]
pub enum Web3SignerObject<'a, E: EthSpec> {
    AggregationSlot {
        slot: Slot,
    },
    AggregateAndProof(&'a AggregateAndProof<E>),
    Attestation(&'a AttestationData),
    BeaconBlock {
        version: ForkName,
        block: &'a BeaconBlock<E>,
    },
    RandaoReveal {
        epoch: Epoch,
    },
    SyncCommitteeMessage {
        beacon_block_root: Hash256,
        slot: Slot,
    },
    SyncAggregatorSelectionData(&'a SyncAggregatorSelectionData),
    ContributionAndProof(&'a ContributionAndProof<E>),
    VoluntaryExit(&'a VoluntaryExit),
}

impl<'a, E: EthSpec> Web3SignerObject<'a, E> {
    pub fn block(block: &'a BeaconBlock<E>) -> Self {
        let version = match block {
            BeaconBlock::Base(_) => ForkName::Base,
            BeaconBlock::Altair(_) => ForkName::Altair,
            BeaconBlock::Bellatrix(_) => ForkName::Bellatrix,
        };
        Web3SignerObject::BeaconBlock { version, block }
    }

    pub fn message_type(&self) -> MessageType {
        match self {
            Web3SignerObject::AggregationSlot { .. } => MessageType::AggregationSlot,
            Web3SignerObject::AggregateAndProof(_) => MessageType::AggregateAndProof,
            Web3SignerObject::Attestation(_) => MessageType::Attestation,
            Web3SignerObject::BeaconBlock { .. } => MessageType::BlockV2,
            Web3SignerObject::RandaoReveal { .. } => MessageType::RandaoReveal,
            Web3SignerObject::SyncCommitteeMessage { .. } => MessageType::SyncCommitteeMessage,
            Web3SignerObject::SyncAggregatorSelectionData(_) => {
                MessageType::SyncCommitteeSelectionProof
            }
            Web3SignerObject::ContributionAndProof(_) => {
                MessageType::SyncCommitteeContributionAndProof
            }
            Web3SignerObject::VoluntaryExit(_) => MessageType::VoluntaryExit,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(bound = "E: EthSpec")]
pub struct Web3SignerRequest<'a, E: EthSpec> {
    #[serde(rename = "type")]
    pub message_type: MessageType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fork_info: Option<ForkInfo>,
    #[serde(rename = "signingRoot")]
    pub signing_root: Hash256,
    #[serde(flatten)]
    pub object: Web3SignerObject<'a, E>,
}

#[derive(Debug, Deserialize)]
pub struct Web3SignerResponse {
    pub signature: SignatureBytes,
}
