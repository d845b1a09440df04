//! Raw-SSZ message dumps for debugging, behind `Config::dump_enabled`.

use ssz::Encode;
use std::fs;
use std::path::Path;
use tracing::warn;
use types::{
    Attestation, EthSpec, Hash256, SignedBeaconBlock, SignedContributionAndProof,
};

fn write(dir: &Path, filename: String, bytes: Vec<u8>) {
    if let Err(e) = fs::create_dir_all(dir).and_then(|()| fs::write(dir.join(&filename), bytes)) {
        warn!(filename, error = %e, "Failed to dump message");
    }
}

pub fn dump_signed_block<E: EthSpec>(dir: &Path, block: &SignedBeaconBlock<E>, root: Hash256) {
    write(
        dir,
        format!("block-{:?}-{}.ssz", root, block.slot()),
        block.as_ssz_bytes(),
    );
}

pub fn dump_attestation<E: EthSpec>(dir: &Path, attestation: &Attestation<E>) {
    write(
        dir,
        format!(
            "attestation-{:?}-{}.ssz",
            attestation.data.beacon_block_root, attestation.data.slot
        ),
        attestation.as_ssz_bytes(),
    );
}

pub fn dump_sync_contribution<E: EthSpec>(
    dir: &Path,
    contribution: &SignedContributionAndProof<E>,
) {
    write(
        dir,
        format!(
            "contribution-{:?}-{}.ssz",
            contribution.message.contribution.beacon_block_root,
            contribution.message.contribution.slot
        ),
        contribution.as_ssz_bytes(),
    );
}
