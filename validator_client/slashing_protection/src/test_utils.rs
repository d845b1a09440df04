use crate::{SlashingDatabase, SLASHING_PROTECTION_FILENAME};
use std::path::PathBuf;
use tempfile::{tempdir, TempDir};
use types::{Epoch, FixedBytesExtended, Hash256, PublicKeyBytes, Slot};

pub const DEFAULT_VALIDATOR_INDEX: usize = 0;

/// Deterministic pubkey bytes for test validator `i`.
///
/// Not a valid curve point, which is fine: the store never decompresses.
pub fn pubkey(i: u64) -> PublicKeyBytes {
    let mut bytes = [0u8; 48];
    bytes[40..].copy_from_slice(&i.to_be_bytes());
    PublicKeyBytes::deserialize(&bytes).expect("48 bytes is a valid pubkey length")
}

/// A database in a fresh temporary directory, with validator 0 registered.
pub fn test_db() -> (SlashingDatabase, TempDir) {
    let dir = tempdir().expect("couldn't create temporary directory");
    let db = SlashingDatabase::create(&db_path(&dir)).unwrap();
    db.register_validator(&pubkey(DEFAULT_VALIDATOR_INDEX as u64))
        .unwrap();
    (db, dir)
}

pub fn db_path(dir: &TempDir) -> PathBuf {
    dir.path().join(SLASHING_PROTECTION_FILENAME)
}

pub fn signing_root(i: u64) -> Hash256 {
    Hash256::from_low_u64_be(i)
}

pub fn slot(i: u64) -> Slot {
    Slot::new(i)
}

pub fn epoch(i: u64) -> Epoch {
    Epoch::new(i)
}
