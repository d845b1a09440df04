mod slashing_database;
#[cfg(test)]
mod attestation_tests;
#[cfg(test)]
mod block_tests;
#[cfg(test)]
mod parallel_tests;
#[cfg(test)]
pub mod test_utils;

pub use crate::slashing_database::{
    SlashingDatabase, CONNECTION_TIMEOUT, POOL_SIZE, SLASHING_PROTECTION_FILENAME,
};
use types::{Epoch, Hash256, PublicKeyBytes, Slot};

/// The attestation or block is not safe to sign.
///
/// This could be because it's slashable, or because an error occurred.
#[derive(PartialEq, Debug, Clone)]
pub enum NotSafe {
    UnregisteredValidator(PublicKeyBytes),
    InvalidBlock(InvalidBlock),
    InvalidAttestation(InvalidAttestation),
    IOError(String),
    SQLError(String),
    SQLPoolError(String),
}

/// The attestation or block is safe to sign.
#[derive(PartialEq, Debug, Clone, Copy)]
pub enum Safe {
    /// Casting the exact same data previously signed is safe.
    SameData,
    /// Valid, non-duplicate data: a protection record has been committed.
    Valid,
}

/// A summary of a block stored in the slashing protection store.
#[derive(PartialEq, Debug, Clone)]
pub struct SignedBlock {
    pub slot: Slot,
    pub signing_root: Hash256,
}

/// A summary of an attestation stored in the slashing protection store.
#[derive(PartialEq, Debug, Clone)]
pub struct SignedAttestation {
    pub source_epoch: Epoch,
    pub target_epoch: Epoch,
    pub signing_root: Hash256,
}

/// Reasons why a block may be slashable (or invalid).
#[derive(PartialEq, Debug, Clone)]
pub enum InvalidBlock {
    DoubleBlockProposal(SignedBlock),
}

/// Reasons why an attestation may be slashable (or invalid).
#[derive(PartialEq, Debug, Clone)]
pub enum InvalidAttestation {
    /// The attestation has the same target epoch as an attestation from the DB, but a
    /// different signing root.
    DoubleVote(SignedAttestation),
    /// The attestation surrounds an existing attestation from the database (`prev`).
    NewSurroundsPrev { prev: SignedAttestation },
    /// The attestation is surrounded by an existing attestation from the database (`prev`).
    PrevSurroundsNew { prev: SignedAttestation },
    /// The attestation votes for a target epoch before its source epoch.
    SourceExceedsTarget,
}

impl From<std::io::Error> for NotSafe {
    fn from(error: std::io::Error) -> NotSafe {
        NotSafe::IOError(error.to_string())
    }
}

impl From<rusqlite::Error> for NotSafe {
    fn from(error: rusqlite::Error) -> NotSafe {
        NotSafe::SQLError(error.to_string())
    }
}

impl From<r2d2::Error> for NotSafe {
    fn from(error: r2d2::Error) -> NotSafe {
        NotSafe::SQLPoolError(error.to_string())
    }
}

impl std::fmt::Display for NotSafe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for NotSafe {}
