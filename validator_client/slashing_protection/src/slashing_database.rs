use crate::{
    InvalidAttestation, InvalidBlock, NotSafe, Safe, SignedAttestation, SignedBlock,
};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension, Transaction, TransactionBehavior};
use std::fs::OpenOptions;
use std::path::Path;
use std::time::Duration;
use types::{Epoch, Hash256, PublicKeyBytes, Slot};

/// We set the pool size to 1 for compatibility with locking_mode=EXCLUSIVE.
///
/// This is perhaps overkill in the presence of exclusive transactions, but has
/// the added bonus of preventing other processes from trying to use our slashing database.
pub const POOL_SIZE: u32 = 1;
#[cfg(not(test))]
pub const CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);
#[cfg(test)]
pub const CONNECTION_TIMEOUT: Duration = Duration::from_secs(60);

pub const SLASHING_PROTECTION_FILENAME: &str = "slashing_protection.sqlite";

/// Durable store of signed blocks and attestations, consulted before every
/// signature is released.
#[derive(Debug, Clone)]
pub struct SlashingDatabase {
    conn_pool: r2d2::Pool<SqliteConnectionManager>,
}

impl SlashingDatabase {
    /// Open an existing database at the given `path`, or create one if none exists.
    pub fn open_or_create(path: &Path) -> Result<Self, NotSafe> {
        if path.exists() {
            Self::open(path)
        } else {
            Self::create(path)
        }
    }

    /// Create a slashing database at the given path.
    ///
    /// Error if a database (or any file) already exists at `path`.
    pub fn create(path: &Path) -> Result<Self, NotSafe> {
        let _file = OpenOptions::new()
            .write(true)
            .read(true)
            .create_new(true)
            .open(path)?;

        restrict_file_permissions(path)?;

        let db = Self::open(path)?;

        let conn = db.conn_pool.get()?;

        conn.execute(
            "CREATE TABLE validators (
                id INTEGER PRIMARY KEY,
                public_key TEXT UNIQUE NOT NULL
            )",
            params![],
        )?;

        conn.execute(
            "CREATE TABLE signed_blocks (
                validator_id INTEGER NOT NULL,
                slot INTEGER NOT NULL,
                signing_root BLOB NOT NULL,
                FOREIGN KEY(validator_id) REFERENCES validators(id)
                UNIQUE (validator_id, slot)
            )",
            params![],
        )?;

        conn.execute(
            "CREATE TABLE signed_attestations (
                validator_id INTEGER,
                source_epoch INTEGER NOT NULL,
                target_epoch INTEGER NOT NULL,
                signing_root BLOB NOT NULL,
                FOREIGN KEY(validator_id) REFERENCES validators(id)
                UNIQUE (validator_id, target_epoch)
            )",
            params![],
        )?;

        Ok(db)
    }

    /// Open an existing `SlashingDatabase` from disk.
    pub fn open(path: &Path) -> Result<Self, NotSafe> {
        let manager = SqliteConnectionManager::file(path)
            .with_init(Self::apply_pragmas);
        let conn_pool = r2d2::Pool::builder()
            .max_size(POOL_SIZE)
            .connection_timeout(CONNECTION_TIMEOUT)
            .build(manager)
            .map_err(|e| NotSafe::SQLError(format!("Unable to open database: {:?}", e)))?;
        Ok(Self { conn_pool })
    }

    /// Apply the connection pragmas that give the store its durability: every
    /// commit must reach the platter before the corresponding signature is
    /// released, so write-behind journal modes are off the table.
    fn apply_pragmas(conn: &mut rusqlite::Connection) -> Result<(), rusqlite::Error> {
        conn.pragma_update(None, "foreign_keys", true)?;
        conn.pragma_update(None, "synchronous", "FULL")?;
        Ok(())
    }

    /// Register a validator with the slashing protection database.
    ///
    /// This allows the validator to record their signatures in the database, and check
    /// for slashings.
    pub fn register_validator(&self, validator_pk: &PublicKeyBytes) -> Result<(), NotSafe> {
        self.register_validators(std::iter::once(validator_pk))
    }

    /// Register multiple validators in a single transaction.
    pub fn register_validators<'a>(
        &self,
        public_keys: impl Iterator<Item = &'a PublicKeyBytes>,
    ) -> Result<(), NotSafe> {
        let mut conn = self.conn_pool.get()?;
        let txn = conn.transaction()?;
        {
            let mut stmt =
                txn.prepare("INSERT OR IGNORE INTO validators (public_key) VALUES (?1)")?;

            for pubkey in public_keys {
                stmt.execute([pubkey.as_hex_string()])?;
            }
        }
        txn.commit()?;

        Ok(())
    }

    /// Get the database-internal id for a validator.
    ///
    /// This helper should be used in a transaction, so that the calling function can
    /// atomically query the validator id and then leverage it.
    fn get_validator_id(txn: &Transaction, public_key: &PublicKeyBytes) -> Result<i64, NotSafe> {
        txn.query_row(
            "SELECT id FROM validators WHERE public_key = ?1",
            [public_key.as_hex_string()],
            |row| row.get(0),
        )
        .optional()?
        .ok_or(NotSafe::UnregisteredValidator(*public_key))
    }

    /// Check a block proposal and insert it into the store if it is safe.
    ///
    /// The insert and the check are atomic: two racing calls for the same
    /// (validator, slot) admit at most one distinct signing root.
    pub fn check_and_insert_block_proposal(
        &self,
        validator_pubkey: &PublicKeyBytes,
        slot: Slot,
        signing_root: Hash256,
    ) -> Result<Safe, NotSafe> {
        let mut conn = self.conn_pool.get()?;
        let txn = conn.transaction_with_behavior(TransactionBehavior::Exclusive)?;
        let safe = Self::check_and_insert_block_proposal_txn(
            &txn,
            validator_pubkey,
            slot,
            signing_root,
        )?;
        txn.commit()?;
        Ok(safe)
    }

    fn check_and_insert_block_proposal_txn(
        txn: &Transaction,
        validator_pubkey: &PublicKeyBytes,
        slot: Slot,
        signing_root: Hash256,
    ) -> Result<Safe, NotSafe> {
        let validator_id = Self::get_validator_id(txn, validator_pubkey)?;

        let existing_root = txn
            .query_row(
                "SELECT signing_root FROM signed_blocks
                 WHERE validator_id = ?1 AND slot = ?2",
                params![validator_id, slot.as_u64() as i64],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()?;

        if let Some(existing_root) = existing_root {
            let existing_root = hash256_from_blob(&existing_root)?;

            return if existing_root == signing_root {
                // Identical block re-registration: allowed, to support replay after restart.
                Ok(Safe::SameData)
            } else {
                Err(NotSafe::InvalidBlock(InvalidBlock::DoubleBlockProposal(
                    SignedBlock {
                        slot,
                        signing_root: existing_root,
                    },
                )))
            };
        }

        txn.execute(
            "INSERT INTO signed_blocks (validator_id, slot, signing_root)
             VALUES (?1, ?2, ?3)",
            params![
                validator_id,
                slot.as_u64() as i64,
                signing_root.as_slice()
            ],
        )?;

        Ok(Safe::Valid)
    }

    /// Check an attestation and insert it into the store if it is safe.
    pub fn check_and_insert_attestation(
        &self,
        validator_pubkey: &PublicKeyBytes,
        source_epoch: Epoch,
        target_epoch: Epoch,
        signing_root: Hash256,
    ) -> Result<Safe, NotSafe> {
        let mut conn = self.conn_pool.get()?;
        let txn = conn.transaction_with_behavior(TransactionBehavior::Exclusive)?;
        let safe = Self::check_and_insert_attestation_txn(
            &txn,
            validator_pubkey,
            source_epoch,
            target_epoch,
            signing_root,
        )?;
        txn.commit()?;
        Ok(safe)
    }

    fn check_and_insert_attestation_txn(
        txn: &Transaction,
        validator_pubkey: &PublicKeyBytes,
        source_epoch: Epoch,
        target_epoch: Epoch,
        signing_root: Hash256,
    ) -> Result<Safe, NotSafe> {
        if source_epoch > target_epoch {
            return Err(NotSafe::InvalidAttestation(
                InvalidAttestation::SourceExceedsTarget,
            ));
        }

        let validator_id = Self::get_validator_id(txn, validator_pubkey)?;

        // 1. Check for a double vote: an existing attestation with the same target epoch.
        let same_target = txn
            .query_row(
                "SELECT source_epoch, target_epoch, signing_root FROM signed_attestations
                 WHERE validator_id = ?1 AND target_epoch = ?2",
                params![validator_id, target_epoch.as_u64() as i64],
                signed_attestation_from_row,
            )
            .optional()?;

        if let Some(existing) = same_target {
            return if existing.signing_root == signing_root {
                Ok(Safe::SameData)
            } else {
                Err(NotSafe::InvalidAttestation(InvalidAttestation::DoubleVote(
                    existing,
                )))
            };
        }

        // 2. Check that no previous vote is surrounded by the new vote.
        let surrounded_by_new = txn
            .query_row(
                "SELECT source_epoch, target_epoch, signing_root FROM signed_attestations
                 WHERE validator_id = ?1 AND source_epoch > ?2 AND target_epoch < ?3
                 ORDER BY target_epoch DESC
                 LIMIT 1",
                params![
                    validator_id,
                    source_epoch.as_u64() as i64,
                    target_epoch.as_u64() as i64
                ],
                signed_attestation_from_row,
            )
            .optional()?;

        if let Some(prev) = surrounded_by_new {
            return Err(NotSafe::InvalidAttestation(
                InvalidAttestation::NewSurroundsPrev { prev },
            ));
        }

        // 3. Check that the new vote is not surrounded by a previous vote.
        let surrounding_new = txn
            .query_row(
                "SELECT source_epoch, target_epoch, signing_root FROM signed_attestations
                 WHERE validator_id = ?1 AND source_epoch < ?2 AND target_epoch > ?3
                 ORDER BY target_epoch DESC
                 LIMIT 1",
                params![
                    validator_id,
                    source_epoch.as_u64() as i64,
                    target_epoch.as_u64() as i64
                ],
                signed_attestation_from_row,
            )
            .optional()?;

        if let Some(prev) = surrounding_new {
            return Err(NotSafe::InvalidAttestation(
                InvalidAttestation::PrevSurroundsNew { prev },
            ));
        }

        // Everything has been checked, let's insert the new attestation.
        txn.execute(
            "INSERT INTO signed_attestations (validator_id, source_epoch, target_epoch, signing_root)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                validator_id,
                source_epoch.as_u64() as i64,
                target_epoch.as_u64() as i64,
                signing_root.as_slice()
            ],
        )?;

        Ok(Safe::Valid)
    }
}

fn signed_attestation_from_row(row: &rusqlite::Row) -> Result<SignedAttestation, rusqlite::Error> {
    let source_epoch: i64 = row.get(0)?;
    let target_epoch: i64 = row.get(1)?;
    let signing_root_blob: Vec<u8> = row.get(2)?;
    Ok(SignedAttestation {
        source_epoch: Epoch::new(source_epoch as u64),
        target_epoch: Epoch::new(target_epoch as u64),
        // A malformed root in the DB is unrecoverable; surface it as an SQL type error.
        signing_root: Hash256::try_from(signing_root_blob.as_slice()).map_err(|_| {
            rusqlite::Error::FromSqlConversionFailure(
                2,
                rusqlite::types::Type::Blob,
                "invalid signing root length".into(),
            )
        })?,
    })
}

fn hash256_from_blob(blob: &[u8]) -> Result<Hash256, NotSafe> {
    Hash256::try_from(blob)
        .map_err(|_| NotSafe::SQLError("invalid signing root length in database".into()))
}

/// Restrict the file to owner read/write only, as it guards signing safety.
#[cfg(unix)]
fn restrict_file_permissions(path: &Path) -> Result<(), NotSafe> {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(NotSafe::from)
}

#[cfg(not(unix))]
fn restrict_file_permissions(_path: &Path) -> Result<(), NotSafe> {
    Ok(())
}
