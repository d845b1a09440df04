use crate::test_utils::*;
use crate::*;

fn att(db: &SlashingDatabase, source: u64, target: u64, root: u64) -> Result<Safe, NotSafe> {
    db.check_and_insert_attestation(&pubkey(0), epoch(source), epoch(target), signing_root(root))
}

#[test]
fn valid_empty_history() {
    let (db, _dir) = test_db();
    assert_eq!(att(&db, 2, 3, 1), Ok(Safe::Valid));
}

#[test]
fn valid_non_overlapping() {
    let (db, _dir) = test_db();
    att(&db, 2, 3, 1).unwrap();
    assert_eq!(att(&db, 3, 4, 2), Ok(Safe::Valid));
    assert_eq!(att(&db, 6, 7, 3), Ok(Safe::Valid));
}

#[test]
fn valid_same_data_is_idempotent() {
    let (db, _dir) = test_db();
    att(&db, 2, 3, 1).unwrap();
    assert_eq!(att(&db, 2, 3, 1), Ok(Safe::SameData));
}

#[test]
fn invalid_double_vote() {
    let (db, _dir) = test_db();
    att(&db, 2, 3, 1).unwrap();
    assert_eq!(
        att(&db, 2, 3, 2),
        Err(NotSafe::InvalidAttestation(InvalidAttestation::DoubleVote(
            SignedAttestation {
                source_epoch: epoch(2),
                target_epoch: epoch(3),
                signing_root: signing_root(1),
            }
        )))
    );
}

#[test]
fn invalid_surrounding_vote() {
    let (db, _dir) = test_db();
    // Existing (3, 7); new (2, 8) surrounds it.
    att(&db, 3, 7, 1).unwrap();
    assert_eq!(
        att(&db, 2, 8, 2),
        Err(NotSafe::InvalidAttestation(
            InvalidAttestation::NewSurroundsPrev {
                prev: SignedAttestation {
                    source_epoch: epoch(3),
                    target_epoch: epoch(7),
                    signing_root: signing_root(1),
                }
            }
        ))
    );
}

#[test]
fn invalid_surrounded_vote() {
    let (db, _dir) = test_db();
    // Existing (2, 8); new (3, 7) is surrounded by it.
    att(&db, 2, 8, 1).unwrap();
    assert_eq!(
        att(&db, 3, 7, 2),
        Err(NotSafe::InvalidAttestation(
            InvalidAttestation::PrevSurroundsNew {
                prev: SignedAttestation {
                    source_epoch: epoch(2),
                    target_epoch: epoch(8),
                    signing_root: signing_root(1),
                }
            }
        ))
    );
}

#[test]
fn invalid_source_exceeds_target() {
    let (db, _dir) = test_db();
    assert_eq!(
        att(&db, 4, 3, 1),
        Err(NotSafe::InvalidAttestation(
            InvalidAttestation::SourceExceedsTarget
        ))
    );
}

#[test]
fn touching_epochs_are_not_surrounds() {
    let (db, _dir) = test_db();
    att(&db, 2, 4, 1).unwrap();
    // Shares the source epoch boundary: neither surrounds the other.
    assert_eq!(att(&db, 2, 5, 2), Ok(Safe::Valid));
}

#[test]
fn records_survive_reopen() {
    let (db, dir) = test_db();
    att(&db, 3, 7, 1).unwrap();
    drop(db);

    let db = SlashingDatabase::open(&db_path(&dir)).unwrap();
    assert!(matches!(
        db.check_and_insert_attestation(&pubkey(0), epoch(2), epoch(8), signing_root(2)),
        Err(NotSafe::InvalidAttestation(
            InvalidAttestation::NewSurroundsPrev { .. }
        ))
    ));
}
