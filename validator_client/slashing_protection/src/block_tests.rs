use crate::test_utils::*;
use crate::*;

#[test]
fn valid_empty_history() {
    let (db, _dir) = test_db();
    assert_eq!(
        db.check_and_insert_block_proposal(&pubkey(0), slot(1), signing_root(1)),
        Ok(Safe::Valid)
    );
}

#[test]
fn valid_same_data_is_idempotent() {
    let (db, _dir) = test_db();
    db.check_and_insert_block_proposal(&pubkey(0), slot(1), signing_root(1))
        .unwrap();
    // Replaying the exact same proposal (e.g. after a crash-restart) is allowed.
    assert_eq!(
        db.check_and_insert_block_proposal(&pubkey(0), slot(1), signing_root(1)),
        Ok(Safe::SameData)
    );
}

#[test]
fn invalid_double_proposal() {
    let (db, _dir) = test_db();
    db.check_and_insert_block_proposal(&pubkey(0), slot(1), signing_root(1))
        .unwrap();
    assert_eq!(
        db.check_and_insert_block_proposal(&pubkey(0), slot(1), signing_root(2)),
        Err(NotSafe::InvalidBlock(InvalidBlock::DoubleBlockProposal(
            SignedBlock {
                slot: slot(1),
                signing_root: signing_root(1),
            }
        )))
    );
}

#[test]
fn unregistered_validator_is_refused() {
    let (db, _dir) = test_db();
    assert_eq!(
        db.check_and_insert_block_proposal(&pubkey(99), slot(1), signing_root(1)),
        Err(NotSafe::UnregisteredValidator(pubkey(99)))
    );
}

#[test]
fn distinct_validators_do_not_interfere() {
    let (db, _dir) = test_db();
    db.register_validator(&pubkey(1)).unwrap();

    db.check_and_insert_block_proposal(&pubkey(0), slot(1), signing_root(1))
        .unwrap();
    assert_eq!(
        db.check_and_insert_block_proposal(&pubkey(1), slot(1), signing_root(2)),
        Ok(Safe::Valid)
    );
}

#[test]
fn records_survive_reopen() {
    let (db, dir) = test_db();
    db.check_and_insert_block_proposal(&pubkey(0), slot(1), signing_root(1))
        .unwrap();
    drop(db);

    let db = SlashingDatabase::open(&db_path(&dir)).unwrap();
    assert_eq!(
        db.check_and_insert_block_proposal(&pubkey(0), slot(1), signing_root(2)),
        Err(NotSafe::InvalidBlock(InvalidBlock::DoubleBlockProposal(
            SignedBlock {
                slot: slot(1),
                signing_root: signing_root(1),
            }
        )))
    );
    assert_eq!(
        db.check_and_insert_block_proposal(&pubkey(0), slot(1), signing_root(1)),
        Ok(Safe::SameData)
    );
}
