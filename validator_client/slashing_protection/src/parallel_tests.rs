//! Tests that stress the database's transaction safety with concurrent writers.

use crate::test_utils::*;
use crate::*;
use rayon::prelude::*;

#[test]
fn block_same_slot() {
    let (db, _dir) = test_db();

    // A stream of blocks all with the same slot: exactly one may be admitted.
    let num_blocks = 10u64;
    let results = (0..num_blocks)
        .into_par_iter()
        .map(|i| db.check_and_insert_block_proposal(&pubkey(0), slot(1), signing_root(i)))
        .collect::<Vec<_>>();

    let num_successes = results.iter().filter(|res| res.is_ok()).count();
    assert_eq!(num_successes, 1);
}

#[test]
fn attestation_same_target() {
    let (db, _dir) = test_db();

    // A stream of attestations all with the same target.
    let num_attestations = 10u64;
    let results = (0..num_attestations)
        .into_par_iter()
        .map(|i| {
            db.check_and_insert_attestation(
                &pubkey(0),
                epoch(i),
                epoch(num_attestations),
                signing_root(i),
            )
        })
        .collect::<Vec<_>>();

    let num_successes = results.iter().filter(|res| res.is_ok()).count();
    assert_eq!(num_successes, 1);
}

#[test]
fn attestation_surround_fest() {
    let (db, _dir) = test_db();

    // A stream of attestations that all surround each other.
    let num_attestations = 10u64;
    let results = (0..num_attestations)
        .into_par_iter()
        .map(|i| {
            db.check_and_insert_attestation(
                &pubkey(0),
                epoch(i),
                epoch(2 * num_attestations - i),
                signing_root(i),
            )
        })
        .collect::<Vec<_>>();

    let num_successes = results.iter().filter(|res| res.is_ok()).count();
    assert_eq!(num_successes, 1);
}
