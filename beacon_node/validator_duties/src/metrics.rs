use std::sync::LazyLock;

pub use metrics::*;

pub static BEACON_BLOCKS_PROPOSED: LazyLock<Result<IntCounter>> = LazyLock::new(|| {
    try_create_int_counter(
        "beacon_blocks_proposed",
        "Total signed beacon blocks broadcast by the duty engine",
    )
});
pub static ATTESTATIONS_PUBLISHED: LazyLock<Result<IntCounter>> = LazyLock::new(|| {
    try_create_int_counter(
        "attestations_published",
        "Total attestations signed and broadcast",
    )
});
pub static AGGREGATES_PUBLISHED: LazyLock<Result<IntCounter>> = LazyLock::new(|| {
    try_create_int_counter(
        "aggregates_published",
        "Total signed aggregate-and-proofs broadcast",
    )
});
pub static SYNC_MESSAGES_PUBLISHED: LazyLock<Result<IntCounter>> = LazyLock::new(|| {
    try_create_int_counter(
        "sync_committee_messages_published",
        "Total sync committee messages signed and broadcast",
    )
});
pub static SYNC_CONTRIBUTIONS_PUBLISHED: LazyLock<Result<IntCounter>> = LazyLock::new(|| {
    try_create_int_counter(
        "sync_contributions_published",
        "Total signed contribution-and-proofs broadcast",
    )
});
pub static SIGNER_FAILURES: LazyLock<Result<IntCounterVec>> = LazyLock::new(|| {
    try_create_int_counter_vec(
        "duty_signer_failures",
        "Signing requests that failed, by duty kind",
        &["duty"],
    )
});
/// Observations may be negative when the duty was sent ahead of its deadline.
pub static DUTY_SEND_DELAY_SECONDS: LazyLock<Result<HistogramVec>> = LazyLock::new(|| {
    try_create_histogram_vec(
        "duty_send_delay_seconds",
        "Delay between a duty's deadline and its broadcast, by duty kind",
        &["duty"],
    )
});
pub static VALIDATOR_BALANCE_GWEI: LazyLock<Result<IntGaugeVec>> = LazyLock::new(|| {
    try_create_int_gauge_vec(
        "validator_balance_gwei",
        "Balance of tracked validators, by validator index",
        &["validator"],
    )
});
pub static ENGINE_NOT_SYNCED: LazyLock<Result<IntCounter>> = LazyLock::new(|| {
    try_create_int_counter(
        "duty_engine_not_synced",
        "Slot ticks skipped because the head was too far behind",
    )
});

pub const ATTESTATION: &str = "attestation";
pub const AGGREGATE: &str = "aggregate";
pub const BLOCK: &str = "block";
pub const SYNC_MESSAGE: &str = "sync_message";
pub const SYNC_CONTRIBUTION: &str = "sync_contribution";
pub const RANDAO: &str = "randao";
pub const SELECTION_PROOF: &str = "selection_proof";
pub const SYNC_SELECTION_PROOF: &str = "sync_selection_proof";
