pub mod altair {
    pub const SYNC_COMMITTEE_SUBNET_COUNT: u64 = 8;
    pub const TARGET_AGGREGATORS_PER_SYNC_SUBCOMMITTEE: u64 = 4;
}
