use std::path::PathBuf;
use types::Graffiti;

/// Operator-supplied configuration for the duty engine.
///
/// Parsing (CLI/file) happens in the embedding node; the engine receives the
/// resolved values.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bytes embedded in the graffiti field of proposed blocks.
    pub graffiti: Graffiti,
    /// Maximum number of slots the head may lag the wall clock before duties
    /// are considered unsafe to perform.
    pub sync_horizon: u64,
    /// Listen for our own validators on the network before signing anything.
    pub doppelganger_detection: bool,
    /// Write every self-produced message as raw SSZ into `dump_dir`.
    pub dump_enabled: bool,
    pub dump_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            graffiti: Graffiti::default(),
            sync_horizon: 32,
            doppelganger_detection: false,
            dump_enabled: false,
            dump_dir: PathBuf::from("dump"),
        }
    }
}
