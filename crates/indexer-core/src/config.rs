//! Driver tuning knobs. Mirrors the subset of spec §6's configuration
//! surface that component G itself consumes; the rest (`rpc_endpoints`,
//! `data_dir`, `log_level`) is wired by the `indexer` binary into the
//! crates that actually use them.

use std::time::Duration;

#[derive(Clone, Copy, Debug)]
pub struct DriverConfig {
    pub range_size: u64,
    pub poll_interval: Duration,
    pub commit_threshold: u64,
    pub finalized_offset_blocks: u64,
    /// Emit progress every N ranges (spec §4.G "Progress reporting").
    pub progress_every_ranges: u64,
    /// ...or every T seconds, whichever comes first.
    pub progress_every: Duration,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            range_size: 1000,
            poll_interval: Duration::from_secs(10),
            commit_threshold: 1_000_000,
            finalized_offset_blocks: 64,
            progress_every_ranges: 5,
            progress_every: Duration::from_secs(30),
        }
    }
}
