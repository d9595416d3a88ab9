//! The enumerated configuration surface of spec §6, as a `clap::Parser`.
//! Grounded on `autopilot::arguments::Arguments`: one flat struct, every
//! field `#[clap(long, env, ...)]`, defaults matching the spec's prose
//! exactly. CLI parsing and env/file loading are themselves external
//! collaborators (spec §1); this struct is the *shape* of that surface,
//! not a reimplementation of a config-file loader.

use std::{net::SocketAddr, path::PathBuf, time::Duration};

#[derive(clap::Parser)]
pub struct Arguments {
    /// Non-empty ordered list of JSON-RPC endpoint URLs, tried in order
    /// with failover on each call.
    #[clap(long, env, use_value_delimiter = true)]
    pub rpc_endpoints: Vec<url::Url>,

    /// Per-call RPC timeout, independent of the surrounding shutdown
    /// cancellation (spec §4.A).
    #[clap(long, env, default_value = "60s", value_parser = humantime::parse_duration)]
    pub rpc_timeout: Duration,

    /// Existing writable directory for staged range bundles.
    #[clap(long, env)]
    pub data_dir: PathBuf,

    /// Blocks per range; ranges tile `[1, inf)` without gaps or overlaps.
    #[clap(long, env, default_value = "1000")]
    pub range_size: u64,

    /// How often the driver polls for new finalized blocks once caught up.
    #[clap(long, env, default_value = "10s", value_parser = humantime::parse_duration)]
    pub poll_interval: Duration,

    /// Flush the in-memory aggregate once its unique-touch count reaches
    /// this threshold, even mid-range.
    #[clap(long, env, default_value = "1000000")]
    pub commit_threshold: u64,

    /// Blocks behind the chain head treated as immutable and safe to index.
    #[clap(long, env, default_value = "64")]
    pub finalized_offset_blocks: u64,

    /// Whether staged bundles are zstd-compressed on disk.
    #[clap(long, env, default_value_t = true)]
    pub compression_enabled: bool,

    /// Canonical genesis allocation file, fed to the committer as range 0
    /// on first start. Skipped (with a warning) if unset.
    #[clap(long, env)]
    pub genesis_file: Option<PathBuf>,

    /// ClickHouse HTTP endpoint backing the committer/analytics store.
    #[clap(long, env, default_value = "http://localhost:8123")]
    pub clickhouse_url: url::Url,

    /// Bind address for the read-only analytics HTTP surface (spec §6).
    #[clap(long, env, default_value = "0.0.0.0:9590")]
    pub api_address: SocketAddr,

    /// Bind address for the Prometheus metrics / liveness endpoint.
    #[clap(long, env, default_value = "0.0.0.0:9591")]
    pub metrics_address: SocketAddr,

    /// Upper bound on graceful shutdown before the process exits anyway
    /// (spec §5).
    #[clap(long, env, default_value = "10s", value_parser = humantime::parse_duration)]
    pub shutdown_timeout: Duration,

    #[clap(long, env, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
