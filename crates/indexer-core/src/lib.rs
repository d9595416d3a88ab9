//! Components G and H: the pipeline driver state machine and the
//! read-only sync probe that reports against it (spec §4.G, §4.H).

pub mod config;
pub mod driver;
pub mod probe;
pub mod state;

pub use {config::DriverConfig, driver::PipelineDriver, probe::SyncProbe, state::DriverState};
