//! The pipeline driver's state machine (spec §4.G, end of section):
//!
//! ```text
//! Bootstrapping -> (genesis committed) -> CatchingUp
//! CatchingUp -> (R_last == R_target) -> AtHead -> (new finalized blocks) -> CatchingUp
//! any state + shutdown signal -> Draining -> Exited
//! ```
//!
//! Kept as an explicit type (rather than inferred from call sites) so the
//! sync probe and tests can assert on it directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverState {
    Bootstrapping,
    CatchingUp,
    AtHead,
    Draining,
    Exited,
}
