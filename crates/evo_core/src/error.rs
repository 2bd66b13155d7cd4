//! Error types at the core boundary (spec §7). Only malformed input at the
//! `Config::from_json` parse boundary is a hard error — everything else the
//! spec calls an "error kind" (`UnknownEntity`, `CapacityExceeded`) is a
//! silent no-op by construction, not a `Result::Err` anywhere in this crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("malformed configuration document: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Used by `tick::check_invariants`'s `debug_assert!`-guarded spatial-index
/// consistency check; never returned across the simulation façade boundary,
/// and compiled out of release builds along with the check that constructs
/// it.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}
