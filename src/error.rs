//! Error types for the benchmark runner.
//!
//! Codec failures are local: the runner records them as failed report rows.
//! Everything here is either a configuration problem, surfaced before any
//! measurement, or a run-level failure that maps to a process exit code.

use thiserror::Error;

/// Invalid runner configuration. The run aborts before measuring anything.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown format: {name} (known: {known})")]
    UnknownFormat { name: String, known: String },

    #[error("duplicate format registration: {name}")]
    DuplicateFormat { name: String },

    #[error("iterations must be at least 1")]
    ZeroIterations,

    #[error("{requested} iterations exceeds the limit of {max}")]
    TooManyIterations { requested: u64, max: u64 },

    #[error("no formats selected")]
    NoFormats,
}

/// Top-level error for a benchmark invocation.
#[derive(Debug, Error)]
pub enum BenchError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("global timeout of {timeout_ms} ms exceeded ({completed} format(s) completed)")]
    Timeout { timeout_ms: u128, completed: usize },

    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize report: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BenchError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            BenchError::Config(_) => 1,
            BenchError::Timeout { .. } => 2,
            BenchError::Io(_) | BenchError::Serialization(_) => 4,
        }
    }
}
