use serde::{Deserialize, Serialize};

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Encode,
    Decode,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Encode => "encode",
            Operation::Decode => "decode",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One measured call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    pub elapsed_ns: u64,
    pub bytes_allocated: u64,
    pub allocations: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Status {
    Ok,
    Failed { reason: String },
}

impl Status {
    pub fn is_failed(&self) -> bool {
        matches!(self, Status::Failed { .. })
    }
}

/// Aggregated statistics for one (format, operation) pair.
///
/// Timing and allocation fields are `None` for failed entries, and the
/// allocation fields are also `None` when allocation tracking is unavailable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub format: String,
    pub operation: Operation,
    #[serde(flatten)]
    pub status: Status,
    pub samples: u64,
    pub min_ns: Option<u64>,
    pub mean_ns: Option<f64>,
    pub max_ns: Option<u64>,
    pub stddev_ns: Option<f64>,
    pub mean_bytes_allocated: Option<f64>,
    pub mean_allocations: Option<f64>,
    /// Encoded size of the fixture in this format.
    pub payload_bytes: Option<u64>,
    pub throughput_bytes_per_s: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMeta {
    pub schema_version: u32,
    pub bench_version: String,
    pub profile: String,
    pub iterations: u64,
    pub warmup_iterations: u64,
    pub parallel: bool,
    pub allocation_tracking: bool,
    pub timed_out: bool,
    pub timestamp_utc: String,
    pub git_sha: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatBenchReport {
    pub run: RunMeta,
    pub entries: Vec<ReportEntry>,
}
