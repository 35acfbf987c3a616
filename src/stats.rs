//! Aggregation of raw samples into report entries.

use crate::runner::{OpResult, RunOutcome};
use crate::schema::{Operation, ReportEntry, Sample, Status};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub count: u64,
    pub min_ns: u64,
    pub max_ns: u64,
    pub mean_ns: f64,
    /// Population standard deviation.
    pub stddev_ns: f64,
    pub mean_bytes_allocated: f64,
    pub mean_allocations: f64,
}

impl Summary {
    /// Order-independent summary of `samples`; `None` when empty.
    pub fn from_samples(samples: &[Sample]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }

        let n = samples.len() as f64;
        let mut min_ns = u64::MAX;
        let mut max_ns = 0;
        let mut sum_ns = 0.0;
        let mut sum_bytes = 0.0;
        let mut sum_allocs = 0.0;
        for s in samples {
            min_ns = min_ns.min(s.elapsed_ns);
            max_ns = max_ns.max(s.elapsed_ns);
            sum_ns += s.elapsed_ns as f64;
            sum_bytes += s.bytes_allocated as f64;
            sum_allocs += s.allocations as f64;
        }
        let mean_ns = sum_ns / n;
        let variance = samples
            .iter()
            .map(|s| {
                let d = s.elapsed_ns as f64 - mean_ns;
                d * d
            })
            .sum::<f64>()
            / n;

        Some(Self {
            count: samples.len() as u64,
            min_ns,
            max_ns,
            mean_ns,
            stddev_ns: variance.sqrt(),
            mean_bytes_allocated: sum_bytes / n,
            mean_allocations: sum_allocs / n,
        })
    }
}

fn failed(format: &str, operation: Operation, reason: &str) -> ReportEntry {
    ReportEntry {
        format: format.to_string(),
        operation,
        status: Status::Failed {
            reason: reason.to_string(),
        },
        samples: 0,
        min_ns: None,
        mean_ns: None,
        max_ns: None,
        stddev_ns: None,
        mean_bytes_allocated: None,
        mean_allocations: None,
        payload_bytes: None,
        throughput_bytes_per_s: None,
    }
}

/// Build the entry for one (format, operation) pair.
pub fn entry(
    format: &str,
    operation: Operation,
    result: &OpResult,
    payload_bytes: Option<u64>,
    allocation_tracking: bool,
) -> ReportEntry {
    let samples = match result {
        Ok(samples) => samples,
        Err(reason) => return failed(format, operation, reason),
    };
    let Some(summary) = Summary::from_samples(samples) else {
        return failed(format, operation, "no samples collected");
    };

    let throughput_bytes_per_s = payload_bytes.and_then(|bytes| {
        if summary.mean_ns <= 0.0 {
            None
        } else {
            Some(bytes as f64 / (summary.mean_ns / 1e9))
        }
    });

    ReportEntry {
        format: format.to_string(),
        operation,
        status: Status::Ok,
        samples: summary.count,
        min_ns: Some(summary.min_ns),
        mean_ns: Some(summary.mean_ns),
        max_ns: Some(summary.max_ns),
        stddev_ns: Some(summary.stddev_ns),
        mean_bytes_allocated: allocation_tracking.then_some(summary.mean_bytes_allocated),
        mean_allocations: allocation_tracking.then_some(summary.mean_allocations),
        payload_bytes,
        throughput_bytes_per_s,
    }
}

/// All entries of a run, sorted by format name then operation.
pub fn aggregate(outcome: &RunOutcome) -> Vec<ReportEntry> {
    let mut entries: Vec<ReportEntry> = outcome
        .formats
        .iter()
        .flat_map(|f| {
            [
                entry(&f.format, Operation::Encode, &f.encode, f.payload_bytes, outcome.allocation_tracking),
                entry(&f.format, Operation::Decode, &f.decode, f.payload_bytes, outcome.allocation_tracking),
            ]
        })
        .collect();
    entries.sort_by(|a, b| {
        a.format
            .cmp(&b.format)
            .then_with(|| a.operation.cmp(&b.operation))
    });
    entries
}
