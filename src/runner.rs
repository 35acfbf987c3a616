//! Benchmark runner: drives every registered codec through warmup and
//! measurement, isolates per-codec failures and honours the global timeout.
//!
//! State per run:
//! `Idle -> WarmingUp(format) -> Measuring(format, op) -> Aggregating -> Reporting -> Idle`

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::alloc;
use crate::codecs::{Codec, Registry};
use crate::fixture::Fixture;
use crate::harness::{sample_iters, warmup, BenchConfig, SampleError};
use crate::schema::{FormatBenchReport, Operation, RunMeta, Sample, SCHEMA_VERSION};
use crate::stats;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunnerState {
    Idle,
    WarmingUp(String),
    Measuring(String, Operation),
    Aggregating,
    Reporting,
}

impl fmt::Display for RunnerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunnerState::Idle => write!(f, "idle"),
            RunnerState::WarmingUp(format) => write!(f, "warming_up({format})"),
            RunnerState::Measuring(format, op) => write!(f, "measuring({format}, {op})"),
            RunnerState::Aggregating => write!(f, "aggregating"),
            RunnerState::Reporting => write!(f, "reporting"),
        }
    }
}

/// Ordered record of state transitions.
#[derive(Debug, Default, Clone)]
pub struct StateLog {
    states: Vec<RunnerState>,
}

impl StateLog {
    fn enter(&mut self, next: RunnerState) {
        debug!(state = %next, "runner transition");
        self.states.push(next);
    }

    pub fn states(&self) -> &[RunnerState] {
        &self.states
    }

    pub fn current(&self) -> &RunnerState {
        self.states.last().unwrap_or(&RunnerState::Idle)
    }
}

/// Result of one operation: its samples, or the reason it failed.
pub type OpResult = Result<Vec<Sample>, String>;

#[derive(Debug, Clone)]
pub struct FormatOutcome {
    pub format: String,
    pub payload_bytes: Option<u64>,
    pub encode: OpResult,
    pub decode: OpResult,
}

/// Everything measured during a run, consumed once by [`Runner::report`].
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Completed formats only, in registration order.
    pub formats: Vec<FormatOutcome>,
    pub timed_out: bool,
    pub allocation_tracking: bool,
}

impl RunOutcome {
    pub fn completed(&self) -> usize {
        self.formats.len()
    }
}

pub struct Runner<'a> {
    registry: &'a Registry,
    fixture: &'a Fixture,
    config: &'a BenchConfig,
    log: StateLog,
}

impl<'a> Runner<'a> {
    pub fn new(registry: &'a Registry, fixture: &'a Fixture, config: &'a BenchConfig) -> Self {
        Self {
            registry,
            fixture,
            config,
            log: StateLog::default(),
        }
    }

    pub fn log(&self) -> &StateLog {
        &self.log
    }

    /// Benchmark every registered format. Never fails: codec errors become
    /// failed operations, an expired deadline truncates the outcome.
    pub fn run(&mut self) -> RunOutcome {
        self.log.enter(RunnerState::Idle);
        let deadline = self.config.timeout.map(|t| Instant::now() + t);
        let codecs: Vec<&dyn Codec> = self.registry.iter().collect();

        info!(
            formats = codecs.len(),
            iterations = self.config.iters(),
            warmup = self.config.warmup_iters(),
            parallel = self.config.parallel,
            "starting run"
        );

        let mut formats = Vec::with_capacity(codecs.len());
        let mut timed_out = false;

        if self.config.parallel {
            let (fixture, config) = (self.fixture, self.config);
            let results: Vec<(StateLog, Option<FormatOutcome>)> = codecs
                .par_iter()
                .map(|codec| {
                    let mut log = StateLog::default();
                    let outcome = bench_format(*codec, fixture, config, deadline, &mut log);
                    (log, outcome)
                })
                .collect();
            for (log, outcome) in results {
                self.log.states.extend(log.states);
                match outcome {
                    Some(o) => formats.push(o),
                    None => timed_out = true,
                }
            }
        } else {
            for codec in codecs {
                if deadline.is_some_and(|d| Instant::now() >= d) {
                    timed_out = true;
                    break;
                }
                match bench_format(codec, self.fixture, self.config, deadline, &mut self.log) {
                    Some(o) => formats.push(o),
                    None => {
                        timed_out = true;
                        break;
                    }
                }
            }
        }

        if timed_out {
            warn!(completed = formats.len(), "global timeout reached, reporting partial results");
        }

        self.log.enter(RunnerState::Aggregating);
        RunOutcome {
            formats,
            timed_out,
            allocation_tracking: alloc::is_tracking(),
        }
    }

    /// Aggregate the outcome into a report and return to `Idle`.
    pub fn report(&mut self, outcome: RunOutcome) -> FormatBenchReport {
        let entries = stats::aggregate(&outcome);
        self.log.enter(RunnerState::Reporting);

        let report = FormatBenchReport {
            run: RunMeta {
                schema_version: SCHEMA_VERSION,
                bench_version: env!("CARGO_PKG_VERSION").to_string(),
                profile: self.config.profile.as_str().to_string(),
                iterations: self.config.iters(),
                warmup_iterations: self.config.warmup_iters(),
                parallel: self.config.parallel,
                allocation_tracking: outcome.allocation_tracking,
                timed_out: outcome.timed_out,
                timestamp_utc: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
                git_sha: git_sha_short(),
            },
            entries,
        };

        self.log.enter(RunnerState::Idle);
        report
    }
}

fn git_sha_short() -> Option<String> {
    // Best-effort: read from environment set by CI/build scripts.
    std::env::var("GIT_SHA")
        .ok()
        .or_else(|| std::env::var("GITHUB_SHA").ok())
        .map(|s| s.chars().take(12).collect())
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}

/// Run `f`, turning a panic inside a codec into an error string.
fn guarded<T>(f: impl FnOnce() -> Result<T, SampleError>) -> Result<T, Guarded> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(v)) => Ok(v),
        Ok(Err(SampleError::TimedOut)) => Err(Guarded::TimedOut),
        Ok(Err(SampleError::Failed(e))) => Err(Guarded::Failed(e.to_string())),
        Err(payload) => Err(Guarded::Failed(panic_message(payload))),
    }
}

enum Guarded {
    TimedOut,
    Failed(String),
}

/// Benchmark one format. `None` means the deadline interrupted it and its
/// partial samples were discarded.
fn bench_format(
    codec: &dyn Codec,
    fixture: &Fixture,
    config: &BenchConfig,
    deadline: Option<Instant>,
    log: &mut StateLog,
) -> Option<FormatOutcome> {
    let name = codec.name().to_string();
    let iters = config.iters();
    let warmup_iters = config.warmup_iters();
    log.enter(RunnerState::WarmingUp(name.clone()));

    // Decode input is produced once, before any encode timing.
    let payload = match guarded(|| codec.encode(fixture).map_err(SampleError::from)) {
        Ok(p) => p,
        Err(Guarded::TimedOut) => return None,
        Err(Guarded::Failed(reason)) => {
            warn!(format = %name, %reason, "encode failed, skipping format");
            return Some(FormatOutcome {
                format: name,
                payload_bytes: None,
                decode: Err(format!("no payload to decode: {reason}")),
                encode: Err(reason),
            });
        }
    };

    let warm = guarded(|| {
        warmup(warmup_iters, deadline, || codec.encode(fixture))?;
        warmup(warmup_iters, deadline, || codec.decode(&payload))
    });
    if let Err(Guarded::TimedOut) = warm {
        return None;
    }

    log.enter(RunnerState::Measuring(name.clone(), Operation::Encode));
    let encode = match guarded(|| sample_iters(iters, deadline, || codec.encode(fixture))) {
        Ok(samples) => Ok(samples),
        Err(Guarded::TimedOut) => return None,
        Err(Guarded::Failed(reason)) => Err(reason),
    };

    log.enter(RunnerState::Measuring(name.clone(), Operation::Decode));
    let decode = match guarded(|| sample_iters(iters, deadline, || codec.decode(&payload))) {
        Ok(samples) => verify_round_trip(codec, &payload, fixture).map(|()| samples),
        Err(Guarded::TimedOut) => return None,
        Err(Guarded::Failed(reason)) => Err(reason),
    };

    for (op, result) in [(Operation::Encode, &encode), (Operation::Decode, &decode)] {
        if let Err(reason) = result {
            warn!(format = %name, operation = %op, %reason, "operation failed");
        }
    }
    info!(format = %name, payload_bytes = payload.len(), "format complete");

    Some(FormatOutcome {
        format: name,
        payload_bytes: Some(payload.len() as u64),
        encode,
        decode,
    })
}

fn verify_round_trip(codec: &dyn Codec, payload: &[u8], fixture: &Fixture) -> Result<(), String> {
    match guarded(|| codec.decode(payload).map_err(SampleError::from)) {
        Ok(decoded) if decoded == *fixture => Ok(()),
        Ok(decoded) => Err(format!("round-trip mismatch: decoded {decoded:?}")),
        Err(Guarded::Failed(reason)) => Err(reason),
        Err(Guarded::TimedOut) => Err("deadline reached".to_string()),
    }
}

/// Round-trip every codec once: `Ok(payload_bytes)` or the failure reason.
pub fn verify_all(registry: &Registry, fixture: &Fixture) -> Vec<(String, Result<u64, String>)> {
    registry
        .iter()
        .map(|codec| {
            let result = match guarded(|| codec.encode(fixture).map_err(SampleError::from)) {
                Ok(payload) => {
                    verify_round_trip(codec, &payload, fixture).map(|()| payload.len() as u64)
                }
                Err(Guarded::Failed(reason)) => Err(reason),
                Err(Guarded::TimedOut) => Err("deadline reached".to_string()),
            };
            (codec.name().to_string(), result)
        })
        .collect()
}
