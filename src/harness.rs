use std::hint::black_box;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::alloc::{current_allocation, reset_allocation_counter};
use crate::codecs::CodecError;
use crate::error::ConfigError;
use crate::schema::Sample;

/// Upper bound on measured iterations per operation.
pub const MAX_ITERATIONS: u64 = 10_000_000;

/// Samples reserved up front; larger runs grow the buffer as they go.
const PREALLOC_SAMPLES: u64 = 4_096;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Profile {
    #[default]
    Quick,
    Full,
}

impl Profile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Quick => "quick",
            Profile::Full => "full",
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct BenchConfig {
    pub profile: Profile,
    /// Overrides the profile's measured iteration count.
    pub iterations: Option<u64>,
    /// Overrides the profile's warmup iteration count.
    pub warmup_iterations: Option<u64>,
    pub timeout: Option<Duration>,
    /// Run formats concurrently (each format stays single-threaded).
    pub parallel: bool,
}

impl BenchConfig {
    pub fn warmup_iters(&self) -> u64 {
        self.warmup_iterations.unwrap_or(match self.profile {
            Profile::Quick => 32,
            Profile::Full => 200,
        })
    }

    pub fn iters(&self) -> u64 {
        self.iterations.unwrap_or(match self.profile {
            Profile::Quick => 300,
            Profile::Full => 3_000,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.iters() {
            0 => Err(ConfigError::ZeroIterations),
            n if n > MAX_ITERATIONS => Err(ConfigError::TooManyIterations {
                requested: n,
                max: MAX_ITERATIONS,
            }),
            _ => Ok(()),
        }
    }
}

/// Why a sampling loop stopped before collecting every iteration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SampleError {
    #[error(transparent)]
    Failed(#[from] CodecError),

    #[error("deadline reached")]
    TimedOut,
}

/// Run `f` `warmup_iters` times, discarding results. Errors are ignored here;
/// the measured phase reports them.
pub fn warmup<T, E>(
    warmup_iters: u64,
    deadline: Option<Instant>,
    mut f: impl FnMut() -> Result<T, E>,
) -> Result<(), SampleError> {
    for _ in 0..warmup_iters {
        if past(deadline) {
            return Err(SampleError::TimedOut);
        }
        let _ = black_box(f());
    }
    Ok(())
}

/// Collect exactly `iters` samples of `f`, or stop at the first failure or
/// once `deadline` passes.
pub fn sample_iters<T>(
    iters: u64,
    deadline: Option<Instant>,
    mut f: impl FnMut() -> Result<T, CodecError>,
) -> Result<Vec<Sample>, SampleError> {
    let mut samples = Vec::with_capacity(iters.min(PREALLOC_SAMPLES) as usize);
    for _ in 0..iters {
        if past(deadline) {
            return Err(SampleError::TimedOut);
        }

        reset_allocation_counter();
        let start = Instant::now();
        let out = f();
        let elapsed = start.elapsed();
        let (bytes_allocated, allocations) = current_allocation();

        black_box(out?);
        samples.push(Sample {
            elapsed_ns: elapsed.as_nanos() as u64,
            bytes_allocated,
            allocations,
        });
    }
    Ok(samples)
}

fn past(deadline: Option<Instant>) -> bool {
    deadline.is_some_and(|d| Instant::now() >= d)
}
