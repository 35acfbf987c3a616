use clap::{Parser, Subcommand, ValueEnum};
use format_bench::alloc::TrackingAllocator;
use format_bench::codecs::Registry;
use format_bench::error::{BenchError, ConfigError};
use format_bench::fixture::Fixture;
use format_bench::harness::{BenchConfig, Profile};
use format_bench::report;
use format_bench::runner::{self, Runner};
use format_bench::OutputFormat;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[global_allocator]
static GLOBAL: TrackingAllocator = TrackingAllocator;

/// Exit code when `verify` finds a codec that does not round-trip.
const EXIT_VERIFY_FAILED: u8 = 3;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ProfileArg {
    Quick,
    Full,
}

impl From<ProfileArg> for Profile {
    fn from(v: ProfileArg) -> Self {
        match v {
            ProfileArg::Quick => Profile::Quick,
            ProfileArg::Full => Profile::Full,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Benchmark encode/decode of every selected format (default).
    Run,

    /// List registered formats in benchmarking order.
    List,

    /// Round-trip the fixture through every selected format once.
    Verify,
}

#[derive(Parser, Debug)]
#[command(name = "format-bench")]
#[command(version, about = "Serialization format benchmark runner (table or JSON output)")]
struct Args {
    #[arg(long, value_enum, default_value_t = ProfileArg::Quick, global = true)]
    profile: ProfileArg,

    /// Measured iterations per (format, operation); overrides the profile.
    #[arg(long, global = true)]
    iterations: Option<u64>,

    /// Discarded warmup iterations per operation; overrides the profile.
    #[arg(long, global = true)]
    warmup_iterations: Option<u64>,

    /// Only benchmark these formats. Repeatable or comma separated.
    #[arg(long = "format", value_name = "NAME", value_delimiter = ',', global = true)]
    formats: Vec<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    output: OutputFormat,

    /// Global time limit, e.g. `30s` or `500ms`. Partial results are reported.
    #[arg(long, value_parser = humantime::parse_duration, global = true)]
    timeout: Option<Duration>,

    /// Benchmark formats concurrently (each format stays single-threaded).
    #[arg(long, default_value_t = false, global = true)]
    parallel: bool,

    /// Where to write the report. If omitted, prints to stdout.
    #[arg(long, global = true)]
    out: Option<PathBuf>,

    /// Debug-level logging (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Option<Command>,
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn bench(args: &Args, registry: &Registry) -> Result<(), BenchError> {
    let cfg = BenchConfig {
        profile: args.profile.into(),
        iterations: args.iterations,
        warmup_iterations: args.warmup_iterations,
        timeout: args.timeout,
        parallel: args.parallel,
    };
    cfg.validate()?;

    let fixture = Fixture::standard();
    let mut runner = Runner::new(registry, &fixture, &cfg);
    let outcome = runner.run();
    let completed = outcome.completed();
    let timed_out = outcome.timed_out;
    let report = runner.report(outcome);

    report::emit(&report, args.output, args.out.as_deref())?;
    if let Some(out) = &args.out {
        info!(path = %out.display(), "report written");
    }

    if timed_out {
        return Err(BenchError::Timeout {
            timeout_ms: cfg.timeout.unwrap_or_default().as_millis(),
            completed,
        });
    }
    Ok(())
}

fn verify(registry: &Registry) -> ExitCode {
    let fixture = Fixture::standard();
    let mut failed = false;
    for (name, result) in runner::verify_all(registry, &fixture) {
        match result {
            Ok(bytes) => println!("ok      {name:<10} {bytes} bytes"),
            Err(reason) => {
                failed = true;
                println!("FAILED  {name:<10} {reason}");
            }
        }
    }
    if failed {
        ExitCode::from(EXIT_VERIFY_FAILED)
    } else {
        ExitCode::SUCCESS
    }
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            // Invalid flags are configuration errors; --help/--version are not.
            return if e.use_stderr() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    init_tracing(args.verbose);

    let registry = match Registry::builtin().select(&args.formats) {
        Ok(r) if r.is_empty() => Err(BenchError::from(ConfigError::NoFormats)),
        Ok(r) => Ok(r),
        Err(e) => Err(BenchError::from(e)),
    };
    let registry = match registry {
        Ok(r) => r,
        Err(e) => {
            error!("{e}");
            return ExitCode::from(e.exit_code() as u8);
        }
    };

    let result = match args.cmd.as_ref().unwrap_or(&Command::Run) {
        Command::List => {
            for name in registry.names() {
                println!("{name}");
            }
            Ok(())
        }
        Command::Verify => return verify(&registry),
        Command::Run => bench(&args, &registry),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::from(e.exit_code() as u8)
        }
    }
}
