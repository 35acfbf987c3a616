//! Report rendering: aligned text table or pretty JSON.
//!
//! Entries arrive sorted by (format, operation). Failed entries are always
//! rendered, with an explicit `FAILED` marker in the table.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::error::BenchError;
use crate::schema::{FormatBenchReport, ReportEntry, Status};
use crate::OutputFormat;

/// Human-readable duration (auto-selects ns/µs/ms/s).
pub fn format_latency(ns: f64) -> String {
    if ns < 1_000.0 {
        format!("{ns:.0}ns")
    } else if ns < 1_000_000.0 {
        format!("{:.2}µs", ns / 1_000.0)
    } else if ns < 1_000_000_000.0 {
        format!("{:.2}ms", ns / 1_000_000.0)
    } else {
        format!("{:.2}s", ns / 1_000_000_000.0)
    }
}

fn opt<T>(v: Option<T>, f: impl FnOnce(T) -> String) -> String {
    v.map(f).unwrap_or_else(|| "-".to_string())
}

fn table_row(e: &ReportEntry) -> [String; 9] {
    let status = match &e.status {
        Status::Ok => "ok".to_string(),
        Status::Failed { .. } => "FAILED".to_string(),
    };
    [
        e.format.clone(),
        e.operation.to_string(),
        status,
        opt(e.mean_ns, format_latency),
        opt(e.stddev_ns, format_latency),
        opt(e.min_ns, |v| format_latency(v as f64)),
        opt(e.max_ns, |v| format_latency(v as f64)),
        opt(e.mean_bytes_allocated, |v| format!("{v:.0}B")),
        opt(e.payload_bytes, |v| format!("{v}B")),
    ]
}

const HEADERS: [&str; 9] = [
    "format", "operation", "status", "mean", "stddev", "min", "max", "alloc/op", "size",
];

pub fn render_table(report: &FormatBenchReport) -> String {
    let rows: Vec<[String; 9]> = report.entries.iter().map(table_row).collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let line = |out: &mut String, cells: &[&str]| {
        let mut first = true;
        for (cell, w) in cells.iter().zip(widths) {
            if !first {
                out.push_str("  ");
            }
            first = false;
            let _ = write!(out, "{cell:<w$}");
        }
        let trimmed = out.trim_end().len();
        out.truncate(trimmed);
        out.push('\n');
    };

    line(&mut out, &HEADERS);
    for row in &rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        line(&mut out, &cells);
    }

    let failures: Vec<&ReportEntry> = report
        .entries
        .iter()
        .filter(|e| e.status.is_failed())
        .collect();
    if !failures.is_empty() {
        out.push('\n');
        for e in failures {
            if let Status::Failed { reason } = &e.status {
                let _ = writeln!(out, "FAILED {} {}: {}", e.format, e.operation, reason);
            }
        }
    }

    let run = &report.run;
    let _ = writeln!(
        out,
        "\nprofile={} iterations={} warmup={} parallel={} allocation_tracking={}{}",
        run.profile,
        run.iterations,
        run.warmup_iterations,
        run.parallel,
        run.allocation_tracking,
        if run.timed_out { " TIMED OUT (partial report)" } else { "" },
    );
    out
}

pub fn render_json(report: &FormatBenchReport) -> Result<String, BenchError> {
    Ok(serde_json::to_string_pretty(report)?)
}

pub fn render(report: &FormatBenchReport, format: OutputFormat) -> Result<String, BenchError> {
    match format {
        OutputFormat::Table => Ok(render_table(report)),
        OutputFormat::Json => render_json(report),
    }
}

/// Write the rendered report to `out`, or stdout when `None`.
pub fn emit(report: &FormatBenchReport, format: OutputFormat, out: Option<&Path>) -> Result<(), BenchError> {
    let text = render(report, format)?;
    if let Some(path) = out {
        fs::write(path, text)?;
    } else {
        print!("{text}");
        if !text.ends_with('\n') {
            println!();
        }
    }
    Ok(())
}
