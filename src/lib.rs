use clap::ValueEnum;

pub mod alloc;
pub mod codecs;
pub mod error;
pub mod fixture;
pub mod harness;
pub mod report;
pub mod runner;
pub mod schema;
pub mod stats;

/// Report rendering.
#[derive(Clone, Copy, Debug, Default, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// Aligned text table.
    #[default]
    Table,
    /// Pretty-printed JSON document.
    Json,
}
