use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::expand::DEFAULT_SAMPLE_LIMIT;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Unroll record schemas against sampled data and view records as tables",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List the concrete, union-free variants observed in a record sample
    Variants(VariantsArgs),
    /// Classify sampled records and render them as span-headed tables
    View(ViewArgs),
}

#[derive(Debug, Args)]
pub struct InputArgs {
    /// Avro-style schema document (.json/.avsc, or .yaml/.yml); '-' reads stdin
    #[arg(short, long)]
    pub schema: PathBuf,
    /// Records as JSON Lines or concatenated JSON documents; '-' reads stdin
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Number of records examined by each scan
    #[arg(long, default_value_t = DEFAULT_SAMPLE_LIMIT)]
    pub sample_rows: usize,
    /// Character encoding of the input files (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct VariantsArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Only resolve a union at the schema root; nested unions stay as declared
    #[arg(long = "top-level-only")]
    pub top_level_only: bool,
    /// Order variants by how many sampled records produced them
    #[arg(long = "by-frequency")]
    pub by_frequency: bool,
}

#[derive(Debug, Args)]
pub struct ViewArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Which table collection to show
    #[arg(long, default_value = "all")]
    pub mode: ViewMode,
    /// Output format
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
#[value(rename_all = "kebab-case")]
pub enum ViewMode {
    Raw,
    DataOrder,
    SchemaOrder,
    All,
}

impl ViewMode {
    /// Whether the named projection collection is shown in this mode.
    pub fn includes(self, collection: &str) -> bool {
        match self {
            ViewMode::Raw => collection == "raw",
            ViewMode::DataOrder => collection == "dataorder",
            ViewMode::SchemaOrder => collection == "schemaorder",
            ViewMode::All => true,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
#[value(rename_all = "kebab-case")]
pub enum OutputFormat {
    Text,
    Json,
}
