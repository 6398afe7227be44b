//! Command line argument parsing for the Quarry CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::index::StorageFormat;
use crate::query::parser::DEFAULT_MAX_DEPTH;

/// Default location of the index file.
pub const DEFAULT_INDEX_PATH: &str = "index.db";

/// Quarry - a small boolean and phrase text search engine
#[derive(Parser, Debug, Clone)]
#[command(name = "quarry")]
#[command(about = "Build an inverted index over local documents and query it")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct QuarryArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human", global = true)]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl QuarryArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n + 1,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Crawl documents and save an index
    Index(IndexArgs),

    /// Run a query against an index
    Query(QueryArgs),

    /// Parse a query and show its structure without running it
    Explain(ExplainArgs),

    /// Show index statistics
    Stats(StatsArgs),
}

/// Arguments for building an index
#[derive(Parser, Debug, Clone)]
pub struct IndexArgs {
    /// Files or directories to crawl
    #[arg(value_name = "PATHS", required = true)]
    pub paths: Vec<PathBuf>,

    /// Where to write the index
    #[arg(short, long, env = "QUARRY_INDEX", default_value = DEFAULT_INDEX_PATH)]
    pub output: PathBuf,

    /// Storage format of the written index
    #[arg(long, default_value = "binary")]
    pub storage: StorageFormat,

    /// Do not follow links between HTML documents
    #[arg(long)]
    pub no_follow: bool,

    /// Index HTML files without stripping markup
    #[arg(long)]
    pub keep_markup: bool,

    /// Stop after this many documents
    #[arg(long)]
    pub max_documents: Option<usize>,

    /// File extensions picked up from directories (comma-separated)
    #[arg(long = "ext", value_delimiter = ',')]
    pub extensions: Vec<String>,
}

/// Arguments for querying
#[derive(Parser, Debug, Clone)]
pub struct QueryArgs {
    /// Query string, e.g. '(rust & !"garbage collector")'
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Index file to query
    #[arg(short, long, env = "QUARRY_INDEX", default_value = DEFAULT_INDEX_PATH)]
    pub index: PathBuf,

    /// Maximum number of documents to print
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Maximum query nesting depth
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,
}

/// Arguments for explaining a query
#[derive(Parser, Debug, Clone)]
pub struct ExplainArgs {
    /// Query string
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Maximum query nesting depth
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,
}

/// Arguments for index statistics
#[derive(Parser, Debug, Clone)]
pub struct StatsArgs {
    /// Index file to inspect
    #[arg(short, long, env = "QUARRY_INDEX", default_value = DEFAULT_INDEX_PATH)]
    pub index: PathBuf,
}

/// Output formats for CLI
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}
