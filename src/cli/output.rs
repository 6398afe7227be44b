//! Output formatting for CLI commands.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cli::args::{OutputFormat, QuarryArgs};
use crate::crawler::CrawlReport;
use crate::error::Result;
use crate::index::IndexStats;
use crate::query::Span;

/// Result structure for index creation.
#[derive(Debug, Serialize, Deserialize)]
pub struct IndexCreationResult {
    pub path: String,
    pub report: CrawlReport,
    pub stats: IndexStats,
    pub duration_ms: u64,
}

/// Result structure for query operations.
#[derive(Debug, Serialize, Deserialize)]
pub struct QueryResults {
    pub query: String,
    pub documents: Vec<String>,
    pub total_hits: usize,
    pub duration_ms: u64,
}

/// Result structure for query explanation.
#[derive(Debug, Serialize, Deserialize)]
pub struct ExplainResult {
    pub query: String,
    pub canonical: String,
    pub nodes: Vec<ExplainedNode>,
}

/// One node of an explained query tree, in pre-order.
#[derive(Debug, Serialize, Deserialize)]
pub struct ExplainedNode {
    pub depth: usize,
    pub description: String,
    pub span: Span,
    pub text: String,
}

/// Index statistics with the file they were read from.
#[derive(Debug, Serialize, Deserialize)]
pub struct IndexStatsResult {
    pub path: String,
    pub stats: IndexStats,
}

impl fmt::Display for IndexCreationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Index written to {}", self.path)?;
        writeln!(f, "Documents indexed: {}", self.report.documents_indexed)?;
        writeln!(f, "Documents skipped: {}", self.report.documents_failed)?;
        writeln!(f, "Words indexed:     {}", self.report.words_indexed)?;
        writeln!(f, "Distinct words:    {}", self.stats.term_count)?;
        write!(f, "Time:              {}ms", self.duration_ms)
    }
}

impl fmt::Display for QueryResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for document in &self.documents {
            writeln!(f, "{document}")?;
        }
        if self.documents.len() < self.total_hits {
            writeln!(f, "... {} more", self.total_hits - self.documents.len())?;
        }
        write!(f, "{} documents matched in {}ms", self.total_hits, self.duration_ms)
    }
}

impl fmt::Display for ExplainResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.canonical)?;
        for node in &self.nodes {
            writeln!(
                f,
                "{:indent$}{} [{}] {}",
                "",
                node.description,
                node.span,
                node.text,
                indent = node.depth * 2
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for IndexStatsResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Index Statistics: {}", self.path)?;
        writeln!(f, "Documents:       {}", self.stats.doc_count)?;
        writeln!(f, "Distinct words:  {}", self.stats.term_count)?;
        writeln!(f, "Postings:        {}", self.stats.posting_count)?;
        write!(f, "Word positions:  {}", self.stats.position_count)
    }
}

/// Output a result in the specified format.
pub fn output_result<T>(message: &str, result: &T, args: &QuarryArgs) -> Result<()>
where
    T: Serialize + fmt::Display,
{
    match args.output_format {
        OutputFormat::Human => {
            if args.verbosity() > 1 {
                println!("{message}");
                println!();
            }
            println!("{result}");
        }
        OutputFormat::Json => {
            let json = if args.pretty {
                serde_json::to_string_pretty(result)?
            } else {
                serde_json::to_string(result)?
            };
            println!("{json}");
        }
    }
    Ok(())
}

/// Render a caret line pointing at `span` of `query`.
pub fn caret_line(query: &str, span: Span) -> String {
    let start = query.get(..span.start).map_or(0, |s| s.chars().count());
    let width = query
        .get(span.start..span.end)
        .map_or(1, |s| s.chars().count().max(1));
    format!("{}{}", " ".repeat(start), "^".repeat(width))
}
