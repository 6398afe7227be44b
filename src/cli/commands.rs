//! Command implementations for the Quarry CLI.

use std::time::Instant;

use log::info;

use crate::cli::args::*;
use crate::cli::output::*;
use crate::crawler::{Crawler, CrawlerConfig};
use crate::error::{QuarryError, Result};
use crate::index::InvertedIndex;
use crate::query::{NodeKind, ParserConfig, QueryEngine, QueryNode, QueryParser};

/// Execute a CLI command.
pub fn execute_command(args: QuarryArgs) -> Result<()> {
    match &args.command {
        Command::Index(index_args) => build_index(index_args.clone(), &args),
        Command::Query(query_args) => run_query(query_args.clone(), &args),
        Command::Explain(explain_args) => explain_query(explain_args.clone(), &args),
        Command::Stats(stats_args) => show_stats(stats_args.clone(), &args),
    }
}

/// Crawl the given paths and save the index.
fn build_index(args: IndexArgs, cli_args: &QuarryArgs) -> Result<()> {
    let start_time = Instant::now();

    let mut config = CrawlerConfig {
        max_documents: args.max_documents,
        follow_links: !args.no_follow,
        strip_markup: !args.keep_markup,
        ..Default::default()
    };
    if !args.extensions.is_empty() {
        config.extensions = args
            .extensions
            .iter()
            .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
            .collect();
    }

    let mut crawler = Crawler::new(config);
    let report = crawler.crawl(&args.paths)?;
    let index = crawler.into_index();
    index.save(&args.output, args.storage)?;

    output_result(
        "Index created successfully",
        &IndexCreationResult {
            path: args.output.to_string_lossy().to_string(),
            report,
            stats: index.stats(),
            duration_ms: start_time.elapsed().as_millis() as u64,
        },
        cli_args,
    )
}

/// Parse and evaluate a query against a saved index.
fn run_query(args: QueryArgs, cli_args: &QuarryArgs) -> Result<()> {
    let index = InvertedIndex::load(&args.index)?;
    let engine = QueryEngine::new(index).with_parser_config(ParserConfig {
        max_depth: args.max_depth,
    });

    let start_time = Instant::now();
    let tree = engine
        .parse(&args.query)
        .map_err(|e| annotate_parse_error(&args.query, e))?;
    let documents = engine.evaluate(&tree).into_sorted_vec();
    let duration_ms = start_time.elapsed().as_millis() as u64;
    info!("Query {tree} matched {} documents", documents.len());

    let total_hits = documents.len();
    let documents = match args.limit {
        Some(limit) => documents.into_iter().take(limit).collect(),
        None => documents,
    };

    output_result(
        "Query results",
        &QueryResults {
            query: args.query,
            documents,
            total_hits,
            duration_ms,
        },
        cli_args,
    )
}

/// Parse a query and print its tree.
fn explain_query(args: ExplainArgs, cli_args: &QuarryArgs) -> Result<()> {
    let parser = QueryParser::with_config(ParserConfig {
        max_depth: args.max_depth,
    });
    let tree = parser
        .parse(&args.query)
        .map_err(|e| annotate_parse_error(&args.query, e))?;

    let mut nodes = Vec::new();
    explain_node(&args.query, &tree, 0, &mut nodes);

    output_result(
        "Query structure",
        &ExplainResult {
            canonical: tree.to_string(),
            query: args.query,
            nodes,
        },
        cli_args,
    )
}

fn explain_node(query: &str, node: &QueryNode, depth: usize, nodes: &mut Vec<ExplainedNode>) {
    let not = if node.negated { "NOT " } else { "" };
    let description = match &node.kind {
        NodeKind::Literal(literal) if literal.phrase => {
            format!("{not}PHRASE {}", literal.words.join(" "))
        }
        NodeKind::Literal(literal) if literal.is_single_word() => {
            format!("{not}WORD {}", literal.words[0])
        }
        NodeKind::Literal(literal) => format!("{not}ALL OF {}", literal.words.join(" ")),
        NodeKind::And(_, _) => format!("{not}AND"),
        NodeKind::Or(_, _) => format!("{not}OR"),
    };

    nodes.push(ExplainedNode {
        depth,
        description,
        span: node.span,
        text: node.span.slice(query).to_string(),
    });

    if let NodeKind::And(left, right) | NodeKind::Or(left, right) = &node.kind {
        explain_node(query, left, depth + 1, nodes);
        explain_node(query, right, depth + 1, nodes);
    }
}

/// Show statistics of a saved index.
fn show_stats(args: StatsArgs, cli_args: &QuarryArgs) -> Result<()> {
    let index = InvertedIndex::load(&args.index)?;

    output_result(
        "Index statistics",
        &IndexStatsResult {
            path: args.index.to_string_lossy().to_string(),
            stats: index.stats(),
        },
        cli_args,
    )
}

/// Append the query and a caret under the offending span to a parse error.
fn annotate_parse_error(query: &str, error: QuarryError) -> QuarryError {
    match error {
        QuarryError::Parse {
            message,
            span: Some(span),
        } => QuarryError::Parse {
            message: format!("{message}\n  {query}\n  {}", caret_line(query, span)),
            span: Some(span),
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Span;

    #[test]
    fn test_annotate_parse_error() {
        let error = QuarryError::parse("missing closing ')'", Some(Span::new(0, 1)));
        let annotated = annotate_parse_error("(a & b", error);
        assert_eq!(
            annotated.to_string(),
            "Parse error: missing closing ')'\n  (a & b\n  ^"
        );
        assert!(annotated.is_parse_error());

        let untouched = annotate_parse_error("x", QuarryError::other("boom"));
        assert_eq!(untouched.to_string(), "Error: boom");
    }

    #[test]
    fn test_explain_node() {
        let query = "(!\"a b\" | c d)";
        let tree = QueryParser::new().parse(query).unwrap();
        let mut nodes = Vec::new();
        explain_node(query, &tree, 0, &mut nodes);

        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[0].description, "OR");
        assert_eq!(nodes[1].description, "NOT PHRASE a b");
        assert_eq!(nodes[1].text, "!\"a b\"");
        assert_eq!(nodes[2].description, "ALL OF c d");
        assert_eq!(nodes[2].depth, 1);
    }
}
