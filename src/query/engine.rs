//! Query engine tying the parser and evaluator to a shared index.

use std::sync::Arc;

use log::debug;

use crate::error::Result;
use crate::index::{DocumentSet, InvertedIndex};
use crate::query::ast::QueryNode;
use crate::query::evaluator::QueryEvaluator;
use crate::query::parser::{ParserConfig, QueryParser};

/// Answers query strings against a read-only index.
///
/// The engine is cheap to clone and safe to use from many threads at once:
/// the index sits behind an `Arc` and is never mutated.
///
/// # Example
///
/// ```
/// use quarry::index::InvertedIndex;
/// use quarry::query::QueryEngine;
///
/// let mut index = InvertedIndex::new();
/// index.add_text("a.html", "rust is fast");
/// index.add_text("b.html", "python is friendly");
///
/// let engine = QueryEngine::new(index);
/// let docs = engine.query("(fast | friendly)").unwrap();
/// assert_eq!(docs.len(), 2);
/// assert!(engine.query("(fast |").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct QueryEngine {
    index: Arc<InvertedIndex>,
    parser: QueryParser,
}

impl QueryEngine {
    /// Create an engine owning `index`.
    pub fn new(index: InvertedIndex) -> Self {
        Self::from_shared(Arc::new(index))
    }

    /// Create an engine over an already shared index.
    pub fn from_shared(index: Arc<InvertedIndex>) -> Self {
        QueryEngine {
            index,
            parser: QueryParser::new(),
        }
    }

    /// Replace the parser configuration.
    pub fn with_parser_config(mut self, config: ParserConfig) -> Self {
        self.parser = QueryParser::with_config(config);
        self
    }

    /// The index queries run against.
    pub fn index(&self) -> &Arc<InvertedIndex> {
        &self.index
    }

    /// Parse `query` without evaluating it.
    pub fn parse(&self, query: &str) -> Result<QueryNode> {
        self.parser.parse(query)
    }

    /// Evaluate an already parsed query.
    pub fn evaluate(&self, tree: &QueryNode) -> DocumentSet {
        QueryEvaluator::new(&self.index).evaluate(tree)
    }

    /// Parse and evaluate `query`.
    pub fn query(&self, query: &str) -> Result<DocumentSet> {
        let tree = self.parse(query)?;
        let docs = self.evaluate(&tree);
        debug!("Query {tree} matched {} documents", docs.len());
        Ok(docs)
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    fn engine() -> QueryEngine {
        let mut index = InvertedIndex::new();
        index.add_text("d1", "apples and oranges");
        index.add_text("d2", "oranges and lemons");
        index.add_text("d3", "");
        QueryEngine::new(index)
    }

    #[test]
    fn test_query() {
        let engine = engine();
        assert_eq!(engine.query("oranges").unwrap().len(), 2);
        assert_eq!(engine.query("!oranges").unwrap().into_sorted_vec(), vec!["d3"]);
        assert_eq!(
            engine.query("\"and lemons\"").unwrap().into_sorted_vec(),
            vec!["d2"]
        );
    }

    #[test]
    fn test_parse_error_is_recoverable() {
        let engine = engine();
        let before = engine.index().stats();

        assert!(engine.query("(apples & oranges").unwrap_err().is_parse_error());
        assert!(engine.query("&").unwrap_err().is_parse_error());
        assert_eq!(engine.index().stats(), before);
        assert_eq!(engine.query("apples").unwrap().len(), 1);
    }

    #[test]
    fn test_parser_config() {
        let engine = engine().with_parser_config(ParserConfig { max_depth: 1 });
        assert!(engine.query("!!!apples").is_err());
        assert!(engine.query("apples").is_ok());
    }

    #[test]
    fn test_concurrent_queries() {
        let engine = engine();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let engine = engine.clone();
                thread::spawn(move || engine.query("(apples | lemons)").unwrap().len())
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 2);
        }
    }
}
