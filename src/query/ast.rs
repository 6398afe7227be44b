//! Query expression tree.
//!
//! A parsed query is an immutable tree of [`QueryNode`]s. Negation is not a
//! node of its own: every node carries a `negated` flag, and applying `!`
//! toggles it, so `!!x` parses to the same tree as `x`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Half-open byte range `[start, end)` of the query text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    /// Create a new span.
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn join(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Whether the span covers nothing.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The slice of `source` covered by this span.
    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        source.get(self.start..self.end).unwrap_or("")
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// One or more words to look up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Literal {
    /// Normalized words, in query order. Never empty.
    pub words: Vec<String>,

    /// Whether the words must appear as a contiguous, ordered run.
    pub phrase: bool,
}

impl Literal {
    /// A literal matching documents that contain every word.
    pub fn words(words: Vec<String>) -> Self {
        Literal {
            words,
            phrase: false,
        }
    }

    /// A literal matching documents that contain the exact phrase.
    pub fn phrase(words: Vec<String>) -> Self {
        Literal {
            words,
            phrase: true,
        }
    }

    /// Whether this literal is a single word.
    pub fn is_single_word(&self) -> bool {
        self.words.len() == 1
    }
}

/// Closed set of query node kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    Literal(Literal),
    And(Box<QueryNode>, Box<QueryNode>),
    Or(Box<QueryNode>, Box<QueryNode>),
}

/// A node of the query tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryNode {
    pub kind: NodeKind,
    pub negated: bool,
    pub span: Span,
}

impl QueryNode {
    /// Create a non-negated node.
    pub fn new(kind: NodeKind, span: Span) -> Self {
        QueryNode {
            kind,
            negated: false,
            span,
        }
    }

    /// Create a literal node.
    pub fn literal(literal: Literal, span: Span) -> Self {
        Self::new(NodeKind::Literal(literal), span)
    }

    /// Create a conjunction node.
    pub fn and(left: QueryNode, right: QueryNode, span: Span) -> Self {
        Self::new(NodeKind::And(Box::new(left), Box::new(right)), span)
    }

    /// Create a disjunction node.
    pub fn or(left: QueryNode, right: QueryNode, span: Span) -> Self {
        Self::new(NodeKind::Or(Box::new(left), Box::new(right)), span)
    }

    /// Toggle the polarity of this node.
    pub fn negate(mut self) -> Self {
        self.negated = !self.negated;
        self
    }

    /// Source span this node was parsed from.
    pub fn span(&self) -> Span {
        self.span
    }

    /// Depth of the tree (a literal has depth 1).
    pub fn depth(&self) -> usize {
        match &self.kind {
            NodeKind::Literal(_) => 1,
            NodeKind::And(left, right) | NodeKind::Or(left, right) => {
                1 + left.depth().max(right.depth())
            }
        }
    }

    /// All words referenced by the tree, in left-to-right order.
    pub fn words(&self) -> Vec<&str> {
        let mut words = Vec::new();
        self.collect_words(&mut words);
        words
    }

    fn collect_words<'a>(&'a self, words: &mut Vec<&'a str>) {
        match &self.kind {
            NodeKind::Literal(literal) => words.extend(literal.words.iter().map(String::as_str)),
            NodeKind::And(left, right) | NodeKind::Or(left, right) => {
                left.collect_words(words);
                right.collect_words(words);
            }
        }
    }
}

/// Renders the canonical query text, e.g. `(!"a b" | c)`.
impl fmt::Display for QueryNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            write!(f, "!")?;
        }
        match &self.kind {
            NodeKind::Literal(literal) if literal.phrase => {
                write!(f, "\"{}\"", literal.words.join(" "))
            }
            NodeKind::Literal(literal) => write!(f, "{}", literal.words.join(" ")),
            NodeKind::And(left, right) => write!(f, "({left} & {right})"),
            NodeKind::Or(left, right) => write!(f, "({left} | {right})"),
        }
    }
}
