//! Recursive-descent parser for boolean and phrase queries.
//!
//! Grammar (binary operators are always parenthesized):
//!
//! ```text
//! expr    := '(' expr ('&' | '|') expr ')'
//!          | '!' expr
//!          | '"' wordrun '"'
//!          | wordrun
//! wordrun := word+
//! ```
//!
//! A complete query is exactly one `expr`. Input left over after it, such
//! as `& b` in `a & b`, is rejected rather than ignored.
//!
//! # Examples
//!
//! ```
//! use quarry::query::parser::QueryParser;
//!
//! let parser = QueryParser::new();
//! let tree = parser.parse("(rust & !\"garbage collector\")").unwrap();
//! assert_eq!(tree.to_string(), "(rust & !\"garbage collector\")");
//!
//! assert!(parser.parse("(rust & go").is_err());
//! ```

use log::trace;
use serde::{Deserialize, Serialize};

use crate::error::{QuarryError, Result};
use crate::query::ast::{Literal, QueryNode, Span};
use crate::query::lexer::{self, QueryToken, TokenKind};

/// Default maximum nesting depth of a query.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Parser configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Maximum nesting of parentheses, quotes and `!` chains.
    pub max_depth: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Parses query strings into [`QueryNode`] trees.
#[derive(Debug, Clone, Default)]
pub struct QueryParser {
    config: ParserConfig,
}

impl QueryParser {
    /// Create a parser with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser with the given configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        QueryParser { config }
    }

    /// Set the maximum nesting depth.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    /// Get the parser configuration.
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse a query string.
    pub fn parse(&self, query: &str) -> Result<QueryNode> {
        let tokens = lexer::tokenize(query);
        self.parse_tokens(&tokens)
    }

    /// Parse an already lexed query.
    pub fn parse_tokens(&self, tokens: &[QueryToken]) -> Result<QueryNode> {
        if tokens.is_empty() {
            return Err(QuarryError::parse("empty query", None));
        }

        let mut parser = TokenParser {
            tokens,
            pos: 0,
            max_depth: self.config.max_depth,
        };
        let tree = parser.parse_expression(0)?;

        if let Some(token) = parser.peek() {
            return Err(QuarryError::parse(
                format!(
                    "unexpected trailing input at '{}' (wrap binary operators in parentheses)",
                    token.kind
                ),
                Some(token.span),
            ));
        }

        trace!("Parsed query: {tree}");
        Ok(tree)
    }
}

/// Cursor over the token slice of one parse.
struct TokenParser<'a> {
    tokens: &'a [QueryToken],
    pos: usize,
    max_depth: usize,
}

impl<'a> TokenParser<'a> {
    fn peek(&self) -> Option<&'a QueryToken> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&'a QueryToken> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    /// Span just past the last token, for errors at end of input.
    fn end_span(&self) -> Option<Span> {
        self.tokens.last().map(|t| Span::new(t.span.end, t.span.end))
    }

    fn parse_expression(&mut self, depth: usize) -> Result<QueryNode> {
        let Some(token) = self.advance() else {
            return Err(QuarryError::parse(
                "unexpected end of query, expected an expression",
                self.end_span(),
            ));
        };

        if depth > self.max_depth {
            return Err(QuarryError::parse(
                format!("query is nested more than {} levels deep", self.max_depth),
                Some(token.span),
            ));
        }

        match &token.kind {
            TokenKind::LeftParen => self.parse_binary(token, depth),
            TokenKind::Not => {
                let inner = self.parse_expression(depth + 1)?;
                let span = token.span.join(inner.span);
                let mut node = inner.negate();
                node.span = span;
                Ok(node)
            }
            TokenKind::Quote => self.parse_phrase(token),
            TokenKind::Word(word) => {
                let mut words = vec![word.clone()];
                let mut span = token.span;
                if let Some(rest) = self.parse_word_run(&mut words) {
                    span = span.join(rest);
                }
                Ok(QueryNode::literal(Literal::words(words), span))
            }
            TokenKind::And | TokenKind::Or | TokenKind::RightParen => Err(QuarryError::parse(
                format!("unexpected operator '{}', expected an expression", token.kind),
                Some(token.span),
            )),
        }
    }

    /// `'(' expr op expr ')'`, with the opening parenthesis already consumed.
    fn parse_binary(&mut self, open: &QueryToken, depth: usize) -> Result<QueryNode> {
        let left = self.parse_expression(depth + 1)?;

        let operator = match self.advance() {
            Some(token) if matches!(token.kind, TokenKind::And | TokenKind::Or) => token,
            Some(token) => {
                return Err(QuarryError::parse(
                    format!("expected '&' or '|' but found '{}'", token.kind),
                    Some(token.span),
                ));
            }
            None => {
                return Err(QuarryError::parse(
                    "missing '&' or '|' inside parentheses",
                    Some(open.span),
                ));
            }
        };

        let right = self.parse_expression(depth + 1)?;

        let close = match self.advance() {
            Some(token) if token.kind == TokenKind::RightParen => token,
            Some(token) => {
                return Err(QuarryError::parse(
                    format!("expected ')' but found '{}'", token.kind),
                    Some(token.span),
                ));
            }
            None => {
                return Err(QuarryError::parse(
                    "missing closing ')'",
                    Some(open.span),
                ));
            }
        };

        let span = open.span.join(close.span);
        Ok(match operator.kind {
            TokenKind::And => QueryNode::and(left, right, span),
            _ => QueryNode::or(left, right, span),
        })
    }

    /// `'"' wordrun '"'`, with the opening quote already consumed.
    fn parse_phrase(&mut self, open: &QueryToken) -> Result<QueryNode> {
        let mut words = Vec::new();
        self.parse_word_run(&mut words);

        match self.advance() {
            Some(token) if token.kind == TokenKind::Quote => {
                if words.is_empty() {
                    return Err(QuarryError::parse(
                        "empty phrase",
                        Some(open.span.join(token.span)),
                    ));
                }
                let span = open.span.join(token.span);
                Ok(QueryNode::literal(Literal::phrase(words), span))
            }
            Some(token) => Err(QuarryError::parse(
                format!("operator '{}' is not allowed inside a phrase", token.kind),
                Some(token.span),
            )),
            None => Err(QuarryError::parse(
                "missing closing quote",
                Some(open.span),
            )),
        }
    }

    /// Consume consecutive word tokens into `words`, returning their span.
    fn parse_word_run(&mut self, words: &mut Vec<String>) -> Option<Span> {
        let mut span: Option<Span> = None;
        while let Some(QueryToken {
            kind: TokenKind::Word(word),
            span: word_span,
        }) = self.peek()
        {
            words.push(word.clone());
            span = Some(span.map_or(*word_span, |s| s.join(*word_span)));
            self.pos += 1;
        }
        span
    }
}
