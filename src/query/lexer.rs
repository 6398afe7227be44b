//! Query lexer.
//!
//! Splits a query string into operator and word tokens. Lexing is stateless:
//! [`next_token`] depends only on the query and a byte offset, so callers can
//! resume anywhere by offset alone.
//!
//! Operators are the single characters `&`, `|`, `(`, `)`, `!` and `"`.
//! Anything else starts a word: non-letter characters are skipped up to the
//! first letter, and the word is the following run of letters, lower-cased.
//! A stretch of non-letters that reaches whitespace, an operator or the end
//! of input without meeting a letter is ignored.

use std::fmt;

use crate::analysis::tokenizer::{is_word_char, normalize};
use crate::query::ast::Span;

/// Kinds of query tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// `&`
    And,
    /// `|`
    Or,
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `!`
    Not,
    /// `"`
    Quote,
    /// A normalized word
    Word(String),
}

impl TokenKind {
    /// Whether this token is an operator symbol.
    pub fn is_operator(&self) -> bool {
        !matches!(self, TokenKind::Word(_))
    }

    fn from_operator(c: char) -> Option<Self> {
        match c {
            '&' => Some(TokenKind::And),
            '|' => Some(TokenKind::Or),
            '(' => Some(TokenKind::LeftParen),
            ')' => Some(TokenKind::RightParen),
            '!' => Some(TokenKind::Not),
            '"' => Some(TokenKind::Quote),
            _ => None,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::And => write!(f, "&"),
            TokenKind::Or => write!(f, "|"),
            TokenKind::LeftParen => write!(f, "("),
            TokenKind::RightParen => write!(f, ")"),
            TokenKind::Not => write!(f, "!"),
            TokenKind::Quote => write!(f, "\""),
            TokenKind::Word(word) => write!(f, "{word}"),
        }
    }
}

/// A token together with the span of query text it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryToken {
    pub kind: TokenKind,
    pub span: Span,
}

impl QueryToken {
    fn new(kind: TokenKind, start: usize, end: usize) -> Self {
        QueryToken {
            kind,
            span: Span::new(start, end),
        }
    }
}

#[inline]
fn is_operator_char(c: char) -> bool {
    TokenKind::from_operator(c).is_some()
}

/// Lex the token starting at or after byte `offset`.
///
/// Returns `None` at end of input. An offset past the end, or one that does
/// not fall on a character boundary, is treated as end of input.
pub fn next_token(query: &str, offset: usize) -> Option<QueryToken> {
    let mut index = offset;
    loop {
        let rest = query.get(index..)?;
        let (skip, c) = rest.char_indices().find(|(_, c)| !c.is_whitespace())?;
        index += skip;

        if let Some(kind) = TokenKind::from_operator(c) {
            return Some(QueryToken::new(kind, index, index + c.len_utf8()));
        }

        // Skip non-letters up to the start of the run.
        let rest = &query[index..];
        let run_start = rest
            .char_indices()
            .find(|(_, c)| is_word_char(*c) || c.is_whitespace() || is_operator_char(*c))
            .map_or(query.len(), |(i, _)| index + i);

        match query[run_start..].chars().next() {
            Some(c) if is_word_char(c) => {
                let run_end = query[run_start..]
                    .find(|c: char| !is_word_char(c))
                    .map_or(query.len(), |len| run_start + len);
                let word = normalize(&query[run_start..run_end]);
                return Some(QueryToken::new(TokenKind::Word(word), run_start, run_end));
            }
            _ => index = run_start,
        }
    }
}

/// Iterator over the tokens of a query.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    query: &'a str,
    offset: usize,
}

impl Iterator for Tokens<'_> {
    type Item = QueryToken;

    fn next(&mut self) -> Option<QueryToken> {
        let token = next_token(self.query, self.offset)?;
        self.offset = token.span.end;
        Some(token)
    }
}

/// Iterate over all tokens of `query`.
pub fn tokens(query: &str) -> Tokens<'_> {
    Tokens { query, offset: 0 }
}

/// Collect all tokens of `query`.
pub fn tokenize(query: &str) -> Vec<QueryToken> {
    tokens(query).collect()
}
