//! Boolean and phrase query language.
//!
//! A query string flows through three stages:
//!
//! 1. [`lexer`] turns it into operator and word tokens,
//! 2. [`parser`] builds a [`QueryNode`] tree,
//! 3. [`evaluator`] walks the tree against an [`crate::index::InvertedIndex`].
//!
//! [`QueryEngine`] runs all three.
//!
//! # Syntax
//!
//! | Query              | Matches                                            |
//! |--------------------|----------------------------------------------------|
//! | `fox`              | documents containing `fox`                         |
//! | `quick fox`        | documents containing both words, in any order      |
//! | `"quick fox"`      | documents containing the exact phrase              |
//! | `!fox`             | documents not containing `fox`                     |
//! | `(a & b)`          | documents matching both sub-queries                |
//! | `(a \| b)`         | documents matching either sub-query                |

pub mod ast;
pub mod engine;
pub mod evaluator;
pub mod lexer;
pub mod parser;

pub use ast::{Literal, NodeKind, QueryNode, Span};
pub use engine::QueryEngine;
pub use evaluator::QueryEvaluator;
pub use lexer::{QueryToken, TokenKind};
pub use parser::{ParserConfig, QueryParser};
