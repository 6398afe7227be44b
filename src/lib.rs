//! # Quarry
//!
//! A small text search engine: an inverted index with word positions over
//! crawled documents, and a boolean/phrase query language evaluated by set
//! algebra.
//!
//! ## Features
//!
//! - Positional inverted index with per-document word cursors
//! - Fully parenthesized boolean queries with `&`, `|` and `!`
//! - Unordered multi-word lookups and exact `"phrase"` matching
//! - Checksummed binary (or JSON) index persistence
//! - Local file crawler that follows HTML links
//!
//! ## Example
//!
//! ```
//! use quarry::index::InvertedIndex;
//! use quarry::query::QueryEngine;
//!
//! let mut index = InvertedIndex::new();
//! index.add_text("d1", "the quick brown fox");
//! index.add_text("d2", "the lazy dog");
//!
//! let engine = QueryEngine::new(index);
//! let docs = engine.query("(\"quick brown\" | !the)").unwrap();
//! assert_eq!(docs.into_sorted_vec(), vec!["d1"]);
//! ```

pub mod analysis;
pub mod cli;
pub mod crawler;
pub mod error;
pub mod index;
pub mod query;

pub mod prelude {
    pub use crate::error::{QuarryError, Result};
    pub use crate::index::{DocumentSet, InvertedIndex, StorageFormat};
    pub use crate::query::{QueryEngine, QueryNode, QueryParser};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
