//! Inverted index: word -> document -> positions, plus the document universe.
//!
//! - [`inverted`] builds and reads the index.
//! - [`doc_set`] is the result set type shared with query evaluation.
//! - [`storage`] persists an index to disk and restores it.

pub mod doc_set;
pub mod inverted;
pub mod storage;

pub use doc_set::DocumentSet;
pub use inverted::{DocumentEntry, IndexStats, InvertedIndex, Position};
pub use storage::StorageFormat;
