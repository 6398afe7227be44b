//! Positional inverted index over string-keyed documents.
//!
//! The index maps every normalized word to the documents containing it and,
//! per document, the ordered positions at which the word occurs. Positions
//! are 1-based ordinals of word occurrences within a document's cumulative
//! indexed text, so two consecutive words of the same text chunk always
//! occupy consecutive positions.
//!
//! # Example
//!
//! ```
//! use quarry::index::InvertedIndex;
//!
//! let mut index = InvertedIndex::new();
//! index.add_text("doc1", "The quick brown fox");
//! index.add_text("doc2", "A lazy dog");
//!
//! assert!(index.get_documents("quick").contains("doc1"));
//! assert!(index.has_phrase("doc1", &["quick", "brown"]));
//! assert!(!index.has_phrase("doc1", &["brown", "quick"]));
//! ```

use ahash::AHashMap;
use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::analysis::tokenizer::LetterRunTokenizer;
use crate::error::{QuarryError, Result};
use crate::index::doc_set::DocumentSet;

/// 1-based ordinal of a word occurrence within a document.
pub type Position = u32;

/// Per-document bookkeeping owned by the index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentEntry {
    /// Number of word occurrences indexed so far for this document.
    pub cursor: Position,
}

/// Statistics about an index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    /// Number of documents in the universe.
    pub doc_count: u64,

    /// Number of distinct words.
    pub term_count: u64,

    /// Number of (word, document) pairs.
    pub posting_count: u64,

    /// Total number of indexed word occurrences.
    pub position_count: u64,
}

/// An in-memory positional inverted index.
///
/// Mutation happens only through [`InvertedIndex::add_text`] and
/// [`InvertedIndex::merge`], both of which take `&mut self`. Once built, the
/// index can be shared behind an `Arc` and queried concurrently; no read
/// operation mutates it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvertedIndex {
    /// word -> document -> strictly increasing positions.
    terms: AHashMap<String, AHashMap<String, Vec<Position>>>,

    /// The document universe.
    documents: AHashMap<String, DocumentEntry>,
}

impl InvertedIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Index a chunk of text for `document`.
    ///
    /// The document joins the universe even if `text` contains no letters.
    /// Repeated calls append: the positions continue from where the previous
    /// chunk for the same document stopped. Returns the number of words
    /// indexed from this chunk.
    pub fn add_text(&mut self, document: &str, text: &str) -> usize {
        if !self.documents.contains_key(document) {
            debug!("Adding document {document} to the universe");
            self.documents
                .insert(document.to_string(), DocumentEntry::default());
        }

        let mut count = 0;
        for token in LetterRunTokenizer::new().tokenize(text) {
            self.add_association(token.text, document);
            count += 1;
        }

        trace!("Indexed {count} words for {document}");
        count
    }

    /// Record one occurrence of `word` at the document's next position.
    fn add_association(&mut self, word: String, document: &str) {
        let position = match self.documents.get_mut(document) {
            Some(entry) => {
                entry.cursor += 1;
                entry.cursor
            }
            None => return,
        };

        let postings = self.terms.entry(word).or_default();
        match postings.get_mut(document) {
            Some(positions) => positions.push(position),
            None => {
                postings.insert(document.to_string(), vec![position]);
            }
        }
    }

    /// Documents containing `word` at least once.
    ///
    /// `word` must already be normalized. An unseen word yields an empty set.
    pub fn get_documents(&self, word: &str) -> DocumentSet {
        match self.terms.get(word) {
            Some(postings) => postings.keys().cloned().collect(),
            None => DocumentSet::new(),
        }
    }

    /// Documents of the universe that do not contain `word`.
    pub fn get_complement_of_word(&self, word: &str) -> DocumentSet {
        match self.terms.get(word) {
            Some(postings) => self
                .documents
                .keys()
                .filter(|doc| !postings.contains_key(*doc))
                .cloned()
                .collect(),
            None => self.universe(),
        }
    }

    /// Documents of the universe that are not in `set`.
    pub fn complement(&self, set: &DocumentSet) -> DocumentSet {
        self.documents
            .keys()
            .filter(|doc| !set.contains(doc.as_str()))
            .cloned()
            .collect()
    }

    /// Every document ever indexed.
    pub fn universe(&self) -> DocumentSet {
        self.documents.keys().cloned().collect()
    }

    /// Whether `document` contains `words` as a contiguous, ordered run.
    ///
    /// An empty phrase is trivially present. A word that was never indexed
    /// for `document` makes the phrase absent.
    pub fn has_phrase<S: AsRef<str>>(&self, document: &str, words: &[S]) -> bool {
        if words.is_empty() {
            return true;
        }

        let mut lists = Vec::with_capacity(words.len());
        for word in words {
            match self.positions(word.as_ref(), document) {
                Some(positions) => lists.push(positions),
                None => return false,
            }
        }

        // Anchor on the shortest posting list and probe the others.
        let Some((anchor, anchor_positions)) = lists
            .iter()
            .enumerate()
            .min_by_key(|(_, positions)| positions.len())
        else {
            return false;
        };
        let anchor = anchor as Position;

        anchor_positions.iter().any(|&position| {
            let Some(start) = position.checked_sub(anchor) else {
                return false;
            };
            lists.iter().enumerate().all(|(offset, positions)| {
                positions
                    .binary_search(&(start + offset as Position))
                    .is_ok()
            })
        })
    }

    /// Positions of `word` within `document`, if any.
    pub fn positions(&self, word: &str, document: &str) -> Option<&[Position]> {
        self.terms
            .get(word)
            .and_then(|postings| postings.get(document))
            .map(Vec::as_slice)
    }

    /// Whether `document` is part of the universe.
    pub fn contains_document(&self, document: &str) -> bool {
        self.documents.contains_key(document)
    }

    /// Number of word occurrences indexed so far for `document`.
    pub fn cursor(&self, document: &str) -> Option<Position> {
        self.documents.get(document).map(|entry| entry.cursor)
    }

    /// Iterate over the document keys of the universe.
    pub fn documents(&self) -> impl Iterator<Item = &str> {
        self.documents.keys().map(String::as_str)
    }

    /// Iterate over every indexed word.
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.terms.keys().map(String::as_str)
    }

    /// Number of documents in the universe.
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Number of distinct words.
    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    /// Whether nothing has been indexed.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Collect index statistics.
    pub fn stats(&self) -> IndexStats {
        let mut stats = IndexStats {
            doc_count: self.documents.len() as u64,
            term_count: self.terms.len() as u64,
            ..Default::default()
        };
        for postings in self.terms.values() {
            stats.posting_count += postings.len() as u64;
            stats.position_count += postings.values().map(|p| p.len() as u64).sum::<u64>();
        }
        stats
    }

    /// Fold `other` into this index.
    ///
    /// For a document known to both, the positions coming from `other` are
    /// shifted past this index's cursor for that document, exactly as if
    /// `other`'s text had been appended with [`InvertedIndex::add_text`].
    pub fn merge(&mut self, other: InvertedIndex) {
        let InvertedIndex { terms, documents } = other;

        let mut shifts: AHashMap<String, Position> = AHashMap::with_capacity(documents.len());
        for (document, entry) in documents {
            let own = self.documents.entry(document.clone()).or_default();
            shifts.insert(document, own.cursor);
            own.cursor += entry.cursor;
        }

        for (word, postings) in terms {
            let own_postings = self.terms.entry(word).or_default();
            for (document, mut positions) in postings {
                let shift = shifts.get(&document).copied().unwrap_or(0);
                if shift > 0 {
                    positions.iter_mut().for_each(|p| *p += shift);
                }
                match own_postings.get_mut(&document) {
                    Some(existing) => existing.extend(positions),
                    None => {
                        own_postings.insert(document, positions);
                    }
                }
            }
        }

        debug!(
            "Merged index: {} documents, {} words",
            self.documents.len(),
            self.terms.len()
        );
    }

    /// Check the structural invariants of the index.
    ///
    /// Every document referenced by a posting belongs to the universe,
    /// positions are strictly increasing, non-zero, and never exceed the
    /// document's cursor.
    pub fn validate(&self) -> Result<()> {
        for (word, postings) in &self.terms {
            for (document, positions) in postings {
                let entry = self.documents.get(document).ok_or_else(|| {
                    QuarryError::index(format!(
                        "word {word:?} references unknown document {document:?}"
                    ))
                })?;
                if positions.is_empty() {
                    return Err(QuarryError::index(format!(
                        "empty posting list for {word:?} in {document:?}"
                    )));
                }
                let mut previous = 0;
                for &position in positions {
                    if position <= previous || position > entry.cursor {
                        return Err(QuarryError::index(format!(
                            "invalid position {position} for {word:?} in {document:?}"
                        )));
                    }
                    previous = position;
                }
            }
        }
        Ok(())
    }
}
