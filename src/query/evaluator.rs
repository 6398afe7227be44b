//! Tree-walking evaluation of parsed queries against an index.
//!
//! Evaluation never fails: unknown words yield empty sets and a phrase whose
//! words are not all indexed for a document simply does not match it.

use log::trace;

use crate::index::{DocumentSet, InvertedIndex};
use crate::query::ast::{Literal, NodeKind, QueryNode};

/// Evaluates query trees against a borrowed index.
#[derive(Debug, Clone, Copy)]
pub struct QueryEvaluator<'a> {
    index: &'a InvertedIndex,
}

impl<'a> QueryEvaluator<'a> {
    /// Create an evaluator for `index`.
    pub fn new(index: &'a InvertedIndex) -> Self {
        QueryEvaluator { index }
    }

    /// Documents matching `node`.
    pub fn evaluate(&self, node: &QueryNode) -> DocumentSet {
        let docs = match &node.kind {
            NodeKind::Literal(literal) => {
                // A negated single word has a direct lookup.
                if node.negated && literal.is_single_word() {
                    let result = self.index.get_complement_of_word(&literal.words[0]);
                    trace!("{node} matched {} documents", result.len());
                    return result;
                }
                self.evaluate_literal(literal)
            }
            NodeKind::And(left, right) => {
                let left = self.evaluate(left);
                if left.is_empty() {
                    left
                } else {
                    left.intersection(&self.evaluate(right))
                }
            }
            NodeKind::Or(left, right) => self.evaluate(left).union(&self.evaluate(right)),
        };

        let result = if node.negated {
            self.index.complement(&docs)
        } else {
            docs
        };
        trace!("{node} matched {} documents", result.len());
        result
    }

    /// Documents containing every word of `literal`, restricted to those
    /// holding the exact phrase when it is quoted.
    fn evaluate_literal(&self, literal: &Literal) -> DocumentSet {
        let mut words = literal.words.iter();
        let Some(first) = words.next() else {
            return DocumentSet::new();
        };

        let mut docs = self.index.get_documents(first);
        for word in words {
            if docs.is_empty() {
                break;
            }
            docs = docs.intersection(&self.index.get_documents(word));
        }

        if literal.phrase && literal.words.len() > 1 {
            docs.retain(|doc| self.index.has_phrase(doc, &literal.words));
        }
        docs
    }
}
