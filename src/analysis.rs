//! Text analysis for indexed content.
//!
//! Indexed text is reduced to lower-cased runs of letters; everything else
//! separates words and is dropped.

pub mod token;
pub mod tokenizer;

pub use token::Token;
pub use tokenizer::LetterRunTokenizer;
