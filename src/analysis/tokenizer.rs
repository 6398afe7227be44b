//! Letter-run tokenizer.
//!
//! A word is a maximal run of letters. Any run of non-letter characters is
//! a separator and contributes nothing, not even a position.
//!
//! # Examples
//!
//! ```
//! use quarry::analysis::tokenizer::LetterRunTokenizer;
//!
//! let tokenizer = LetterRunTokenizer::new();
//! let words: Vec<String> = tokenizer.tokenize("Hello, world-42!").map(|t| t.text).collect();
//! assert_eq!(words, vec!["hello", "world"]);
//! ```

use crate::analysis::token::Token;

/// Returns true if the character can be part of a word.
#[inline]
pub fn is_word_char(c: char) -> bool {
    c.is_alphabetic()
}

/// Lower-case a word the way indexed text is normalized.
pub fn normalize(word: &str) -> String {
    word.to_lowercase()
}

/// A tokenizer that extracts lower-cased runs of letters.
#[derive(Clone, Copy, Debug, Default)]
pub struct LetterRunTokenizer;

impl LetterRunTokenizer {
    /// Create a new letter-run tokenizer.
    pub fn new() -> Self {
        LetterRunTokenizer
    }

    /// Tokenize `text` lazily.
    pub fn tokenize<'a>(&self, text: &'a str) -> LetterRuns<'a> {
        LetterRuns {
            text,
            offset: 0,
            position: 0,
        }
    }

    pub fn name(&self) -> &'static str {
        "letter_run"
    }
}

/// Iterator over the letter runs of a text.
#[derive(Debug, Clone)]
pub struct LetterRuns<'a> {
    text: &'a str,
    offset: usize,
    position: usize,
}

impl Iterator for LetterRuns<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let rest = &self.text[self.offset..];
        let start = self.offset + rest.find(is_word_char)?;
        let end = self.text[start..]
            .find(|c: char| !is_word_char(c))
            .map_or(self.text.len(), |len| start + len);

        self.offset = end;
        let token = Token::with_offsets(
            normalize(&self.text[start..end]),
            self.position,
            start,
            end,
        );
        self.position += 1;
        Some(token)
    }
}
