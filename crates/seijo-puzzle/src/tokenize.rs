//! Whitespace tokenizer for example sentences.
//!
//! Tokenization rules:
//! - Runs of whitespace collapse; tokens are the space-separated pieces.
//! - A single trailing `.`, `!` or `?` on the last token is detached as the
//!   sentence punctuation. If nothing precedes it, the last token is dropped.
//! - Nothing else is special: commas and quotes stay attached to their word.
//!
//! Example:
//!   "Well, I   said no!" →
//!   [Well,][I][said][no] + '!'

use serde::{Deserialize, Serialize};

/// Marks detached from the end of a sentence.
pub const SENTENCE_MARKS: [char; 3] = ['.', '!', '?'];

/// Output of [`tokenize`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tokenized {
    /// Word tokens in sentence order.
    pub tokens: Vec<String>,
    /// Trailing sentence mark, if one was detached.
    pub punctuation: Option<char>,
}

impl Tokenized {
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Split `sentence` into word tokens plus optional trailing punctuation.
pub fn tokenize(sentence: &str) -> Tokenized {
    let mut tokens: Vec<String> = sentence.split_whitespace().map(str::to_owned).collect();

    let mut punctuation = None;
    if let Some(last) = tokens.last_mut() {
        if let Some(mark) = last.chars().last().filter(|c| SENTENCE_MARKS.contains(c)) {
            punctuation = Some(mark);
            last.pop();
            if last.is_empty() {
                tokens.pop();
            }
        }
    }

    Tokenized {
        tokens,
        punctuation,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
