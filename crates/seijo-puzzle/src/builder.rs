//! Puzzle construction.
//!
//! [`PuzzleBuilder`] is the primary entry point. It reads a [`Question`],
//! never mutates it, and returns a fresh [`Puzzle`] or `None` when the
//! sentence has no tokens.

use tracing::debug;

use seijo_core::Question;

use crate::multi_term::{apply_multi_terms, parse_token_list, underscore_to_space};
use crate::puzzle::{Choice, Puzzle};
use crate::random::{shuffle, RandomSource, RngSource};
use crate::tokenize::tokenize;

// ---------------------------------------------------------------------------
// PuzzleConfig
// ---------------------------------------------------------------------------

/// Runtime configuration for the puzzle builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PuzzleConfig {
    /// Placeholder rendered once per answer token in the preview.
    /// Default: `"____"`.
    pub blank: String,
}

impl Default for PuzzleConfig {
    fn default() -> Self {
        Self {
            blank: "____".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// PuzzleBuilder
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct PuzzleBuilder {
    config: PuzzleConfig,
}

impl PuzzleBuilder {
    pub fn new(config: PuzzleConfig) -> Self {
        Self { config }
    }

    /// Build a puzzle for `question`, drawing shuffles from `rng`.
    ///
    /// # Steps
    /// 1. Tokenize the sentence and merge multi-word terms.
    /// 2. Clamp `start` to `[1, N]` and `ending` to `[0, N]`; 0 means `N`.
    ///    Swap when `start > ending`.
    /// 3. Split into prefix, blank range and suffix.
    /// 4. Remove the first remaining match of each missing word from the
    ///    blank range; what is left is the answer.
    /// 5. Shuffle the answer, append distractors, shuffle the whole pool.
    /// 6. Render prefix/suffix text and the preview sentence.
    pub fn build<R: RandomSource + ?Sized>(&self, question: &Question, rng: &mut R) -> Option<Puzzle> {
        let tokenized = tokenize(&question.en_sentence);
        let merged = apply_multi_terms(&tokenized.tokens, &question.multi_terms);
        let n = merged.len();

        if n == 0 {
            debug!(example_id = %question.example_id, "sentence has no tokens; no puzzle");
            return None;
        }

        let (start, ending) = resolve_range(question.start, question.ending, n);

        let prefix = merged[..start - 1].to_vec();
        let mut middle = merged[start - 1..ending].to_vec();
        let suffix = merged[ending..].to_vec();

        for missing in parse_token_list(&question.missing_words) {
            if let Some(idx) = middle.iter().position(|t| *t == missing) {
                middle.remove(idx);
            }
        }
        let answer = middle;

        let mut pool: Vec<Choice> = shuffle(&answer, rng)
            .into_iter()
            .map(|t| make_choice(t, false))
            .collect();
        pool.extend(
            parse_token_list(&question.extra_words)
                .into_iter()
                .map(|t| make_choice(t, true)),
        );
        let choices = shuffle(&pool, rng);

        let prefix_text = display_text(&prefix);
        let suffix_text = display_text(&suffix);
        let blanks = vec![self.config.blank.as_str(); answer.len()].join(" ");

        let mut preview_sentence = [prefix_text.as_str(), blanks.as_str(), suffix_text.as_str()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if let Some(mark) = tokenized.punctuation {
            preview_sentence.push(mark);
        }

        Some(Puzzle {
            start,
            ending,
            prefix,
            suffix,
            prefix_text,
            suffix_text,
            punctuation: tokenized.punctuation,
            preview_sentence,
            answer,
            choices,
        })
    }
}

/// Build with the default configuration and a thread-local generator.
pub fn build_puzzle(question: &Question) -> Option<Puzzle> {
    PuzzleBuilder::default().build(question, &mut RngSource::thread())
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Resolve the stored range against `n` tokens into a valid 1-based
/// inclusive `(start, ending)` with `1 <= start <= ending <= n`.
fn resolve_range(start: i64, ending: i64, n: usize) -> (usize, usize) {
    let n_i = i64::try_from(n).unwrap_or(i64::MAX);
    let mut start = start.clamp(1, n_i);
    let mut ending = ending.clamp(0, n_i);
    if ending <= 0 {
        ending = n_i;
    }
    if start > ending {
        std::mem::swap(&mut start, &mut ending);
    }
    // Both values now lie in [1, n], which fits in usize.
    (start as usize, ending as usize)
}

fn make_choice(t: String, extra: bool) -> Choice {
    Choice {
        text: underscore_to_space(&t),
        t,
        extra,
    }
}

fn display_text(tokens: &[String]) -> String {
    tokens
        .iter()
        .map(|t| underscore_to_space(t))
        .collect::<Vec<_>>()
        .join(" ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
