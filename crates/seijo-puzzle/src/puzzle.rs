use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Choice
// ---------------------------------------------------------------------------

/// One selectable tile in the choice pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    /// Token form, compound phrases joined with `_`.
    pub t: String,
    /// Display form, `_` replaced by spaces.
    pub text: String,
    /// `true` for a distractor, `false` for a token of the answer.
    pub extra: bool,
}

// ---------------------------------------------------------------------------
// Puzzle
// ---------------------------------------------------------------------------

/// A fill-in-the-blank word-order puzzle derived from one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Puzzle {
    /// Resolved 1-based inclusive blank range after clamping and swapping.
    pub start: usize,
    pub ending: usize,
    /// Merged tokens before the blank range.
    pub prefix: Vec<String>,
    /// Merged tokens after the blank range.
    pub suffix: Vec<String>,
    pub prefix_text: String,
    pub suffix_text: String,
    pub punctuation: Option<char>,
    /// Sentence with one placeholder per answer token.
    pub preview_sentence: String,
    /// Correct token order for the blanks.
    pub answer: Vec<String>,
    /// Answer tokens and distractors, shuffled together.
    pub choices: Vec<Choice>,
}

impl Puzzle {
    /// Number of blanks the player has to fill.
    pub fn blank_count(&self) -> usize {
        self.answer.len()
    }

    /// Whether `attempt` lists exactly the answer tokens in order.
    pub fn is_correct<S: AsRef<str>>(&self, attempt: &[S]) -> bool {
        attempt.len() == self.answer.len()
            && attempt
                .iter()
                .zip(&self.answer)
                .all(|(a, b)| a.as_ref() == b)
    }

    /// Compact form handed to the play page.
    pub fn view(&self) -> PuzzleView {
        PuzzleView {
            prefix_text: self.prefix_text.clone(),
            suffix_text: self.suffix_text.clone(),
            punctuation: self.punctuation.map(String::from).unwrap_or_default(),
            correct: self.answer.clone(),
            options: self
                .choices
                .iter()
                .map(|c| PuzzleOption {
                    t: c.t.clone(),
                    extra: c.extra,
                })
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// PuzzleView
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleOption {
    pub t: String,
    pub extra: bool,
}

/// What the play page consumes: display text around the blanks, the
/// ordered answer and the shuffled options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleView {
    pub prefix_text: String,
    pub suffix_text: String,
    /// Empty when the sentence had no trailing mark.
    pub punctuation: String,
    pub correct: Vec<String>,
    pub options: Vec<PuzzleOption>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
