use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

// ---------------------------------------------------------------------------
// Question
// ---------------------------------------------------------------------------

/// One bank entry: a bilingual example sentence plus the settings that turn
/// it into a word-order puzzle.
///
/// Values of this type are only produced by the normalizer (see
/// [`crate::normalize`]), so every field always carries its declared type and
/// `example_id` is unique within the bank it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Non-empty identifier, unique within a bank. Usually numeric.
    pub example_id: String,
    /// Source sentence the puzzle is built from.
    pub en_sentence: String,
    /// Free-text translation shown alongside the puzzle.
    pub ja_translation: String,
    /// Comma-separated multi-word phrases, merged in listed order.
    pub multi_terms: String,
    /// 1-based inclusive first token of the blank range.
    pub start: i64,
    /// 1-based inclusive last token of the blank range; 0 means "to the end".
    pub ending: i64,
    /// Comma-separated tokens removed from the blank range.
    pub missing_words: String,
    /// Comma-separated distractor tokens added to the choices.
    pub extra_words: String,
    /// Whether the translation is shown while playing.
    pub show_jp: bool,
    /// RFC 3339 timestamp of the last normalization that stamped it.
    pub updated_at: String,
}

impl Default for Question {
    fn default() -> Self {
        Self {
            example_id: String::new(),
            en_sentence: String::new(),
            ja_translation: String::new(),
            multi_terms: String::new(),
            start: 1,
            ending: 0,
            missing_words: String::new(),
            extra_words: String::new(),
            show_jp: false,
            updated_at: String::new(),
        }
    }
}

/// Column order shared by the JSON record shape and the CSV interchange
/// format. `updated_at` is deliberately absent from CSV.
pub const QUESTION_FIELDS: [&str; 9] = [
    "example_id",
    "en_sentence",
    "ja_translation",
    "multi_terms",
    "start",
    "ending",
    "missing_words",
    "extra_words",
    "show_jp",
];

impl Question {
    /// Render this question as a loosely-typed record, the same shape the
    /// normalizer accepts from storage.
    pub fn to_value(&self) -> Value {
        json!({
            "example_id": self.example_id,
            "en_sentence": self.en_sentence,
            "ja_translation": self.ja_translation,
            "multi_terms": self.multi_terms,
            "start": self.start,
            "ending": self.ending,
            "missing_words": self.missing_words,
            "extra_words": self.extra_words,
            "show_jp": self.show_jp,
            "updated_at": self.updated_at,
        })
    }

    /// Textual value of a CSV column, or `None` for an unknown column name.
    pub fn field_text(&self, field: &str) -> Option<String> {
        let text = match field {
            "example_id" => self.example_id.clone(),
            "en_sentence" => self.en_sentence.clone(),
            "ja_translation" => self.ja_translation.clone(),
            "multi_terms" => self.multi_terms.clone(),
            "start" => self.start.to_string(),
            "ending" => self.ending.to_string(),
            "missing_words" => self.missing_words.clone(),
            "extra_words" => self.extra_words.clone(),
            "show_jp" => self.show_jp.to_string(),
            "updated_at" => self.updated_at.clone(),
            _ => return None,
        };
        Some(text)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
