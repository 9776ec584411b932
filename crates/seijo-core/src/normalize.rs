//! Bank normalization: coerce loosely-typed records into canonical
//! [`Question`]s and keep `example_id` unique.
//!
//! Rules:
//! - Non-object records are skipped.
//! - Strings are trimmed; integers go through a leading-prefix parse, then
//!   a clamp, with a fallback when nothing parses.
//! - `show_jp` follows JavaScript-style truthiness.
//! - `updated_at` is kept when present, otherwise stamped with `now`.
//! - A blank or already-used id is replaced by `max numeric id + 1`, computed
//!   over the entries accepted so far. Existing entries never move.

use std::collections::HashSet;

use chrono::{Local, SecondsFormat, Utc};
use serde_json::Value;
use tracing::debug;

use crate::config::BankConfig;
use crate::question::Question;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Normalize raw records with the default configuration and the current
/// time as the fallback timestamp.
pub fn normalize_bank<'a, I>(records: I) -> Vec<Question>
where
    I: IntoIterator<Item = &'a Value>,
{
    normalize_bank_with(records, &BankConfig::default(), &now_iso())
}

/// Normalize raw records against an explicit configuration and timestamp.
///
/// Output order matches input order. Running this on its own output is a
/// no-op.
pub fn normalize_bank_with<'a, I>(records: I, config: &BankConfig, now: &str) -> Vec<Question>
where
    I: IntoIterator<Item = &'a Value>,
{
    let mut out: Vec<Question> = Vec::new();
    let mut used: HashSet<String> = HashSet::new();

    for (index, record) in records.into_iter().enumerate() {
        let Some(mut question) = Question::coerce(record, config, now) else {
            debug!(index, "skipping non-object bank record");
            continue;
        };

        if question.example_id.is_empty() {
            question.example_id = next_id(&out);
            debug!(index, id = %question.example_id, "assigned id to blank record");
        }

        if used.contains(&question.example_id) {
            let fresh = next_id(&out);
            debug!(
                index,
                duplicate = %question.example_id,
                id = %fresh,
                "re-assigned colliding id"
            );
            question.example_id = fresh;
        }

        used.insert(question.example_id.clone());
        out.push(question);
    }

    out
}

/// Re-normalize an already typed bank, e.g. one edited in place by a caller.
pub fn normalize_questions(bank: &[Question]) -> Vec<Question> {
    let values: Vec<Value> = bank.iter().map(Question::to_value).collect();
    normalize_bank(&values)
}

/// Next free id for `accepted`: one more than the largest numeric id.
///
/// Ids count as numeric when a leading integer prefix parses, so `"12a"`
/// counts as 12 and `"abc"` does not count at all. Ids beyond `i64` parse as
/// `i64::MAX`, so the candidate is bumped until no accepted entry holds it.
pub fn next_id(accepted: &[Question]) -> String {
    let mut candidate = i128::from(max_numeric_id(accepted)) + 1;
    loop {
        let id = candidate.to_string();
        if !accepted.iter().any(|q| q.example_id == id) {
            return id;
        }
        candidate += 1;
    }
}

/// Next id an editor should propose for a new entry in `bank`.
pub fn next_auto_id(bank: &[Question]) -> u64 {
    let normalized = normalize_questions(bank);
    next_id(&normalized).parse().unwrap_or(u64::MAX)
}

/// Current UTC time, RFC 3339 with millisecond precision.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Today's local date as `YYYYMMDD`, used to stamp export file names.
pub fn today_ymd() -> String {
    Local::now().format("%Y%m%d").to_string()
}

// ---------------------------------------------------------------------------
// Coercion
// ---------------------------------------------------------------------------

impl Question {
    /// Build a canonical question from a loosely-typed record.
    ///
    /// Returns `None` only when `record` is not a JSON object; every other
    /// input produces a value, with fallbacks for anything unparseable.
    /// `example_id` may come back empty; [`normalize_bank_with`] assigns it.
    pub fn coerce(record: &Value, config: &BankConfig, now: &str) -> Option<Self> {
        let fields = record.as_object()?;
        let text = |key: &str| coerce_string(fields.get(key)).trim().to_string();

        let updated_at = if is_truthy(fields.get("updated_at")) {
            coerce_string(fields.get("updated_at"))
        } else {
            now.to_string()
        };

        Some(Self {
            example_id: text("example_id"),
            en_sentence: text("en_sentence"),
            ja_translation: text("ja_translation"),
            multi_terms: text("multi_terms"),
            start: clamp_int(fields.get("start"), 1, config.index_ceiling, 1),
            ending: clamp_int(fields.get("ending"), 0, config.index_ceiling, 0),
            missing_words: text("missing_words"),
            extra_words: text("extra_words"),
            show_jp: is_truthy(fields.get("show_jp")),
            updated_at,
        })
    }
}

/// Textual form of a record field; absent and `null` become empty.
pub fn coerce_string(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => number_text(n),
        Some(other) => other.to_string(),
    }
}

/// JavaScript-style truthiness of a record field.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Parse a field as an integer and clamp it into `[min, max]`; `fallback`
/// when nothing parses.
pub fn clamp_int(value: Option<&Value>, min: i64, max: i64, fallback: i64) -> i64 {
    let parsed = match value {
        Some(Value::Number(n)) => number_int(n),
        Some(Value::String(s)) => parse_int_prefix(s),
        _ => None,
    };
    match parsed {
        Some(n) => n.max(min).min(max),
        None => fallback,
    }
}

/// Parse the leading decimal integer of `s`.
///
/// Leading whitespace and one sign are accepted, trailing text is ignored.
/// Values beyond `i64` saturate.
pub fn parse_int_prefix(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut value: i64 = 0;
    let mut seen_digit = false;
    for b in digits.bytes() {
        if !b.is_ascii_digit() {
            break;
        }
        seen_digit = true;
        let digit = i64::from(b - b'0');
        value = if negative {
            value.saturating_mul(10).saturating_sub(digit)
        } else {
            value.saturating_mul(10).saturating_add(digit)
        };
    }

    seen_digit.then_some(value)
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn max_numeric_id(bank: &[Question]) -> i64 {
    bank.iter()
        .filter_map(|q| parse_int_prefix(q.example_id.trim()))
        .fold(0, i64::max)
}

fn number_int(n: &serde_json::Number) -> Option<i64> {
    if let Some(i) = n.as_i64() {
        return Some(i);
    }
    if n.as_u64().is_some() {
        return Some(i64::MAX);
    }
    // `as` saturates for out-of-range floats.
    n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)
}

fn number_text(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => (f as i64).to_string(),
        _ => n.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
