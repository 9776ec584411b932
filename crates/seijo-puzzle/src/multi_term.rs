//! Multi-word term merging and the comma-list fields that feed it.
//!
//! A phrase such as `"look forward to"` is matched against the token stream
//! and replaced by the compound token `look_forward_to`. The underscore is a
//! pipeline-internal marker; [`underscore_to_space`] turns it back into
//! display text.

/// Joiner used inside compound tokens.
pub const TERM_JOINER: char = '_';

/// Split a comma-separated field, trimming entries and dropping empties.
pub fn parse_comma_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Comma list whose entries are converted to token form: inner whitespace
/// becomes the compound joiner so entries match merged phrase tokens.
pub fn parse_token_list(s: &str) -> Vec<String> {
    parse_comma_list(s)
        .iter()
        .map(|entry| join_words(entry.split_whitespace()))
        .collect()
}

/// Display form of a token.
pub fn underscore_to_space(token: &str) -> String {
    token.replace(TERM_JOINER, " ")
}

/// Merge every configured phrase in `multi_terms` into compound tokens.
///
/// Phrases apply in listed order, each against the output of the previous
/// one, so a later phrase can match a compound an earlier phrase produced.
/// Matching is exact and case-sensitive; single-word phrases are ignored.
pub fn apply_multi_terms(tokens: &[String], multi_terms: &str) -> Vec<String> {
    let mut out = tokens.to_vec();

    for phrase in parse_comma_list(multi_terms) {
        let parts: Vec<&str> = phrase.split_whitespace().collect();
        if parts.len() <= 1 {
            continue;
        }
        out = merge_phrase(&out, &parts);
    }

    out
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Left-to-right, non-overlapping replacement of `parts` in `tokens`.
fn merge_phrase(tokens: &[String], parts: &[&str]) -> Vec<String> {
    let mut merged = Vec::with_capacity(tokens.len());
    let mut i = 0;

    while i < tokens.len() {
        let window = tokens.get(i..i + parts.len());
        let is_match = window.is_some_and(|w| w.iter().zip(parts).all(|(t, p)| t == p));
        if is_match {
            merged.push(join_words(parts.iter().copied()));
            i += parts.len();
        } else {
            merged.push(tokens[i].clone());
            i += 1;
        }
    }

    merged
}

fn join_words<'a>(words: impl Iterator<Item = &'a str>) -> String {
    let mut joined = String::new();
    for (n, word) in words.enumerate() {
        if n > 0 {
            joined.push(TERM_JOINER);
        }
        joined.push_str(word);
    }
    joined
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
