use std::os::raw::c_char;
use std::sync::OnceLock;

use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;

use seijo_core::{normalize_bank, now_iso, BankConfig, BankRepository, Question, SqliteStore};
use seijo_csv::{from_csv, to_csv};
use seijo_puzzle::build_puzzle;

use crate::marshal::{cstring_to_str, deserialize_json, json_result};
use crate::result::SeijoResult;

// ---------------------------------------------------------------------------
// Global bank repository
// ---------------------------------------------------------------------------

static BANK: OnceLock<BankRepository<SqliteStore>> = OnceLock::new();

/// Return the global repository, or an error string if `seijo_init` has not
/// been called yet.
fn get_bank() -> Result<&'static BankRepository<SqliteStore>, String> {
    BANK.get()
        .ok_or_else(|| "Bank not initialized. Call seijo_init first.".to_string())
}

fn install_repository(store: SqliteStore) -> *mut SeijoResult {
    if BANK
        .set(BankRepository::new(store, BankConfig::default()))
        .is_err()
    {
        return SeijoResult::failure(
            "Bank already initialized; seijo_init may only be called once.",
        );
    }
    SeijoResult::success("{}")
}

/// Install a fmt subscriber honouring `RUST_LOG` (default `info`). A host
/// that already installed one keeps it.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Parse `json` as an array of loosely-typed records.
fn parse_records(json: &str) -> Result<Vec<Value>, String> {
    match deserialize_json::<Value>(json)? {
        Value::Array(records) => Ok(records),
        _ => Err("expected a JSON array of questions".to_string()),
    }
}

// ---------------------------------------------------------------------------
// Memory management
// ---------------------------------------------------------------------------

/// Free a `SeijoResult` that was returned by any `seijo_*` function.
///
/// Passing a null pointer is a no-op.
///
/// # Safety
///
/// `ptr` must be either null or a valid pointer that was previously returned
/// by one of the `seijo_*` functions and has not yet been freed.
#[no_mangle]
pub unsafe extern "C" fn seijo_free(ptr: *mut SeijoResult) {
    SeijoResult::free(ptr);
}

// ---------------------------------------------------------------------------
// Bank persistence
// ---------------------------------------------------------------------------

/// Open (or create) the SQLite-backed bank at `db_path` and set up logging.
///
/// Returns `data = "{}"` on success. The returned pointer must be freed with
/// `seijo_free`.
///
/// # Safety
///
/// `db_path` must be a valid, non-null, null-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn seijo_init(db_path: *const c_char) -> *mut SeijoResult {
    init_tracing();

    let path = match cstring_to_str(db_path) {
        Ok(s) => s,
        Err(e) => return SeijoResult::failure(&e),
    };

    match SqliteStore::open(&path) {
        Ok(store) => {
            info!(path = %path, "bank store opened");
            install_repository(store)
        }
        Err(e) => SeijoResult::failure(&e.to_string()),
    }
}

/// Load the normalized bank as a JSON array of questions.
///
/// Unreadable stored data yields `[]`; only a missing `seijo_init` fails.
/// The returned pointer must be freed with `seijo_free`.
#[no_mangle]
pub extern "C" fn seijo_read_bank() -> *mut SeijoResult {
    match get_bank() {
        Ok(bank) => json_result(&bank.read()),
        Err(e) => SeijoResult::failure(&e),
    }
}

/// Normalize and persist a JSON array of question records.
///
/// Returns the canonical bank that was written. The returned pointer must
/// be freed with `seijo_free`.
///
/// # Safety
///
/// `json_ptr` must be a valid, non-null, null-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn seijo_write_bank(json_ptr: *const c_char) -> *mut SeijoResult {
    let json = match cstring_to_str(json_ptr) {
        Ok(s) => s,
        Err(e) => return SeijoResult::failure(&e),
    };

    let records = match parse_records(&json) {
        Ok(r) => r,
        Err(e) => return SeijoResult::failure(&e),
    };

    let repo = match get_bank() {
        Ok(r) => r,
        Err(e) => return SeijoResult::failure(&e),
    };

    match repo.write_records(&records) {
        Ok(written) => json_result(&written),
        Err(e) => SeijoResult::failure(&format!("failed to write bank: {}", e)),
    }
}

/// Next id an editor should propose, as `{"next_id": n}`.
///
/// The returned pointer must be freed with `seijo_free`.
#[no_mangle]
pub extern "C" fn seijo_next_auto_id() -> *mut SeijoResult {
    match get_bank() {
        Ok(bank) => json_result(&serde_json::json!({ "next_id": bank.next_auto_id() })),
        Err(e) => SeijoResult::failure(&e),
    }
}

// ---------------------------------------------------------------------------
// Puzzle
// ---------------------------------------------------------------------------

/// Build a puzzle from one question record (JSON object).
///
/// `data` is the puzzle JSON, or `null` when the sentence has no tokens.
/// The returned pointer must be freed with `seijo_free`.
///
/// # Safety
///
/// `question_ptr` must be a valid, non-null, null-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn seijo_build_puzzle(question_ptr: *const c_char) -> *mut SeijoResult {
    let json = match cstring_to_str(question_ptr) {
        Ok(s) => s,
        Err(e) => return SeijoResult::failure(&e),
    };

    let record: Value = match deserialize_json(&json) {
        Ok(v) => v,
        Err(e) => return SeijoResult::failure(&e),
    };

    let question = match Question::coerce(&record, &BankConfig::default(), &now_iso()) {
        Some(q) => q,
        None => return SeijoResult::failure("expected a JSON object question"),
    };

    json_result(&build_puzzle(&question))
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// Encode a JSON array of question records as CSV text.
///
/// `data` is the CSV text as a JSON string. The returned pointer must be
/// freed with `seijo_free`.
///
/// # Safety
///
/// `json_ptr` must be a valid, non-null, null-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn seijo_bank_to_csv(json_ptr: *const c_char) -> *mut SeijoResult {
    let json = match cstring_to_str(json_ptr) {
        Ok(s) => s,
        Err(e) => return SeijoResult::failure(&e),
    };

    let records = match parse_records(&json) {
        Ok(r) => r,
        Err(e) => return SeijoResult::failure(&e),
    };

    json_result(&to_csv(&normalize_bank(&records)))
}

/// Decode CSV text into a normalized JSON array of questions.
///
/// The returned pointer must be freed with `seijo_free`.
///
/// # Safety
///
/// `csv_ptr` must be a valid, non-null, null-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn seijo_bank_from_csv(csv_ptr: *const c_char) -> *mut SeijoResult {
    match cstring_to_str(csv_ptr) {
        Ok(text) => json_result(&from_csv(&text)),
        Err(e) => SeijoResult::failure(&e),
    }
}

// ---------------------------------------------------------------------------
// In-memory init (test-only)
// ---------------------------------------------------------------------------

#[cfg(test)]
pub fn seijo_init_memory() -> *mut SeijoResult {
    match SqliteStore::open_in_memory() {
        Ok(store) => install_repository(store),
        Err(e) => SeijoResult::failure(&e.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::{CStr, CString};

    fn to_cstr(s: &str) -> CString {
        CString::new(s).expect("CString::new")
    }

    /// Take the payload of a result, freeing the envelope.
    unsafe fn take(ptr: *mut SeijoResult) -> Result<String, String> {
        assert!(!ptr.is_null());
        let out = if (*ptr).ok {
            Ok(CStr::from_ptr((*ptr).data).to_string_lossy().into_owned())
        } else {
            Err(CStr::from_ptr((*ptr).error).to_string_lossy().into_owned())
        };
        SeijoResult::free(ptr);
        out
    }

    // -----------------------------------------------------------------------
    // Test: seijo_free does not panic on null
    // -----------------------------------------------------------------------

    #[test]
    fn free_null_is_noop() {
        unsafe { seijo_free(std::ptr::null_mut()) };
    }

    #[test]
    fn null_argument_returns_failure() {
        unsafe {
            assert!(take(seijo_build_puzzle(std::ptr::null())).is_err());
            assert!(take(seijo_write_bank(std::ptr::null())).is_err());
            assert!(take(seijo_bank_from_csv(std::ptr::null())).is_err());
        }
    }

    // -----------------------------------------------------------------------
    // Test: puzzle building
    // -----------------------------------------------------------------------

    #[test]
    fn build_puzzle_returns_puzzle_json() {
        let q = to_cstr(
            r#"{"example_id":"1","en_sentence":"The cat sat on the mat.","start":"1","ending":6,"extra_words":"dog,runs"}"#,
        );
        let data = unsafe { take(seijo_build_puzzle(q.as_ptr())) }.expect("ok");
        let puzzle: Value = serde_json::from_str(&data).unwrap();
        assert_eq!(puzzle["preview_sentence"], "____ ____ ____ ____ ____ ____.");
        assert_eq!(puzzle["choices"].as_array().unwrap().len(), 8);
        assert_eq!(puzzle["punctuation"], ".");
    }

    #[test]
    fn build_puzzle_signals_unbuildable_with_null() {
        let q = to_cstr(r#"{"en_sentence":"   "}"#);
        let data = unsafe { take(seijo_build_puzzle(q.as_ptr())) }.expect("ok");
        assert_eq!(data, "null");
    }

    #[test]
    fn build_puzzle_rejects_non_object() {
        let q = to_cstr("[1,2]");
        assert!(unsafe { take(seijo_build_puzzle(q.as_ptr())) }.is_err());
        let q = to_cstr("{broken");
        assert!(unsafe { take(seijo_build_puzzle(q.as_ptr())) }.is_err());
    }

    // -----------------------------------------------------------------------
    // Test: CSV conversion
    // -----------------------------------------------------------------------

    #[test]
    fn csv_round_trip_through_ffi() {
        let bank = to_cstr(r#"[{"example_id":"","en_sentence":"Hi, you.","show_jp":true}]"#);
        let csv_json = unsafe { take(seijo_bank_to_csv(bank.as_ptr())) }.expect("to csv");
        let csv: String = serde_json::from_str(&csv_json).unwrap();
        assert!(csv.contains("1,\"Hi, you.\""));

        let csv_c = to_cstr(&csv);
        let back = unsafe { take(seijo_bank_from_csv(csv_c.as_ptr())) }.expect("from csv");
        let questions: Vec<Question> = serde_json::from_str(&back).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].example_id, "1");
        assert_eq!(questions[0].en_sentence, "Hi, you.");
        assert!(questions[0].show_jp);
    }

    #[test]
    fn bank_to_csv_rejects_non_array() {
        let bad = to_cstr(r#"{"example_id":"1"}"#);
        assert!(unsafe { take(seijo_bank_to_csv(bad.as_ptr())) }.is_err());
    }

    // -----------------------------------------------------------------------
    // Test: persistence (shares the process-wide repository)
    // -----------------------------------------------------------------------

    #[test]
    fn write_then_read_bank() {
        // Another test run in this process may already have initialized it.
        let _ = unsafe { take(seijo_init_memory()) };

        let bank = to_cstr(
            r#"[{"example_id":7,"en_sentence":" Seven. ","start":"2"},"junk",{"example_id":"7"}]"#,
        );
        let written = unsafe { take(seijo_write_bank(bank.as_ptr())) }.expect("write");
        let written: Vec<Question> = serde_json::from_str(&written).unwrap();
        assert_eq!(written.len(), 2);
        assert_eq!(written[0].example_id, "7");
        assert_eq!(written[0].en_sentence, "Seven.");
        assert_eq!(written[0].start, 2);
        assert_eq!(written[1].example_id, "8");

        let read = unsafe { take(seijo_read_bank()) }.expect("read");
        let read: Vec<Question> = serde_json::from_str(&read).unwrap();
        assert_eq!(read, written);

        let next = unsafe { take(seijo_next_auto_id()) }.expect("next id");
        assert_eq!(next, r#"{"next_id":9}"#);
    }

    #[test]
    fn write_bank_rejects_non_array() {
        let bad = to_cstr("42");
        assert!(unsafe { take(seijo_write_bank(bad.as_ptr())) }.is_err());
    }
}
