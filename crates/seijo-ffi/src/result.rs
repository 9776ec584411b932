use std::ffi::CString;
use std::os::raw::c_char;

/// What every `seijo_*` call hands back to the host.
///
/// On success `data` holds JSON: the bank as an array of questions, a
/// puzzle object (or `null` when the sentence has no words), the CSV export
/// as a JSON string, or `{"next_id": n}`. On failure `error` holds a plain
/// message. The host releases the whole envelope with `seijo_free`.
#[repr(C)]
pub struct SeijoResult {
    pub ok: bool,
    /// JSON payload; null when `ok` is false.
    pub data: *mut c_char,
    /// Message; null when `ok` is true.
    pub error: *mut c_char,
}

impl SeijoResult {
    /// Envelope carrying a serialized bank, puzzle or CSV payload.
    pub fn success(json: &str) -> *mut Self {
        Self::boxed(true, to_c_string(json).into_raw(), std::ptr::null_mut())
    }

    /// Envelope carrying an error message for the host to display.
    pub fn failure(message: &str) -> *mut Self {
        Self::boxed(false, std::ptr::null_mut(), to_c_string(message).into_raw())
    }

    fn boxed(ok: bool, data: *mut c_char, error: *mut c_char) -> *mut Self {
        Box::into_raw(Box::new(Self { ok, data, error }))
    }

    /// Release an envelope and whichever string it carries.
    ///
    /// # Safety
    ///
    /// `ptr` must be null or come from [`SeijoResult::success`] or
    /// [`SeijoResult::failure`], and must not have been released before.
    pub unsafe fn free(ptr: *mut Self) {
        if ptr.is_null() {
            return;
        }

        let result = Box::from_raw(ptr);
        for text in [result.data, result.error] {
            if !text.is_null() {
                drop(CString::from_raw(text));
            }
        }
    }
}

/// Interior NUL bytes cannot cross the C boundary; they are dropped.
fn to_c_string(text: &str) -> CString {
    CString::new(text.replace('\0', "")).unwrap_or_default()
}
