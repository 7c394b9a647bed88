//! FFI layer for the desktop editors.
//!
//! C-compatible functions callable from Python (`ctypes`), C# or any other
//! host with a C FFI. All data crosses the boundary as JSON strings.
//!
//! # Memory Management
//!
//! - Strings returned by `dealer_*` functions are allocated by Rust
//! - Caller must free them with `dealer_string_free`
//! - `dealer_version` returns a static string that must not be freed
//!
//! # Error Handling
//!
//! Functions return JSON with either:
//! - `{"ok": <result>}` on success
//! - `{"error": "<message>"}` on failure

use crate::{
    reconcile::{ConflictDecision, ConflictPolicy, ConflictResolver, Reconciler},
    split::{sanitize_filename, split_document, SplitMode},
    DealerCollection, LoadOutcome, Loader, ReconciliationReport, SourceDocument,
};
use serde_json::Value;
use std::ffi::{c_char, c_void, CStr, CString};
use std::ptr;

/// Conflict callback for `dealer_merge`.
///
/// Receives the conflicting dealer name and the caller's `user_data`.
/// Return 0 to overwrite, 1 to keep the existing dealer, anything else to
/// cancel the merge.
pub type DealerConflictCallback =
    unsafe extern "C" fn(name: *const c_char, user_data: *mut c_void) -> i32;

/// Result wrapper for FFI responses.
#[derive(serde::Serialize)]
#[serde(untagged)]
enum FfiResult<T: serde::Serialize> {
    Ok { ok: T },
    Err { error: String },
}

impl<T: serde::Serialize> FfiResult<T> {
    fn ok(value: T) -> Self {
        FfiResult::Ok { ok: value }
    }

    fn err(message: impl Into<String>) -> Self {
        FfiResult::Err {
            error: message.into(),
        }
    }

    fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|e| format!(r#"{{"error":"serialization failed: {}"}}"#, e))
    }
}

/// Merge output as handed to the host.
#[derive(serde::Serialize)]
struct MergeResponse {
    collection: DealerCollection,
    report: ReconciliationReport,
}

struct CallbackResolver {
    callback: DealerConflictCallback,
    user_data: *mut c_void,
}

impl ConflictResolver for CallbackResolver {
    fn resolve(&mut self, name: &str) -> ConflictDecision {
        let Ok(c_name) = CString::new(name) else {
            return ConflictDecision::Cancel;
        };
        // SAFETY: the caller of `dealer_merge` vouches for the callback and user_data
        match unsafe { (self.callback)(c_name.as_ptr(), self.user_data) } {
            0 => ConflictDecision::Overwrite,
            1 => ConflictDecision::Keep,
            _ => ConflictDecision::Cancel,
        }
    }
}

/// Convert a Rust string to a C string pointer.
/// Caller must free with `dealer_string_free`.
fn to_c_string(s: String) -> *mut c_char {
    match CString::new(s) {
        Ok(cs) => cs.into_raw(),
        Err(_) => CString::from(c"{\"error\":\"string contained null bytes\"}").into_raw(),
    }
}

/// Convert a C string pointer to a Rust string.
/// Returns None if pointer is null or invalid UTF-8.
unsafe fn from_c_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

unsafe fn parse_json(ptr: *const c_char, what: &str) -> Result<Value, String> {
    let text = from_c_string(ptr).ok_or_else(|| format!("invalid {what} string"))?;
    serde_json::from_str(&text).map_err(|e| format!("parse error in {what}: {e}"))
}

fn error_json(message: impl Into<String>) -> *mut c_char {
    to_c_string(FfiResult::<()>::err(message).to_json())
}

/// Free a string allocated by the engine.
///
/// # Safety
/// - `s` must be a valid pointer from a `dealer_*` function
/// - Must not be called twice on the same pointer
#[no_mangle]
pub unsafe extern "C" fn dealer_string_free(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

/// Get the engine version.
#[no_mangle]
pub extern "C" fn dealer_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

/// Sanitize a dealer name into a filename key.
///
/// # Returns
/// Plain string (not JSON), or null if `name` is null or not UTF-8.
///
/// # Safety
/// - `name` must be a valid null-terminated C string or null
/// - Caller must free the returned string with `dealer_string_free`
#[no_mangle]
pub unsafe extern "C" fn dealer_sanitize_filename(name: *const c_char) -> *mut c_char {
    match from_c_string(name) {
        Some(name) => to_c_string(sanitize_filename(&name)),
        None => ptr::null_mut(),
    }
}

/// Merge a document into a base collection.
///
/// # Arguments
/// - `base_json`: collection document
/// - `incoming_json`: collection or single-dealer document
/// - `policy`: `overwrite`, `keepExisting`, `mergeFields`, `reject` or
///   `promptPerConflict`
/// - `callback`: required for `promptPerConflict`, ignored otherwise
/// - `user_data`: passed through to `callback`
///
/// # Returns
/// JSON string: `{"ok": {"collection": ..., "report": ...}}` or `{"error": "message"}`
///
/// # Safety
/// - String arguments must be valid null-terminated C strings or null
/// - `callback`, if given, must be safe to call with `user_data`
/// - Caller must free the returned string with `dealer_string_free`
#[no_mangle]
pub unsafe extern "C" fn dealer_merge(
    base_json: *const c_char,
    incoming_json: *const c_char,
    policy: *const c_char,
    callback: Option<DealerConflictCallback>,
    user_data: *mut c_void,
) -> *mut c_char {
    let base_value = match parse_json(base_json, "base") {
        Ok(v) => v,
        Err(e) => return error_json(e),
    };
    let incoming = match parse_json(incoming_json, "incoming") {
        Ok(v) => v,
        Err(e) => return error_json(e),
    };
    let policy: ConflictPolicy = match from_c_string(policy)
        .map(Value::String)
        .map(serde_json::from_value)
    {
        Some(Ok(p)) => p,
        _ => return error_json("unknown conflict policy"),
    };

    let loader = Loader::default();
    let mut report = ReconciliationReport::new();
    let base = match loader.load(base_value) {
        LoadOutcome::Collection {
            collection,
            rejected,
        } => {
            for err in rejected {
                report.record_skipped("base", err);
            }
            collection
        }
        LoadOutcome::SingleDealer(_) => {
            return error_json("base must be a collection, found a single dealer")
        }
        LoadOutcome::Invalid(e) => return error_json(format!("invalid base: {e}")),
    };

    let mut resolver = callback.map(|callback| CallbackResolver {
        callback,
        user_data,
    });
    let mut reconciler = Reconciler::new(&base, policy);
    if let Some(resolver) = resolver.as_mut() {
        reconciler = reconciler.with_resolver(resolver);
    }

    let documents = vec![SourceDocument::new("incoming", incoming)];
    if let Err(e) = reconciler.merge_documents(&loader, documents) {
        return error_json(e.to_string());
    }

    let (collection, merge_report) = reconciler.finish();
    report.absorb(merge_report);
    to_c_string(FfiResult::ok(MergeResponse { collection, report }).to_json())
}

/// Split a collection into one document per dealer.
///
/// # Arguments
/// - `collection_json`: collection document
/// - `wrapped`: wrap each dealer with the collection's other keys
///
/// # Returns
/// JSON string: `{"ok": SplitOutput}` or `{"error": "message"}`
///
/// # Safety
/// - `collection_json` must be a valid null-terminated C string or null
/// - Caller must free the returned string with `dealer_string_free`
#[no_mangle]
pub unsafe extern "C" fn dealer_split(collection_json: *const c_char, wrapped: bool) -> *mut c_char {
    let value = match parse_json(collection_json, "collection") {
        Ok(v) => v,
        Err(e) => return error_json(e),
    };

    let mode = if wrapped {
        SplitMode::Wrapped
    } else {
        SplitMode::Bare
    };
    match split_document(value, mode) {
        Ok(output) => to_c_string(FfiResult::ok(output).to_json()),
        Err(e) => error_json(e.to_string()),
    }
}

/// Combine documents into one collection.
///
/// # Arguments
/// - `documents_json`: JSON array of documents; errors are labelled
///   `documents[i]`
///
/// # Returns
/// JSON string: `{"ok": {"collection": ..., "report": ...}}` or `{"error": "message"}`
///
/// # Safety
/// - `documents_json` must be a valid null-terminated C string or null
/// - Caller must free the returned string with `dealer_string_free`
#[no_mangle]
pub unsafe extern "C" fn dealer_combine(documents_json: *const c_char) -> *mut c_char {
    let documents = match parse_json(documents_json, "documents") {
        Ok(Value::Array(docs)) => docs,
        Ok(_) => return error_json("documents must be a JSON array"),
        Err(e) => return error_json(e),
    };

    let (collection, report) = crate::combine(
        documents
            .into_iter()
            .enumerate()
            .map(|(i, value)| SourceDocument::new(format!("documents[{i}]"), value)),
    );
    to_c_string(FfiResult::ok(MergeResponse { collection, report }).to_json())
}
