// SPDX-License-Identifier: MPL-2.0
//! Request body sanitization for traces.
//!
//! Bodies are flattened to a single line and any `password` field of a JSON
//! object is masked before the body reaches a trace file.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

/// Replacement for masked values.
pub const MASK: &str = "********";

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace regex should compile"));

/// Sanitizes a request body for tracing.
///
/// Runs of whitespace collapse to a single space. When the result is a JSON
/// object, fields named `password` (any case) are masked and the object is
/// rendered compactly; anything else is returned as collapsed text.
///
/// # Examples
///
/// ```
/// use image_page::diagnostics::sanitize_request_body;
///
/// let body = br#"{ "user": "ann",
///                  "Password": "hunter2" }"#;
/// let clean = sanitize_request_body(body);
/// assert!(!clean.contains("hunter2"));
/// assert!(clean.contains(r#""user":"ann""#));
/// ```
#[must_use]
pub fn sanitize_request_body(data: &[u8]) -> String {
    let text = String::from_utf8_lossy(data);
    let collapsed = WHITESPACE.replace_all(&text, " ");

    let Ok(Value::Object(mut fields)) = serde_json::from_str::<Value>(&collapsed) else {
        return collapsed.into_owned();
    };

    for (key, value) in fields.iter_mut() {
        if key.eq_ignore_ascii_case("password") {
            *value = Value::String(MASK.to_string());
        }
    }

    serde_json::to_string(&Value::Object(fields)).unwrap_or_else(|_| collapsed.into_owned())
}
