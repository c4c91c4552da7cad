//! Conversion label recovery from platform tag snippets.
//!
//! The platform describes each conversion action with raw script/markup
//! snippets. The tracking label lives inside a quoted `send_to` assignment
//! shaped `AW-<id>/<label>`. Extraction is pure pattern matching over the
//! snippet text; a miss is a soft failure, not an error.

use regex::Regex;

/// How much unparsed snippet text to include in the miss diagnostic.
const SNIPPET_DIAGNOSTIC_LEN: usize = 200;

/// Recovers the conversion label from raw tag-snippet text.
///
/// Tolerates both quote styles and any whitespace around the colon:
/// `"send_to": "AW-12345/AbCdEf12"` and `'send_to':'AW-12345/AbCdEf12'`.
/// Returns `None` when no known shape matches; the owning conversion
/// action is still valid in that case, just without a label.
///
/// Deterministic and I/O-free: identical input always yields an identical
/// result.
pub fn extract_label(snippet_text: &str) -> Option<String> {
    // Double-quoted assignment, e.g. gtag config objects
    let double_quoted = Regex::new(r#""send_to"\s*:\s*"AW-\d+/([^"]+)""#).unwrap();
    // Single-quoted assignment, e.g. inline event snippets
    let single_quoted = Regex::new(r"'send_to'\s*:\s*'AW-\d+/([^']+)'").unwrap();

    for pattern in [&double_quoted, &single_quoted] {
        if let Some(captures) = pattern.captures(snippet_text) {
            if let Some(label) = captures.get(1) {
                return Some(label.as_str().to_string());
            }
        }
    }

    let preview: String = snippet_text.chars().take(SNIPPET_DIAGNOSTIC_LEN).collect();
    tracing::warn!(
        "No conversion label found in tag snippet (first {} chars): {}",
        SNIPPET_DIAGNOSTIC_LEN,
        preview
    );
    None
}
