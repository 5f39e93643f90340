//! Recovery of a single JSON value from noisy model output.
//!
//! Model responses wrap JSON in prose, markdown fences or stray markup. The
//! extractor tries a fenced block first, then the first balanced
//! `{...}`/`[...]` region of the raw text. A balanced region that does not
//! parse ends the search: no smaller candidate further along is tried.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, instrument};

static FENCED_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?i:json)?[ \t]*\r?\n?(.*?)```").expect("fenced block regex"));

/// Extracts the first JSON island from `text`, returned verbatim.
///
/// Returns `None` when no candidate exists or the first balanced candidate
/// is not valid JSON.
///
/// # Example
///
/// ```rust
/// use horus_core::extract_json_string;
///
/// let reply = "Here is the result:\n```json\n{\"a\":1}\n```";
/// assert_eq!(extract_json_string(reply).as_deref(), Some(r#"{"a":1}"#));
/// assert_eq!(extract_json_string("<div>[not json {broken</div>"), None);
/// ```
#[instrument(level = "debug", skip(text), fields(len = text.len()))]
pub fn extract_json_string(text: &str) -> Option<String> {
    if let Some(caps) = FENCED_BLOCK.captures(text)
        && let Some(body) = caps.get(1)
    {
        let candidate = body.as_str().trim();
        if is_valid_json(candidate) {
            return Some(candidate.to_string());
        }
        debug!("fenced block is not valid JSON, scanning raw text");
    }

    let candidate = first_balanced_region(text)?;
    if is_valid_json(candidate) {
        Some(candidate.to_string())
    } else {
        debug!(len = candidate.len(), "first balanced region is not valid JSON");
        None
    }
}

fn is_valid_json(candidate: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(candidate).is_ok()
}

/// Slice from the first `{` or `[` through the bracket that closes it.
///
/// Only the opening bracket kind is counted, and brackets inside string
/// literals are ignored. `None` if there is no opener or it never closes.
fn first_balanced_region(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let start = bytes.iter().position(|&b| b == b'{' || b == b'[')?;
    let open = bytes[start];
    let close = if open == b'{' { b'}' } else { b']' };

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &b) in bytes[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }

        if b == b'"' {
            in_string = true;
        } else if b == open {
            depth += 1;
        } else if b == close {
            depth -= 1;
            if depth == 0 {
                return Some(&text[start..=start + offset]);
            }
        }
    }

    None
}
