//! JSON parsing helpers for model replies
//!
//! Models wrap the requested object in prose or code fences more often than
//! not, so the reply is scanned for the first balanced `{...}` before decoding.

use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Find the first syntactically balanced JSON object in `text`
///
/// Brace depth is tracked outside of string literals only, and backslash
/// escapes inside strings are honoured, so `{"note": "a } b"}` is returned
/// whole. If the object opened by a `{` never closes, scanning resumes at the
/// next `{`.
pub fn find_json_object(text: &str) -> Option<&str> {
    let mut search_from = 0;

    while let Some(offset) = text[search_from..].find('{') {
        let start = search_from + offset;
        if let Some(end) = balanced_end(&text[start..]) {
            return Some(&text[start..=start + end]);
        }
        search_from = start + 1;
    }

    None
}

/// Byte index of the `}` closing the object that opens at index 0
fn balanced_end(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in s.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }

    None
}

/// Locate and decode the expense object in a model reply
///
/// Returns [`Error::NoJsonFound`] when the reply holds no balanced object and
/// [`Error::JsonDecode`] when the located text is not a valid JSON object.
/// Both carry the full reply.
pub fn parse_expense_reply(reply: &str) -> Result<Map<String, Value>> {
    let json_str = find_json_object(reply).ok_or_else(|| Error::NoJsonFound {
        raw: reply.to_string(),
    })?;

    serde_json::from_str::<Map<String, Value>>(json_str).map_err(|source| Error::JsonDecode {
        raw: reply.to_string(),
        source,
    })
}
