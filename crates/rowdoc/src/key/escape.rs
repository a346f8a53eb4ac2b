//! Escaping of key field values inside a composite document id.
//!
//! Fields are joined with [`SEPARATOR`]. Inside a field, the escape character
//! protects whatever character follows it, so an escaped separator never acts
//! as a field boundary and an escaped escape is a literal `_`.
//!
//! A value ending in `_` or `/` gets one extra `/` appended before escaping,
//! so an encoded field never ends in a bare escape run that a lookbehind
//! splitter would misread. Decoding drops that trailing `/` again. Ids
//! produced this way stay readable by splitters that only look one character
//! back.

use crate::error::{DocError, Result};

/// Escape character.
pub const ESCAPE: char = '_';

/// Field separator.
pub const SEPARATOR: char = '/';

/// Escape a single field value so it can be joined with `/`.
///
/// `_` becomes `__` and `/` becomes `_/`; everything else is copied.
/// Values ending in `_` or `/` carry an escaped `/` marker at the end.
pub fn encode_slash_in_data(value: &str) -> String {
    if !value.contains([ESCAPE, SEPARATOR]) {
        return value.to_string();
    }
    let mut out = String::with_capacity(value.len() * 2 + 2);
    for c in value.chars() {
        if c == ESCAPE || c == SEPARATOR {
            out.push(ESCAPE);
        }
        out.push(c);
    }
    if value.ends_with([ESCAPE, SEPARATOR]) {
        out.push(ESCAPE);
        out.push(SEPARATOR);
    }
    out
}

/// Undo [`encode_slash_in_data`].
///
/// `_x` decodes to `x` for any `x`, and a final escaped `/` is the marker
/// added by the encoder and is dropped. A trailing `_` with nothing after it
/// cannot have been produced by the encoder and is rejected.
pub fn decode_slash_in_data(field: &str) -> Result<String> {
    let mut out = String::with_capacity(field.len());
    let mut chars = field.chars();
    let mut last_escaped = false;
    while let Some(c) = chars.next() {
        if c == ESCAPE {
            match chars.next() {
                Some(escaped) => {
                    out.push(escaped);
                    last_escaped = true;
                }
                None => {
                    return Err(DocError::malformed_id(
                        field,
                        "dangling escape character at end of field",
                    ))
                }
            }
        } else {
            out.push(c);
            last_escaped = false;
        }
    }
    if last_escaped && out.ends_with(SEPARATOR) {
        out.pop();
    }
    Ok(out)
}

/// Split an encoded id into its still-escaped fields.
///
/// Only unescaped separators are boundaries. An id always yields at least one
/// field.
pub fn split_id(id: &str) -> Vec<&str> {
    let mut fields = Vec::new();
    let mut start = 0;
    let mut escaped = false;
    for (i, c) in id.char_indices() {
        if escaped {
            escaped = false;
        } else if c == ESCAPE {
            escaped = true;
        } else if c == SEPARATOR {
            fields.push(&id[start..i]);
            start = i + c.len_utf8();
        }
    }
    fields.push(&id[start..]);
    fields
}

/// Encode and join a list of field values.
pub fn join_fields<S: AsRef<str>>(values: &[S]) -> String {
    values
        .iter()
        .map(|v| encode_slash_in_data(v.as_ref()))
        .collect::<Vec<_>>()
        .join("/")
}
