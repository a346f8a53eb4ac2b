//! Replacement of characters that XML 1.0 cannot carry.

use std::borrow::Cow;

/// Replacement character for illegal input.
pub const REPLACEMENT: char = '\u{FFFD}';

/// Whether `c` may appear in XML 1.0 character data.
pub fn is_xml_char(c: char) -> bool {
    matches!(c,
        '\t' | '\n' | '\r'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}

/// Replace every character XML cannot carry with U+FFFD.
///
/// C0 controls other than TAB, LF and CR are replaced, as are U+FFFE and
/// U+FFFF. Borrows when nothing needs replacing.
pub fn scrub(text: &str) -> Cow<'_, str> {
    if text.chars().all(is_xml_char) {
        return Cow::Borrowed(text);
    }
    Cow::Owned(
        text.chars()
            .map(|c| if is_xml_char(c) { c } else { REPLACEMENT })
            .collect(),
    )
}
