//! XML text output for serializer events, on top of `quick_xml::Writer`.
//!
//! Writes no XML declaration. An element with no character content is
//! written as a single `Event::Empty`. Text and attribute values are escaped
//! here and handed over pre-escaped, since CR and the C1 range must become
//! character references to survive parsing.

use std::borrow::Cow;
use std::io::Write;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::{DocError, Result};
use crate::xml::{Attribute, XmlEvent};

/// Streams [`XmlEvent`]s as XML text to an `io::Write`.
pub struct XmlWriter<W: Write> {
    inner: Writer<W>,
    /// Start tag held back until we know whether the element has content.
    open: Option<BytesStart<'static>>,
}

impl<W: Write> XmlWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            inner: Writer::new(out),
            open: None,
        }
    }

    pub fn write_event(&mut self, event: &XmlEvent) -> Result<()> {
        match event {
            XmlEvent::StartElement { name, attributes } => self.start_element(name, attributes),
            XmlEvent::Characters(text) => self.characters(text),
            XmlEvent::EndElement { name } => self.end_element(name),
        }
    }

    pub fn start_element(&mut self, name: &str, attributes: &[Attribute]) -> Result<()> {
        self.flush_open()?;
        let mut start = BytesStart::new(name.to_string());
        for attr in attributes {
            let value = escape(&attr.value, true);
            // raw (key, value) bytes are pushed without further escaping
            start.push_attribute((attr.name.as_bytes(), value.as_bytes()));
        }
        self.open = Some(start);
        Ok(())
    }

    pub fn characters(&mut self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        self.flush_open()?;
        self.emit(Event::Text(BytesText::from_escaped(escape(text, false))))
    }

    pub fn end_element(&mut self, name: &str) -> Result<()> {
        match self.open.take() {
            Some(start) => self.emit(Event::Empty(start)),
            None => self.emit(Event::End(BytesEnd::new(name))),
        }
    }

    /// Flush and return the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        self.flush_open()?;
        let mut out = self.inner.into_inner();
        out.flush()?;
        Ok(out)
    }

    fn flush_open(&mut self) -> Result<()> {
        match self.open.take() {
            Some(start) => self.emit(Event::Start(start)),
            None => Ok(()),
        }
    }

    fn emit(&mut self, event: Event<'_>) -> Result<()> {
        self.inner.write_event(event).map_err(xml_error)
    }
}

fn xml_error<E: std::fmt::Display>(err: E) -> DocError {
    DocError::Xml(err.to_string())
}

/// Escape markup characters, CR and the DEL/C1 range.
///
/// In attribute values `"`, TAB and LF are escaped as well.
fn escape(text: &str, attribute: bool) -> Cow<'_, str> {
    let needs = |c: char| {
        matches!(c, '&' | '<' | '>' | '\r' | '\u{7F}'..='\u{9F}')
            || (attribute && matches!(c, '"' | '\t' | '\n'))
    };
    if !text.chars().any(needs) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            '\r' | '\u{7F}'..='\u{9F}' => out.push_str(&format!("&#{};", u32::from(c))),
            '\t' | '\n' if attribute => out.push_str(&format!("&#{};", u32::from(c))),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(f: impl FnOnce(&mut XmlWriter<Vec<u8>>) -> Result<()>) -> String {
        let mut w = XmlWriter::new(Vec::new());
        f(&mut w).unwrap();
        String::from_utf8(w.finish().unwrap()).unwrap()
    }

    #[test]
    fn test_empty_element_collapses() {
        let xml = render(|w| {
            w.start_element("a", &[Attribute::new("SQLType", "VARCHAR")])?;
            w.characters("")?;
            w.end_element("a")
        });
        assert_eq!(xml, r#"<a SQLType="VARCHAR"/>"#);
    }

    #[test]
    fn test_nested_elements() {
        let xml = render(|w| {
            w.start_element("database", &[])?;
            w.start_element("table", &[])?;
            w.characters("x")?;
            w.end_element("table")?;
            w.end_element("database")
        });
        assert_eq!(xml, "<database><table>x</table></database>");
    }

    #[test]
    fn test_text_escaping() {
        let xml = render(|w| {
            w.start_element("c", &[])?;
            w.characters("<a href=\"x\">&\r\n\t\u{7F}\u{85}\u{A0}</a>")?;
            w.end_element("c")
        });
        assert_eq!(
            xml,
            "<c>&lt;a href=\"x\"&gt;&amp;&#13;\n\t&#127;&#133;\u{A0}&lt;/a&gt;</c>"
        );
    }

    #[test]
    fn test_attribute_escaping() {
        let xml = render(|w| {
            w.start_element("c", &[Attribute::new("k", "a\"b<c>&\t\n")])?;
            w.end_element("c")
        });
        assert_eq!(xml, "<c k=\"a&quot;b&lt;c&gt;&amp;&#9;&#10;\"/>");
    }

    #[test]
    fn test_plain_text_is_not_copied() {
        assert!(matches!(escape("plain text", false), Cow::Borrowed(_)));
        assert!(matches!(escape("a\tb", false), Cow::Borrowed(_)));
        assert!(matches!(escape("a\tb", true), Cow::Owned(_)));
    }

    #[test]
    fn test_events_round_trip_through_quick_xml_reader() {
        let xml = render(|w| {
            w.start_element("r", &[Attribute::new("k", "x\ty")])?;
            w.characters("a\rb\u{85}")?;
            w.end_element("r")
        });

        let mut reader = quick_xml::Reader::from_str(&xml);
        let mut text = String::new();
        let mut attr = String::new();
        loop {
            match reader.read_event().unwrap() {
                Event::Start(start) => {
                    let a = start.attributes().next().unwrap().unwrap();
                    attr = a.unescape_value().unwrap().into_owned();
                }
                Event::Text(t) => text.push_str(&t.unescape().unwrap()),
                Event::Eof => break,
                _ => {}
            }
        }
        assert_eq!(attr, "x\ty");
        assert_eq!(text, "a\rb\u{85}");
    }
}
