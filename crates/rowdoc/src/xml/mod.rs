//! Streaming relational-to-XML serialization.
//!
//! [`RowSerializer`] turns a [`RowCursor`] into a lazy sequence of
//! [`XmlEvent`]s; [`write_xml`] renders that sequence as text.
//!
//! ```rust
//! use rowdoc::core::{ColumnMeta, SqlType, SqlValue, VecCursor};
//! use rowdoc::xml::{to_xml_string, RowSerializer};
//!
//! let cursor = VecCursor::new(
//!     vec![ColumnMeta::new("COLNAME", SqlType::VarChar)],
//!     vec![vec![SqlValue::from("onevalue")]],
//! )?;
//! let xml = to_xml_string(RowSerializer::new(cursor))?;
//! assert_eq!(
//!     xml,
//!     r#"<database><table><table_rec><COLNAME SQLType="VARCHAR">onevalue</COLNAME></table_rec></table></database>"#
//! );
//! # Ok::<(), rowdoc::DocError>(())
//! ```

pub mod scrub;
pub mod serializer;
pub mod temporal;
pub mod writer;

use std::io::Write;

use crate::core::RowCursor;
use crate::error::Result;

pub use serializer::RowSerializer;
pub use temporal::{TemporalFormat, TemporalZone};
pub use writer::XmlWriter;

/// Document root element.
pub const ROOT_ELEMENT: &str = "database";
/// Element wrapping all rows.
pub const TABLE_ELEMENT: &str = "table";
/// Element wrapping one row.
pub const RECORD_ELEMENT: &str = "table_rec";

/// Element attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// One structural event of the serialized document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlEvent {
    StartElement {
        name: String,
        attributes: Vec<Attribute>,
    },
    Characters(String),
    EndElement {
        name: String,
    },
}

impl XmlEvent {
    pub fn start(name: impl Into<String>, attributes: Vec<Attribute>) -> Self {
        XmlEvent::StartElement {
            name: name.into(),
            attributes,
        }
    }

    pub fn end(name: impl Into<String>) -> Self {
        XmlEvent::EndElement { name: name.into() }
    }
}

/// Drive `serializer` to completion, writing XML text to `out`.
///
/// Output written before an error is left in `out`.
pub fn write_xml<C: RowCursor, W: Write>(serializer: RowSerializer<C>, out: W) -> Result<W> {
    let mut writer = XmlWriter::new(out);
    for event in serializer {
        writer.write_event(&event?)?;
    }
    writer.finish()
}

/// Drive `serializer` to completion and return the XML text.
pub fn to_xml_string<C: RowCursor>(serializer: RowSerializer<C>) -> Result<String> {
    let bytes = write_xml(serializer, Vec::new())?;
    // The writer only ever receives `str` data.
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use chrono::{FixedOffset, Local, NaiveDate, NaiveTime, TimeZone, Utc};

    use super::*;
    use crate::core::{ColumnMeta, ObjectValue, Row, SqlType, SqlValue, VecCursor};
    use crate::error::DocError;

    fn utc() -> TemporalFormat {
        TemporalFormat::fixed(FixedOffset::east_opt(0).unwrap())
    }

    fn golden(inner: &str) -> String {
        format!("<database><table><table_rec>{}</table_rec></table></database>", inner)
    }

    fn single(sql_type: SqlType, value: SqlValue<'static>) -> String {
        let cursor = VecCursor::new(
            vec![ColumnMeta::new("COLNAME", sql_type)],
            vec![vec![value]],
        )
        .unwrap();
        to_xml_string(RowSerializer::with_format(cursor, utc())).unwrap()
    }

    // =========================================================================
    // Envelope and state
    // =========================================================================

    #[test]
    fn test_empty_result_fails_on_first_pull() {
        let cursor = VecCursor::empty(vec![ColumnMeta::new("colname", SqlType::VarChar)]);
        let mut serializer = RowSerializer::new(cursor);
        assert!(matches!(serializer.next(), Some(Err(DocError::EmptyResult))));
        assert!(serializer.next().is_none());
        assert!(serializer.next().is_none());
    }

    #[test]
    fn test_empty_result_writes_nothing() {
        let cursor = VecCursor::empty(vec![ColumnMeta::new("colname", SqlType::VarChar)]);
        let mut out = Vec::new();
        let err = write_xml(RowSerializer::new(cursor), &mut out).unwrap_err();
        assert!(matches!(err, DocError::EmptyResult));
        assert!(out.is_empty());
    }

    #[test]
    fn test_event_sequence() {
        let cursor = VecCursor::new(
            vec![ColumnMeta::new("ID", SqlType::Integer)],
            vec![vec![SqlValue::I32(1)]],
        )
        .unwrap();
        let events: Vec<XmlEvent> = RowSerializer::new(cursor).map(|e| e.unwrap()).collect();
        assert_eq!(
            events,
            vec![
                XmlEvent::start("database", vec![]),
                XmlEvent::start("table", vec![]),
                XmlEvent::start("table_rec", vec![]),
                XmlEvent::start("ID", vec![Attribute::new("SQLType", "INTEGER")]),
                XmlEvent::Characters("1".into()),
                XmlEvent::end("ID"),
                XmlEvent::end("table_rec"),
                XmlEvent::end("table"),
                XmlEvent::end("database"),
            ]
        );
    }

    #[test]
    fn test_one_record_per_row() {
        let cursor = VecCursor::new(
            vec![ColumnMeta::new("N", SqlType::BigInt)],
            vec![vec![SqlValue::I64(1)], vec![SqlValue::I64(2)], vec![SqlValue::I64(3)]],
        )
        .unwrap();
        let mut serializer = RowSerializer::new(cursor);
        let mut events = Vec::new();
        for e in &mut serializer {
            events.push(e.unwrap());
        }
        assert_eq!(serializer.rows_emitted(), 3);
        let xml = {
            let mut w = XmlWriter::new(Vec::new());
            for e in &events {
                w.write_event(e).unwrap();
            }
            String::from_utf8(w.finish().unwrap()).unwrap()
        };
        assert_eq!(
            xml,
            "<database><table>\
             <table_rec><N SQLType=\"BIGINT\">1</N></table_rec>\
             <table_rec><N SQLType=\"BIGINT\">2</N></table_rec>\
             <table_rec><N SQLType=\"BIGINT\">3</N></table_rec>\
             </table></database>"
        );
    }

    struct FailingCursor {
        columns: Vec<ColumnMeta>,
        served: bool,
    }

    impl RowCursor for FailingCursor {
        fn columns(&self) -> &[ColumnMeta] {
            &self.columns
        }

        fn next_row(&mut self) -> Result<Option<Row>> {
            if self.served {
                return Err(DocError::Cursor("connection reset".into()));
            }
            self.served = true;
            let labels: std::sync::Arc<[String]> = vec!["ID".to_string()].into();
            Ok(Some(Row::new(labels, vec![SqlValue::I32(1)])))
        }
    }

    #[test]
    fn test_cursor_error_ends_stream() {
        let cursor = FailingCursor {
            columns: vec![ColumnMeta::new("ID", SqlType::Integer)],
            served: false,
        };
        let results: Vec<Result<XmlEvent>> = RowSerializer::new(cursor).collect();
        let last = results.last().unwrap();
        assert!(matches!(last, Err(DocError::Cursor(_))));
        assert_eq!(results.iter().filter(|r| r.is_err()).count(), 1);
    }

    // =========================================================================
    // Column encodings
    // =========================================================================

    #[test]
    fn test_varchar() {
        assert_eq!(
            single(SqlType::VarChar, SqlValue::from("onevalue")),
            golden(r#"<COLNAME SQLType="VARCHAR">onevalue</COLNAME>"#)
        );
    }

    #[test]
    fn test_varchar_null() {
        assert_eq!(
            single(SqlType::VarChar, SqlValue::Null),
            golden(r#"<COLNAME SQLType="VARCHAR" ISNULL="true"/>"#)
        );
    }

    #[test]
    fn test_varchar_holding_xml_is_escaped() {
        let inner = r#"<COLNAME SQLType="VARCHAR">onevalue</COLNAME>"#;
        assert_eq!(
            single(SqlType::VarChar, SqlValue::from(inner)),
            golden(&format!(
                r#"<COLNAME SQLType="VARCHAR">{}</COLNAME>"#,
                inner.replace('<', "&lt;").replace('>', "&gt;")
            ))
        );
    }

    #[test]
    fn test_integer_and_boolean() {
        assert_eq!(
            single(SqlType::Integer, SqlValue::I32(17)),
            golden(r#"<COLNAME SQLType="INTEGER">17</COLNAME>"#)
        );
        assert_eq!(
            single(SqlType::Boolean, SqlValue::Bool(true)),
            golden(r#"<COLNAME SQLType="BOOLEAN">true</COLNAME>"#)
        );
    }

    #[test]
    fn test_binary() {
        let data: Vec<u8> = (0..123u8).map(|b| b.wrapping_mul(37)).collect();
        assert_eq!(
            single(SqlType::VarBinary, SqlValue::bytes_owned(data.clone())),
            golden(&format!(
                r#"<COLNAME SQLType="VARBINARY" encoding="base64binary">{}</COLNAME>"#,
                STANDARD.encode(&data)
            ))
        );
    }

    #[test]
    fn test_binary_empty_and_null() {
        assert_eq!(
            single(SqlType::Blob, SqlValue::Bytes(Cow::Borrowed(&[]))),
            golden(r#"<COLNAME SQLType="BLOB" encoding="base64binary"/>"#)
        );
        assert_eq!(
            single(SqlType::Blob, SqlValue::Null),
            golden(r#"<COLNAME SQLType="BLOB" ISNULL="true"/>"#)
        );
    }

    #[test]
    fn test_bfile_uses_driver_type_name() {
        let cursor = VecCursor::new(
            vec![ColumnMeta::new("F", SqlType::BFile).with_type_name("BFILE")],
            vec![vec![SqlValue::bytes_owned(b"hi".to_vec())]],
        )
        .unwrap();
        assert_eq!(
            to_xml_string(RowSerializer::new(cursor)).unwrap(),
            golden(r#"<F SQLType="BFILE" encoding="base64binary">aGk=</F>"#)
        );
    }

    #[test]
    fn test_date_time_timestamp() {
        let date = NaiveDate::from_ymd_opt(2004, 10, 6).unwrap();
        assert_eq!(
            single(SqlType::Date, SqlValue::Date(date)),
            golden(r#"<COLNAME SQLType="DATE">2004-10-06</COLNAME>"#)
        );
        let time = NaiveTime::from_hms_opt(9, 15, 30).unwrap();
        assert_eq!(
            single(SqlType::Time, SqlValue::Time(time)),
            golden(r#"<COLNAME SQLType="TIME">09:15:30+00:00</COLNAME>"#)
        );
        let ts = Utc.with_ymd_and_hms(2004, 10, 6, 9, 15, 30).unwrap();
        assert_eq!(
            single(SqlType::Timestamp, SqlValue::Timestamp(ts)),
            golden(r#"<COLNAME SQLType="TIMESTAMP">2004-10-06T09:15:30+00:00</COLNAME>"#)
        );
    }

    #[test]
    fn test_array_column_is_omitted() {
        assert_eq!(
            single(
                SqlType::Array,
                SqlValue::Array(vec![SqlValue::from("hello"), SqlValue::from("world")])
            ),
            "<database><table><table_rec/></table></database>"
        );
        assert_eq!(
            single(SqlType::Array, SqlValue::Null),
            "<database><table><table_rec/></table></database>"
        );
    }

    #[test]
    fn test_other_object() {
        assert_eq!(
            single(SqlType::Other, SqlValue::Object(ObjectValue::displayable("hello world"))),
            golden(r#"<COLNAME SQLType="OTHER">hello world</COLNAME>"#)
        );
        assert_eq!(
            single(SqlType::Other, SqlValue::Null),
            golden(r#"<COLNAME SQLType="OTHER" ISNULL="true"/>"#)
        );
        assert_eq!(
            single(SqlType::Other, SqlValue::Object(ObjectValue::opaque("GEOMETRY"))),
            "<database><table><table_rec/></table></database>"
        );
    }

    #[test]
    fn test_multiple_types() {
        let cursor = VecCursor::new(
            vec![
                ColumnMeta::new("ID", SqlType::Integer),
                ColumnMeta::new("NAME", SqlType::VarChar),
                ColumnMeta::new("MODIFIED", SqlType::Timestamp),
            ],
            vec![vec![SqlValue::I32(1), SqlValue::from("file.txt"), SqlValue::Null]],
        )
        .unwrap();
        assert_eq!(
            to_xml_string(RowSerializer::new(cursor)).unwrap(),
            golden(
                "<ID SQLType=\"INTEGER\">1</ID>\
                 <NAME SQLType=\"VARCHAR\">file.txt</NAME>\
                 <MODIFIED SQLType=\"TIMESTAMP\" ISNULL=\"true\"/>"
            )
        );
    }

    #[test]
    fn test_vendor_type_name_fallbacks() {
        let cursor = VecCursor::new(
            vec![
                ColumnMeta::new("A", SqlType::Vendor(-101)).with_type_name("TIMESTAMP WITH TIME ZONE"),
                ColumnMeta::new("B", SqlType::Vendor(-102)),
            ],
            vec![vec![SqlValue::Null, SqlValue::Null]],
        )
        .unwrap();
        assert_eq!(
            to_xml_string(RowSerializer::new(cursor)).unwrap(),
            golden(
                "<A SQLType=\"TIMESTAMP WITH TIME ZONE\" ISNULL=\"true\"/>\
                 <B SQLType=\"-102\" ISNULL=\"true\"/>"
            )
        );
    }

    // =========================================================================
    // Character scrubbing
    // =========================================================================

    #[test]
    fn test_invalid_xml_chars() {
        let mut input = String::new();
        let mut output = String::new();
        for c in '\u{0}'..='\u{1F}' {
            input.push(c);
            match c {
                '\t' | '\n' => output.push(c),
                '\r' => output.push_str("&#13;"),
                _ => output.push('\u{FFFD}'),
            }
        }
        input.push_str("\u{FFFE}\u{FFFF}");
        output.push_str("\u{FFFD}\u{FFFD}");

        assert_eq!(
            single(SqlType::VarChar, SqlValue::text_owned(input.clone())),
            golden(&format!(r#"<COLNAME SQLType="VARCHAR">{}</COLNAME>"#, output))
        );
        assert_eq!(
            single(SqlType::Other, SqlValue::Object(ObjectValue::displayable(input))),
            golden(&format!(r#"<COLNAME SQLType="OTHER">{}</COLNAME>"#, output))
        );
    }

    #[test]
    fn test_valid_chars_pass_through() {
        let content = "caf\u{E9} \u{4E2D}\u{6587} \u{1D100}\u{1D101} \u{D7FF}\u{E000}\u{FFFD}";
        assert_eq!(
            single(SqlType::NVarChar, SqlValue::from(content)),
            golden(&format!(r#"<COLNAME SQLType="NVARCHAR">{}</COLNAME>"#, content))
        );
    }

    struct ShortRowCursor {
        columns: Vec<ColumnMeta>,
        done: bool,
    }

    impl RowCursor for ShortRowCursor {
        fn columns(&self) -> &[ColumnMeta] {
            &self.columns
        }

        fn next_row(&mut self) -> Result<Option<Row>> {
            if self.done {
                return Ok(None);
            }
            self.done = true;
            let labels: std::sync::Arc<[String]> = vec!["ID".to_string()].into();
            Ok(Some(Row::new(labels, vec![SqlValue::I32(1)])))
        }
    }

    #[test]
    fn test_row_shorter_than_metadata_is_cursor_error() {
        let cursor = ShortRowCursor {
            columns: vec![
                ColumnMeta::new("ID", SqlType::Integer),
                ColumnMeta::new("NAME", SqlType::VarChar),
            ],
            done: false,
        };
        let mut serializer = RowSerializer::new(cursor);
        match serializer.next() {
            Some(Err(DocError::Cursor(msg))) => assert!(msg.contains("2 columns"), "{}", msg),
            other => panic!("expected cursor error, got {:?}", other),
        }
        assert!(serializer.next().is_none());
        assert_eq!(serializer.rows_emitted(), 0);
    }

    // =========================================================================
    // Concurrency
    // =========================================================================

    #[test]
    fn test_independent_serializers_across_threads() {
        let offsets = [-8 * 3600, -3 * 3600 - 1800, 0, 3600, 5 * 3600 + 1800];
        std::thread::scope(|scope| {
            for (t, secs) in offsets.into_iter().enumerate() {
                scope.spawn(move || {
                    let offset = FixedOffset::east_opt(secs).unwrap();
                    let millis = 86_400_000i64 * 365 * (t as i64 * 17 + 1) + 12_345 * t as i64;
                    let ts = Utc.timestamp_millis_opt(millis).unwrap();
                    let expected = golden(&format!(
                        r#"<COLNAME SQLType="TIMESTAMP">{}</COLNAME>"#,
                        ts.with_timezone(&offset).format("%Y-%m-%dT%H:%M:%S%:z")
                    ));
                    for _ in 0..20 {
                        let cursor = VecCursor::new(
                            vec![ColumnMeta::new("COLNAME", SqlType::Timestamp)],
                            vec![vec![SqlValue::Timestamp(ts)]],
                        )
                        .unwrap();
                        let xml = to_xml_string(RowSerializer::with_format(
                            cursor,
                            TemporalFormat::fixed(offset),
                        ))
                        .unwrap();
                        assert_eq!(xml, expected, "thread {}", t);
                    }
                });
            }
        });
    }

    #[test]
    fn test_local_zone_serializers_across_threads() {
        std::thread::scope(|scope| {
            for t in 0..6i64 {
                scope.spawn(move || {
                    // spread over the year
                    let millis = 86_400_000i64 * (61 * t + 3) + 3_600_000 * t + 7_000;
                    let ts = Utc.timestamp_millis_opt(millis).unwrap();
                    let expected = golden(&format!(
                        r#"<COLNAME SQLType="TIMESTAMP">{}</COLNAME>"#,
                        ts.with_timezone(&Local).format("%Y-%m-%dT%H:%M:%S%:z")
                    ));
                    for _ in 0..20 {
                        let cursor = VecCursor::new(
                            vec![ColumnMeta::new("COLNAME", SqlType::Timestamp)],
                            vec![vec![SqlValue::Timestamp(ts)]],
                        )
                        .unwrap();
                        let xml = to_xml_string(RowSerializer::new(cursor)).unwrap();
                        assert_eq!(xml, expected, "thread {}", t);
                    }
                });
            }
        });
    }
}
