//! Pull-driven row-to-XML event stream.

use std::collections::VecDeque;
use std::iter::FusedIterator;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::{debug, warn};

use crate::core::{ColumnMeta, Row, RowCursor, SqlType, SqlValue};
use crate::error::{DocError, Result};
use crate::typemap::column_type_name;
use crate::xml::scrub::scrub;
use crate::xml::temporal::TemporalFormat;
use crate::xml::{Attribute, XmlEvent, RECORD_ELEMENT, ROOT_ELEMENT, TABLE_ELEMENT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    NotStarted,
    Emitting,
    Finished,
}

/// Per-column facts resolved once from the cursor metadata.
#[derive(Debug, Clone)]
struct ColumnPlan {
    label: String,
    sql_type: SqlType,
    type_name: String,
    skip: bool,
}

impl ColumnPlan {
    fn new(meta: &ColumnMeta) -> Self {
        let skip = meta.sql_type.is_structured() || meta.sql_type == SqlType::JavaObject;
        Self {
            label: meta.label.clone(),
            sql_type: meta.sql_type,
            type_name: column_type_name(meta),
            skip,
        }
    }
}

/// Streams a cursor as `<database><table><table_rec>…</table_rec>…</table></database>`.
///
/// Rows are fetched one at a time as events are pulled. The first pull on a
/// cursor without rows yields [`DocError::EmptyResult`] and nothing else.
/// Once the stream ends, or after any error, the iterator only returns `None`.
pub struct RowSerializer<C: RowCursor> {
    cursor: C,
    format: TemporalFormat,
    columns: Vec<ColumnPlan>,
    state: State,
    pending: VecDeque<XmlEvent>,
    rows: u64,
}

impl<C: RowCursor> RowSerializer<C> {
    /// Serializer rendering times in the local zone.
    pub fn new(cursor: C) -> Self {
        Self::with_format(cursor, TemporalFormat::local())
    }

    pub fn with_format(cursor: C, format: TemporalFormat) -> Self {
        let columns = cursor.columns().iter().map(ColumnPlan::new).collect();
        Self {
            cursor,
            format,
            columns,
            state: State::NotStarted,
            pending: VecDeque::new(),
            rows: 0,
        }
    }

    /// Rows rendered so far.
    pub fn rows_emitted(&self) -> u64 {
        self.rows
    }

    pub fn into_inner(self) -> C {
        self.cursor
    }

    fn start(&mut self) -> Result<()> {
        let first = self.cursor.next_row()?.ok_or(DocError::EmptyResult)?;
        self.pending.push_back(XmlEvent::start(ROOT_ELEMENT, Vec::new()));
        self.pending.push_back(XmlEvent::start(TABLE_ELEMENT, Vec::new()));
        self.push_row(&first)
    }

    fn advance(&mut self) -> Result<bool> {
        match self.cursor.next_row()? {
            Some(row) => {
                self.push_row(&row)?;
                Ok(true)
            }
            None => {
                self.pending.push_back(XmlEvent::end(TABLE_ELEMENT));
                self.pending.push_back(XmlEvent::end(ROOT_ELEMENT));
                Ok(false)
            }
        }
    }

    fn push_row(&mut self, row: &Row) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(DocError::Cursor(format!(
                "row {} has {} values but the cursor describes {} columns",
                self.rows + 1,
                row.len(),
                self.columns.len()
            )));
        }
        self.rows += 1;
        self.pending.push_back(XmlEvent::start(RECORD_ELEMENT, Vec::new()));
        for (plan, value) in self.columns.iter().zip(row.values()) {
            render_column(&mut self.pending, plan, value, &self.format);
        }
        self.pending.push_back(XmlEvent::end(RECORD_ELEMENT));
        Ok(())
    }
}

fn render_column(
    out: &mut VecDeque<XmlEvent>,
    plan: &ColumnPlan,
    value: &SqlValue<'_>,
    format: &TemporalFormat,
) {
    debug!("column {} sqlTypeName: {}", plan.label, plan.type_name);
    if plan.skip || matches!(value, SqlValue::Array(_)) {
        debug!(
            "Column type not supported in XML: {} ({})",
            plan.type_name, plan.label
        );
        return;
    }

    let mut attributes = vec![Attribute::new("SQLType", plan.type_name.as_str())];
    let text = match value {
        SqlValue::Null => {
            attributes.push(Attribute::new("ISNULL", "true"));
            None
        }
        SqlValue::Bytes(bytes) => {
            attributes.push(Attribute::new("encoding", "base64binary"));
            Some(STANDARD.encode(bytes))
        }
        SqlValue::Text(s) if plan.sql_type.is_binary() => {
            attributes.push(Attribute::new("encoding", "base64binary"));
            Some(STANDARD.encode(s.as_bytes()))
        }
        SqlValue::Date(d) => Some(format.format_date(*d)),
        SqlValue::Time(t) => Some(format.format_time(*t)),
        SqlValue::Timestamp(ts) => Some(format.format_timestamp(*ts)),
        SqlValue::Object(obj) => match &obj.display {
            Some(display) => Some(scrub(display).into_owned()),
            None => {
                let err = DocError::unsupported_column(
                    plan.label.as_str(),
                    plan.type_name.as_str(),
                    "value has no displayable form",
                );
                warn!("skipping column: {}", err);
                return;
            }
        },
        other => other.to_text().map(|s| scrub(&s).into_owned()),
    };

    out.push_back(XmlEvent::start(plan.label.as_str(), attributes));
    if let Some(text) = text.filter(|t| !t.is_empty()) {
        out.push_back(XmlEvent::Characters(text));
    }
    out.push_back(XmlEvent::end(plan.label.as_str()));
}

impl<C: RowCursor> Iterator for RowSerializer<C> {
    type Item = Result<XmlEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(Ok(event));
            }
            let step = match self.state {
                State::Finished => return None,
                State::NotStarted => self.start().map(|()| true),
                State::Emitting => self.advance(),
            };
            match step {
                Ok(true) => self.state = State::Emitting,
                Ok(false) => self.state = State::Finished,
                Err(e) => {
                    self.state = State::Finished;
                    self.pending.clear();
                    return Some(Err(e));
                }
            }
        }
    }
}

impl<C: RowCursor> FusedIterator for RowSerializer<C> {}
