//! Forward-only row cursor abstraction.
//!
//! The serializer and the key codec only ever need two things from a result
//! set: the column metadata and the next row. [`RowCursor`] is that seam; a
//! driver adapter implements it over its native result set, and [`VecCursor`]
//! implements it over rows already in memory.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::core::sql_type::SqlType;
use crate::core::value::SqlValue;
use crate::error::{DocError, Result};

/// Metadata for one result column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMeta {
    /// Column label as reported by the driver (alias if one was given).
    pub label: String,
    /// Engine type of the column.
    pub sql_type: SqlType,
    /// Driver-specific type name, used when the type code has no standard name.
    pub type_name: Option<String>,
}

impl ColumnMeta {
    pub fn new(label: impl Into<String>, sql_type: SqlType) -> Self {
        Self {
            label: label.into(),
            sql_type,
            type_name: None,
        }
    }

    /// Attach a driver-reported type name.
    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }
}

/// One fetched row.
///
/// Column labels are shared between all rows of a cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<SqlValue<'static>>,
}

impl Row {
    /// Create a row. Panics if the value count does not match the label count.
    pub fn new(columns: Arc<[String]>, values: Vec<SqlValue<'static>>) -> Self {
        assert_eq!(
            columns.len(),
            values.len(),
            "row has {} values for {} columns",
            values.len(),
            columns.len()
        );
        Self { columns, values }
    }

    /// Value at a 0-based position.
    pub fn get(&self, index: usize) -> Option<&SqlValue<'static>> {
        self.values.get(index)
    }

    /// Value of the named column, matched ASCII case-insensitively.
    pub fn get_by_name(&self, name: &str) -> Option<&SqlValue<'static>> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))
            .and_then(|i| self.values.get(i))
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[SqlValue<'static>] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_values(self) -> Vec<SqlValue<'static>> {
        self.values
    }
}

/// Forward-only source of rows with fixed column metadata.
pub trait RowCursor {
    /// Column metadata, available before the first row is fetched.
    fn columns(&self) -> &[ColumnMeta];

    /// Fetch the next row, or `None` once the cursor is exhausted.
    fn next_row(&mut self) -> Result<Option<Row>>;
}

impl<C: RowCursor + ?Sized> RowCursor for &mut C {
    fn columns(&self) -> &[ColumnMeta] {
        (**self).columns()
    }

    fn next_row(&mut self) -> Result<Option<Row>> {
        (**self).next_row()
    }
}

impl<C: RowCursor + ?Sized> RowCursor for Box<C> {
    fn columns(&self) -> &[ColumnMeta] {
        (**self).columns()
    }

    fn next_row(&mut self) -> Result<Option<Row>> {
        (**self).next_row()
    }
}

/// In-memory cursor over a fixed set of rows.
#[derive(Debug, Clone)]
pub struct VecCursor {
    columns: Vec<ColumnMeta>,
    labels: Arc<[String]>,
    rows: VecDeque<Vec<SqlValue<'static>>>,
}

impl VecCursor {
    /// Build a cursor, checking every row against the column count.
    pub fn new(columns: Vec<ColumnMeta>, rows: Vec<Vec<SqlValue<'static>>>) -> Result<Self> {
        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(DocError::Cursor(format!(
                    "row {} has {} values, expected {}",
                    i + 1,
                    row.len(),
                    columns.len()
                )));
            }
        }
        let labels: Arc<[String]> = columns.iter().map(|c| c.label.clone()).collect();
        Ok(Self {
            columns,
            labels,
            rows: rows.into(),
        })
    }

    /// Cursor with metadata only.
    pub fn empty(columns: Vec<ColumnMeta>) -> Self {
        let labels: Arc<[String]> = columns.iter().map(|c| c.label.clone()).collect();
        Self {
            columns,
            labels,
            rows: VecDeque::new(),
        }
    }

    /// Rows not yet fetched.
    pub fn remaining(&self) -> usize {
        self.rows.len()
    }
}

impl RowCursor for VecCursor {
    fn columns(&self) -> &[ColumnMeta] {
        &self.columns
    }

    fn next_row(&mut self) -> Result<Option<Row>> {
        Ok(self
            .rows
            .pop_front()
            .map(|values| Row::new(Arc::clone(&self.labels), values)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> VecCursor {
        VecCursor::new(
            vec![
                ColumnMeta::new("ID", SqlType::Integer),
                ColumnMeta::new("Name", SqlType::VarChar),
            ],
            vec![
                vec![SqlValue::I32(1), SqlValue::from("one")],
                vec![SqlValue::I32(2), SqlValue::Null],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_vec_cursor_yields_rows_in_order() {
        let mut cursor = sample();
        assert_eq!(cursor.remaining(), 2);

        let first = cursor.next_row().unwrap().unwrap();
        assert_eq!(first.get(0), Some(&SqlValue::I32(1)));
        let second = cursor.next_row().unwrap().unwrap();
        assert!(second.get(1).unwrap().is_null());
        assert!(cursor.next_row().unwrap().is_none());
        assert!(cursor.next_row().unwrap().is_none());
    }

    #[test]
    fn test_row_lookup_by_name_ignores_case() {
        let mut cursor = sample();
        let row = cursor.next_row().unwrap().unwrap();
        assert_eq!(row.get_by_name("id"), Some(&SqlValue::I32(1)));
        assert_eq!(row.get_by_name("NAME"), Some(&SqlValue::from("one")));
        assert_eq!(row.get_by_name("missing"), None);
    }

    #[test]
    fn test_vec_cursor_rejects_ragged_rows() {
        let err = VecCursor::new(
            vec![ColumnMeta::new("a", SqlType::Integer)],
            vec![vec![SqlValue::I32(1), SqlValue::I32(2)]],
        )
        .unwrap_err();
        assert!(matches!(err, DocError::Cursor(_)));
    }

    #[test]
    fn test_cursor_through_mut_ref() {
        fn drain(mut c: impl RowCursor) -> usize {
            let mut n = 0;
            while c.next_row().unwrap().is_some() {
                n += 1;
            }
            n
        }
        let mut cursor = sample();
        assert_eq!(drain(&mut cursor), 2);
        assert_eq!(cursor.remaining(), 0);
    }
}
