//! Composite key codec.
//!
//! A [`UniqueKey`] turns the key columns of a row into one document id and
//! turns a document id back into typed bind parameters for the content and
//! ACL queries.
//!
//! # Declaration syntax
//!
//! ```text
//! name[:type] (, name[:type])*      type = int | long | string | date | time | timestamp
//! ```
//!
//! Names are matched ASCII case-insensitively everywhere. Columns declared
//! without a type must be resolved from cursor metadata with
//! [`UniqueKeyBuilder::add_column_types`] before [`UniqueKeyBuilder::build`].
//!
//! # Example
//!
//! ```rust
//! use rowdoc::key::{BoundParameters, UniqueKeyBuilder};
//! use rowdoc::core::SqlValue;
//!
//! let key = UniqueKeyBuilder::new("numnum:int, strstr:string")?
//!     .content_sql_columns("numnum,numnum,strstr")?
//!     .build()?;
//!
//! let mut params = BoundParameters::new();
//! key.set_content_parameters(&mut params, "888/bluesky")?;
//! assert_eq!(params.get(2), Some(&SqlValue::I32(888)));
//! # Ok::<(), rowdoc::DocError>(())
//! ```

pub mod binder;
pub mod escape;
pub mod uri;

use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use tracing::{debug, info};

use crate::core::{Row, RowCursor, SqlType, SqlValue};
use crate::error::{DocError, Result};
use crate::typemap::{classify_column, ColumnType};

pub use binder::{BoundParameters, ParameterBinder};
pub use escape::{decode_slash_in_data, encode_slash_in_data, split_id};
pub use uri::validate_uri;

/// Config parameter named in errors about the content parameter list.
const CONTENT_PARAM: &str = "db.singleDocContentSqlParameters";

/// Config parameter named in errors about the ACL parameter list.
const ACL_PARAM: &str = "db.aclSqlParameters";

/// One column of a unique key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyColumn {
    pub name: String,
    pub column_type: ColumnType,
}

/// Builder for [`UniqueKey`].
#[derive(Debug, Clone)]
pub struct UniqueKeyBuilder {
    names: Vec<String>,
    types: Vec<Option<ColumnType>>,
    content_slots: Option<Vec<usize>>,
    acl_slots: Option<Vec<usize>>,
    doc_id_is_url: bool,
}

impl UniqueKeyBuilder {
    /// Parse a key declaration such as `"id:int, name:string"`.
    pub fn new(decls: &str) -> Result<Self> {
        if decls.trim().is_empty() {
            return Err(DocError::Config(
                "Invalid db.uniqueKey parameter: value cannot be empty.".to_string(),
            ));
        }

        let mut names: Vec<String> = Vec::new();
        let mut types = Vec::new();
        for element in decls.split(',') {
            debug!("unique key element: `{}'", element);
            let element = element.trim();
            let (name, column_type) = match element.split_once(':') {
                Some((name, ty)) => {
                    let name = name.trim();
                    let ty = ty.trim();
                    let parsed = ty.parse::<ColumnType>().map_err(|_| {
                        DocError::Config(format!(
                            "Invalid UniqueKey type '{}' for '{}'.",
                            ty, name
                        ))
                    })?;
                    (name, Some(parsed))
                }
                None => (element, None),
            };
            if name.is_empty() {
                return Err(DocError::Config(format!(
                    "Invalid db.uniqueKey configuration: empty column name in '{}'.",
                    decls
                )));
            }
            if names.iter().any(|n| n.eq_ignore_ascii_case(name)) {
                return Err(DocError::Config(format!(
                    "Invalid db.uniqueKey configuration: key name '{}' was repeated.",
                    name
                )));
            }
            names.push(name.to_string());
            types.push(column_type);
        }

        Ok(Self {
            names,
            types,
            content_slots: None,
            acl_slots: None,
            doc_id_is_url: false,
        })
    }

    /// Key columns bound to the content query, in bind order.
    ///
    /// A blank list means all key columns in declaration order.
    pub fn content_sql_columns(mut self, list: &str) -> Result<Self> {
        self.content_slots = self.parse_slots(list, CONTENT_PARAM)?;
        Ok(self)
    }

    /// Key columns bound to the ACL query, in bind order.
    pub fn acl_sql_columns(mut self, list: &str) -> Result<Self> {
        self.acl_slots = self.parse_slots(list, ACL_PARAM)?;
        Ok(self)
    }

    /// Use the single string key value as the document id without escaping.
    pub fn doc_id_is_url(mut self, doc_id_is_url: bool) -> Self {
        self.doc_id_is_url = doc_id_is_url;
        self
    }

    /// Resolve untyped key columns from engine column types.
    ///
    /// Columns that already have a declared type are left alone, and names
    /// that are not key columns are ignored.
    pub fn add_column_types<I, S>(&mut self, sql_types: I) -> Result<()>
    where
        I: IntoIterator<Item = (S, SqlType)>,
        S: AsRef<str>,
    {
        for (name, sql_type) in sql_types {
            let name = name.as_ref();
            if let Some(i) = self.position(name) {
                if self.types[i].is_none() {
                    let column_type = classify_column(&self.names[i], sql_type)?;
                    debug!(
                        "resolved key column {} from {} to {}",
                        self.names[i], sql_type, column_type
                    );
                    self.types[i] = Some(column_type);
                }
            }
        }
        Ok(())
    }

    /// Resolve untyped key columns from a representative cursor's metadata.
    pub fn add_column_types_from<C: RowCursor + ?Sized>(&mut self, cursor: &C) -> Result<()> {
        self.add_column_types(cursor.columns().iter().map(|c| (c.label.as_str(), c.sql_type)))
    }

    /// Whether some key column still has no type.
    pub fn needs_column_types(&self) -> bool {
        self.types.iter().any(Option::is_none)
    }

    /// Key column names in declaration order.
    pub fn doc_id_columns(&self) -> &[String] {
        &self.names
    }

    /// Declared or resolved type of a key column.
    pub fn column_type(&self, name: &str) -> Option<ColumnType> {
        self.position(name).and_then(|i| self.types[i])
    }

    /// Content query parameter names in bind order.
    pub fn content_columns(&self) -> Vec<&str> {
        self.slot_names(self.content_slots.as_deref())
    }

    /// ACL query parameter names in bind order.
    pub fn acl_columns(&self) -> Vec<&str> {
        self.slot_names(self.acl_slots.as_deref())
    }

    /// Finish the key. Every column must have a type by now.
    pub fn build(self) -> Result<UniqueKey> {
        let untyped: Vec<&str> = self
            .names
            .iter()
            .zip(&self.types)
            .filter(|(_, t)| t.is_none())
            .map(|(n, _)| n.as_str())
            .collect();
        if !untyped.is_empty() {
            return Err(DocError::Config(format!(
                "Unknown column type for the following columns: [{}]",
                untyped.join(", ")
            )));
        }

        let columns: Vec<KeyColumn> = self
            .names
            .into_iter()
            .zip(self.types)
            .filter_map(|(name, t)| t.map(|column_type| KeyColumn { name, column_type }))
            .collect();

        if self.doc_id_is_url
            && (columns.len() != 1 || columns[0].column_type != ColumnType::String)
        {
            return Err(DocError::Config(
                "Invalid db.uniqueKey value: The key must be a single string column \
                 when docId.isUrl=true."
                    .to_string(),
            ));
        }

        let all: Vec<usize> = (0..columns.len()).collect();
        let key = UniqueKey {
            content_slots: self.content_slots.unwrap_or_else(|| all.clone()),
            acl_slots: self.acl_slots.unwrap_or(all),
            columns,
            doc_id_is_url: self.doc_id_is_url,
        };
        info!(
            "unique key: {} column(s), {} content parameter(s), {} acl parameter(s), doc id is url: {}",
            key.columns.len(),
            key.content_slots.len(),
            key.acl_slots.len(),
            key.doc_id_is_url
        );
        Ok(key)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n.eq_ignore_ascii_case(name))
    }

    fn parse_slots(&self, list: &str, param: &str) -> Result<Option<Vec<usize>>> {
        if list.trim().is_empty() {
            return Ok(None);
        }
        list.split(',')
            .map(|name| {
                let name = name.trim();
                self.position(name).ok_or_else(|| {
                    DocError::Config(format!(
                        "Unknown column '{}' from {}: {}",
                        name, param, list
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()
            .map(Some)
    }

    fn slot_names(&self, slots: Option<&[usize]>) -> Vec<&str> {
        match slots {
            Some(slots) => slots.iter().map(|&i| self.names[i].as_str()).collect(),
            None => self.names.iter().map(String::as_str).collect(),
        }
    }
}

/// Immutable composite key configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueKey {
    columns: Vec<KeyColumn>,
    content_slots: Vec<usize>,
    acl_slots: Vec<usize>,
    doc_id_is_url: bool,
}

impl UniqueKey {
    pub fn columns(&self) -> &[KeyColumn] {
        &self.columns
    }

    pub fn doc_id_is_url(&self) -> bool {
        self.doc_id_is_url
    }

    /// Key column indexes bound to the content query, in bind order.
    pub fn content_slots(&self) -> &[usize] {
        &self.content_slots
    }

    /// Key column indexes bound to the ACL query, in bind order.
    pub fn acl_slots(&self) -> &[usize] {
        &self.acl_slots
    }

    /// Document id for a row using the configured mode.
    pub fn make_doc_id(&self, row: &Row) -> Result<String> {
        self.make_unique_id(row, !self.doc_id_is_url)
    }

    /// Build the id for the key columns of `row`.
    ///
    /// With `encode`, every field is escaped and fields are joined with `/`.
    /// Without it the single string value is returned as is; when the key is
    /// configured with `doc_id_is_url` that value must be a URL with a host.
    ///
    /// # Panics
    ///
    /// If `encode` is false and the key is not a single string column.
    pub fn make_unique_id(&self, row: &Row, encode: bool) -> Result<String> {
        if !encode {
            assert!(
                self.columns.len() == 1 && self.columns[0].column_type == ColumnType::String,
                "not encoding implies exactly one string key column"
            );
            let value = canonical_value(&self.columns[0], row)?;
            if self.doc_id_is_url {
                validate_uri(&value)?;
            }
            return Ok(value);
        }

        let parts = self
            .columns
            .iter()
            .map(|col| canonical_value(col, row).map(|v| encode_slash_in_data(&v)))
            .collect::<Result<Vec<_>>>()?;
        Ok(parts.join("/"))
    }

    /// Bind the key values carried by `id` at the given slots.
    ///
    /// `slots[i]` is the key column bound at position `i + 1`. All id
    /// problems are reported as [`DocError::MalformedId`]; a slot past the
    /// last key column is a [`DocError::Config`].
    pub fn set_parameters<B: ParameterBinder + ?Sized>(
        &self,
        binder: &mut B,
        id: &str,
        encode: bool,
        slots: &[usize],
    ) -> Result<()> {
        let values: Vec<String> = if encode {
            let parts = split_id(id);
            if parts.len() != self.columns.len() {
                return Err(DocError::malformed_id(
                    id,
                    format!(
                        "Wrong number of values for primary key: expected {}, parts: {:?}",
                        self.columns.len(),
                        parts
                    ),
                ));
            }
            parts
                .into_iter()
                .map(decode_slash_in_data)
                .collect::<Result<Vec<_>>>()?
        } else {
            if self.columns.len() != 1 {
                return Err(DocError::malformed_id(
                    id,
                    "Wrong number of values for primary key: unencoded id needs a single key column",
                ));
            }
            vec![id.to_string()]
        };

        for (i, &slot) in slots.iter().enumerate() {
            let position = i + 1;
            let (column, value) = match (self.columns.get(slot), values.get(slot)) {
                (Some(column), Some(value)) => (column, value.as_str()),
                _ => {
                    return Err(DocError::Config(format!(
                        "parameter slot {} is out of range for a key of {} column(s)",
                        slot,
                        self.columns.len()
                    )))
                }
            };
            let bad = |what: &str| {
                DocError::malformed_id(
                    id,
                    format!("value {:?} for column '{}' is not a valid {}", value, column.name, what),
                )
            };
            match column.column_type {
                ColumnType::Int => {
                    let v = value.parse::<i32>().map_err(|_| bad("int"))?;
                    binder.set_int(position, v)?;
                }
                ColumnType::Long => {
                    let v = value.parse::<i64>().map_err(|_| bad("long"))?;
                    binder.set_long(position, v)?;
                }
                ColumnType::String => binder.set_string(position, value)?,
                ColumnType::Date => {
                    let v = NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| bad("date"))?;
                    binder.set_date(position, v)?;
                }
                ColumnType::Time => {
                    let v = NaiveTime::parse_from_str(value, "%H:%M:%S").map_err(|_| bad("time"))?;
                    binder.set_time(position, v)?;
                }
                ColumnType::Timestamp => {
                    let v = value
                        .parse::<i64>()
                        .ok()
                        .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
                        .ok_or_else(|| bad("timestamp"))?;
                    binder.set_timestamp(position, v)?;
                }
            }
        }
        Ok(())
    }

    /// Bind parameters for the content query.
    pub fn set_content_parameters<B: ParameterBinder + ?Sized>(
        &self,
        binder: &mut B,
        id: &str,
    ) -> Result<()> {
        self.set_parameters(binder, id, !self.doc_id_is_url, &self.content_slots)
    }

    /// Bind parameters for the ACL query.
    pub fn set_acl_parameters<B: ParameterBinder + ?Sized>(
        &self,
        binder: &mut B,
        id: &str,
    ) -> Result<()> {
        self.set_parameters(binder, id, !self.doc_id_is_url, &self.acl_slots)
    }
}

/// Canonical string form of a key column's value in `row`.
fn canonical_value(column: &KeyColumn, row: &Row) -> Result<String> {
    let name = column.name.as_str();
    let value = row
        .get_by_name(name)
        .ok_or_else(|| DocError::key_value(name, "column not present in row"))?;
    if value.is_null() {
        return Err(DocError::key_value(name, "NULL cannot be part of a document id"));
    }
    let mismatch = || {
        DocError::key_value(
            name,
            format!("value {:?} cannot be read as {}", value, column.column_type),
        )
    };

    match column.column_type {
        ColumnType::Int => {
            let v = value.as_i64().ok_or_else(mismatch)?;
            i32::try_from(v).map(|v| v.to_string()).map_err(|_| mismatch())
        }
        ColumnType::Long => value.as_i64().map(|v| v.to_string()).ok_or_else(mismatch),
        ColumnType::String => value.to_text().ok_or_else(mismatch),
        ColumnType::Date => match value {
            SqlValue::Date(d) => Ok(d.format("%Y-%m-%d").to_string()),
            SqlValue::Timestamp(ts) => Ok(ts.date_naive().format("%Y-%m-%d").to_string()),
            SqlValue::Text(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                .map(|d| d.format("%Y-%m-%d").to_string())
                .map_err(|_| mismatch()),
            _ => Err(mismatch()),
        },
        ColumnType::Time => match value {
            SqlValue::Time(t) => Ok(t.format("%H:%M:%S").to_string()),
            SqlValue::Text(s) => NaiveTime::parse_from_str(s.trim(), "%H:%M:%S")
                .map(|t| t.format("%H:%M:%S").to_string())
                .map_err(|_| mismatch()),
            _ => Err(mismatch()),
        },
        ColumnType::Timestamp => match value {
            SqlValue::Timestamp(ts) => Ok(ts.timestamp_millis().to_string()),
            SqlValue::Date(d) => d
                .and_hms_opt(0, 0, 0)
                .map(|dt| Utc.from_utc_datetime(&dt).timestamp_millis().to_string())
                .ok_or_else(mismatch),
            SqlValue::I64(ms) => Ok(ms.to_string()),
            _ => Err(mismatch()),
        },
    }
}
