//! Table fixtures: column metadata plus rows, loaded from YAML or JSON.
//!
//! ```yaml
//! columns:
//!   - { label: ID, type: INTEGER }
//!   - { label: NAME, type: VARCHAR }
//!   - { label: SHAPE, type: "-101", type_name: SDO_GEOMETRY }
//! rows:
//!   - [1, "file.txt", null]
//! ```

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use rowdoc::core::{ColumnMeta, ObjectValue, SqlType, SqlValue, VecCursor};
use rowdoc::{DocError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct Fixture {
    columns: Vec<FixtureColumn>,
    #[serde(default)]
    rows: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct FixtureColumn {
    label: String,
    #[serde(rename = "type")]
    sql_type: String,
    #[serde(default)]
    type_name: Option<String>,
}

/// Load a fixture file into an in-memory cursor.
///
/// Files ending in `.json` are read as JSON, everything else as YAML.
pub fn load<P: AsRef<Path>>(path: P) -> Result<VecCursor> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let fixture: Fixture = if is_json {
        serde_json::from_str(&content)?
    } else {
        serde_yaml::from_str(&content)?
    };
    debug!(
        "fixture {}: {} column(s), {} row(s)",
        path.display(),
        fixture.columns.len(),
        fixture.rows.len()
    );
    into_cursor(fixture)
}

fn into_cursor(fixture: Fixture) -> Result<VecCursor> {
    let columns = fixture
        .columns
        .into_iter()
        .map(|c| {
            let sql_type: SqlType = c.sql_type.parse()?;
            let meta = ColumnMeta::new(c.label, sql_type);
            Ok(match c.type_name {
                Some(name) => meta.with_type_name(name),
                None => meta,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut rows = Vec::with_capacity(fixture.rows.len());
    for (r, raw) in fixture.rows.into_iter().enumerate() {
        if raw.len() != columns.len() {
            return Err(DocError::Cursor(format!(
                "fixture row {} has {} values, expected {}",
                r + 1,
                raw.len(),
                columns.len()
            )));
        }
        let values = raw
            .into_iter()
            .zip(&columns)
            .map(|(v, meta)| {
                to_sql_value(meta, v).map_err(|reason| {
                    DocError::Cursor(format!(
                        "fixture row {} column {}: {}",
                        r + 1,
                        meta.label,
                        reason
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        rows.push(values);
    }
    VecCursor::new(columns, rows)
}

/// Convert a fixture value according to the column's SQL type.
fn to_sql_value(meta: &ColumnMeta, value: Value) -> std::result::Result<SqlValue<'static>, String> {
    if value.is_null() {
        return Ok(SqlValue::Null);
    }
    let ty = meta.sql_type;
    match ty {
        SqlType::Bit | SqlType::Boolean => match &value {
            Value::Bool(b) => Ok(SqlValue::Bool(*b)),
            Value::Number(n) => Ok(SqlValue::Bool(n.as_i64() != Some(0))),
            _ => Err(format!("expected a boolean, got {}", value)),
        },
        SqlType::TinyInt | SqlType::SmallInt => {
            let v = integer(&value)?;
            i16::try_from(v)
                .map(SqlValue::I16)
                .map_err(|_| format!("{} out of range for {}", v, ty))
        }
        SqlType::Integer => {
            let v = integer(&value)?;
            i32::try_from(v)
                .map(SqlValue::I32)
                .map_err(|_| format!("{} out of range for {}", v, ty))
        }
        SqlType::BigInt => integer(&value).map(SqlValue::I64),
        SqlType::Real => float(&value).map(|f| SqlValue::F32(f as f32)),
        SqlType::Float | SqlType::Double => float(&value).map(SqlValue::F64),
        SqlType::Numeric | SqlType::Decimal => text(&value)?
            .parse::<Decimal>()
            .map(SqlValue::Decimal)
            .map_err(|e| e.to_string()),
        SqlType::Date => NaiveDate::parse_from_str(&text(&value)?, "%Y-%m-%d")
            .map(SqlValue::Date)
            .map_err(|e| e.to_string()),
        SqlType::Time => {
            let s = text(&value)?;
            NaiveTime::parse_from_str(&s, "%H:%M:%S%.f")
                .or_else(|_| NaiveTime::parse_from_str(&s, "%H:%M:%S"))
                .map(SqlValue::Time)
                .map_err(|e| e.to_string())
        }
        SqlType::Timestamp => timestamp(&value).map(SqlValue::Timestamp),
        _ if ty.is_binary() => STANDARD
            .decode(text(&value)?)
            .map(SqlValue::bytes_owned)
            .map_err(|e| format!("invalid base64: {}", e)),
        SqlType::Array => match value {
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::Null => Ok(SqlValue::Null),
                    other => text(&other).map(SqlValue::text_owned),
                })
                .collect::<std::result::Result<Vec<_>, String>>()
                .map(SqlValue::Array),
            other => Err(format!("expected an array, got {}", other)),
        },
        SqlType::Other | SqlType::JavaObject | SqlType::Vendor(_) => match value {
            Value::String(s) => Ok(SqlValue::Object(ObjectValue::displayable(s))),
            _ => Ok(SqlValue::Object(ObjectValue::opaque(
                meta.type_name.clone().unwrap_or_else(|| ty.to_string()),
            ))),
        },
        _ => text(&value).map(SqlValue::text_owned),
    }
}

fn text(value: &Value) -> std::result::Result<String, String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(format!("expected a scalar, got {}", other)),
    }
}

fn integer(value: &Value) -> std::result::Result<i64, String> {
    match value {
        Value::Number(n) => n.as_i64().ok_or_else(|| format!("{} is not an integer", n)),
        Value::String(s) => s.trim().parse().map_err(|_| format!("{:?} is not an integer", s)),
        other => Err(format!("expected an integer, got {}", other)),
    }
}

fn float(value: &Value) -> std::result::Result<f64, String> {
    match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| format!("{} is not a number", n)),
        Value::String(s) => s.trim().parse().map_err(|_| format!("{:?} is not a number", s)),
        other => Err(format!("expected a number, got {}", other)),
    }
}

/// Epoch millis, RFC 3339, or `YYYY-MM-DD HH:MM:SS[.fff]` taken as UTC.
fn timestamp(value: &Value) -> std::result::Result<DateTime<Utc>, String> {
    if let Value::Number(n) = value {
        let ms = n.as_i64().ok_or_else(|| format!("{} is not epoch millis", n))?;
        return Utc
            .timestamp_millis_opt(ms)
            .single()
            .ok_or_else(|| format!("{} is out of range", ms));
    }
    let s = text(value)?;
    if let Ok(dt) = DateTime::parse_from_rfc3339(&s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(&s, "%Y-%m-%d %H:%M:%S%.f")
        .map(|naive| Utc.from_utc_datetime(&naive))
        .map_err(|_| format!("{:?} is not a timestamp", s))
}
