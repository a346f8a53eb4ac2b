//! SQL value types read from a relational cursor.
//!
//! Values mirror what a JDBC-style driver hands back for a column: scalars,
//! character and binary data, temporal values, and the two shapes that have no
//! stable text form (arrays and engine-native objects).

use std::borrow::Cow;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Engine-native opaque value (e.g. a serialized object in an `OTHER` column).
///
/// `display` is the value's displayable string form once deserialized; it is
/// `None` when the driver could not produce one.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectValue {
    /// Driver-reported type name of the object, if any.
    pub type_name: Option<String>,
    /// Displayable string form.
    pub display: Option<String>,
}

impl ObjectValue {
    /// Object with a known display form.
    pub fn displayable(display: impl Into<String>) -> Self {
        Self {
            type_name: None,
            display: Some(display.into()),
        }
    }

    /// Object whose contents cannot be shown as text.
    pub fn opaque(type_name: impl Into<String>) -> Self {
        Self {
            type_name: Some(type_name.into()),
            display: None,
        }
    }
}

/// SQL value enum for type-safe row handling.
///
/// Uses `Cow` for string and byte data so cursors can lend from their own
/// buffers; `into_owned` detaches a value when it has to outlive the row.
///
/// # Example
///
/// ```rust
/// use std::borrow::Cow;
/// use rowdoc::core::SqlValue;
///
/// let borrowed: SqlValue<'_> = SqlValue::Text(Cow::Borrowed("hello"));
/// let owned: SqlValue<'static> = borrowed.into_owned();
/// assert_eq!(owned.to_text().as_deref(), Some("hello"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue<'a> {
    /// SQL NULL.
    Null,

    /// Boolean value (BIT, BOOLEAN).
    Bool(bool),

    /// 16-bit signed integer (tinyint/smallint).
    I16(i16),

    /// 32-bit signed integer (int).
    I32(i32),

    /// 64-bit signed integer (bigint).
    I64(i64),

    /// 32-bit floating point (real).
    F32(f32),

    /// 64-bit floating point (float/double).
    F64(f64),

    /// Decimal value with arbitrary precision.
    Decimal(Decimal),

    /// Character data (CHAR family, CLOB, SQLXML).
    Text(Cow<'a, str>),

    /// Binary data (BINARY family, BLOB).
    Bytes(Cow<'a, [u8]>),

    /// UUID/GUID value.
    Uuid(Uuid),

    /// Date without time component.
    Date(NaiveDate),

    /// Local wall-clock time without date component.
    Time(NaiveTime),

    /// Timestamp as an instant.
    Timestamp(DateTime<Utc>),

    /// Multi-valued column.
    Array(Vec<SqlValue<'a>>),

    /// Engine-native object.
    Object(ObjectValue),
}

impl<'a> SqlValue<'a> {
    /// Convert to a fully owned value with `'static` lifetime.
    #[must_use]
    pub fn into_owned(self) -> SqlValue<'static> {
        match self {
            SqlValue::Null => SqlValue::Null,
            SqlValue::Bool(v) => SqlValue::Bool(v),
            SqlValue::I16(v) => SqlValue::I16(v),
            SqlValue::I32(v) => SqlValue::I32(v),
            SqlValue::I64(v) => SqlValue::I64(v),
            SqlValue::F32(v) => SqlValue::F32(v),
            SqlValue::F64(v) => SqlValue::F64(v),
            SqlValue::Decimal(v) => SqlValue::Decimal(v),
            SqlValue::Text(v) => SqlValue::Text(Cow::Owned(v.into_owned())),
            SqlValue::Bytes(v) => SqlValue::Bytes(Cow::Owned(v.into_owned())),
            SqlValue::Uuid(v) => SqlValue::Uuid(v),
            SqlValue::Date(v) => SqlValue::Date(v),
            SqlValue::Time(v) => SqlValue::Time(v),
            SqlValue::Timestamp(v) => SqlValue::Timestamp(v),
            SqlValue::Array(v) => SqlValue::Array(v.into_iter().map(SqlValue::into_owned).collect()),
            SqlValue::Object(v) => SqlValue::Object(v),
        }
    }

    /// Check if this value is NULL.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Integer view of the value, the way a driver's `getLong` would coerce it.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SqlValue::Bool(b) => Some(i64::from(*b)),
            SqlValue::I16(v) => Some(i64::from(*v)),
            SqlValue::I32(v) => Some(i64::from(*v)),
            SqlValue::I64(v) => Some(*v),
            SqlValue::Decimal(d) if d.fract().is_zero() => d.to_string().parse().ok(),
            SqlValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Text form of the value, or `None` for values without one
    /// (NULL, binary data, arrays, undisplayable objects, timestamps).
    ///
    /// Timestamps are excluded because their text form depends on a zone.
    pub fn to_text(&self) -> Option<String> {
        match self {
            SqlValue::Bool(v) => Some(v.to_string()),
            SqlValue::I16(v) => Some(v.to_string()),
            SqlValue::I32(v) => Some(v.to_string()),
            SqlValue::I64(v) => Some(v.to_string()),
            SqlValue::F32(v) => Some(v.to_string()),
            SqlValue::F64(v) => Some(v.to_string()),
            SqlValue::Decimal(v) => Some(v.to_string()),
            SqlValue::Text(v) => Some(v.to_string()),
            SqlValue::Uuid(v) => Some(v.to_string()),
            SqlValue::Date(v) => Some(v.format("%Y-%m-%d").to_string()),
            SqlValue::Time(v) => Some(v.format("%H:%M:%S").to_string()),
            SqlValue::Object(v) => v.display.clone(),
            SqlValue::Null | SqlValue::Bytes(_) | SqlValue::Timestamp(_) | SqlValue::Array(_) => {
                None
            }
        }
    }
}

// Convenience constructors for common cases
impl<'a> SqlValue<'a> {
    /// Create a text value from a borrowed string slice.
    #[must_use]
    pub fn text_borrowed(s: &'a str) -> Self {
        SqlValue::Text(Cow::Borrowed(s))
    }

    /// Create a text value from an owned String.
    #[must_use]
    pub fn text_owned(s: String) -> SqlValue<'static> {
        SqlValue::Text(Cow::Owned(s))
    }

    /// Create a bytes value from an owned Vec<u8>.
    #[must_use]
    pub fn bytes_owned(b: Vec<u8>) -> SqlValue<'static> {
        SqlValue::Bytes(Cow::Owned(b))
    }
}

impl From<bool> for SqlValue<'static> {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl From<i16> for SqlValue<'static> {
    fn from(v: i16) -> Self {
        SqlValue::I16(v)
    }
}

impl From<i32> for SqlValue<'static> {
    fn from(v: i32) -> Self {
        SqlValue::I32(v)
    }
}

impl From<i64> for SqlValue<'static> {
    fn from(v: i64) -> Self {
        SqlValue::I64(v)
    }
}

impl From<f64> for SqlValue<'static> {
    fn from(v: f64) -> Self {
        SqlValue::F64(v)
    }
}

impl From<String> for SqlValue<'static> {
    fn from(v: String) -> Self {
        SqlValue::Text(Cow::Owned(v))
    }
}

impl<'a> From<&'a str> for SqlValue<'a> {
    fn from(v: &'a str) -> Self {
        SqlValue::Text(Cow::Borrowed(v))
    }
}

impl From<Vec<u8>> for SqlValue<'static> {
    fn from(v: Vec<u8>) -> Self {
        SqlValue::Bytes(Cow::Owned(v))
    }
}

impl From<Decimal> for SqlValue<'static> {
    fn from(v: Decimal) -> Self {
        SqlValue::Decimal(v)
    }
}

impl From<Uuid> for SqlValue<'static> {
    fn from(v: Uuid) -> Self {
        SqlValue::Uuid(v)
    }
}

impl From<NaiveDate> for SqlValue<'static> {
    fn from(v: NaiveDate) -> Self {
        SqlValue::Date(v)
    }
}

impl From<NaiveTime> for SqlValue<'static> {
    fn from(v: NaiveTime) -> Self {
        SqlValue::Time(v)
    }
}

impl From<DateTime<Utc>> for SqlValue<'static> {
    fn from(v: DateTime<Utc>) -> Self {
        SqlValue::Timestamp(v)
    }
}

impl<T: Into<SqlValue<'static>>> From<Option<T>> for SqlValue<'static> {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => SqlValue::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_value_into_owned() {
        let borrowed: SqlValue<'_> = SqlValue::Text(Cow::Borrowed("hello"));
        let owned: SqlValue<'static> = borrowed.into_owned();
        assert_eq!(owned, SqlValue::Text(Cow::Owned("hello".to_string())));
    }

    #[test]
    fn test_sql_value_is_null() {
        assert!(SqlValue::Null.is_null());
        assert!(!SqlValue::I32(42).is_null());
        let v: SqlValue<'static> = None::<i32>.into();
        assert!(v.is_null());
    }

    #[test]
    fn test_as_i64_coercions() {
        assert_eq!(SqlValue::I16(-7).as_i64(), Some(-7));
        assert_eq!(SqlValue::Bool(true).as_i64(), Some(1));
        assert_eq!(SqlValue::text_borrowed(" 42 ").as_i64(), Some(42));
        assert_eq!(SqlValue::Decimal(Decimal::new(1200, 2)).as_i64(), Some(12));
        assert_eq!(SqlValue::Decimal(Decimal::new(1250, 2)).as_i64(), None);
        assert_eq!(SqlValue::F64(1.0).as_i64(), None);
    }

    #[test]
    fn test_to_text() {
        assert_eq!(SqlValue::I64(-12).to_text().as_deref(), Some("-12"));
        assert_eq!(SqlValue::Bool(false).to_text().as_deref(), Some("false"));
        let date = NaiveDate::from_ymd_opt(2007, 8, 9).unwrap();
        assert_eq!(SqlValue::Date(date).to_text().as_deref(), Some("2007-08-09"));
        let time = NaiveTime::from_hms_milli_opt(12, 34, 56, 789).unwrap();
        assert_eq!(SqlValue::Time(time).to_text().as_deref(), Some("12:34:56"));
        assert_eq!(SqlValue::bytes_owned(vec![1, 2]).to_text(), None);
        assert_eq!(
            SqlValue::Object(ObjectValue::displayable("hello world")).to_text().as_deref(),
            Some("hello world")
        );
        assert_eq!(SqlValue::Object(ObjectValue::opaque("GEOMETRY")).to_text(), None);
    }
}
