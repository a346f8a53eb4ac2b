//! Column type registry: engine type codes to key column types.
//!
//! Only six logical types can take part in a document id. Everything the
//! registry cannot map is a configuration error, never a silent fallback.

use std::fmt;
use std::str::FromStr;

use crate::core::{ColumnMeta, SqlType};
use crate::error::{DocError, Result};

/// Logical type of a key column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Int,
    Long,
    String,
    Date,
    Time,
    Timestamp,
}

impl ColumnType {
    /// Declaration token for this type.
    pub fn as_str(self) -> &'static str {
        match self {
            ColumnType::Int => "int",
            ColumnType::Long => "long",
            ColumnType::String => "string",
            ColumnType::Date => "date",
            ColumnType::Time => "time",
            ColumnType::Timestamp => "timestamp",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = DocError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "int" => Ok(ColumnType::Int),
            "long" => Ok(ColumnType::Long),
            "string" => Ok(ColumnType::String),
            "date" => Ok(ColumnType::Date),
            "time" => Ok(ColumnType::Time),
            "timestamp" => Ok(ColumnType::Timestamp),
            _ => Err(DocError::Config(format!("Unknown column type '{}'", s.trim()))),
        }
    }
}

/// Map an engine type to the key column type used to carry it.
pub fn classify(sql_type: SqlType) -> Result<ColumnType> {
    match sql_type {
        // Integer types
        SqlType::Bit
        | SqlType::Boolean
        | SqlType::TinyInt
        | SqlType::SmallInt
        | SqlType::Integer => Ok(ColumnType::Int),
        SqlType::BigInt => Ok(ColumnType::Long),

        // Character types
        SqlType::Char
        | SqlType::VarChar
        | SqlType::LongVarChar
        | SqlType::NChar
        | SqlType::NVarChar
        | SqlType::LongNVarChar
        | SqlType::DataLink => Ok(ColumnType::String),

        // Date/time types
        SqlType::Date => Ok(ColumnType::Date),
        SqlType::Time => Ok(ColumnType::Time),
        SqlType::Timestamp => Ok(ColumnType::Timestamp),

        other => Err(DocError::Config(format!(
            "SQL type {} cannot be used in a unique key",
            other
        ))),
    }
}

/// Classify a named column, reporting the column and its type on failure.
pub fn classify_column(column: &str, sql_type: SqlType) -> Result<ColumnType> {
    classify(sql_type).map_err(|_| {
        DocError::Config(format!(
            "Invalid UniqueKey SQLtype {} for '{}'",
            sql_type, column
        ))
    })
}

/// Text of the `SQLType` attribute for a result column.
///
/// Standard JDBC name when the code has one, else the driver's type name,
/// else the numeric code.
pub fn column_type_name(meta: &ColumnMeta) -> String {
    match (meta.sql_type.standard_name(), meta.type_name.as_deref()) {
        (Some(name), _) => name.to_string(),
        (None, Some(driver)) if !driver.trim().is_empty() => driver.to_string(),
        (None, _) => meta.sql_type.code().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ===== classify =====

    #[test]
    fn test_integer_family() {
        for ty in [
            SqlType::Bit,
            SqlType::Boolean,
            SqlType::TinyInt,
            SqlType::SmallInt,
            SqlType::Integer,
        ] {
            assert_eq!(classify(ty).unwrap(), ColumnType::Int, "{}", ty);
        }
        assert_eq!(classify(SqlType::BigInt).unwrap(), ColumnType::Long);
    }

    #[test]
    fn test_character_family() {
        for ty in [
            SqlType::Char,
            SqlType::VarChar,
            SqlType::LongVarChar,
            SqlType::NChar,
            SqlType::NVarChar,
            SqlType::LongNVarChar,
            SqlType::DataLink,
        ] {
            assert_eq!(classify(ty).unwrap(), ColumnType::String, "{}", ty);
        }
    }

    #[test]
    fn test_temporal_family() {
        assert_eq!(classify(SqlType::Date).unwrap(), ColumnType::Date);
        assert_eq!(classify(SqlType::Time).unwrap(), ColumnType::Time);
        assert_eq!(classify(SqlType::Timestamp).unwrap(), ColumnType::Timestamp);
    }

    #[test]
    fn test_unmappable_types_are_config_errors() {
        for ty in [
            SqlType::Blob,
            SqlType::Clob,
            SqlType::Array,
            SqlType::Binary,
            SqlType::Double,
            SqlType::Float,
            SqlType::Decimal,
            SqlType::Vendor(-101),
        ] {
            assert!(matches!(classify(ty), Err(DocError::Config(_))), "{}", ty);
        }
    }

    #[test]
    fn test_classify_column_names_column_and_type() {
        let msg = classify_column("photo", SqlType::Blob).unwrap_err().to_string();
        assert!(msg.contains("Invalid UniqueKey SQLtype"));
        assert!(msg.contains("BLOB"));
        assert!(msg.contains("'photo'"));
    }

    // ===== tokens =====

    #[test]
    fn test_parse_tokens_case_insensitive() {
        assert_eq!("INT".parse::<ColumnType>().unwrap(), ColumnType::Int);
        assert_eq!(" Timestamp ".parse::<ColumnType>().unwrap(), ColumnType::Timestamp);
        assert!("invalid".parse::<ColumnType>().is_err());
        assert_eq!(ColumnType::Long.to_string(), "long");
    }

    // ===== column_type_name =====

    #[test]
    fn test_column_type_name_fallbacks() {
        let standard = ColumnMeta::new("a", SqlType::VarChar).with_type_name("varchar2");
        assert_eq!(column_type_name(&standard), "VARCHAR");

        let vendor = ColumnMeta::new("b", SqlType::Vendor(-101)).with_type_name("TIMESTAMP WITH TZ");
        assert_eq!(column_type_name(&vendor), "TIMESTAMP WITH TZ");

        let bare = ColumnMeta::new("c", SqlType::Vendor(-101));
        assert_eq!(column_type_name(&bare), "-101");

        let bfile = ColumnMeta::new("d", SqlType::BFile);
        assert_eq!(column_type_name(&bfile), "-13");
    }
}
