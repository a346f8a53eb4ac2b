//! Engine type identifiers reported by a cursor's column metadata.
//!
//! Drivers describe columns with JDBC-style integer type codes. `SqlType`
//! is the closed set of those codes; anything a driver invents that is not in
//! the standard table is carried as [`SqlType::Vendor`] with its raw code.

use std::fmt;
use std::str::FromStr;

use crate::error::DocError;

/// Oracle's BFILE type code. Not part of the standard table but treated as binary.
const ORACLE_BFILE: i32 = -13;

/// SQL type of a result column, keyed by JDBC type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlType {
    Bit,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Float,
    Real,
    Double,
    Numeric,
    Decimal,
    Char,
    VarChar,
    LongVarChar,
    Date,
    Time,
    Timestamp,
    Binary,
    VarBinary,
    LongVarBinary,
    Null,
    Other,
    JavaObject,
    Distinct,
    Struct,
    Array,
    Blob,
    Clob,
    Ref,
    DataLink,
    Boolean,
    RowId,
    NChar,
    NVarChar,
    LongNVarChar,
    NClob,
    SqlXml,
    RefCursor,
    TimeWithTimezone,
    TimestampWithTimezone,
    /// Oracle BFILE (code -13).
    BFile,
    /// Any code outside the standard table.
    Vendor(i32),
}

/// Standard types in code order, used for name lookups.
const STANDARD_TYPES: &[SqlType] = &[
    SqlType::Bit,
    SqlType::TinyInt,
    SqlType::SmallInt,
    SqlType::Integer,
    SqlType::BigInt,
    SqlType::Float,
    SqlType::Real,
    SqlType::Double,
    SqlType::Numeric,
    SqlType::Decimal,
    SqlType::Char,
    SqlType::VarChar,
    SqlType::LongVarChar,
    SqlType::Date,
    SqlType::Time,
    SqlType::Timestamp,
    SqlType::Binary,
    SqlType::VarBinary,
    SqlType::LongVarBinary,
    SqlType::Null,
    SqlType::Other,
    SqlType::JavaObject,
    SqlType::Distinct,
    SqlType::Struct,
    SqlType::Array,
    SqlType::Blob,
    SqlType::Clob,
    SqlType::Ref,
    SqlType::DataLink,
    SqlType::Boolean,
    SqlType::RowId,
    SqlType::NChar,
    SqlType::NVarChar,
    SqlType::LongNVarChar,
    SqlType::NClob,
    SqlType::SqlXml,
    SqlType::RefCursor,
    SqlType::TimeWithTimezone,
    SqlType::TimestampWithTimezone,
];

impl SqlType {
    /// Map a JDBC type code to a `SqlType`.
    pub fn from_code(code: i32) -> Self {
        match code {
            -7 => SqlType::Bit,
            -6 => SqlType::TinyInt,
            5 => SqlType::SmallInt,
            4 => SqlType::Integer,
            -5 => SqlType::BigInt,
            6 => SqlType::Float,
            7 => SqlType::Real,
            8 => SqlType::Double,
            2 => SqlType::Numeric,
            3 => SqlType::Decimal,
            1 => SqlType::Char,
            12 => SqlType::VarChar,
            -1 => SqlType::LongVarChar,
            91 => SqlType::Date,
            92 => SqlType::Time,
            93 => SqlType::Timestamp,
            -2 => SqlType::Binary,
            -3 => SqlType::VarBinary,
            -4 => SqlType::LongVarBinary,
            0 => SqlType::Null,
            1111 => SqlType::Other,
            2000 => SqlType::JavaObject,
            2001 => SqlType::Distinct,
            2002 => SqlType::Struct,
            2003 => SqlType::Array,
            2004 => SqlType::Blob,
            2005 => SqlType::Clob,
            2006 => SqlType::Ref,
            70 => SqlType::DataLink,
            16 => SqlType::Boolean,
            -8 => SqlType::RowId,
            -15 => SqlType::NChar,
            -9 => SqlType::NVarChar,
            -16 => SqlType::LongNVarChar,
            2011 => SqlType::NClob,
            2009 => SqlType::SqlXml,
            2012 => SqlType::RefCursor,
            2013 => SqlType::TimeWithTimezone,
            2014 => SqlType::TimestampWithTimezone,
            ORACLE_BFILE => SqlType::BFile,
            other => SqlType::Vendor(other),
        }
    }

    /// JDBC type code for this type.
    pub fn code(self) -> i32 {
        match self {
            SqlType::Bit => -7,
            SqlType::TinyInt => -6,
            SqlType::SmallInt => 5,
            SqlType::Integer => 4,
            SqlType::BigInt => -5,
            SqlType::Float => 6,
            SqlType::Real => 7,
            SqlType::Double => 8,
            SqlType::Numeric => 2,
            SqlType::Decimal => 3,
            SqlType::Char => 1,
            SqlType::VarChar => 12,
            SqlType::LongVarChar => -1,
            SqlType::Date => 91,
            SqlType::Time => 92,
            SqlType::Timestamp => 93,
            SqlType::Binary => -2,
            SqlType::VarBinary => -3,
            SqlType::LongVarBinary => -4,
            SqlType::Null => 0,
            SqlType::Other => 1111,
            SqlType::JavaObject => 2000,
            SqlType::Distinct => 2001,
            SqlType::Struct => 2002,
            SqlType::Array => 2003,
            SqlType::Blob => 2004,
            SqlType::Clob => 2005,
            SqlType::Ref => 2006,
            SqlType::DataLink => 70,
            SqlType::Boolean => 16,
            SqlType::RowId => -8,
            SqlType::NChar => -15,
            SqlType::NVarChar => -9,
            SqlType::LongNVarChar => -16,
            SqlType::NClob => 2011,
            SqlType::SqlXml => 2009,
            SqlType::RefCursor => 2012,
            SqlType::TimeWithTimezone => 2013,
            SqlType::TimestampWithTimezone => 2014,
            SqlType::BFile => ORACLE_BFILE,
            SqlType::Vendor(code) => code,
        }
    }

    /// Standard JDBC name, or `None` for codes outside the standard table.
    pub fn standard_name(self) -> Option<&'static str> {
        let name = match self {
            SqlType::Bit => "BIT",
            SqlType::TinyInt => "TINYINT",
            SqlType::SmallInt => "SMALLINT",
            SqlType::Integer => "INTEGER",
            SqlType::BigInt => "BIGINT",
            SqlType::Float => "FLOAT",
            SqlType::Real => "REAL",
            SqlType::Double => "DOUBLE",
            SqlType::Numeric => "NUMERIC",
            SqlType::Decimal => "DECIMAL",
            SqlType::Char => "CHAR",
            SqlType::VarChar => "VARCHAR",
            SqlType::LongVarChar => "LONGVARCHAR",
            SqlType::Date => "DATE",
            SqlType::Time => "TIME",
            SqlType::Timestamp => "TIMESTAMP",
            SqlType::Binary => "BINARY",
            SqlType::VarBinary => "VARBINARY",
            SqlType::LongVarBinary => "LONGVARBINARY",
            SqlType::Null => "NULL",
            SqlType::Other => "OTHER",
            SqlType::JavaObject => "JAVA_OBJECT",
            SqlType::Distinct => "DISTINCT",
            SqlType::Struct => "STRUCT",
            SqlType::Array => "ARRAY",
            SqlType::Blob => "BLOB",
            SqlType::Clob => "CLOB",
            SqlType::Ref => "REF",
            SqlType::DataLink => "DATALINK",
            SqlType::Boolean => "BOOLEAN",
            SqlType::RowId => "ROWID",
            SqlType::NChar => "NCHAR",
            SqlType::NVarChar => "NVARCHAR",
            SqlType::LongNVarChar => "LONGNVARCHAR",
            SqlType::NClob => "NCLOB",
            SqlType::SqlXml => "SQLXML",
            SqlType::RefCursor => "REF_CURSOR",
            SqlType::TimeWithTimezone => "TIME_WITH_TIMEZONE",
            SqlType::TimestampWithTimezone => "TIMESTAMP_WITH_TIMEZONE",
            SqlType::BFile | SqlType::Vendor(_) => return None,
        };
        Some(name)
    }

    /// Look up a standard type by name (case-insensitive).
    ///
    /// `BFILE` is accepted as well, and so is a bare integer code.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.eq_ignore_ascii_case("BFILE") {
            return Some(SqlType::BFile);
        }
        if let Ok(code) = name.parse::<i32>() {
            return Some(SqlType::from_code(code));
        }
        STANDARD_TYPES
            .iter()
            .copied()
            .find(|t| t.standard_name().is_some_and(|n| n.eq_ignore_ascii_case(name)))
    }

    /// Binary types rendered as base64 in the XML stream.
    pub fn is_binary(self) -> bool {
        matches!(
            self,
            SqlType::Binary
                | SqlType::VarBinary
                | SqlType::LongVarBinary
                | SqlType::Blob
                | SqlType::BFile
        )
    }

    /// Structured types with no single-value representation.
    pub fn is_structured(self) -> bool {
        matches!(self, SqlType::Array | SqlType::Struct | SqlType::Ref)
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.standard_name() {
            Some(name) => f.write_str(name),
            None if *self == SqlType::BFile => f.write_str("BFILE"),
            None => write!(f, "{}", self.code()),
        }
    }
}

impl FromStr for SqlType {
    type Err = DocError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SqlType::from_name(s).ok_or_else(|| DocError::Config(format!("Unknown SQL type '{}'", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_round_trip_for_standard_types() {
        for ty in STANDARD_TYPES {
            assert_eq!(SqlType::from_code(ty.code()), *ty);
        }
        assert_eq!(SqlType::from_code(-13), SqlType::BFile);
        assert_eq!(SqlType::from_code(-155), SqlType::Vendor(-155));
    }

    #[test]
    fn test_from_name() {
        assert_eq!(SqlType::from_name("varchar"), Some(SqlType::VarChar));
        assert_eq!(SqlType::from_name(" LONGNVARCHAR "), Some(SqlType::LongNVarChar));
        assert_eq!(SqlType::from_name("bfile"), Some(SqlType::BFile));
        assert_eq!(SqlType::from_name("1111"), Some(SqlType::Other));
        assert_eq!(SqlType::from_name("serial"), None);
        assert!("serial".parse::<SqlType>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(SqlType::Timestamp.to_string(), "TIMESTAMP");
        assert_eq!(SqlType::BFile.to_string(), "BFILE");
        assert_eq!(SqlType::Vendor(-101).to_string(), "-101");
    }

    #[test]
    fn test_binary_and_structured() {
        assert!(SqlType::Blob.is_binary());
        assert!(SqlType::BFile.is_binary());
        assert!(!SqlType::Clob.is_binary());
        assert!(SqlType::Array.is_structured());
        assert!(!SqlType::Other.is_structured());
    }
}
