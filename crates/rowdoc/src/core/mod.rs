//! Core row model shared by the key codec and the XML serializer.
//!
//! - [`value`]: SQL value representation with borrowed or owned data
//! - [`sql_type`]: JDBC-style engine type codes
//! - [`cursor`]: column metadata, rows and the forward-only [`RowCursor`] trait

pub mod cursor;
pub mod sql_type;
pub mod value;

// Re-export commonly used types for convenience
pub use cursor::{ColumnMeta, Row, RowCursor, VecCursor};
pub use sql_type::SqlType;
pub use value::{ObjectValue, SqlValue};
