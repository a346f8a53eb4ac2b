//! # rowdoc
//!
//! Bridges relational rows and an external document model.
//!
//! - **Composite key codec** ([`key`]): turns the key columns of a row into a
//!   single round-trippable document id, and a document id back into typed
//!   bind parameters for content and ACL queries.
//! - **Column type registry** ([`typemap`]): maps engine type codes to the
//!   six logical key column types.
//! - **Streaming XML serializer** ([`xml`]): renders a forward-only cursor as
//!   a self-describing XML event stream without buffering the result set.
//!
//! ## Example
//!
//! ```rust
//! use rowdoc::core::{ColumnMeta, RowCursor, SqlType, SqlValue, VecCursor};
//! use rowdoc::key::UniqueKeyBuilder;
//!
//! let mut cursor = VecCursor::new(
//!     vec![
//!         ColumnMeta::new("a", SqlType::VarChar),
//!         ColumnMeta::new("b", SqlType::VarChar),
//!     ],
//!     vec![vec![SqlValue::from("5/5"), SqlValue::from("6/6")]],
//! )?;
//!
//! let mut builder = UniqueKeyBuilder::new("a, b")?;
//! builder.add_column_types_from(&cursor)?;
//! let key = builder.build()?;
//!
//! let row = cursor.next_row()?.expect("one row");
//! assert_eq!(key.make_doc_id(&row)?, "5_/5/6_/6");
//! # Ok::<(), rowdoc::DocError>(())
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod key;
pub mod typemap;
pub mod xml;

// Re-exports for convenient access
pub use config::{Config, KeyConfig, XmlConfig};
pub use error::{DocError, Result};
pub use key::{BoundParameters, ParameterBinder, UniqueKey, UniqueKeyBuilder};
pub use typemap::ColumnType;
pub use xml::{to_xml_string, write_xml, RowSerializer, TemporalFormat, XmlEvent};
