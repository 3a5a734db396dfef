//! Column types and values.
//!
//! This module defines the type system and value representation of the
//! engine. [`DataType`] names the two supported column types, [`Value`]
//! carries one typed column value, and [`Row`] maps column names to values.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A table or column name.
pub type Identifier = String;

/// Ordered column names of a relation.
pub type ColumnNames = Vec<Identifier>;

/// Ordered column attributes of a relation, parallel to [`ColumnNames`].
pub type ColumnAttributes = Vec<ColumnAttribute>;

/// A row: column name to value. Binary layout is decided by the relation's
/// column order, not by this map.
pub type Row = BTreeMap<Identifier, Value>;

/// Errors from validating or (un)marshalling a row against a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A declared column is missing from the row.
    MissingColumn {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
    },
    /// The row names a column the table does not declare.
    UnknownColumn {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
    },
    /// A column is declared twice.
    DuplicateColumn {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
    },
    /// A value does not have its column's declared type.
    TypeMismatch {
        /// Column name.
        column: String,
        /// Declared type.
        expected: DataType,
        /// Type of the supplied value.
        found: DataType,
    },
    /// The type name is not one the marshaller knows how to store.
    UnsupportedType(String),
    /// A TEXT value is longer than its 16-bit length prefix can describe.
    TextTooLong {
        /// Column name.
        column: String,
        /// Length in bytes.
        len: usize,
    },
    /// The marshalled row cannot fit in a single block.
    RowTooLarge {
        /// Marshalled size in bytes.
        size: usize,
        /// Largest record a block can hold.
        max: usize,
    },
    /// Stored bytes do not decode under the table's schema.
    Malformed(String),
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::MissingColumn { table, column } => {
                write!(f, "row for \"{}\" is missing column \"{}\"", table, column)
            }
            SchemaError::UnknownColumn { table, column } => {
                write!(f, "table \"{}\" has no column \"{}\"", table, column)
            }
            SchemaError::DuplicateColumn { table, column } => {
                write!(f, "column \"{}\" specified more than once for \"{}\"", column, table)
            }
            SchemaError::TypeMismatch {
                column,
                expected,
                found,
            } => {
                write!(
                    f,
                    "column \"{}\" expects {}, got {}",
                    column, expected, found
                )
            }
            SchemaError::UnsupportedType(name) => {
                write!(f, "only know how to marshal INT and TEXT, not {}", name)
            }
            SchemaError::TextTooLong { column, len } => {
                write!(
                    f,
                    "text for column \"{}\" is {} bytes, limit is {}",
                    column,
                    len,
                    u16::MAX
                )
            }
            SchemaError::RowTooLarge { size, max } => {
                write!(f, "row is {} bytes, a block holds at most {}", size, max)
            }
            SchemaError::Malformed(msg) => write!(f, "malformed record: {}", msg),
        }
    }
}

impl std::error::Error for SchemaError {}

/// Column data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// 4-byte signed integer.
    Int,
    /// Variable-length text, at most 65535 bytes.
    Text,
}

impl DataType {
    /// Returns the catalog spelling of this type (`"INT"` / `"TEXT"`).
    pub const fn as_str(self) -> &'static str {
        match self {
            DataType::Int => "INT",
            DataType::Text => "TEXT",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = SchemaError;

    /// Parses the catalog spelling; anything but INT or TEXT is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INT" => Ok(DataType::Int),
            "TEXT" => Ok(DataType::Text),
            other => Err(SchemaError::UnsupportedType(other.to_string())),
        }
    }
}

/// Per-column attributes beyond the name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnAttribute {
    /// Declared type.
    pub data_type: DataType,
}

impl ColumnAttribute {
    /// Creates an attribute of the given type.
    pub const fn new(data_type: DataType) -> Self {
        Self { data_type }
    }
}

/// A typed column value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Value {
    /// 32-bit signed integer (INT).
    Int(i32),
    /// Text (TEXT), ASCII assumed.
    Text(String),
}

impl Value {
    /// Returns the data type of this value.
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Int(_) => DataType::Int,
            Value::Text(_) => DataType::Text,
        }
    }

    /// Returns the integer, if this is an INT value.
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Text(_) => None,
        }
    }

    /// Returns the text, if this is a TEXT value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            Value::Int(_) => None,
        }
    }
}

/// Renders INT values bare and TEXT values double-quoted, as the shell
/// prints result rows.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "\"{}\"", s),
        }
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

/// Builds a [`Row`] from `name => value` pairs.
///
/// ```
/// use heapdb::row;
/// use heapdb::datum::Value;
///
/// let r = row! { "a" => 12, "b" => "Hello!" };
/// assert_eq!(r["a"], Value::Int(12));
/// ```
#[macro_export]
macro_rules! row {
    ($($name:expr => $value:expr),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut row = $crate::datum::Row::new();
        $(row.insert(::std::string::String::from($name), $crate::datum::Value::from($value));)*
        row
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_type_catalog_spelling() {
        for ty in [DataType::Int, DataType::Text] {
            assert_eq!(ty.as_str().parse::<DataType>().unwrap(), ty);
        }
        assert_eq!(
            "DOUBLE".parse::<DataType>(),
            Err(SchemaError::UnsupportedType("DOUBLE".to_string()))
        );
        // Catalog spelling is exact
        assert!("int".parse::<DataType>().is_err());
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(Value::Int(3).data_type(), DataType::Int);
        assert_eq!(Value::from("x").data_type(), DataType::Text);
        assert_eq!(Value::Int(3).as_int(), Some(3));
        assert_eq!(Value::Int(3).as_text(), None);
        assert_eq!(Value::from("x").as_text(), Some("x"));
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Int(-7).to_string(), "-7");
        assert_eq!(Value::from("Hello!").to_string(), "\"Hello!\"");
    }

    #[test]
    fn test_row_macro() {
        let r = row! { "a" => 12, "b" => "Hello!" };
        assert_eq!(r.len(), 2);
        assert_eq!(r["a"], Value::Int(12));
        assert_eq!(r["b"], Value::Text("Hello!".to_string()));
        assert!(row! {}.is_empty());
    }
}
