//! Hardcoded catalog table schemas.
//!
//! The catalog tables are ordinary heap tables whose schemas are fixed here,
//! so they can be opened before anything has been read from the catalog.

use crate::datum::{ColumnAttribute, ColumnAttributes, ColumnNames, DataType};

/// Name of the table listing every table.
pub const TABLES: &str = "_tables";

/// Name of the table listing every column.
pub const COLUMNS: &str = "_columns";

/// Column names of `_tables`.
pub mod tables {
    /// table_name column.
    pub const TABLE_NAME: &str = "table_name";
}

/// Column names of `_columns`.
pub mod columns {
    /// table_name column (FK to `_tables`).
    pub const TABLE_NAME: &str = "table_name";
    /// column_name column.
    pub const COLUMN_NAME: &str = "column_name";
    /// data_type column (`"INT"` or `"TEXT"`).
    pub const DATA_TYPE: &str = "data_type";
}

/// Schema of `_tables`:
/// - table_name: TEXT
pub fn tables_schema() -> (ColumnNames, ColumnAttributes) {
    (
        vec![tables::TABLE_NAME.to_string()],
        vec![ColumnAttribute::new(DataType::Text)],
    )
}

/// Schema of `_columns`:
/// - table_name: TEXT
/// - column_name: TEXT
/// - data_type: TEXT
pub fn columns_schema() -> (ColumnNames, ColumnAttributes) {
    (
        vec![
            columns::TABLE_NAME.to_string(),
            columns::COLUMN_NAME.to_string(),
            columns::DATA_TYPE.to_string(),
        ],
        vec![ColumnAttribute::new(DataType::Text); 3],
    )
}

/// Returns the hardcoded schema of a catalog table.
pub fn schema_of(table_name: &str) -> Option<(ColumnNames, ColumnAttributes)> {
    match table_name {
        TABLES => Some(tables_schema()),
        COLUMNS => Some(columns_schema()),
        _ => None,
    }
}

/// Returns true for `_tables` and `_columns`.
pub fn is_schema_table(table_name: &str) -> bool {
    table_name == TABLES || table_name == COLUMNS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_lengths() {
        let (names, attrs) = tables_schema();
        assert_eq!(names.len(), attrs.len());
        assert_eq!(names.len(), 1);

        let (names, attrs) = columns_schema();
        assert_eq!(names.len(), attrs.len());
        assert_eq!(names.len(), 3);
    }

    #[test]
    fn test_schema_of() {
        assert_eq!(schema_of(TABLES), Some(tables_schema()));
        assert_eq!(schema_of(COLUMNS), Some(columns_schema()));
        assert_eq!(schema_of("foo"), None);
        assert!(is_schema_table("_columns"));
        assert!(!is_schema_table("columns"));
    }
}
