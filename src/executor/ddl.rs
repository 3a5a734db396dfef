//! CREATE TABLE, DROP TABLE and SHOW.

use crate::catalog::{Catalog, is_schema_table, schema};
use crate::datum::{ColumnAttribute, DataType};
use crate::row;
use crate::sql::{ColumnType, CreateTableStmt, DropTableStmt, ShowKind, ShowStmt};
use crate::storage::Environment;

use super::error::ExecError;
use super::result::QueryResult;

/// Registers a new table and creates its file.
pub fn create_table<E: Environment>(
    catalog: &mut Catalog<E>,
    stmt: &CreateTableStmt,
) -> Result<QueryResult, ExecError> {
    let mut names = Vec::with_capacity(stmt.columns.len());
    let mut attrs = Vec::with_capacity(stmt.columns.len());
    for column in &stmt.columns {
        let data_type = match column.data_type {
            ColumnType::Int => DataType::Int,
            ColumnType::Text => DataType::Text,
            other => {
                return Err(ExecError::UnsupportedColumnType {
                    column: column.name.clone(),
                    type_name: other.to_string(),
                });
            }
        };
        names.push(column.name.clone());
        attrs.push(ColumnAttribute::new(data_type));
    }

    catalog.create_table(&stmt.table_name, names, attrs)?;
    Ok(QueryResult::message(format!("created {}", stmt.table_name)))
}

/// Unregisters a table and removes its file.
pub fn drop_table<E: Environment>(
    catalog: &mut Catalog<E>,
    stmt: &DropTableStmt,
) -> Result<QueryResult, ExecError> {
    catalog.drop_table(&stmt.name)?;
    Ok(QueryResult::message(format!("dropped {}", stmt.name)))
}

/// Lists user tables, or the columns of one table.
pub fn show<E: Environment>(
    catalog: &mut Catalog<E>,
    stmt: &ShowStmt,
) -> Result<QueryResult, ExecError> {
    match (stmt.kind, &stmt.table_name) {
        (ShowKind::Tables, _) => show_tables(catalog),
        (ShowKind::Columns, Some(table_name)) => show_columns(catalog, table_name),
        (ShowKind::Columns, None) => Err(ExecError::Unsupported(
            "SHOW COLUMNS needs a table name".to_string(),
        )),
    }
}

fn show_tables<E: Environment>(catalog: &mut Catalog<E>) -> Result<QueryResult, ExecError> {
    let (names, attrs) = schema::tables_schema();
    let rows = catalog
        .table_names()?
        .into_iter()
        .filter(|name| !is_schema_table(name))
        .map(|name| row! { schema::tables::TABLE_NAME => name })
        .collect();
    Ok(QueryResult::rows(names, attrs, rows))
}

fn show_columns<E: Environment>(
    catalog: &mut Catalog<E>,
    table_name: &str,
) -> Result<QueryResult, ExecError> {
    let (names, attrs) = schema::columns_schema();
    let rows = catalog.column_rows_of(table_name)?;
    Ok(QueryResult::rows(names, attrs, rows))
}
