//! Catalog for table and column metadata management.

use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Arc;

use tracing::{info, warn};

use super::schema::{self, COLUMNS, TABLES, columns, tables};
use crate::datum::{ColumnAttribute, ColumnAttributes, ColumnNames, Identifier, Row, SchemaError};
use crate::heap::{Handle, HeapTable, RelationError};
use crate::row;
use crate::storage::Environment;

/// Catalog for managing table and column metadata.
///
/// The catalog stores its metadata in two self-hosted heap tables:
/// `_tables` holds one row per table and `_columns` one row per column, in
/// declared order. Both describe themselves. Their own schemas are
/// hardcoded, so opening them never consults the catalog.
///
/// User tables are opened on first use and cached by name.
pub struct Catalog<E: Environment> {
    env: Arc<E>,
    tables: HeapTable<E>,
    columns: HeapTable<E>,
    cache: HashMap<Identifier, HeapTable<E>>,
}

impl<E: Environment> Catalog<E> {
    /// Opens the catalog tables, creating and seeding them on first use.
    pub fn open(env: Arc<E>) -> Result<Self, RelationError> {
        let (names, attrs) = schema::tables_schema();
        let mut tables = HeapTable::new(Arc::clone(&env), TABLES, names, attrs);
        let (names, attrs) = schema::columns_schema();
        let mut columns = HeapTable::new(Arc::clone(&env), COLUMNS, names, attrs);

        tables.create_if_not_exists()?;
        columns.create_if_not_exists()?;

        let mut catalog = Self {
            env,
            tables,
            columns,
            cache: HashMap::new(),
        };
        catalog.bootstrap()?;
        Ok(catalog)
    }

    /// Registers the catalog tables in themselves.
    ///
    /// Each catalog table is checked on its own, so rows missing after an
    /// interrupted first run are filled in on the next open. A partial set of
    /// `_columns` rows is replaced.
    fn bootstrap(&mut self) -> Result<(), RelationError> {
        for name in [TABLES, COLUMNS] {
            let Some((names, attrs)) = schema::schema_of(name) else {
                continue;
            };
            if self.table_rows(name)?.is_empty() {
                self.tables.insert(&row! { tables::TABLE_NAME => name })?;
                info!("registered catalog table {}", name);
            }
            let column_rows = self.column_rows(name)?;
            if column_rows.len() != names.len() {
                for handle in column_rows {
                    self.columns.del(handle)?;
                }
                self.insert_column_rows(name, &names, &attrs, &mut Vec::new())?;
                info!("registered columns of catalog table {}", name);
            }
        }
        Ok(())
    }

    /// Returns every registered table name, catalog tables included, in
    /// registration order.
    pub fn table_names(&mut self) -> Result<Vec<Identifier>, RelationError> {
        let mut names = Vec::new();
        for handle in self.tables.select()? {
            let row = self.tables.project(handle)?;
            names.push(text_field(&row, tables::TABLE_NAME)?.to_string());
        }
        Ok(names)
    }

    /// Returns true if `table_name` has a `_tables` row.
    pub fn table_exists(&mut self, table_name: &str) -> Result<bool, RelationError> {
        Ok(!self.table_rows(table_name)?.is_empty())
    }

    fn table_rows(&mut self, table_name: &str) -> Result<Vec<Handle>, RelationError> {
        self.tables
            .select_where(&row! { tables::TABLE_NAME => table_name })
    }

    fn column_rows(&mut self, table_name: &str) -> Result<Vec<Handle>, RelationError> {
        self.columns
            .select_where(&row! { columns::TABLE_NAME => table_name })
    }

    /// Returns the `_columns` rows of a table, in declared order.
    pub fn column_rows_of(&mut self, table_name: &str) -> Result<Vec<Row>, RelationError> {
        let mut rows = Vec::new();
        for handle in self.column_rows(table_name)? {
            rows.push(self.columns.project(handle)?);
        }
        Ok(rows)
    }

    /// Returns a table's columns in declared order.
    ///
    /// # Errors
    ///
    /// Returns `RelationError::TableNotFound` if the table is not registered.
    pub fn get_columns(
        &mut self,
        table_name: &str,
    ) -> Result<(ColumnNames, ColumnAttributes), RelationError> {
        if let Some(schema) = schema::schema_of(table_name) {
            return Ok(schema);
        }
        if !self.table_exists(table_name)? {
            return Err(RelationError::TableNotFound {
                name: table_name.to_string(),
            });
        }

        let mut names = Vec::new();
        let mut attrs = Vec::new();
        for row in self.column_rows_of(table_name)? {
            names.push(text_field(&row, columns::COLUMN_NAME)?.to_string());
            let data_type = text_field(&row, columns::DATA_TYPE)?.parse()?;
            attrs.push(ColumnAttribute::new(data_type));
        }
        Ok((names, attrs))
    }

    /// Returns the table with the given name.
    ///
    /// The catalog tables are served from their hardcoded definitions; other
    /// tables are built from their `_columns` rows on first access.
    pub fn get_table(&mut self, table_name: &str) -> Result<&mut HeapTable<E>, RelationError> {
        match table_name {
            TABLES => return Ok(&mut self.tables),
            COLUMNS => return Ok(&mut self.columns),
            _ => {}
        }
        if !self.cache.contains_key(table_name) {
            let (names, attrs) = self.get_columns(table_name)?;
            let table = HeapTable::new(Arc::clone(&self.env), table_name, names, attrs);
            self.cache.insert(table_name.to_string(), table);
        }
        self.cache
            .get_mut(table_name)
            .ok_or_else(|| RelationError::TableNotFound {
                name: table_name.to_string(),
            })
    }

    /// Registers a table and creates its physical file.
    ///
    /// If any step fails, every catalog row written so far is deleted before
    /// the error is returned.
    ///
    /// # Errors
    ///
    /// Returns `RelationError::TableAlreadyExists` if the name is taken and
    /// `SchemaError::DuplicateColumn` if a column name repeats.
    pub fn create_table(
        &mut self,
        table_name: &str,
        column_names: ColumnNames,
        column_attributes: ColumnAttributes,
    ) -> Result<(), RelationError> {
        if self.table_exists(table_name)? {
            return Err(RelationError::TableAlreadyExists {
                name: table_name.to_string(),
            });
        }
        let mut seen = HashSet::new();
        for name in &column_names {
            if !seen.insert(name) {
                return Err(SchemaError::DuplicateColumn {
                    table: table_name.to_string(),
                    column: name.clone(),
                }
                .into());
            }
        }

        let table_row = self
            .tables
            .insert(&row! { tables::TABLE_NAME => table_name })?;
        let mut column_rows = Vec::with_capacity(column_names.len());
        let result = self
            .insert_column_rows(
                table_name,
                &column_names,
                &column_attributes,
                &mut column_rows,
            )
            .and_then(|()| {
                let mut table = HeapTable::new(
                    Arc::clone(&self.env),
                    table_name,
                    column_names,
                    column_attributes,
                );
                table.create()?;
                Ok(table)
            });

        match result {
            Ok(table) => {
                self.cache.insert(table_name.to_string(), table);
                info!("created table {}", table_name);
                Ok(())
            }
            Err(e) => {
                warn!("create table {} failed, removing its catalog rows: {}", table_name, e);
                self.rollback(table_row, &column_rows);
                Err(e)
            }
        }
    }

    fn insert_column_rows(
        &mut self,
        table_name: &str,
        column_names: &[Identifier],
        column_attributes: &[ColumnAttribute],
        written: &mut Vec<Handle>,
    ) -> Result<(), RelationError> {
        for (name, attr) in column_names.iter().zip(column_attributes) {
            let handle = self.columns.insert(&row! {
                columns::TABLE_NAME => table_name,
                columns::COLUMN_NAME => name.as_str(),
                columns::DATA_TYPE => attr.data_type.as_str(),
            })?;
            written.push(handle);
        }
        Ok(())
    }

    fn rollback(&mut self, table_row: Handle, column_rows: &[Handle]) {
        for &handle in column_rows.iter().rev() {
            if let Err(e) = self.columns.del(handle) {
                warn!("failed to remove {} row {}: {}", COLUMNS, handle, e);
            }
        }
        if let Err(e) = self.tables.del(table_row) {
            warn!("failed to remove {} row {}: {}", TABLES, table_row, e);
        }
    }

    /// Removes a table's physical file, then its catalog rows.
    ///
    /// If the file cannot be removed the table stays registered. A file that
    /// is already gone is not an error.
    ///
    /// # Errors
    ///
    /// Returns `RelationError::SchemaTable` for `_tables` and `_columns`, and
    /// `RelationError::TableNotFound` if the table is not registered.
    pub fn drop_table(&mut self, table_name: &str) -> Result<(), RelationError> {
        if schema::is_schema_table(table_name) {
            return Err(RelationError::SchemaTable {
                name: table_name.to_string(),
            });
        }
        let table_rows = self.table_rows(table_name)?;
        if table_rows.is_empty() {
            return Err(RelationError::TableNotFound {
                name: table_name.to_string(),
            });
        }

        let table = match self.cache.remove(table_name) {
            Some(table) => table,
            None => {
                let (names, attrs) = self.get_columns(table_name)?;
                HeapTable::new(Arc::clone(&self.env), table_name, names, attrs)
            }
        };

        match table.drop() {
            Ok(()) => {}
            Err(RelationError::Storage(e)) if e.is_not_found() => {
                warn!("table {} had no file to remove", table_name);
            }
            Err(e) => return Err(e),
        }

        for handle in table_rows {
            self.tables.del(handle)?;
        }
        for handle in self.column_rows(table_name)? {
            self.columns.del(handle)?;
        }
        info!("dropped table {}", table_name);
        Ok(())
    }

    /// Closes every open table, flushing their stores.
    pub fn close(&mut self) -> Result<(), RelationError> {
        for table in self.cache.values_mut() {
            table.close()?;
        }
        self.columns.close()?;
        self.tables.close()
    }
}

fn text_field<'a>(row: &'a Row, column: &str) -> Result<&'a str, SchemaError> {
    row.get(column)
        .and_then(|value| value.as_text())
        .ok_or_else(|| {
            SchemaError::Malformed(format!("catalog row lacks text column \"{}\"", column))
        })
}
