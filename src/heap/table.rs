//! Heap tables: typed rows over a heap file.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use super::error::{HeapError, RelationError};
use super::file::HeapFile;
use super::page::RecordId;
use super::record::{marshal, unmarshal};
use crate::datum::{ColumnAttributes, ColumnNames, Identifier, Row, SchemaError};
use crate::storage::{BlockId, Environment};

/// Stable reference to one row: the block holding it and its id in that
/// block. Handles of deleted rows are never reissued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle {
    /// Block containing the row.
    pub block_id: BlockId,
    /// Record id within the block.
    pub record_id: RecordId,
}

impl Handle {
    /// Creates a new handle.
    pub fn new(block_id: BlockId, record_id: RecordId) -> Self {
        Self {
            block_id,
            record_id,
        }
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.block_id, self.record_id)
    }
}

/// A table of typed rows stored in a [`HeapFile`] named after the table.
///
/// Every data operation opens the file on demand, so a table obtained from
/// the catalog can be used without an explicit [`open`](Self::open).
pub struct HeapTable<E: Environment> {
    table_name: Identifier,
    column_names: ColumnNames,
    column_attributes: ColumnAttributes,
    file: HeapFile<E>,
}

impl<E: Environment> HeapTable<E> {
    /// Creates a closed handle for the table.
    pub fn new(
        env: Arc<E>,
        table_name: impl Into<Identifier>,
        column_names: ColumnNames,
        column_attributes: ColumnAttributes,
    ) -> Self {
        let table_name = table_name.into();
        let file = HeapFile::new(env, table_name.clone());
        Self {
            table_name,
            column_names,
            column_attributes,
            file,
        }
    }

    /// Returns the table name.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Returns the column names in declared order.
    pub fn column_names(&self) -> &ColumnNames {
        &self.column_names
    }

    /// Returns the column attributes in declared order.
    pub fn column_attributes(&self) -> &ColumnAttributes {
        &self.column_attributes
    }

    /// Returns the underlying heap file.
    pub fn file(&self) -> &HeapFile<E> {
        &self.file
    }

    /// Creates the physical file with one empty block.
    pub fn create(&mut self) -> Result<(), RelationError> {
        self.file.create()?;
        Ok(())
    }

    /// Opens the table, creating it only if it does not exist yet.
    pub fn create_if_not_exists(&mut self) -> Result<(), RelationError> {
        match self.file.open() {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => self.create(),
            Err(e) => Err(e.into()),
        }
    }

    /// Opens the physical file.
    pub fn open(&mut self) -> Result<(), RelationError> {
        self.file.open()?;
        Ok(())
    }

    /// Closes the physical file.
    pub fn close(&mut self) -> Result<(), RelationError> {
        self.file.close()?;
        Ok(())
    }

    /// Closes and removes the physical file.
    pub fn drop(self) -> Result<(), RelationError> {
        self.file.drop()?;
        Ok(())
    }

    /// Appends a row and returns its handle.
    ///
    /// The row goes into the last block; when that block has no room a new
    /// block is allocated and the row goes there instead.
    ///
    /// # Errors
    ///
    /// Returns `RelationError::Schema` if the row does not match the schema.
    pub fn insert(&mut self, row: &Row) -> Result<Handle, RelationError> {
        self.open()?;
        self.validate(row)?;
        let data = self.marshal(row)?;

        let mut page = if self.file.last().is_valid() {
            self.file.get(self.file.last())?
        } else {
            self.file.get_new()?
        };
        let record_id = match page.add(&data) {
            Ok(record_id) => record_id,
            Err(HeapError::NoRoom { .. }) => {
                page = self.file.get_new()?;
                debug!(
                    "{}: block full, appending to new block {}",
                    self.table_name,
                    page.block_id()
                );
                page.add(&data)?
            }
            Err(e) => return Err(e.into()),
        };
        self.file.put(&page)?;
        Ok(Handle::new(page.block_id(), record_id))
    }

    /// Merges `values` over the stored row and rewrites it in place.
    ///
    /// # Errors
    ///
    /// Returns `RelationError::Heap` with `HeapError::NoRoom` if the grown
    /// record does not fit its block; rows are never relocated.
    pub fn update(&mut self, handle: Handle, values: &Row) -> Result<(), RelationError> {
        let mut row = self.project(handle)?;
        row.extend(values.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.validate(&row)?;
        let data = self.marshal(&row)?;

        let mut page = self.file.get(handle.block_id)?;
        page.put(handle.record_id, &data)?;
        self.file.put(&page)?;
        Ok(())
    }

    /// Deletes the row behind `handle`.
    pub fn del(&mut self, handle: Handle) -> Result<(), RelationError> {
        self.open()?;
        let mut page = self.file.get(handle.block_id)?;
        page.del(handle.record_id)?;
        self.file.put(&page)?;
        Ok(())
    }

    /// Returns handles of every live row, ordered by block then record id.
    pub fn select(&mut self) -> Result<Vec<Handle>, RelationError> {
        self.open()?;
        let mut handles = Vec::new();
        for block_id in self.file.block_ids() {
            let page = self.file.get(block_id)?;
            handles.extend(page.ids().into_iter().map(|id| Handle::new(block_id, id)));
        }
        Ok(handles)
    }

    /// Returns handles of rows whose values equal every entry of `filter`.
    ///
    /// An empty filter selects every row.
    ///
    /// # Errors
    ///
    /// Returns `RelationError::Schema` if the filter names an unknown column
    /// or compares a column with a value of the wrong type.
    pub fn select_where(&mut self, filter: &Row) -> Result<Vec<Handle>, RelationError> {
        for (name, value) in filter {
            let index = self.column_index(name)?;
            let expected = self.column_attributes[index].data_type;
            if value.data_type() != expected {
                return Err(SchemaError::TypeMismatch {
                    column: name.clone(),
                    expected,
                    found: value.data_type(),
                }
                .into());
            }
        }

        let columns: Vec<Identifier> = filter.keys().cloned().collect();
        let mut matched = Vec::new();
        for handle in self.select()? {
            if self.project_columns(handle, &columns)? == *filter {
                matched.push(handle);
            }
        }
        Ok(matched)
    }

    /// Returns the full row behind `handle`.
    ///
    /// # Errors
    ///
    /// Returns `RelationError::Heap` with `HeapError::RecordNotFound` if the
    /// row has been deleted.
    pub fn project(&mut self, handle: Handle) -> Result<Row, RelationError> {
        self.open()?;
        let page = self.file.get(handle.block_id)?;
        let data = page
            .read(handle.record_id)
            .ok_or(HeapError::RecordNotFound(handle.record_id))?;
        Ok(unmarshal(&self.column_names, &self.column_attributes, data)?)
    }

    /// Returns the named columns of the row behind `handle`.
    pub fn project_columns(
        &mut self,
        handle: Handle,
        column_names: &[Identifier],
    ) -> Result<Row, RelationError> {
        for name in column_names {
            self.column_index(name)?;
        }
        let mut row = self.project(handle)?;
        row.retain(|name, _| column_names.contains(name));
        Ok(row)
    }

    /// Checks that `row` carries exactly the declared columns with the
    /// declared types.
    fn validate(&self, row: &Row) -> Result<(), SchemaError> {
        for name in row.keys() {
            self.column_index(name)?;
        }
        for (name, attribute) in self.column_names.iter().zip(&self.column_attributes) {
            let value = row.get(name).ok_or_else(|| SchemaError::MissingColumn {
                table: self.table_name.clone(),
                column: name.clone(),
            })?;
            if value.data_type() != attribute.data_type {
                return Err(SchemaError::TypeMismatch {
                    column: name.clone(),
                    expected: attribute.data_type,
                    found: value.data_type(),
                });
            }
        }
        Ok(())
    }

    fn column_index(&self, name: &str) -> Result<usize, SchemaError> {
        self.column_names
            .iter()
            .position(|column| column == name)
            .ok_or_else(|| SchemaError::UnknownColumn {
                table: self.table_name.clone(),
                column: name.to_string(),
            })
    }

    fn marshal(&self, row: &Row) -> Result<bytes::Bytes, SchemaError> {
        marshal(
            &self.table_name,
            &self.column_names,
            &self.column_attributes,
            row,
        )
    }
}

impl<E: Environment> fmt::Debug for HeapTable<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeapTable")
            .field("table_name", &self.table_name)
            .field("column_names", &self.column_names)
            .field("file", &self.file)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datum::{ColumnAttribute, DataType, Value};
    use crate::heap::page::MAX_RECORD_SIZE;
    use crate::row;
    use crate::storage::MemoryEnvironment;

    fn create_table(env: &Arc<MemoryEnvironment>) -> HeapTable<MemoryEnvironment> {
        let mut table = HeapTable::new(
            Arc::clone(env),
            "t",
            vec!["a".to_string(), "b".to_string()],
            vec![
                ColumnAttribute::new(DataType::Int),
                ColumnAttribute::new(DataType::Text),
            ],
        );
        table.create().unwrap();
        table
    }

    #[test]
    fn test_insert_select_project() {
        let env = Arc::new(MemoryEnvironment::new());
        let mut table = create_table(&env);

        let handle = table.insert(&row! { "a" => 12, "b" => "Hello!" }).unwrap();
        assert_eq!(handle, Handle::new(BlockId::FIRST, 1));

        assert_eq!(table.select().unwrap(), vec![handle]);
        assert_eq!(
            table.project(handle).unwrap(),
            row! { "a" => 12, "b" => "Hello!" }
        );
        assert_eq!(
            table.project_columns(handle, &["b".to_string()]).unwrap(),
            row! { "b" => "Hello!" }
        );
    }

    #[test]
    fn test_validate() {
        let env = Arc::new(MemoryEnvironment::new());
        let mut table = create_table(&env);

        let missing = table.insert(&row! { "a" => 1 }).unwrap_err();
        assert!(matches!(
            missing,
            RelationError::Schema(SchemaError::MissingColumn { .. })
        ));

        let extra = table
            .insert(&row! { "a" => 1, "b" => "x", "c" => 2 })
            .unwrap_err();
        assert!(matches!(
            extra,
            RelationError::Schema(SchemaError::UnknownColumn { .. })
        ));

        let mismatch = table.insert(&row! { "a" => "1", "b" => "x" }).unwrap_err();
        assert!(matches!(
            mismatch,
            RelationError::Schema(SchemaError::TypeMismatch { .. })
        ));

        assert!(table.select().unwrap().is_empty());
    }

    #[test]
    fn test_insert_spills_to_new_block() {
        let env = Arc::new(MemoryEnvironment::new());
        let mut table = create_table(&env);

        let text = "x".repeat(1000);
        let mut handles = Vec::new();
        for a in 0..5 {
            handles.push(table.insert(&row! { "a" => a, "b" => text.as_str() }).unwrap());
        }

        // Four 1006-byte records fill the first block.
        assert_eq!(handles[3], Handle::new(BlockId::new(1), 4));
        assert_eq!(handles[4], Handle::new(BlockId::new(2), 1));
        assert_eq!(table.file().block_ids().len(), 2);
        assert_eq!(table.select().unwrap(), handles);
        assert_eq!(table.project(handles[4]).unwrap()["a"], Value::Int(4));
    }

    #[test]
    fn test_insert_max_size_row() {
        let env = Arc::new(MemoryEnvironment::new());
        let mut table = create_table(&env);

        table.insert(&row! { "a" => 0, "b" => "small" }).unwrap();
        let text = "x".repeat(MAX_RECORD_SIZE - 6);
        let handle = table.insert(&row! { "a" => 1, "b" => text }).unwrap();
        assert_eq!(handle.block_id, BlockId::new(2));

        let text = "x".repeat(MAX_RECORD_SIZE);
        assert!(matches!(
            table.insert(&row! { "a" => 2, "b" => text }),
            Err(RelationError::Schema(SchemaError::RowTooLarge { .. }))
        ));
    }

    #[test]
    fn test_select_where() {
        let env = Arc::new(MemoryEnvironment::new());
        let mut table = create_table(&env);

        let h1 = table.insert(&row! { "a" => 1, "b" => "x" }).unwrap();
        let _h2 = table.insert(&row! { "a" => 2, "b" => "y" }).unwrap();
        let h3 = table.insert(&row! { "a" => 3, "b" => "x" }).unwrap();

        assert_eq!(table.select_where(&row! { "b" => "x" }).unwrap(), vec![h1, h3]);
        assert_eq!(
            table.select_where(&row! { "a" => 3, "b" => "x" }).unwrap(),
            vec![h3]
        );
        assert!(table.select_where(&row! { "a" => 9 }).unwrap().is_empty());
        assert_eq!(table.select_where(&row! {}).unwrap().len(), 3);

        assert!(matches!(
            table.select_where(&row! { "z" => 1 }),
            Err(RelationError::Schema(SchemaError::UnknownColumn { .. }))
        ));
        assert!(matches!(
            table.select_where(&row! { "a" => "1" }),
            Err(RelationError::Schema(SchemaError::TypeMismatch { .. }))
        ));
    }

    #[test]
    fn test_select_is_repeatable() {
        let env = Arc::new(MemoryEnvironment::new());
        let mut table = create_table(&env);
        for a in 0..10 {
            table.insert(&row! { "a" => a, "b" => "v" }).unwrap();
        }
        assert_eq!(table.select().unwrap(), table.select().unwrap());
    }

    #[test]
    fn test_update() {
        let env = Arc::new(MemoryEnvironment::new());
        let mut table = create_table(&env);

        let h1 = table.insert(&row! { "a" => 1, "b" => "short" }).unwrap();
        let h2 = table.insert(&row! { "a" => 2, "b" => "other" }).unwrap();

        table.update(h1, &row! { "b" => "a much longer value" }).unwrap();
        assert_eq!(
            table.project(h1).unwrap(),
            row! { "a" => 1, "b" => "a much longer value" }
        );
        assert_eq!(table.project(h2).unwrap(), row! { "a" => 2, "b" => "other" });

        assert!(matches!(
            table.update(h1, &row! { "c" => 1 }),
            Err(RelationError::Schema(SchemaError::UnknownColumn { .. }))
        ));
    }

    #[test]
    fn test_update_no_room() {
        let env = Arc::new(MemoryEnvironment::new());
        let mut table = create_table(&env);

        let h1 = table.insert(&row! { "a" => 1, "b" => "x" }).unwrap();
        table
            .insert(&row! { "a" => 2, "b" => "y".repeat(4000) })
            .unwrap();

        let err = table
            .update(h1, &row! { "b" => "z".repeat(200) })
            .unwrap_err();
        assert!(matches!(err, RelationError::Heap(HeapError::NoRoom { .. })));
        assert_eq!(table.project(h1).unwrap(), row! { "a" => 1, "b" => "x" });
    }

    #[test]
    fn test_del() {
        let env = Arc::new(MemoryEnvironment::new());
        let mut table = create_table(&env);

        let h1 = table.insert(&row! { "a" => 1, "b" => "x" }).unwrap();
        let h2 = table.insert(&row! { "a" => 2, "b" => "y" }).unwrap();
        table.del(h1).unwrap();

        assert_eq!(table.select().unwrap(), vec![h2]);
        assert!(matches!(
            table.project(h1),
            Err(RelationError::Heap(HeapError::RecordNotFound(1)))
        ));
        assert!(matches!(
            table.del(h1),
            Err(RelationError::Heap(HeapError::RecordNotFound(1)))
        ));

        let h3 = table.insert(&row! { "a" => 3, "b" => "z" }).unwrap();
        assert_ne!(h3, h1);
    }

    #[test]
    fn test_create_if_not_exists() {
        let env = Arc::new(MemoryEnvironment::new());
        {
            let mut table = create_table(&env);
            table.insert(&row! { "a" => 1, "b" => "kept" }).unwrap();
            table.close().unwrap();
        }

        let mut table = HeapTable::new(
            Arc::clone(&env),
            "t",
            vec!["a".to_string(), "b".to_string()],
            vec![
                ColumnAttribute::new(DataType::Int),
                ColumnAttribute::new(DataType::Text),
            ],
        );
        table.create_if_not_exists().unwrap();
        assert_eq!(table.select().unwrap().len(), 1);
        assert_eq!(table.file().block_ids().len(), 1);

        let mut fresh = HeapTable::new(Arc::clone(&env), "fresh", vec![], vec![]);
        fresh.create_if_not_exists().unwrap();
        assert_eq!(fresh.file().block_ids().len(), 1);
    }

    #[test]
    fn test_drop() {
        let env = Arc::new(MemoryEnvironment::new());
        let table = create_table(&env);
        table.drop().unwrap();
        assert!(env.store_names().is_empty());
    }
}
