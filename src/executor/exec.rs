//! Statement dispatch.

use std::sync::Arc;

use crate::catalog::Catalog;
use crate::sql::Statement;
use crate::storage::Environment;

use super::error::ExecError;
use super::result::QueryResult;
use super::{ddl, dml};

/// Executes statements against the catalog of one storage environment.
///
/// The catalog is opened on the first call to [`SqlExec::execute`], which
/// bootstraps `_tables` and `_columns` if the environment is empty.
pub struct SqlExec<E: Environment> {
    env: Arc<E>,
    catalog: Option<Catalog<E>>,
}

impl<E: Environment> SqlExec<E> {
    /// Creates an executor over `env`. Nothing is opened yet.
    pub fn new(env: Arc<E>) -> Self {
        Self { env, catalog: None }
    }

    /// Returns the catalog, opening it on first use.
    pub fn catalog(&mut self) -> Result<&mut Catalog<E>, ExecError> {
        let catalog = match self.catalog.take() {
            Some(catalog) => catalog,
            None => Catalog::open(Arc::clone(&self.env))?,
        };
        Ok(self.catalog.insert(catalog))
    }

    /// Executes one statement.
    ///
    /// # Errors
    ///
    /// Any failure is returned to the caller; nothing already written to
    /// storage is undone except the catalog rows of a failed CREATE TABLE.
    pub fn execute(&mut self, statement: &Statement) -> Result<QueryResult, ExecError> {
        let catalog = self.catalog()?;
        match statement {
            Statement::CreateTable(stmt) => ddl::create_table(catalog, stmt),
            Statement::DropTable(stmt) => ddl::drop_table(catalog, stmt),
            Statement::Show(stmt) => ddl::show(catalog, stmt),
            Statement::Select(stmt) => dml::select(catalog, stmt),
            Statement::Insert(stmt) => dml::insert(catalog, stmt),
            Statement::Delete(stmt) => dml::delete(catalog, stmt),
        }
    }

    /// Closes every open table. The executor may be used again afterwards.
    pub fn close(&mut self) -> Result<(), ExecError> {
        if let Some(mut catalog) = self.catalog.take() {
            catalog.close()?;
        }
        Ok(())
    }
}
