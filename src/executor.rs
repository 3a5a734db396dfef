//! Statement execution.
//!
//! [`SqlExec`] turns parsed [`Statement`](crate::sql::Statement)s into
//! catalog and table operations:
//!
//! | Statement                 | Operations                                   |
//! |---------------------------|----------------------------------------------|
//! | CREATE TABLE              | `Catalog::create_table`                      |
//! | DROP TABLE                | `Catalog::drop_table`                        |
//! | SHOW TABLES / COLUMNS     | scans of `_tables` / `_columns`              |
//! | SELECT                    | `select` / `select_where` + `project_columns`|
//! | INSERT                    | `HeapTable::insert`                          |
//! | DELETE                    | `select_where` + `HeapTable::del`            |
//!
//! Only single-table statements with `column = literal` filters run; joins,
//! subqueries and other predicates fail with [`ExecError::Unsupported`].

mod ddl;
mod dml;
mod error;
mod exec;
mod result;

pub use error::ExecError;
pub use exec::SqlExec;
pub use result::QueryResult;
