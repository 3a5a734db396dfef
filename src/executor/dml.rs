//! Single-table SELECT, INSERT and DELETE.
//!
//! WHERE clauses are limited to conjunctions of `column = literal`, which
//! map directly onto [`HeapTable::select_where`].

use crate::catalog::{Catalog, is_schema_table};
use crate::datum::{ColumnAttributes, Identifier, Row, SchemaError, Value};
use crate::heap::{Handle, HeapTable, RelationError};
use crate::sql::{BinaryOperator, DeleteStmt, Expr, InsertStmt, SelectStmt, TableRef};
use crate::storage::Environment;

use super::error::ExecError;
use super::result::QueryResult;

/// The single table a statement reads from, with the names column
/// references may qualify it by.
struct Target<'a> {
    name: &'a str,
    alias: Option<&'a str>,
}

impl<'a> Target<'a> {
    fn from_clause(from: Option<&'a TableRef>) -> Result<Self, ExecError> {
        match from {
            Some(TableRef::Name { name, alias }) => Ok(Target {
                name: name.as_str(),
                alias: alias.as_deref(),
            }),
            Some(TableRef::Join { .. }) => Err(unsupported("joins")),
            Some(TableRef::CrossProduct(_)) => Err(unsupported("cross products")),
            Some(TableRef::Select { .. }) => Err(unsupported("subqueries")),
            None => Err(unsupported("SELECT without FROM")),
        }
    }

    /// Resolves a column reference to a column name of this table.
    fn column<'e>(&self, expr: &'e Expr) -> Result<Option<&'e str>, ExecError> {
        let Expr::ColumnRef { table, name } = expr else {
            return Ok(None);
        };
        match table.as_deref() {
            None => Ok(Some(name.as_str())),
            Some(t) if t == self.name || Some(t) == self.alias => Ok(Some(name.as_str())),
            Some(t) => Err(RelationError::TableNotFound {
                name: t.to_string(),
            }
            .into()),
        }
    }

    /// Converts a WHERE clause to an equality filter.
    ///
    /// Returns `None` if the clause requires one column to equal two
    /// different values, which no row satisfies.
    fn filter(&self, where_clause: Option<&Expr>) -> Result<Option<Row>, ExecError> {
        let mut filter = Row::new();
        match where_clause {
            Some(expr) if !self.collect_equalities(expr, &mut filter)? => Ok(None),
            _ => Ok(Some(filter)),
        }
    }

    fn collect_equalities(&self, expr: &Expr, filter: &mut Row) -> Result<bool, ExecError> {
        match expr {
            Expr::Operator {
                left,
                op: BinaryOperator::And,
                right,
            } => {
                let left_holds = self.collect_equalities(left, filter)?;
                let right_holds = self.collect_equalities(right, filter)?;
                Ok(left_holds && right_holds)
            }
            Expr::Operator {
                left,
                op: BinaryOperator::Eq,
                right,
            } => {
                let (column, literal) = match (self.column(left)?, self.column(right)?) {
                    (Some(column), None) => (column, right),
                    (None, Some(column)) => (column, left),
                    _ => return Err(unsupported_where(expr)),
                };
                let value = match literal.as_ref() {
                    Expr::LiteralInt(_) | Expr::LiteralString(_) => literal_value(literal)?,
                    _ => return Err(unsupported_where(expr)),
                };
                match filter.get(column) {
                    Some(existing) => Ok(*existing == value),
                    None => {
                        filter.insert(column.to_string(), value);
                        Ok(true)
                    }
                }
            }
            _ => Err(unsupported_where(expr)),
        }
    }

    fn matching_rows<E: Environment>(
        &self,
        table: &mut HeapTable<E>,
        where_clause: Option<&Expr>,
    ) -> Result<Vec<Handle>, ExecError> {
        let handles = match self.filter(where_clause)? {
            Some(filter) if filter.is_empty() => table.select()?,
            Some(filter) => table.select_where(&filter)?,
            None => Vec::new(),
        };
        Ok(handles)
    }
}

/// Runs a single-table SELECT.
pub fn select<E: Environment>(
    catalog: &mut Catalog<E>,
    stmt: &SelectStmt,
) -> Result<QueryResult, ExecError> {
    let target = Target::from_clause(stmt.from.as_ref())?;
    let table = catalog.get_table(target.name)?;

    let names = select_list(&target, table, &stmt.select_list)?;
    let attrs = attributes_of(table, &names)?;

    let mut rows = Vec::new();
    for handle in target.matching_rows(table, stmt.where_clause.as_ref())? {
        rows.push(table.project_columns(handle, &names)?);
    }
    Ok(QueryResult::rows(names, attrs, rows))
}

/// Runs an INSERT of one row.
pub fn insert<E: Environment>(
    catalog: &mut Catalog<E>,
    stmt: &InsertStmt,
) -> Result<QueryResult, ExecError> {
    reject_catalog_write(&stmt.table_name)?;
    let table = catalog.get_table(&stmt.table_name)?;

    let columns = match &stmt.columns {
        Some(columns) => columns.clone(),
        None => table.column_names().clone(),
    };
    if columns.len() != stmt.values.len() {
        return Err(ExecError::ValueCountMismatch {
            expected: columns.len(),
            found: stmt.values.len(),
        });
    }

    let mut row = Row::new();
    for (column, expr) in columns.into_iter().zip(&stmt.values) {
        if row.contains_key(&column) {
            return Err(SchemaError::DuplicateColumn {
                table: stmt.table_name.clone(),
                column,
            }
            .into());
        }
        row.insert(column, literal_value(expr)?);
    }

    table.insert(&row)?;
    Ok(QueryResult::message(format!(
        "successfully inserted 1 row into {}",
        stmt.table_name
    )))
}

/// Runs a DELETE.
pub fn delete<E: Environment>(
    catalog: &mut Catalog<E>,
    stmt: &DeleteStmt,
) -> Result<QueryResult, ExecError> {
    reject_catalog_write(&stmt.table_name)?;
    let target = Target {
        name: stmt.table_name.as_str(),
        alias: None,
    };
    let table = catalog.get_table(target.name)?;

    let handles = target.matching_rows(table, stmt.where_clause.as_ref())?;
    for &handle in &handles {
        table.del(handle)?;
    }
    Ok(QueryResult::message(format!(
        "successfully deleted {} rows from {}",
        handles.len(),
        stmt.table_name
    )))
}

fn select_list<E: Environment>(
    target: &Target<'_>,
    table: &HeapTable<E>,
    items: &[Expr],
) -> Result<Vec<Identifier>, ExecError> {
    if let [Expr::Star] = items {
        return Ok(table.column_names().clone());
    }
    items
        .iter()
        .map(|item| match target.column(item)? {
            Some(name) => Ok(name.to_string()),
            None => Err(unsupported(&format!("select list item {}", item))),
        })
        .collect()
}

fn attributes_of<E: Environment>(
    table: &HeapTable<E>,
    names: &[Identifier],
) -> Result<ColumnAttributes, ExecError> {
    names
        .iter()
        .map(|name| {
            table
                .column_names()
                .iter()
                .position(|column| column == name)
                .map(|index| table.column_attributes()[index])
                .ok_or_else(|| {
                    ExecError::from(SchemaError::UnknownColumn {
                        table: table.table_name().to_string(),
                        column: name.clone(),
                    })
                })
        })
        .collect()
}

fn literal_value(expr: &Expr) -> Result<Value, ExecError> {
    match expr {
        Expr::LiteralInt(n) => i32::try_from(*n)
            .map(Value::Int)
            .map_err(|_| ExecError::IntegerOutOfRange(*n)),
        Expr::LiteralString(s) => Ok(Value::Text(s.clone())),
        other => Err(unsupported(&format!("non-literal value {}", other))),
    }
}

fn reject_catalog_write(table_name: &str) -> Result<(), ExecError> {
    if is_schema_table(table_name) {
        return Err(unsupported(&format!(
            "modifying catalog table {} directly",
            table_name
        )));
    }
    Ok(())
}

fn unsupported(what: &str) -> ExecError {
    ExecError::Unsupported(what.to_string())
}

fn unsupported_where(expr: &Expr) -> ExecError {
    unsupported(&format!(
        "WHERE condition {}; only column = literal joined by AND is supported",
        expr
    ))
}
