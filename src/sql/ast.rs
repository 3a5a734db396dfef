//! Statement tree for SQL statements.
//!
//! The tree is produced by the [`Parser`](super::Parser) and consumed by the
//! executor. `Display` renders every node back as canonical SQL, which the
//! shell echoes before running a statement.

use std::fmt;

use super::token::Keyword;

/// A SQL statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// CREATE TABLE statement.
    CreateTable(CreateTableStmt),
    /// DROP TABLE statement.
    DropTable(DropTableStmt),
    /// SHOW TABLES / SHOW COLUMNS statement.
    Show(ShowStmt),
    /// SELECT statement.
    Select(Box<SelectStmt>),
    /// INSERT statement.
    Insert(InsertStmt),
    /// DELETE statement.
    Delete(DeleteStmt),
}

/// CREATE TABLE statement.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableStmt {
    /// Table name.
    pub table_name: String,
    /// Column definitions, in declared order.
    pub columns: Vec<ColumnDef>,
}

/// Column definition in CREATE TABLE.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    /// Column name.
    pub name: String,
    /// Declared type.
    pub data_type: ColumnType,
}

/// Column types the parser accepts.
///
/// Only INT and TEXT can be stored; DOUBLE parses so that it can be refused
/// with a proper error at execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// INT / INTEGER.
    Int,
    /// TEXT.
    Text,
    /// DOUBLE.
    Double,
}

/// DROP TABLE statement.
#[derive(Debug, Clone, PartialEq)]
pub struct DropTableStmt {
    /// Table name.
    pub name: String,
}

/// What a SHOW statement lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowKind {
    /// SHOW TABLES.
    Tables,
    /// SHOW COLUMNS FROM table.
    Columns,
}

/// SHOW statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ShowStmt {
    /// What to list.
    pub kind: ShowKind,
    /// Table for SHOW COLUMNS.
    pub table_name: Option<String>,
}

/// SELECT statement.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStmt {
    /// Selected expressions; `Expr::Star` for `*`.
    pub select_list: Vec<Expr>,
    /// FROM clause.
    pub from: Option<TableRef>,
    /// WHERE clause.
    pub where_clause: Option<Expr>,
}

/// INSERT statement.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStmt {
    /// Target table.
    pub table_name: String,
    /// Explicit column list, if given.
    pub columns: Option<Vec<String>>,
    /// Values, one per column.
    pub values: Vec<Expr>,
}

/// DELETE statement.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStmt {
    /// Target table.
    pub table_name: String,
    /// WHERE clause.
    pub where_clause: Option<Expr>,
}

/// A table reference in a FROM clause.
#[derive(Debug, Clone, PartialEq)]
pub enum TableRef {
    /// Named table.
    Name {
        /// Table name.
        name: String,
        /// Alias.
        alias: Option<String>,
    },
    /// Join between two table references.
    Join {
        /// Left side.
        left: Box<TableRef>,
        /// Right side.
        right: Box<TableRef>,
        /// Join type.
        join_type: JoinType,
        /// ON condition.
        condition: Option<Expr>,
    },
    /// Comma-separated table references.
    CrossProduct(Vec<TableRef>),
    /// Parenthesized subquery.
    Select {
        /// The subquery.
        subquery: Box<SelectStmt>,
        /// Alias.
        alias: Option<String>,
    },
}

/// Type of JOIN.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    /// [INNER] JOIN.
    Inner,
    /// LEFT [OUTER] JOIN.
    Left,
    /// RIGHT [OUTER] JOIN.
    Right,
    /// FULL [OUTER] JOIN.
    Full,
    /// CROSS JOIN.
    Cross,
}

/// Expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// `*` in a select list.
    Star,
    /// Column reference, optionally qualified.
    ColumnRef {
        /// Table name or alias.
        table: Option<String>,
        /// Column name.
        name: String,
    },
    /// Integer literal.
    LiteralInt(i64),
    /// String literal.
    LiteralString(String),
    /// Binary operation.
    Operator {
        /// Left operand.
        left: Box<Expr>,
        /// Operator.
        op: BinaryOperator,
        /// Right operand.
        right: Box<Expr>,
    },
}

impl Expr {
    /// Creates an unqualified column reference.
    pub fn column(name: impl Into<String>) -> Self {
        Expr::ColumnRef {
            table: None,
            name: name.into(),
        }
    }

    /// Creates a binary operation.
    pub fn binary(left: Expr, op: BinaryOperator, right: Expr) -> Self {
        Expr::Operator {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    /// OR
    Or,
    /// AND
    And,
    /// =
    Eq,
    /// <>
    Neq,
    /// <
    Lt,
    /// <=
    LtEq,
    /// >
    Gt,
    /// >=
    GtEq,
    /// +
    Add,
    /// -
    Sub,
    /// *
    Mul,
    /// /
    Div,
}

impl BinaryOperator {
    /// Binding strength; higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOperator::Or => 1,
            BinaryOperator::And => 2,
            BinaryOperator::Eq
            | BinaryOperator::Neq
            | BinaryOperator::Lt
            | BinaryOperator::LtEq
            | BinaryOperator::Gt
            | BinaryOperator::GtEq => 3,
            BinaryOperator::Add | BinaryOperator::Sub => 4,
            BinaryOperator::Mul | BinaryOperator::Div => 5,
        }
    }

    /// Returns the SQL spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOperator::Or => "OR",
            BinaryOperator::And => "AND",
            BinaryOperator::Eq => "=",
            BinaryOperator::Neq => "<>",
            BinaryOperator::Lt => "<",
            BinaryOperator::LtEq => "<=",
            BinaryOperator::Gt => ">",
            BinaryOperator::GtEq => ">=",
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
        }
    }
}

// ==================== Echo ====================

/// Writes an identifier, double-quoting it when it would not lex back as
/// the same identifier.
struct Ident<'a>(&'a str);

impl fmt::Display for Ident<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.0;
        let plain = s.chars().next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
            && Keyword::parse(s).is_none();
        if plain {
            f.write_str(s)
        } else {
            write!(f, "\"{}\"", s.replace('"', "\"\""))
        }
    }
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::CreateTable(stmt) => {
                write!(f, "CREATE TABLE {} (", Ident(&stmt.table_name))?;
                write_list(f, &stmt.columns)?;
                f.write_str(")")
            }
            Statement::DropTable(stmt) => write!(f, "DROP TABLE {}", Ident(&stmt.name)),
            Statement::Show(stmt) => match (&stmt.kind, &stmt.table_name) {
                (ShowKind::Columns, Some(name)) => write!(f, "SHOW COLUMNS FROM {}", Ident(name)),
                (ShowKind::Columns, None) => f.write_str("SHOW COLUMNS"),
                (ShowKind::Tables, _) => f.write_str("SHOW TABLES"),
            },
            Statement::Select(stmt) => write!(f, "{}", stmt),
            Statement::Insert(stmt) => {
                write!(f, "INSERT INTO {}", Ident(&stmt.table_name))?;
                if let Some(columns) = &stmt.columns {
                    let columns: Vec<_> = columns.iter().map(|c| Ident(c.as_str())).collect();
                    f.write_str(" (")?;
                    write_list(f, &columns)?;
                    f.write_str(")")?;
                }
                f.write_str(" VALUES (")?;
                write_list(f, &stmt.values)?;
                f.write_str(")")
            }
            Statement::Delete(stmt) => {
                write!(f, "DELETE FROM {}", Ident(&stmt.table_name))?;
                if let Some(expr) = &stmt.where_clause {
                    write!(f, " WHERE {}", expr)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for ColumnDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", Ident(&self.name), self.data_type)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ColumnType::Int => "INT",
            ColumnType::Text => "TEXT",
            ColumnType::Double => "DOUBLE",
        })
    }
}

impl fmt::Display for SelectStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SELECT ")?;
        write_list(f, &self.select_list)?;
        if let Some(from) = &self.from {
            write!(f, " FROM {}", from)?;
        }
        if let Some(expr) = &self.where_clause {
            write!(f, " WHERE {}", expr)?;
        }
        Ok(())
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableRef::Name { name, alias } => {
                write!(f, "{}", Ident(name))?;
                if let Some(alias) = alias {
                    write!(f, " AS {}", Ident(alias))?;
                }
                Ok(())
            }
            TableRef::Join {
                left,
                right,
                join_type,
                condition,
            } => {
                write!(f, "{} {} {}", left, join_type, right)?;
                if let Some(condition) = condition {
                    write!(f, " ON {}", condition)?;
                }
                Ok(())
            }
            TableRef::CrossProduct(tables) => write_list(f, tables),
            TableRef::Select { subquery, alias } => {
                write!(f, "({})", subquery)?;
                if let Some(alias) = alias {
                    write!(f, " AS {}", Ident(alias))?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            JoinType::Inner => "JOIN",
            JoinType::Left => "LEFT JOIN",
            JoinType::Right => "RIGHT JOIN",
            JoinType::Full => "FULL JOIN",
            JoinType::Cross => "CROSS JOIN",
        })
    }
}

impl Expr {
    /// Writes `self` as an operand of an operator with precedence
    /// `parent`, parenthesizing when it binds looser.
    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>, parent: u8, right: bool) -> fmt::Result {
        match self {
            Expr::Operator { op, .. }
                if op.precedence() < parent || (right && op.precedence() == parent) =>
            {
                write!(f, "({})", self)
            }
            _ => write!(f, "{}", self),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Star => f.write_str("*"),
            Expr::ColumnRef { table, name } => {
                if let Some(table) = table {
                    write!(f, "{}.", Ident(table))?;
                }
                write!(f, "{}", Ident(name))
            }
            Expr::LiteralInt(n) => write!(f, "{}", n),
            Expr::LiteralString(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Expr::Operator { left, op, right } => {
                let prec = op.precedence();
                left.fmt_operand(f, prec, false)?;
                write!(f, " {} ", op.as_str())?;
                right.fmt_operand(f, prec, true)
            }
        }
    }
}
