//! SQL parser using recursive descent.
//!
//! The [`Parser`] converts a stream of tokens into a [`Statement`] tree.
//! Expression parsing uses precedence climbing (see `expr.rs`).

use super::ast::*;
use super::error::SyntaxError;
use super::lexer::Lexer;
use super::token::{Keyword, Span, Token, TokenKind};

/// SQL parser that converts tokens into a statement tree.
pub struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    input: &'a str,
}

impl<'a> Parser<'a> {
    /// Creates a new parser for the given SQL input.
    pub fn new(input: &'a str) -> Self {
        Self {
            tokens: Lexer::new(input).collect(),
            pos: 0,
            input,
        }
    }

    /// Parses a single statement.
    ///
    /// Returns `Ok(None)` for empty input (whitespace and comments only).
    /// A trailing semicolon is allowed.
    pub fn parse(&mut self) -> Result<Option<Statement>, SyntaxError> {
        self.check_lexical_errors()?;

        if self.is_eof() {
            return Ok(None);
        }

        let stmt = self.parse_statement()?;
        self.consume_token(TokenKind::Semicolon);

        if !self.is_eof() {
            return Err(self.unexpected("end of input"));
        }

        Ok(Some(stmt))
    }

    /// Parses a script of `;`-separated statements.
    ///
    /// Empty statements between semicolons are skipped.
    pub fn parse_all(&mut self) -> Result<Vec<Statement>, SyntaxError> {
        self.check_lexical_errors()?;

        let mut stmts = Vec::new();
        loop {
            while self.consume_token(TokenKind::Semicolon) {}
            if self.is_eof() {
                break;
            }

            stmts.push(self.parse_statement()?);

            if !self.consume_token(TokenKind::Semicolon) && !self.is_eof() {
                return Err(self.unexpected("';'"));
            }
        }
        Ok(stmts)
    }

    /// Reports the first lexical error, if any.
    fn check_lexical_errors(&self) -> Result<(), SyntaxError> {
        for token in &self.tokens[self.pos..] {
            if let TokenKind::Error(message) = &token.kind {
                return Err(SyntaxError::new(message.clone(), token.span));
            }
        }
        Ok(())
    }

    /// Parses a single statement.
    fn parse_statement(&mut self) -> Result<Statement, SyntaxError> {
        if self.consume_keyword(Keyword::Create) {
            self.expect_keyword(Keyword::Table)?;
            return self.parse_create_table_stmt();
        }

        if self.consume_keyword(Keyword::Drop) {
            self.expect_keyword(Keyword::Table)?;
            let name = self.expect_identifier()?;
            return Ok(Statement::DropTable(DropTableStmt { name }));
        }

        if self.consume_keyword(Keyword::Show) {
            return self.parse_show_stmt();
        }

        if self.check_keyword(Keyword::Select) {
            let select = self.parse_select_stmt()?;
            return Ok(Statement::Select(Box::new(select)));
        }

        if self.consume_keyword(Keyword::Insert) {
            return self.parse_insert_stmt();
        }

        if self.consume_keyword(Keyword::Delete) {
            return self.parse_delete_stmt();
        }

        Err(self.unexpected("statement"))
    }

    /// Parses a CREATE TABLE statement.
    fn parse_create_table_stmt(&mut self) -> Result<Statement, SyntaxError> {
        let table_name = self.expect_identifier()?;

        self.expect_token(TokenKind::LParen)?;
        let mut columns = vec![self.parse_column_def()?];
        while self.consume_token(TokenKind::Comma) {
            columns.push(self.parse_column_def()?);
        }
        self.expect_token(TokenKind::RParen)?;

        Ok(Statement::CreateTable(CreateTableStmt {
            table_name,
            columns,
        }))
    }

    /// Parses a column definition.
    fn parse_column_def(&mut self) -> Result<ColumnDef, SyntaxError> {
        let name = self.expect_identifier()?;
        let data_type = self.parse_data_type()?;
        Ok(ColumnDef { name, data_type })
    }

    /// Parses a data type.
    fn parse_data_type(&mut self) -> Result<ColumnType, SyntaxError> {
        let data_type = match self.peek_kind() {
            Some(TokenKind::Keyword(Keyword::Int | Keyword::Integer)) => ColumnType::Int,
            Some(TokenKind::Keyword(Keyword::Text)) => ColumnType::Text,
            Some(TokenKind::Keyword(Keyword::Double)) => ColumnType::Double,
            _ => {
                return Err(self.unexpected("data type"));
            }
        };
        self.advance();
        Ok(data_type)
    }

    /// Parses SHOW TABLES or SHOW COLUMNS FROM table.
    fn parse_show_stmt(&mut self) -> Result<Statement, SyntaxError> {
        if self.consume_word("tables") {
            return Ok(Statement::Show(ShowStmt {
                kind: ShowKind::Tables,
                table_name: None,
            }));
        }

        if self.consume_word("columns") {
            self.expect_keyword(Keyword::From)?;
            let table_name = self.expect_identifier()?;
            return Ok(Statement::Show(ShowStmt {
                kind: ShowKind::Columns,
                table_name: Some(table_name),
            }));
        }

        Err(self.unexpected("TABLES or COLUMNS"))
    }

    /// Parses a SELECT statement.
    pub(crate) fn parse_select_stmt(&mut self) -> Result<SelectStmt, SyntaxError> {
        self.expect_keyword(Keyword::Select)?;

        let mut select_list = vec![self.parse_select_item()?];
        while self.consume_token(TokenKind::Comma) {
            select_list.push(self.parse_select_item()?);
        }

        let from = if self.consume_keyword(Keyword::From) {
            Some(self.parse_from_clause()?)
        } else {
            None
        };

        let where_clause = self.parse_where_clause()?;

        Ok(SelectStmt {
            select_list,
            from,
            where_clause,
        })
    }

    /// Parses a select list item: `*` or an expression.
    fn parse_select_item(&mut self) -> Result<Expr, SyntaxError> {
        if self.consume_token(TokenKind::Asterisk) {
            return Ok(Expr::Star);
        }
        self.parse_expr()
    }

    /// Parses a FROM clause; comma-separated references form a cross product.
    fn parse_from_clause(&mut self) -> Result<TableRef, SyntaxError> {
        let mut tables = vec![self.parse_table_ref()?];
        while self.consume_token(TokenKind::Comma) {
            tables.push(self.parse_table_ref()?);
        }

        if tables.len() == 1 {
            Ok(tables.remove(0))
        } else {
            Ok(TableRef::CrossProduct(tables))
        }
    }

    /// Parses a table reference followed by any number of joins.
    fn parse_table_ref(&mut self) -> Result<TableRef, SyntaxError> {
        let mut table_ref = self.parse_primary_table_ref()?;

        while let Some(join_type) = self.parse_join_type()? {
            let right = self.parse_primary_table_ref()?;

            let condition = if join_type != JoinType::Cross && self.consume_keyword(Keyword::On) {
                Some(self.parse_expr()?)
            } else {
                None
            };

            table_ref = TableRef::Join {
                left: Box::new(table_ref),
                right: Box::new(right),
                join_type,
                condition,
            };
        }

        Ok(table_ref)
    }

    /// Consumes a join keyword sequence, if present.
    fn parse_join_type(&mut self) -> Result<Option<JoinType>, SyntaxError> {
        let join_type = if self.consume_keyword(Keyword::Cross) {
            JoinType::Cross
        } else if self.consume_keyword(Keyword::Inner) {
            JoinType::Inner
        } else if self.consume_keyword(Keyword::Left) {
            self.consume_keyword(Keyword::Outer);
            JoinType::Left
        } else if self.consume_keyword(Keyword::Right) {
            self.consume_keyword(Keyword::Outer);
            JoinType::Right
        } else if self.consume_keyword(Keyword::Full) {
            self.consume_keyword(Keyword::Outer);
            JoinType::Full
        } else if self.consume_keyword(Keyword::Join) {
            return Ok(Some(JoinType::Inner));
        } else {
            return Ok(None);
        };

        self.expect_keyword(Keyword::Join)?;
        Ok(Some(join_type))
    }

    /// Parses a table name or parenthesized subquery, with optional alias.
    fn parse_primary_table_ref(&mut self) -> Result<TableRef, SyntaxError> {
        if self.consume_token(TokenKind::LParen) {
            let subquery = self.parse_select_stmt()?;
            self.expect_token(TokenKind::RParen)?;
            let alias = self.parse_alias()?;
            return Ok(TableRef::Select {
                subquery: Box::new(subquery),
                alias,
            });
        }

        let name = self.expect_identifier()?;
        let alias = self.parse_alias()?;
        Ok(TableRef::Name { name, alias })
    }

    /// Parses `[AS] alias`.
    fn parse_alias(&mut self) -> Result<Option<String>, SyntaxError> {
        if self.consume_keyword(Keyword::As) {
            return Ok(Some(self.expect_identifier()?));
        }
        if let Some(TokenKind::Identifier(alias)) = self.peek_kind() {
            let alias = alias.clone();
            self.advance();
            return Ok(Some(alias));
        }
        Ok(None)
    }

    /// Parses an optional WHERE clause.
    fn parse_where_clause(&mut self) -> Result<Option<Expr>, SyntaxError> {
        if self.consume_keyword(Keyword::Where) {
            Ok(Some(self.parse_expr()?))
        } else {
            Ok(None)
        }
    }

    /// Parses an INSERT statement.
    fn parse_insert_stmt(&mut self) -> Result<Statement, SyntaxError> {
        self.expect_keyword(Keyword::Into)?;
        let table_name = self.expect_identifier()?;

        let columns = if self.consume_token(TokenKind::LParen) {
            let columns = self.parse_identifier_list()?;
            self.expect_token(TokenKind::RParen)?;
            Some(columns)
        } else {
            None
        };

        self.expect_keyword(Keyword::Values)?;
        self.expect_token(TokenKind::LParen)?;
        let values = self.parse_expr_list()?;
        self.expect_token(TokenKind::RParen)?;

        Ok(Statement::Insert(InsertStmt {
            table_name,
            columns,
            values,
        }))
    }

    /// Parses a DELETE statement.
    fn parse_delete_stmt(&mut self) -> Result<Statement, SyntaxError> {
        self.expect_keyword(Keyword::From)?;
        let table_name = self.expect_identifier()?;
        let where_clause = self.parse_where_clause()?;

        Ok(Statement::Delete(DeleteStmt {
            table_name,
            where_clause,
        }))
    }

    // ==================== Helper methods ====================

    /// Returns true if at end of tokens.
    pub(crate) fn is_eof(&self) -> bool {
        self.peek().is_none_or(|t| t.is_eof())
    }

    /// Peeks at the current token.
    pub(crate) fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    /// Peeks at the kind of the current token.
    pub(crate) fn peek_kind(&self) -> Option<&TokenKind> {
        self.peek().map(|t| &t.kind)
    }

    /// Advances to the next token.
    pub(crate) fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    /// Builds an "expected X, found <current token>" error.
    pub(crate) fn unexpected(&self, expected: impl std::fmt::Display) -> SyntaxError {
        match self.peek() {
            Some(token) => SyntaxError::expected(expected, &token.kind, token.span),
            None => SyntaxError::expected(expected, "end of input", Span::at(self.input.len())),
        }
    }

    /// Checks if the current token is a specific keyword.
    pub(crate) fn check_keyword(&self, kw: Keyword) -> bool {
        matches!(self.peek_kind(), Some(TokenKind::Keyword(k)) if *k == kw)
    }

    /// Consumes the current token if it's a specific keyword.
    pub(crate) fn consume_keyword(&mut self, kw: Keyword) -> bool {
        if self.check_keyword(kw) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Expects a specific keyword, returning an error if not found.
    pub(crate) fn expect_keyword(&mut self, kw: Keyword) -> Result<(), SyntaxError> {
        if self.consume_keyword(kw) {
            Ok(())
        } else {
            Err(self.unexpected(kw))
        }
    }

    /// Consumes an unquoted identifier spelled `word` (case-insensitive).
    fn consume_word(&mut self, word: &str) -> bool {
        let matched = match self.peek() {
            Some(Token {
                kind: TokenKind::Identifier(name),
                span,
            }) => {
                name.eq_ignore_ascii_case(word)
                    && !self.input[span.start..span.end].starts_with('"')
            }
            _ => false,
        };
        if matched {
            self.advance();
        }
        matched
    }

    /// Checks if the current token matches.
    pub(crate) fn check_token(&self, kind: TokenKind) -> bool {
        self.peek_kind() == Some(&kind)
    }

    /// Consumes the current token if it matches.
    pub(crate) fn consume_token(&mut self, kind: TokenKind) -> bool {
        if self.check_token(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Expects a specific token, returning an error if not found.
    pub(crate) fn expect_token(&mut self, kind: TokenKind) -> Result<(), SyntaxError> {
        if self.consume_token(kind.clone()) {
            Ok(())
        } else {
            Err(self.unexpected(&kind))
        }
    }

    /// Expects an identifier, returning its name.
    pub(crate) fn expect_identifier(&mut self) -> Result<String, SyntaxError> {
        match self.peek_kind() {
            Some(TokenKind::Identifier(name)) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    /// Parses a comma-separated list of identifiers.
    fn parse_identifier_list(&mut self) -> Result<Vec<String>, SyntaxError> {
        let mut list = vec![self.expect_identifier()?];
        while self.consume_token(TokenKind::Comma) {
            list.push(self.expect_identifier()?);
        }
        Ok(list)
    }

    /// Parses a comma-separated list of expressions.
    fn parse_expr_list(&mut self) -> Result<Vec<Expr>, SyntaxError> {
        let mut list = vec![self.parse_expr()?];
        while self.consume_token(TokenKind::Comma) {
            list.push(self.parse_expr()?);
        }
        Ok(list)
    }
}
