//! Expression parsing with precedence climbing.
//!
//! Precedence (low to high):
//! 1. OR
//! 2. AND
//! 3. =, <>, <, <=, >, >=
//! 4. +, -
//! 5. *, /
//!
//! All binary operators are left-associative.

use super::ast::{BinaryOperator, Expr};
use super::error::SyntaxError;
use super::parser::Parser;
use super::token::{Keyword, TokenKind};

impl Parser<'_> {
    /// Parses an expression.
    pub fn parse_expr(&mut self) -> Result<Expr, SyntaxError> {
        self.parse_expr_with_precedence(0)
    }

    /// Parses an expression whose operators bind at least as tightly as
    /// `min_prec`.
    fn parse_expr_with_precedence(&mut self, min_prec: u8) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_primary_expr()?;

        while let Some(op) = self.peek_binary_op() {
            let prec = op.precedence();
            if prec < min_prec {
                break;
            }
            self.advance();

            let right = self.parse_expr_with_precedence(prec + 1)?;
            left = Expr::binary(left, op, right);
        }

        Ok(left)
    }

    /// Returns the binary operator at the current position, if any.
    fn peek_binary_op(&self) -> Option<BinaryOperator> {
        let op = match self.peek_kind()? {
            TokenKind::Keyword(Keyword::Or) => BinaryOperator::Or,
            TokenKind::Keyword(Keyword::And) => BinaryOperator::And,
            TokenKind::Eq => BinaryOperator::Eq,
            TokenKind::Neq => BinaryOperator::Neq,
            TokenKind::Lt => BinaryOperator::Lt,
            TokenKind::LtEq => BinaryOperator::LtEq,
            TokenKind::Gt => BinaryOperator::Gt,
            TokenKind::GtEq => BinaryOperator::GtEq,
            TokenKind::Plus => BinaryOperator::Add,
            TokenKind::Minus => BinaryOperator::Sub,
            TokenKind::Asterisk => BinaryOperator::Mul,
            TokenKind::Slash => BinaryOperator::Div,
            _ => return None,
        };
        Some(op)
    }

    /// Parses a literal, column reference or parenthesized expression.
    fn parse_primary_expr(&mut self) -> Result<Expr, SyntaxError> {
        // Negative integer literal
        if self.consume_token(TokenKind::Minus) {
            return match self.peek_kind() {
                Some(TokenKind::Integer(n)) => {
                    let n = -*n;
                    self.advance();
                    Ok(Expr::LiteralInt(n))
                }
                _ => Err(self.unexpected("integer after '-'")),
            };
        }

        match self.peek_kind() {
            Some(TokenKind::Integer(n)) => {
                let n = *n;
                self.advance();
                Ok(Expr::LiteralInt(n))
            }
            Some(TokenKind::String(s)) => {
                let s = s.clone();
                self.advance();
                Ok(Expr::LiteralString(s))
            }
            Some(TokenKind::LParen) => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect_token(TokenKind::RParen)?;
                Ok(expr)
            }
            Some(TokenKind::Identifier(_)) => {
                let first = self.expect_identifier()?;
                if self.consume_token(TokenKind::Dot) {
                    let name = self.expect_identifier()?;
                    Ok(Expr::ColumnRef {
                        table: Some(first),
                        name,
                    })
                } else {
                    Ok(Expr::column(first))
                }
            }
            _ => Err(self.unexpected("expression")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expr(sql: &str) -> Expr {
        Parser::new(sql).parse_expr().unwrap()
    }

    #[test]
    fn test_literals() {
        assert_eq!(expr("42"), Expr::LiteralInt(42));
        assert_eq!(expr("-7"), Expr::LiteralInt(-7));
        assert_eq!(expr("'hi'"), Expr::LiteralString("hi".to_string()));
        assert_eq!(
            expr("t.a"),
            Expr::ColumnRef {
                table: Some("t".to_string()),
                name: "a".to_string()
            }
        );
    }

    #[test]
    fn test_precedence() {
        let e = expr("a = 1 OR b = 2 AND c = 3");
        let Expr::Operator { op, right, .. } = &e else {
            panic!("expected operator, got {e:?}");
        };
        assert_eq!(*op, BinaryOperator::Or);
        assert!(matches!(
            **right,
            Expr::Operator {
                op: BinaryOperator::And,
                ..
            }
        ));

        let e = expr("1 + 2 * 3");
        assert_eq!(
            e,
            Expr::binary(
                Expr::LiteralInt(1),
                BinaryOperator::Add,
                Expr::binary(Expr::LiteralInt(2), BinaryOperator::Mul, Expr::LiteralInt(3)),
            )
        );
    }

    #[test]
    fn test_left_associative() {
        assert_eq!(
            expr("1 - 2 - 3"),
            Expr::binary(
                Expr::binary(Expr::LiteralInt(1), BinaryOperator::Sub, Expr::LiteralInt(2)),
                BinaryOperator::Sub,
                Expr::LiteralInt(3),
            )
        );
    }

    #[test]
    fn test_parentheses_and_echo() {
        let e = expr("(a = 1 OR b = 2) AND c <> 'x'");
        assert_eq!(e.to_string(), "(a = 1 OR b = 2) AND c <> 'x'");
    }

    #[test]
    fn test_errors() {
        assert!(Parser::new("-a").parse_expr().is_err());
        assert!(Parser::new("(1").parse_expr().is_err());
        assert!(Parser::new("=").parse_expr().is_err());
    }
}
