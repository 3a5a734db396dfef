//! Parse failures.

use std::fmt;

use super::token::Span;

/// Why a statement was rejected and where the parser stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    pub span: Span,
}

impl SyntaxError {
    pub(crate) fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }

    /// `expected <what>, found <found>`
    pub(crate) fn expected(
        what: impl fmt::Display,
        found: impl fmt::Display,
        span: Span,
    ) -> Self {
        Self::new(format!("expected {what}, found {found}"), span)
    }

    /// 1-based offset of the offending token, as shown to the user.
    pub fn position(&self) -> usize {
        self.span.start + 1
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at position {}", self.message, self.position())
    }
}

impl std::error::Error for SyntaxError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::TokenKind;

    #[test]
    fn test_expected_message() {
        let err = SyntaxError::expected("identifier", TokenKind::Semicolon, Span::new(5, 6));
        assert_eq!(err.to_string(), "expected identifier, found ';' at position 6");
    }
}
