//! SQL lexer.
//!
//! The [`Lexer`] converts a SQL string into a stream of [`Token`]s.

use super::token::{Keyword, SYMBOLS, Span, Token, TokenKind};

/// SQL lexer that tokenizes input strings.
///
/// The lexer implements `Iterator<Item = Token>` and ends with one
/// `TokenKind::Eof`. It handles:
/// - Keywords (case-insensitive)
/// - Identifiers (unquoted and double-quoted)
/// - Integer literals
/// - String literals (single-quoted with '' escape)
/// - Operators and punctuation
/// - `--` line comments
///
/// Lexical errors are returned as `TokenKind::Error` tokens.
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    eof_returned: bool,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input string.
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            eof_returned: false,
        }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn advance(&mut self) {
        if let Some(ch) = self.peek() {
            self.pos += ch.len_utf8();
        }
    }

    /// Advances while `pred` holds and returns the consumed text.
    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.advance();
        }
        &self.input[start..self.pos]
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            self.take_while(char::is_whitespace);
            if self.rest().starts_with("--") {
                self.take_while(|ch| ch != '\n');
            } else {
                return;
            }
        }
    }

    fn scan_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();
        let start = self.pos;

        let Some(ch) = self.peek() else {
            return Token::new(TokenKind::Eof, Span::at(start));
        };

        let kind = match ch {
            '\'' => self.scan_quoted('\'', "unterminated string literal", TokenKind::String),
            '"' => self.scan_quoted('"', "unterminated quoted identifier", TokenKind::Identifier),
            c if c.is_ascii_digit() => {
                let digits = self.take_while(|c| c.is_ascii_digit());
                match digits.parse::<i64>() {
                    Ok(n) => TokenKind::Integer(n),
                    Err(_) => TokenKind::Error("invalid number literal".to_string()),
                }
            }
            c if is_ident_start(c) => {
                let word = self.take_while(is_ident_continue);
                match Keyword::parse(word) {
                    Some(kw) => TokenKind::Keyword(kw),
                    None => TokenKind::Identifier(word.to_string()),
                }
            }
            _ => self.scan_operator_or_punctuation(ch),
        };
        Token::new(kind, Span::new(start, self.pos))
    }

    /// Scans a literal delimited by `quote`, where a doubled quote stands
    /// for itself.
    fn scan_quoted(
        &mut self,
        quote: char,
        unterminated: &str,
        make: fn(String) -> TokenKind,
    ) -> TokenKind {
        self.advance();
        let mut value = String::new();
        loop {
            match self.peek() {
                None => return TokenKind::Error(unterminated.to_string()),
                Some(c) if c == quote => {
                    self.advance();
                    if self.peek() == Some(quote) {
                        value.push(quote);
                        self.advance();
                    } else {
                        return make(value);
                    }
                }
                Some(c) => {
                    value.push(c);
                    self.advance();
                }
            }
        }
    }

    fn scan_operator_or_punctuation(&mut self, ch: char) -> TokenKind {
        let rest = self.rest();
        match SYMBOLS.iter().find(|(text, _)| rest.starts_with(text)) {
            Some((text, kind)) => {
                self.pos += text.len();
                kind.clone()
            }
            None => {
                self.advance();
                TokenKind::Error(format!("unexpected character '{ch}'"))
            }
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        if self.eof_returned {
            return None;
        }
        let token = self.scan_token();
        if token.is_eof() {
            self.eof_returned = true;
        }
        Some(token)
    }
}

fn is_ident_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn is_ident_continue(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(input: &str) -> Vec<TokenKind> {
        Lexer::new(input).map(|t| t.kind).collect()
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(lex(""), vec![TokenKind::Eof]);
        assert_eq!(lex("  \n\t -- just a comment"), vec![TokenKind::Eof]);
    }

    #[test]
    fn test_keywords_and_identifiers() {
        assert_eq!(
            lex("select a FROM _tables"),
            vec![
                TokenKind::Keyword(Keyword::Select),
                TokenKind::Identifier("a".to_string()),
                TokenKind::Keyword(Keyword::From),
                TokenKind::Identifier("_tables".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_quoted() {
        assert_eq!(
            lex(r#"'it''s' "my table""#),
            vec![
                TokenKind::String("it's".to_string()),
                TokenKind::Identifier("my table".to_string()),
                TokenKind::Eof,
            ]
        );
        assert!(matches!(lex("'open")[0], TokenKind::Error(_)));
    }

    #[test]
    fn test_numbers_and_operators() {
        assert_eq!(
            lex("a>=-12<>3;"),
            vec![
                TokenKind::Identifier("a".to_string()),
                TokenKind::GtEq,
                TokenKind::Minus,
                TokenKind::Integer(12),
                TokenKind::Neq,
                TokenKind::Integer(3),
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
        assert!(matches!(
            lex("99999999999999999999")[0],
            TokenKind::Error(_)
        ));
    }

    #[test]
    fn test_spans() {
        let tokens: Vec<_> = Lexer::new("DROP  foo").collect();
        assert_eq!(tokens[0].span, Span::new(0, 4));
        assert_eq!(tokens[1].span, Span::new(6, 9));
        assert_eq!(tokens[2].span, Span::at(9));
    }

    #[test]
    fn test_unexpected_character() {
        assert_eq!(
            lex("?"),
            vec![
                TokenKind::Error("unexpected character '?'".to_string()),
                TokenKind::Eof
            ]
        );
    }
}
