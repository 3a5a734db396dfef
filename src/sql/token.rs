//! Tokens handed from the lexer to the parser.

use std::fmt;

/// Byte range of a token within the statement text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// An empty range at `pos`, used for end of input.
    pub fn at(pos: usize) -> Self {
        Self::new(pos, pos)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Unsigned; `-` is lexed on its own and folded in by the parser.
    Integer(i64),
    /// Single-quoted literal with `''` already unescaped.
    String(String),
    /// Bare word, or double-quoted name with `""` unescaped.
    Identifier(String),
    Keyword(Keyword),

    Plus,
    Minus,
    Asterisk,
    Slash,
    Eq,
    Neq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    LParen,
    RParen,
    Comma,
    Semicolon,
    Dot,

    /// Text the lexer could not make sense of; carries the reason.
    Error(String),
    Eof,
}

/// Spellings of operators and punctuation. Two-character forms come first so
/// a prefix match picks the longest one; `<>` is the canonical `Neq`.
pub(crate) const SYMBOLS: &[(&str, TokenKind)] = &[
    ("<>", TokenKind::Neq),
    ("!=", TokenKind::Neq),
    ("<=", TokenKind::LtEq),
    (">=", TokenKind::GtEq),
    ("+", TokenKind::Plus),
    ("-", TokenKind::Minus),
    ("*", TokenKind::Asterisk),
    ("/", TokenKind::Slash),
    ("=", TokenKind::Eq),
    ("<", TokenKind::Lt),
    (">", TokenKind::Gt),
    ("(", TokenKind::LParen),
    (")", TokenKind::RParen),
    (",", TokenKind::Comma),
    (";", TokenKind::Semicolon),
    (".", TokenKind::Dot),
];

/// Describes the token the way parse errors quote it.
impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Integer(n) => write!(f, "integer {n}"),
            TokenKind::String(s) => write!(f, "string '{s}'"),
            TokenKind::Identifier(name) => write!(f, "identifier \"{name}\""),
            TokenKind::Keyword(kw) => write!(f, "{kw}"),
            TokenKind::Error(reason) => f.write_str(reason),
            TokenKind::Eof => f.write_str("end of input"),
            symbol => match SYMBOLS.iter().find(|(_, kind)| kind == symbol) {
                Some((text, _)) => write!(f, "'{text}'"),
                None => write!(f, "{symbol:?}"),
            },
        }
    }
}

macro_rules! keywords {
    ($($variant:ident => $text:literal),* $(,)?) => {
        /// Reserved words. Matching ignores case; `TABLES` and `COLUMNS` are
        /// deliberately absent so they stay usable as names.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Keyword {
            $($variant,)*
        }

        impl Keyword {
            const ALL: &'static [Keyword] = &[$(Keyword::$variant,)*];

            /// Upper-case spelling, as echoed back.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Keyword::$variant => $text,)*
                }
            }
        }
    };
}

keywords! {
    Create => "CREATE",
    Drop => "DROP",
    Table => "TABLE",
    Int => "INT",
    Integer => "INTEGER",
    Text => "TEXT",
    Double => "DOUBLE",
    Show => "SHOW",
    Select => "SELECT",
    From => "FROM",
    Where => "WHERE",
    As => "AS",
    Join => "JOIN",
    Inner => "INNER",
    Left => "LEFT",
    Right => "RIGHT",
    Full => "FULL",
    Outer => "OUTER",
    Cross => "CROSS",
    On => "ON",
    And => "AND",
    Or => "OR",
    Insert => "INSERT",
    Into => "INTO",
    Values => "VALUES",
    Delete => "DELETE",
}

impl Keyword {
    pub fn parse(word: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|kw| kw.as_str().eq_ignore_ascii_case(word))
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
