//! SQL front end.
//!
//! A handwritten recursive descent parser that turns SQL text into a
//! [`Statement`] tree. Every node implements `Display`, rendering canonical
//! SQL for the shell's statement echo.

mod ast;
mod error;
mod expr;
mod lexer;
mod parser;
mod token;

pub use ast::*;
pub use error::SyntaxError;
pub use lexer::Lexer;
pub use parser::Parser;
pub use token::{Keyword, Span, Token, TokenKind};
