//! wisp-lex - hand-written lexer (no parser-generator, no regex engine):
//! source text to a flat token stream.

pub mod cursor;
pub mod lexer;
pub mod token;

pub use cursor::Cursor;
pub use lexer::Lexer;
pub use token::{Keyword, Token, TokenKind};
