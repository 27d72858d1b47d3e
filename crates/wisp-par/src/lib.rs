//! wisp-par - recursive-descent parser turning a token stream into an AST.

pub mod ast;
pub mod parser;

pub use ast::{BinOp, Expr, IfCase, NumberLit, UnOp};
pub use parser::Parser;

use wisp_lex::Lexer;
use wisp_util::WispError;

/// Lexes then parses `source` in one step, the way a driver normally wants
/// it; the two stages remain independently usable for anyone who needs the
/// token stream on its own.
pub fn parse(file_name: &str, source: &str) -> Result<Expr, WispError> {
    let tokens = Lexer::new(file_name, source).make_tokens()?;
    Parser::new(tokens).parse()
}
