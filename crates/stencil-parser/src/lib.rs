//! Stencil snippet parser.
//!
//! Parses the content of `${...}`, `${[...]}` and `${{...}}` directives
//! into the expression sublanguage AST at template compile time. All
//! entry points take the template line the snippet starts on, so every
//! AST node carries absolute template line numbers.

mod parse_expr;
mod parse_stmt;
mod parser;

pub use parser::Parser;

use stencil_lexer::Lexer;
use stencil_types::ast::{Block, Expr};
use stencil_types::SyntaxError;

/// Parse a `${...}` snippet into a single expression.
pub fn parse_expression_snippet(text: &str, start_line: u32) -> Result<Expr, SyntaxError> {
    let tokens = Lexer::new(text, start_line).lex()?;
    Parser::new(tokens).parse_expression_only()
}

/// Parse a `${[...]}` snippet (the content between `${[` and `]}`) into a
/// collection construction: a comprehension or a plain element list.
pub fn parse_collection_snippet(text: &str, start_line: u32) -> Result<Expr, SyntaxError> {
    let tokens = Lexer::new(text, start_line).lex()?;
    Parser::new(tokens).parse_collection_only()
}

/// Parse a `${{...}}` snippet into a statement block.
pub fn parse_block_snippet(text: &str, start_line: u32) -> Result<Block, SyntaxError> {
    let tokens = Lexer::new(text, start_line).lex()?;
    Parser::new(tokens).parse_block_only()
}
