//! Stencil lexing: the template scanner and the snippet lexer.
//!
//! [`Scanner`] performs the first compilation pass — it classifies raw
//! template text into an ordered list of [`stencil_types::Segment`]s.
//! [`Lexer`] tokenizes embedded expression/code snippets for the parser.

mod lexer;
mod scanner;
pub mod token;

pub use lexer::Lexer;
pub use scanner::Scanner;
