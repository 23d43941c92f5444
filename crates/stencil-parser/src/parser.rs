//! Core parser infrastructure: token cursor, error reporting, helpers.

use stencil_lexer::token::{Token, TokenKind};
use stencil_types::ast::{Block, Expr, Ident};
use stencil_types::{ErrorCode, Span, SyntaxError};

/// The snippet parser.
///
/// Consumes a token stream produced by the snippet lexer and builds AST
/// nodes. Fail-fast: the first error aborts the template compile.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// Create a parser from a token stream (must end with `Eof`).
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    // ── Entry points ──────────────────────────────────────────────────────────

    /// Parse exactly one expression spanning the whole snippet.
    pub fn parse_expression_only(mut self) -> Result<Expr, SyntaxError> {
        self.skip_separators();
        let expr = self.parse_expression()?;
        self.skip_separators();
        self.expect_eof()?;
        Ok(expr)
    }

    /// Parse a collection construction spanning the whole snippet.
    pub fn parse_collection_only(mut self) -> Result<Expr, SyntaxError> {
        self.skip_separators();
        let expr = self.parse_collection_body()?;
        self.skip_separators();
        self.expect_eof()?;
        Ok(expr)
    }

    /// Parse a statement sequence spanning the whole snippet.
    pub fn parse_block_only(mut self) -> Result<Block, SyntaxError> {
        let start = self.current_span();
        let stmts = self.parse_stmt_sequence(/*in_braces=*/ false)?;
        let span = start.merge(self.previous_span());
        self.expect_eof()?;
        Ok(Block { stmts, span })
    }

    // ── Token cursor ──────────────────────────────────────────────────────────

    pub(crate) fn peek(&self) -> &Token {
        // The stream always ends with Eof, so `last` is safe as fallback.
        self.tokens.get(self.pos).unwrap_or_else(|| {
            self.tokens
                .last()
                .expect("token stream always ends with Eof")
        })
    }

    pub(crate) fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    pub(crate) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    pub(crate) fn previous_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span
        } else {
            Span::point(1, 1)
        }
    }

    pub(crate) fn current_span(&self) -> Span {
        self.peek().span
    }

    pub(crate) fn at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    // ── Separators ────────────────────────────────────────────────────────────

    /// Skip newline and semicolon tokens. Statements inside `${{...}}` are
    /// newline-separated; semicolons allow several statements on one line.
    pub(crate) fn skip_separators(&mut self) {
        while matches!(self.peek_kind(), TokenKind::Newline | TokenKind::Semicolon) {
            self.advance();
        }
    }

    /// Returns `true` if the current token can terminate a statement.
    pub(crate) fn at_stmt_boundary(&self) -> bool {
        matches!(
            self.peek_kind(),
            TokenKind::Newline | TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof
        )
    }

    // ── Expect helpers ────────────────────────────────────────────────────────

    pub(crate) fn expect(&mut self, expected: &TokenKind) -> Result<Token, SyntaxError> {
        if self.check(expected) {
            Ok(self.advance())
        } else {
            Err(self.error_at_current(
                ErrorCode::UNEXPECTED_TOKEN,
                format!("expected '{}', got '{}'", expected, self.peek_kind()),
            ))
        }
    }

    pub(crate) fn expect_identifier(&mut self) -> Result<Ident, SyntaxError> {
        match self.peek_kind().clone() {
            TokenKind::Identifier(name) => {
                let span = self.advance().span;
                Ok(Ident::new(name, span))
            }
            other => Err(self.error_at_current(
                ErrorCode::UNEXPECTED_TOKEN,
                format!("expected identifier, got '{other}'"),
            )),
        }
    }

    fn expect_eof(&mut self) -> Result<(), SyntaxError> {
        if self.at_end() {
            Ok(())
        } else {
            Err(self.error_at_current(
                ErrorCode::UNEXPECTED_TOKEN,
                format!("unexpected '{}' after expression", self.peek_kind()),
            ))
        }
    }

    // ── Error reporting ───────────────────────────────────────────────────────

    pub(crate) fn error_at_current(
        &self,
        code: ErrorCode,
        message: impl Into<String>,
    ) -> SyntaxError {
        self.error_at(code, message, self.current_span())
    }

    pub(crate) fn error_at(
        &self,
        code: ErrorCode,
        message: impl Into<String>,
        span: Span,
    ) -> SyntaxError {
        // Template name and source line are attached by the compile
        // pipeline, which knows the enclosing template.
        SyntaxError::new("", code, message, span)
    }

    pub(crate) fn eof_error(&self, message: impl Into<String>) -> SyntaxError {
        self.error_at(ErrorCode::UNEXPECTED_EOF, message, self.current_span())
    }
}
