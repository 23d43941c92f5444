//! Statement parsing for `${{...}}` code blocks.
//!
//! Statements are newline-separated; semicolons allow several statements
//! on one line, which matters for blocks written inline in a template.

use stencil_lexer::token::TokenKind;
use stencil_types::ast::*;
use stencil_types::{ErrorCode, SyntaxError};

use crate::parser::Parser;

impl Parser {
    /// Parse statements until `}` (inside braces) or end of snippet.
    pub(crate) fn parse_stmt_sequence(
        &mut self,
        in_braces: bool,
    ) -> Result<Vec<Stmt>, SyntaxError> {
        let mut stmts = Vec::new();
        self.skip_separators();
        loop {
            if self.at_end() || (in_braces && self.check(&TokenKind::RBrace)) {
                return Ok(stmts);
            }
            stmts.push(self.parse_stmt()?);
            if !self.at_stmt_boundary() {
                return Err(self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expected newline or ';', got '{}'", self.peek_kind()),
                ));
            }
            self.skip_separators();
        }
    }

    fn parse_stmt(&mut self) -> Result<Stmt, SyntaxError> {
        match self.peek_kind() {
            TokenKind::Let => self.parse_let(),
            TokenKind::Set => self.parse_set(),
            TokenKind::If => Ok(Stmt::If(self.parse_if()?)),
            TokenKind::For => self.parse_for(),
            TokenKind::Return => self.parse_return(),
            _ => {
                let expr = self.parse_expression()?;
                Ok(Stmt::Expr(ExprStmt { expr }))
            }
        }
    }

    /// `let name = expr`
    fn parse_let(&mut self) -> Result<Stmt, SyntaxError> {
        let start = self.current_span();
        self.advance(); // `let`
        let name = self.expect_identifier()?;
        self.expect(&TokenKind::Eq)?;
        let value = self.parse_expression()?;
        let span = start.merge(value.span);
        Ok(Stmt::Let(LetStmt { name, value, span }))
    }

    /// `set name = expr`
    fn parse_set(&mut self) -> Result<Stmt, SyntaxError> {
        let start = self.current_span();
        self.advance(); // `set`
        let name = self.expect_identifier()?;
        self.expect(&TokenKind::Eq)?;
        let value = self.parse_expression()?;
        let span = start.merge(value.span);
        Ok(Stmt::Set(SetStmt { name, value, span }))
    }

    /// `if cond { ... } [else if cond { ... }] [else { ... }]`
    fn parse_if(&mut self) -> Result<IfStmt, SyntaxError> {
        let start = self.current_span();
        self.advance(); // `if`
        let condition = self.parse_expression()?;
        let then_block = self.parse_braced_block()?;
        let else_branch = if self.eat(&TokenKind::Else) {
            if self.check(&TokenKind::If) {
                Some(ElseBranch::ElseIf(Box::new(self.parse_if()?)))
            } else {
                Some(ElseBranch::Block(self.parse_braced_block()?))
            }
        } else {
            None
        };
        let span = start.merge(self.previous_span());
        Ok(IfStmt {
            condition,
            then_block,
            else_branch,
            span,
        })
    }

    /// `for item in expr { ... }`
    fn parse_for(&mut self) -> Result<Stmt, SyntaxError> {
        let start = self.current_span();
        self.advance(); // `for`
        let item = self.expect_identifier()?;
        self.expect(&TokenKind::In)?;
        let iterable = self.parse_expression()?;
        let body = self.parse_braced_block()?;
        let span = start.merge(self.previous_span());
        Ok(Stmt::For(ForStmt {
            item,
            iterable,
            body,
            span,
        }))
    }

    /// `return [expr]`
    fn parse_return(&mut self) -> Result<Stmt, SyntaxError> {
        let start = self.current_span();
        self.advance(); // `return`
        let value = if self.at_stmt_boundary() {
            None
        } else {
            Some(self.parse_expression()?)
        };
        let span = start.merge(self.previous_span());
        Ok(Stmt::Return(ReturnStmt { value, span }))
    }

    /// `{ stmts }`
    fn parse_braced_block(&mut self) -> Result<Block, SyntaxError> {
        let start = self.current_span();
        self.expect(&TokenKind::LBrace)?;
        let stmts = self.parse_stmt_sequence(/*in_braces=*/ true)?;
        self.expect(&TokenKind::RBrace)?;
        let span = start.merge(self.previous_span());
        Ok(Block { stmts, span })
    }
}
