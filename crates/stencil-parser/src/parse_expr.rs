//! Expression parsing with full operator precedence.
//!
//! Precedence (lowest → highest):
//! 6. `or`
//! 5. `and`
//! 4. `==`, `!=`, `<`, `>`, `<=`, `>=` (no chaining)
//! 3. `+`, `-`
//! 2. `*`, `/`, `%`
//! 1. unary `-`, `not`
//! 0. postfix: `(args)` call, `[i]` index, `.name(args)` method call

use stencil_lexer::token::TokenKind;
use stencil_types::ast::*;
use stencil_types::{ErrorCode, SyntaxError};

use crate::parser::Parser;

impl Parser {
    /// Parse an expression.
    pub(crate) fn parse_expression(&mut self) -> Result<Expr, SyntaxError> {
        self.parse_or()
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Precedence chain
    // ══════════════════════════════════════════════════════════════════════════

    /// `OrExpr = AndExpr { "or" AndExpr }`
    fn parse_or(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_and()?;
        while self.eat(&TokenKind::Or) {
            let right = self.parse_and()?;
            let span = left.span.merge(right.span);
            left = Expr::new(
                ExprKind::Binary {
                    left: Box::new(left),
                    op: BinOp::Or,
                    right: Box::new(right),
                },
                span,
            );
        }
        Ok(left)
    }

    /// `AndExpr = CompExpr { "and" CompExpr }`
    fn parse_and(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_comparison()?;
        while self.eat(&TokenKind::And) {
            let right = self.parse_comparison()?;
            let span = left.span.merge(right.span);
            left = Expr::new(
                ExprKind::Binary {
                    left: Box::new(left),
                    op: BinOp::And,
                    right: Box::new(right),
                },
                span,
            );
        }
        Ok(left)
    }

    /// `CompExpr = AddExpr [ CompOp AddExpr ]`
    ///
    /// Comparison operators do NOT chain: `a < b < c` is a parse error.
    fn parse_comparison(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_add()?;
        if let Some(op) = self.match_comparison_op() {
            self.advance();
            let right = self.parse_add()?;
            let span = left.span.merge(right.span);
            left = Expr::new(
                ExprKind::Binary {
                    left: Box::new(left),
                    op,
                    right: Box::new(right),
                },
                span,
            );
            if self.match_comparison_op().is_some() {
                return Err(self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    "comparison operators cannot be chained; use 'and' to combine",
                ));
            }
        }
        Ok(left)
    }

    fn match_comparison_op(&self) -> Option<BinOp> {
        match self.peek_kind() {
            TokenKind::EqEq => Some(BinOp::Eq),
            TokenKind::BangEq => Some(BinOp::NotEq),
            TokenKind::Less => Some(BinOp::Less),
            TokenKind::LessEq => Some(BinOp::LessEq),
            TokenKind::Greater => Some(BinOp::Greater),
            TokenKind::GreaterEq => Some(BinOp::GreaterEq),
            _ => None,
        }
    }

    /// `AddExpr = MulExpr { ("+" | "-") MulExpr }`
    fn parse_add(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_mul()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_mul()?;
            let span = left.span.merge(right.span);
            left = Expr::new(
                ExprKind::Binary {
                    left: Box::new(left),
                    op,
                    right: Box::new(right),
                },
                span,
            );
        }
        Ok(left)
    }

    /// `MulExpr = UnaryExpr { ("*" | "/" | "%") UnaryExpr }`
    fn parse_mul(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                TokenKind::Percent => BinOp::Mod,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            let span = left.span.merge(right.span);
            left = Expr::new(
                ExprKind::Binary {
                    left: Box::new(left),
                    op,
                    right: Box::new(right),
                },
                span,
            );
        }
        Ok(left)
    }

    /// `UnaryExpr = [ "not" | "-" ] PostfixExpr`
    fn parse_unary(&mut self) -> Result<Expr, SyntaxError> {
        let start = self.current_span();
        let op = match self.peek_kind() {
            TokenKind::Not => {
                self.advance();
                Some(UnaryOp::Not)
            }
            TokenKind::Minus => {
                self.advance();
                Some(UnaryOp::Neg)
            }
            _ => None,
        };
        let operand = self.parse_postfix()?;
        match op {
            Some(op) => {
                let span = start.merge(operand.span);
                Ok(Expr::new(
                    ExprKind::Unary {
                        op,
                        operand: Box::new(operand),
                    },
                    span,
                ))
            }
            None => Ok(operand),
        }
    }

    /// `PostfixExpr = PrimaryExpr { "[" Expr "]" | "." Identifier "(" ArgList ")" }`
    fn parse_postfix(&mut self) -> Result<Expr, SyntaxError> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.peek_kind() {
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.parse_expression()?;
                    self.expect(&TokenKind::RBracket)?;
                    let span = expr.span.merge(self.previous_span());
                    expr = Expr::new(
                        ExprKind::Index {
                            object: Box::new(expr),
                            index: Box::new(index),
                        },
                        span,
                    );
                }
                TokenKind::Dot => {
                    self.advance();
                    let method = self.expect_identifier()?;
                    self.expect(&TokenKind::LParen)?;
                    let args = self.parse_arg_list()?;
                    self.expect(&TokenKind::RParen)?;
                    let span = expr.span.merge(self.previous_span());
                    expr = Expr::new(
                        ExprKind::MethodCall {
                            object: Box::new(expr),
                            method,
                            args,
                        },
                        span,
                    );
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Primary expressions
    // ══════════════════════════════════════════════════════════════════════════

    fn parse_primary(&mut self) -> Result<Expr, SyntaxError> {
        let span = self.current_span();
        match self.peek_kind().clone() {
            TokenKind::NumberLit(n) => {
                self.advance();
                Ok(Expr::new(ExprKind::NumberLit(n), span))
            }
            TokenKind::StringLit(s) => {
                self.advance();
                Ok(Expr::new(ExprKind::StringLit(s), span))
            }
            TokenKind::True => {
                self.advance();
                Ok(Expr::new(ExprKind::BoolLit(true), span))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr::new(ExprKind::BoolLit(false), span))
            }
            TokenKind::Nil => {
                self.advance();
                Ok(Expr::new(ExprKind::NilLit, span))
            }
            TokenKind::Identifier(name) => {
                self.advance();
                if self.check(&TokenKind::LParen) {
                    self.advance();
                    let args = self.parse_arg_list()?;
                    self.expect(&TokenKind::RParen)?;
                    let full = span.merge(self.previous_span());
                    Ok(Expr::new(
                        ExprKind::Call {
                            name: Ident::new(name, span),
                            args,
                        },
                        full,
                    ))
                } else {
                    Ok(Expr::new(ExprKind::Identifier(name), span))
                }
            }
            TokenKind::LBracket => {
                self.advance();
                let body = self.parse_collection_body()?;
                self.expect(&TokenKind::RBracket)?;
                // Widen to include the brackets.
                let full = span.merge(self.previous_span());
                Ok(Expr::new(body.kind, full))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect(&TokenKind::RParen)?;
                let full = span.merge(self.previous_span());
                Ok(Expr::new(ExprKind::Paren(Box::new(inner)), full))
            }
            TokenKind::Eof => Err(self.eof_error("expected expression, got end of snippet")),
            other => Err(self.error_at_current(
                ErrorCode::UNEXPECTED_TOKEN,
                format!("expected expression, got '{other}'"),
            )),
        }
    }

    /// The body of a collection construction, without brackets: either a
    /// comprehension `elem for x in items [if cond]` or a plain element
    /// list `a, b, c`. An empty body is an empty list.
    pub(crate) fn parse_collection_body(&mut self) -> Result<Expr, SyntaxError> {
        let start = self.current_span();
        self.skip_separators();
        if self.check(&TokenKind::RBracket) || self.at_end() {
            return Ok(Expr::new(ExprKind::ListLit(Vec::new()), start));
        }

        let first = self.parse_expression()?;

        if self.eat(&TokenKind::For) {
            let var = self.expect_identifier()?;
            self.expect(&TokenKind::In)?;
            let iterable = self.parse_expression()?;
            let filter = if self.eat(&TokenKind::If) {
                Some(Box::new(self.parse_expression()?))
            } else {
                None
            };
            let span = first.span.merge(self.previous_span());
            return Ok(Expr::new(
                ExprKind::Comprehension {
                    element: Box::new(first),
                    var,
                    iterable: Box::new(iterable),
                    filter,
                },
                span,
            ));
        }

        let mut elements = vec![first];
        while self.eat(&TokenKind::Comma) {
            self.skip_separators();
            if self.check(&TokenKind::RBracket) || self.at_end() {
                break; // trailing comma
            }
            elements.push(self.parse_expression()?);
        }
        let span = start.merge(self.previous_span());
        Ok(Expr::new(ExprKind::ListLit(elements), span))
    }

    /// Comma-separated argument list (possibly empty); caller handles parens.
    pub(crate) fn parse_arg_list(&mut self) -> Result<Vec<Expr>, SyntaxError> {
        let mut args = Vec::new();
        if self.check(&TokenKind::RParen) {
            return Ok(args);
        }
        args.push(self.parse_expression()?);
        while self.eat(&TokenKind::Comma) {
            if self.check(&TokenKind::RParen) {
                break; // trailing comma
            }
            args.push(self.parse_expression()?);
        }
        Ok(args)
    }
}
