//! The snippet lexer — embedded expression/code text to a token stream.
//!
//! Snippets live inside a template, so the lexer is created with the
//! template line the snippet starts on; every token span then carries
//! absolute template line numbers and runtime errors point at the right
//! template line. Columns are snippet-relative.

use stencil_types::{ErrorCode, Span, SyntaxError};

use crate::token::{Token, TokenKind};

/// The expression sublanguage lexer. Fail-fast: the first malformed
/// lexeme aborts the compile with a [`SyntaxError`].
pub struct Lexer<'src> {
    source: &'src [u8],
    pos: usize,
    /// Current line, absolute within the template.
    line: u32,
    /// Current column, relative to the snippet line start.
    col: u32,
}

impl<'src> Lexer<'src> {
    /// Create a lexer for a snippet beginning on template line `start_line`.
    pub fn new(snippet: &'src str, start_line: u32) -> Self {
        Self {
            source: snippet.as_bytes(),
            pos: 0,
            line: start_line,
            col: 1,
        }
    }

    /// Lex the entire snippet. The stream always ends with [`TokenKind::Eof`].
    pub fn lex(mut self) -> Result<Vec<Token>, SyntaxError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.scan_token()?;
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                return Ok(tokens);
            }
        }
    }

    fn scan_token(&mut self) -> Result<Token, SyntaxError> {
        self.skip_whitespace_and_comments();

        let start_line = self.line;
        let start_col = self.col;
        let ch = match self.advance() {
            Some(ch) => ch,
            None => return Ok(Token::new(TokenKind::Eof, self.current_span())),
        };

        let token = match ch {
            b'\n' => Token::new(TokenKind::Newline, self.span_from(start_line, start_col)),

            b'"' => self.scan_string(start_line, start_col)?,
            b'0'..=b'9' => self.scan_number(start_line, start_col),
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.scan_identifier(start_line, start_col),

            b'+' => self.simple(TokenKind::Plus, start_line, start_col),
            b'-' => self.simple(TokenKind::Minus, start_line, start_col),
            b'*' => self.simple(TokenKind::Star, start_line, start_col),
            b'/' => self.simple(TokenKind::Slash, start_line, start_col),
            b'%' => self.simple(TokenKind::Percent, start_line, start_col),
            b'(' => self.simple(TokenKind::LParen, start_line, start_col),
            b')' => self.simple(TokenKind::RParen, start_line, start_col),
            b'[' => self.simple(TokenKind::LBracket, start_line, start_col),
            b']' => self.simple(TokenKind::RBracket, start_line, start_col),
            b'{' => self.simple(TokenKind::LBrace, start_line, start_col),
            b'}' => self.simple(TokenKind::RBrace, start_line, start_col),
            b',' => self.simple(TokenKind::Comma, start_line, start_col),
            b'.' => self.simple(TokenKind::Dot, start_line, start_col),
            b';' => self.simple(TokenKind::Semicolon, start_line, start_col),

            b'=' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    self.simple(TokenKind::EqEq, start_line, start_col)
                } else {
                    self.simple(TokenKind::Eq, start_line, start_col)
                }
            }
            b'!' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    self.simple(TokenKind::BangEq, start_line, start_col)
                } else {
                    return Err(self.error(
                        ErrorCode::UNEXPECTED_TOKEN,
                        "unexpected '!' (use 'not' for negation, '!=' for inequality)",
                        self.span_from(start_line, start_col),
                    ));
                }
            }
            b'<' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    self.simple(TokenKind::LessEq, start_line, start_col)
                } else {
                    self.simple(TokenKind::Less, start_line, start_col)
                }
            }
            b'>' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    self.simple(TokenKind::GreaterEq, start_line, start_col)
                } else {
                    self.simple(TokenKind::Greater, start_line, start_col)
                }
            }

            _ => {
                return Err(self.error(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("unexpected character '{}'", ch as char),
                    self.span_from(start_line, start_col),
                ));
            }
        };
        Ok(token)
    }

    fn simple(&self, kind: TokenKind, start_line: u32, start_col: u32) -> Token {
        Token::new(kind, self.span_from(start_line, start_col))
    }

    // ─────────────────────────────────────────────────────────────
    // Lexeme scanners
    // ─────────────────────────────────────────────────────────────

    fn scan_string(&mut self, start_line: u32, start_col: u32) -> Result<Token, SyntaxError> {
        let mut buf = String::new();
        loop {
            match self.advance() {
                None => {
                    return Err(self.error(
                        ErrorCode::UNEXPECTED_EOF,
                        "unterminated string literal",
                        self.span_from(start_line, start_col),
                    ));
                }
                Some(b'"') => {
                    return Ok(Token::new(
                        TokenKind::StringLit(buf),
                        self.span_from(start_line, start_col),
                    ));
                }
                Some(b'\\') => match self.advance() {
                    Some(b'"') => buf.push('"'),
                    Some(b'\\') => buf.push('\\'),
                    Some(b'n') => buf.push('\n'),
                    Some(b't') => buf.push('\t'),
                    Some(b'r') => buf.push('\r'),
                    Some(other) => {
                        return Err(self.error(
                            ErrorCode::INVALID_ESCAPE,
                            format!("invalid escape sequence '\\{}'", other as char),
                            Span::point(self.line, self.col.saturating_sub(2)),
                        ));
                    }
                    None => {
                        return Err(self.error(
                            ErrorCode::UNEXPECTED_EOF,
                            "unterminated string literal",
                            self.span_from(start_line, start_col),
                        ));
                    }
                },
                Some(ch) => {
                    // Re-read multi-byte characters from the source.
                    if ch < 0x80 {
                        buf.push(ch as char);
                    } else {
                        let start = self.pos - 1;
                        let text = std::str::from_utf8(&self.source[start..]).unwrap_or("");
                        if let Some(c) = text.chars().next() {
                            buf.push(c);
                            self.pos = start + c.len_utf8();
                        }
                    }
                }
            }
        }
    }

    fn scan_number(&mut self, start_line: u32, start_col: u32) -> Token {
        let start = self.pos - 1;
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.advance();
        }
        if self.peek() == Some(b'.') && matches!(self.peek_at(1), Some(b'0'..=b'9')) {
            self.advance();
            while matches!(self.peek(), Some(b'0'..=b'9')) {
                self.advance();
            }
        }
        let text = std::str::from_utf8(&self.source[start..self.pos]).unwrap_or("0");
        let value: f64 = text.parse().unwrap_or(0.0);
        Token::new(
            TokenKind::NumberLit(value),
            self.span_from(start_line, start_col),
        )
    }

    fn scan_identifier(&mut self, start_line: u32, start_col: u32) -> Token {
        let start = self.pos - 1;
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == b'_' {
                self.advance();
            } else {
                break;
            }
        }
        let text = std::str::from_utf8(&self.source[start..self.pos]).unwrap_or("");
        let kind = TokenKind::from_keyword(text)
            .unwrap_or_else(|| TokenKind::Identifier(text.to_string()));
        Token::new(kind, self.span_from(start_line, start_col))
    }

    // ─────────────────────────────────────────────────────────────
    // Character-level helpers
    // ─────────────────────────────────────────────────────────────

    /// Skip spaces, tabs, carriage returns and `//` comments.
    /// Newlines are tokens, not whitespace.
    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(b' ') | Some(b'\t') | Some(b'\r') => {
                    self.advance();
                }
                Some(b'/') if self.peek_at(1) == Some(b'/') => {
                    while let Some(c) = self.peek() {
                        if c == b'\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                _ => return,
            }
        }
    }

    fn peek(&self) -> Option<u8> {
        self.source.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.source.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let ch = self.source.get(self.pos).copied()?;
        self.pos += 1;
        if ch == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn current_span(&self) -> Span {
        Span::point(self.line, self.col)
    }

    fn span_from(&self, start_line: u32, start_col: u32) -> Span {
        Span::new(
            start_line,
            start_col,
            self.line,
            self.col.saturating_sub(1).max(1),
        )
    }

    fn error(&self, code: ErrorCode, message: impl Into<String>, span: Span) -> SyntaxError {
        // The template name and raw source line are attached by the
        // compile pipeline, which knows the enclosing template.
        SyntaxError::new("", code, message, span)
    }
}
