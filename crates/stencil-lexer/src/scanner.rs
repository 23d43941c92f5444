//! The template scanner — raw template text to an ordered segment list.
//!
//! A single left-to-right pass over the margin-stripped text. At each `$`
//! the most specific opening form wins:
//! `${{` > `${[` > `${` > `$identifier` > `$punct` > `$$`, and any `$`
//! matching none of them is a compile-time error. Everything between
//! directives accumulates into literal segments.

use stencil_types::{ErrorCode, Segment, SegmentKind, Span, SyntaxError, TemplateSource};

/// Punctuation that may follow a bare `$` without doubling it: the
/// directive is not taken and the text passes through literally. The set
/// is a backward-compatibility list, kept verbatim.
const PASSTHROUGH: &[u8] = b".(/'\"";

/// The template scanner.
pub struct Scanner<'src> {
    /// Margin-stripped template text.
    text: &'src str,
    /// For error context (raw lines, template name).
    template: &'src TemplateSource,
    /// Byte offset into `text`.
    pos: usize,
    /// Current 1-based line.
    line: u32,
    /// Current 1-based column.
    col: u32,
}

impl<'src> Scanner<'src> {
    /// Create a scanner over a prepared template source.
    pub fn new(template: &'src TemplateSource) -> Self {
        Self {
            text: template.text(),
            template,
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    /// Scan the whole template into segments.
    ///
    /// Fails with the first syntax error: an unescaped `$`, an unclosed
    /// directive, or a dangling `$` at end of input.
    pub fn scan(mut self) -> Result<Vec<Segment>, SyntaxError> {
        let mut segments = Vec::new();
        // Current literal run and the line it began on.
        let mut literal = String::new();
        let mut literal_line = 1u32;

        while let Some(ch) = self.peek() {
            if ch != b'$' {
                if literal.is_empty() {
                    literal_line = self.line;
                }
                self.consume_char_into(&mut literal);
                continue;
            }

            let directive_span = Span::point(self.line, self.col);
            match self.peek_at(1) {
                // `$$` — escape for a single `$`.
                Some(b'$') => {
                    if literal.is_empty() {
                        literal_line = self.line;
                    }
                    literal.push('$');
                    self.advance();
                    self.advance();
                }

                // `$.` `$(` `$/` `$'` `$"` — pass through unescaped.
                Some(p) if PASSTHROUGH.contains(&p) => {
                    if literal.is_empty() {
                        literal_line = self.line;
                    }
                    literal.push('$');
                    literal.push(p as char);
                    self.advance();
                    self.advance();
                }

                // `${`-family directives.
                Some(b'{') => {
                    self.flush_literal(&mut segments, &mut literal, literal_line);
                    let segment = match self.peek_at(2) {
                        Some(b'{') => self.scan_code_block(directive_span)?,
                        Some(b'[') => self.scan_comprehension(directive_span)?,
                        _ => self.scan_expression(directive_span)?,
                    };
                    segments.push(segment);
                }

                // `$identifier` — variable shorthand.
                Some(c) if c.is_ascii_alphabetic() || c == b'_' => {
                    self.flush_literal(&mut segments, &mut literal, literal_line);
                    segments.push(self.scan_variable(directive_span));
                }

                // `$` + whitespace — a line continuation if a newline
                // follows before any other character.
                Some(b' ') | Some(b'\t') | Some(b'\r') | Some(b'\n') => {
                    self.scan_continuation(directive_span)?;
                }

                None => {
                    return Err(self.error(
                        ErrorCode::DANGLING_CONTINUATION,
                        "dangling '$' at end of input",
                        directive_span,
                    ));
                }

                _ => {
                    return Err(self.error(
                        ErrorCode::UNESCAPED_DOLLAR,
                        "unescaped '$' (write '$$' for a literal dollar sign)",
                        directive_span,
                    ));
                }
            }
        }

        self.flush_literal(&mut segments, &mut literal, literal_line);
        Ok(segments)
    }

    // ─────────────────────────────────────────────────────────────
    // Directive forms
    // ─────────────────────────────────────────────────────────────

    /// `${ ... }` — content runs to the first `}`.
    fn scan_expression(&mut self, start: Span) -> Result<Segment, SyntaxError> {
        self.advance(); // `$`
        self.advance(); // `{`
        let mut content = String::new();
        loop {
            match self.peek() {
                None => {
                    return Err(self.error(
                        ErrorCode::UNCLOSED_EXPRESSION,
                        "'${' is never closed",
                        start,
                    ));
                }
                Some(b'}') => {
                    self.advance();
                    return Ok(Segment::new(SegmentKind::Expression, content, start.line));
                }
                Some(_) => self.consume_char_into(&mut content),
            }
        }
    }

    /// `${[ ... ]}` — content runs to the first `]}`.
    fn scan_comprehension(&mut self, start: Span) -> Result<Segment, SyntaxError> {
        self.advance(); // `$`
        self.advance(); // `{`
        self.advance(); // `[`
        let mut content = String::new();
        loop {
            match self.peek() {
                None => {
                    return Err(self.error(
                        ErrorCode::UNCLOSED_COMPREHENSION,
                        "'${[' is never closed",
                        start,
                    ));
                }
                Some(b']') if self.peek_at(1) == Some(b'}') => {
                    self.advance();
                    self.advance();
                    return Ok(Segment::new(
                        SegmentKind::Comprehension,
                        content,
                        start.line,
                    ));
                }
                Some(_) => self.consume_char_into(&mut content),
            }
        }
    }

    /// `${{ ... }}` — brace depth is tracked so nested `{`/`}` pairs inside
    /// the block do not terminate it early. A single trailing newline after
    /// the closing `}}` (with optional horizontal whitespace before it) is
    /// swallowed so the block can sit on its own line.
    fn scan_code_block(&mut self, start: Span) -> Result<Segment, SyntaxError> {
        self.advance(); // `$`
        self.advance(); // `{`
        self.advance(); // `{`
        let mut content = String::new();
        let mut depth = 0u32;
        loop {
            match self.peek() {
                None => {
                    return Err(self.error(
                        ErrorCode::UNCLOSED_CODE_BLOCK,
                        "'${{' is never closed",
                        start,
                    ));
                }
                Some(b'{') => {
                    depth += 1;
                    self.consume_char_into(&mut content);
                }
                Some(b'}') => {
                    if depth > 0 {
                        depth -= 1;
                        self.consume_char_into(&mut content);
                    } else if self.peek_at(1) == Some(b'}') {
                        self.advance();
                        self.advance();
                        break;
                    } else {
                        // A lone `}` at depth zero stays in the block.
                        self.consume_char_into(&mut content);
                    }
                }
                Some(_) => self.consume_char_into(&mut content),
            }
        }
        self.swallow_trailing_newline();
        Ok(Segment::new(SegmentKind::CodeBlock, content, start.line))
    }

    /// `$identifier`.
    fn scan_variable(&mut self, start: Span) -> Segment {
        self.advance(); // `$`
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == b'_' {
                name.push(c as char);
                self.advance();
            } else {
                break;
            }
        }
        Segment::new(SegmentKind::Variable, name, start.line)
    }

    /// `$` + horizontal whitespace + newline: consumed without output, so
    /// the next physical line continues the current logical line.
    fn scan_continuation(&mut self, start: Span) -> Result<(), SyntaxError> {
        self.advance(); // `$`
        while matches!(self.peek(), Some(b' ') | Some(b'\t') | Some(b'\r')) {
            self.advance();
        }
        match self.peek() {
            Some(b'\n') => {
                self.advance();
                Ok(())
            }
            None => Err(self.error(
                ErrorCode::DANGLING_CONTINUATION,
                "dangling '$' continuation at end of input",
                start,
            )),
            Some(_) => Err(self.error(
                ErrorCode::UNESCAPED_DOLLAR,
                "unescaped '$' (write '$$' for a literal dollar sign)",
                start,
            )),
        }
    }

    /// After `}}`: consume `[ \t\r]*\n` if wholly present, else nothing.
    fn swallow_trailing_newline(&mut self) {
        let saved = (self.pos, self.line, self.col);
        while matches!(self.peek(), Some(b' ') | Some(b'\t') | Some(b'\r')) {
            self.advance();
        }
        if self.peek() == Some(b'\n') {
            self.advance();
        } else {
            (self.pos, self.line, self.col) = saved;
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Character-level helpers
    // ─────────────────────────────────────────────────────────────

    fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.text.as_bytes().get(self.pos + offset).copied()
    }

    /// Advance past one byte (only ever called on ASCII positions).
    fn advance(&mut self) {
        if let Some(b) = self.peek() {
            self.pos += 1;
            if b == b'\n' {
                self.line += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
        }
    }

    /// Consume one full character (possibly multi-byte) into `buf`.
    fn consume_char_into(&mut self, buf: &mut String) {
        if let Some(ch) = self.text[self.pos..].chars().next() {
            buf.push(ch);
            self.pos += ch.len_utf8();
            if ch == '\n' {
                self.line += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
        }
    }

    fn flush_literal(&self, segments: &mut Vec<Segment>, literal: &mut String, line: u32) {
        if !literal.is_empty() {
            segments.push(Segment::new(
                SegmentKind::Literal,
                std::mem::take(literal),
                line,
            ));
        }
    }

    fn error(&self, code: ErrorCode, message: impl Into<String>, span: Span) -> SyntaxError {
        let source_line = self.template.line(span.line).unwrap_or("").to_string();
        SyntaxError::new(&self.template.name, code, message, span)
            .with_source_line(source_line)
    }
}
