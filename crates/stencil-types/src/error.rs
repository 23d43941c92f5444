use crate::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric error code for compile-time failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ErrorCode(pub u16);

impl ErrorCode {
    // ── Template scanning (E100–E109) ──
    pub const UNESCAPED_DOLLAR: Self = Self(100);
    pub const UNCLOSED_EXPRESSION: Self = Self(101);
    pub const UNCLOSED_COMPREHENSION: Self = Self(102);
    pub const UNCLOSED_CODE_BLOCK: Self = Self(103);
    pub const DANGLING_CONTINUATION: Self = Self(104);

    // ── Snippet parsing (E110–E119) ──
    pub const UNEXPECTED_TOKEN: Self = Self(110);
    pub const UNEXPECTED_EOF: Self = Self(111);
    pub const INVALID_ESCAPE: Self = Self(112);

    // ── Template set construction (E120–E129) ──
    pub const DUPLICATE_TEMPLATE: Self = Self(120);
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

/// A compile-time template error.
///
/// Raised at definition time, never at render time: an unescaped `$`, an
/// unclosed directive, a dangling continuation at end of input, or a
/// malformed embedded snippet. The span's line numbers refer to the
/// original template text, and `source_line` carries the offending raw
/// line for context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntaxError {
    /// Template name.
    pub template: String,
    /// Error code (e.g. E101).
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
    /// Location in the template.
    pub span: Span,
    /// The raw template line at `span.line`, for context.
    pub source_line: String,
}

impl SyntaxError {
    /// Create a new error. The source line can be attached later with
    /// [`SyntaxError::with_source_line`] once the template text is at hand.
    pub fn new(
        template: impl Into<String>,
        code: ErrorCode,
        message: impl Into<String>,
        span: Span,
    ) -> Self {
        Self {
            template: template.into(),
            code,
            message: message.into(),
            span,
            source_line: String::new(),
        }
    }

    /// Attach the offending raw source line.
    pub fn with_source_line(mut self, source_line: impl Into<String>) -> Self {
        self.source_line = source_line.into();
        self
    }

    /// Attach the template name (snippet lexing/parsing does not know it).
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    /// The 1-based template line the error points at.
    pub fn line(&self) -> u32 {
        self.span.line
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {} {}",
            self.template, self.span, self.code, self.message
        )
    }
}

impl std::error::Error for SyntaxError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_display() {
        assert_eq!(format!("{}", ErrorCode::UNESCAPED_DOLLAR), "E100");
        assert_eq!(format!("{}", ErrorCode::UNCLOSED_CODE_BLOCK), "E103");
    }

    #[test]
    fn syntax_error_display() {
        let err = SyntaxError::new(
            "greeting",
            ErrorCode::UNESCAPED_DOLLAR,
            "unescaped '$'",
            Span::point(3, 7),
        );
        assert_eq!(format!("{err}"), "greeting:3:7: E100 unescaped '$'");
        assert_eq!(err.line(), 3);
    }

    #[test]
    fn syntax_error_json_round_trip() {
        let err = SyntaxError::new(
            "t",
            ErrorCode::UNCLOSED_EXPRESSION,
            "'${' is never closed",
            Span::point(2, 1),
        )
        .with_source_line("  ${broken");

        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("\"message\""));
        assert!(json.contains("\"source_line\""));

        let back: SyntaxError = serde_json::from_str(&json).unwrap();
        assert_eq!(back.code, err.code);
        assert_eq!(back.span, err.span);
        assert_eq!(back.source_line, "  ${broken");
    }
}
