//! Runtime error types for the stencil evaluator.

use crate::value::Value;
use thiserror::Error;

/// Evaluation error, before line attribution.
///
/// `Return` is not an error: it is the internal control-flow signal for a
/// `return` statement unwinding out of a code block. The program runner
/// converts it into the render result; it never escapes the crate as a
/// failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("undefined variable: {0}")]
    UndefinedVariable(String),
    #[error("unknown function: {0}")]
    UnknownFunction(String),
    #[error("type mismatch: {0}")]
    TypeMismatch(String),
    #[error("arithmetic trap: {0}")]
    ArithmeticTrap(String),
    #[error("index out of bounds: {0}")]
    IndexOutOfBounds(String),
    #[error("undefined template: {0}")]
    UndefinedTemplate(String),
    #[error("evaluation step limit exceeded")]
    StepLimitExceeded,
    #[error("template call depth limit exceeded")]
    CallDepthExceeded,
    /// `return` control flow (internal).
    #[error("return")]
    Return(Value),
    /// A failure from a nested template invocation, already attributed to
    /// its own template and line; propagated to the caller unchanged.
    #[error("{0}")]
    Nested(Box<RenderError>),
}

/// Result alias for evaluator operations.
pub type EvalResult<T> = Result<T, EvalError>;

/// A runtime failure attributed to a template source line.
///
/// The line is the 1-based line of the original template text where the
/// failing expression or statement was written, never a position in the
/// generated body.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{template}:{line}: {error}")]
pub struct RenderError {
    /// Name of the template whose render failed.
    pub template: String,
    /// 1-based template source line.
    pub line: u32,
    #[source]
    pub error: EvalError,
}

impl RenderError {
    pub fn new(template: impl Into<String>, line: u32, error: EvalError) -> Self {
        Self {
            template: template.into(),
            line,
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_error_displays_template_and_line() {
        let err = RenderError::new(
            "greeting",
            7,
            EvalError::UndefinedVariable("name".to_string()),
        );
        assert_eq!(err.to_string(), "greeting:7: undefined variable: name");
    }

    #[test]
    fn nested_error_displays_the_inner_attribution() {
        let inner = RenderError::new("row", 2, EvalError::TypeMismatch("x".to_string()));
        let outer = EvalError::Nested(Box::new(inner));
        assert_eq!(outer.to_string(), "row:2: type mismatch: x");
    }
}
