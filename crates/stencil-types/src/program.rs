//! The compiled program: the executable form of a template definition.

use crate::ast::{Block, Expr};

/// One append-to-output operation of a compiled template.
///
/// Each operation keeps the raw snippet text (`src`) alongside its parsed
/// form so the generated source listing can splice the snippet verbatim,
/// and carries the 1-based template line it originated from.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    /// Append a literal text fragment.
    AppendText { text: String, line: u32 },
    /// Evaluate an expression and append the textual form of its result.
    AppendExpr { src: String, expr: Expr, line: u32 },
    /// Evaluate a collection construction and append each element's
    /// textual form, in iteration order.
    AppendEach { src: String, expr: Expr, line: u32 },
    /// Execute embedded statements; they contribute text through the
    /// `out.append(...)` primitive.
    Exec { src: String, body: Block, line: u32 },
    /// Invoke a declared sub-template with the current parameter bindings
    /// and append its rendered text.
    CallTemplate { name: String, line: u32 },
}

impl Op {
    /// The template line this operation originated from.
    pub fn line(&self) -> u32 {
        match self {
            Op::AppendText { line, .. }
            | Op::AppendExpr { line, .. }
            | Op::AppendEach { line, .. }
            | Op::Exec { line, .. }
            | Op::CallTemplate { line, .. } => *line,
        }
    }
}

/// A compiled template definition: declared parameters plus the ordered
/// operations that reconstruct the template text when executed.
///
/// A `Program` is immutable once generated. Each render owns a fresh
/// output accumulator, so one program may be rendered concurrently.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    /// Template name, as registered with the compiler.
    pub name: String,
    /// Declared parameter names, in calling-convention order.
    pub params: Vec<String>,
    /// Operations in template source order.
    pub ops: Vec<Op>,
}

impl Program {
    pub fn new(name: impl Into<String>, params: Vec<String>, ops: Vec<Op>) -> Self {
        Self {
            name: name.into(),
            params,
            ops,
        }
    }
}
