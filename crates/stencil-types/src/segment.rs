//! The segment data model produced by the template scanner.

use serde::{Deserialize, Serialize};

/// Classification of one parsed unit of template content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    /// A run of literal text, `$$` escapes already resolved.
    Literal,
    /// `$name` — shorthand for an expression on a bare identifier.
    Variable,
    /// `${...}` — an expression whose textual result is appended.
    Expression,
    /// `${[...]}` — a collection construction whose elements are each
    /// converted to text and appended in order.
    Comprehension,
    /// `${{...}}` — embedded statements with access to the output
    /// accumulator through `out.append(...)`.
    CodeBlock,
    /// `$name` where `name` resolves to a declared sub-template.
    ///
    /// The scanner never produces this kind — it cannot see the registry.
    /// The code generator reclassifies [`SegmentKind::Variable`] segments
    /// during generation.
    SubtemplateCall,
}

/// One classified unit of template content, in source order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub kind: SegmentKind,
    /// Literal text (escapes resolved) or the raw embedded snippet.
    pub text: String,
    /// 1-based template line on which this segment begins.
    pub source_line: u32,
}

impl Segment {
    pub fn new(kind: SegmentKind, text: impl Into<String>, source_line: u32) -> Self {
        Self {
            kind,
            text: text.into(),
            source_line,
        }
    }
}
