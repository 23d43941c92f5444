//! Shared types for the stencil template compiler.
//!
//! This crate defines the segment and program data model, the expression
//! sublanguage AST, source spans, and error types shared across all
//! compiler stages.

mod error;
mod program;
mod segment;
mod source;
mod span;
pub mod ast;

pub use error::{ErrorCode, SyntaxError};
pub use program::{Op, Program};
pub use segment::{Segment, SegmentKind};
pub use source::TemplateSource;
pub use span::Span;

/// Result type used throughout the stencil compile pipeline.
pub type Result<T> = std::result::Result<T, SyntaxError>;
