//! Stencil code generator.
//!
//! Consumes the scanner's segment list and produces the two forms of the
//! generated body:
//!
//! - [`Generator`] builds the executable [`stencil_types::Program`] —
//!   embedded snippets parsed, variable shorthands resolved against the
//!   declared sub-template names.
//! - [`Listing`] renders the program as line-aligned source text with a
//!   [`SourceMap`]: each operation lands on a generated line no earlier
//!   than its template line, so generated positions map back to template
//!   positions exactly.

mod generator;
mod listing;

pub use generator::Generator;
pub use listing::{Listing, SourceMap, SourceMapEntry};
