//! Stencil: a template-to-program compiler.
//!
//! ```text
//! template text → Scanner → segments → Generator → Program + Listing
//!                                                      │
//!                                      render(args) → Evaluator → String
//! ```
//!
//! A template is literal text interleaved with `$`-directives:
//!
//! - `$$` — a literal dollar sign
//! - `$name` — substitute a parameter, or invoke a fellow set member
//! - `${expr}` — substitute an expression's textual value
//! - `${[elem for x in items]}` — substitute each element in order
//! - `${{ statements }}` — run code; `out.append(...)` contributes text
//! - `$` at end of line — join the next physical line onto this one
//!
//! Compile once with [`CompiledTemplate::compile`] or a
//! [`TemplateSetBuilder`], then render as many times as needed.

mod set;
mod template;

pub use set::{TemplateSet, TemplateSetBuilder};
pub use template::CompiledTemplate;

pub use stencil_codegen::{Listing, SourceMap, SourceMapEntry};
pub use stencil_eval::{EvalError, RenderError, Value};
pub use stencil_types::{ErrorCode, Program, SyntaxError};
