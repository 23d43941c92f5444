//! Stencil evaluator.
//!
//! Runs compiled template programs: a tree-walking interpreter for the
//! expression sublanguage plus the append-to-output operation loop. Each
//! render owns a fresh output accumulator and environment, so compiled
//! programs are freely shared.
//!
//! Runtime failures surface as [`RenderError`], attributed to the 1-based
//! template source line that raised them.

mod builtins;
mod env;
mod error;
mod evaluator;
mod value;

pub use env::Environment;
pub use error::{EvalError, EvalResult, RenderError};
pub use evaluator::{Evaluator, NoDispatch, TemplateDispatch, MAX_CALL_DEPTH, STEP_LIMIT};
pub use value::Value;
