//! A single compiled template.

use std::collections::BTreeSet;

use stencil_codegen::{Generator, Listing, SourceMap};
use stencil_eval::{EvalError, Evaluator, NoDispatch, RenderError, TemplateDispatch, Value};
use stencil_lexer::Scanner;
use stencil_types::{Program, SyntaxError, TemplateSource};

/// A template compiled into its reusable rendered form.
///
/// Compilation happens exactly once, at definition time; the compiled
/// value is immutable and may be rendered any number of times, each
/// render independent of every other.
#[derive(Debug)]
pub struct CompiledTemplate {
    program: Program,
    listing: Listing,
}

impl CompiledTemplate {
    /// Compile a standalone template.
    ///
    /// `params` are the declared parameter names, in calling-convention
    /// order. Fails with a [`SyntaxError`] on malformed directives or
    /// malformed embedded snippets; nothing is deferred to render time.
    pub fn compile(name: &str, params: &[&str], source: &str) -> Result<Self, SyntaxError> {
        Self::compile_in(name, params, source, &BTreeSet::new())
    }

    /// Compile as a member of a template set: `subtemplates` holds every
    /// declared template name, so `$name` shorthands can resolve to
    /// invocations at compile time.
    pub(crate) fn compile_in(
        name: &str,
        params: &[&str],
        source: &str,
        subtemplates: &BTreeSet<String>,
    ) -> Result<Self, SyntaxError> {
        let template = TemplateSource::new(name, source);
        let segments = Scanner::new(&template).scan()?;
        let params: Vec<String> = params.iter().map(|p| p.to_string()).collect();
        let program = Generator::new(&template, &params, subtemplates).generate(name, &segments)?;
        let listing = Listing::render(&program);
        Ok(Self { program, listing })
    }

    /// Render with positional argument values, one per declared parameter.
    pub fn render(&self, args: &[Value]) -> Result<String, RenderError> {
        Evaluator::render(&self.program, args, &NoDispatch, 0)
    }

    /// Render with named argument values. Every declared parameter must be
    /// bound; extra names are rejected.
    pub fn render_named(&self, bindings: &[(&str, Value)]) -> Result<String, RenderError> {
        let args = positional_args(self.name(), self.params(), bindings)?;
        self.render(&args)
    }

    pub(crate) fn render_in(
        &self,
        args: &[Value],
        dispatch: &dyn TemplateDispatch,
        depth: usize,
    ) -> Result<String, RenderError> {
        Evaluator::render(&self.program, args, dispatch, depth)
    }

    pub fn name(&self) -> &str {
        &self.program.name
    }

    pub fn params(&self) -> &[String] {
        &self.program.params
    }

    /// The compiled program.
    pub fn program(&self) -> &Program {
        &self.program
    }

    /// The generated body as line-aligned source text.
    pub fn listing(&self) -> &str {
        self.listing.text()
    }

    /// Generated line → template line mapping for the listing.
    pub fn source_map(&self) -> &SourceMap {
        self.listing.source_map()
    }
}

/// Resolve named bindings into positional argument order.
pub(crate) fn positional_args(
    template: &str,
    params: &[String],
    bindings: &[(&str, Value)],
) -> Result<Vec<Value>, RenderError> {
    for (name, _) in bindings {
        if !params.iter().any(|p| p == name) {
            let err = EvalError::TypeMismatch(format!(
                "template '{template}' has no parameter '{name}'"
            ));
            return Err(RenderError::new(template, 1, err));
        }
    }
    let mut args = Vec::with_capacity(params.len());
    for param in params {
        match bindings.iter().find(|(name, _)| name == param) {
            Some((_, value)) => args.push(value.clone()),
            None => {
                return Err(RenderError::new(
                    template,
                    1,
                    EvalError::UndefinedVariable(param.clone()),
                ))
            }
        }
    }
    Ok(args)
}
