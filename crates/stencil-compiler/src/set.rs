//! Template sets: a registry of templates that can invoke one another.

use std::collections::{BTreeMap, BTreeSet};

use stencil_eval::{EvalError, RenderError, TemplateDispatch, Value};
use stencil_types::{ErrorCode, Span, SyntaxError};

use crate::template::{positional_args, CompiledTemplate};

/// Builder collecting template definitions before compilation.
///
/// All names are registered before any template compiles, so a template
/// may invoke one declared after it, or itself.
#[derive(Default)]
pub struct TemplateSetBuilder {
    defs: Vec<TemplateDef>,
}

struct TemplateDef {
    name: String,
    params: Vec<String>,
    source: String,
}

impl TemplateSetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a template. Compilation is deferred to [`build`].
    ///
    /// [`build`]: TemplateSetBuilder::build
    pub fn add(mut self, name: &str, params: &[&str], source: &str) -> Self {
        self.defs.push(TemplateDef {
            name: name.to_string(),
            params: params.iter().map(|p| p.to_string()).collect(),
            source: source.to_string(),
        });
        self
    }

    /// Compile every declared template against the full name set.
    pub fn build(self) -> Result<TemplateSet, SyntaxError> {
        let mut names = BTreeSet::new();
        for def in &self.defs {
            if !names.insert(def.name.clone()) {
                return Err(SyntaxError::new(
                    &def.name,
                    ErrorCode::DUPLICATE_TEMPLATE,
                    format!("template '{}' is declared twice", def.name),
                    Span::point(1, 1),
                ));
            }
        }

        let mut templates = BTreeMap::new();
        for def in &self.defs {
            let params: Vec<&str> = def.params.iter().map(String::as_str).collect();
            let compiled =
                CompiledTemplate::compile_in(&def.name, &params, &def.source, &names)?;
            templates.insert(def.name.clone(), compiled);
        }
        Ok(TemplateSet { templates })
    }
}

/// An immutable set of compiled templates.
///
/// A `$name` shorthand in any member whose name matches another member
/// (and is not shadowed by a declared parameter) invokes that member with
/// the enclosing render's current bindings for the callee's parameters.
#[derive(Debug)]
pub struct TemplateSet {
    templates: BTreeMap<String, CompiledTemplate>,
}

impl TemplateSet {
    /// Render a member template with positional argument values.
    pub fn render(&self, name: &str, args: &[Value]) -> Result<String, RenderError> {
        self.member(name)?.render_in(args, self, 0)
    }

    /// Render a member template with named argument values.
    pub fn render_named(
        &self,
        name: &str,
        bindings: &[(&str, Value)],
    ) -> Result<String, RenderError> {
        let template = self.member(name)?;
        let args = positional_args(name, template.params(), bindings)?;
        template.render_in(&args, self, 0)
    }

    /// Look up a member by name.
    pub fn get(&self, name: &str) -> Option<&CompiledTemplate> {
        self.templates.get(name)
    }

    fn member(&self, name: &str) -> Result<&CompiledTemplate, RenderError> {
        self.templates.get(name).ok_or_else(|| {
            RenderError::new(name, 0, EvalError::UndefinedTemplate(name.to_string()))
        })
    }
}

impl TemplateDispatch for TemplateSet {
    fn params_of(&self, name: &str) -> Option<Vec<String>> {
        self.templates.get(name).map(|t| t.params().to_vec())
    }

    fn invoke(&self, name: &str, args: Vec<Value>, depth: usize) -> Result<String, RenderError> {
        self.member(name)?.render_in(&args, self, depth)
    }
}
