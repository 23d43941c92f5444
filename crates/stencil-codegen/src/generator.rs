//! Segment list → executable program.

use std::collections::BTreeSet;

use stencil_parser::{parse_block_snippet, parse_collection_snippet, parse_expression_snippet};
use stencil_types::ast::{Expr, ExprKind};
use stencil_types::{Op, Program, Segment, SegmentKind, Span, SyntaxError, TemplateSource};

/// The code generator.
///
/// Pure and deterministic over well-formed segment lists; the only
/// failures are snippet syntax errors, surfaced at compile time with the
/// template line attached.
pub struct Generator<'a> {
    /// For error context (template name, raw lines).
    template: &'a TemplateSource,
    /// Declared parameter names of the template being generated.
    params: &'a [String],
    /// Names of declared sub-templates in the enclosing set.
    subtemplates: &'a BTreeSet<String>,
}

impl<'a> Generator<'a> {
    pub fn new(
        template: &'a TemplateSource,
        params: &'a [String],
        subtemplates: &'a BTreeSet<String>,
    ) -> Self {
        Self {
            template,
            params,
            subtemplates,
        }
    }

    /// Generate the program for an ordered segment list.
    pub fn generate(&self, name: &str, segments: &[Segment]) -> Result<Program, SyntaxError> {
        let mut ops = Vec::with_capacity(segments.len());
        for segment in segments {
            // `${}` substitutes the empty string, so it compiles to
            // nothing at all.
            if segment.kind == SegmentKind::Expression && segment.text.trim().is_empty() {
                continue;
            }
            ops.push(self.generate_segment(segment)?);
        }
        Ok(Program::new(name, self.params.to_vec(), ops))
    }

    fn generate_segment(&self, segment: &Segment) -> Result<Op, SyntaxError> {
        let line = segment.source_line;
        match segment.kind {
            SegmentKind::Literal => Ok(Op::AppendText {
                text: segment.text.clone(),
                line,
            }),

            // `$name`: a declared sub-template wins unless shadowed by a
            // declared parameter; otherwise plain variable substitution.
            SegmentKind::Variable | SegmentKind::SubtemplateCall => {
                let name = &segment.text;
                if self.subtemplates.contains(name) && !self.params.contains(name) {
                    Ok(Op::CallTemplate {
                        name: name.clone(),
                        line,
                    })
                } else {
                    let expr = Expr::new(
                        ExprKind::Identifier(name.clone()),
                        Span::point(line, 1),
                    );
                    Ok(Op::AppendExpr {
                        src: name.clone(),
                        expr,
                        line,
                    })
                }
            }

            SegmentKind::Expression => {
                let expr = parse_expression_snippet(&segment.text, line)
                    .map_err(|e| self.attach_context(e))?;
                Ok(Op::AppendExpr {
                    src: segment.text.clone(),
                    expr,
                    line,
                })
            }

            SegmentKind::Comprehension => {
                let expr = parse_collection_snippet(&segment.text, line)
                    .map_err(|e| self.attach_context(e))?;
                Ok(Op::AppendEach {
                    src: segment.text.clone(),
                    expr,
                    line,
                })
            }

            SegmentKind::CodeBlock => {
                let body = parse_block_snippet(&segment.text, line)
                    .map_err(|e| self.attach_context(e))?;
                Ok(Op::Exec {
                    src: segment.text.clone(),
                    body,
                    line,
                })
            }
        }
    }

    /// Snippet errors carry an absolute template line but no template
    /// name or source-line context; fill both in.
    fn attach_context(&self, err: SyntaxError) -> SyntaxError {
        let source_line = self.template.line(err.span.line).unwrap_or("").to_string();
        err.with_template(&self.template.name)
            .with_source_line(source_line)
    }
}
