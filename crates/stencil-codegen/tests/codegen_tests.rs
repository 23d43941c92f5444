//! Generator tests over scanned segment lists.

use std::collections::BTreeSet;

use stencil_codegen::{Generator, Listing};
use stencil_lexer::Scanner;
use stencil_types::ast::ExprKind;
use stencil_types::{Op, Program, TemplateSource};

fn generate(params: &[&str], subtemplates: &[&str], text: &str) -> Program {
    let src = TemplateSource::new("test", text);
    let segments = Scanner::new(&src).scan().expect("scan failed");
    let params: Vec<String> = params.iter().map(|p| p.to_string()).collect();
    let subs: BTreeSet<String> = subtemplates.iter().map(|s| s.to_string()).collect();
    Generator::new(&src, &params, &subs)
        .generate("test", &segments)
        .expect("generate failed")
}

#[test]
fn literal_and_variable_ops() {
    let program = generate(&["name"], &[], "Hello $name!");
    assert_eq!(program.ops.len(), 3);
    assert!(matches!(&program.ops[0], Op::AppendText { text, line: 1 } if text == "Hello "));
    assert!(matches!(&program.ops[1], Op::AppendExpr { src, .. } if src == "name"));
    assert!(matches!(&program.ops[2], Op::AppendText { text, .. } if text == "!"));
}

#[test]
fn variable_matching_a_sub_template_becomes_a_call() {
    let program = generate(&["name"], &["footer"], "$name$footer");
    assert!(matches!(&program.ops[0], Op::AppendExpr { .. }));
    assert!(matches!(&program.ops[1], Op::CallTemplate { name, .. } if name == "footer"));
}

#[test]
fn parameter_shadows_a_sub_template_name() {
    let program = generate(&["footer"], &["footer"], "$footer");
    assert!(matches!(&program.ops[0], Op::AppendExpr { .. }));
}

#[test]
fn expression_snippets_are_parsed_at_compile_time() {
    let program = generate(&["a", "b"], &[], "${a + b}");
    let Op::AppendExpr { expr, src, .. } = &program.ops[0] else {
        panic!("expected AppendExpr");
    };
    assert_eq!(src, "a + b");
    assert!(matches!(expr.kind, ExprKind::Binary { .. }));
}

#[test]
fn comprehension_snippets_become_append_each() {
    let program = generate(&["xs"], &[], "${[str(x) for x in xs]}");
    let Op::AppendEach { expr, .. } = &program.ops[0] else {
        panic!("expected AppendEach");
    };
    assert!(matches!(expr.kind, ExprKind::Comprehension { .. }));
}

#[test]
fn code_block_snippets_become_exec() {
    let program = generate(&[], &[], "${{ let x = 1; out.append(str(x)) }}");
    let Op::Exec { body, .. } = &program.ops[0] else {
        panic!("expected Exec");
    };
    assert_eq!(body.stmts.len(), 2);
}

#[test]
fn snippet_errors_carry_template_context() {
    let src = TemplateSource::new("broken", "ok line\n${1 +}\n");
    let segments = Scanner::new(&src).scan().expect("scan failed");
    let err = Generator::new(&src, &[], &BTreeSet::new())
        .generate("broken", &segments)
        .unwrap_err();
    assert_eq!(err.template, "broken");
    assert_eq!(err.line(), 2);
    assert_eq!(err.source_line, "${1 +}");
}

#[test]
fn op_lines_survive_into_the_listing() {
    let program = generate(&["x"], &[], "a\nb ${x}\nc");
    let listing = Listing::render(&program);
    for entry in &listing.source_map().entries {
        assert!(entry.generated_line >= entry.template_line);
    }
    // Literal "a\nb " begins on line 1, the expression sits on line 2.
    assert_eq!(listing.source_map().template_line(2), Some(2));
}
