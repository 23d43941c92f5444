//! Snippet parser tests: expressions, collection constructions, and
//! statement blocks.

use stencil_parser::{parse_block_snippet, parse_collection_snippet, parse_expression_snippet};
use stencil_types::ast::*;
use stencil_types::ErrorCode;

fn expr(text: &str) -> Expr {
    parse_expression_snippet(text, 1).expect("parse failed")
}

fn block(text: &str) -> Block {
    parse_block_snippet(text, 1).expect("parse failed")
}

// ─────────────────────────────────────────────────────────────────────
// Expressions
// ─────────────────────────────────────────────────────────────────────

#[test]
fn multiplication_binds_tighter_than_addition() {
    let e = expr("1 + 2 * 3");
    let ExprKind::Binary { op, right, .. } = e.kind else {
        panic!("expected binary, got {e:?}");
    };
    assert_eq!(op, BinOp::Add);
    assert!(matches!(
        right.kind,
        ExprKind::Binary { op: BinOp::Mul, .. }
    ));
}

#[test]
fn parentheses_override_precedence() {
    let e = expr("(1 + 2) * 3");
    let ExprKind::Binary { op, left, .. } = e.kind else {
        panic!("expected binary, got {e:?}");
    };
    assert_eq!(op, BinOp::Mul);
    assert!(matches!(left.kind, ExprKind::Paren(_)));
}

#[test]
fn boolean_operators_bind_loosest() {
    let e = expr("not a or b and c");
    let ExprKind::Binary { op, left, right } = e.kind else {
        panic!("expected binary, got {e:?}");
    };
    assert_eq!(op, BinOp::Or);
    assert!(matches!(
        left.kind,
        ExprKind::Unary {
            op: UnaryOp::Not,
            ..
        }
    ));
    assert!(matches!(
        right.kind,
        ExprKind::Binary { op: BinOp::And, .. }
    ));
}

#[test]
fn chained_comparisons_are_rejected() {
    let err = parse_expression_snippet("1 < 2 < 3", 1).unwrap_err();
    assert_eq!(err.code, ErrorCode::UNEXPECTED_TOKEN);
    assert!(err.message.contains("chained"));
}

#[test]
fn call_and_postfix_chain() {
    let e = expr("items[0].upper()");
    let ExprKind::MethodCall { object, method, .. } = e.kind else {
        panic!("expected method call, got {e:?}");
    };
    assert_eq!(method.name, "upper");
    assert!(matches!(object.kind, ExprKind::Index { .. }));
}

#[test]
fn call_with_arguments() {
    let e = expr("range(1, 10, 2)");
    let ExprKind::Call { name, args } = e.kind else {
        panic!("expected call, got {e:?}");
    };
    assert_eq!(name.name, "range");
    assert_eq!(args.len(), 3);
}

#[test]
fn method_call_requires_parentheses() {
    assert!(parse_expression_snippet("a.b", 1).is_err());
}

#[test]
fn negative_index_literal() {
    let e = expr("xs[-1]");
    let ExprKind::Index { index, .. } = e.kind else {
        panic!("expected index, got {e:?}");
    };
    assert!(matches!(index.kind, ExprKind::Unary { op: UnaryOp::Neg, .. }));
}

#[test]
fn trailing_tokens_after_expression_are_rejected() {
    let err = parse_expression_snippet("1 2", 1).unwrap_err();
    assert_eq!(err.code, ErrorCode::UNEXPECTED_TOKEN);
}

#[test]
fn empty_expression_snippet_is_rejected() {
    let err = parse_expression_snippet("", 1).unwrap_err();
    assert_eq!(err.code, ErrorCode::UNEXPECTED_EOF);
}

// ─────────────────────────────────────────────────────────────────────
// Collection constructions
// ─────────────────────────────────────────────────────────────────────

#[test]
fn comprehension_with_filter() {
    let e = parse_collection_snippet("str(x) for x in items if x > 0", 1).unwrap();
    let ExprKind::Comprehension {
        var,
        filter,
        element,
        ..
    } = e.kind
    else {
        panic!("expected comprehension, got {e:?}");
    };
    assert_eq!(var.name, "x");
    assert!(filter.is_some());
    assert!(matches!(element.kind, ExprKind::Call { .. }));
}

#[test]
fn plain_element_list() {
    let e = parse_collection_snippet("1, 2, 3", 1).unwrap();
    assert!(matches!(e.kind, ExprKind::ListLit(ref items) if items.len() == 3));
}

#[test]
fn trailing_comma_is_allowed() {
    let e = parse_collection_snippet("1, 2,", 1).unwrap();
    assert!(matches!(e.kind, ExprKind::ListLit(ref items) if items.len() == 2));
}

#[test]
fn empty_collection_is_an_empty_list() {
    let e = parse_collection_snippet("", 1).unwrap();
    assert!(matches!(e.kind, ExprKind::ListLit(ref items) if items.is_empty()));
}

#[test]
fn nested_list_inside_comprehension() {
    let e = parse_collection_snippet("str(x) for x in [1,2,3]", 1).unwrap();
    let ExprKind::Comprehension { iterable, .. } = e.kind else {
        panic!("expected comprehension, got {e:?}");
    };
    assert!(matches!(iterable.kind, ExprKind::ListLit(_)));
}

// ─────────────────────────────────────────────────────────────────────
// Statement blocks
// ─────────────────────────────────────────────────────────────────────

#[test]
fn semicolons_separate_statements_on_one_line() {
    let b = block("let x = 1; set x = 2; out.append(str(x))");
    assert_eq!(b.stmts.len(), 3);
    assert!(matches!(b.stmts[0], Stmt::Let(_)));
    assert!(matches!(b.stmts[1], Stmt::Set(_)));
    assert!(matches!(b.stmts[2], Stmt::Expr(_)));
}

#[test]
fn newlines_separate_statements() {
    let b = block("\nlet x = 1\nlet y = 2\n");
    assert_eq!(b.stmts.len(), 2);
}

#[test]
fn adjacent_statements_without_separator_are_rejected() {
    let err = parse_block_snippet("let x = 1 let y = 2", 1).unwrap_err();
    assert_eq!(err.code, ErrorCode::UNEXPECTED_TOKEN);
}

#[test]
fn if_else_if_else_chain() {
    let b = block("if a { let x = 1 } else if b { let x = 2 } else { let x = 3 }");
    let Stmt::If(ref stmt) = b.stmts[0] else {
        panic!("expected if");
    };
    let Some(ElseBranch::ElseIf(ref elseif)) = stmt.else_branch else {
        panic!("expected else-if");
    };
    assert!(matches!(elseif.else_branch, Some(ElseBranch::Block(_))));
}

#[test]
fn for_statement_with_body() {
    let b = block("for item in items { out.append(str(item)) }");
    let Stmt::For(ref stmt) = b.stmts[0] else {
        panic!("expected for");
    };
    assert_eq!(stmt.item.name, "item");
    assert_eq!(stmt.body.stmts.len(), 1);
}

#[test]
fn return_with_and_without_value() {
    let b = block("return\n");
    assert!(matches!(b.stmts[0], Stmt::Return(ReturnStmt { value: None, .. })));
    let b = block("return 5");
    assert!(matches!(
        b.stmts[0],
        Stmt::Return(ReturnStmt { value: Some(_), .. })
    ));
}

#[test]
fn empty_block_is_allowed() {
    assert!(block("").stmts.is_empty());
    assert!(block("\n\n").stmts.is_empty());
}

#[test]
fn statement_spans_carry_absolute_template_lines() {
    let b = parse_block_snippet("\nlet x = 1\nlet y = 2", 4).unwrap();
    assert_eq!(b.stmts[0].span().line, 5);
    assert_eq!(b.stmts[1].span().line, 6);
}

#[test]
fn error_lines_are_absolute_template_lines() {
    let err = parse_block_snippet("\nlet x =\n", 4).unwrap_err();
    assert_eq!(err.span.line, 5);
}
