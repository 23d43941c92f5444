//! Scanner and snippet lexer tests.
//!
//! Covers directive classification and tie-breaking, escape handling,
//! continuation, code-block brace tracking, per-segment line numbers, and
//! the token stream of embedded snippets.

use stencil_lexer::token::TokenKind;
use stencil_lexer::{Lexer, Scanner};
use stencil_types::{ErrorCode, Segment, SegmentKind, SyntaxError, TemplateSource};

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

fn scan(text: &str) -> Vec<Segment> {
    let src = TemplateSource::new("test", text);
    Scanner::new(&src).scan().expect("scan failed")
}

fn scan_err(text: &str) -> SyntaxError {
    let src = TemplateSource::new("test", text);
    Scanner::new(&src).scan().expect_err("scan succeeded")
}

/// (kind, text, line) triples, for compact assertions.
fn triples(text: &str) -> Vec<(SegmentKind, String, u32)> {
    scan(text)
        .into_iter()
        .map(|s| (s.kind, s.text, s.source_line))
        .collect()
}

fn kinds(snippet: &str) -> Vec<TokenKind> {
    Lexer::new(snippet, 1)
        .lex()
        .expect("lex failed")
        .into_iter()
        .map(|t| t.kind)
        .filter(|k| *k != TokenKind::Eof)
        .collect()
}

// ─────────────────────────────────────────────────────────────────────
// Scanner: directive classification
// ─────────────────────────────────────────────────────────────────────

#[test]
fn plain_text_is_one_literal() {
    assert_eq!(
        triples("just text"),
        vec![(SegmentKind::Literal, "just text".to_string(), 1)]
    );
}

#[test]
fn variable_splits_the_literal_run() {
    assert_eq!(
        triples("Hello $name!"),
        vec![
            (SegmentKind::Literal, "Hello ".to_string(), 1),
            (SegmentKind::Variable, "name".to_string(), 1),
            (SegmentKind::Literal, "!".to_string(), 1),
        ]
    );
}

#[test]
fn variable_name_stops_at_non_identifier() {
    assert_eq!(
        triples("$a_1b."),
        vec![
            (SegmentKind::Variable, "a_1b".to_string(), 1),
            (SegmentKind::Literal, ".".to_string(), 1),
        ]
    );
}

#[test]
fn dollar_escape_resolves_inside_literal() {
    assert_eq!(
        triples("US$$99"),
        vec![(SegmentKind::Literal, "US$99".to_string(), 1)]
    );
}

#[test]
fn passthrough_punctuation_keeps_the_dollar() {
    assert_eq!(
        triples(r#"$.$($/$'$""#),
        vec![(SegmentKind::Literal, r#"$.$($/$'$""#.to_string(), 1)]
    );
}

#[test]
fn expression_content_is_extracted() {
    assert_eq!(
        triples("${a + b}"),
        vec![(SegmentKind::Expression, "a + b".to_string(), 1)]
    );
}

#[test]
fn comprehension_closes_on_bracket_brace() {
    // The `]` of the inner list does not terminate the directive.
    assert_eq!(
        triples("${[str(x) for x in [1,2,3]]}"),
        vec![(
            SegmentKind::Comprehension,
            "str(x) for x in [1,2,3]".to_string(),
            1
        )]
    );
}

#[test]
fn code_block_tracks_nested_braces() {
    let got = triples("${{ if x { out.append(\"a\") } }}");
    assert_eq!(
        got,
        vec![(
            SegmentKind::CodeBlock,
            " if x { out.append(\"a\") } ".to_string(),
            1
        )]
    );
}

#[test]
fn lone_closing_brace_stays_in_the_block() {
    assert_eq!(
        triples("${{ } }}"),
        vec![(SegmentKind::CodeBlock, " } ".to_string(), 1)]
    );
}

#[test]
fn most_specific_opener_wins() {
    // `${{` over `${`, `${[` over `${`.
    assert_eq!(scan("${{x}}")[0].kind, SegmentKind::CodeBlock);
    assert_eq!(scan("${[x]}")[0].kind, SegmentKind::Comprehension);
    assert_eq!(scan("${x}")[0].kind, SegmentKind::Expression);
}

// ─────────────────────────────────────────────────────────────────────
// Scanner: newlines, continuation, margins
// ─────────────────────────────────────────────────────────────────────

#[test]
fn segment_lines_are_one_based_template_lines() {
    assert_eq!(
        triples("a\nb$x\n${y}"),
        vec![
            (SegmentKind::Literal, "a\nb".to_string(), 1),
            (SegmentKind::Variable, "x".to_string(), 2),
            (SegmentKind::Literal, "\n".to_string(), 2),
            (SegmentKind::Expression, "y".to_string(), 3),
        ]
    );
}

#[test]
fn continuation_consumes_the_newline() {
    assert_eq!(
        triples("a $\nb"),
        vec![(SegmentKind::Literal, "a b".to_string(), 1)]
    );
}

#[test]
fn continuation_allows_trailing_horizontal_whitespace() {
    assert_eq!(
        triples("a$ \t\nb"),
        vec![(SegmentKind::Literal, "ab".to_string(), 1)]
    );
}

#[test]
fn continuation_preserves_following_line_numbers() {
    // The joined line still counts as two physical lines behind it.
    assert_eq!(
        triples("a $\nb\n$x"),
        vec![
            (SegmentKind::Literal, "a b\n".to_string(), 1),
            (SegmentKind::Variable, "x".to_string(), 3),
        ]
    );
}

#[test]
fn code_block_swallows_only_its_own_newline() {
    assert_eq!(
        triples("${{ let x = 1 }}\n\ntail"),
        vec![
            (SegmentKind::CodeBlock, " let x = 1 ".to_string(), 1),
            (SegmentKind::Literal, "\ntail".to_string(), 2),
        ]
    );
}

#[test]
fn code_block_followed_by_text_swallows_nothing() {
    assert_eq!(
        triples("${{ let x = 1 }} tail"),
        vec![
            (SegmentKind::CodeBlock, " let x = 1 ".to_string(), 1),
            (SegmentKind::Literal, " tail".to_string(), 1),
        ]
    );
}

#[test]
fn margin_stripping_applies_before_directives() {
    let got = triples("    Hello $name\n    bye");
    assert_eq!(
        got,
        vec![
            (SegmentKind::Literal, "Hello ".to_string(), 1),
            (SegmentKind::Variable, "name".to_string(), 1),
            (SegmentKind::Literal, "\nbye".to_string(), 1),
        ]
    );
}

// ─────────────────────────────────────────────────────────────────────
// Scanner: errors
// ─────────────────────────────────────────────────────────────────────

#[test]
fn unescaped_dollar_is_rejected_with_position() {
    let err = scan_err("one\ntwo $< three");
    assert_eq!(err.code, ErrorCode::UNESCAPED_DOLLAR);
    assert_eq!(err.span.line, 2);
    assert_eq!(err.span.column, 5);
    assert_eq!(err.template, "test");
}

#[test]
fn dollar_at_end_of_input_is_dangling() {
    let err = scan_err("text $");
    assert_eq!(err.code, ErrorCode::DANGLING_CONTINUATION);
}

#[test]
fn dollar_space_without_newline_is_not_a_continuation() {
    let err = scan_err("a $ b");
    assert_eq!(err.code, ErrorCode::UNESCAPED_DOLLAR);
}

#[test]
fn unclosed_directives_are_rejected() {
    assert_eq!(scan_err("${a + 1").code, ErrorCode::UNCLOSED_EXPRESSION);
    assert_eq!(scan_err("${[a, b").code, ErrorCode::UNCLOSED_COMPREHENSION);
    assert_eq!(scan_err("${{ let ").code, ErrorCode::UNCLOSED_CODE_BLOCK);
}

#[test]
fn unclosed_error_points_at_the_opening_delimiter() {
    let err = scan_err("ok\n${{ let x = 1\nmore");
    assert_eq!(err.code, ErrorCode::UNCLOSED_CODE_BLOCK);
    assert_eq!(err.span.line, 2);
    assert_eq!(err.span.column, 1);
}

// ─────────────────────────────────────────────────────────────────────
// Snippet lexer
// ─────────────────────────────────────────────────────────────────────

#[test]
fn tokenizes_a_let_statement() {
    assert_eq!(
        kinds("let x = 1 + 2"),
        vec![
            TokenKind::Let,
            TokenKind::Identifier("x".to_string()),
            TokenKind::Eq,
            TokenKind::NumberLit(1.0),
            TokenKind::Plus,
            TokenKind::NumberLit(2.0),
        ]
    );
}

#[test]
fn keywords_are_not_identifiers() {
    assert_eq!(
        kinds("for item in items"),
        vec![
            TokenKind::For,
            TokenKind::Identifier("item".to_string()),
            TokenKind::In,
            TokenKind::Identifier("items".to_string()),
        ]
    );
}

#[test]
fn string_escapes() {
    assert_eq!(
        kinds(r#""a\n\"b\"\\""#),
        vec![TokenKind::StringLit("a\n\"b\"\\".to_string())]
    );
}

#[test]
fn invalid_escape_is_rejected() {
    let err = Lexer::new(r#""\q""#, 1).lex().unwrap_err();
    assert_eq!(err.code, ErrorCode::INVALID_ESCAPE);
}

#[test]
fn unterminated_string_is_rejected() {
    let err = Lexer::new(r#""abc"#, 1).lex().unwrap_err();
    assert_eq!(err.code, ErrorCode::UNEXPECTED_EOF);
}

#[test]
fn decimal_numbers() {
    assert_eq!(kinds("3.25"), vec![TokenKind::NumberLit(3.25)]);
    // A trailing dot is a method-call dot, not part of the number.
    assert_eq!(
        kinds("3.abs()"),
        vec![
            TokenKind::NumberLit(3.0),
            TokenKind::Dot,
            TokenKind::Identifier("abs".to_string()),
            TokenKind::LParen,
            TokenKind::RParen,
        ]
    );
}

#[test]
fn comments_run_to_end_of_line() {
    assert_eq!(
        kinds("1 // ignored\n2"),
        vec![
            TokenKind::NumberLit(1.0),
            TokenKind::Newline,
            TokenKind::NumberLit(2.0),
        ]
    );
}

#[test]
fn bang_alone_is_rejected_with_a_hint() {
    let err = Lexer::new("!x", 1).lex().unwrap_err();
    assert_eq!(err.code, ErrorCode::UNEXPECTED_TOKEN);
    assert!(err.message.contains("not"));
    assert_eq!(kinds("a != b").len(), 3);
}

#[test]
fn token_lines_are_absolute_template_lines() {
    let tokens = Lexer::new("a\nb", 5).lex().unwrap();
    assert_eq!(tokens[0].span.line, 5);
    assert_eq!(tokens[1].kind, TokenKind::Newline);
    assert_eq!(tokens[2].span.line, 6);
}
