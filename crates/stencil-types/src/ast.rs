//! AST node types for the stencil expression sublanguage.
//!
//! Embedded snippets — `${expr}`, `${[comprehension]}` and `${{code}}` —
//! are written in this small language and parsed at template compile time.
//! Every node carries a [`Span`] whose line numbers are absolute template
//! lines, so runtime errors report the template line that raised them.
//! Large recursive types are boxed to keep enum sizes reasonable.

use crate::Span;

// ══════════════════════════════════════════════════════════════════════════════
// Identifiers
// ══════════════════════════════════════════════════════════════════════════════

/// A spanned identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Expressions
// ══════════════════════════════════════════════════════════════════════════════

/// An expression with its source span.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Numeric literal: `42`, `3.14`
    NumberLit(f64),
    /// String literal: `"hello"`
    StringLit(String),
    /// `true` / `false`
    BoolLit(bool),
    /// `nil`
    NilLit,
    /// List literal: `[1, 2, 3]`
    ListLit(Vec<Expr>),
    /// Comprehension: `[elem for x in items]`, optionally `if cond`.
    Comprehension {
        element: Box<Expr>,
        var: Ident,
        iterable: Box<Expr>,
        filter: Option<Box<Expr>>,
    },
    /// Variable reference.
    Identifier(String),
    /// Builtin call: `str(x)`, `len(items)`
    Call { name: Ident, args: Vec<Expr> },
    /// Method-call sugar: `a.f(b)` is `f(a, b)`. `out.append(x)` and
    /// `out.extend(xs)` are intercepted as the output primitives.
    MethodCall {
        object: Box<Expr>,
        method: Ident,
        args: Vec<Expr>,
    },
    /// Indexing: `items[i]`
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
    },
    Binary {
        left: Box<Expr>,
        op: BinOp,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    /// Parenthesized expression.
    Paren(Box<Expr>),
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    NotEq,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    And,
    Or,
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

// ══════════════════════════════════════════════════════════════════════════════
// Statements (code blocks)
// ══════════════════════════════════════════════════════════════════════════════

/// A `{ ... }` statement block, or the top level of a `${{...}}` snippet.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `let x = expr` — bind in the current scope.
    Let(LetStmt),
    /// `set x = expr` — update an existing binding.
    Set(SetStmt),
    If(IfStmt),
    For(ForStmt),
    /// `return [expr]` — end the render immediately; the returned value's
    /// text replaces the accumulated output.
    Return(ReturnStmt),
    /// Bare expression statement, e.g. `out.append(x)`.
    Expr(ExprStmt),
}

impl Stmt {
    /// The span of the statement, for error attribution.
    pub fn span(&self) -> Span {
        match self {
            Stmt::Let(s) => s.span,
            Stmt::Set(s) => s.span,
            Stmt::If(s) => s.span,
            Stmt::For(s) => s.span,
            Stmt::Return(s) => s.span,
            Stmt::Expr(s) => s.expr.span,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LetStmt {
    pub name: Ident,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetStmt {
    pub name: Ident,
    pub value: Expr,
    pub span: Span,
}

/// `if cond { ... } else if cond { ... } else { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_block: Block,
    pub else_branch: Option<ElseBranch>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElseBranch {
    ElseIf(Box<IfStmt>),
    Block(Block),
}

/// `for x in expr { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    pub item: Ident,
    pub iterable: Expr,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprStmt {
    pub expr: Expr,
}
