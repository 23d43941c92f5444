//! Core program runner: executes a compiled template against argument
//! values and produces the rendered string.

use crate::builtins;
use crate::env::Environment;
use crate::error::{EvalError, EvalResult, RenderError};
use crate::value::Value;
use stencil_types::ast::*;
use stencil_types::{Op, Program};

/// Total evaluation steps allowed per render.
pub const STEP_LIMIT: u64 = 1_000_000;

/// Maximum nesting of template invocations. Recursion between templates
/// is legal; runaway recursion is cut off here rather than by stack
/// overflow.
pub const MAX_CALL_DEPTH: usize = 64;

/// Resolver for sub-template invocations.
///
/// The evaluator knows a call's name and the enclosing bindings; the
/// registry that owns the compiled programs implements this trait to
/// supply parameter lists and perform the nested render.
pub trait TemplateDispatch {
    /// Declared parameter names of the named template, if it exists.
    fn params_of(&self, name: &str) -> Option<Vec<String>>;

    /// Render the named template with the given argument values.
    fn invoke(&self, name: &str, args: Vec<Value>, depth: usize) -> Result<String, RenderError>;
}

/// Dispatch for standalone templates: every invocation is undefined.
pub struct NoDispatch;

impl TemplateDispatch for NoDispatch {
    fn params_of(&self, _name: &str) -> Option<Vec<String>> {
        None
    }

    fn invoke(&self, name: &str, _args: Vec<Value>, _depth: usize) -> Result<String, RenderError> {
        Err(RenderError::new(
            name,
            0,
            EvalError::UndefinedTemplate(name.to_string()),
        ))
    }
}

/// The program runner — walks operations and AST nodes, accumulating
/// output fragments.
///
/// One `Evaluator` serves one render: the output accumulator and the
/// variable environment are per-invocation, so a compiled program may be
/// rendered concurrently from many evaluators.
pub struct Evaluator<'a> {
    env: Environment,
    /// Step counter — limits total work to cut off runaway loops.
    steps: u64,
    step_limit: u64,
    /// Per-invocation output accumulator, concatenated at the end.
    out: Vec<String>,
    dispatch: &'a dyn TemplateDispatch,
    /// Current template-call nesting depth.
    depth: usize,
    /// Template line of the operation or statement being evaluated, for
    /// error attribution.
    current_line: u32,
}

impl<'a> Evaluator<'a> {
    fn new(dispatch: &'a dyn TemplateDispatch, depth: usize) -> Self {
        Self {
            env: Environment::new(),
            steps: 0,
            step_limit: STEP_LIMIT,
            out: Vec::new(),
            dispatch,
            depth,
            current_line: 1,
        }
    }

    /// Render a compiled program with positional argument values.
    ///
    /// A `return` statement in a code block ends the render immediately;
    /// the returned value's text replaces the accumulated output (a bare
    /// `return` yields the empty string).
    pub fn render(
        program: &Program,
        args: &[Value],
        dispatch: &'a dyn TemplateDispatch,
        depth: usize,
    ) -> Result<String, RenderError> {
        if args.len() != program.params.len() {
            let err = EvalError::TypeMismatch(format!(
                "template '{}' expects {} argument(s), got {}",
                program.name,
                program.params.len(),
                args.len()
            ));
            return Err(RenderError::new(&program.name, 1, err));
        }

        let mut ev = Evaluator::new(dispatch, depth);
        for (param, value) in program.params.iter().zip(args) {
            ev.env.define(param, value.clone());
        }

        for op in &program.ops {
            ev.current_line = op.line();
            match ev.exec_op(op) {
                Ok(()) => {}
                Err(EvalError::Return(value)) => return Ok(return_text(value)),
                Err(EvalError::Nested(inner)) => return Err(*inner),
                Err(err) => return Err(RenderError::new(&program.name, ev.current_line, err)),
            }
        }
        Ok(ev.out.concat())
    }

    fn tick(&mut self) -> EvalResult<()> {
        self.steps += 1;
        if self.steps > self.step_limit {
            Err(EvalError::StepLimitExceeded)
        } else {
            Ok(())
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Operations
    // ══════════════════════════════════════════════════════════════════════

    fn exec_op(&mut self, op: &Op) -> EvalResult<()> {
        match op {
            Op::AppendText { text, .. } => {
                self.out.push(text.clone());
                Ok(())
            }
            Op::AppendExpr { expr, .. } => {
                let value = self.eval_expr(expr)?;
                self.out.push(value.display_string());
                Ok(())
            }
            Op::AppendEach { expr, .. } => {
                let value = self.eval_expr(expr)?;
                match value {
                    Value::List(items) => {
                        for item in items {
                            self.out.push(item.display_string());
                        }
                        Ok(())
                    }
                    other => Err(EvalError::TypeMismatch(format!(
                        "collection construction produced {}, expected a list",
                        other.type_name()
                    ))),
                }
            }
            // Code blocks run in the render scope: bindings they create
            // stay visible to later segments.
            Op::Exec { body, .. } => self.eval_block(body),
            Op::CallTemplate { name, line } => self.call_template(name, *line),
        }
    }

    /// Invoke a declared sub-template with the enclosing invocation's
    /// current bindings for the callee's declared parameters.
    fn call_template(&mut self, name: &str, line: u32) -> EvalResult<()> {
        if self.depth + 1 > MAX_CALL_DEPTH {
            return Err(EvalError::CallDepthExceeded);
        }
        let params = self
            .dispatch
            .params_of(name)
            .ok_or_else(|| EvalError::UndefinedTemplate(name.to_string()))?;
        let mut args = Vec::with_capacity(params.len());
        for param in &params {
            let value = self
                .env
                .get(param)
                .cloned()
                .ok_or_else(|| EvalError::UndefinedVariable(param.clone()))?;
            args.push(value);
        }
        self.current_line = line;
        let rendered = self
            .dispatch
            .invoke(name, args, self.depth + 1)
            .map_err(|e| EvalError::Nested(Box::new(e)))?;
        self.out.push(rendered);
        Ok(())
    }

    // ══════════════════════════════════════════════════════════════════════
    // Statements
    // ══════════════════════════════════════════════════════════════════════

    fn eval_block(&mut self, block: &Block) -> EvalResult<()> {
        for stmt in &block.stmts {
            self.eval_stmt(stmt)?;
        }
        Ok(())
    }

    fn eval_stmt(&mut self, stmt: &Stmt) -> EvalResult<()> {
        self.tick()?;
        self.current_line = stmt.span().line;
        match stmt {
            Stmt::Let(s) => {
                let value = self.eval_expr(&s.value)?;
                self.env.define(&s.name.name, value);
                Ok(())
            }
            Stmt::Set(s) => {
                let value = self.eval_expr(&s.value)?;
                if self.env.set(&s.name.name, value) {
                    Ok(())
                } else {
                    Err(EvalError::UndefinedVariable(s.name.name.clone()))
                }
            }
            Stmt::If(s) => self.eval_if(s),
            Stmt::For(s) => self.eval_for(s),
            Stmt::Return(s) => {
                let value = match &s.value {
                    Some(expr) => self.eval_expr(expr)?,
                    None => Value::Nil,
                };
                Err(EvalError::Return(value))
            }
            Stmt::Expr(s) => {
                self.eval_expr(&s.expr)?;
                Ok(())
            }
        }
    }

    fn eval_if(&mut self, stmt: &IfStmt) -> EvalResult<()> {
        if self.eval_condition(&stmt.condition)? {
            self.eval_scoped_block(&stmt.then_block)
        } else {
            match &stmt.else_branch {
                Some(ElseBranch::ElseIf(inner)) => self.eval_if(inner),
                Some(ElseBranch::Block(block)) => self.eval_scoped_block(block),
                None => Ok(()),
            }
        }
    }

    fn eval_for(&mut self, stmt: &ForStmt) -> EvalResult<()> {
        let iterable = self.eval_expr(&stmt.iterable)?;
        for item in iterate(&iterable)? {
            self.env.push_scope();
            self.env.define(&stmt.item.name, item);
            let result = self.eval_block(&stmt.body);
            self.env.pop_scope();
            result?;
        }
        Ok(())
    }

    fn eval_scoped_block(&mut self, block: &Block) -> EvalResult<()> {
        self.env.push_scope();
        let result = self.eval_block(block);
        self.env.pop_scope();
        result
    }

    // ══════════════════════════════════════════════════════════════════════
    // Expressions
    // ══════════════════════════════════════════════════════════════════════

    fn eval_expr(&mut self, expr: &Expr) -> EvalResult<Value> {
        self.tick()?;
        self.current_line = expr.span.line;
        match &expr.kind {
            ExprKind::NumberLit(n) => Ok(Value::Number(*n)),
            ExprKind::StringLit(s) => Ok(Value::Str(s.clone())),
            ExprKind::BoolLit(b) => Ok(Value::Bool(*b)),
            ExprKind::NilLit => Ok(Value::Nil),

            ExprKind::ListLit(elems) => {
                let mut values = Vec::with_capacity(elems.len());
                for elem in elems {
                    values.push(self.eval_expr(elem)?);
                }
                Ok(Value::List(values))
            }
            ExprKind::Comprehension {
                element,
                var,
                iterable,
                filter,
            } => self.eval_comprehension(element, var, iterable, filter.as_deref()),

            ExprKind::Identifier(name) => self
                .env
                .get(name)
                .cloned()
                .ok_or_else(|| EvalError::UndefinedVariable(name.clone())),

            ExprKind::Call { name, args } => {
                let arg_values = self.eval_args(args)?;
                self.call_function(&name.name, arg_values)
            }
            ExprKind::MethodCall {
                object,
                method,
                args,
            } => self.eval_method_call(object, &method.name, args),

            ExprKind::Index { object, index } => {
                let object = self.eval_expr(object)?;
                let index = self.eval_expr(index)?;
                eval_index(&object, &index)
            }
            ExprKind::Binary { left, op, right } => self.eval_binary(left, *op, right),
            ExprKind::Unary { op, operand } => {
                let value = self.eval_expr(operand)?;
                eval_unary(*op, &value)
            }
            ExprKind::Paren(inner) => self.eval_expr(inner),
        }
    }

    fn eval_args(&mut self, args: &[Expr]) -> EvalResult<Vec<Value>> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.eval_expr(arg)?);
        }
        Ok(values)
    }

    /// Resolve a call by name: builtins first, then declared templates.
    ///
    /// A template invoked in expression position renders with positional
    /// arguments and yields its text as a string value, so constructs
    /// like `${[row(x) for x in items]}` compose sub-templates inline.
    fn call_function(&mut self, name: &str, args: Vec<Value>) -> EvalResult<Value> {
        if let Some(result) = builtins::call(name, &args) {
            return result;
        }
        if self.dispatch.params_of(name).is_some() {
            if self.depth + 1 > MAX_CALL_DEPTH {
                return Err(EvalError::CallDepthExceeded);
            }
            let rendered = self
                .dispatch
                .invoke(name, args, self.depth + 1)
                .map_err(|e| EvalError::Nested(Box::new(e)))?;
            return Ok(Value::Str(rendered));
        }
        Err(EvalError::UnknownFunction(name.to_string()))
    }

    /// `out.append(x)` / `out.extend(xs)` are the output primitives; every
    /// other method call is sugar for a function call with the receiver
    /// prepended.
    fn eval_method_call(
        &mut self,
        object: &Expr,
        method: &str,
        args: &[Expr],
    ) -> EvalResult<Value> {
        if let ExprKind::Identifier(name) = &object.kind {
            if name == "out" {
                return self.eval_out_primitive(method, args);
            }
        }
        let receiver = self.eval_expr(object)?;
        let mut all_args = vec![receiver];
        all_args.extend(self.eval_args(args)?);
        self.call_function(method, all_args)
    }

    fn eval_out_primitive(&mut self, method: &str, args: &[Expr]) -> EvalResult<Value> {
        match method {
            "append" => {
                let [arg] = args else {
                    return Err(EvalError::TypeMismatch(format!(
                        "out.append expects 1 argument, got {}",
                        args.len()
                    )));
                };
                let value = self.eval_expr(arg)?;
                self.out.push(value.display_string());
                Ok(Value::Nil)
            }
            "extend" => {
                let [arg] = args else {
                    return Err(EvalError::TypeMismatch(format!(
                        "out.extend expects 1 argument, got {}",
                        args.len()
                    )));
                };
                match self.eval_expr(arg)? {
                    Value::List(items) => {
                        for item in items {
                            self.out.push(item.display_string());
                        }
                        Ok(Value::Nil)
                    }
                    other => Err(EvalError::TypeMismatch(format!(
                        "out.extend expects a list, got {}",
                        other.type_name()
                    ))),
                }
            }
            other => Err(EvalError::UnknownFunction(format!("out.{other}"))),
        }
    }

    fn eval_comprehension(
        &mut self,
        element: &Expr,
        var: &Ident,
        iterable: &Expr,
        filter: Option<&Expr>,
    ) -> EvalResult<Value> {
        let source = self.eval_expr(iterable)?;
        let mut items = Vec::new();
        for item in iterate(&source)? {
            self.tick()?;
            self.env.push_scope();
            self.env.define(&var.name, item);
            let result = (|| {
                if let Some(filter) = filter {
                    if !self.eval_condition(filter)? {
                        return Ok(None);
                    }
                }
                self.eval_expr(element).map(Some)
            })();
            self.env.pop_scope();
            if let Some(value) = result? {
                items.push(value);
            }
        }
        Ok(Value::List(items))
    }

    fn eval_binary(&mut self, left: &Expr, op: BinOp, right: &Expr) -> EvalResult<Value> {
        // `and` / `or` short-circuit.
        match op {
            BinOp::And => {
                return if self.eval_condition(left)? {
                    Ok(Value::Bool(self.eval_condition(right)?))
                } else {
                    Ok(Value::Bool(false))
                };
            }
            BinOp::Or => {
                return if self.eval_condition(left)? {
                    Ok(Value::Bool(true))
                } else {
                    Ok(Value::Bool(self.eval_condition(right)?))
                };
            }
            _ => {}
        }
        let lhs = self.eval_expr(left)?;
        let rhs = self.eval_expr(right)?;
        eval_arith_or_compare(&lhs, op, &rhs)
    }

    fn eval_condition(&mut self, expr: &Expr) -> EvalResult<bool> {
        match self.eval_expr(expr)? {
            Value::Bool(b) => Ok(b),
            other => Err(EvalError::TypeMismatch(format!(
                "condition must be a bool, got {}",
                other.type_name()
            ))),
        }
    }
}

/// The render result for an early `return`.
fn return_text(value: Value) -> String {
    match value {
        Value::Nil => String::new(),
        other => other.display_string(),
    }
}

/// Elements of an iterable value. Strings iterate as their characters,
/// each a one-character string.
fn iterate(value: &Value) -> EvalResult<Vec<Value>> {
    match value {
        Value::List(items) => Ok(items.clone()),
        Value::Str(s) => Ok(s.chars().map(|c| Value::Str(c.to_string())).collect()),
        other => Err(EvalError::TypeMismatch(format!(
            "cannot iterate over {}",
            other.type_name()
        ))),
    }
}

/// Indexing on lists and strings; negative indices count from the end.
fn eval_index(object: &Value, index: &Value) -> EvalResult<Value> {
    let Value::Number(n) = index else {
        return Err(EvalError::TypeMismatch(format!(
            "index must be a number, got {}",
            index.type_name()
        )));
    };
    if n.fract() != 0.0 {
        return Err(EvalError::TypeMismatch(format!(
            "index must be an integer, got {n}"
        )));
    }
    let resolve = |len: usize| -> EvalResult<usize> {
        let i = *n as i64;
        let adjusted = if i < 0 { i + len as i64 } else { i };
        if adjusted < 0 || adjusted as usize >= len {
            Err(EvalError::IndexOutOfBounds(format!(
                "index {i} out of range for length {len}"
            )))
        } else {
            Ok(adjusted as usize)
        }
    };
    match object {
        Value::List(items) => {
            let i = resolve(items.len())?;
            Ok(items[i].clone())
        }
        Value::Str(s) => {
            let chars: Vec<char> = s.chars().collect();
            let i = resolve(chars.len())?;
            Ok(Value::Str(chars[i].to_string()))
        }
        other => Err(EvalError::TypeMismatch(format!(
            "cannot index into {}",
            other.type_name()
        ))),
    }
}

fn eval_unary(op: UnaryOp, value: &Value) -> EvalResult<Value> {
    match (op, value) {
        (UnaryOp::Neg, Value::Number(n)) => Ok(Value::Number(-n)),
        (UnaryOp::Neg, other) => Err(EvalError::TypeMismatch(format!(
            "cannot negate {}",
            other.type_name()
        ))),
        (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
        (UnaryOp::Not, other) => Err(EvalError::TypeMismatch(format!(
            "'not' expects a bool, got {}",
            other.type_name()
        ))),
    }
}

fn eval_arith_or_compare(lhs: &Value, op: BinOp, rhs: &Value) -> EvalResult<Value> {
    use BinOp::*;
    match op {
        Eq => return Ok(Value::Bool(lhs == rhs)),
        NotEq => return Ok(Value::Bool(lhs != rhs)),
        _ => {}
    }
    match (lhs, rhs) {
        (Value::Number(a), Value::Number(b)) => match op {
            Add => Ok(Value::Number(a + b)),
            Sub => Ok(Value::Number(a - b)),
            Mul => Ok(Value::Number(a * b)),
            Div => {
                if *b == 0.0 {
                    Err(EvalError::ArithmeticTrap("division by zero".into()))
                } else {
                    Ok(Value::Number(a / b))
                }
            }
            Mod => {
                if *b == 0.0 {
                    Err(EvalError::ArithmeticTrap("modulo by zero".into()))
                } else {
                    Ok(Value::Number(a % b))
                }
            }
            Less => Ok(Value::Bool(a < b)),
            LessEq => Ok(Value::Bool(a <= b)),
            Greater => Ok(Value::Bool(a > b)),
            GreaterEq => Ok(Value::Bool(a >= b)),
            Eq | NotEq | And | Or => unreachable!("handled above"),
        },
        (Value::Str(a), Value::Str(b)) => match op {
            Add => Ok(Value::Str(format!("{a}{b}"))),
            Less => Ok(Value::Bool(a < b)),
            LessEq => Ok(Value::Bool(a <= b)),
            Greater => Ok(Value::Bool(a > b)),
            GreaterEq => Ok(Value::Bool(a >= b)),
            _ => Err(EvalError::TypeMismatch(format!(
                "unsupported operation on strings: {op:?}"
            ))),
        },
        (Value::List(a), Value::List(b)) if op == Add => {
            let mut items = a.clone();
            items.extend(b.iter().cloned());
            Ok(Value::List(items))
        }
        _ => Err(EvalError::TypeMismatch(format!(
            "operands of {:?} must match: {} and {}",
            op,
            lhs.type_name(),
            rhs.type_name()
        ))),
    }
}
