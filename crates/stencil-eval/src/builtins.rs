//! Built-in functions of the expression sublanguage.
//!
//! All builtins are pure. Method-call syntax is sugar: `a.f(b)` resolves
//! to `f(a, b)` for any builtin `f`.

use crate::error::{EvalError, EvalResult};
use crate::evaluator::STEP_LIMIT;
use crate::value::Value;

/// Dispatch a builtin by name. `None` means no such builtin exists.
pub fn call(name: &str, args: &[Value]) -> Option<EvalResult<Value>> {
    let result = match name {
        "str" => str_fn(args),
        "len" => len(args),
        "range" => range(args),
        "reversed" => reversed(args),
        "join" => join(args),
        "upper" => upper(args),
        "lower" => lower(args),
        "min" => min_max(args, "min"),
        "max" => min_max(args, "max"),
        "abs" => abs(args),
        _ => return None,
    };
    Some(result)
}

fn arity(name: &str, args: &[Value], expected: usize) -> EvalResult<()> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(EvalError::TypeMismatch(format!(
            "{name} expects {expected} argument(s), got {}",
            args.len()
        )))
    }
}

/// Textual conversion, identical to what substitution applies.
fn str_fn(args: &[Value]) -> EvalResult<Value> {
    arity("str", args, 1)?;
    Ok(Value::Str(args[0].display_string()))
}

fn len(args: &[Value]) -> EvalResult<Value> {
    arity("len", args, 1)?;
    match &args[0] {
        Value::Str(s) => Ok(Value::Number(s.chars().count() as f64)),
        Value::List(items) => Ok(Value::Number(items.len() as f64)),
        other => Err(EvalError::TypeMismatch(format!(
            "len expects a string or list, got {}",
            other.type_name()
        ))),
    }
}

/// `range(stop)`, `range(start, stop)` or `range(start, stop, step)`;
/// half-open, like the numeric sequences it is modeled on.
fn range(args: &[Value]) -> EvalResult<Value> {
    let (start, stop, step) = match args {
        [stop] => (0.0, number_arg("range", stop)?, 1.0),
        [start, stop] => (number_arg("range", start)?, number_arg("range", stop)?, 1.0),
        [start, stop, step] => (
            number_arg("range", start)?,
            number_arg("range", stop)?,
            number_arg("range", step)?,
        ),
        _ => {
            return Err(EvalError::TypeMismatch(format!(
                "range expects 1 to 3 arguments, got {}",
                args.len()
            )))
        }
    };
    if step == 0.0 {
        return Err(EvalError::ArithmeticTrap("range step must not be zero".into()));
    }
    let mut items = Vec::new();
    let mut current = start;
    while (step > 0.0 && current < stop) || (step < 0.0 && current > stop) {
        // Element construction counts as work, so a huge range hits the
        // step limit instead of allocating without bound.
        if items.len() as u64 >= STEP_LIMIT {
            return Err(EvalError::StepLimitExceeded);
        }
        items.push(Value::Number(current));
        current += step;
    }
    Ok(Value::List(items))
}

/// Reverse a list, or a string into a list of its characters reversed.
fn reversed(args: &[Value]) -> EvalResult<Value> {
    arity("reversed", args, 1)?;
    match &args[0] {
        Value::List(items) => {
            let mut items = items.clone();
            items.reverse();
            Ok(Value::List(items))
        }
        Value::Str(s) => Ok(Value::List(
            s.chars().rev().map(|c| Value::Str(c.to_string())).collect(),
        )),
        other => Err(EvalError::TypeMismatch(format!(
            "reversed expects a string or list, got {}",
            other.type_name()
        ))),
    }
}

/// `join(list)` or `join(list, separator)`.
fn join(args: &[Value]) -> EvalResult<Value> {
    let (list, sep) = match args {
        [list] => (list, String::new()),
        [list, Value::Str(sep)] => (list, sep.clone()),
        [_, other] => {
            return Err(EvalError::TypeMismatch(format!(
                "join separator must be a string, got {}",
                other.type_name()
            )))
        }
        _ => {
            return Err(EvalError::TypeMismatch(format!(
                "join expects 1 or 2 arguments, got {}",
                args.len()
            )))
        }
    };
    match list {
        Value::List(items) => Ok(Value::Str(
            items
                .iter()
                .map(Value::display_string)
                .collect::<Vec<_>>()
                .join(&sep),
        )),
        other => Err(EvalError::TypeMismatch(format!(
            "join expects a list, got {}",
            other.type_name()
        ))),
    }
}

fn upper(args: &[Value]) -> EvalResult<Value> {
    arity("upper", args, 1)?;
    string_arg("upper", &args[0]).map(|s| Value::Str(s.to_uppercase()))
}

fn lower(args: &[Value]) -> EvalResult<Value> {
    arity("lower", args, 1)?;
    string_arg("lower", &args[0]).map(|s| Value::Str(s.to_lowercase()))
}

/// `min`/`max` over a single list or over two or more arguments.
fn min_max(args: &[Value], name: &str) -> EvalResult<Value> {
    let items: Vec<Value> = match args {
        [Value::List(items)] => items.clone(),
        [] | [_] => {
            return Err(EvalError::TypeMismatch(format!(
                "{name} expects a list or at least two arguments"
            )))
        }
        _ => args.to_vec(),
    };
    let mut best: Option<f64> = None;
    for item in &items {
        let n = number_arg(name, item)?;
        best = Some(match best {
            None => n,
            Some(b) => {
                let better = if name == "min" { n < b } else { n > b };
                if better {
                    n
                } else {
                    b
                }
            }
        });
    }
    match best {
        Some(n) => Ok(Value::Number(n)),
        None => Err(EvalError::TypeMismatch(format!("{name} of an empty list"))),
    }
}

fn abs(args: &[Value]) -> EvalResult<Value> {
    arity("abs", args, 1)?;
    number_arg("abs", &args[0]).map(|n| Value::Number(n.abs()))
}

fn number_arg(name: &str, value: &Value) -> EvalResult<f64> {
    match value {
        Value::Number(n) => Ok(*n),
        other => Err(EvalError::TypeMismatch(format!(
            "{name} expects a number, got {}",
            other.type_name()
        ))),
    }
}

fn string_arg(name: &str, value: &Value) -> EvalResult<String> {
    match value {
        Value::Str(s) => Ok(s.clone()),
        other => Err(EvalError::TypeMismatch(format!(
            "{name} expects a string, got {}",
            other.type_name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(n: f64) -> Value {
        Value::Number(n)
    }

    fn s(text: &str) -> Value {
        Value::Str(text.to_string())
    }

    #[test]
    fn str_matches_substitution_conversion() {
        assert_eq!(call("str", &[num(3.0)]), Some(Ok(s("3"))));
        assert_eq!(call("str", &[s("x")]), Some(Ok(s("x"))));
    }

    #[test]
    fn range_is_half_open() {
        let expected = Value::List(vec![num(0.0), num(1.0), num(2.0)]);
        assert_eq!(call("range", &[num(3.0)]), Some(Ok(expected)));
    }

    #[test]
    fn range_with_negative_step_counts_down() {
        let expected = Value::List(vec![num(3.0), num(2.0), num(1.0)]);
        assert_eq!(
            call("range", &[num(3.0), num(0.0), num(-1.0)]),
            Some(Ok(expected))
        );
    }

    #[test]
    fn range_stops_at_the_step_limit_instead_of_allocating() {
        assert_eq!(
            call("range", &[num(1e9)]),
            Some(Err(EvalError::StepLimitExceeded))
        );
    }

    #[test]
    fn reversed_string_yields_single_char_strings() {
        let expected = Value::List(vec![s("c"), s("b"), s("a")]);
        assert_eq!(call("reversed", &[s("abc")]), Some(Ok(expected)));
    }

    #[test]
    fn join_with_and_without_separator() {
        let list = Value::List(vec![num(1.0), num(2.0)]);
        assert_eq!(call("join", &[list.clone()]), Some(Ok(s("12"))));
        assert_eq!(call("join", &[list, s(", ")]), Some(Ok(s("1, 2"))));
    }

    #[test]
    fn min_max_over_list_and_varargs() {
        let list = Value::List(vec![num(4.0), num(1.0), num(7.0)]);
        assert_eq!(call("min", &[list.clone()]), Some(Ok(num(1.0))));
        assert_eq!(call("max", &[list]), Some(Ok(num(7.0))));
        assert_eq!(call("max", &[num(2.0), num(9.0)]), Some(Ok(num(9.0))));
    }

    #[test]
    fn unknown_builtin_is_none() {
        assert_eq!(call("frobnicate", &[]), None);
    }

    #[test]
    fn type_errors_are_reported() {
        assert!(matches!(
            call("len", &[num(1.0)]),
            Some(Err(EvalError::TypeMismatch(_)))
        ));
    }
}
