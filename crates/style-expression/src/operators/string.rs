//! String operators and type conversions.

use std::sync::Arc;

use crate::color::Color;
use crate::context::EvaluationContext;
use crate::error::EvalError;
use crate::expression::Expression;
use crate::operators::{Arity, OperatorDefinition};
use crate::value::Value;

/// Display form used by `concat` and `to-string`.
fn display(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            if n.fract() == 0.0 && n.is_finite() {
                format!("{}", *n as i64)
            } else {
                n.to_string()
            }
        }
        Value::String(s) => s.clone(),
        Value::Color(c) => c.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_json().to_string(),
    }
}

fn evaluate_to_string(
    expression: &Expression,
    ctx: &mut EvaluationContext<'_>,
) -> Result<String, EvalError> {
    let value = expression.evaluate(ctx)?;
    match value {
        Value::String(s) => Ok(s),
        other => Err(EvalError::type_mismatch("string", &other)),
    }
}

fn concat_eval(args: &[Expression], ctx: &mut EvaluationContext<'_>) -> Result<Value, EvalError> {
    let mut out = String::new();
    for arg in args {
        out.push_str(&display(&arg.evaluate(ctx)?));
    }
    Ok(Value::String(out))
}

fn upcase_eval(args: &[Expression], ctx: &mut EvaluationContext<'_>) -> Result<Value, EvalError> {
    Ok(Value::String(evaluate_to_string(&args[0], ctx)?.to_uppercase()))
}

fn downcase_eval(args: &[Expression], ctx: &mut EvaluationContext<'_>) -> Result<Value, EvalError> {
    Ok(Value::String(evaluate_to_string(&args[0], ctx)?.to_lowercase()))
}

fn length_eval(args: &[Expression], ctx: &mut EvaluationContext<'_>) -> Result<Value, EvalError> {
    let value = args[0].evaluate(ctx)?;
    match &value {
        Value::String(s) => Ok(Value::Number(s.chars().count() as f64)),
        Value::Array(items) => Ok(Value::Number(items.len() as f64)),
        other => Err(EvalError::type_mismatch("string or array", other)),
    }
}

fn typeof_eval(args: &[Expression], ctx: &mut EvaluationContext<'_>) -> Result<Value, EvalError> {
    Ok(Value::String(args[0].evaluate(ctx)?.type_name().to_string()))
}

fn to_string_eval(args: &[Expression], ctx: &mut EvaluationContext<'_>) -> Result<Value, EvalError> {
    Ok(Value::String(display(&args[0].evaluate(ctx)?)))
}

/// `to-number` tries each operand in turn; the first convertible wins.
fn to_number_eval(args: &[Expression], ctx: &mut EvaluationContext<'_>) -> Result<Value, EvalError> {
    let mut last = Value::Null;
    for arg in args {
        let value = arg.evaluate(ctx)?;
        let converted = match &value {
            Value::Null => Some(0.0),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Number(n) => Some(*n),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        if let Some(n) = converted {
            return Ok(Value::Number(n));
        }
        last = value;
    }
    Err(EvalError::type_mismatch("number", &last))
}

fn to_boolean_eval(args: &[Expression], ctx: &mut EvaluationContext<'_>) -> Result<Value, EvalError> {
    let value = args[0].evaluate(ctx)?;
    let truthy = match &value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => *n != 0.0 && !n.is_nan(),
        Value::String(s) => !s.is_empty(),
        Value::Color(_) | Value::Array(_) | Value::Object(_) => true,
    };
    Ok(Value::Bool(truthy))
}

/// `to-color` tries each operand in turn; the first parseable wins.
fn to_color_eval(args: &[Expression], ctx: &mut EvaluationContext<'_>) -> Result<Value, EvalError> {
    let mut last = String::new();
    for arg in args {
        match arg.evaluate(ctx)? {
            Value::Color(c) => return Ok(Value::Color(c)),
            Value::String(s) => {
                if let Some(c) = Color::parse(&s) {
                    return Ok(Value::Color(c));
                }
                last = s;
            }
            other => last = display(&other),
        }
    }
    Err(EvalError::InvalidColor(last))
}

pub fn operators() -> Vec<Arc<OperatorDefinition>> {
    vec![
        Arc::new(OperatorDefinition {
            name: "concat",
            arity: Arity::AtLeast(2),
            eval: concat_eval,
        }),
        Arc::new(OperatorDefinition {
            name: "upcase",
            arity: Arity::Fixed(1),
            eval: upcase_eval,
        }),
        Arc::new(OperatorDefinition {
            name: "downcase",
            arity: Arity::Fixed(1),
            eval: downcase_eval,
        }),
        Arc::new(OperatorDefinition {
            name: "length",
            arity: Arity::Fixed(1),
            eval: length_eval,
        }),
        Arc::new(OperatorDefinition {
            name: "typeof",
            arity: Arity::Fixed(1),
            eval: typeof_eval,
        }),
        Arc::new(OperatorDefinition {
            name: "to-string",
            arity: Arity::Fixed(1),
            eval: to_string_eval,
        }),
        Arc::new(OperatorDefinition {
            name: "to-number",
            arity: Arity::AtLeast(1),
            eval: to_number_eval,
        }),
        Arc::new(OperatorDefinition {
            name: "to-boolean",
            arity: Arity::Fixed(1),
            eval: to_boolean_eval,
        }),
        Arc::new(OperatorDefinition {
            name: "to-color",
            arity: Arity::AtLeast(1),
            eval: to_color_eval,
        }),
    ]
}
