//! Boolean logic, comparisons and branch selection.

use std::sync::Arc;

use crate::context::EvaluationContext;
use crate::error::EvalError;
use crate::expression::Expression;
use crate::operators::{Arity, OperatorDefinition};
use crate::value::Value;

fn evaluate_to_bool(
    expression: &Expression,
    ctx: &mut EvaluationContext<'_>,
) -> Result<bool, EvalError> {
    let value = expression.evaluate(ctx)?;
    value
        .as_bool()
        .ok_or_else(|| EvalError::type_mismatch("boolean", &value))
}

/// Ordering comparisons accept two numbers or two strings; nothing else.
/// `None` means incomparable (a NaN operand): every ordering test on it is
/// false.
fn compare(
    args: &[Expression],
    ctx: &mut EvaluationContext<'_>,
) -> Result<Option<std::cmp::Ordering>, EvalError> {
    let left = args[0].evaluate(ctx)?;
    let right = args[1].evaluate(ctx)?;
    match (&left, &right) {
        (Value::Number(a), Value::Number(b)) => Ok(a.partial_cmp(b)),
        (Value::String(a), Value::String(b)) => Ok(Some(a.cmp(b))),
        (Value::Number(_), other) | (Value::String(_), other) | (other, _) => {
            Err(EvalError::type_mismatch("number or string", other))
        }
    }
}

fn not_eval(args: &[Expression], ctx: &mut EvaluationContext<'_>) -> Result<Value, EvalError> {
    Ok(Value::Bool(!evaluate_to_bool(&args[0], ctx)?))
}

fn eq_eval(args: &[Expression], ctx: &mut EvaluationContext<'_>) -> Result<Value, EvalError> {
    let left = args[0].evaluate(ctx)?;
    let right = args[1].evaluate(ctx)?;
    Ok(Value::Bool(left == right))
}

fn ne_eval(args: &[Expression], ctx: &mut EvaluationContext<'_>) -> Result<Value, EvalError> {
    let left = args[0].evaluate(ctx)?;
    let right = args[1].evaluate(ctx)?;
    Ok(Value::Bool(left != right))
}

fn lt_eval(args: &[Expression], ctx: &mut EvaluationContext<'_>) -> Result<Value, EvalError> {
    Ok(Value::Bool(compare(args, ctx)?.is_some_and(|o| o.is_lt())))
}

fn le_eval(args: &[Expression], ctx: &mut EvaluationContext<'_>) -> Result<Value, EvalError> {
    Ok(Value::Bool(compare(args, ctx)?.is_some_and(|o| o.is_le())))
}

fn gt_eval(args: &[Expression], ctx: &mut EvaluationContext<'_>) -> Result<Value, EvalError> {
    Ok(Value::Bool(compare(args, ctx)?.is_some_and(|o| o.is_gt())))
}

fn ge_eval(args: &[Expression], ctx: &mut EvaluationContext<'_>) -> Result<Value, EvalError> {
    Ok(Value::Bool(compare(args, ctx)?.is_some_and(|o| o.is_ge())))
}

fn all_eval(args: &[Expression], ctx: &mut EvaluationContext<'_>) -> Result<Value, EvalError> {
    for arg in args {
        if !evaluate_to_bool(arg, ctx)? {
            return Ok(Value::Bool(false));
        }
    }
    Ok(Value::Bool(true))
}

fn any_eval(args: &[Expression], ctx: &mut EvaluationContext<'_>) -> Result<Value, EvalError> {
    for arg in args {
        if evaluate_to_bool(arg, ctx)? {
            return Ok(Value::Bool(true));
        }
    }
    Ok(Value::Bool(false))
}

/// `["case", cond1, out1, ..., fallback]` — first true condition wins.
fn case_eval(args: &[Expression], ctx: &mut EvaluationContext<'_>) -> Result<Value, EvalError> {
    if args.len() % 2 == 0 {
        return Err(EvalError::InvalidValue(
            "\"case\" operator expects an odd number of operands.".to_string(),
        ));
    }
    for pair in args[..args.len() - 1].chunks(2) {
        if evaluate_to_bool(&pair[0], ctx)? {
            return pair[1].evaluate(ctx);
        }
    }
    args[args.len() - 1].evaluate(ctx)
}

/// `["match", input, label, out, ..., fallback]` — labels are values or
/// arrays of values matched by equality.
fn match_eval(args: &[Expression], ctx: &mut EvaluationContext<'_>) -> Result<Value, EvalError> {
    if args.len() % 2 != 0 {
        return Err(EvalError::InvalidValue(
            "\"match\" operator expects an even number of operands.".to_string(),
        ));
    }
    let input = args[0].evaluate(ctx)?;
    for pair in args[1..args.len() - 1].chunks(2) {
        let label = pair[0].evaluate(ctx)?;
        let hit = match &label {
            Value::Array(candidates) => candidates.iter().any(|c| *c == input),
            other => *other == input,
        };
        if hit {
            return pair[1].evaluate(ctx);
        }
    }
    args[args.len() - 1].evaluate(ctx)
}

pub fn operators() -> Vec<Arc<OperatorDefinition>> {
    vec![
        Arc::new(OperatorDefinition {
            name: "!",
            arity: Arity::Fixed(1),
            eval: not_eval,
        }),
        Arc::new(OperatorDefinition {
            name: "==",
            arity: Arity::Fixed(2),
            eval: eq_eval,
        }),
        Arc::new(OperatorDefinition {
            name: "!=",
            arity: Arity::Fixed(2),
            eval: ne_eval,
        }),
        Arc::new(OperatorDefinition {
            name: "<",
            arity: Arity::Fixed(2),
            eval: lt_eval,
        }),
        Arc::new(OperatorDefinition {
            name: "<=",
            arity: Arity::Fixed(2),
            eval: le_eval,
        }),
        Arc::new(OperatorDefinition {
            name: ">",
            arity: Arity::Fixed(2),
            eval: gt_eval,
        }),
        Arc::new(OperatorDefinition {
            name: ">=",
            arity: Arity::Fixed(2),
            eval: ge_eval,
        }),
        Arc::new(OperatorDefinition {
            name: "all",
            arity: Arity::AtLeast(2),
            eval: all_eval,
        }),
        Arc::new(OperatorDefinition {
            name: "any",
            arity: Arity::AtLeast(2),
            eval: any_eval,
        }),
        Arc::new(OperatorDefinition {
            name: "case",
            arity: Arity::AtLeast(3),
            eval: case_eval,
        }),
        Arc::new(OperatorDefinition {
            name: "match",
            arity: Arity::AtLeast(4),
            eval: match_eval,
        }),
    ]
}
