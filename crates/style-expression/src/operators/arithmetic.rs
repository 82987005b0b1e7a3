//! Arithmetic operators. Operands must evaluate to numbers.

use std::sync::Arc;

use crate::context::EvaluationContext;
use crate::error::EvalError;
use crate::expression::{evaluate_to_number, Expression};
use crate::operators::{Arity, OperatorDefinition};
use crate::value::Value;

fn add_eval(args: &[Expression], ctx: &mut EvaluationContext<'_>) -> Result<Value, EvalError> {
    args.iter()
        .try_fold(0.0f64, |acc, e| Ok(acc + evaluate_to_number(e, ctx)?))
        .map(Value::Number)
}

fn subtract_eval(args: &[Expression], ctx: &mut EvaluationContext<'_>) -> Result<Value, EvalError> {
    // Unary form negates.
    let first = evaluate_to_number(&args[0], ctx)?;
    if args.len() == 1 {
        return Ok(Value::Number(-first));
    }
    Ok(Value::Number(first - evaluate_to_number(&args[1], ctx)?))
}

fn multiply_eval(args: &[Expression], ctx: &mut EvaluationContext<'_>) -> Result<Value, EvalError> {
    args.iter()
        .try_fold(1.0f64, |acc, e| Ok(acc * evaluate_to_number(e, ctx)?))
        .map(Value::Number)
}

fn divide_eval(args: &[Expression], ctx: &mut EvaluationContext<'_>) -> Result<Value, EvalError> {
    let a = evaluate_to_number(&args[0], ctx)?;
    let b = evaluate_to_number(&args[1], ctx)?;
    Ok(Value::Number(a / b))
}

fn mod_eval(args: &[Expression], ctx: &mut EvaluationContext<'_>) -> Result<Value, EvalError> {
    let a = evaluate_to_number(&args[0], ctx)?;
    let b = evaluate_to_number(&args[1], ctx)?;
    Ok(Value::Number(a % b))
}

fn pow_eval(args: &[Expression], ctx: &mut EvaluationContext<'_>) -> Result<Value, EvalError> {
    let a = evaluate_to_number(&args[0], ctx)?;
    let b = evaluate_to_number(&args[1], ctx)?;
    Ok(Value::Number(a.powf(b)))
}

fn sqrt_eval(args: &[Expression], ctx: &mut EvaluationContext<'_>) -> Result<Value, EvalError> {
    Ok(Value::Number(evaluate_to_number(&args[0], ctx)?.sqrt()))
}

fn ln_eval(args: &[Expression], ctx: &mut EvaluationContext<'_>) -> Result<Value, EvalError> {
    Ok(Value::Number(evaluate_to_number(&args[0], ctx)?.ln()))
}

fn abs_eval(args: &[Expression], ctx: &mut EvaluationContext<'_>) -> Result<Value, EvalError> {
    Ok(Value::Number(evaluate_to_number(&args[0], ctx)?.abs()))
}

fn round_eval(args: &[Expression], ctx: &mut EvaluationContext<'_>) -> Result<Value, EvalError> {
    Ok(Value::Number(evaluate_to_number(&args[0], ctx)?.round()))
}

fn floor_eval(args: &[Expression], ctx: &mut EvaluationContext<'_>) -> Result<Value, EvalError> {
    Ok(Value::Number(evaluate_to_number(&args[0], ctx)?.floor()))
}

fn ceil_eval(args: &[Expression], ctx: &mut EvaluationContext<'_>) -> Result<Value, EvalError> {
    Ok(Value::Number(evaluate_to_number(&args[0], ctx)?.ceil()))
}

fn min_eval(args: &[Expression], ctx: &mut EvaluationContext<'_>) -> Result<Value, EvalError> {
    args.iter()
        .try_fold(f64::INFINITY, |acc, e| {
            Ok(acc.min(evaluate_to_number(e, ctx)?))
        })
        .map(Value::Number)
}

fn max_eval(args: &[Expression], ctx: &mut EvaluationContext<'_>) -> Result<Value, EvalError> {
    args.iter()
        .try_fold(f64::NEG_INFINITY, |acc, e| {
            Ok(acc.max(evaluate_to_number(e, ctx)?))
        })
        .map(Value::Number)
}

fn e_eval(_args: &[Expression], _ctx: &mut EvaluationContext<'_>) -> Result<Value, EvalError> {
    Ok(Value::Number(std::f64::consts::E))
}

fn pi_eval(_args: &[Expression], _ctx: &mut EvaluationContext<'_>) -> Result<Value, EvalError> {
    Ok(Value::Number(std::f64::consts::PI))
}

pub fn operators() -> Vec<Arc<OperatorDefinition>> {
    vec![
        Arc::new(OperatorDefinition {
            name: "+",
            arity: Arity::AtLeast(2),
            eval: add_eval,
        }),
        Arc::new(OperatorDefinition {
            name: "-",
            arity: Arity::Range(1, 2),
            eval: subtract_eval,
        }),
        Arc::new(OperatorDefinition {
            name: "*",
            arity: Arity::AtLeast(2),
            eval: multiply_eval,
        }),
        Arc::new(OperatorDefinition {
            name: "/",
            arity: Arity::Fixed(2),
            eval: divide_eval,
        }),
        Arc::new(OperatorDefinition {
            name: "%",
            arity: Arity::Fixed(2),
            eval: mod_eval,
        }),
        Arc::new(OperatorDefinition {
            name: "^",
            arity: Arity::Fixed(2),
            eval: pow_eval,
        }),
        Arc::new(OperatorDefinition {
            name: "sqrt",
            arity: Arity::Fixed(1),
            eval: sqrt_eval,
        }),
        Arc::new(OperatorDefinition {
            name: "ln",
            arity: Arity::Fixed(1),
            eval: ln_eval,
        }),
        Arc::new(OperatorDefinition {
            name: "abs",
            arity: Arity::Fixed(1),
            eval: abs_eval,
        }),
        Arc::new(OperatorDefinition {
            name: "round",
            arity: Arity::Fixed(1),
            eval: round_eval,
        }),
        Arc::new(OperatorDefinition {
            name: "floor",
            arity: Arity::Fixed(1),
            eval: floor_eval,
        }),
        Arc::new(OperatorDefinition {
            name: "ceil",
            arity: Arity::Fixed(1),
            eval: ceil_eval,
        }),
        Arc::new(OperatorDefinition {
            name: "min",
            arity: Arity::AtLeast(2),
            eval: min_eval,
        }),
        Arc::new(OperatorDefinition {
            name: "max",
            arity: Arity::AtLeast(2),
            eval: max_eval,
        }),
        Arc::new(OperatorDefinition {
            name: "e",
            arity: Arity::Fixed(0),
            eval: e_eval,
        }),
        Arc::new(OperatorDefinition {
            name: "pi",
            arity: Arity::Fixed(0),
            eval: pi_eval,
        }),
    ]
}
