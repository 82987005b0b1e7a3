//! Operators reading feature data and non-zoom globals.

use std::sync::Arc;

use crate::context::EvaluationContext;
use crate::error::EvalError;
use crate::expression::Expression;
use crate::operators::{Arity, OperatorDefinition};
use crate::value::Value;

/// Operator names whose presence makes an expression feature-dependent.
/// The feature-constancy predicate matches against this set.
pub const FEATURE_DEPENDENT_OPERATORS: &[&str] =
    &["get", "has", "id", "geometry-type", "properties"];

fn property_name(
    args: &[Expression],
    ctx: &mut EvaluationContext<'_>,
) -> Result<String, EvalError> {
    let value = args[0].evaluate(ctx)?;
    match value {
        Value::String(s) => Ok(s),
        other => Err(EvalError::type_mismatch("string", &other)),
    }
}

fn get_eval(args: &[Expression], ctx: &mut EvaluationContext<'_>) -> Result<Value, EvalError> {
    let name = property_name(args, ctx)?;
    Ok(ctx
        .feature
        .and_then(|f| f.properties.get(&name))
        .map(Value::from_json)
        .unwrap_or(Value::Null))
}

fn has_eval(args: &[Expression], ctx: &mut EvaluationContext<'_>) -> Result<Value, EvalError> {
    let name = property_name(args, ctx)?;
    Ok(Value::Bool(
        ctx.feature.is_some_and(|f| f.properties.contains_key(&name)),
    ))
}

fn id_eval(_args: &[Expression], ctx: &mut EvaluationContext<'_>) -> Result<Value, EvalError> {
    Ok(ctx
        .feature
        .and_then(|f| f.id.as_ref())
        .map(Value::from_json)
        .unwrap_or(Value::Null))
}

fn geometry_type_eval(
    _args: &[Expression],
    ctx: &mut EvaluationContext<'_>,
) -> Result<Value, EvalError> {
    Ok(ctx
        .feature
        .map(|f| Value::String(f.geometry_type.clone()))
        .unwrap_or(Value::Null))
}

fn properties_eval(
    _args: &[Expression],
    ctx: &mut EvaluationContext<'_>,
) -> Result<Value, EvalError> {
    Ok(ctx
        .feature
        .map(|f| Value::Object(f.properties.clone()))
        .unwrap_or(Value::Null))
}

fn heatmap_density_eval(
    _args: &[Expression],
    ctx: &mut EvaluationContext<'_>,
) -> Result<Value, EvalError> {
    Ok(Value::Number(ctx.globals.heatmap_density.unwrap_or(0.0)))
}

pub fn operators() -> Vec<Arc<OperatorDefinition>> {
    vec![
        Arc::new(OperatorDefinition {
            name: "get",
            arity: Arity::Fixed(1),
            eval: get_eval,
        }),
        Arc::new(OperatorDefinition {
            name: "has",
            arity: Arity::Fixed(1),
            eval: has_eval,
        }),
        Arc::new(OperatorDefinition {
            name: "id",
            arity: Arity::Fixed(0),
            eval: id_eval,
        }),
        Arc::new(OperatorDefinition {
            name: "geometry-type",
            arity: Arity::Fixed(0),
            eval: geometry_type_eval,
        }),
        Arc::new(OperatorDefinition {
            name: "properties",
            arity: Arity::Fixed(0),
            eval: properties_eval,
        }),
        Arc::new(OperatorDefinition {
            name: "heatmap-density",
            arity: Arity::Fixed(0),
            eval: heatmap_density_eval,
        }),
    ]
}
