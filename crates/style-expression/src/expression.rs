//! The parsed expression tree and its evaluation.

use std::sync::Arc;

use crate::context::EvaluationContext;
use crate::error::EvalError;
use crate::interpolate::{interpolate_value, interpolation_factor, Interpolation};
use crate::operators::OperatorDefinition;
use crate::value::Value;

/// A typed, immutable expression node.
///
/// The variant set is closed: the zoom-curve finder and the constancy
/// predicates pattern-match only `Zoom`, `Let`, `Coalesce`, `Step` and
/// `Interpolate`; every builtin operator lives behind `Compound`, so new
/// operators never touch the structural analyses.
#[derive(Debug)]
pub enum Expression {
    Literal(Value),
    /// The zoom global. A distinct variant because curve discovery must
    /// recognize it without indirection.
    Zoom,
    /// A `let`-bound variable reference.
    Var(String),
    Let {
        bindings: Vec<(String, Expression)>,
        result: Box<Expression>,
    },
    Coalesce(Vec<Expression>),
    Step {
        input: Box<Expression>,
        /// Output for inputs below the first stop label.
        first: Box<Expression>,
        stops: Vec<(f64, Expression)>,
    },
    Interpolate {
        interpolation: Interpolation,
        input: Box<Expression>,
        stops: Vec<(f64, Expression)>,
    },
    Compound {
        definition: Arc<OperatorDefinition>,
        args: Vec<Expression>,
    },
}

impl Expression {
    pub fn evaluate(&self, ctx: &mut EvaluationContext<'_>) -> Result<Value, EvalError> {
        match self {
            Expression::Literal(value) => Ok(value.clone()),
            Expression::Zoom => Ok(Value::Number(ctx.globals.zoom)),
            Expression::Var(name) => ctx
                .lookup(name)
                .cloned()
                .ok_or_else(|| EvalError::UnboundVariable(name.clone())),
            Expression::Let { bindings, result } => {
                let depth = ctx.scope_depth();
                for (name, expression) in bindings {
                    let value = expression.evaluate(ctx)?;
                    ctx.push_binding(name, value);
                }
                let value = result.evaluate(ctx);
                ctx.truncate_scope(depth);
                value
            }
            Expression::Coalesce(args) => {
                for arg in args {
                    let value = arg.evaluate(ctx)?;
                    if !value.is_null() {
                        return Ok(value);
                    }
                }
                Ok(Value::Null)
            }
            Expression::Step {
                input,
                first,
                stops,
            } => {
                let x = evaluate_to_number(input, ctx)?;
                let index = stops.partition_point(|(label, _)| *label <= x);
                if index == 0 {
                    first.evaluate(ctx)
                } else {
                    stops[index - 1].1.evaluate(ctx)
                }
            }
            Expression::Interpolate {
                interpolation,
                input,
                stops,
            } => {
                let x = evaluate_to_number(input, ctx)?;
                if x <= stops[0].0 {
                    return stops[0].1.evaluate(ctx);
                }
                let (last_label, last_output) = &stops[stops.len() - 1];
                if x >= *last_label {
                    return last_output.evaluate(ctx);
                }
                let index = stops.partition_point(|(label, _)| *label <= x);
                let (lower_label, lower_output) = &stops[index - 1];
                let (upper_label, upper_output) = &stops[index];
                let t = interpolation_factor(*interpolation, x, *lower_label, *upper_label);
                let lower = lower_output.evaluate(ctx)?;
                let upper = upper_output.evaluate(ctx)?;
                interpolate_value(&lower, &upper, t)
            }
            Expression::Compound { definition, args } => (definition.eval)(args, ctx),
        }
    }

    /// Visits every direct child, in declaration order.
    pub fn visit_children<'a>(&'a self, f: &mut dyn FnMut(&'a Expression)) {
        match self {
            Expression::Literal(_) | Expression::Zoom | Expression::Var(_) => {}
            Expression::Let { bindings, result } => {
                for (_, expression) in bindings {
                    f(expression);
                }
                f(result);
            }
            Expression::Coalesce(args) => {
                for arg in args {
                    f(arg);
                }
            }
            Expression::Step {
                input,
                first,
                stops,
            } => {
                f(input);
                f(first);
                for (_, output) in stops {
                    f(output);
                }
            }
            Expression::Interpolate { input, stops, .. } => {
                f(input);
                for (_, output) in stops {
                    f(output);
                }
            }
            Expression::Compound { args, .. } => {
                for arg in args {
                    f(arg);
                }
            }
        }
    }

    /// Stop labels of a `step`/`interpolate` node; `None` for anything else.
    pub fn stop_labels(&self) -> Option<Vec<f64>> {
        match self {
            Expression::Step { stops, .. } | Expression::Interpolate { stops, .. } => {
                Some(stops.iter().map(|(label, _)| *label).collect())
            }
            _ => None,
        }
    }

    /// Interpolation kind of an `interpolate` node; `None` for `step` and
    /// every non-curve node.
    pub fn interpolation(&self) -> Option<Interpolation> {
        match self {
            Expression::Interpolate { interpolation, .. } => Some(*interpolation),
            _ => None,
        }
    }
}

pub(crate) fn evaluate_to_number(
    expression: &Expression,
    ctx: &mut EvaluationContext<'_>,
) -> Result<f64, EvalError> {
    let value = expression.evaluate(ctx)?;
    value
        .as_number()
        .ok_or_else(|| EvalError::type_mismatch("number", &value))
}
