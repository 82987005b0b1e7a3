//! Binding expressions to property specifications, strict and lenient.

use std::collections::HashSet;

use serde_json::Value as JsonValue;

use crate::color::Color;
use crate::context::{EvaluationContext, Feature, GlobalProperties};
use crate::error::EvalError;
use crate::expression::Expression;
use crate::types::{coerce, PropertySpec, SpecType};
use crate::value::Value;

/// A parsed expression paired with its property specification.
///
/// Evaluation is strict: any runtime failure propagates to the caller.
/// The binder owns a reusable let-binding scratch stack, so the hot path
/// allocates only when an evaluation actually pushes bindings deeper than
/// any previous one. `evaluate` takes `&mut self`; a binder must not be
/// shared between concurrent evaluations — use one instance per worker.
#[derive(Debug)]
pub struct StyleExpression {
    expression: Expression,
    spec: PropertySpec,
    scope: Vec<(String, Value)>,
}

impl StyleExpression {
    pub fn new(expression: Expression, spec: PropertySpec) -> Self {
        StyleExpression {
            expression,
            spec,
            scope: Vec::new(),
        }
    }

    pub fn evaluate(
        &mut self,
        globals: &GlobalProperties,
        feature: Option<&Feature>,
    ) -> Result<Value, EvalError> {
        let mut ctx = EvaluationContext::new(globals, feature, &mut self.scope);
        let value = self.expression.evaluate(&mut ctx)?;
        coerce(value, &self.spec)
    }

    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    pub fn spec(&self) -> &PropertySpec {
        &self.spec
    }
}

/// Error-tolerant wrapper around [`StyleExpression`].
///
/// Failures, null results and out-of-set enum values are masked behind a
/// precomputed default; each distinct failure message is logged once per
/// instance.
#[derive(Debug)]
pub struct StyleExpressionWithErrorHandling {
    inner: StyleExpression,
    default_value: Value,
    enum_values: Option<Vec<String>>,
    warning_history: HashSet<String>,
}

impl StyleExpressionWithErrorHandling {
    pub fn new(inner: StyleExpression) -> Self {
        let spec = inner.spec();
        let default_value = default_for_spec(spec);
        let enum_values =
            (spec.kind == SpecType::Enum && !spec.values.is_empty()).then(|| spec.values.clone());
        StyleExpressionWithErrorHandling {
            inner,
            default_value,
            enum_values,
            warning_history: HashSet::new(),
        }
    }

    pub fn evaluate(&mut self, globals: &GlobalProperties, feature: Option<&Feature>) -> Value {
        match self.inner.evaluate(globals, feature) {
            Ok(Value::Null) => self.default_value.clone(),
            Ok(value) => {
                if let Some(values) = &self.enum_values {
                    let permitted =
                        matches!(&value, Value::String(s) if values.iter().any(|v| v == s));
                    if !permitted {
                        let message = format!(
                            "Expected value to be one of {}, but found {} instead.",
                            values
                                .iter()
                                .map(|v| format!("{:?}", v))
                                .collect::<Vec<_>>()
                                .join(", "),
                            value.to_json()
                        );
                        self.warn(message);
                        return self.default_value.clone();
                    }
                }
                value
            }
            Err(error) => {
                self.warn(error.to_string());
                self.default_value.clone()
            }
        }
    }

    pub fn default_value(&self) -> &Value {
        &self.default_value
    }

    /// Number of distinct warnings emitted so far by this instance.
    pub fn warning_count(&self) -> usize {
        self.warning_history.len()
    }

    fn warn(&mut self, message: String) {
        if self.warning_history.insert(message.clone()) {
            tracing::warn!(target: "style_expression", "{}", message);
        }
    }
}

/// Fallback value substituted when lenient evaluation fails.
///
/// A color spec whose declared default is itself a function object gets
/// fully transparent black, since a function cannot be evaluated at error
/// time.
fn default_for_spec(spec: &PropertySpec) -> Value {
    let Some(default) = &spec.default else {
        return Value::Null;
    };
    if spec.kind == SpecType::Color {
        return match default {
            JsonValue::Object(_) => Value::Color(Color::TRANSPARENT),
            JsonValue::String(s) => Color::parse(s).map(Value::Color).unwrap_or(Value::Null),
            other => Value::from_json(other),
        };
    }
    Value::from_json(default)
}
