//! Classification of property expressions into their four runtime kinds,
//! and the top-level normalization entry point.

use serde_json::Value as JsonValue;

use crate::color::Color;
use crate::context::{Feature, GlobalProperties};
use crate::error::{EvalError, ParsingError};
use crate::expression::Expression;
use crate::function;
use crate::interpolate::{interpolation_factor, Interpolation};
use crate::is_constant::{is_feature_constant, is_zoom_constant};
use crate::operators::registry;
use crate::parser::{is_expression, parse_expression};
use crate::style_expression::{StyleExpression, StyleExpressionWithErrorHandling};
use crate::types::{FunctionMode, PropertySpec, SpecType};
use crate::value::Value;
use crate::zoom_curve::{find_zoom_curve, CurveSearch, ZOOM_NOT_TOP_LEVEL};

pub const PROPERTY_EXPRESSIONS_UNSUPPORTED: &str = "property expressions not supported";
pub const ZOOM_EXPRESSIONS_UNSUPPORTED: &str = "zoom expressions not supported";
pub const INTERPOLATE_UNSUPPORTED: &str =
    "\"interpolate\" expressions cannot be used with this property";

#[derive(Debug, Clone, Copy)]
pub struct ExpressionOptions {
    /// When set (the default), runtime failures are masked behind the
    /// specification's default value and logged once per distinct message.
    pub handle_errors: bool,
}

impl Default for ExpressionOptions {
    fn default() -> Self {
        ExpressionOptions {
            handle_errors: true,
        }
    }
}

/// A bound expression in either error mode.
#[derive(Debug)]
pub enum BoundExpression {
    Strict(StyleExpression),
    WithErrorHandling(StyleExpressionWithErrorHandling),
}

impl BoundExpression {
    pub fn evaluate(
        &mut self,
        globals: &GlobalProperties,
        feature: Option<&Feature>,
    ) -> Result<Value, EvalError> {
        match self {
            BoundExpression::Strict(expression) => expression.evaluate(globals, feature),
            BoundExpression::WithErrorHandling(expression) => {
                Ok(expression.evaluate(globals, feature))
            }
        }
    }
}

/// Parses `json` and binds it to `spec`.
pub fn create_expression(
    json: &JsonValue,
    spec: &PropertySpec,
    options: &ExpressionOptions,
) -> Result<BoundExpression, Vec<ParsingError>> {
    let expression = parse_expression(json, registry()).map_err(|error| vec![error])?;
    Ok(bind(expression, spec, options))
}

fn bind(expression: Expression, spec: &PropertySpec, options: &ExpressionOptions) -> BoundExpression {
    let style_expression = StyleExpression::new(expression, spec.clone());
    if options.handle_errors {
        BoundExpression::WithErrorHandling(StyleExpressionWithErrorHandling::new(style_expression))
    } else {
        BoundExpression::Strict(style_expression)
    }
}

/// The derived runtime kind of a property expression. Never set directly;
/// it falls out of the feature-constancy x zoom-constancy matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyExpressionKind {
    Constant,
    Source,
    Camera,
    Composite,
}

/// A zoom-independent property expression (`constant` or `source`).
#[derive(Debug)]
pub struct ZoomConstantExpression {
    evaluator: BoundExpression,
}

impl ZoomConstantExpression {
    pub fn evaluate(
        &mut self,
        globals: &GlobalProperties,
        feature: Option<&Feature>,
    ) -> Result<Value, EvalError> {
        self.evaluator.evaluate(globals, feature)
    }
}

/// A zoom-dependent property expression (`camera` or `composite`), carrying
/// the zoom curve's breakpoints and interpolation kind.
#[derive(Debug)]
pub struct ZoomDependentExpression {
    evaluator: BoundExpression,
    zoom_stops: Vec<f64>,
    interpolation: Option<Interpolation>,
}

impl ZoomDependentExpression {
    pub fn evaluate(
        &mut self,
        globals: &GlobalProperties,
        feature: Option<&Feature>,
    ) -> Result<Value, EvalError> {
        self.evaluator.evaluate(globals, feature)
    }

    pub fn zoom_stops(&self) -> &[f64] {
        &self.zoom_stops
    }

    pub fn interpolation(&self) -> Option<Interpolation> {
        self.interpolation
    }

    /// Normalized position of `input` between two breakpoints, unclamped.
    ///
    /// A `step` curve has no interpolation kind and always yields 0; callers
    /// must select outputs by stepwise lookup, not by blending.
    pub fn interpolation_factor(&self, input: f64, lower: f64, upper: f64) -> f64 {
        match self.interpolation {
            Some(interpolation) => interpolation_factor(interpolation, input, lower, upper),
            None => 0.0,
        }
    }
}

/// A classified style property expression.
#[derive(Debug)]
pub enum PropertyExpression {
    Constant(ZoomConstantExpression),
    Source(ZoomConstantExpression),
    Camera(ZoomDependentExpression),
    Composite(ZoomDependentExpression),
}

impl PropertyExpression {
    pub fn kind(&self) -> PropertyExpressionKind {
        match self {
            PropertyExpression::Constant(_) => PropertyExpressionKind::Constant,
            PropertyExpression::Source(_) => PropertyExpressionKind::Source,
            PropertyExpression::Camera(_) => PropertyExpressionKind::Camera,
            PropertyExpression::Composite(_) => PropertyExpressionKind::Composite,
        }
    }

    pub fn evaluate(
        &mut self,
        globals: &GlobalProperties,
        feature: Option<&Feature>,
    ) -> Result<Value, EvalError> {
        match self {
            PropertyExpression::Constant(e) | PropertyExpression::Source(e) => {
                e.evaluate(globals, feature)
            }
            PropertyExpression::Camera(e) | PropertyExpression::Composite(e) => {
                e.evaluate(globals, feature)
            }
        }
    }

    /// Zoom-curve breakpoints; `None` for zoom-independent kinds.
    pub fn zoom_stops(&self) -> Option<&[f64]> {
        match self {
            PropertyExpression::Camera(e) | PropertyExpression::Composite(e) => {
                Some(e.zoom_stops())
            }
            _ => None,
        }
    }

    /// See [`ZoomDependentExpression::interpolation_factor`]; `None` for
    /// zoom-independent kinds.
    pub fn interpolation_factor(&self, input: f64, lower: f64, upper: f64) -> Option<f64> {
        match self {
            PropertyExpression::Camera(e) | PropertyExpression::Composite(e) => {
                Some(e.interpolation_factor(input, lower, upper))
            }
            _ => None,
        }
    }
}

/// Parses, validates and classifies a property expression.
///
/// Classification is the expensive step and runs once per property per
/// style; evaluation of the returned wrapper is the per-feature hot path.
pub fn create_property_expression(
    json: &JsonValue,
    spec: &PropertySpec,
    options: &ExpressionOptions,
) -> Result<PropertyExpression, Vec<ParsingError>> {
    let expression = parse_expression(json, registry()).map_err(|error| vec![error])?;

    let feature_constant = is_feature_constant(&expression);
    let zoom_constant = is_zoom_constant(&expression);
    if !feature_constant && !spec.property_function {
        return Err(vec![ParsingError::new("", PROPERTY_EXPRESSIONS_UNSUPPORTED)]);
    }
    if !zoom_constant && !spec.zoom_function {
        return Err(vec![ParsingError::new("", ZOOM_EXPRESSIONS_UNSUPPORTED)]);
    }

    let curve = match find_zoom_curve(&expression) {
        CurveSearch::Error(error) => return Err(vec![error]),
        CurveSearch::NotFound if !zoom_constant => {
            // Zoom is referenced but never drives a qualifying curve.
            return Err(vec![ParsingError::new("", ZOOM_NOT_TOP_LEVEL)]);
        }
        CurveSearch::NotFound => None,
        CurveSearch::Found(curve) => {
            if curve.interpolation().is_some()
                && spec.function_mode == FunctionMode::PiecewiseConstant
            {
                return Err(vec![ParsingError::new("", INTERPOLATE_UNSUPPORTED)]);
            }
            Some((curve.stop_labels().unwrap_or_default(), curve.interpolation()))
        }
    };

    let evaluator = bind(expression, spec, options);
    Ok(match curve {
        None if feature_constant => {
            PropertyExpression::Constant(ZoomConstantExpression { evaluator })
        }
        None => PropertyExpression::Source(ZoomConstantExpression { evaluator }),
        Some((zoom_stops, interpolation)) => {
            let zoom_dependent = ZoomDependentExpression {
                evaluator,
                zoom_stops,
                interpolation,
            };
            if feature_constant {
                PropertyExpression::Camera(zoom_dependent)
            } else {
                PropertyExpression::Composite(zoom_dependent)
            }
        }
    })
}

/// Dispatches a raw property value to legacy-function compilation,
/// expression classification or literal-constant wrapping.
///
/// Raw values reaching this point have passed schema validation, so a
/// classification failure is a programming-invariant violation and panics
/// rather than returning an error.
pub fn normalize_property_expression(raw: &JsonValue, spec: &PropertySpec) -> PropertyExpression {
    if function::is_legacy_function(raw) {
        return match function::compile_legacy_function(raw, spec) {
            Ok(expression) => expression,
            Err(error) => panic!(
                "invalid legacy function (schema validation should have rejected it): {}",
                error
            ),
        };
    }
    if is_expression(raw, registry()) {
        return match create_property_expression(raw, spec, &ExpressionOptions::default()) {
            Ok(expression) => expression,
            Err(errors) => panic!(
                "invalid property expression (schema validation should have rejected it): {}",
                errors
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; ")
            ),
        };
    }

    let value = match raw {
        JsonValue::String(s) if spec.kind == SpecType::Color => match Color::parse(s) {
            Some(color) => Value::Color(color),
            None => panic!(
                "invalid color literal {:?} (schema validation should have rejected it)",
                s
            ),
        },
        other => Value::from_json(other),
    };
    let evaluator = BoundExpression::Strict(StyleExpression::new(
        Expression::Literal(value),
        spec.clone(),
    ));
    PropertyExpression::Constant(ZoomConstantExpression { evaluator })
}
