//! Style property expressions for map rendering.
//!
//! # Overview
//!
//! This crate compiles and evaluates a declarative expression language
//! embedded in map styles: JSON tagged arrays of the form
//! `[operator, ...operands]` that compute per-feature style property values
//! (color, size, opacity, ...) as a function of zoom level and feature
//! attributes. Classification runs once per property per style load;
//! evaluation runs per rendered feature and avoids re-analysis and
//! allocation.
//!
//! # Example
//!
//! ```
//! use style_expression::{
//!     create_property_expression, ExpressionOptions, GlobalProperties,
//!     PropertyExpressionKind, PropertySpec, SpecType, Value,
//! };
//! use serde_json::json;
//!
//! let spec = PropertySpec::new(SpecType::Number);
//! let json = json!(["interpolate", ["linear"], ["zoom"], 0, 10, 10, 20]);
//! let mut property =
//!     create_property_expression(&json, &spec, &ExpressionOptions::default()).unwrap();
//!
//! assert_eq!(property.kind(), PropertyExpressionKind::Camera);
//! let value = property.evaluate(&GlobalProperties::new(5.0), None).unwrap();
//! assert_eq!(value, Value::Number(15.0));
//! ```

pub mod color;
pub mod context;
pub mod error;
pub mod expression;
pub mod function;
pub mod interpolate;
pub mod is_constant;
pub mod operators;
pub mod parser;
pub mod property_expression;
pub mod style_expression;
pub mod types;
pub mod value;
pub mod zoom_curve;

// Re-export the core public API
pub use color::Color;
pub use context::{EvaluationContext, Feature, GlobalProperties};
pub use error::{EvalError, ParsingError};
pub use expression::Expression;
pub use function::{compile_legacy_function, is_legacy_function};
pub use interpolate::{interpolation_factor, Interpolation};
pub use is_constant::{is_feature_constant, is_global_property_constant, is_zoom_constant};
pub use property_expression::{
    create_expression, create_property_expression, normalize_property_expression,
    BoundExpression, ExpressionOptions, PropertyExpression, PropertyExpressionKind,
    ZoomConstantExpression, ZoomDependentExpression,
};
pub use style_expression::{StyleExpression, StyleExpressionWithErrorHandling};
pub use types::{FunctionMode, PropertySpec, SpecType};
pub use value::Value;
pub use zoom_curve::{find_zoom_curve, CurveSearch};
