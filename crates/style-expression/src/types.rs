//! Property specifications and the result coercion they imply.

use serde_json::Value as JsonValue;

use crate::color::Color;
use crate::error::EvalError;
use crate::value::Value;

/// The declared type of a style property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecType {
    Color,
    String,
    Number,
    Boolean,
    Enum,
    Array,
}

impl SpecType {
    pub fn name(&self) -> &'static str {
        match self {
            SpecType::Color => "color",
            SpecType::String => "string",
            SpecType::Number => "number",
            SpecType::Boolean => "boolean",
            SpecType::Enum => "enum",
            SpecType::Array => "array",
        }
    }
}

/// How a property may vary across zoom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FunctionMode {
    /// Values may be interpolated between zoom stops.
    #[default]
    Interpolated,
    /// Only stepwise (`step`) zoom curves are legal.
    PiecewiseConstant,
}

/// Schema entry for one style property: type, default and the permitted
/// function modes. Supplied once per property, immutable thereafter.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySpec {
    pub kind: SpecType,
    /// Raw declared default. For legacy styles this may itself be a
    /// stops-function object, which cannot serve as an evaluation fallback.
    pub default: Option<JsonValue>,
    /// Permitted members for `enum`-typed properties, in declaration order.
    pub values: Vec<String>,
    pub property_function: bool,
    pub zoom_function: bool,
    pub function_mode: FunctionMode,
    /// Element type for `array`-typed properties.
    pub element: Option<SpecType>,
    /// Fixed length for `array`-typed properties.
    pub length: Option<usize>,
}

impl PropertySpec {
    pub fn new(kind: SpecType) -> Self {
        PropertySpec {
            kind,
            default: None,
            values: Vec::new(),
            property_function: true,
            zoom_function: true,
            function_mode: FunctionMode::default(),
            element: None,
            length: None,
        }
    }
}

/// Coerces an evaluated value to the specification's type.
///
/// `Null` passes through untouched; the error-tolerant layer decides what a
/// missing value means. Color-typed specs parse string results; every other
/// mismatch is a runtime type error.
pub fn coerce(value: Value, spec: &PropertySpec) -> Result<Value, EvalError> {
    if value.is_null() {
        return Ok(value);
    }
    match spec.kind {
        SpecType::Color => match value {
            Value::Color(_) => Ok(value),
            Value::String(s) => match Color::parse(&s) {
                Some(color) => Ok(Value::Color(color)),
                None => Err(EvalError::InvalidColor(s)),
            },
            other => Err(EvalError::type_mismatch("color", &other)),
        },
        SpecType::Number => match value {
            Value::Number(_) => Ok(value),
            other => Err(EvalError::type_mismatch("number", &other)),
        },
        SpecType::Boolean => match value {
            Value::Bool(_) => Ok(value),
            other => Err(EvalError::type_mismatch("boolean", &other)),
        },
        // Enum membership is checked by the error-tolerant evaluator, which
        // knows the permitted set; here an enum value is just a string.
        SpecType::String | SpecType::Enum => match value {
            Value::String(_) => Ok(value),
            other => Err(EvalError::type_mismatch("string", &other)),
        },
        SpecType::Array => match value {
            Value::Array(items) => {
                if let Some(length) = spec.length {
                    if items.len() != length {
                        return Err(EvalError::InvalidValue(format!(
                            "Expected an array of length {}, but found length {} instead.",
                            length,
                            items.len()
                        )));
                    }
                }
                if let Some(element) = spec.element {
                    for item in &items {
                        let ok = match element {
                            SpecType::Number => matches!(item, Value::Number(_)),
                            SpecType::String | SpecType::Enum => matches!(item, Value::String(_)),
                            SpecType::Boolean => matches!(item, Value::Bool(_)),
                            _ => true,
                        };
                        if !ok {
                            return Err(EvalError::type_mismatch(element.name(), item));
                        }
                    }
                }
                Ok(Value::Array(items))
            }
            other => Err(EvalError::type_mismatch("array", &other)),
        },
    }
}
