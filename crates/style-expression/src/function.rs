//! Legacy stops-style function shorthand.
//!
//! Pre-expression styles describe ramps as JSON objects:
//! `{"property": "p", "type": "exponential", "base": 2, "stops": [[0, 1], [10, 4]]}`.
//! Compilation rewrites the shorthand into an equivalent tagged-array
//! expression and runs it through the ordinary classifier, so legacy
//! functions get the same runtime wrappers as modern expressions.

use serde_json::{json, Map, Value as JsonValue};

use crate::error::ParsingError;
use crate::property_expression::{
    create_property_expression, ExpressionOptions, PropertyExpression,
};
use crate::types::{FunctionMode, PropertySpec, SpecType};

/// Whether a raw property value is the legacy function shorthand.
pub fn is_legacy_function(raw: &JsonValue) -> bool {
    match raw {
        JsonValue::Object(map) => {
            map.contains_key("stops")
                || map.get("type").and_then(JsonValue::as_str) == Some("identity")
        }
        _ => false,
    }
}

/// Compiles a legacy function object into a classified property expression.
pub fn compile_legacy_function(
    raw: &JsonValue,
    spec: &PropertySpec,
) -> Result<PropertyExpression, ParsingError> {
    let map = match raw {
        JsonValue::Object(map) => map,
        _ => return Err(ParsingError::new("", "Legacy functions must be objects.")),
    };
    let expression = convert_legacy_function(map, spec)?;
    create_property_expression(&expression, spec, &ExpressionOptions::default()).map_err(|errors| {
        ParsingError::new(
            "",
            errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; "),
        )
    })
}

fn convert_legacy_function(
    map: &Map<String, JsonValue>,
    spec: &PropertySpec,
) -> Result<JsonValue, ParsingError> {
    let property = map.get("property").and_then(JsonValue::as_str);
    let function_type = match map.get("type").and_then(JsonValue::as_str) {
        Some(t) => t.to_string(),
        None => default_function_type(spec).to_string(),
    };

    if function_type == "identity" {
        let property = property.ok_or_else(|| {
            ParsingError::new("", "\"identity\" functions require a \"property\".")
        })?;
        return Ok(json!(["get", property]));
    }

    let stops = parse_stops(map)?;
    let base = map.get("base").and_then(JsonValue::as_f64).unwrap_or(1.0);
    let default = map.get("default");

    if stops
        .first()
        .map(|(input, _)| input.is_object())
        .unwrap_or(false)
    {
        return convert_composite_function(&function_type, &stops, base, property);
    }

    let input = match property {
        Some(property) => json!(["get", property]),
        None => json!(["zoom"]),
    };
    let expression = match function_type.as_str() {
        "exponential" => convert_exponential(&input, &stops, base),
        "interval" => convert_interval(&input, &stops),
        "categorical" => convert_categorical(&input, &stops, default),
        other => {
            return Err(ParsingError::new(
                "",
                format!("Unknown function type {:?}.", other),
            ))
        }
    };

    // A declared default only matters for data-driven curves, where the
    // property may be missing or non-numeric. Categorical functions already
    // fold it in as the fallback branch.
    if let (Some(property), Some(default)) = (property, default) {
        if function_type != "categorical" {
            return Ok(json!([
                "case",
                ["==", ["typeof", ["get", property]], "number"],
                expression,
                literal(default)
            ]));
        }
    }
    Ok(expression)
}

/// Legacy styles omit the type for interpolatable properties; everything
/// else steps.
fn default_function_type(spec: &PropertySpec) -> &'static str {
    let interpolatable = matches!(
        spec.kind,
        SpecType::Number | SpecType::Color | SpecType::Array
    );
    if interpolatable && spec.function_mode == FunctionMode::Interpolated {
        "exponential"
    } else {
        "interval"
    }
}

fn parse_stops(map: &Map<String, JsonValue>) -> Result<Vec<(JsonValue, JsonValue)>, ParsingError> {
    let stops = map
        .get("stops")
        .and_then(JsonValue::as_array)
        .ok_or_else(|| ParsingError::new("", "Legacy functions require a \"stops\" array."))?;
    if stops.is_empty() {
        return Err(ParsingError::new("", "\"stops\" must not be empty."));
    }
    stops
        .iter()
        .map(|stop| match stop.as_array() {
            Some(pair) if pair.len() == 2 => Ok((pair[0].clone(), pair[1].clone())),
            _ => Err(ParsingError::new(
                "",
                "Each stop must be a two-element [input, output] array.",
            )),
        })
        .collect()
}

fn convert_exponential(input: &JsonValue, stops: &[(JsonValue, JsonValue)], base: f64) -> JsonValue {
    let mut expression = vec![
        json!("interpolate"),
        json!(["exponential", base]),
        input.clone(),
    ];
    for (stop_input, output) in stops {
        expression.push(stop_input.clone());
        expression.push(literal(output));
    }
    JsonValue::Array(expression)
}

fn convert_interval(input: &JsonValue, stops: &[(JsonValue, JsonValue)]) -> JsonValue {
    // A single stop has nothing to step between.
    if stops.len() == 1 {
        return literal(&stops[0].1);
    }
    let mut expression = vec![json!("step"), input.clone(), literal(&stops[0].1)];
    for (stop_input, output) in &stops[1..] {
        expression.push(stop_input.clone());
        expression.push(literal(output));
    }
    JsonValue::Array(expression)
}

fn convert_categorical(
    input: &JsonValue,
    stops: &[(JsonValue, JsonValue)],
    default: Option<&JsonValue>,
) -> JsonValue {
    let mut expression = vec![json!("case")];
    for (stop_input, output) in stops {
        expression.push(json!(["==", input, literal(stop_input)]));
        expression.push(literal(output));
    }
    expression.push(default.map(literal).unwrap_or(JsonValue::Null));
    JsonValue::Array(expression)
}

/// Composite stops label both zoom and property value: group by zoom level
/// into an outer zoom curve whose outputs are inner data-driven curves.
fn convert_composite_function(
    function_type: &str,
    stops: &[(JsonValue, JsonValue)],
    base: f64,
    property: Option<&str>,
) -> Result<JsonValue, ParsingError> {
    let property = property.ok_or_else(|| {
        ParsingError::new("", "Composite functions require a \"property\".")
    })?;
    let input = json!(["get", property]);

    // Grouped stops, in the zoom order the style declared them.
    let mut zoom_levels: Vec<f64> = Vec::new();
    let mut grouped: Vec<Vec<(JsonValue, JsonValue)>> = Vec::new();
    for (stop_input, output) in stops {
        let (zoom, value) = match (
            stop_input.get("zoom").and_then(JsonValue::as_f64),
            stop_input.get("value"),
        ) {
            (Some(zoom), Some(value)) => (zoom, value),
            _ => {
                return Err(ParsingError::new(
                    "",
                    "Composite stop inputs must be {\"zoom\": ..., \"value\": ...} objects.",
                ))
            }
        };
        match zoom_levels.iter().position(|z| *z == zoom) {
            Some(index) => grouped[index].push((value.clone(), output.clone())),
            None => {
                zoom_levels.push(zoom);
                grouped.push(vec![(value.clone(), output.clone())]);
            }
        }
    }

    let inner = |stops: &[(JsonValue, JsonValue)]| match function_type {
        "exponential" => Ok(convert_exponential(&input, stops, base)),
        "interval" => Ok(convert_interval(&input, stops)),
        "categorical" => Ok(convert_categorical(&input, stops, None)),
        other => Err(ParsingError::new(
            "",
            format!("Unknown function type {:?}.", other),
        )),
    };

    // A single zoom level degenerates to a plain data-driven curve.
    if zoom_levels.len() == 1 {
        return inner(&grouped[0]);
    }

    if function_type == "exponential" {
        let mut expression = vec![
            json!("interpolate"),
            json!(["exponential", base]),
            json!(["zoom"]),
        ];
        for (zoom, group) in zoom_levels.iter().zip(&grouped) {
            expression.push(json!(zoom));
            expression.push(inner(group)?);
        }
        Ok(JsonValue::Array(expression))
    } else {
        // Stepwise outer curve: the first group is the below-first-stop output.
        let mut expression = vec![json!("step"), json!(["zoom"]), inner(&grouped[0])?];
        for (zoom, group) in zoom_levels[1..].iter().zip(&grouped[1..]) {
            expression.push(json!(zoom));
            expression.push(inner(group)?);
        }
        Ok(JsonValue::Array(expression))
    }
}

/// Wraps raw JSON for use as an expression operand: arrays and objects need
/// the `literal` form or they would parse as expressions.
fn literal(raw: &JsonValue) -> JsonValue {
    match raw {
        JsonValue::Array(_) | JsonValue::Object(_) => json!(["literal", raw]),
        other => other.clone(),
    }
}
