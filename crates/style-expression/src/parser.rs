//! Recursive-descent parser: raw JSON tagged arrays to typed expression trees.
//!
//! Structural validation happens here, once per style load: operator
//! existence, arity, stop-label ordering and binding-name validity. The
//! evaluation hot path never re-checks any of it.

use serde_json::Value as JsonValue;

use crate::error::ParsingError;
use crate::expression::Expression;
use crate::interpolate::Interpolation;
use crate::operators::{assert_arity, Arity, OperatorMap};
use crate::value::Value;

/// Forms handled directly by the parser rather than the operator registry.
const SPECIAL_FORMS: &[&str] = &[
    "literal",
    "zoom",
    "var",
    "let",
    "coalesce",
    "step",
    "interpolate",
];

/// Whether a raw value is a tagged array naming a known operator.
pub fn is_expression(json: &JsonValue, operators: &OperatorMap) -> bool {
    match json {
        JsonValue::Array(arr) => match arr.first() {
            Some(JsonValue::String(name)) => {
                SPECIAL_FORMS.contains(&name.as_str()) || operators.contains_key(name.as_str())
            }
            _ => false,
        },
        _ => false,
    }
}

pub fn parse_expression(
    json: &JsonValue,
    operators: &OperatorMap,
) -> Result<Expression, ParsingError> {
    parse(json, "", operators)
}

fn parse(json: &JsonValue, key: &str, operators: &OperatorMap) -> Result<Expression, ParsingError> {
    let arr = match json {
        JsonValue::Null
        | JsonValue::Bool(_)
        | JsonValue::Number(_)
        | JsonValue::String(_) => return Ok(Expression::Literal(Value::from_json(json))),
        JsonValue::Object(_) => {
            return Err(ParsingError::new(
                key,
                "Bare objects are not valid expressions; use [\"literal\", {...}] instead.",
            ))
        }
        JsonValue::Array(arr) => arr,
    };
    if arr.is_empty() {
        return Err(ParsingError::new(
            key,
            "Expected an array with at least one element.",
        ));
    }
    let name = match &arr[0] {
        JsonValue::String(s) => s.as_str(),
        other => {
            return Err(ParsingError::new(
                key,
                format!(
                    "Expression name must be a string, but found {} instead.",
                    json_type_name(other)
                ),
            ))
        }
    };
    let operands = &arr[1..];
    match name {
        "literal" => {
            check_arity(key, name, &Arity::Fixed(1), operands.len())?;
            Ok(Expression::Literal(Value::from_json(&operands[0])))
        }
        "zoom" => {
            check_arity(key, name, &Arity::Fixed(0), operands.len())?;
            Ok(Expression::Zoom)
        }
        "var" => {
            check_arity(key, name, &Arity::Fixed(1), operands.len())?;
            let var = binding_name(&operands[0], &child_key(key, 1))?;
            Ok(Expression::Var(var))
        }
        "let" => parse_let(key, operands, operators),
        "coalesce" => {
            check_arity(key, name, &Arity::AtLeast(1), operands.len())?;
            let args = operands
                .iter()
                .enumerate()
                .map(|(i, operand)| parse(operand, &child_key(key, i + 1), operators))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Expression::Coalesce(args))
        }
        "step" => parse_step(key, operands, operators),
        "interpolate" => parse_interpolate(key, operands, operators),
        _ => {
            let definition = operators.get(name).ok_or_else(|| {
                ParsingError::new(
                    key,
                    format!(
                        "Unknown expression \"{}\". If you wanted a literal array, use [\"literal\", [...]].",
                        name
                    ),
                )
            })?;
            check_arity(key, name, &definition.arity, operands.len())?;
            let args = operands
                .iter()
                .enumerate()
                .map(|(i, operand)| parse(operand, &child_key(key, i + 1), operators))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Expression::Compound {
                definition: definition.clone(),
                args,
            })
        }
    }
}

fn parse_let(
    key: &str,
    operands: &[JsonValue],
    operators: &OperatorMap,
) -> Result<Expression, ParsingError> {
    if operands.len() < 3 || operands.len() % 2 == 0 {
        return Err(ParsingError::new(
            key,
            "\"let\" expression expects an even number of binding arguments followed by a result.",
        ));
    }
    let mut bindings = Vec::with_capacity(operands.len() / 2);
    for (i, pair) in operands[..operands.len() - 1].chunks(2).enumerate() {
        let name = binding_name(&pair[0], &child_key(key, i * 2 + 1))?;
        let value = parse(&pair[1], &child_key(key, i * 2 + 2), operators)?;
        bindings.push((name, value));
    }
    let result = parse(
        &operands[operands.len() - 1],
        &child_key(key, operands.len()),
        operators,
    )?;
    Ok(Expression::Let {
        bindings,
        result: Box::new(result),
    })
}

fn parse_step(
    key: &str,
    operands: &[JsonValue],
    operators: &OperatorMap,
) -> Result<Expression, ParsingError> {
    if operands.len() < 4 || operands.len() % 2 != 0 {
        return Err(ParsingError::new(
            key,
            "\"step\" expression expects an input, a base output and at least one input/output pair.",
        ));
    }
    let input = parse(&operands[0], &child_key(key, 1), operators)?;
    let first = parse(&operands[1], &child_key(key, 2), operators)?;
    let stops = parse_stops(key, "step", &operands[2..], 3, operators)?;
    Ok(Expression::Step {
        input: Box::new(input),
        first: Box::new(first),
        stops,
    })
}

fn parse_interpolate(
    key: &str,
    operands: &[JsonValue],
    operators: &OperatorMap,
) -> Result<Expression, ParsingError> {
    if operands.len() < 4 || operands.len() % 2 != 0 {
        return Err(ParsingError::new(
            key,
            "\"interpolate\" expression expects an interpolation, an input and at least one input/output pair.",
        ));
    }
    let interpolation = parse_interpolation(&operands[0], &child_key(key, 1))?;
    let input = parse(&operands[1], &child_key(key, 2), operators)?;
    let stops = parse_stops(key, "interpolate", &operands[2..], 3, operators)?;
    Ok(Expression::Interpolate {
        interpolation,
        input: Box::new(input),
        stops,
    })
}

fn parse_interpolation(json: &JsonValue, key: &str) -> Result<Interpolation, ParsingError> {
    let arr = match json {
        JsonValue::Array(arr) if !arr.is_empty() => arr,
        _ => {
            return Err(ParsingError::new(
                key,
                "Expected an interpolation type expression.",
            ))
        }
    };
    let name = arr[0].as_str().unwrap_or_default();
    match name {
        "linear" => Ok(Interpolation::Linear),
        "exponential" => {
            let base = arr.get(1).and_then(JsonValue::as_f64);
            match base {
                Some(base) if base > 0.0 => Ok(Interpolation::Exponential { base }),
                _ => Err(ParsingError::new(
                    key,
                    "Exponential interpolation requires a numeric base greater than 0.",
                )),
            }
        }
        "cubic-bezier" => {
            let controls: Vec<f64> = arr[1..].iter().filter_map(JsonValue::as_f64).collect();
            if controls.len() != 4 || controls[0] < 0.0 || controls[0] > 1.0 || controls[2] < 0.0
                || controls[2] > 1.0
            {
                return Err(ParsingError::new(
                    key,
                    "Cubic bezier interpolation requires four numeric control points with x values in [0, 1].",
                ));
            }
            Ok(Interpolation::CubicBezier {
                x1: controls[0],
                y1: controls[1],
                x2: controls[2],
                y2: controls[3],
            })
        }
        _ => Err(ParsingError::new(
            key,
            format!("Unknown interpolation type {:?}.", name),
        )),
    }
}

/// Parses `label, output, label, output, ...` with strictly ascending
/// literal numeric labels.
fn parse_stops(
    key: &str,
    name: &str,
    operands: &[JsonValue],
    index_offset: usize,
    operators: &OperatorMap,
) -> Result<Vec<(f64, Expression)>, ParsingError> {
    let mut stops: Vec<(f64, Expression)> = Vec::with_capacity(operands.len() / 2);
    for (i, pair) in operands.chunks(2).enumerate() {
        let label_key = child_key(key, index_offset + i * 2);
        let label = pair[0].as_f64().ok_or_else(|| {
            ParsingError::new(
                label_key.clone(),
                format!(
                    "Input/output pairs for \"{}\" expressions must be defined using literal numeric values for the input.",
                    name
                ),
            )
        })?;
        if let Some((previous, _)) = stops.last() {
            if label <= *previous {
                return Err(ParsingError::new(
                    label_key,
                    format!(
                        "Input/output pairs for \"{}\" expressions must be arranged with input values in strictly ascending order.",
                        name
                    ),
                ));
            }
        }
        let output = parse(&pair[1], &child_key(key, index_offset + i * 2 + 1), operators)?;
        stops.push((label, output));
    }
    Ok(stops)
}

fn binding_name(json: &JsonValue, key: &str) -> Result<String, ParsingError> {
    match json {
        JsonValue::String(s)
            if !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') =>
        {
            Ok(s.clone())
        }
        _ => Err(ParsingError::new(
            key,
            "Variable names must contain only alphanumeric characters or underscores.",
        )),
    }
}

fn check_arity(key: &str, name: &str, arity: &Arity, operands: usize) -> Result<(), ParsingError> {
    assert_arity(name, arity, operands).map_err(|message| ParsingError::new(key, message))
}

fn child_key(key: &str, index: usize) -> String {
    format!("{}[{}]", key, index)
}

fn json_type_name(json: &JsonValue) -> &'static str {
    match json {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
