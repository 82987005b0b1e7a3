//! Integration tests for expression parsing and strict evaluation.

use serde_json::{json, Value as Json};
use style_expression::{
    create_expression, Color, EvalError, ExpressionOptions, Feature, GlobalProperties,
    PropertySpec, SpecType, Value,
};

fn strict() -> ExpressionOptions {
    ExpressionOptions {
        handle_errors: false,
    }
}

fn feature(properties: Json) -> Feature {
    Feature {
        geometry_type: "Point".to_string(),
        id: Some(json!(42)),
        properties: properties.as_object().cloned().unwrap_or_default(),
    }
}

fn spec_for(expected: &Value) -> PropertySpec {
    let kind = match expected {
        Value::Bool(_) => SpecType::Boolean,
        Value::String(_) => SpecType::String,
        Value::Color(_) => SpecType::Color,
        Value::Array(_) => SpecType::Array,
        _ => SpecType::Number,
    };
    PropertySpec::new(kind)
}

fn eval(
    expression: Json,
    spec: &PropertySpec,
    zoom: f64,
    feature: Option<&Feature>,
) -> Result<Value, EvalError> {
    let mut bound = create_expression(&expression, spec, &strict())
        .unwrap_or_else(|e| panic!("parse failed for {}: {:?}", expression, e));
    bound.evaluate(&GlobalProperties::new(zoom), feature)
}

fn check(expression: Json, expected: Value) {
    let spec = spec_for(&expected);
    let result = eval(expression.clone(), &spec, 0.0, None)
        .unwrap_or_else(|e| panic!("evaluate({}) failed: {}", expression, e));
    assert_eq!(result, expected, "expression: {}", expression);
}

fn check_with_feature(expression: Json, properties: Json, expected: Value) {
    let spec = spec_for(&expected);
    let f = feature(properties);
    let result = eval(expression.clone(), &spec, 0.0, Some(&f))
        .unwrap_or_else(|e| panic!("evaluate({}) failed: {}", expression, e));
    assert_eq!(result, expected, "expression: {}", expression);
}

fn check_parse_err(expression: Json, fragment: &str) {
    let spec = PropertySpec::new(SpecType::Number);
    let errors = create_expression(&expression, &spec, &strict())
        .err()
        .unwrap_or_else(|| panic!("expected parse error for {}", expression));
    assert!(
        errors[0].message.contains(fragment),
        "expression {}: got {:?}",
        expression,
        errors[0].message
    );
}

fn check_eval_err(expression: Json, fragment: &str) {
    let spec = PropertySpec::new(SpecType::Number);
    let error = eval(expression.clone(), &spec, 0.0, None)
        .err()
        .unwrap_or_else(|| panic!("expected evaluation error for {}", expression));
    assert!(
        error.to_string().contains(fragment),
        "expression {}: got {:?}",
        expression,
        error.to_string()
    );
}

// ----------------------------------------------------------------- Arithmetic

#[test]
fn test_add() {
    check(json!(["+", 1, 2]), Value::Number(3.0));
    check(json!(["+", 1, 2, 3, 4]), Value::Number(10.0));
    check(json!(["+", 1, ["+", 1, 1]]), Value::Number(3.0));
}

#[test]
fn test_subtract_and_negate() {
    check(json!(["-", 5, 2]), Value::Number(3.0));
    check(json!(["-", 5]), Value::Number(-5.0));
}

#[test]
fn test_multiply_divide_mod_pow() {
    check(json!(["*", 3, 2, 2]), Value::Number(12.0));
    check(json!(["/", 10, 4]), Value::Number(2.5));
    check(json!(["%", 10, 3]), Value::Number(1.0));
    check(json!(["^", 2, 10]), Value::Number(1024.0));
}

#[test]
fn test_unary_math() {
    check(json!(["sqrt", 16]), Value::Number(4.0));
    check(json!(["abs", -5]), Value::Number(5.0));
    check(json!(["round", 1.5]), Value::Number(2.0));
    check(json!(["floor", 1.9]), Value::Number(1.0));
    check(json!(["ceil", 1.1]), Value::Number(2.0));
    check(json!(["ln", 1]), Value::Number(0.0));
}

#[test]
fn test_min_max() {
    check(json!(["min", 3, 1, 2]), Value::Number(1.0));
    check(json!(["max", 3, 1, 2]), Value::Number(3.0));
}

#[test]
fn test_constants() {
    check(json!(["e"]), Value::Number(std::f64::consts::E));
    check(json!(["pi"]), Value::Number(std::f64::consts::PI));
}

#[test]
fn test_arithmetic_type_error() {
    check_eval_err(json!(["+", 1, "x"]), "Expected number but found string");
}

#[test]
fn test_arity_error() {
    check_parse_err(json!(["+", 1]), "at least 2 operands");
    check_parse_err(json!(["sqrt", 1, 2]), "expects 1 operands");
}

#[test]
fn test_unknown_operator() {
    check_parse_err(json!(["frobnicate", 1]), "Unknown expression");
}

// ----------------------------------------------------------------- Decision

#[test]
fn test_equality() {
    check(json!(["==", 1, 1]), Value::Bool(true));
    check(json!(["==", 1, 2]), Value::Bool(false));
    check(json!(["==", "a", "a"]), Value::Bool(true));
    check(json!(["!=", 1, "1"]), Value::Bool(true));
}

#[test]
fn test_ordering() {
    check(json!(["<", 1, 2]), Value::Bool(true));
    check(json!(["<=", 2, 2]), Value::Bool(true));
    check(json!([">", "b", "a"]), Value::Bool(true));
    check(json!([">=", "a", "b"]), Value::Bool(false));
}

#[test]
fn test_ordering_type_error() {
    check_eval_err(json!(["<", 1, "a"]), "Expected number or string");
}

#[test]
fn test_nan_compares_false() {
    // 0/0 is NaN; no ordering against it holds, not even with itself.
    let nan = json!(["/", 0, 0]);
    for op in ["<", "<=", ">", ">="] {
        check(json!([op, nan.clone(), 1]), Value::Bool(false));
        check(json!([op, 1, nan.clone()]), Value::Bool(false));
    }
    check(json!(["==", nan.clone(), nan]), Value::Bool(false));
}

#[test]
fn test_boolean_logic() {
    check(json!(["!", false]), Value::Bool(true));
    check(json!(["all", true, true]), Value::Bool(true));
    check(json!(["all", true, false]), Value::Bool(false));
    check(json!(["any", false, true]), Value::Bool(true));
}

#[test]
fn test_logic_short_circuits() {
    // The failing comparison is never evaluated.
    check(json!(["any", true, ["<", 1, "a"]]), Value::Bool(true));
    check(json!(["all", false, ["<", 1, "a"]]), Value::Bool(false));
}

#[test]
fn test_case() {
    check(json!(["case", true, 1, 2]), Value::Number(1.0));
    check(json!(["case", false, 1, 2]), Value::Number(2.0));
    check(
        json!(["case", false, 1, true, 2, 3]),
        Value::Number(2.0),
    );
}

#[test]
fn test_case_parity_error() {
    check_eval_err(json!(["case", true, 1, false, 2]), "odd number");
}

#[test]
fn test_match() {
    check_with_feature(
        json!(["match", ["get", "t"], "a", 1, "b", 2, 0]),
        json!({"t": "b"}),
        Value::Number(2.0),
    );
    check_with_feature(
        json!(["match", ["get", "t"], ["literal", ["a", "b"]], 1, 0]),
        json!({"t": "b"}),
        Value::Number(1.0),
    );
    check_with_feature(
        json!(["match", ["get", "t"], "a", 1, 0]),
        json!({"t": "z"}),
        Value::Number(0.0),
    );
}

// ----------------------------------------------------------------- Bindings

#[test]
fn test_let_and_var() {
    check(json!(["let", "a", 4, ["var", "a"]]), Value::Number(4.0));
    check(
        json!(["let", "a", 1, ["let", "a", 2, ["var", "a"]]]),
        Value::Number(2.0),
    );
    // Inner scopes are popped before siblings evaluate.
    check(
        json!(["let", "a", 1, ["+", ["let", "a", 10, ["var", "a"]], ["var", "a"]]]),
        Value::Number(11.0),
    );
}

#[test]
fn test_unbound_var() {
    check_eval_err(json!(["var", "nope"]), "Unbound variable");
}

#[test]
fn test_invalid_binding_name() {
    check_parse_err(json!(["let", "a b", 1, 2]), "alphanumeric");
    check_parse_err(json!(["var", 7]), "alphanumeric");
}

#[test]
fn test_coalesce() {
    check(json!(["coalesce", 1, 2]), Value::Number(1.0));
    check_with_feature(
        json!(["coalesce", ["get", "missing"], 5]),
        json!({}),
        Value::Number(5.0),
    );
    check(json!(["coalesce", ["get", "missing"]]), Value::Null);
}

// ----------------------------------------------------------------- Curves

#[test]
fn test_step() {
    let curve = json!(["step", ["get", "x"], 0, 10, 1, 20, 2]);
    for (x, expected) in [(5, 0.0), (10, 1.0), (15, 1.0), (20, 2.0), (25, 2.0)] {
        check_with_feature(curve.clone(), json!({ "x": x }), Value::Number(expected));
    }
}

#[test]
fn test_interpolate_linear() {
    let curve = json!(["interpolate", ["linear"], ["get", "x"], 0, 10, 10, 20]);
    check_with_feature(curve.clone(), json!({"x": 5}), Value::Number(15.0));
    // Clamped to the outer stops.
    check_with_feature(curve.clone(), json!({"x": -5}), Value::Number(10.0));
    check_with_feature(curve, json!({"x": 50}), Value::Number(20.0));
}

#[test]
fn test_interpolate_exponential() {
    let curve = json!(["interpolate", ["exponential", 2], ["get", "x"], 0, 0, 10, 100]);
    let expected = 100.0 * (2f64.powf(5.0) - 1.0) / (2f64.powf(10.0) - 1.0);
    let f = feature(json!({"x": 5}));
    let spec = PropertySpec::new(SpecType::Number);
    let result = eval(curve, &spec, 0.0, Some(&f)).unwrap();
    match result {
        Value::Number(n) => assert!((n - expected).abs() < 1e-9, "got {}", n),
        other => panic!("expected number, got {:?}", other),
    }
}

#[test]
fn test_interpolate_colors() {
    let curve = json!(["interpolate", ["linear"], ["get", "x"], 0, "black", 10, "white"]);
    check_with_feature(
        curve,
        json!({"x": 5}),
        Value::Color(Color::new(0.5, 0.5, 0.5, 1.0)),
    );
}

#[test]
fn test_interpolate_arrays() {
    let curve = json!([
        "interpolate", ["linear"], ["get", "x"],
        0, ["literal", [0, 0]],
        10, ["literal", [10, 100]]
    ]);
    check_with_feature(
        curve,
        json!({"x": 5}),
        Value::Array(vec![Value::Number(5.0), Value::Number(50.0)]),
    );
}

#[test]
fn test_stop_labels_must_ascend() {
    check_parse_err(
        json!(["step", ["get", "x"], 0, 10, 1, 5, 2]),
        "strictly ascending",
    );
    check_parse_err(
        json!(["interpolate", ["linear"], ["get", "x"], 10, 1, 10, 2]),
        "strictly ascending",
    );
}

#[test]
fn test_stop_labels_must_be_literal_numbers() {
    check_parse_err(
        json!(["step", ["get", "x"], 0, ["+", 1, 2], 1]),
        "literal numeric values",
    );
}

#[test]
fn test_invalid_interpolation() {
    check_parse_err(
        json!(["interpolate", ["bogus"], ["get", "x"], 0, 1]),
        "Unknown interpolation type",
    );
    check_parse_err(
        json!(["interpolate", ["exponential", -1], ["get", "x"], 0, 1]),
        "greater than 0",
    );
    check_parse_err(
        json!(["interpolate", ["cubic-bezier", 0.5], ["get", "x"], 0, 1]),
        "four numeric control points",
    );
}

// ----------------------------------------------------------------- Strings

#[test]
fn test_concat() {
    check(json!(["concat", "a", "b", 3]), Value::String("ab3".to_string()));
}

#[test]
fn test_case_conversion() {
    check(json!(["upcase", "abc"]), Value::String("ABC".to_string()));
    check(json!(["downcase", "AbC"]), Value::String("abc".to_string()));
}

#[test]
fn test_length() {
    check(json!(["length", "abc"]), Value::Number(3.0));
    check(json!(["length", ["literal", [1, 2]]]), Value::Number(2.0));
}

#[test]
fn test_typeof() {
    check(json!(["typeof", "a"]), Value::String("string".to_string()));
    check(json!(["typeof", 1]), Value::String("number".to_string()));
    check(json!(["typeof", ["literal", [1]]]), Value::String("array".to_string()));
}

#[test]
fn test_conversions() {
    check(json!(["to-string", 3]), Value::String("3".to_string()));
    check(json!(["to-string", true]), Value::String("true".to_string()));
    check(json!(["to-number", "3.5"]), Value::Number(3.5));
    check(json!(["to-number", ["get", "missing"], "4"]), Value::Number(4.0));
    check(json!(["to-boolean", ""]), Value::Bool(false));
    check(json!(["to-boolean", "x"]), Value::Bool(true));
    check(json!(["to-boolean", 0]), Value::Bool(false));
}

#[test]
fn test_to_color() {
    check(
        json!(["to-color", "#ff0000"]),
        Value::Color(Color::new(1.0, 0.0, 0.0, 1.0)),
    );
    check(
        json!(["to-color", "bogus", "blue"]),
        Value::Color(Color::new(0.0, 0.0, 1.0, 1.0)),
    );
    check_eval_err(json!(["to-color", "bogus"]), "Could not parse color");
}

// ----------------------------------------------------------------- Features

#[test]
fn test_get_and_has() {
    check_with_feature(json!(["get", "x"]), json!({"x": 7}), Value::Number(7.0));
    check_with_feature(json!(["get", "missing"]), json!({"x": 7}), Value::Null);
    check_with_feature(json!(["has", "x"]), json!({"x": 7}), Value::Bool(true));
    check_with_feature(json!(["has", "y"]), json!({"x": 7}), Value::Bool(false));
}

#[test]
fn test_feature_accessors() {
    check_with_feature(json!(["id"]), json!({}), Value::Number(42.0));
    check_with_feature(
        json!(["geometry-type"]),
        json!({}),
        Value::String("Point".to_string()),
    );
    check_with_feature(
        json!(["typeof", ["properties"]]),
        json!({"x": 1}),
        Value::String("object".to_string()),
    );
}

#[test]
fn test_missing_feature() {
    check(json!(["get", "x"]), Value::Null);
    check(json!(["has", "x"]), Value::Bool(false));
    check(json!(["id"]), Value::Null);
}

#[test]
fn test_globals() {
    let spec = PropertySpec::new(SpecType::Number);
    let mut bound = create_expression(&json!(["zoom"]), &spec, &strict()).unwrap();
    let globals = GlobalProperties {
        zoom: 11.5,
        heatmap_density: Some(0.25),
    };
    assert_eq!(bound.evaluate(&globals, None).unwrap(), Value::Number(11.5));

    let mut density = create_expression(&json!(["heatmap-density"]), &spec, &strict()).unwrap();
    assert_eq!(density.evaluate(&globals, None).unwrap(), Value::Number(0.25));
}

// ----------------------------------------------------------------- Literals

#[test]
fn test_literals() {
    check(json!(3), Value::Number(3.0));
    check(json!(true), Value::Bool(true));
    check(json!("abc"), Value::String("abc".to_string()));
    check(
        json!(["literal", [1, 2]]),
        Value::Array(vec![Value::Number(1.0), Value::Number(2.0)]),
    );
}

#[test]
fn test_color_literal_coercion() {
    // A string literal bound to a color spec parses to the color type.
    check(json!("red"), Value::Color(Color::new(1.0, 0.0, 0.0, 1.0)));
}

#[test]
fn test_bare_object_is_invalid() {
    check_parse_err(json!({"stops": []}), "Bare objects");
}

#[test]
fn test_array_spec_constraints() {
    let mut spec = PropertySpec::new(SpecType::Array);
    spec.element = Some(SpecType::Number);
    spec.length = Some(2);
    let mut bound = create_expression(&json!(["literal", [1, 2, 3]]), &spec, &strict()).unwrap();
    let error = bound
        .evaluate(&GlobalProperties::new(0.0), None)
        .err()
        .expect("length mismatch");
    assert!(error.to_string().contains("length 2"), "got {}", error);
}
