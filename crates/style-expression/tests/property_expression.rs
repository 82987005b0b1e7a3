//! Integration tests for zoom-curve discovery, classification and the
//! error-tolerant evaluator.

use serde_json::{json, Value as Json};
use style_expression::{
    create_expression, create_property_expression, normalize_property_expression, BoundExpression,
    Color, ExpressionOptions, Feature, FunctionMode, GlobalProperties, PropertyExpression,
    PropertyExpressionKind, PropertySpec, SpecType, Value,
};

fn number_spec() -> PropertySpec {
    PropertySpec::new(SpecType::Number)
}

fn feature(properties: Json) -> Feature {
    Feature {
        geometry_type: "Point".to_string(),
        id: None,
        properties: properties.as_object().cloned().unwrap_or_default(),
    }
}

fn classify(expression: Json, spec: &PropertySpec) -> PropertyExpression {
    create_property_expression(&expression, spec, &ExpressionOptions::default())
        .unwrap_or_else(|e| panic!("classification of {} failed: {:?}", expression, e))
}

fn classify_err(expression: Json, spec: &PropertySpec, fragment: &str) {
    let errors = create_property_expression(&expression, spec, &ExpressionOptions::default())
        .err()
        .unwrap_or_else(|| panic!("expected classification error for {}", expression));
    assert!(
        errors[0].message.contains(fragment),
        "expression {}: got {:?}",
        expression,
        errors[0].message
    );
}

// ------------------------------------------------------------ Classification

#[test]
fn constant_kind() {
    let e = classify(json!(3), &number_spec());
    assert_eq!(e.kind(), PropertyExpressionKind::Constant);
    assert_eq!(e.zoom_stops(), None);
}

#[test]
fn source_kind() {
    let e = classify(json!(["get", "width"]), &number_spec());
    assert_eq!(e.kind(), PropertyExpressionKind::Source);
    assert_eq!(e.zoom_stops(), None);
}

#[test]
fn camera_kind() {
    let e = classify(
        json!(["interpolate", ["linear"], ["zoom"], 0, 10, 10, 20]),
        &number_spec(),
    );
    assert_eq!(e.kind(), PropertyExpressionKind::Camera);
}

#[test]
fn composite_kind() {
    let mut e = classify(
        json!(["interpolate", ["linear"], ["zoom"], 0, ["get", "x"], 10, ["*", ["get", "x"], 3]]),
        &number_spec(),
    );
    assert_eq!(e.kind(), PropertyExpressionKind::Composite);
    let f = feature(json!({"x": 10}));
    let value = e.evaluate(&GlobalProperties::new(5.0), Some(&f)).unwrap();
    assert_eq!(value, Value::Number(20.0));
}

#[test]
fn camera_example_from_rendering_pipeline() {
    let mut spec = number_spec();
    spec.default = Some(json!(1));
    let mut e = classify(
        json!(["interpolate", ["linear"], ["zoom"], 0, 10, 10, 20]),
        &spec,
    );
    assert_eq!(e.kind(), PropertyExpressionKind::Camera);
    assert_eq!(e.zoom_stops(), Some(&[0.0, 10.0][..]));
    assert_eq!(e.interpolation_factor(5.0, 0.0, 10.0), Some(0.5));
    let value = e.evaluate(&GlobalProperties::new(5.0), None).unwrap();
    assert_eq!(value, Value::Number(15.0));
}

// ------------------------------------------------------------ Curve discovery

#[test]
fn curve_found_through_let() {
    let e = classify(
        json!(["let", "base", 1, ["step", ["zoom"], ["var", "base"], 10, 2]]),
        &number_spec(),
    );
    assert_eq!(e.kind(), PropertyExpressionKind::Camera);
    assert_eq!(e.zoom_stops(), Some(&[10.0][..]));
}

#[test]
fn curve_found_through_coalesce() {
    let e = classify(
        json!(["coalesce", ["interpolate", ["linear"], ["zoom"], 0, 1], 5]),
        &number_spec(),
    );
    assert_eq!(e.kind(), PropertyExpressionKind::Camera);
}

#[test]
fn step_interpolation_factor_is_zero() {
    let e = classify(json!(["step", ["zoom"], 0, 10, 1]), &number_spec());
    assert_eq!(e.kind(), PropertyExpressionKind::Camera);
    assert_eq!(e.interpolation_factor(5.0, 0.0, 10.0), Some(0.0));
    assert_eq!(e.interpolation_factor(-100.0, 0.0, 10.0), Some(0.0));
    assert_eq!(e.interpolation_factor(7.0, 10.0, 10.0), Some(0.0));
}

#[test]
fn interpolation_factor_is_unclamped() {
    let e = classify(
        json!(["interpolate", ["linear"], ["zoom"], 0, 10, 10, 20]),
        &number_spec(),
    );
    assert_eq!(e.interpolation_factor(20.0, 0.0, 10.0), Some(2.0));
    assert_eq!(e.interpolation_factor(-10.0, 0.0, 10.0), Some(-1.0));
}

#[test]
fn zoom_as_plain_operand_is_rejected() {
    classify_err(
        json!(["+", ["zoom"], 1]),
        &number_spec(),
        "top-level \"step\" or \"interpolate\"",
    );
}

#[test]
fn curve_nested_in_operator_is_rejected() {
    classify_err(
        json!(["+", 1, ["interpolate", ["linear"], ["zoom"], 0, 1]]),
        &number_spec(),
        "top-level \"step\" or \"interpolate\"",
    );
}

#[test]
fn curve_input_through_var_is_rejected() {
    // The step's input is a variable reference, not the zoom reference node
    // itself, so it does not qualify as a zoom curve.
    let mut spec = PropertySpec::new(SpecType::String);
    spec.function_mode = FunctionMode::PiecewiseConstant;
    classify_err(
        json!(["let", "x", ["zoom"], ["step", ["var", "x"], "a", 5, "b"]]),
        &spec,
        "top-level \"step\" or \"interpolate\"",
    );
}

#[test]
fn two_sibling_curves_are_rejected() {
    classify_err(
        json!([
            "coalesce",
            ["step", ["zoom"], 0, 10, 1],
            ["interpolate", ["linear"], ["zoom"], 0, 1]
        ]),
        &number_spec(),
        "Only one zoom-based",
    );
}

#[test]
fn curve_nested_inside_curve_output_is_rejected() {
    classify_err(
        json!(["step", ["zoom"], ["step", ["zoom"], 0, 10, 1], 20, 2]),
        &number_spec(),
        "Only one zoom-based",
    );
}

#[test]
fn coalesce_second_branch_curve_is_rejected() {
    // First-match short-circuiting picks the first branch's curve, but later
    // branches are still validated.
    classify_err(
        json!([
            "coalesce",
            ["step", ["zoom"], 0, 10, 1],
            ["step", ["zoom"], 5, 12, 6]
        ]),
        &number_spec(),
        "Only one zoom-based",
    );
}

#[test]
fn coalesce_second_branch_error_overrides_match() {
    classify_err(
        json!([
            "coalesce",
            ["step", ["zoom"], 0, 10, 1],
            ["+", 1, ["step", ["zoom"], 0, 10, 1]]
        ]),
        &number_spec(),
        "top-level \"step\" or \"interpolate\"",
    );
}

#[test]
fn global_property_constancy_is_name_driven() {
    use style_expression::{is_global_property_constant, operators::registry, parser};

    let parse = |j: Json| parser::parse_expression(&j, registry()).unwrap();

    let heatmap = parse(json!(["+", 1, ["heatmap-density"]]));
    assert!(!is_global_property_constant(&heatmap, &["heatmap-density"]));
    assert!(is_global_property_constant(&heatmap, &["zoom"]));

    let zoom = parse(json!(["+", ["zoom"], 1]));
    assert!(!is_global_property_constant(&zoom, &["zoom"]));
    assert!(is_global_property_constant(&zoom, &["heatmap-density"]));

    let plain = parse(json!(["get", "x"]));
    assert!(is_global_property_constant(
        &plain,
        &["zoom", "heatmap-density"]
    ));
}

// ------------------------------------------------------------ Spec constraints

#[test]
fn property_functions_can_be_forbidden() {
    let mut spec = number_spec();
    spec.property_function = false;
    classify_err(
        json!(["get", "x"]),
        &spec,
        "property expressions not supported",
    );
}

#[test]
fn zoom_functions_can_be_forbidden() {
    let mut spec = number_spec();
    spec.zoom_function = false;
    // Rejected at the zoom-constancy check, before curve search runs.
    classify_err(json!(["zoom"]), &spec, "zoom expressions not supported");
    classify_err(
        json!(["interpolate", ["linear"], ["zoom"], 0, 1]),
        &spec,
        "zoom expressions not supported",
    );
}

#[test]
fn piecewise_constant_properties_reject_interpolate() {
    let mut spec = number_spec();
    spec.function_mode = FunctionMode::PiecewiseConstant;
    classify_err(
        json!(["interpolate", ["linear"], ["zoom"], 0, 1]),
        &spec,
        "cannot be used with this property",
    );
    // Stepwise curves remain legal.
    let e = classify(json!(["step", ["zoom"], 0, 10, 1]), &spec);
    assert_eq!(e.kind(), PropertyExpressionKind::Camera);
}

// ------------------------------------------------------------ Error tolerance

fn tolerant(
    expression: Json,
    spec: &PropertySpec,
) -> style_expression::StyleExpressionWithErrorHandling {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    match create_expression(&expression, spec, &ExpressionOptions::default()).unwrap() {
        BoundExpression::WithErrorHandling(e) => e,
        BoundExpression::Strict(_) => panic!("expected error-handling wrapper"),
    }
}

#[test]
fn invalid_input_logs_once_and_returns_default() {
    let mut spec = number_spec();
    spec.default = Some(json!(1));
    let mut e = tolerant(json!(["+", 1, ["get", "x"]]), &spec);
    let globals = GlobalProperties::new(0.0);
    let f = feature(json!({"x": "not a number"}));
    for _ in 0..5 {
        assert_eq!(e.evaluate(&globals, Some(&f)), Value::Number(1.0));
    }
    assert_eq!(e.warning_count(), 1);
}

#[test]
fn distinct_messages_log_separately() {
    let mut spec = number_spec();
    spec.default = Some(json!(1));
    let mut e = tolerant(json!(["+", 1, ["get", "x"]]), &spec);
    let globals = GlobalProperties::new(0.0);
    let string_feature = feature(json!({"x": "s"}));
    let bool_feature = feature(json!({"x": true}));
    e.evaluate(&globals, Some(&string_feature));
    e.evaluate(&globals, Some(&bool_feature));
    e.evaluate(&globals, Some(&string_feature));
    assert_eq!(e.warning_count(), 2);
}

#[test]
fn null_result_returns_default() {
    let mut spec = number_spec();
    spec.default = Some(json!(7));
    let mut e = tolerant(json!(["get", "missing"]), &spec);
    assert_eq!(e.evaluate(&GlobalProperties::new(0.0), None), Value::Number(7.0));
    // Null is not an error, nothing is logged.
    assert_eq!(e.warning_count(), 0);
}

#[test]
fn enum_violations_return_default_and_log_once() {
    let mut spec = PropertySpec::new(SpecType::Enum);
    spec.values = vec!["round".to_string(), "square".to_string()];
    spec.default = Some(json!("round"));
    let mut e = tolerant(json!(["get", "cap"]), &spec);
    let globals = GlobalProperties::new(0.0);
    let f = feature(json!({"cap": "hexagonal"}));
    for _ in 0..3 {
        assert_eq!(
            e.evaluate(&globals, Some(&f)),
            Value::String("round".to_string())
        );
    }
    assert_eq!(e.warning_count(), 1);

    let ok = feature(json!({"cap": "square"}));
    assert_eq!(
        e.evaluate(&globals, Some(&ok)),
        Value::String("square".to_string())
    );
}

#[test]
fn color_function_default_falls_back_to_transparent() {
    let mut spec = PropertySpec::new(SpecType::Color);
    spec.default = Some(json!({"stops": [[0, "red"], [10, "blue"]]}));
    let mut e = tolerant(json!(["to-color", ["get", "missing"]]), &spec);
    assert_eq!(
        e.evaluate(&GlobalProperties::new(0.0), None),
        Value::Color(Color::TRANSPARENT)
    );
}

#[test]
fn color_literal_default_is_parsed() {
    let mut spec = PropertySpec::new(SpecType::Color);
    spec.default = Some(json!("red"));
    let mut e = tolerant(json!(["to-color", ["get", "missing"]]), &spec);
    assert_eq!(
        e.evaluate(&GlobalProperties::new(0.0), None),
        Value::Color(Color::new(1.0, 0.0, 0.0, 1.0))
    );
}

#[test]
fn strict_mode_propagates_failures() {
    let options = ExpressionOptions {
        handle_errors: false,
    };
    let mut e = create_property_expression(&json!(["+", 1, ["get", "x"]]), &number_spec(), &options)
        .unwrap();
    let f = feature(json!({"x": "s"}));
    assert!(e.evaluate(&GlobalProperties::new(0.0), Some(&f)).is_err());
}

// ------------------------------------------------------------ Normalization

#[test]
fn normalize_literal() {
    let mut e = normalize_property_expression(&json!(4), &number_spec());
    assert_eq!(e.kind(), PropertyExpressionKind::Constant);
    // Inputs are ignored.
    assert_eq!(
        e.evaluate(&GlobalProperties::new(17.0), None).unwrap(),
        Value::Number(4.0)
    );
}

#[test]
fn normalize_color_literal() {
    let spec = PropertySpec::new(SpecType::Color);
    let mut e = normalize_property_expression(&json!("blue"), &spec);
    assert_eq!(e.kind(), PropertyExpressionKind::Constant);
    assert_eq!(
        e.evaluate(&GlobalProperties::new(0.0), None).unwrap(),
        Value::Color(Color::new(0.0, 0.0, 1.0, 1.0))
    );
}

#[test]
fn normalize_expression() {
    let e = normalize_property_expression(
        &json!(["interpolate", ["linear"], ["zoom"], 0, 10, 10, 20]),
        &number_spec(),
    );
    assert_eq!(e.kind(), PropertyExpressionKind::Camera);
}

#[test]
fn normalize_legacy_function() {
    let e = normalize_property_expression(&json!({"stops": [[0, 1], [10, 2]]}), &number_spec());
    assert_eq!(e.kind(), PropertyExpressionKind::Camera);
}

#[test]
#[should_panic(expected = "invalid property expression")]
fn normalize_panics_on_invalid_expression() {
    // Schema validation runs upstream; reaching normalization with a broken
    // expression is a programming error.
    normalize_property_expression(&json!(["+", 1]), &number_spec());
}
