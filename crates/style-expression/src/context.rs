//! Evaluation inputs: globals, features and the per-evaluation context.

use serde_json::Value as JsonValue;

use crate::value::Value;

/// Read-only per-frame globals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobalProperties {
    pub zoom: f64,
    pub heatmap_density: Option<f64>,
}

impl GlobalProperties {
    pub fn new(zoom: f64) -> Self {
        GlobalProperties {
            zoom,
            heatmap_density: None,
        }
    }
}

/// A read-only map feature.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Feature {
    /// Geometry type name: `Point`, `LineString`, `Polygon`, ...
    pub geometry_type: String,
    pub id: Option<JsonValue>,
    pub properties: serde_json::Map<String, JsonValue>,
}

/// Scratch state threaded through one evaluation of one expression tree.
///
/// The binder owns the let-binding scope stack and lends it here so the
/// allocation is amortized across evaluations. One context exists per
/// `evaluate` call and never outlives it; concurrent evaluations of the same
/// binder are ruled out by its `&mut self` signature.
pub struct EvaluationContext<'a> {
    pub globals: &'a GlobalProperties,
    pub feature: Option<&'a Feature>,
    scope: &'a mut Vec<(String, Value)>,
}

impl<'a> EvaluationContext<'a> {
    pub fn new(
        globals: &'a GlobalProperties,
        feature: Option<&'a Feature>,
        scope: &'a mut Vec<(String, Value)>,
    ) -> Self {
        scope.clear();
        EvaluationContext {
            globals,
            feature,
            scope,
        }
    }

    pub fn push_binding(&mut self, name: &str, value: Value) {
        self.scope.push((name.to_string(), value));
    }

    /// Innermost binding wins.
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.scope
            .iter()
            .rev()
            .find(|(bound, _)| bound == name)
            .map(|(_, value)| value)
    }

    pub fn scope_depth(&self) -> usize {
        self.scope.len()
    }

    pub fn truncate_scope(&mut self, depth: usize) {
        self.scope.truncate(depth);
    }
}
