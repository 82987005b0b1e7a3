//! Constancy predicates over expression trees.

use crate::expression::Expression;
use crate::operators::feature::FEATURE_DEPENDENT_OPERATORS;

/// True when no sub-expression reads feature-scoped data.
pub fn is_feature_constant(expression: &Expression) -> bool {
    if let Expression::Compound { definition, .. } = expression {
        if FEATURE_DEPENDENT_OPERATORS.contains(&definition.name) {
            return false;
        }
    }
    let mut constant = true;
    expression.visit_children(&mut |child| {
        if constant && !is_feature_constant(child) {
            constant = false;
        }
    });
    constant
}

/// True when no sub-expression reads any of the named globals.
///
/// `"zoom"` matches the dedicated zoom node; every other global is an
/// ordinary nullary operator (`heatmap-density`, ...) matched by name.
pub fn is_global_property_constant(expression: &Expression, names: &[&str]) -> bool {
    let reads = match expression {
        Expression::Zoom => names.contains(&"zoom"),
        Expression::Compound { definition, .. } => names.contains(&definition.name),
        _ => false,
    };
    if reads {
        return false;
    }
    let mut constant = true;
    expression.visit_children(&mut |child| {
        if constant && !is_global_property_constant(child, names) {
            constant = false;
        }
    });
    constant
}

/// True when no sub-expression reads the zoom global.
pub fn is_zoom_constant(expression: &Expression) -> bool {
    is_global_property_constant(expression, &["zoom"])
}
