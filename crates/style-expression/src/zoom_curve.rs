//! Discovery and validation of the single legal zoom-driven curve.

use crate::error::ParsingError;
use crate::expression::Expression;

pub const ZOOM_NOT_TOP_LEVEL: &str =
    "\"zoom\" expression may only be used as input to a top-level \"step\" or \"interpolate\" expression.";
pub const ONLY_ONE_ZOOM_CURVE: &str =
    "Only one zoom-based \"step\" or \"interpolate\" subexpression may be used in an expression.";

/// Outcome of one level of the zoom-curve search.
#[derive(Debug)]
pub enum CurveSearch<'a> {
    NotFound,
    Found(&'a Expression),
    Error(ParsingError),
}

/// Locates the unique `step`/`interpolate` node whose input is exactly the
/// zoom reference, or reports a structural violation.
///
/// `let` is transparent through its result and `coalesce` through its
/// arguments (first match wins); every node's children are still scanned for
/// nested matches, so a curve in an illegal position or a second curve in a
/// disjoint subtree escalates to an error. `NotFound` only means zoom never
/// drives a curve here — a bare zoom reference with no curve at all is the
/// classifier's problem, reported from its zoom-constancy check.
pub fn find_zoom_curve(expression: &Expression) -> CurveSearch<'_> {
    let mut result = match expression {
        Expression::Let { result, .. } => find_zoom_curve(result),
        Expression::Coalesce(args) => {
            let mut found = CurveSearch::NotFound;
            for arg in args {
                found = find_zoom_curve(arg);
                if !matches!(found, CurveSearch::NotFound) {
                    break;
                }
            }
            found
        }
        Expression::Step { input, .. } | Expression::Interpolate { input, .. }
            if matches!(input.as_ref(), Expression::Zoom) =>
        {
            CurveSearch::Found(expression)
        }
        _ => CurveSearch::NotFound,
    };
    if let CurveSearch::Error(_) = result {
        return result;
    }

    // A matched curve's own children are scanned too: its outputs may hide a
    // second curve, which is illegal.
    let mut children = Vec::new();
    expression.visit_children(&mut |child| children.push(child));
    for child in children {
        result = match (result, find_zoom_curve(child)) {
            (previous, CurveSearch::NotFound) => previous,
            // The first structural error encountered wins.
            (previous @ CurveSearch::Error(_), _) => previous,
            (_, error @ CurveSearch::Error(_)) => error,
            (CurveSearch::NotFound, CurveSearch::Found(_)) => {
                CurveSearch::Error(ParsingError::new("", ZOOM_NOT_TOP_LEVEL))
            }
            (CurveSearch::Found(current), CurveSearch::Found(nested)) => {
                if std::ptr::eq(current, nested) {
                    CurveSearch::Found(current)
                } else {
                    CurveSearch::Error(ParsingError::new("", ONLY_ONE_ZOOM_CURVE))
                }
            }
        };
    }
    result
}
