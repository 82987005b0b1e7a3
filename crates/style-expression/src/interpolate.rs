//! Interpolation kinds, factor math and value blending.

use crate::color::Color;
use crate::error::EvalError;
use crate::value::Value;

/// How an `interpolate` curve positions an input between two stops.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Interpolation {
    Linear,
    Exponential {
        base: f64,
    },
    CubicBezier {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
    },
}

/// Normalized position of `input` between `lower` and `upper` under the
/// given interpolation kind. Typically in `[0, 1]` but deliberately
/// unclamped; extrapolation is the caller's concern.
pub fn interpolation_factor(interpolation: Interpolation, input: f64, lower: f64, upper: f64) -> f64 {
    match interpolation {
        Interpolation::Linear => exponential_factor(input, 1.0, lower, upper),
        Interpolation::Exponential { base } => exponential_factor(input, base, lower, upper),
        Interpolation::CubicBezier { x1, y1, x2, y2 } => {
            let t = exponential_factor(input, 1.0, lower, upper);
            UnitBezier::new(x1, y1, x2, y2).solve(t)
        }
    }
}

fn exponential_factor(input: f64, base: f64, lower: f64, upper: f64) -> f64 {
    let difference = upper - lower;
    let progress = input - lower;
    if difference == 0.0 {
        0.0
    } else if base == 1.0 {
        progress / difference
    } else {
        (base.powf(progress) - 1.0) / (base.powf(difference) - 1.0)
    }
}

/// Blends two stop outputs. Numbers, colors and numeric arrays of equal
/// length interpolate; everything else is a runtime type error.
pub fn interpolate_value(a: &Value, b: &Value, t: f64) -> Result<Value, EvalError> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => Ok(Value::Number(x + (y - x) * t)),
        (Value::Color(x), Value::Color(y)) => Ok(Value::Color(x.lerp(y, t))),
        // Color ramps written as strings stay strings until the property
        // specification coerces the result; blend them as colors here.
        (Value::String(x), Value::String(y)) => match (Color::parse(x), Color::parse(y)) {
            (Some(x), Some(y)) => Ok(Value::Color(x.lerp(&y, t))),
            _ => Err(EvalError::InvalidValue(
                "Cannot interpolate between string values that are not colors.".to_string(),
            )),
        },
        (Value::Array(xs), Value::Array(ys)) => {
            if xs.len() != ys.len() {
                return Err(EvalError::InvalidValue(
                    "Cannot interpolate between arrays of different length.".to_string(),
                ));
            }
            xs.iter()
                .zip(ys)
                .map(|(x, y)| interpolate_value(x, y, t))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }
        (a, _) => Err(EvalError::InvalidValue(format!(
            "Cannot interpolate values of type {}.",
            a.type_name()
        ))),
    }
}

/// Cubic bezier restricted to the unit square, solved for y given x.
struct UnitBezier {
    cx: f64,
    bx: f64,
    ax: f64,
    cy: f64,
    by: f64,
    ay: f64,
}

impl UnitBezier {
    fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        let cx = 3.0 * x1;
        let bx = 3.0 * (x2 - x1) - cx;
        let ax = 1.0 - cx - bx;
        let cy = 3.0 * y1;
        let by = 3.0 * (y2 - y1) - cy;
        let ay = 1.0 - cy - by;
        UnitBezier {
            cx,
            bx,
            ax,
            cy,
            by,
            ay,
        }
    }

    fn sample_x(&self, t: f64) -> f64 {
        ((self.ax * t + self.bx) * t + self.cx) * t
    }

    fn sample_y(&self, t: f64) -> f64 {
        ((self.ay * t + self.by) * t + self.cy) * t
    }

    fn sample_x_derivative(&self, t: f64) -> f64 {
        (3.0 * self.ax * t + 2.0 * self.bx) * t + self.cx
    }

    fn solve_x(&self, x: f64, epsilon: f64) -> f64 {
        // Newton first, bisection if it fails to converge.
        let mut t = x;
        for _ in 0..8 {
            let x2 = self.sample_x(t) - x;
            if x2.abs() < epsilon {
                return t;
            }
            let d = self.sample_x_derivative(t);
            if d.abs() < 1e-6 {
                break;
            }
            t -= x2 / d;
        }
        let (mut lo, mut hi) = (0.0f64, 1.0f64);
        t = x;
        while lo < hi {
            let x2 = self.sample_x(t);
            if (x2 - x).abs() < epsilon {
                return t;
            }
            if x > x2 {
                lo = t;
            } else {
                hi = t;
            }
            t = (hi - lo) / 2.0 + lo;
        }
        t
    }

    fn solve(&self, x: f64) -> f64 {
        if x <= 0.0 {
            return 0.0;
        }
        if x >= 1.0 {
            return 1.0;
        }
        self.sample_y(self.solve_x(x, 1e-6))
    }
}
