//! Builtin compound operators, grouped one module per concern.

pub mod arithmetic;
pub mod decision;
pub mod feature;
pub mod string;

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::context::EvaluationContext;
use crate::error::EvalError;
use crate::expression::Expression;
use crate::value::Value;

/// Operator arity, counted in operands (the operator name excluded).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arity {
    Fixed(usize),
    AtLeast(usize),
    Range(usize, usize),
}

/// The type of an operator evaluation function. `args` are the parsed
/// operand expressions.
pub type EvalFn = fn(&[Expression], &mut EvaluationContext<'_>) -> Result<Value, EvalError>;

pub struct OperatorDefinition {
    pub name: &'static str,
    pub arity: Arity,
    pub eval: EvalFn,
}

impl fmt::Debug for OperatorDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperatorDefinition")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}

/// Map of operator name -> definition.
pub type OperatorMap = HashMap<&'static str, Arc<OperatorDefinition>>;

pub fn operators_to_map(operators: Vec<Arc<OperatorDefinition>>) -> OperatorMap {
    let mut map = HashMap::new();
    for op in operators {
        map.insert(op.name, Arc::clone(&op));
    }
    map
}

/// All compound operators combined.
pub fn all_operators() -> Vec<Arc<OperatorDefinition>> {
    let mut ops = Vec::new();
    ops.extend(arithmetic::operators());
    ops.extend(decision::operators());
    ops.extend(string::operators());
    ops.extend(feature::operators());
    ops
}

/// The shared operator registry. Built once; operator sets are closed.
pub fn registry() -> &'static OperatorMap {
    static REGISTRY: OnceLock<OperatorMap> = OnceLock::new();
    REGISTRY.get_or_init(|| operators_to_map(all_operators()))
}

/// Asserts that an operator application has a legal operand count.
pub fn assert_arity(operator: &str, arity: &Arity, operands: usize) -> Result<(), String> {
    match arity {
        Arity::Fixed(n) => {
            if operands != *n {
                return Err(format!(
                    "\"{}\" operator expects {} operands, but found {}.",
                    operator, n, operands
                ));
            }
        }
        Arity::AtLeast(min) => {
            if operands < *min {
                return Err(format!(
                    "\"{}\" operator expects at least {} operands, but found {}.",
                    operator, min, operands
                ));
            }
        }
        Arity::Range(min, max) => {
            if operands < *min || operands > *max {
                return Err(format!(
                    "\"{}\" operator expects between {} and {} operands, but found {}.",
                    operator, min, max, operands
                ));
            }
        }
    }
    Ok(())
}
