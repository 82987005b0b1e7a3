use std::fmt;

use thiserror::Error;

/// A per-evaluation runtime failure.
///
/// This is the recoverable channel: in lenient mode the error-tolerant
/// evaluator catches these, logs once per distinct message and substitutes
/// the property's default value. Parse and classification failures use
/// [`ParsingError`] instead and are never raised through this type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("Expected {expected} but found {found} instead.")]
    TypeMismatch {
        expected: &'static str,
        found: String,
    },

    #[error("Could not parse color from value '{0}'.")]
    InvalidColor(String),

    #[error("Unbound variable \"{0}\".")]
    UnboundVariable(String),

    #[error("{0}")]
    InvalidValue(String),
}

impl EvalError {
    /// Shorthand for the most common failure: a value of the wrong type.
    pub fn type_mismatch(expected: &'static str, found: &crate::value::Value) -> Self {
        EvalError::TypeMismatch {
            expected,
            found: found.type_name().to_string(),
        }
    }
}

/// A compile-time failure: parse error, structural zoom-curve violation or
/// specification-constraint violation.
///
/// Carried in result values, never raised. `key` locates the offending
/// sub-expression as a JSON path (`"[2][1]"`); empty for whole-expression
/// errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsingError {
    pub key: String,
    pub message: String,
}

impl ParsingError {
    pub fn new(key: impl Into<String>, message: impl Into<String>) -> Self {
        ParsingError {
            key: key.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ParsingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.key.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.key, self.message)
        }
    }
}
