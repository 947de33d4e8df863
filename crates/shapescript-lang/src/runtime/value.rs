use std::fmt;

use serde::Serialize;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Bool(bool),
    Str(String),
    Array(Vec<Value>),
    Null,
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Bool(_)   => "bool",
            Value::Str(_)    => "string",
            Value::Array(_)  => "array",
            Value::Null      => "null",
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Bool(b)   => *b,
            Value::Str(s)    => !s.is_empty(),
            Value::Array(a)  => !a.is_empty(),
            Value::Null      => false,
        }
    }

    pub fn as_number(&self) -> Result<f64> {
        match self {
            Value::Number(n) => Ok(*n),
            other => Err(Error::value(format!("expected number, got {}", other.type_name()))),
        }
    }

    pub fn as_number_opt(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// `[x, y]` arrays as a point.
    pub fn as_point(&self) -> Result<(f64, f64)> {
        match self {
            Value::Array(items) if items.len() == 2 => Ok((items[0].as_number()?, items[1].as_number()?)),
            other => Err(Error::value(format!("expected [x, y], got {}", other.type_name()))),
        }
    }

    pub fn point(x: f64, y: f64) -> Self {
        Value::Array(vec![Value::Number(x), Value::Number(y)])
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self { Value::Number(n) }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self { Value::Bool(b) }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self { Value::Str(s.to_string()) }
}

impl From<String> for Value {
    fn from(s: String) -> Self { Value::Str(s) }
}

/// Integral numbers print without a fractional part so they read well inside
/// generated shape names (`s_2`, not `s_2.0`).
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 { format!("{}", n as i64) } else { format!("{n}") }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::Bool(b)   => write!(f, "{b}"),
            Value::Str(s)    => f.write_str(s),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 { f.write_str(", ")?; }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Null => f.write_str("null"),
        }
    }
}
