//! Attribute values and numeric coercion
//!
//! A catalogue cell is either a number, a piece of text, or missing.
//! Missing is its own state: it is not `0` and it is not empty text.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single attribute value
///
/// Serialized untagged, so JSON `null` is [`Value::Missing`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    /// Numeric value
    Number(f64),
    /// Text value (may still coerce to a number, e.g. "2.0")
    Text(String),
    /// Absent or unknown value
    #[default]
    Missing,
}

impl Value {
    /// Create a text value
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    /// Check whether the value is missing
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// Check whether the value is text with nothing but whitespace
    pub fn is_empty_text(&self) -> bool {
        matches!(self, Value::Text(s) if s.trim().is_empty())
    }

    /// Check whether the value counts as present
    ///
    /// Missing values and blank text are absent; filtering and schema
    /// summaries both use this rule.
    pub fn has_value(&self) -> bool {
        !self.is_missing() && !self.is_empty_text()
    }

    /// Attempt numeric coercion
    ///
    /// Returns `None` for missing values, empty text, NaN, and text that
    /// does not parse as a decimal number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) if !n.is_nan() => Some(*n),
            Value::Number(_) => None,
            Value::Text(s) => parse_number(s),
            Value::Missing => None,
        }
    }

    /// Check whether the value coerces to a number
    pub fn is_numeric(&self) -> bool {
        self.as_number().is_some()
    }

    /// Text form used as a categorical key
    pub fn label(&self) -> Option<String> {
        match self {
            Value::Number(n) if n.is_nan() => None,
            Value::Number(n) => Some(format_number(*n)),
            Value::Text(s) => Some(s.clone()),
            Value::Missing => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::Text(s) => write!(f, "{}", s),
            Value::Missing => write!(f, "-"),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Missing)
    }
}

fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| !n.is_nan())
}

/// Shortest form: integers without a trailing ".0"
fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}
