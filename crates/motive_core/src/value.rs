//! Animatable value types
//!
//! Endpoints of an animation are either numbers or text. Numbers are
//! interpolated; text always snaps to the end value.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single animation endpoint or cell value
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(f64),
    Text(String),
}

impl Scalar {
    /// The numeric payload, if any
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Scalar::Number(n) => Some(*n),
            Scalar::Text(_) => None,
        }
    }

    /// The text payload, if any
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Scalar::Number(_) => None,
            Scalar::Text(s) => Some(s),
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Scalar::Text(_))
    }
}

/// Strict equality: IEEE comparison for numbers (`NaN != NaN`, `0.0 == -0.0`),
/// content comparison for text, and numbers never equal text.
impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Scalar::Number(a), Scalar::Number(b)) => a == b,
            (Scalar::Text(a), Scalar::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Default for Scalar {
    fn default() -> Self {
        Scalar::Number(0.0)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Number(value)
    }
}

impl From<f32> for Scalar {
    fn from(value: f32) -> Self {
        Scalar::Number(value as f64)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Number(value as f64)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Number(n) => write!(f, "{n}"),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

/// The externally observed value of one animated property
///
/// A single-cell property reports a `Scalar`; vector quantities
/// (e.g. a translate pair) report every cell in order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropValue {
    Scalar(Scalar),
    Vector(Vec<Scalar>),
}

impl PropValue {
    /// Numeric value of a single-cell property
    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropValue::Scalar(s) => s.as_number(),
            PropValue::Vector(_) => None,
        }
    }

    /// Numeric values of every cell, skipping text cells
    pub fn numbers(&self) -> Vec<f64> {
        match self {
            PropValue::Scalar(s) => s.as_number().into_iter().collect(),
            PropValue::Vector(v) => v.iter().filter_map(Scalar::as_number).collect(),
        }
    }
}

impl From<Scalar> for PropValue {
    fn from(value: Scalar) -> Self {
        PropValue::Scalar(value)
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        PropValue::Scalar(Scalar::Number(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_equality() {
        assert_eq!(Scalar::from(1.0), Scalar::from(1.0));
        assert_eq!(Scalar::from(0.0), Scalar::from(-0.0));
        assert_ne!(Scalar::from(f64::NAN), Scalar::from(f64::NAN));
        assert_ne!(Scalar::from(1.0), Scalar::from("1"));
        assert_eq!(Scalar::from("red"), Scalar::from("red".to_string()));
    }

    #[test]
    fn test_text_accessors() {
        let text = Scalar::from("auto");
        assert!(text.is_text());
        assert_eq!(text.as_text(), Some("auto"));
        assert_eq!(text.as_number(), None);

        let number = Scalar::from(4.0);
        assert!(!number.is_text());
        assert_eq!(number.as_text(), None);
    }

    #[test]
    fn test_prop_value_numbers() {
        let v = PropValue::Vector(vec![1.0.into(), "auto".into(), 3.0.into()]);
        assert_eq!(v.numbers(), vec![1.0, 3.0]);
        assert_eq!(v.as_number(), None);
        assert_eq!(PropValue::from(2.5).as_number(), Some(2.5));
    }

    #[test]
    fn test_untagged_json() {
        let v: PropValue = serde_json::from_str("[1.5, \"10px\"]").unwrap();
        assert_eq!(
            v,
            PropValue::Vector(vec![Scalar::Number(1.5), Scalar::Text("10px".into())])
        );
        let s: Scalar = serde_json::from_str("42").unwrap();
        assert_eq!(s, Scalar::Number(42.0));
    }
}
