//! Computed value model
//!
//! This module defines `ComputedValue`, the value type carried across the
//! serializer boundary. The cache itself never interprets the content of a
//! value; the enum exists so an in-process serializer has a closed model to
//! round-trip.
//!
//! ## Type Rules
//!
//! - No implicit coercions: `Int(1) != Float(1.0)`, `Bytes` are not `String`
//! - Float equality is IEEE-754: `NaN != NaN`, `-0.0 == 0.0`

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Value produced by a computation and stored in the cache
///
/// Different variants are never equal, even when they contain the same
/// "value"; float comparison follows IEEE-754 semantics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ComputedValue {
    /// Absent / no result
    Null,
    /// Boolean result
    Bool(bool),
    /// 64-bit signed integer result
    Int(i64),
    /// 64-bit floating point result (IEEE-754)
    Float(f64),
    /// UTF-8 string result
    String(String),
    /// Raw byte result
    Bytes(Vec<u8>),
    /// Ordered collection of results
    Array(Vec<ComputedValue>),
    /// String-keyed structure of results
    Object(HashMap<String, ComputedValue>),
}

impl PartialEq for ComputedValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ComputedValue::Null, ComputedValue::Null) => true,
            (ComputedValue::Bool(a), ComputedValue::Bool(b)) => a == b,
            (ComputedValue::Int(a), ComputedValue::Int(b)) => a == b,
            // IEEE-754: NaN != NaN, -0.0 == 0.0
            (ComputedValue::Float(a), ComputedValue::Float(b)) => a == b,
            (ComputedValue::String(a), ComputedValue::String(b)) => a == b,
            (ComputedValue::Bytes(a), ComputedValue::Bytes(b)) => a == b,
            (ComputedValue::Array(a), ComputedValue::Array(b)) => a == b,
            (ComputedValue::Object(a), ComputedValue::Object(b)) => {
                a.len() == b.len() && a.iter().all(|(k, v)| b.get(k) == Some(v))
            }
            _ => false,
        }
    }
}

impl ComputedValue {
    /// Get the variant name as a string
    pub fn type_name(&self) -> &'static str {
        match self {
            ComputedValue::Null => "Null",
            ComputedValue::Bool(_) => "Bool",
            ComputedValue::Int(_) => "Int",
            ComputedValue::Float(_) => "Float",
            ComputedValue::String(_) => "String",
            ComputedValue::Bytes(_) => "Bytes",
            ComputedValue::Array(_) => "Array",
            ComputedValue::Object(_) => "Object",
        }
    }

    /// Extract a float result, if this is one
    pub fn as_float(&self) -> Option<f64> {
        match self {
            ComputedValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Extract an integer result, if this is one
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ComputedValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Extract a string result, if this is one
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ComputedValue::String(v) => Some(v),
            _ => None,
        }
    }
}

impl From<f64> for ComputedValue {
    fn from(v: f64) -> Self {
        ComputedValue::Float(v)
    }
}

impl From<i64> for ComputedValue {
    fn from(v: i64) -> Self {
        ComputedValue::Int(v)
    }
}

impl From<bool> for ComputedValue {
    fn from(v: bool) -> Self {
        ComputedValue::Bool(v)
    }
}

impl From<&str> for ComputedValue {
    fn from(v: &str) -> Self {
        ComputedValue::String(v.to_string())
    }
}

impl From<String> for ComputedValue {
    fn from(v: String) -> Self {
        ComputedValue::String(v)
    }
}

impl From<Vec<u8>> for ComputedValue {
    fn from(v: Vec<u8>) -> Self {
        ComputedValue::Bytes(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_different_variants_never_equal() {
        assert_ne!(ComputedValue::Int(1), ComputedValue::Float(1.0));
        assert_ne!(
            ComputedValue::Bytes(b"hello".to_vec()),
            ComputedValue::String("hello".to_string())
        );
        assert_ne!(ComputedValue::Null, ComputedValue::Bool(false));
    }

    #[test]
    fn test_float_ieee754_equality() {
        assert_ne!(
            ComputedValue::Float(f64::NAN),
            ComputedValue::Float(f64::NAN)
        );
        assert_eq!(ComputedValue::Float(-0.0), ComputedValue::Float(0.0));
        assert_eq!(ComputedValue::Float(1234.56), ComputedValue::Float(1234.56));
    }

    #[test]
    fn test_object_equality_ignores_iteration_order() {
        let mut a = HashMap::new();
        a.insert("pv".to_string(), ComputedValue::Float(1.0));
        a.insert("ccy".to_string(), ComputedValue::String("USD".into()));

        let mut b = HashMap::new();
        b.insert("ccy".to_string(), ComputedValue::String("USD".into()));
        b.insert("pv".to_string(), ComputedValue::Float(1.0));

        assert_eq!(ComputedValue::Object(a), ComputedValue::Object(b));
    }

    #[test]
    fn test_type_name() {
        assert_eq!(ComputedValue::Null.type_name(), "Null");
        assert_eq!(ComputedValue::Float(1.0).type_name(), "Float");
        assert_eq!(ComputedValue::Array(vec![]).type_name(), "Array");
    }

    #[test]
    fn test_accessors() {
        assert_eq!(ComputedValue::Float(1234.56).as_float(), Some(1234.56));
        assert_eq!(ComputedValue::Int(7).as_float(), None);
        assert_eq!(ComputedValue::Int(7).as_int(), Some(7));
        assert_eq!(ComputedValue::from("x").as_str(), Some("x"));
    }

    #[test]
    fn test_from_conversions() {
        assert_eq!(ComputedValue::from(1234.56), ComputedValue::Float(1234.56));
        assert_eq!(ComputedValue::from(42i64), ComputedValue::Int(42));
        assert_eq!(ComputedValue::from(true), ComputedValue::Bool(true));
        assert_eq!(
            ComputedValue::from(vec![1u8, 2]),
            ComputedValue::Bytes(vec![1, 2])
        );
    }

    #[test]
    fn test_nested_array_equality() {
        let a = ComputedValue::Array(vec![
            ComputedValue::Float(1.0),
            ComputedValue::Array(vec![ComputedValue::Int(2)]),
        ]);
        let b = ComputedValue::Array(vec![
            ComputedValue::Float(1.0),
            ComputedValue::Array(vec![ComputedValue::Int(2)]),
        ]);
        assert_eq!(a, b);
    }
}
