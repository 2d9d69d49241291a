//! Recursive normalization of string-encoded numbers.
//!
//! Proving backends emit every big number as a JSON string. [`normalize`]
//! walks an arbitrary JSON tree and turns each raw numeric string into a
//! [`FieldElement`], leaving the shape of the tree untouched.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::field::FieldElement;

/// A JSON tree after numeric normalization.
#[derive(Clone, Debug, PartialEq)]
pub enum Normalized {
    Scalar(FieldElement),
    Sequence(Vec<Normalized>),
    Mapping(BTreeMap<String, Normalized>),
    /// Any leaf that is not a raw numeric string: other strings, booleans,
    /// JSON numbers and `null`.
    Unmatched(Value),
}

/// Normalize `value`, preserving sequence order and length and every mapping key.
pub fn normalize(value: &Value) -> Normalized {
    match value {
        Value::String(s) => match FieldElement::parse_raw(s) {
            Some(fe) => Normalized::Scalar(fe),
            None => Normalized::Unmatched(value.clone()),
        },
        Value::Array(items) => Normalized::Sequence(items.iter().map(normalize).collect()),
        Value::Object(map) => Normalized::Mapping(
            map.iter()
                .map(|(k, v)| (k.clone(), normalize(v)))
                .collect(),
        ),
        other => Normalized::Unmatched(other.clone()),
    }
}

impl Normalized {
    pub fn as_scalar(&self) -> Option<&FieldElement> {
        match self {
            Normalized::Scalar(fe) => Some(fe),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Normalized]> {
        match self {
            Normalized::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Look up `key` if this is a mapping.
    pub fn get(&self, key: &str) -> Option<&Normalized> {
        match self {
            Normalized::Mapping(map) => map.get(key),
            _ => None,
        }
    }

    /// Back to JSON, rendering every scalar as a decimal string.
    ///
    /// Scalars come out canonical: `"007"` and `"0x7"` both render as `"7"`.
    pub fn to_json(&self) -> Value {
        match self {
            Normalized::Scalar(fe) => Value::String(fe.to_string()),
            Normalized::Sequence(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Normalized::Mapping(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Normalized::Unmatched(v) => v.clone(),
        }
    }
}
