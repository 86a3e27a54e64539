//! Actor attributes and the coerce-or-default resolver
//!
//! Descriptions come from data files and user input that may be incomplete
//! or stale. Resolution never fails: a missing or malformed variation
//! yields the caller's default.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Supplied attribute values, keyed by attribute name.
pub type Variations = BTreeMap<String, AttributeValue>;

/// Value domain of an attribute.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeKind {
    Bool,
    Int,
    Float,
    String,
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AttributeKind::Bool => "bool",
            AttributeKind::Int => "int",
            AttributeKind::Float => "float",
            AttributeKind::String => "string",
        };
        f.write_str(name)
    }
}

/// A textual or typed attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Int(i32),
    Float(f32),
    String(String),
}

impl AttributeValue {
    pub fn kind(&self) -> AttributeKind {
        match self {
            AttributeValue::Bool(_) => AttributeKind::Bool,
            AttributeValue::Int(_) => AttributeKind::Int,
            AttributeValue::Float(_) => AttributeKind::Float,
            AttributeValue::String(_) => AttributeKind::String,
        }
    }

    /// Coerce into a value of `kind`, or `None` if it does not parse.
    pub fn coerce(&self, kind: AttributeKind) -> Option<AttributeValue> {
        match kind {
            AttributeKind::Bool => bool::from_attribute(self).map(AttributeValue::Bool),
            AttributeKind::Int => i32::from_attribute(self).map(AttributeValue::Int),
            AttributeKind::Float => f32::from_attribute(self).map(AttributeValue::Float),
            AttributeKind::String => String::from_attribute(self).map(AttributeValue::String),
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Bool(v) => write!(f, "{v}"),
            AttributeValue::Int(v) => write!(f, "{v}"),
            AttributeValue::Float(v) => write!(f, "{v}"),
            AttributeValue::String(v) => f.write_str(v),
        }
    }
}

impl From<bool> for AttributeValue {
    fn from(v: bool) -> Self {
        AttributeValue::Bool(v)
    }
}

impl From<i32> for AttributeValue {
    fn from(v: i32) -> Self {
        AttributeValue::Int(v)
    }
}

impl From<f32> for AttributeValue {
    fn from(v: f32) -> Self {
        AttributeValue::Float(v)
    }
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        AttributeValue::String(v.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(v: String) -> Self {
        AttributeValue::String(v)
    }
}

/// Types an attribute value can be coerced into.
pub trait FromAttribute: Sized {
    const KIND: AttributeKind;

    fn from_attribute(value: &AttributeValue) -> Option<Self>;
}

impl FromAttribute for f32 {
    const KIND: AttributeKind = AttributeKind::Float;

    fn from_attribute(value: &AttributeValue) -> Option<Self> {
        let parsed = match value {
            AttributeValue::Float(v) => *v,
            AttributeValue::Int(v) => *v as f32,
            AttributeValue::String(text) => {
                let text = text.trim();
                // "3.5f" is accepted, as written in recommended values
                let text = text
                    .strip_suffix(['f', 'F'])
                    .filter(|t| !t.is_empty())
                    .unwrap_or(text);
                text.parse::<f32>().ok()?
            }
            AttributeValue::Bool(_) => return None,
        };
        parsed.is_finite().then_some(parsed)
    }
}

impl FromAttribute for i32 {
    const KIND: AttributeKind = AttributeKind::Int;

    fn from_attribute(value: &AttributeValue) -> Option<Self> {
        match value {
            AttributeValue::Int(v) => Some(*v),
            AttributeValue::Float(v) => {
                let in_range = *v >= -2_147_483_648.0 && *v < 2_147_483_648.0;
                (v.fract() == 0.0 && in_range).then_some(*v as i32)
            }
            AttributeValue::String(text) => text.trim().parse().ok(),
            AttributeValue::Bool(_) => None,
        }
    }
}

impl FromAttribute for bool {
    const KIND: AttributeKind = AttributeKind::Bool;

    fn from_attribute(value: &AttributeValue) -> Option<Self> {
        match value {
            AttributeValue::Bool(v) => Some(*v),
            AttributeValue::String(text) => {
                let text = text.trim();
                if text.eq_ignore_ascii_case("true") {
                    Some(true)
                } else if text.eq_ignore_ascii_case("false") {
                    Some(false)
                } else {
                    None
                }
            }
            AttributeValue::Int(_) | AttributeValue::Float(_) => None,
        }
    }
}

impl FromAttribute for String {
    const KIND: AttributeKind = AttributeKind::String;

    fn from_attribute(value: &AttributeValue) -> Option<Self> {
        Some(value.to_string())
    }
}

/// Effective value of attribute `name`.
///
/// Returns `default` when `name` is absent from `variations` or its value
/// cannot be coerced into `T`.
pub fn resolve<T: FromAttribute>(name: &str, variations: &Variations, default: T) -> T {
    let Some(value) = variations.get(name) else {
        return default;
    };
    match T::from_attribute(value) {
        Some(resolved) => resolved,
        None => {
            let expected = T::KIND;
            tracing::warn!(
                attribute = name,
                value = %value,
                %expected,
                "malformed attribute value, using default"
            );
            default
        }
    }
}
