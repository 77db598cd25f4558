// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Core value type flowing through expression evaluation

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

use super::host::{HostObject, HostValue};

/// Largest magnitude where every integer is exactly representable as f64
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Dynamically-typed value produced and consumed by expressions
///
/// The set of shapes is closed: operators pattern-match on the variant and
/// report a type error for combinations they do not support. Anything the
/// engine does not understand natively travels as [`Value::Host`].
#[derive(Clone, Default)]
pub enum Value {
    /// Absent value (`nil`)
    #[default]
    Null,

    /// Boolean value
    Bool(bool),

    /// Number with float64 precision; integer inputs are promoted
    Number(f64),

    /// Text value
    String(String),

    /// Ordered sequence
    Array(Vec<Value>),

    /// Key/value mapping preserving insertion order
    Object(IndexMap<String, Value>),

    /// Opaque host value, passed through unmodified
    Host(HostValue),
}

impl Value {
    /// Wrap a host object
    pub fn host<T: HostObject>(object: T) -> Self {
        Self::Host(HostValue::new(object))
    }

    /// Convert any serializable record into a value
    ///
    /// This is the default adapter for plain Rust structs: named fields
    /// become mapping keys, sequences become arrays.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(value).map(Self::from)
    }

    /// Get the shape name used in error messages
    pub fn type_name(&self) -> &str {
        match self {
            Self::Null => "nil",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
            Self::Host(host) => host.type_name(),
        }
    }

    /// Check if the value is `nil`
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Truthiness used by conditionals
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::String(s) => !s.is_empty(),
            Self::Array(items) => !items.is_empty(),
            Self::Object(entries) => !entries.is_empty(),
            Self::Host(_) => true,
        }
    }

    /// Get the boolean payload
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the numeric payload
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Get the text payload
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the sequence payload
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Get the mapping payload
    pub fn as_object(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Self::Object(entries) => Some(entries),
            _ => None,
        }
    }

    /// Downcast a host value to its concrete type
    pub fn as_host<T: 'static>(&self) -> Option<&T> {
        match self {
            Self::Host(host) => host.downcast_ref::<T>(),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(l), Self::Bool(r)) => l == r,
            (Self::Number(l), Self::Number(r)) => l == r,
            (Self::String(l), Self::String(r)) => l == r,
            (Self::Array(l), Self::Array(r)) => l == r,
            (Self::Object(l), Self::Object(r)) => l == r,
            (Self::Host(l), Self::Host(r)) => l == r,
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "Null"),
            Self::Bool(b) => write!(f, "Bool({b})"),
            Self::Number(n) => write!(f, "Number({n})"),
            Self::String(s) => write!(f, "String({s:?})"),
            Self::Array(items) => f.debug_list().entries(items).finish(),
            Self::Object(entries) => f.debug_map().entries(entries).finish(),
            Self::Host(host) => write!(f, "Host({host:?})"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "<nil>"),
            Self::Bool(b) => write!(f, "{b}"),
            // f64 Display already drops the fractional part of integral values
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s}"),
            Self::Host(host) => write!(f, "{host}"),
            Self::Array(_) | Self::Object(_) => {
                write!(f, "{}", serde_json::Value::from(self.clone()))
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Number(n) => serializer.serialize_f64(*n),
            Self::String(s) => serializer.serialize_str(s),
            Self::Array(items) => items.serialize(serializer),
            Self::Object(entries) => entries.serialize(serializer),
            Self::Host(host) => serializer.collect_str(host),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::Array(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(entries) => Self::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, Self::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Number(n) if n.fract() == 0.0 && n.abs() < MAX_SAFE_INTEGER => {
                serde_json::Value::Number(serde_json::Number::from(n as i64))
            }
            Value::Number(n) => serde_json::Number::from_f64(n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s),
            Value::Array(items) => {
                serde_json::Value::Array(items.into_iter().map(Into::into).collect())
            }
            Value::Object(entries) => serde_json::Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, value.into()))
                    .collect(),
            ),
            Value::Host(host) => serde_json::Value::String(host.to_string()),
        }
    }
}

macro_rules! impl_from_number {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(n: $ty) -> Self {
                    Self::Number(n as f64)
                }
            }
        )*
    };
}

impl_from_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<HostValue> for Value {
    fn from(host: HostValue) -> Self {
        Self::Host(host)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<IndexMap<String, T>> for Value {
    fn from(entries: IndexMap<String, T>) -> Self {
        Self::Object(
            entries
                .into_iter()
                .map(|(key, value)| (key, value.into()))
                .collect(),
        )
    }
}

impl<T: Into<Value>> From<HashMap<String, T>> for Value {
    fn from(entries: HashMap<String, T>) -> Self {
        Self::Object(
            entries
                .into_iter()
                .map(|(key, value)| (key, value.into()))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::Object(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_integral_numbers_display_without_fraction() {
        assert_eq!(Value::from(50).to_string(), "50");
        assert_eq!(Value::from(0.5).to_string(), "0.5");
        assert_eq!(Value::from(-3.0).to_string(), "-3");
    }

    #[test]
    fn test_integer_inputs_promote_to_float() {
        assert_eq!(Value::from(512u32), Value::Number(512.0));
        assert_eq!(Value::from(-1i64), Value::Number(-1.0));
    }

    #[test]
    fn test_json_round_trip_preserves_key_order() {
        let value = Value::from(json!({"b": 1, "a": [true, null, "x"]}));
        let Value::Object(entries) = &value else {
            panic!("expected object, got {value:?}");
        };
        assert_eq!(entries.keys().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(value.to_string(), r#"{"b":1,"a":[true,null,"x"]}"#);
    }

    #[test]
    fn test_from_serialize_maps_struct_fields() {
        #[derive(Serialize)]
        struct Reading {
            response_time: u32,
            healthy: bool,
        }

        let value = Value::from_serialize(&Reading {
            response_time: 42,
            healthy: true,
        })
        .unwrap();

        let entries = value.as_object().unwrap();
        assert_eq!(entries["response_time"], Value::Number(42.0));
        assert_eq!(entries["healthy"], Value::Bool(true));
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::from(0).is_truthy());
        assert!(!Value::from(f64::NAN).is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(Value::from("x").is_truthy());
        assert!(Value::from(vec![1]).is_truthy());
    }
}
