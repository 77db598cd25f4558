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

//! Best-effort coercions shared by the built-in operators

use std::cmp::Ordering;

use super::value::Value;

/// Coercion helpers for expression values
///
/// Every helper returns `None` when the operand cannot be coerced; callers
/// turn that into a type error naming the operator involved.
pub struct TypeCoercion;

impl TypeCoercion {
    /// Coerce to a number
    ///
    /// Numbers pass through; strings are accepted only when the whole text
    /// parses as a float, surrounding whitespace included. Booleans are
    /// never numbers.
    pub fn to_number(value: &Value) -> Option<f64> {
        match value {
            Value::Number(n) => Some(*n),
            Value::String(s) => Self::parse_number(s),
            _ => None,
        }
    }

    /// Coerce to text
    pub fn to_text(value: &Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(_) | Value::Bool(_) => Some(value.to_string()),
            _ => None,
        }
    }

    /// Coerce to a boolean
    pub fn to_bool(value: &Value) -> Option<bool> {
        match value {
            Value::Bool(b) => Some(*b),
            Value::String(s) => match s.as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Coerce to an integer, truncating the fractional part
    ///
    /// Numbers outside the `i64` range do not coerce.
    pub fn to_integer(value: &Value) -> Option<i64> {
        let n = Self::to_number(value)?.trunc();
        // i64::MAX rounds up to 2^63 as f64, which is itself out of range
        (n >= i64::MIN as f64 && n < i64::MAX as f64).then_some(n as i64)
    }

    /// Coerce both operands to numbers
    pub fn numeric_pair(left: &Value, right: &Value) -> Option<(f64, f64)> {
        Some((Self::to_number(left)?, Self::to_number(right)?))
    }

    /// Order two operands
    ///
    /// Operands that both coerce to numbers compare numerically, two
    /// non-numeric strings compare lexically, host values defer to
    /// [`HostObject::host_cmp`](super::HostObject::host_cmp).
    pub fn compare(left: &Value, right: &Value) -> Option<Ordering> {
        if let Some((l, r)) = Self::numeric_pair(left, right) {
            return l.partial_cmp(&r);
        }
        match (left, right) {
            (Value::String(l), Value::String(r)) => Some(l.cmp(r)),
            (Value::Host(l), Value::Host(r)) => l.host_cmp(&**r),
            _ => None,
        }
    }

    /// Equality used by `==` and `!=`
    ///
    /// A number and a fully-numeric string compare by value. Two strings
    /// always compare literally.
    pub fn loosely_equal(left: &Value, right: &Value) -> bool {
        match (left, right) {
            (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => {
                Self::parse_number(s).is_some_and(|parsed| parsed == *n)
            }
            _ => left == right,
        }
    }

    fn parse_number(text: &str) -> Option<f64> {
        text.parse::<f64>().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Value::from(4), Some(4.0))]
    #[case(Value::from("47"), Some(47.0))]
    #[case(Value::from("2.5"), Some(2.5))]
    #[case(Value::from(" 2.5 "), None)]
    #[case(Value::from("5\n"), None)]
    #[case(Value::from("47abc"), None)]
    #[case(Value::from(""), None)]
    #[case(Value::from(true), None)]
    #[case(Value::Null, None)]
    fn test_to_number(#[case] value: Value, #[case] expected: Option<f64>) {
        assert_eq!(TypeCoercion::to_number(&value), expected);
    }

    #[rstest]
    #[case(Value::from(7.9), Some(7))]
    #[case(Value::from(-7.9), Some(-7))]
    #[case(Value::from("12"), Some(12))]
    #[case(Value::from(-9.223_372_036_854_776e18), Some(i64::MIN))]
    #[case(Value::from(9.223_372_036_854_776e18), None)]
    #[case(Value::from(1e300), None)]
    #[case(Value::Number(f64::NAN), None)]
    #[case(Value::Number(f64::INFINITY), None)]
    fn test_to_integer(#[case] value: Value, #[case] expected: Option<i64>) {
        assert_eq!(TypeCoercion::to_integer(&value), expected);
    }

    #[test]
    fn test_compare_mixed_operands() {
        assert_eq!(
            TypeCoercion::compare(&Value::from(7), &Value::from("47")),
            Some(Ordering::Less)
        );
        assert_eq!(
            TypeCoercion::compare(&Value::from("abc"), &Value::from("abd")),
            Some(Ordering::Less)
        );
        assert_eq!(TypeCoercion::compare(&Value::from(1), &Value::from("one")), None);
        assert_eq!(TypeCoercion::compare(&Value::from(true), &Value::from(false)), None);
    }

    #[test]
    fn test_loose_equality_keeps_strings_literal() {
        assert!(TypeCoercion::loosely_equal(
            &Value::from("service is ok"),
            &Value::from("service is ok")
        ));
        assert!(TypeCoercion::loosely_equal(&Value::from(1), &Value::from("1.0")));
        assert!(!TypeCoercion::loosely_equal(&Value::from("1"), &Value::from("1.0")));
        assert!(!TypeCoercion::loosely_equal(&Value::from(0), &Value::from(false)));
        assert!(!TypeCoercion::loosely_equal(&Value::from(5), &Value::from(" 5 ")));
    }

    #[test]
    fn test_to_text_and_bool() {
        assert_eq!(TypeCoercion::to_text(&Value::from(50)).as_deref(), Some("50"));
        assert_eq!(TypeCoercion::to_text(&Value::Null), None);
        assert_eq!(TypeCoercion::to_bool(&Value::from("false")), Some(false));
        assert_eq!(TypeCoercion::to_bool(&Value::from(1)), None);
    }
}
