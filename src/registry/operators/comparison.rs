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

//! Ordering operators for numbers, strings and comparable host values

use std::cmp::Ordering;

use crate::evaluator::{EvaluationError, EvaluationResult};
use crate::model::{TypeCoercion, Value};
use crate::registry::operator::precedence;
use crate::registry::{Associativity, Language, infix_operator};

/// `< <= > >=`
pub fn comparison_operators() -> Language {
    Language::combine([
        relational("<", Ordering::is_lt),
        relational("<=", Ordering::is_le),
        relational(">", Ordering::is_gt),
        relational(">=", Ordering::is_ge),
    ])
}

fn relational(symbol: &'static str, accept: fn(Ordering) -> bool) -> Language {
    infix_operator(
        symbol,
        precedence::RELATIONAL,
        Associativity::Left,
        move |left, right| compare(symbol, accept, left, right),
    )
}

/// Apply an ordering predicate
///
/// Numbers and numeric strings compare numerically (NaN compares false),
/// other strings lexically, host values through `host_cmp`.
pub fn compare(
    symbol: &str,
    accept: fn(Ordering) -> bool,
    left: &Value,
    right: &Value,
) -> EvaluationResult<Value> {
    if let Some((l, r)) = TypeCoercion::numeric_pair(left, right) {
        return Ok(Value::Bool(l.partial_cmp(&r).is_some_and(accept)));
    }
    TypeCoercion::compare(left, right)
        .map(|ordering| Value::Bool(accept(ordering)))
        .ok_or_else(|| EvaluationError::type_mismatch(symbol, left.type_name(), right.type_name()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Value::from(10), Value::from(0), true)]
    #[case(Value::from(7), Value::from("47"), false)]
    #[case(Value::from("10"), Value::from("9"), true)]
    #[case(Value::from("b"), Value::from("a"), true)]
    #[case(Value::from(f64::NAN), Value::from(1), false)]
    fn test_greater_than(#[case] left: Value, #[case] right: Value, #[case] expected: bool) {
        assert_eq!(
            compare(">", Ordering::is_gt, &left, &right).unwrap(),
            Value::Bool(expected)
        );
    }

    #[test]
    fn test_incomparable_operands() {
        let error = compare("<", Ordering::is_lt, &Value::from(true), &Value::from(1)).unwrap_err();
        assert_eq!(error.to_string(), "invalid operation (bool) < (number)");
    }
}
