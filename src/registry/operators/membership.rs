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

//! The `in` operator

use crate::evaluator::{EvaluationError, EvaluationResult};
use crate::model::{TypeCoercion, Value};
use crate::registry::operator::precedence;
use crate::registry::{Associativity, Language, infix_operator};

/// `needle in haystack`
///
/// Arrays test their elements with `==` semantics, objects test their keys
/// and strings test for a substring.
pub fn membership_operator() -> Language {
    infix_operator("in", precedence::EQUALITY, Associativity::Left, contains)
}

fn contains(needle: &Value, haystack: &Value) -> EvaluationResult<Value> {
    let found = match haystack {
        Value::Array(items) => items
            .iter()
            .any(|item| TypeCoercion::loosely_equal(needle, item)),
        Value::Object(entries) => match TypeCoercion::to_text(needle) {
            Some(key) => entries.contains_key(&key),
            None => false,
        },
        Value::String(text) => match TypeCoercion::to_text(needle) {
            Some(part) => text.contains(&part),
            None => false,
        },
        _ => {
            return Err(EvaluationError::type_mismatch(
                "in",
                needle.type_name(),
                haystack.type_name(),
            ));
        }
    };
    Ok(Value::Bool(found))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::Context;
    use crate::registry::base;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(r#""b" in ["a", "b"]"#, true)]
    #[case(r#""2" in [1, 2]"#, true)]
    #[case(r#""c" in ["a", "b"]"#, false)]
    #[case(r#""level" in {"level": 3}"#, true)]
    #[case(r#""ell" in "hello""#, true)]
    #[case(r#"status in codes"#, true)]
    fn test_membership(#[case] expression: &str, #[case] expected: bool) {
        let parameter = Value::from(json!({"status": 404, "codes": [200, 404]}));
        let result = Language::combine([base(), membership_operator()])
            .compile(expression)
            .unwrap()
            .evaluate(&Context::background(), &parameter)
            .unwrap();
        assert_eq!(result, Value::Bool(expected));
    }

    #[test]
    fn test_scalar_haystack_rejected() {
        assert!(contains(&Value::from(1), &Value::from(1)).is_err());
    }
}
