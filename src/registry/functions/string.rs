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

//! String functions

use super::{arity, text_argument, text_at};
use crate::evaluator::EvaluationResult;
use crate::model::Value;
use crate::registry::{Language, function};

/// `strlen`, `upper`, `lower`, `trim`, `contains`, `starts_with`, `ends_with`
pub fn string_functions() -> Language {
    Language::combine([
        function("strlen", |_, args| {
            // length in characters, not bytes
            let text = text_argument("strlen", args)?;
            Ok(Value::from(text.chars().count()))
        }),
        function("upper", |_, args| {
            text_argument("upper", args).map(|text| Value::from(text.to_uppercase()))
        }),
        function("lower", |_, args| {
            text_argument("lower", args).map(|text| Value::from(text.to_lowercase()))
        }),
        function("trim", |_, args| {
            text_argument("trim", args).map(|text| Value::from(text.trim()))
        }),
        predicate("contains", |text, part| text.contains(part)),
        predicate("starts_with", |text, part| text.starts_with(part)),
        predicate("ends_with", |text, part| text.ends_with(part)),
    ])
}

fn predicate(name: &'static str, test: fn(&str, &str) -> bool) -> Language {
    function(name, move |_, args| binary(name, args, test))
}

fn binary(name: &str, args: &[Value], test: fn(&str, &str) -> bool) -> EvaluationResult<Value> {
    arity(name, args, 2)?;
    let text = text_at(name, args, 0)?;
    let part = text_at(name, args, 1)?;
    Ok(Value::Bool(test(&text, &part)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::Context;
    use crate::registry::base;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(r#"strlen("12345")"#, Value::from(5))]
    #[case(r#"strlen("ünïcode")"#, Value::from(7))]
    #[case(r#"upper(name)"#, Value::from("ADA"))]
    #[case(r#"lower("MiXeD")"#, Value::from("mixed"))]
    #[case(r#"trim("  padded ")"#, Value::from("padded"))]
    #[case(r#"contains(name, "d")"#, Value::Bool(true))]
    #[case(r#"starts_with(name, "A")"#, Value::Bool(true))]
    #[case(r#"ends_with(name, "x")"#, Value::Bool(false))]
    fn test_string_functions(#[case] expression: &str, #[case] expected: Value) {
        let result = Language::combine([base(), string_functions()])
            .compile(expression)
            .unwrap()
            .evaluate(&Context::background(), &Value::from(json!({"name": "Ada"})))
            .unwrap();
        assert_eq!(result, expected);
    }

    #[test]
    fn test_wrong_arity() {
        let error = Language::combine([base(), string_functions()])
            .compile(r#"contains("abc")"#)
            .unwrap()
            .evaluate(&Context::background(), &Value::Null)
            .unwrap_err();
        assert!(error.is_type_error());
    }
}
