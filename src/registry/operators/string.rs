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

//! Text operators: concatenation and regular-expression matching

use regex::Regex;

use crate::evaluator::{Evaluable, EvaluationError, EvaluationResult};
use crate::model::{TypeCoercion, Value};
use crate::parser::ParseError;
use crate::registry::operator::precedence;
use crate::registry::{Associativity, Language, infix_operator, infix_short_circuit};

/// `+` adding two numbers and concatenating anything else textual
pub fn concatenation_operator() -> Language {
    infix_operator("+", precedence::ADDITIVE, Associativity::Left, |left, right| {
        if let (Value::Number(l), Value::Number(r)) = (left, right) {
            return Ok(Value::Number(l + r));
        }
        concatenate(left, right)
    })
}

/// `+` adding numerically coercible operands and concatenating the rest
///
/// This is the `+` of the full dialect, where `"40" + 2` is `42` and
/// `"id-" + 7` is `"id-7"`.
pub fn addition_operator() -> Language {
    infix_operator("+", precedence::ADDITIVE, Associativity::Left, |left, right| {
        match TypeCoercion::numeric_pair(left, right) {
            Some((l, r)) => Ok(Value::Number(l + r)),
            None => concatenate(left, right),
        }
    })
}

fn concatenate(left: &Value, right: &Value) -> EvaluationResult<Value> {
    match (TypeCoercion::to_text(left), TypeCoercion::to_text(right)) {
        (Some(l), Some(r)) => Ok(Value::String(l + &r)),
        _ => Err(EvaluationError::type_mismatch(
            "+",
            left.type_name(),
            right.type_name(),
        )),
    }
}

/// `=~` and `!~`
///
/// A constant pattern is compiled once, with the expression; an invalid
/// constant pattern fails compilation.
pub fn regex_operators() -> Language {
    Language::combine([matcher("=~", true), matcher("!~", false)])
}

fn matcher(symbol: &'static str, expected: bool) -> Language {
    infix_short_circuit(
        symbol,
        precedence::EQUALITY,
        Associativity::Left,
        move |subject, pattern| {
            if let Some(Value::String(source)) = pattern.as_constant() {
                let regex = Regex::new(source)
                    .map_err(|e| ParseError::extension(symbol, e.to_string()))?;
                return Ok(Evaluable::new(move |context, parameter| {
                    let text = text_operand(symbol, &subject.evaluate(context, parameter)?)?;
                    Ok(Value::Bool(regex.is_match(&text) == expected))
                }));
            }
            Ok(Evaluable::new(move |context, parameter| {
                let text = text_operand(symbol, &subject.evaluate(context, parameter)?)?;
                let source = text_operand(symbol, &pattern.evaluate(context, parameter)?)?;
                let regex = Regex::new(&source)
                    .map_err(|e| EvaluationError::invalid_argument(symbol, e.to_string()))?;
                Ok(Value::Bool(regex.is_match(&text) == expected))
            }))
        },
    )
}

fn text_operand(symbol: &str, value: &Value) -> EvaluationResult<String> {
    TypeCoercion::to_text(value).ok_or_else(|| super::invalid_operand(symbol, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::Context;
    use crate::registry::base;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn language() -> Language {
        Language::combine([base(), concatenation_operator(), regex_operators()])
    }

    fn eval(expression: &str, parameter: serde_json::Value) -> EvaluationResult<Value> {
        language()
            .compile(expression)
            .unwrap()
            .evaluate(&Context::background(), &Value::from(parameter))
    }

    #[test]
    fn test_concatenation() {
        assert_eq!(eval(r#""id-" + 7"#, json!(null)).unwrap(), Value::from("id-7"));
        assert_eq!(eval("1 + 2", json!(null)).unwrap(), Value::from(3));
        assert_eq!(
            eval("\"hello world!\\n\\u263a\" + ` more text`", json!(null)).unwrap(),
            Value::from("hello world!\n\u{263a} more text")
        );
        assert!(eval("nil + \"x\"", json!(null)).is_err());
    }

    #[test]
    fn test_addition_prefers_numbers() {
        let language = Language::combine([base(), addition_operator()]);
        let eval = |expression: &str| {
            language
                .compile(expression)
                .unwrap()
                .evaluate(&Context::background(), &Value::Null)
                .unwrap()
        };
        assert_eq!(eval(r#""40" + 2"#), Value::from(42));
        assert_eq!(eval(r#""id-" + 7"#), Value::from("id-7"));
        assert_eq!(eval(r#""a" + true"#), Value::from("atrue"));
    }

    #[test]
    fn test_regex_match() {
        let parameter = json!({"host": "api-7.example.com", "pattern": "^api-\\d+"});
        assert_eq!(
            eval(r#"host =~ "^api-\\d+\\.""#, parameter.clone()).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(eval("host !~ pattern", parameter.clone()).unwrap(), Value::Bool(false));
        assert_eq!(eval(r#"host =~ "^web""#, parameter).unwrap(), Value::Bool(false));
    }

    #[test]
    fn test_invalid_constant_pattern_fails_compilation() {
        let error = language().compile(r#"x =~ "(""#).unwrap_err();
        assert!(matches!(error, ParseError::Extension { ref operator, .. } if operator == "=~"));
    }
}
