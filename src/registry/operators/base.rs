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

//! Operators every dialect shares: constants, equality, `??` and `? :`

use crate::evaluator::{Evaluable, EvaluationResult};
use crate::model::{TypeCoercion, Value};
use crate::parser::{ParseResult, Parser};
use crate::registry::operator::precedence;
use crate::registry::{
    Associativity, Language, constant, infix_operator, infix_short_circuit, postfix_operator,
};

/// `true`, `false`, `nil` and `null`
pub fn base_constants() -> Language {
    Language::combine([
        constant("true", true),
        constant("false", false),
        constant("nil", Value::Null),
        constant("null", Value::Null),
    ])
}

/// `==` and `!=`
pub fn equality_operators() -> Language {
    Language::combine([
        infix_operator("==", precedence::EQUALITY, Associativity::Left, |l, r| {
            Ok(Value::Bool(TypeCoercion::loosely_equal(l, r)))
        }),
        infix_operator("!=", precedence::EQUALITY, Associativity::Left, |l, r| {
            Ok(Value::Bool(!TypeCoercion::loosely_equal(l, r)))
        }),
    ])
}

/// `a ?? b`: `b` when `a` is nil or cannot be resolved
///
/// Cancellation and type errors from `a` still propagate.
pub fn coalesce_operator() -> Language {
    infix_short_circuit(
        "??",
        precedence::COALESCE,
        Associativity::Right,
        |left, right| {
            Ok(Evaluable::new(move |context, parameter| {
                match left.evaluate(context, parameter) {
                    Ok(Value::Null) => right.evaluate(context, parameter),
                    Err(error) if error.is_resolution() => right.evaluate(context, parameter),
                    other => other,
                }
            }))
        },
    )
}

/// `cond ? then : else`, with `cond ? then` yielding nil when `cond` is falsy
pub fn ternary_operator() -> Language {
    postfix_operator("?", parse_ternary)
}

fn parse_ternary(parser: &mut Parser<'_>, condition: Evaluable) -> ParseResult<Evaluable> {
    let then = parser.parse_expression()?;
    let otherwise = if parser.consume_punct(':')? {
        Some(parser.parse_expression()?)
    } else {
        None
    };
    Ok(Evaluable::new(move |context, parameter| -> EvaluationResult<Value> {
        if condition.evaluate(context, parameter)?.is_truthy() {
            then.evaluate(context, parameter)
        } else {
            match &otherwise {
                Some(otherwise) => otherwise.evaluate(context, parameter),
                None => Ok(Value::Null),
            }
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::{Context, EvaluationError};
    use crate::registry::base;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn eval(expression: &str, parameter: serde_json::Value) -> EvaluationResult<Value> {
        base()
            .compile(expression)
            .unwrap()
            .evaluate(&Context::background(), &Value::from(parameter))
    }

    #[test]
    fn test_equality_is_literal_for_strings() {
        let parameter = json!({"http_response_body": "service is ok"});
        assert_eq!(
            eval(r#"http_response_body == "service is ok""#, parameter.clone()).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            eval(r#"http_response_body != "service is ok""#, parameter).unwrap(),
            Value::Bool(false)
        );
        assert_eq!(eval(r#"1 == "1""#, json!(null)).unwrap(), Value::Bool(true));
        assert_eq!(eval("[1, nil] == [1, null]", json!(null)).unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_coalesce() {
        assert_eq!(eval("missing ?? 3", json!({})).unwrap(), Value::from(3));
        assert_eq!(eval("a ?? 3", json!({"a": null})).unwrap(), Value::from(3));
        assert_eq!(eval("a ?? 3", json!({"a": 0})).unwrap(), Value::from(0));
        assert_eq!(eval("a ?? b ?? 4", json!({})).unwrap(), Value::from(4));
    }

    #[test]
    fn test_coalesce_propagates_cancellation() {
        let (context, handle) = Context::background().with_cancel();
        handle.cancel();
        let inner = base().compile("x ?? 1").unwrap();
        assert!(matches!(
            inner.evaluate(&context, &Value::Null),
            Err(EvaluationError::Cancelled)
        ));
    }

    #[test]
    fn test_ternary_shorthand_defaults_to_nil() {
        assert_eq!(eval("ok ? \"up\"", json!({"ok": true})).unwrap(), Value::from("up"));
        assert_eq!(eval("ok ? \"up\"", json!({"ok": false})).unwrap(), Value::Null);
        assert_eq!(
            eval("ok ? \"up\" : \"down\"", json!({"ok": ""})).unwrap(),
            Value::from("down")
        );
    }
}
