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

//! End-to-end evaluation of calibration expressions

use chrono::{DateTime, FixedOffset};
use octofhir_expr::evaluator::EvaluationError;
use octofhir_expr::registry::{self, Associativity, Language, precedence};
use octofhir_expr::{Context, Evaluable, Value, evaluate, evaluate_with, path};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;

#[rstest]
#[case("10 > 0", json!(null), "true")]
#[case("foo > 0", json!({"foo": -1.0}), "false")]
#[case("foo.bar > 0", json!({"foo": {"bar": -1.0}}), "false")]
#[case(
    "(requests_made * requests_succeeded / 100) >= 90",
    json!({"requests_made": 100, "requests_succeeded": 80}),
    "false"
)]
#[case(
    r#"http_response_body == "service is ok""#,
    json!({"http_response_body": "service is ok"}),
    "true"
)]
#[case("(mem_used / total_mem) * 100", json!({"total_mem": 1024, "mem_used": 512}), "50")]
#[case(
    "(7 < \"47\" == true ? \"hello world!\\n\\u263a\") + ` more text`",
    json!(null),
    "hello world!\n\u{263a} more text"
)]
fn test_calibration_expressions(
    #[case] expression: &str,
    #[case] parameter: serde_json::Value,
    #[case] expected: &str,
) {
    let result = evaluate(expression, &Value::from(parameter)).unwrap();
    assert_eq!(result.to_string(), expected);
}

#[rstest]
#[case(r#"" 5 " == 5"#, "false")]
#[case(r#""5" == 5"#, "true")]
#[case(r#"" 5 " + 1"#, " 5 1")]
#[case(r#""5" + 1"#, "6")]
fn test_numeric_strings_must_parse_fully(#[case] expression: &str, #[case] expected: &str) {
    let result = evaluate(expression, &Value::Null).unwrap();
    assert_eq!(result.to_string(), expected);
}

#[test]
fn test_date_comparison_override() {
    let later_than = registry::infix_operator(
        ">",
        precedence::RELATIONAL,
        Associativity::Left,
        |left, right| match (
            left.as_host::<DateTime<FixedOffset>>(),
            right.as_host::<DateTime<FixedOffset>>(),
        ) {
            (Some(l), Some(r)) => Ok(Value::Bool(l > r)),
            _ => Err(EvaluationError::message(format!(
                "unexpected operands types ({}) > ({})",
                left.type_name(),
                right.type_name()
            ))),
        },
    );
    let expression = "date(`2014-01-02`) > date(`2014-01-01 23:59:59`)";

    assert_eq!(
        evaluate_with(expression, &Value::Null, [later_than.clone()]).unwrap(),
        Value::Bool(true)
    );
    let error = evaluate_with("1 > 0", &Value::Null, [later_than]).unwrap_err();
    assert_eq!(error.to_string(), "unexpected operands types (number) > (number)");
}

#[test]
fn test_compiled_evaluable_with_constant() {
    let evaluable = Language::combine([registry::full(), registry::constant("maximum_time", 53)])
        .compile("response_time <= maximum_time")
        .unwrap();
    let context = Context::background();

    let results: Vec<bool> = (50..55)
        .map(|i| {
            let parameter: Value = [("response_time", i)].into_iter().collect();
            evaluable.evaluate_bool(&context, &parameter).unwrap()
        })
        .collect();
    assert_eq!(results, vec![true, true, true, false, false]);
}

#[test]
fn test_function_override() {
    let strlen = registry::function("strlen", |_, args| match args {
        [Value::String(text)] => Ok(Value::from(text.len())),
        _ => Err(EvaluationError::message("strlen expects one string")),
    });
    let result = evaluate_with(
        r#"strlen("someReallyLongInputString") <= 16"#,
        &Value::Null,
        [strlen],
    )
    .unwrap();
    assert_eq!(result, Value::Bool(false));
}

#[test]
fn test_path_language() {
    let parameter = Value::from(json!({"response-time": 100}));
    let result = evaluate_with(r#"$["response-time"]"#, &parameter, [path::language()]).unwrap();
    assert_eq!(result.to_string(), "100");
}

#[test]
fn test_pipe_postfix_operator() {
    let pipe = registry::postfix_operator("|", |parser, left| {
        let right = parser.parse_expression()?;
        Ok(Evaluable::new(move |context, parameter| {
            let threaded = left.evaluate(context, parameter)?;
            right.evaluate(context, &threaded)
        }))
    });
    let language = Language::combine([registry::arithmetic(), pipe.clone()]);
    let evaluable = language.compile(r#"{"foobar": 50} | foobar + 100"#).unwrap();
    let result = evaluable.evaluate(&Context::background(), &Value::Null).unwrap();
    assert_eq!(result, Value::from(150));

    // the postfix definition takes over the bitwise `|` of the full dialect
    let result = evaluate_with(r#"{"a": {"b": 2}} | a | b * 3"#, &Value::Null, [pipe]).unwrap();
    assert_eq!(result, Value::from(6));
}

#[test]
fn test_unknown_function_is_an_evaluation_error() {
    let evaluable = registry::full().compile("missing(1)").unwrap();
    let error = evaluable
        .evaluate(&Context::background(), &Value::Null)
        .unwrap_err();
    assert_eq!(error.to_string(), "unknown function missing()");
}
