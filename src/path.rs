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

//! Path selector sub-language
//!
//! `$` starts a path over the parameter and `@` a path over the element
//! under test inside a filter. Either is followed by any number of
//! selectors:
//!
//! | selector      | meaning                                   |
//! |---------------|-------------------------------------------|
//! | `.name`       | key, field or zero-argument method        |
//! | `[expr]`      | index or key computed by `expr`           |
//! | `.*`, `[*]`   | every element of an array or object       |
//! | `[?(expr)]`   | elements for which `expr` is truthy       |
//!
//! Inside a filter `$` still refers to the parameter, while `@` and bare
//! names refer to the element. Outside filters `@` is the parameter too. A
//! path containing a wildcard or filter yields an array; any other path
//! yields the single selected value.
//!
//! ```
//! use octofhir_expr::{path, evaluate_with};
//! use octofhir_expr::model::Value;
//! use serde_json::json;
//!
//! let parameter = Value::from(json!({"response-time": 100}));
//! let result = evaluate_with(r#"$["response-time"]"#, &parameter, [path::language()]).unwrap();
//! assert_eq!(result, Value::from(100));
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::evaluator::navigation::{index, resolve};
use crate::evaluator::{Context, Evaluable, EvaluationResult};
use crate::model::{HostObject, Value};
use crate::parser::{ParseResult, Parser};
use crate::registry::{self, Language, prefix_extension};

/// One path selector
#[derive(Debug, Clone)]
enum Selector {
    /// `.name`
    Child(String),
    /// `[expr]`
    Index(Evaluable),
    /// `.*` or `[*]`
    Wildcard,
    /// `[?(expr)]`
    Filter(Evaluable),
}

/// Where a path starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    /// `$`
    Root,
    /// `@`
    Current,
}

/// Compiled path
#[derive(Debug, Clone)]
struct Path {
    origin: Origin,
    selectors: Vec<Selector>,
}

/// Parameter seen by a filter predicate
///
/// Bare names resolve against the element; `$` paths reach back to the root.
#[derive(Debug)]
struct FilterScope {
    root: Arc<Value>,
    current: Value,
}

/// The full dialect extended with `$` and `@` paths
pub fn language() -> Language {
    Language::combine([
        registry::full(),
        prefix_extension("$", |parser| parse_path(parser, Origin::Root)),
        prefix_extension("@", |parser| parse_path(parser, Origin::Current)),
    ])
}

/// Parse the selectors following `$` or `@`
fn parse_path(parser: &mut Parser<'_>, origin: Origin) -> ParseResult<Evaluable> {
    let mut path = Path {
        origin,
        selectors: Vec::new(),
    };
    loop {
        if parser.consume_punct('.')? {
            if parser.consume_symbol("*")? {
                path.selectors.push(Selector::Wildcard);
            } else {
                let name = parser.expect_identifier()?;
                path.selectors.push(Selector::Child(name.to_string()));
            }
        } else if parser.consume_punct('[')? {
            let selector = if parser.consume_symbol("*")? {
                Selector::Wildcard
            } else if parser.consume_symbol("?")? {
                parser.expect_punct('(')?;
                let predicate = parser.parse_expression()?;
                parser.expect_punct(')')?;
                Selector::Filter(predicate)
            } else {
                Selector::Index(parser.parse_expression()?)
            };
            parser.expect_punct(']')?;
            path.selectors.push(selector);
        } else {
            break;
        }
    }
    Ok(Evaluable::new(move |context, parameter| {
        path.select(context, parameter)
    }))
}

impl Path {
    fn select(&self, context: &Context, parameter: &Value) -> EvaluationResult<Value> {
        let scope = parameter.as_host::<FilterScope>();
        let start = match (scope, self.origin) {
            (Some(scope), Origin::Root) => scope.root.as_ref(),
            (Some(scope), Origin::Current) => &scope.current,
            (None, _) => parameter,
        };
        let mut current = vec![start.clone()];
        let mut multiple = false;

        for selector in &self.selectors {
            context.check()?;
            let mut next = Vec::with_capacity(current.len());
            match selector {
                Selector::Child(name) => {
                    for item in &current {
                        keep(&mut next, resolve(context, item, name), multiple)?;
                    }
                }
                Selector::Index(key) => {
                    let key = key.evaluate(context, parameter)?;
                    for item in &current {
                        keep(&mut next, index(context, item, &key), multiple)?;
                    }
                }
                Selector::Wildcard => {
                    multiple = true;
                    for item in &current {
                        next.extend(children(item));
                    }
                }
                Selector::Filter(predicate) => {
                    multiple = true;
                    let root = match scope {
                        Some(scope) => Arc::clone(&scope.root),
                        None => Arc::new(parameter.clone()),
                    };
                    for child in current.iter().flat_map(children) {
                        let element = Value::host(FilterScope {
                            root: Arc::clone(&root),
                            current: child.clone(),
                        });
                        match predicate.evaluate(context, &element) {
                            Ok(verdict) if verdict.is_truthy() => next.push(child),
                            Ok(_) => {}
                            // elements lacking a selected key do not match
                            Err(error) if error.is_resolution() => {}
                            Err(error) => return Err(error),
                        }
                    }
                }
            }
            current = next;
        }

        if multiple {
            Ok(Value::Array(current))
        } else {
            Ok(current.pop().unwrap_or(Value::Null))
        }
    }
}

/// Push a selected value; once a path fans out, unresolvable elements are
/// skipped instead of failing the whole path
fn keep(
    selected: &mut Vec<Value>,
    result: EvaluationResult<Value>,
    multiple: bool,
) -> EvaluationResult<()> {
    match result {
        Ok(value) => selected.push(value),
        Err(error) if multiple && error.is_resolution() => {
            log::trace!("path element skipped: {error}");
        }
        Err(error) => return Err(error),
    }
    Ok(())
}

impl fmt::Display for FilterScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.current, f)
    }
}

impl HostObject for FilterScope {
    fn type_name(&self) -> &str {
        self.current.type_name()
    }

    fn get_key(&self, key: &str) -> Option<Value> {
        match &self.current {
            Value::Object(entries) => entries.get(key).cloned(),
            Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)).cloned(),
            Value::Host(host) => host.get_key(key),
            _ => None,
        }
    }

    fn get_field(&self, name: &str) -> Option<Value> {
        match &self.current {
            Value::Host(host) => host.get_field(name),
            _ => None,
        }
    }

    fn call_method(
        &self,
        context: &Context,
        name: &str,
        args: &[Value],
    ) -> Option<EvaluationResult<Value>> {
        match &self.current {
            Value::Host(host) => host.call_method(context, name, args),
            _ => None,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn children(value: &Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items.clone(),
        Value::Object(entries) => entries.values().cloned().collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::EvaluationError;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    fn store() -> Value {
        Value::from(json!({
            "store": {
                "book": [
                    {"title": "Sayings", "price": 8.95},
                    {"title": "Sword", "price": 12.99, "isbn": "0-553-21311-3"},
                    {"title": "Moby Dick", "price": 8.99, "isbn": "0-395-19395-8"}
                ],
                "bicycle": {"color": "red", "price": 19.95}
            },
            "selected": 1
        }))
    }

    fn eval(expression: &str) -> EvaluationResult<Value> {
        language()
            .compile(expression)
            .unwrap()
            .evaluate(&Context::background(), &store())
    }

    #[rstest]
    #[case("$.store.bicycle.color", json!("red"))]
    #[case(r#"$["store"]["book"][0].title"#, json!("Sayings"))]
    #[case("$.store.book[selected].title", json!("Sword"))]
    #[case("$.store.book[*].price", json!([8.95, 12.99, 8.99]))]
    #[case("$.store.book[?(@.price < 10)].title", json!(["Sayings", "Moby Dick"]))]
    #[case("$.store.book[*].isbn", json!(["0-553-21311-3", "0-395-19395-8"]))]
    #[case("$.store.bicycle.*", json!(["red", 19.95]))]
    #[case("len($.store.book[?(@.isbn)])", json!(2))]
    fn test_path_selection(#[case] expression: &str, #[case] expected: serde_json::Value) {
        assert_eq!(eval(expression).unwrap(), Value::from(expected));
    }

    #[test]
    fn test_path_composes_with_operators() {
        assert_eq!(
            eval(r#"$.store.bicycle.price > 10 && $.store.bicycle.color == "red""#).unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn test_single_path_reports_missing_selector() {
        assert!(matches!(
            eval("$.store.car"),
            Err(EvaluationError::UnknownSelector { ref selector, .. }) if selector == "car"
        ));
    }

    #[test]
    fn test_filter_reaches_root_and_element() {
        let parameter = Value::from(json!({
            "limit": 10,
            "book": [{"price": 8}, {"price": 12}]
        }));
        let language = language();
        let run = |expression: &str| {
            language
                .compile(expression)
                .unwrap()
                .evaluate(&Context::background(), &parameter)
                .unwrap()
        };

        assert_eq!(
            run("$.book[?(@.price < $.limit)]"),
            Value::from(json!([{"price": 8}]))
        );
        assert_eq!(run("$.book[?(price > limit)]"), Value::from(json!([])));
        assert_eq!(run("$.book[?(price > $.limit)].price"), Value::from(json!([12])));
        assert_eq!(run("@.limit"), Value::from(10));
    }

    #[test]
    fn test_nested_filter_keeps_the_root() {
        let parameter = Value::from(json!({
            "wanted": "b",
            "groups": [
                {"name": "x", "tags": ["a"]},
                {"name": "y", "tags": ["a", "b"]}
            ]
        }));
        let result = language()
            .compile("$.groups[?(len(@.tags[?(@ == $.wanted)]) > 0)].name")
            .unwrap()
            .evaluate(&Context::background(), &parameter)
            .unwrap();
        assert_eq!(result, Value::from(json!(["y"])));
    }

    #[test]
    fn test_unclosed_selector() {
        assert!(language().compile("$.store.book[0").is_err());
    }
}
