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

//! Functions over structured values

use super::arity;
use crate::evaluator::{EvaluationError, EvaluationResult};
use crate::model::Value;
use crate::registry::{Language, function};

/// `len`, `keys` and `values`
pub fn collection_functions() -> Language {
    Language::combine([
        function("len", |_, args| {
            arity("len", args, 1)?;
            match &args[0] {
                Value::Array(items) => Ok(Value::from(items.len())),
                Value::Object(entries) => Ok(Value::from(entries.len())),
                Value::String(text) => Ok(Value::from(text.chars().count())),
                other => Err(unsupported("len", other)),
            }
        }),
        function("keys", |_, args| {
            arity("keys", args, 1)?;
            match &args[0] {
                Value::Object(entries) => Ok(Value::Array(
                    entries.keys().map(|key| Value::from(key.as_str())).collect(),
                )),
                other => Err(unsupported("keys", other)),
            }
        }),
        function("values", |_, args| {
            arity("values", args, 1)?;
            match &args[0] {
                Value::Object(entries) => Ok(Value::Array(entries.values().cloned().collect())),
                Value::Array(items) => Ok(Value::Array(items.clone())),
                other => Err(unsupported("values", other)),
            }
        }),
    ])
}

fn unsupported(name: &str, value: &Value) -> EvaluationError {
    EvaluationError::invalid_argument(name, format!("unsupported {}", value.type_name()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::Context;
    use crate::registry::base;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn eval(expression: &str) -> EvaluationResult<Value> {
        let parameter = Value::from(json!({"labels": {"b": 1, "a": 2}, "items": [1, 2, 3]}));
        Language::combine([base(), collection_functions()])
            .compile(expression)
            .unwrap()
            .evaluate(&Context::background(), &parameter)
    }

    #[test]
    fn test_len() {
        assert_eq!(eval("len(items)").unwrap(), Value::from(3));
        assert_eq!(eval("len(labels)").unwrap(), Value::from(2));
        assert_eq!(eval(r#"len("abc")"#).unwrap(), Value::from(3));
        assert!(eval("len(1)").is_err());
    }

    #[test]
    fn test_keys_and_values_keep_insertion_order() {
        assert_eq!(eval("keys(labels)").unwrap(), Value::from(vec!["b", "a"]));
        assert_eq!(eval("values(labels)").unwrap(), Value::from(vec![1, 2]));
    }
}
