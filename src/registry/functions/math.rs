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

//! Math functions

use super::number_argument;
use crate::evaluator::{EvaluationError, EvaluationResult};
use crate::model::{TypeCoercion, Value};
use crate::registry::{Language, function};

/// `abs`, `floor`, `ceil`, `round`, `min` and `max`
pub fn math_functions() -> Language {
    Language::combine([
        unary("abs", f64::abs),
        unary("floor", f64::floor),
        unary("ceil", f64::ceil),
        unary("round", f64::round),
        function("min", |_, args| extremum("min", args, f64::min)),
        function("max", |_, args| extremum("max", args, f64::max)),
    ])
}

fn unary(name: &'static str, op: fn(f64) -> f64) -> Language {
    function(name, move |_, args| {
        number_argument(name, args).map(|n| Value::Number(op(n)))
    })
}

/// Fold the numeric arguments, or the elements of a single array argument
fn extremum(name: &str, args: &[Value], pick: fn(f64, f64) -> f64) -> EvaluationResult<Value> {
    let items = match args {
        [Value::Array(items)] => items.as_slice(),
        _ => args,
    };
    let mut result: Option<f64> = None;
    for item in items {
        let n = TypeCoercion::to_number(item).ok_or_else(|| {
            EvaluationError::invalid_argument(
                name,
                format!("expects numbers, got {}", item.type_name()),
            )
        })?;
        result = Some(result.map_or(n, |acc| pick(acc, n)));
    }
    result
        .map(Value::Number)
        .ok_or_else(|| EvaluationError::invalid_argument(name, "expects at least one number"))
}
