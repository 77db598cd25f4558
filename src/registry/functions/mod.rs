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

//! Built-in function definitions
//!
//! Functions receive their arguments already evaluated, left to right.

pub mod collection;
pub mod datetime;
pub mod math;
pub mod string;

pub use collection::collection_functions;
pub use datetime::datetime_functions;
pub use math::math_functions;
pub use string::string_functions;

use crate::evaluator::{EvaluationError, EvaluationResult};
use crate::model::{TypeCoercion, Value};

/// Fail unless exactly `expected` arguments were passed
pub(crate) fn arity(function: &str, args: &[Value], expected: usize) -> EvaluationResult<()> {
    if args.len() == expected {
        return Ok(());
    }
    Err(EvaluationError::invalid_argument(
        function,
        format!("expects {expected} argument(s), got {}", args.len()),
    ))
}

/// Single textual argument
pub(crate) fn text_argument(function: &str, args: &[Value]) -> EvaluationResult<String> {
    arity(function, args, 1)?;
    text_at(function, args, 0)
}

/// Textual argument at `index`
pub(crate) fn text_at(function: &str, args: &[Value], index: usize) -> EvaluationResult<String> {
    args.get(index)
        .and_then(TypeCoercion::to_text)
        .ok_or_else(|| wrong_shape(function, args.get(index), "text"))
}

/// Single numeric argument
pub(crate) fn number_argument(function: &str, args: &[Value]) -> EvaluationResult<f64> {
    arity(function, args, 1)?;
    args.first()
        .and_then(TypeCoercion::to_number)
        .ok_or_else(|| wrong_shape(function, args.first(), "a number"))
}

fn wrong_shape(function: &str, actual: Option<&Value>, expected: &str) -> EvaluationError {
    let actual = actual.map_or("nothing", Value::type_name);
    EvaluationError::invalid_argument(function, format!("expects {expected}, got {actual}"))
}
