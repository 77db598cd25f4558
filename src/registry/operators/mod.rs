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

//! Built-in operator definitions
//!
//! Each submodule returns a [`Language`](super::Language) fragment; the
//! dialects in [`super::dialect`] combine them.

pub mod arithmetic;
pub mod base;
pub mod bitmask;
pub mod comparison;
pub mod logical;
pub mod membership;
pub mod string;

pub use arithmetic::arithmetic_operators;
pub use base::{base_constants, coalesce_operator, equality_operators, ternary_operator};
pub use bitmask::bitmask_operators;
pub use comparison::comparison_operators;
pub use logical::logical_operators;
pub use membership::membership_operator;
pub use string::{addition_operator, concatenation_operator, regex_operators};

use crate::evaluator::{EvaluationError, EvaluationResult};
use crate::model::{TypeCoercion, Value};

/// Combine numerically coercible operands with `op`
pub(crate) fn numeric(
    symbol: &'static str,
    op: fn(f64, f64) -> f64,
) -> impl Fn(&Value, &Value) -> EvaluationResult<Value> + Send + Sync + 'static {
    move |left: &Value, right: &Value| match TypeCoercion::numeric_pair(left, right) {
        Some((l, r)) => Ok(Value::Number(op(l, r))),
        None => Err(EvaluationError::type_mismatch(
            symbol,
            left.type_name(),
            right.type_name(),
        )),
    }
}

pub(crate) fn invalid_operand(symbol: &str, operand: &Value) -> EvaluationError {
    EvaluationError::InvalidOperand {
        operator: symbol.to_string(),
        operand: operand.type_name().to_string(),
    }
}
