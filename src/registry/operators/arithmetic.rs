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

//! Arithmetic operators
//!
//! Operands are numbers or strings that parse fully as numbers. Division by
//! zero follows IEEE 754 and yields an infinity or NaN.

use super::{invalid_operand, numeric};
use crate::evaluator::{EvaluationError, EvaluationResult};
use crate::model::{TypeCoercion, Value};
use crate::registry::operator::precedence;
use crate::registry::{Associativity, Language, infix_operator, prefix_operator};

/// `+ - * / % **` and the numeric prefix operators
pub fn arithmetic_operators() -> Language {
    Language::combine([
        infix_operator("+", precedence::ADDITIVE, Associativity::Left, add),
        infix_operator(
            "-",
            precedence::ADDITIVE,
            Associativity::Left,
            numeric("-", |l, r| l - r),
        ),
        infix_operator(
            "*",
            precedence::MULTIPLICATIVE,
            Associativity::Left,
            numeric("*", |l, r| l * r),
        ),
        infix_operator(
            "/",
            precedence::MULTIPLICATIVE,
            Associativity::Left,
            numeric("/", |l, r| l / r),
        ),
        infix_operator(
            "%",
            precedence::MULTIPLICATIVE,
            Associativity::Left,
            numeric("%", |l, r| l % r),
        ),
        infix_operator(
            "**",
            precedence::POWER,
            Associativity::Right,
            numeric("**", f64::powf),
        ),
        prefix_operator("-", precedence::PREFIX, negate),
        prefix_operator("+", precedence::PREFIX, identity),
    ])
}

/// Numeric addition, falling back to concatenation of two strings
fn add(left: &Value, right: &Value) -> EvaluationResult<Value> {
    if let Some((l, r)) = TypeCoercion::numeric_pair(left, right) {
        return Ok(Value::Number(l + r));
    }
    match (left, right) {
        (Value::String(l), Value::String(r)) => Ok(Value::String(format!("{l}{r}"))),
        _ => Err(EvaluationError::type_mismatch(
            "+",
            left.type_name(),
            right.type_name(),
        )),
    }
}

fn negate(operand: &Value) -> EvaluationResult<Value> {
    TypeCoercion::to_number(operand)
        .map(|n| Value::Number(-n))
        .ok_or_else(|| invalid_operand("-", operand))
}

fn identity(operand: &Value) -> EvaluationResult<Value> {
    TypeCoercion::to_number(operand)
        .map(Value::Number)
        .ok_or_else(|| invalid_operand("+", operand))
}
