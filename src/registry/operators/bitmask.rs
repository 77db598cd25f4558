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

//! Bitwise operators over integers
//!
//! Operands are truncated to 64-bit signed integers first. Numbers outside
//! that range are rejected rather than saturated.

use super::invalid_operand;
use crate::evaluator::{EvaluationError, EvaluationResult};
use crate::model::{TypeCoercion, Value};
use crate::registry::operator::precedence;
use crate::registry::{Associativity, Language, infix_operator, prefix_operator};

/// `& | ^ << >>` and prefix `~`
pub fn bitmask_operators() -> Language {
    Language::combine([
        bitwise("&", precedence::BIT_AND, |l, r| Some(l & r)),
        bitwise("|", precedence::BIT_OR, |l, r| Some(l | r)),
        bitwise("^", precedence::BIT_XOR, |l, r| Some(l ^ r)),
        bitwise("<<", precedence::SHIFT, shift_left),
        bitwise(">>", precedence::SHIFT, shift_right),
        prefix_operator("~", precedence::PREFIX, |operand| {
            TypeCoercion::to_integer(operand)
                .map(|n| Value::Number(!n as f64))
                .ok_or_else(|| invalid_operand("~", operand))
        }),
    ])
}

fn bitwise(symbol: &'static str, level: u8, op: fn(i64, i64) -> Option<i64>) -> Language {
    infix_operator(symbol, level, Associativity::Left, move |left, right| {
        integers(symbol, left, right)
            .and_then(|(l, r)| op(l, r).ok_or_else(|| out_of_range(symbol, r)))
            .map(|n| Value::Number(n as f64))
    })
}

fn shift_left(value: i64, amount: i64) -> Option<i64> {
    u32::try_from(amount).ok().and_then(|a| value.checked_shl(a))
}

fn shift_right(value: i64, amount: i64) -> Option<i64> {
    u32::try_from(amount).ok().and_then(|a| value.checked_shr(a))
}

fn integers(symbol: &str, left: &Value, right: &Value) -> EvaluationResult<(i64, i64)> {
    match (TypeCoercion::to_integer(left), TypeCoercion::to_integer(right)) {
        (Some(l), Some(r)) => Ok((l, r)),
        _ => Err(EvaluationError::type_mismatch(
            symbol,
            left.type_name(),
            right.type_name(),
        )),
    }
}

fn out_of_range(symbol: &str, amount: i64) -> EvaluationError {
    EvaluationError::invalid_argument(symbol, format!("shift amount {amount} out of range"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::Context;
    use crate::registry::{base, constant};
    use rstest::rstest;

    fn eval(expression: &str) -> EvaluationResult<Value> {
        Language::combine([base(), bitmask_operators(), constant("huge", 1e300)])
            .compile(expression)
            .unwrap()
            .evaluate(&Context::background(), &Value::Null)
    }

    #[rstest]
    #[case("6 & 3", 2.0)]
    #[case("6 | 3", 7.0)]
    #[case("6 ^ 3", 5.0)]
    #[case("1 << 4", 16.0)]
    #[case("256 >> 4", 16.0)]
    #[case("~0", -1.0)]
    #[case("1 | 2 & 0", 1.0)]
    #[case("5.9 & 7", 5.0)]
    fn test_bitwise(#[case] expression: &str, #[case] expected: f64) {
        assert_eq!(eval(expression).unwrap(), Value::Number(expected));
    }

    #[test]
    fn test_shift_out_of_range() {
        assert!(matches!(
            eval("1 << 64"),
            Err(EvaluationError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_operand_beyond_integer_range() {
        let error = eval("~huge").unwrap_err();
        assert!(error.is_type_error());
        assert!(matches!(error, EvaluationError::InvalidOperand { .. }));
        assert!(matches!(
            eval("huge & 1"),
            Err(EvaluationError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_non_numeric_operand() {
        assert!(matches!(
            eval("true & 1"),
            Err(EvaluationError::TypeMismatch { .. })
        ));
    }
}
