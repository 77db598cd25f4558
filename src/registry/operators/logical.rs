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

//! Propositional logic operators
//!
//! `&&` and `||` evaluate their right operand only when needed. All three
//! operators require boolean operands; the strings `"true"` and `"false"`
//! count as booleans.

use super::invalid_operand;
use crate::evaluator::{Context, Evaluable, EvaluationResult};
use crate::model::{TypeCoercion, Value};
use crate::registry::operator::precedence;
use crate::registry::{Associativity, Language, infix_short_circuit, prefix_operator};

/// `!`, `&&` and `||`
pub fn logical_operators() -> Language {
    Language::combine([
        prefix_operator("!", precedence::PREFIX, |operand| {
            TypeCoercion::to_bool(operand)
                .map(|b| Value::Bool(!b))
                .ok_or_else(|| invalid_operand("!", operand))
        }),
        short_circuit("&&", precedence::AND, false),
        short_circuit("||", precedence::OR, true),
    ])
}

/// Operator that stops as soon as the left operand equals `decisive`
fn short_circuit(symbol: &'static str, level: u8, decisive: bool) -> Language {
    infix_short_circuit(symbol, level, Associativity::Left, move |left, right| {
        Ok(Evaluable::new(move |context, parameter| {
            if boolean(symbol, &left, context, parameter)? == decisive {
                return Ok(Value::Bool(decisive));
            }
            boolean(symbol, &right, context, parameter).map(Value::Bool)
        }))
    })
}

fn boolean(
    symbol: &str,
    operand: &Evaluable,
    context: &Context,
    parameter: &Value,
) -> EvaluationResult<bool> {
    let value = operand.evaluate(context, parameter)?;
    TypeCoercion::to_bool(&value).ok_or_else(|| invalid_operand(symbol, &value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::EvaluationError;
    use crate::registry::{base, function};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_right_operand_skipped_when_decided() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let language = Language::combine([
            base(),
            logical_operators(),
            function("touch", move |_, _| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Value::Bool(true))
            }),
        ]);
        let context = Context::background();

        let result = language.compile("false && touch()").unwrap();
        assert_eq!(result.evaluate(&context, &Value::Null).unwrap(), Value::Bool(false));
        let result = language.compile("true || touch()").unwrap();
        assert_eq!(result.evaluate(&context, &Value::Null).unwrap(), Value::Bool(true));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let result = language.compile("true && touch()").unwrap();
        assert_eq!(result.evaluate(&context, &Value::Null).unwrap(), Value::Bool(true));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_boolean_strings() {
        let language = Language::combine([base(), logical_operators()]);
        let context = Context::background();
        let parameter = Value::from(serde_json::json!({"enabled": "true", "muted": "false"}));
        let result = language
            .compile("enabled && !muted")
            .unwrap()
            .evaluate(&context, &parameter)
            .unwrap();
        assert_eq!(result, Value::Bool(true));

        let error = language
            .compile("!\"yes\"")
            .unwrap()
            .evaluate(&context, &Value::Null)
            .unwrap_err();
        assert!(matches!(error, EvaluationError::InvalidOperand { ref operand, .. } if operand == "string"));
    }

    #[test]
    fn test_non_boolean_operands_rejected() {
        let language = Language::combine([base(), logical_operators()]);
        let error = language
            .compile("1 && true")
            .unwrap()
            .evaluate(&Context::background(), &Value::Null)
            .unwrap_err();
        assert!(matches!(error, EvaluationError::InvalidOperand { ref operand, .. } if operand == "number"));
    }
}
