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

//! Operator, function and constant definitions
//!
//! Definitions are plain data holding shared rules. A [`Language`] indexes
//! them by name and fixity; the parser looks them up while compiling.
//!
//! [`Language`]: super::Language

use std::fmt;
use std::sync::Arc;

use crate::evaluator::{Context, Evaluable, EvaluationResult};
use crate::model::Value;
use crate::parser::{ParseResult, Parser};

/// Binary rule over operand values
pub type ValueRule = Arc<dyn Fn(&Value, &Value) -> EvaluationResult<Value> + Send + Sync>;

/// Unary rule over an operand value
pub type UnaryRule = Arc<dyn Fn(&Value) -> EvaluationResult<Value> + Send + Sync>;

/// Binary rule composing operand evaluables at compile time
pub type EvaluableRule =
    Arc<dyn Fn(Evaluable, Evaluable) -> ParseResult<Evaluable> + Send + Sync>;

/// Prefix extension parsing its own operand
pub type PrefixCallback = Arc<dyn Fn(&mut Parser<'_>) -> ParseResult<Evaluable> + Send + Sync>;

/// Postfix extension receiving the live parser and the preceding term
pub type PostfixCallback =
    Arc<dyn Fn(&mut Parser<'_>, Evaluable) -> ParseResult<Evaluable> + Send + Sync>;

/// Function rule over evaluated arguments
pub type FunctionRule = Arc<dyn Fn(&Context, &[Value]) -> EvaluationResult<Value> + Send + Sync>;

/// Precedence levels of the built-in operators (higher binds tighter)
pub mod precedence {
    /// `??`
    pub const COALESCE: u8 = 2;
    /// `||`
    pub const OR: u8 = 10;
    /// `&&`
    pub const AND: u8 = 20;
    /// `== != =~ !~ in`
    pub const EQUALITY: u8 = 40;
    /// `< <= > >=`
    pub const RELATIONAL: u8 = 50;
    /// `|`
    pub const BIT_OR: u8 = 55;
    /// `^`
    pub const BIT_XOR: u8 = 56;
    /// `&`
    pub const BIT_AND: u8 = 57;
    /// `<< >>`
    pub const SHIFT: u8 = 58;
    /// `+ -`
    pub const ADDITIVE: u8 = 60;
    /// `* / %`
    pub const MULTIPLICATIVE: u8 = 70;
    /// `**`
    pub const POWER: u8 = 80;
    /// Prefix operators
    pub const PREFIX: u8 = 90;
}

/// Operator associativity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
    /// Left-associative operator (evaluated left to right)
    Left,
    /// Right-associative operator (evaluated right to left)
    Right,
}

/// Operator fixity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fixity {
    /// Before its operand
    Prefix,
    /// Between two operands
    Infix,
    /// After its operand
    Postfix,
}

impl fmt::Display for Fixity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Fixity::Prefix => "prefix",
            Fixity::Infix => "infix",
            Fixity::Postfix => "postfix",
        })
    }
}

/// How a prefix operator builds its evaluable
#[derive(Clone)]
pub enum PrefixRule {
    /// Apply a rule to the operand parsed at the operator's precedence
    Value(UnaryRule),
    /// Let the callback parse whatever follows the symbol
    Parser(PrefixCallback),
}

/// Prefix operator definition
#[derive(Clone)]
pub struct PrefixOperator {
    /// Symbol or keyword
    pub symbol: String,
    /// Binding power of the operand
    pub precedence: u8,
    /// Evaluation rule
    pub rule: PrefixRule,
}

impl PrefixOperator {
    /// Wrap an already parsed operand
    pub fn apply(&self, operand: Evaluable) -> Evaluable {
        match &self.rule {
            PrefixRule::Value(rule) => {
                let rule = Arc::clone(rule);
                Evaluable::new(move |context, parameter| {
                    let value = operand.evaluate(context, parameter)?;
                    rule(&value)
                })
            }
            PrefixRule::Parser(_) => operand,
        }
    }
}

/// How an infix operator combines its operands
#[derive(Clone)]
pub enum InfixRule {
    /// Evaluate both operands left to right, then apply the rule
    Value(ValueRule),
    /// Compose the operand evaluables directly (short-circuiting)
    Evaluable(EvaluableRule),
}

/// Infix operator definition
#[derive(Clone)]
pub struct InfixOperator {
    /// Symbol or keyword
    pub symbol: String,
    /// Binding power
    pub precedence: u8,
    /// Associativity among operators of equal precedence
    pub associativity: Associativity,
    /// Evaluation rule
    pub rule: InfixRule,
}

impl InfixOperator {
    /// Combine two operands into one evaluable
    pub fn build(&self, left: Evaluable, right: Evaluable) -> ParseResult<Evaluable> {
        match &self.rule {
            InfixRule::Value(rule) => {
                let rule = Arc::clone(rule);
                Ok(Evaluable::new(move |context, parameter| {
                    let l = left.evaluate(context, parameter)?;
                    let r = right.evaluate(context, parameter)?;
                    rule(&l, &r)
                }))
            }
            InfixRule::Evaluable(rule) => rule(left, right),
        }
    }

    /// Binding power for the right-hand operand
    pub fn right_precedence(&self) -> u8 {
        match self.associativity {
            Associativity::Left => self.precedence.saturating_add(1),
            Associativity::Right => self.precedence,
        }
    }
}

/// Postfix operator definition
#[derive(Clone)]
pub struct PostfixOperator {
    /// Symbol or keyword
    pub symbol: String,
    /// Extension callback
    pub callback: PostfixCallback,
}

/// Named function definition
#[derive(Clone)]
pub struct Function {
    /// Function name
    pub name: String,
    /// Evaluation rule
    pub rule: FunctionRule,
}

macro_rules! opaque_debug {
    ($($ty:ident => $name:ident),* $(,)?) => {
        $(
            impl fmt::Debug for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.debug_struct(stringify!($ty))
                        .field(stringify!($name), &self.$name)
                        .finish_non_exhaustive()
                }
            }
        )*
    };
}

opaque_debug!(
    PrefixOperator => symbol,
    InfixOperator => symbol,
    PostfixOperator => symbol,
    Function => name,
);
