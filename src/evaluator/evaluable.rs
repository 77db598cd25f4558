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

//! Compiled expressions
//!
//! The parser does not build a syntax tree. Every construct compiles straight
//! into an [`Evaluable`] that owns the evaluables of its operands, so a
//! compiled expression is a tree of shared closures.

use std::fmt;
use std::sync::Arc;

use super::context::Context;
use super::error::{EvaluationError, EvaluationResult};
use crate::model::Value;

type EvalFn = dyn Fn(&Context, &Value) -> EvaluationResult<Value> + Send + Sync;

#[derive(Clone)]
enum Repr {
    Constant(Value),
    Dynamic(Arc<EvalFn>),
}

/// Compiled, repeatedly invocable expression
///
/// Cloning is cheap and clones share the compiled closures. An evaluable
/// holds no mutable state, so it can be invoked from many threads at once.
#[derive(Clone)]
pub struct Evaluable {
    repr: Repr,
}

impl Evaluable {
    /// Build an evaluable from a closure over context and parameter
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Context, &Value) -> EvaluationResult<Value> + Send + Sync + 'static,
    {
        Self {
            repr: Repr::Dynamic(Arc::new(f)),
        }
    }

    /// Evaluable that always yields `value`
    pub fn constant(value: impl Into<Value>) -> Self {
        Self {
            repr: Repr::Constant(value.into()),
        }
    }

    /// Check if the result is known without evaluating
    pub fn is_constant(&self) -> bool {
        matches!(self.repr, Repr::Constant(_))
    }

    /// Get the constant result, if any
    pub fn as_constant(&self) -> Option<&Value> {
        match &self.repr {
            Repr::Constant(value) => Some(value),
            Repr::Dynamic(_) => None,
        }
    }

    /// Evaluate against `parameter`
    #[inline]
    pub fn evaluate(&self, context: &Context, parameter: &Value) -> EvaluationResult<Value> {
        match &self.repr {
            Repr::Constant(value) => Ok(value.clone()),
            Repr::Dynamic(f) => f(context, parameter),
        }
    }

    /// Evaluate and require a boolean result
    pub fn evaluate_bool(&self, context: &Context, parameter: &Value) -> EvaluationResult<bool> {
        match self.evaluate(context, parameter)? {
            Value::Bool(b) => Ok(b),
            other => Err(unexpected("bool", &other)),
        }
    }

    /// Evaluate and require a numeric result
    pub fn evaluate_number(&self, context: &Context, parameter: &Value) -> EvaluationResult<f64> {
        match self.evaluate(context, parameter)? {
            Value::Number(n) => Ok(n),
            other => Err(unexpected("number", &other)),
        }
    }

    /// Evaluate and require a text result
    pub fn evaluate_string(
        &self,
        context: &Context,
        parameter: &Value,
    ) -> EvaluationResult<String> {
        match self.evaluate(context, parameter)? {
            Value::String(s) => Ok(s),
            other => Err(unexpected("string", &other)),
        }
    }
}

fn unexpected(expected: &str, actual: &Value) -> EvaluationError {
    EvaluationError::UnexpectedResult {
        expected: expected.to_string(),
        actual: actual.type_name().to_string(),
    }
}

impl fmt::Debug for Evaluable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.repr {
            Repr::Constant(value) => f.debug_tuple("Evaluable::Constant").field(value).finish(),
            Repr::Dynamic(_) => f.write_str("Evaluable::Dynamic"),
        }
    }
}

impl From<Value> for Evaluable {
    fn from(value: Value) -> Self {
        Self::constant(value)
    }
}
