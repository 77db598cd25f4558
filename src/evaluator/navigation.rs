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

//! Accessor resolution against values of unknown shape
//!
//! A selector is resolved against a subject in a fixed order:
//!
//! 1. mapping lookup by key (objects and hosts implementing `get_key`)
//! 2. record field lookup (hosts implementing `get_field`)
//! 3. zero-argument operation named after the selector (`call_method`)
//!
//! The first lookup that answers wins. When none does, resolution fails with
//! [`EvaluationError::UnknownSelector`].

use smallvec::SmallVec;

use super::context::Context;
use super::error::{EvaluationError, EvaluationResult};
use super::evaluable::Evaluable;
use crate::model::{TypeCoercion, Value};

/// Resolve a named selector against `subject`
pub fn resolve(context: &Context, subject: &Value, selector: &str) -> EvaluationResult<Value> {
    context.check()?;
    match subject {
        Value::Object(entries) => entries
            .get(selector)
            .cloned()
            .ok_or_else(|| unknown_selector(subject, selector)),
        Value::Array(items) => selector
            .parse::<usize>()
            .ok()
            .and_then(|index| items.get(index))
            .cloned()
            .ok_or_else(|| unknown_selector(subject, selector)),
        Value::Host(host) => {
            if let Some(value) = host.get_key(selector) {
                return Ok(value);
            }
            log::trace!("{}: no key '{selector}', trying field", host.type_name());
            if let Some(value) = host.get_field(selector) {
                return Ok(value);
            }
            log::trace!("{}: no field '{selector}', trying method", host.type_name());
            match host.call_method(context, selector, &[]) {
                Some(result) => result,
                None => Err(unknown_selector(subject, selector)),
            }
        }
        _ => Err(unknown_selector(subject, selector)),
    }
}

/// Invoke a named operation on `subject`
pub fn invoke(
    context: &Context,
    subject: &Value,
    method: &str,
    args: &[Value],
) -> EvaluationResult<Value> {
    try_invoke(context, subject, method, args)
        .unwrap_or_else(|| Err(unknown_selector(subject, method)))
}

/// Invoke a named operation if `subject` exposes it
pub fn try_invoke(
    context: &Context,
    subject: &Value,
    method: &str,
    args: &[Value],
) -> Option<EvaluationResult<Value>> {
    if let Err(error) = context.check() {
        return Some(Err(error));
    }
    match subject {
        Value::Host(host) => host.call_method(context, method, args),
        _ => None,
    }
}

/// Look up `key` inside `subject` for bracket access
pub fn index(context: &Context, subject: &Value, key: &Value) -> EvaluationResult<Value> {
    context.check()?;
    match (subject, key) {
        (Value::Array(items), _) => {
            let position = TypeCoercion::to_number(key).ok_or_else(|| {
                EvaluationError::type_mismatch("[]", subject.type_name(), key.type_name())
            })?;
            if position.fract() != 0.0 || position < 0.0 || position >= items.len() as f64 {
                return Err(EvaluationError::IndexOutOfBounds {
                    index: key.to_string(),
                    size: items.len(),
                });
            }
            Ok(items[position as usize].clone())
        }
        (Value::Object(_) | Value::Host(_), Value::String(name)) => resolve(context, subject, name),
        (Value::Object(_) | Value::Host(_), Value::Number(_) | Value::Bool(_)) => {
            resolve(context, subject, &key.to_string())
        }
        _ => Err(EvaluationError::type_mismatch(
            "[]",
            subject.type_name(),
            key.type_name(),
        )),
    }
}

fn unknown_selector(subject: &Value, selector: &str) -> EvaluationError {
    EvaluationError::UnknownSelector {
        selector: selector.to_string(),
        shape: subject.type_name().to_string(),
    }
}

/// One suffix of an accessor chain
#[derive(Debug, Clone)]
pub enum Step {
    /// `.name`
    Field(String),
    /// `.name(args...)`
    Method(String, Vec<Evaluable>),
    /// `[expr]`, with the key evaluated against the root parameter
    Index(Evaluable),
}

/// Accessor chain compiled from `.name`, `.name(...)` and `[expr]` suffixes
#[derive(Debug, Clone, Default)]
pub struct Chain {
    steps: SmallVec<[Step; 4]>,
}

impl Chain {
    /// Create an empty chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step
    pub fn push(&mut self, step: Step) {
        self.steps.push(step);
    }

    /// Check if the chain has no steps
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Apply every step to `subject`, left to right
    pub fn apply(
        &self,
        context: &Context,
        parameter: &Value,
        subject: Value,
    ) -> EvaluationResult<Value> {
        let mut current = subject;
        for step in &self.steps {
            current = match step {
                Step::Field(name) => resolve(context, &current, name)?,
                Step::Method(name, args) => {
                    let args = args
                        .iter()
                        .map(|arg| arg.evaluate(context, parameter))
                        .collect::<EvaluationResult<Vec<_>>>()?;
                    invoke(context, &current, name, &args)?
                }
                Step::Index(key) => {
                    let key = key.evaluate(context, parameter)?;
                    index(context, &current, &key)?
                }
            };
        }
        Ok(current)
    }

    /// Compile the chain on top of `base`
    pub fn into_evaluable(self, base: Evaluable) -> Evaluable {
        if self.is_empty() {
            return base;
        }
        Evaluable::new(move |context, parameter| {
            let subject = base.evaluate(context, parameter)?;
            self.apply(context, parameter, subject)
        })
    }
}

/// Evaluable reading a root identifier from the parameter
pub fn variable(name: impl Into<String>) -> Evaluable {
    let name = name.into();
    Evaluable::new(move |context, parameter| resolve(context, parameter, &name))
}
