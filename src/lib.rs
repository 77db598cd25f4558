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

//! Embeddable expression language
//!
//! Expressions are compiled once into an [`Evaluable`] and evaluated against
//! arbitrary parameter values. The grammar is driven entirely by a
//! [`Language`]: operators, functions and constants are registered as
//! composable definitions, and the built-in dialects in [`registry`] are
//! ordinary languages built the same way.
//!
//! ```
//! use octofhir_expr::evaluate;
//! use octofhir_expr::model::Value;
//! use serde_json::json;
//!
//! let parameter = Value::from(json!({"foo": {"bar": 40}}));
//! assert_eq!(evaluate("foo.bar + 2", &parameter).unwrap(), Value::from(42));
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod model;
pub mod parser;
pub mod path;
pub mod registry;

pub use config::{EvaluationConfig, ParserConfig};
pub use engine::Engine;
pub use error::{Error, ErrorKind, Result};
pub use evaluator::{CancelHandle, Context, Evaluable, EvaluationError, EvaluationResult};
pub use model::{HostObject, HostValue, Value};
pub use parser::{LexError, ParseError, ParseResult};
pub use registry::Language;

/// Compile and evaluate `expression` in the full dialect
pub fn evaluate(expression: &str, parameter: &Value) -> Result<Value> {
    let evaluable = registry::full().compile(expression)?;
    Ok(evaluable.evaluate(&Context::background(), parameter)?)
}

/// Compile and evaluate `expression` in the full dialect extended by
/// `languages`
///
/// Later languages override earlier definitions of the same name.
pub fn evaluate_with<I>(expression: &str, parameter: &Value, languages: I) -> Result<Value>
where
    I: IntoIterator<Item = Language>,
{
    let language = Language::combine(std::iter::once(registry::full()).chain(languages));
    let evaluable = language.compile(expression)?;
    Ok(evaluable.evaluate(&Context::background(), parameter)?)
}
