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

//! Expression engine - the main entry point for compiling and evaluating

use std::time::Duration;

use crate::config::{EvaluationConfig, ParserConfig};
use crate::error::Result;
use crate::evaluator::{Context, Evaluable};
use crate::model::Value;
use crate::parser::ParseResult;
use crate::registry::{self, Language};

/// Language plus the settings used to compile and run expressions in it
///
/// An engine holds no per-expression state; clone it freely or share it
/// between threads.
#[derive(Debug, Clone)]
pub struct Engine {
    language: Language,
    parser_config: ParserConfig,
    evaluation_config: EvaluationConfig,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Create an engine for the full dialect
    pub fn new() -> Self {
        Self {
            language: registry::full(),
            parser_config: ParserConfig::default(),
            evaluation_config: EvaluationConfig::default(),
        }
    }

    /// Replace the language
    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    /// Replace the parser configuration
    pub fn with_parser_config(mut self, config: ParserConfig) -> Self {
        self.parser_config = config;
        self
    }

    /// Bound every [`evaluate`](Self::evaluate) call by `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.evaluation_config.timeout = Some(timeout);
        self
    }

    /// Get the language
    pub fn language(&self) -> &Language {
        &self.language
    }

    /// Get the parser configuration
    pub fn parser_config(&self) -> &ParserConfig {
        &self.parser_config
    }

    /// Get the evaluation configuration
    pub fn evaluation_config(&self) -> &EvaluationConfig {
        &self.evaluation_config
    }

    /// Compile an expression for repeated evaluation
    pub fn compile(&self, expression: &str) -> ParseResult<Evaluable> {
        self.language.compile_with(expression, &self.parser_config)
    }

    /// Compile and evaluate an expression once
    pub fn evaluate(&self, expression: &str, parameter: &Value) -> Result<Value> {
        self.evaluate_in(&Context::background(), expression, parameter)
    }

    /// Compile and evaluate an expression once under `context`
    ///
    /// The configured timeout, if any, is added to the context's own deadline.
    pub fn evaluate_in(
        &self,
        context: &Context,
        expression: &str,
        parameter: &Value,
    ) -> Result<Value> {
        let evaluable = self.compile(expression)?;
        let context = match self.evaluation_config.timeout {
            Some(timeout) => context.with_timeout(timeout),
            None => context.clone(),
        };
        Ok(evaluable.evaluate(&context, parameter)?)
    }
}
