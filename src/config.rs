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

//! Compilation and evaluation configuration options

use std::time::Duration;

/// Default bound on expression nesting
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Configuration for expression compilation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Maximum nesting of sub-expressions and operator applications before
    /// compilation is refused
    pub max_depth: usize,
}

impl ParserConfig {
    /// Create a configuration with a custom nesting bound
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Create a configuration for small, untrusted expressions
    pub fn strict() -> Self {
        Self { max_depth: 32 }
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Configuration for one-shot evaluation through an engine
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvaluationConfig {
    /// Deadline applied to each evaluation, none by default
    pub timeout: Option<Duration>,
}

impl EvaluationConfig {
    /// Create a configuration with a per-evaluation timeout
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }
}
