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

//! Error types for one-shot evaluation
//!
//! Compilation and evaluation keep their own error types; this module joins
//! them for callers that do both in one call.

use std::fmt;

use thiserror::Error;

use crate::evaluator::EvaluationError;
use crate::parser::ParseError;

/// Result type alias for one-shot operations
pub type Result<T> = std::result::Result<T, Error>;

/// Compilation or evaluation failure
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// Expression text could not be compiled
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Compiled expression failed on a parameter
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}

/// Coarse classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed token
    Lex,
    /// Malformed expression structure
    Parse,
    /// Unknown identifier, selector, index or function
    Resolution,
    /// Operand or argument of an unsupported shape
    Type,
    /// Execution context cancelled or past its deadline
    Cancellation,
    /// Error returned by a caller-registered rule
    Custom,
}

impl Error {
    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Parse(ParseError::Lex(_)) => ErrorKind::Lex,
            Self::Parse(_) => ErrorKind::Parse,
            Self::Evaluation(error) if error.is_resolution() => ErrorKind::Resolution,
            Self::Evaluation(error) if error.is_type_error() => ErrorKind::Type,
            Self::Evaluation(error) if error.is_cancellation() => ErrorKind::Cancellation,
            Self::Evaluation(_) => ErrorKind::Custom,
        }
    }

    /// Byte position of a compilation error
    pub fn position(&self) -> Option<usize> {
        match self {
            Self::Parse(error) => error.position(),
            Self::Evaluation(_) => None,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Lex => "lex",
            Self::Parse => "parse",
            Self::Resolution => "resolution",
            Self::Type => "type",
            Self::Cancellation => "cancellation",
            Self::Custom => "custom",
        };
        f.write_str(name)
    }
}
