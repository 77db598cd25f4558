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

//! Error types for expression evaluation

use std::sync::Arc;
use thiserror::Error;

/// Result type for evaluation operations
pub type EvaluationResult<T> = Result<T, EvaluationError>;

/// Errors that can occur while evaluating a compiled expression
#[derive(Error, Debug, Clone)]
pub enum EvaluationError {
    /// Selector matched no key, field or method of the subject
    #[error("unknown selector '{selector}' for {shape}")]
    UnknownSelector {
        /// Selector name
        selector: String,
        /// Shape of the subject the selector was applied to
        shape: String,
    },

    /// Function is not registered in the language
    #[error("unknown function {name}()")]
    UnknownFunction {
        /// Function name
        name: String,
    },

    /// Index outside of an array
    #[error("index {index} out of bounds for array of size {size}")]
    IndexOutOfBounds {
        /// Requested index
        index: String,
        /// Array size
        size: usize,
    },

    /// Binary operator applied to unsupported operand shapes
    #[error("invalid operation ({left}) {operator} ({right})")]
    TypeMismatch {
        /// Operator symbol
        operator: String,
        /// Shape of the left operand
        left: String,
        /// Shape of the right operand
        right: String,
    },

    /// Unary operator applied to an unsupported operand shape
    #[error("invalid operation {operator}({operand})")]
    InvalidOperand {
        /// Operator symbol
        operator: String,
        /// Shape of the operand
        operand: String,
    },

    /// Function received arguments it cannot handle
    #[error("{function}(): {message}")]
    InvalidArgument {
        /// Function name
        function: String,
        /// Error message
        message: String,
    },

    /// Expression produced a value of another shape than requested
    #[error("expected {expected} result, got {actual}")]
    UnexpectedResult {
        /// Requested shape
        expected: String,
        /// Shape actually produced
        actual: String,
    },

    /// Execution context was cancelled
    #[error("evaluation cancelled")]
    Cancelled,

    /// Execution context deadline passed
    #[error("evaluation deadline exceeded")]
    DeadlineExceeded,

    /// Error returned unchanged from a registered rule
    #[error(transparent)]
    Custom(Arc<dyn std::error::Error + Send + Sync>),
}

impl EvaluationError {
    /// Wrap an arbitrary error returned by a registered rule
    pub fn custom<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(error))
    }

    /// Build a custom error from a plain message
    pub fn message(message: impl Into<String>) -> Self {
        Self::custom(RuleError(message.into()))
    }

    /// Check if the error stems from the execution context
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded)
    }

    /// Check if the error is a failed name lookup
    pub fn is_resolution(&self) -> bool {
        matches!(
            self,
            Self::UnknownSelector { .. } | Self::UnknownFunction { .. } | Self::IndexOutOfBounds { .. }
        )
    }

    /// Check if the error is an operand shape mismatch
    pub fn is_type_error(&self) -> bool {
        matches!(
            self,
            Self::TypeMismatch { .. }
                | Self::InvalidOperand { .. }
                | Self::InvalidArgument { .. }
                | Self::UnexpectedResult { .. }
        )
    }

    pub(crate) fn type_mismatch(operator: &str, left: &str, right: &str) -> Self {
        Self::TypeMismatch {
            operator: operator.to_string(),
            left: left.to_string(),
            right: right.to_string(),
        }
    }

    pub(crate) fn invalid_argument(function: &str, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            function: function.to_string(),
            message: message.into(),
        }
    }
}

/// Plain-message error raised by a registered rule
#[derive(Error, Debug, Clone)]
#[error("{0}")]
pub struct RuleError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_error_is_transparent() {
        let error = EvaluationError::message("quota exceeded");
        assert_eq!(error.to_string(), "quota exceeded");
        assert!(!error.is_resolution());
        assert!(!error.is_cancellation());
    }

    #[test]
    fn test_error_classification() {
        let unknown = EvaluationError::UnknownFunction {
            name: "strlen".to_string(),
        };
        assert!(unknown.is_resolution());
        assert_eq!(unknown.to_string(), "unknown function strlen()");

        let mismatch = EvaluationError::type_mismatch(">", "bool", "number");
        assert!(mismatch.is_type_error());
        assert_eq!(mismatch.to_string(), "invalid operation (bool) > (number)");

        assert!(EvaluationError::DeadlineExceeded.is_cancellation());
    }
}
