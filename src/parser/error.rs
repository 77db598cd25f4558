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

//! Parser error types
//!
//! Every position is a byte offset into the expression text.

use thiserror::Error;

/// Result type for tokenizer operations
pub type LexResult<T> = Result<T, LexError>;

/// Result type for parser operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Malformed token
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LexError {
    /// Quoted string without closing quote
    #[error("unclosed string literal starting at position {position}")]
    UnclosedString {
        /// Position of the opening quote
        position: usize,
    },

    /// Backtick string without closing backtick
    #[error("unclosed raw string literal starting at position {position}")]
    UnclosedRawString {
        /// Position of the opening backtick
        position: usize,
    },

    /// Unknown or truncated escape sequence
    #[error("invalid escape sequence '{sequence}' at position {position}")]
    InvalidEscape {
        /// The offending sequence, backslash included
        sequence: String,
        /// Position of the backslash
        position: usize,
    },

    /// Character that starts no token
    #[error("unexpected character '{character}' at position {position}")]
    UnexpectedCharacter {
        /// The offending character
        character: char,
        /// Position of the character
        position: usize,
    },

    /// Number literal that does not parse
    #[error("invalid number literal '{literal}' at position {position}")]
    InvalidNumber {
        /// The literal text
        literal: String,
        /// Position of the literal
        position: usize,
    },
}

/// Errors that can occur while compiling an expression
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Tokenizer failure
    #[error(transparent)]
    Lex(#[from] LexError),

    /// Token that cannot appear here
    #[error("unexpected {token} at position {position}")]
    UnexpectedToken {
        /// Description of the token
        token: String,
        /// Position of the token
        position: usize,
    },

    /// Input ended in the middle of an expression
    #[error("unexpected end of input at position {position}")]
    UnexpectedEndOfInput {
        /// Length of the input
        position: usize,
    },

    /// Bracket, parenthesis or brace closed by the wrong token
    #[error("expected '{expected}' but found {found} at position {position}")]
    UnmatchedDelimiter {
        /// Delimiter that would have matched
        expected: String,
        /// Description of what was found instead
        found: String,
        /// Position of the mismatch
        position: usize,
    },

    /// Infix or postfix operator used where an operand is expected
    #[error("operator '{operator}' cannot start an operand at position {position}")]
    FixityMismatch {
        /// Operator symbol
        operator: String,
        /// Position of the operator
        position: usize,
    },

    /// Tokens left after a complete expression
    #[error("unexpected trailing {token} at position {position}")]
    TrailingInput {
        /// Description of the first trailing token
        token: String,
        /// Position of the token
        position: usize,
    },

    /// Expression nests deeper than the configured limit
    #[error("expression nesting exceeds {limit} levels at position {position}")]
    RecursionLimitExceeded {
        /// Configured limit
        limit: usize,
        /// Position where the limit was hit
        position: usize,
    },

    /// Extension callback rejected the input
    #[error("{operator}: {message}")]
    Extension {
        /// Operator or function owning the callback
        operator: String,
        /// Error message
        message: String,
    },
}

impl ParseError {
    /// Byte offset the error points at, if it carries one
    pub fn position(&self) -> Option<usize> {
        match self {
            Self::Lex(
                LexError::UnclosedString { position }
                | LexError::UnclosedRawString { position }
                | LexError::InvalidEscape { position, .. }
                | LexError::UnexpectedCharacter { position, .. }
                | LexError::InvalidNumber { position, .. },
            )
            | Self::UnexpectedToken { position, .. }
            | Self::UnexpectedEndOfInput { position }
            | Self::UnmatchedDelimiter { position, .. }
            | Self::FixityMismatch { position, .. }
            | Self::TrailingInput { position, .. }
            | Self::RecursionLimitExceeded { position, .. } => Some(*position),
            Self::Extension { .. } => None,
        }
    }

    /// Create an extension error
    pub fn extension(operator: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Extension {
            operator: operator.into(),
            message: message.into(),
        }
    }
}
