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

//! Operator, function and constant registry
//!
//! This module provides the extension surface of the engine: composable
//! [`Language`] tables, the constructors that build one-definition languages,
//! and the built-in dialects assembled from them.

#![warn(missing_docs)]

pub mod dialect;
pub mod functions;
pub mod language;
pub mod operator;
pub mod operators;

pub use dialect::{arithmetic, base, bitmask, full, propositional_logic, text};
pub use language::{
    Language, constant, function, infix_operator, infix_short_circuit, postfix_operator,
    prefix_extension, prefix_operator,
};
pub use operator::{
    Associativity, Fixity, Function, InfixOperator, InfixRule, PostfixOperator, PrefixOperator,
    PrefixRule, precedence,
};
