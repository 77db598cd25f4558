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

//! Execution model for compiled expressions
//!
//! This module provides the [`Evaluable`] produced by the parser, the
//! [`Context`] used to cancel evaluation, and the accessor resolver that walks
//! host data without a fixed schema.

pub mod context;
pub mod error;
pub mod evaluable;
pub mod navigation;

pub use context::{CancelHandle, Context};
pub use error::{EvaluationError, EvaluationResult, RuleError};
pub use evaluable::Evaluable;
pub use navigation::{Chain, Step};
