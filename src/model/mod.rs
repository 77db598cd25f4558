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

//! Value model for expression evaluation
//!
//! This module contains the dynamically-typed [`Value`] every expression
//! produces and consumes, the [`HostObject`] capabilities host data
//! opts into, and the coercions shared by the built-in operators.

pub mod coercion;
pub mod host;
pub mod value;

pub use coercion::TypeCoercion;
pub use host::{HostObject, HostValue};
pub use value::Value;
