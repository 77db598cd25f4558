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

//! Ready-made dialects
//!
//! Every dialect includes [`base`]. Later fragments override earlier ones,
//! so callers can layer their own definitions on top of any of these.

use std::sync::LazyLock;

use super::Language;
use super::functions::{
    collection_functions, datetime_functions, math_functions, string_functions,
};
use super::operators::{
    addition_operator, arithmetic_operators, base_constants, bitmask_operators,
    coalesce_operator, comparison_operators, concatenation_operator, equality_operators,
    logical_operators, membership_operator, regex_operators, ternary_operator,
};

static FULL: LazyLock<Language> = LazyLock::new(|| {
    Language::combine([
        arithmetic(),
        bitmask(),
        text(),
        propositional_logic(),
        membership_operator(),
        addition_operator(),
        math_functions(),
        collection_functions(),
        datetime_functions(),
    ])
});

/// Constants, equality, `??` and the ternary
pub fn base() -> Language {
    Language::combine([
        base_constants(),
        ternary_operator(),
        coalesce_operator(),
        equality_operators(),
    ])
}

/// Numbers: `+ - * / % **`, unary signs and ordering
pub fn arithmetic() -> Language {
    Language::combine([base(), arithmetic_operators(), comparison_operators()])
}

/// Strings: concatenation, regex matching, ordering and string functions
pub fn text() -> Language {
    Language::combine([
        base(),
        comparison_operators(),
        concatenation_operator(),
        regex_operators(),
        string_functions(),
    ])
}

/// Booleans: `! && ||`
pub fn propositional_logic() -> Language {
    Language::combine([base(), logical_operators()])
}

/// Integers: `& | ^ << >> ~`
pub fn bitmask() -> Language {
    Language::combine([base(), bitmask_operators()])
}

/// Every built-in operator and function
///
/// The table is built once and shared; combining it with other languages
/// never modifies it.
pub fn full() -> Language {
    FULL.clone()
}
