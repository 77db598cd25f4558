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

//! Languages: immutable, composable definition tables
//!
//! A [`Language`] is the unit of extension. Every constructor in this module
//! returns a one-definition language, and languages are merged with
//! [`Language::combine`]. Merging copies the tables into a new language, so
//! a language handed to another thread can never change under it.
//!
//! ```
//! use octofhir_expr::registry::{self, Language};
//! use octofhir_expr::model::Value;
//!
//! let language = Language::combine([
//!     registry::full(),
//!     registry::constant("maximum_time", 53),
//! ]);
//! let evaluable = language.compile("response_time <= maximum_time").unwrap();
//! let parameter: Value = [("response_time", 100)].into_iter().collect();
//! let result = evaluable
//!     .evaluate_bool(&Default::default(), &parameter)
//!     .unwrap();
//! assert!(!result);
//! ```

use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use super::operator::{
    Associativity, EvaluableRule, Fixity, Function, InfixOperator, InfixRule, PostfixOperator,
    PrefixOperator, PrefixRule,
};
use crate::config::ParserConfig;
use crate::evaluator::{Context, Evaluable, EvaluationResult};
use crate::model::Value;
use crate::parser::tokenizer::is_identifier_symbol;
use crate::parser::{ParseResult, Parser};

#[derive(Default, Clone)]
struct LanguageTable {
    prefixes: FxHashMap<String, PrefixOperator>,
    infixes: FxHashMap<String, InfixOperator>,
    postfixes: FxHashMap<String, PostfixOperator>,
    functions: FxHashMap<String, Function>,
    constants: FxHashMap<String, Value>,
    /// Punctuation symbols, longest first
    symbols: Vec<String>,
}

impl LanguageTable {
    fn definition_count(&self) -> usize {
        self.prefixes.len()
            + self.infixes.len()
            + self.postfixes.len()
            + self.functions.len()
            + self.constants.len()
    }

    fn merge(&mut self, other: &LanguageTable) {
        fn merge_map<T: Clone>(
            target: &mut FxHashMap<String, T>,
            source: &FxHashMap<String, T>,
            kind: &str,
        ) {
            for (name, definition) in source {
                if target.insert(name.clone(), definition.clone()).is_some() {
                    log::debug!("{kind} '{name}' overridden by a later definition");
                }
            }
        }

        merge_map(&mut self.prefixes, &other.prefixes, "prefix operator");
        merge_map(&mut self.infixes, &other.infixes, "infix operator");
        merge_map(&mut self.postfixes, &other.postfixes, "postfix operator");
        merge_map(&mut self.functions, &other.functions, "function");
        merge_map(&mut self.constants, &other.constants, "constant");
    }

    fn rebuild_symbols(&mut self) {
        let mut symbols: Vec<String> = self
            .prefixes
            .keys()
            .chain(self.infixes.keys())
            .chain(self.postfixes.keys())
            .filter(|symbol| !is_identifier_symbol(symbol))
            .cloned()
            .collect();
        symbols.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        symbols.dedup();
        self.symbols = symbols;
    }
}

/// Immutable bundle of operator, function and constant definitions
#[derive(Clone, Default)]
pub struct Language {
    inner: Arc<LanguageTable>,
}

impl Language {
    /// Language without any definitions
    pub fn empty() -> Self {
        Self::default()
    }

    fn from_table(mut table: LanguageTable) -> Self {
        table.rebuild_symbols();
        Self {
            inner: Arc::new(table),
        }
    }

    /// Merge languages left to right
    ///
    /// On a collision of name and fixity the later definition wins. Inputs
    /// are left untouched.
    pub fn combine<I>(languages: I) -> Self
    where
        I: IntoIterator<Item = Language>,
    {
        let mut table = LanguageTable::default();
        let mut merged = 0usize;
        for language in languages {
            table.merge(&language.inner);
            merged += 1;
        }
        log::trace!(
            "combined {merged} languages into {} definitions",
            table.definition_count()
        );
        Self::from_table(table)
    }

    /// Merge `other` on top of this language
    pub fn extend(&self, other: &Language) -> Self {
        Self::combine([self.clone(), other.clone()])
    }

    /// Look up a prefix operator
    pub fn prefix(&self, symbol: &str) -> Option<&PrefixOperator> {
        self.inner.prefixes.get(symbol)
    }

    /// Look up an infix operator
    pub fn infix(&self, symbol: &str) -> Option<&InfixOperator> {
        self.inner.infixes.get(symbol)
    }

    /// Look up a postfix operator
    pub fn postfix(&self, symbol: &str) -> Option<&PostfixOperator> {
        self.inner.postfixes.get(symbol)
    }

    /// Look up a function
    pub fn function(&self, name: &str) -> Option<&Function> {
        self.inner.functions.get(name)
    }

    /// Look up a constant
    pub fn constant(&self, name: &str) -> Option<&Value> {
        self.inner.constants.get(name)
    }

    /// Fixities under which `symbol` is registered
    pub fn fixities(&self, symbol: &str) -> Vec<Fixity> {
        let mut fixities = Vec::with_capacity(3);
        if self.inner.prefixes.contains_key(symbol) {
            fixities.push(Fixity::Prefix);
        }
        if self.inner.infixes.contains_key(symbol) {
            fixities.push(Fixity::Infix);
        }
        if self.inner.postfixes.contains_key(symbol) {
            fixities.push(Fixity::Postfix);
        }
        fixities
    }

    /// Punctuation operator symbols, longest first
    pub fn operator_symbols(&self) -> &[String] {
        &self.inner.symbols
    }

    /// Total number of definitions
    pub fn len(&self) -> usize {
        self.inner.definition_count()
    }

    /// Check if the language defines nothing
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Compile an expression with the default parser configuration
    pub fn compile(&self, expression: &str) -> ParseResult<Evaluable> {
        self.compile_with(expression, &ParserConfig::default())
    }

    /// Compile an expression
    pub fn compile_with(&self, expression: &str, config: &ParserConfig) -> ParseResult<Evaluable> {
        let started = Instant::now();
        let result = Parser::new(expression, self, config).parse_all();
        match &result {
            Ok(_) => log::debug!("compiled {expression:?} in {:?}", started.elapsed()),
            Err(error) => log::debug!("failed to compile {expression:?}: {error}"),
        }
        result
    }
}

impl fmt::Debug for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Language")
            .field("prefixes", &self.inner.prefixes.len())
            .field("infixes", &self.inner.infixes.len())
            .field("postfixes", &self.inner.postfixes.len())
            .field("functions", &self.inner.functions.len())
            .field("constants", &self.inner.constants.len())
            .finish()
    }
}

impl FromIterator<Language> for Language {
    fn from_iter<I: IntoIterator<Item = Language>>(iter: I) -> Self {
        Self::combine(iter)
    }
}

/// Prefix operator applying `rule` to its operand
pub fn prefix_operator<F>(symbol: &str, precedence: u8, rule: F) -> Language
where
    F: Fn(&Value) -> EvaluationResult<Value> + Send + Sync + 'static,
{
    let mut table = LanguageTable::default();
    table.prefixes.insert(
        symbol.to_string(),
        PrefixOperator {
            symbol: symbol.to_string(),
            precedence,
            rule: PrefixRule::Value(Arc::new(rule)),
        },
    );
    Language::from_table(table)
}

/// Prefix symbol whose operand is parsed by `callback`
///
/// This is the entry point of sub-languages: the callback receives the
/// parser positioned just after the symbol.
pub fn prefix_extension<F>(symbol: &str, callback: F) -> Language
where
    F: Fn(&mut Parser<'_>) -> ParseResult<Evaluable> + Send + Sync + 'static,
{
    let mut table = LanguageTable::default();
    table.prefixes.insert(
        symbol.to_string(),
        PrefixOperator {
            symbol: symbol.to_string(),
            precedence: super::operator::precedence::PREFIX,
            rule: PrefixRule::Parser(Arc::new(callback)),
        },
    );
    Language::from_table(table)
}

/// Infix operator applying `rule` to both evaluated operands
pub fn infix_operator<F>(
    symbol: &str,
    precedence: u8,
    associativity: Associativity,
    rule: F,
) -> Language
where
    F: Fn(&Value, &Value) -> EvaluationResult<Value> + Send + Sync + 'static,
{
    infix(symbol, precedence, associativity, InfixRule::Value(Arc::new(rule)))
}

/// Infix operator composing the operand evaluables itself
///
/// The rule decides whether and when each operand is evaluated, which is
/// what short-circuiting operators need.
pub fn infix_short_circuit<F>(
    symbol: &str,
    precedence: u8,
    associativity: Associativity,
    rule: F,
) -> Language
where
    F: Fn(Evaluable, Evaluable) -> ParseResult<Evaluable> + Send + Sync + 'static,
{
    let rule: EvaluableRule = Arc::new(rule);
    infix(symbol, precedence, associativity, InfixRule::Evaluable(rule))
}

fn infix(symbol: &str, precedence: u8, associativity: Associativity, rule: InfixRule) -> Language {
    let mut table = LanguageTable::default();
    table.infixes.insert(
        symbol.to_string(),
        InfixOperator {
            symbol: symbol.to_string(),
            precedence,
            associativity,
            rule,
        },
    );
    Language::from_table(table)
}

/// Postfix operator handing the live parser to `callback`
pub fn postfix_operator<F>(symbol: &str, callback: F) -> Language
where
    F: Fn(&mut Parser<'_>, Evaluable) -> ParseResult<Evaluable> + Send + Sync + 'static,
{
    let mut table = LanguageTable::default();
    table.postfixes.insert(
        symbol.to_string(),
        PostfixOperator {
            symbol: symbol.to_string(),
            callback: Arc::new(callback),
        },
    );
    Language::from_table(table)
}

/// Named function over its evaluated arguments
pub fn function<F>(name: &str, rule: F) -> Language
where
    F: Fn(&Context, &[Value]) -> EvaluationResult<Value> + Send + Sync + 'static,
{
    let mut table = LanguageTable::default();
    table.functions.insert(
        name.to_string(),
        Function {
            name: name.to_string(),
            rule: Arc::new(rule),
        },
    );
    Language::from_table(table)
}

/// Named constant
pub fn constant(name: &str, value: impl Into<Value>) -> Language {
    let mut table = LanguageTable::default();
    table.constants.insert(name.to_string(), value.into());
    Language::from_table(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::operator::precedence;

    fn always(value: &'static str) -> Language {
        infix_operator(">", precedence::RELATIONAL, Associativity::Left, move |_, _| {
            Ok(Value::from(value))
        })
    }

    #[test]
    fn test_later_definition_wins() {
        let language = Language::combine([always("first"), always("second")]);
        let result = language
            .compile("1 > 2")
            .unwrap()
            .evaluate(&Context::background(), &Value::Null)
            .unwrap();
        assert_eq!(result, Value::from("second"));
    }

    #[test]
    fn test_combine_keeps_inputs_untouched() {
        let base = Language::combine([constant("a", 1), always("x")]);
        let extended = base.extend(&constant("b", 2));

        assert!(base.constant("b").is_none());
        assert_eq!(extended.constant("a"), Some(&Value::from(1)));
        assert_eq!(extended.constant("b"), Some(&Value::from(2)));
        assert_eq!(base.len(), 2);
        assert_eq!(extended.len(), 3);
    }

    #[test]
    fn test_fixity_is_part_of_the_key() {
        let language = Language::combine([
            prefix_operator("-", precedence::PREFIX, |v| Ok(v.clone())),
            infix_operator("-", precedence::ADDITIVE, Associativity::Left, |l, _| {
                Ok(l.clone())
            }),
        ]);
        assert_eq!(language.fixities("-"), vec![Fixity::Prefix, Fixity::Infix]);
    }

    #[test]
    fn test_symbols_exclude_keywords_and_sort_longest_first() {
        let noop = |l: &Value, _: &Value| -> EvaluationResult<Value> { Ok(l.clone()) };
        let language = Language::combine([
            infix_operator("<", 50, Associativity::Left, noop),
            infix_operator("<=", 50, Associativity::Left, noop),
            infix_operator("in", 40, Associativity::Left, noop),
            infix_operator("<<", 58, Associativity::Left, noop),
        ]);
        assert_eq!(language.operator_symbols(), &["<<", "<=", "<"]);
    }
}
