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

//! Precedence-climbing parser compiling straight to evaluables
//!
//! The parser is driven entirely by the active [`Language`]: it knows the
//! structural punctuation and nothing else. Each operand and operator is
//! compiled into an [`Evaluable`] as soon as it is recognised, so no syntax
//! tree is ever materialised.
//!
//! ## Binding rules
//!
//! - Infix operators bind when their precedence is at least the caller's
//!   minimum. The right operand is parsed one level higher for
//!   left-associative operators and at the same level for right-associative
//!   ones.
//! - Postfix operators bind loosest of all: they apply only at the outermost
//!   level of an expression (or parenthesised sub-expression) and take
//!   everything to their left. When a symbol is registered both as infix and
//!   as postfix, the postfix definition is used.
//! - Prefix operators parse their operand at their own precedence.
//!
//! ## Extension points
//!
//! Prefix extensions and postfix callbacks receive the live `Parser` and may
//! consume further input through its public methods, re-entering
//! [`Parser::parse_expression`] as needed.

use std::sync::Arc;

use indexmap::IndexMap;

use super::error::{ParseError, ParseResult};
use super::span::Spanned;
use super::tokenizer::{Token, Tokenizer};
use crate::config::ParserConfig;
use crate::evaluator::navigation::{self, Chain, Step};
use crate::evaluator::{Evaluable, EvaluationError, EvaluationResult};
use crate::model::Value;
use crate::registry::{Language, PrefixRule};

/// Lowest binding power, accepted by every operator
pub const LOWEST: u8 = 0;

/// Parser over one expression
pub struct Parser<'a> {
    tokenizer: Tokenizer<'a>,
    /// One token of lookahead; `None` until scanned
    lookahead: Option<Option<Spanned<Token<'a>>>>,
    language: &'a Language,
    config: &'a ParserConfig,
    depth: usize,
}

impl<'a> Parser<'a> {
    /// Create a parser for `source` driven by `language`
    pub fn new(source: &'a str, language: &'a Language, config: &'a ParserConfig) -> Self {
        Self {
            tokenizer: Tokenizer::new(source, language.operator_symbols()),
            lookahead: None,
            language,
            config,
            depth: 0,
        }
    }

    /// Language driving the parser
    pub fn language(&self) -> &'a Language {
        self.language
    }

    /// Full source text
    pub fn source(&self) -> &'a str {
        self.tokenizer.source()
    }

    /// Byte offset of the next token
    pub fn position(&self) -> usize {
        match &self.lookahead {
            Some(Some(token)) => token.start,
            _ => self.tokenizer.position(),
        }
    }

    fn fill(&mut self) -> ParseResult<()> {
        if self.lookahead.is_none() {
            self.lookahead = Some(self.tokenizer.next_token()?);
        }
        Ok(())
    }

    /// Look at the next token without consuming it
    pub fn peek(&mut self) -> ParseResult<Option<&Spanned<Token<'a>>>> {
        self.fill()?;
        Ok(self.lookahead.as_ref().and_then(Option::as_ref))
    }

    /// Symbol text of the next token, if it is an identifier or operator
    pub fn peek_symbol(&mut self) -> ParseResult<Option<&'a str>> {
        Ok(self.peek()?.and_then(|token| token.value.symbol()))
    }

    /// Check if the next token is the punctuation `ch`
    pub fn peek_punct(&mut self, ch: char) -> ParseResult<bool> {
        Ok(self.peek()?.is_some_and(|token| token.value.is_punct(ch)))
    }

    /// Consume the next token
    pub fn advance(&mut self) -> ParseResult<Option<Spanned<Token<'a>>>> {
        self.fill()?;
        Ok(self.lookahead.take().flatten())
    }

    /// Consume the next token, failing at end of input
    pub fn expect_token(&mut self) -> ParseResult<Spanned<Token<'a>>> {
        match self.advance()? {
            Some(token) => Ok(token),
            None => Err(self.end_of_input()),
        }
    }

    /// Consume the punctuation `ch` if it comes next
    pub fn consume_punct(&mut self, ch: char) -> ParseResult<bool> {
        if self.peek_punct(ch)? {
            self.advance()?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Consume the operator or identifier `symbol` if it comes next
    pub fn consume_symbol(&mut self, symbol: &str) -> ParseResult<bool> {
        if self.peek_symbol()? == Some(symbol) {
            self.advance()?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Require the punctuation `ch`
    pub fn expect_punct(&mut self, ch: char) -> ParseResult<()> {
        let token = self.expect_token()?;
        if token.value.is_punct(ch) {
            return Ok(());
        }
        if matches!(ch, ')' | ']' | '}') {
            return Err(ParseError::UnmatchedDelimiter {
                expected: ch.to_string(),
                found: token.value.to_string(),
                position: token.start,
            });
        }
        Err(Self::unexpected(&token))
    }

    /// Require an identifier and return its name
    pub fn expect_identifier(&mut self) -> ParseResult<&'a str> {
        let token = self.expect_token()?;
        token
            .value
            .as_identifier()
            .ok_or_else(|| Self::unexpected(&token))
    }

    /// Error for a token that cannot appear where it was found
    pub fn unexpected(token: &Spanned<Token<'_>>) -> ParseError {
        ParseError::UnexpectedToken {
            token: token.value.to_string(),
            position: token.start,
        }
    }

    fn end_of_input(&self) -> ParseError {
        ParseError::UnexpectedEndOfInput {
            position: self.source().len(),
        }
    }

    /// Compile the whole input as one expression
    ///
    /// The result checks the execution context before anything else runs.
    pub fn parse_all(mut self) -> ParseResult<Evaluable> {
        let expression = self.parse_expression()?;
        if let Some(token) = self.advance()? {
            return Err(match token.value {
                Token::Punct(c @ (')' | ']' | '}')) => ParseError::UnmatchedDelimiter {
                    expected: "end of input".to_string(),
                    found: format!("'{c}'"),
                    position: token.start,
                },
                _ => ParseError::TrailingInput {
                    token: token.value.to_string(),
                    position: token.start,
                },
            });
        }
        Ok(Evaluable::new(move |context, parameter| {
            context.check()?;
            expression.evaluate(context, parameter)
        }))
    }

    /// Parse a full sub-expression at the lowest binding power
    pub fn parse_expression(&mut self) -> ParseResult<Evaluable> {
        self.parse_expression_with_precedence(LOWEST)
    }

    /// Parse a sub-expression binding operators of at least `min_precedence`
    pub fn parse_expression_with_precedence(
        &mut self,
        min_precedence: u8,
    ) -> ParseResult<Evaluable> {
        let depth = self.depth;
        let result = self
            .deepen()
            .and_then(|()| self.parse_operators(min_precedence));
        self.depth = depth;
        result
    }

    /// Count one more level of evaluable nesting against the limit
    ///
    /// Every recursive parse and every operator fold adds a level, so the
    /// depth of the compiled tree never exceeds `max_depth`.
    fn deepen(&mut self) -> ParseResult<()> {
        if self.depth >= self.config.max_depth {
            return Err(ParseError::RecursionLimitExceeded {
                limit: self.config.max_depth,
                position: self.position(),
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn parse_operators(&mut self, min_precedence: u8) -> ParseResult<Evaluable> {
        let language = self.language;
        let mut left = self.parse_operand()?;

        while let Some(symbol) = self.peek_symbol()? {
            if let Some(operator) = language.postfix(symbol) {
                if min_precedence > LOWEST {
                    break;
                }
                self.deepen()?;
                self.advance()?;
                left = (operator.callback)(self, left)?;
                continue;
            }
            let Some(operator) = language.infix(symbol) else {
                break;
            };
            if operator.precedence < min_precedence {
                break;
            }
            self.deepen()?;
            self.advance()?;
            let right = self.parse_expression_with_precedence(operator.right_precedence())?;
            left = operator.build(left, right)?;
        }
        Ok(left)
    }

    /// Parse one operand: a literal, a prefix application, a parenthesised
    /// expression, a structured literal or an identifier, followed by any
    /// accessor suffixes
    pub fn parse_operand(&mut self) -> ParseResult<Evaluable> {
        let language = self.language;
        let token = self.expect_token()?;
        let operand = match token.value {
            Token::Number(n) => Evaluable::constant(n),
            Token::String(s) => Evaluable::constant(s.into_owned()),
            Token::RawString(s) => Evaluable::constant(s),
            Token::Punct('(') => {
                let inner = self.parse_expression()?;
                self.expect_punct(')')?;
                inner
            }
            Token::Punct('[') => self.parse_array()?,
            Token::Punct('{') => self.parse_object()?,
            Token::Operator(symbol) => match language.prefix(symbol) {
                Some(_) => return self.parse_prefix(symbol),
                None => return Err(self.not_an_operand(&token, symbol)),
            },
            Token::Identifier(name) => {
                if language.prefix(name).is_some() {
                    return self.parse_prefix(name);
                }
                self.parse_identifier(&token, name)?
            }
            Token::Punct(_) => return Err(Self::unexpected(&token)),
        };
        self.parse_suffixes(operand)
    }

    fn not_an_operand(&self, token: &Spanned<Token<'_>>, symbol: &str) -> ParseError {
        if self.language.infix(symbol).is_some() || self.language.postfix(symbol).is_some() {
            ParseError::FixityMismatch {
                operator: symbol.to_string(),
                position: token.start,
            }
        } else {
            Self::unexpected(token)
        }
    }

    fn parse_prefix(&mut self, symbol: &str) -> ParseResult<Evaluable> {
        let language = self.language;
        let Some(operator) = language.prefix(symbol) else {
            return Err(ParseError::extension(symbol, "prefix operator vanished"));
        };
        match &operator.rule {
            PrefixRule::Parser(callback) => {
                let callback = Arc::clone(callback);
                callback(self)
            }
            PrefixRule::Value(_) => {
                let operand = self.parse_expression_with_precedence(operator.precedence)?;
                Ok(operator.apply(operand))
            }
        }
    }

    fn parse_identifier(
        &mut self,
        token: &Spanned<Token<'a>>,
        name: &'a str,
    ) -> ParseResult<Evaluable> {
        if self.consume_punct('(')? {
            let args = self.parse_arguments(')')?;
            return Ok(self.call(name, args));
        }
        if let Some(value) = self.language.constant(name) {
            return Ok(Evaluable::constant(value.clone()));
        }
        if self.language.infix(name).is_some() || self.language.postfix(name).is_some() {
            return Err(self.not_an_operand(token, name));
        }
        Ok(navigation::variable(name))
    }

    /// Compile a call of `name`
    ///
    /// Arguments are evaluated left to right. A name the language does not
    /// define is tried as an operation of the parameter at evaluation time,
    /// then reported as an unknown function.
    fn call(&self, name: &str, args: Vec<Evaluable>) -> Evaluable {
        let rule = self.language.function(name).map(|f| Arc::clone(&f.rule));
        let name = name.to_string();
        Evaluable::new(move |context, parameter| {
            context.check()?;
            let values = evaluate_all(&args, context, parameter)?;
            context.check()?;
            match &rule {
                Some(rule) => rule(context, &values),
                None => navigation::try_invoke(context, parameter, &name, &values).unwrap_or_else(
                    || {
                        Err(EvaluationError::UnknownFunction {
                            name: name.clone(),
                        })
                    },
                ),
            }
        })
    }

    /// Parse comma-separated expressions up to and including `close`
    ///
    /// The opening delimiter must already be consumed.
    pub fn parse_arguments(&mut self, close: char) -> ParseResult<Vec<Evaluable>> {
        let mut args = Vec::new();
        if self.consume_punct(close)? {
            return Ok(args);
        }
        loop {
            args.push(self.parse_expression()?);
            if self.consume_punct(',')? {
                continue;
            }
            self.expect_punct(close)?;
            return Ok(args);
        }
    }

    fn parse_array(&mut self) -> ParseResult<Evaluable> {
        let items = self.parse_arguments(']')?;
        Ok(Evaluable::new(move |context, parameter| {
            evaluate_all(&items, context, parameter).map(Value::Array)
        }))
    }

    fn parse_object(&mut self) -> ParseResult<Evaluable> {
        let mut entries = Vec::new();
        if !self.consume_punct('}')? {
            loop {
                let key = self.parse_expression()?;
                self.expect_punct(':')?;
                let value = self.parse_expression()?;
                entries.push((key, value));
                if self.consume_punct(',')? {
                    continue;
                }
                self.expect_punct('}')?;
                break;
            }
        }
        Ok(Evaluable::new(move |context, parameter| {
            let mut object = IndexMap::with_capacity(entries.len());
            for (key, value) in &entries {
                let key = match key.evaluate(context, parameter)? {
                    Value::String(s) => s,
                    key @ (Value::Number(_) | Value::Bool(_)) => key.to_string(),
                    other => {
                        return Err(EvaluationError::InvalidOperand {
                            operator: "{}".to_string(),
                            operand: other.type_name().to_string(),
                        });
                    }
                };
                object.insert(key, value.evaluate(context, parameter)?);
            }
            Ok(Value::Object(object))
        }))
    }

    /// Parse `.name`, `.name(args)` and `[expr]` suffixes onto `base`
    pub fn parse_suffixes(&mut self, base: Evaluable) -> ParseResult<Evaluable> {
        let mut chain = Chain::new();
        loop {
            if self.consume_punct('.')? {
                let name = self.expect_identifier()?;
                if self.consume_punct('(')? {
                    let args = self.parse_arguments(')')?;
                    chain.push(Step::Method(name.to_string(), args));
                } else {
                    chain.push(Step::Field(name.to_string()));
                }
            } else if self.consume_punct('[')? {
                let key = self.parse_expression()?;
                self.expect_punct(']')?;
                chain.push(Step::Index(key));
            } else {
                break;
            }
        }
        Ok(chain.into_evaluable(base))
    }
}

fn evaluate_all(
    items: &[Evaluable],
    context: &crate::evaluator::Context,
    parameter: &Value,
) -> EvaluationResult<Vec<Value>> {
    items
        .iter()
        .map(|item| item.evaluate(context, parameter))
        .collect()
}
