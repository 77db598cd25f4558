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

//! Tokenizer for expression text
//!
//! The tokenizer knows no operators of its own. Symbol tokens are matched
//! against the punctuation symbols registered by the active language,
//! longest first, so `<=` is never split into `<` and `=` when both exist.
//! Any other ASCII punctuation character becomes a one-character operator
//! token and is left for the parser to reject.
//!
//! - Zero-copy slices for identifiers, operators and raw strings
//! - Quoted strings are only copied when they contain escapes

use std::borrow::Cow;
use std::fmt;

use super::error::{LexError, LexResult};
use super::span::Spanned;

/// Lexical unit of an expression
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'input> {
    /// Numeric literal (e.g. `42`, `3.5`, `1e3`)
    Number(f64),
    /// Quoted string with escapes decoded (e.g. `"a\tb"`, `'x'`)
    String(Cow<'input, str>),
    /// Backtick string taken verbatim
    RawString(&'input str),
    /// Identifier (variable, function or keyword-like operator name)
    Identifier(&'input str),
    /// Operator symbol
    Operator(&'input str),
    /// Structural punctuation: `( ) [ ] { } , . :`
    Punct(char),
}

impl<'input> Token<'input> {
    /// Get the identifier name
    pub fn as_identifier(&self) -> Option<&'input str> {
        match self {
            Token::Identifier(name) => Some(*name),
            _ => None,
        }
    }

    /// Check for a specific punctuation character
    pub fn is_punct(&self, ch: char) -> bool {
        matches!(self, Token::Punct(c) if *c == ch)
    }

    /// Symbol text for identifier and operator tokens
    pub fn symbol(&self) -> Option<&'input str> {
        match self {
            Token::Identifier(s) | Token::Operator(s) => Some(*s),
            _ => None,
        }
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "number {n}"),
            Token::String(s) => write!(f, "string {s:?}"),
            Token::RawString(s) => write!(f, "raw string `{s}`"),
            Token::Identifier(s) => write!(f, "identifier '{s}'"),
            Token::Operator(s) => write!(f, "operator '{s}'"),
            Token::Punct(c) => write!(f, "'{c}'"),
        }
    }
}

const PUNCTUATION: &[char] = &['(', ')', '[', ']', '{', '}', ',', '.', ':'];

/// Check if `symbol` is spelled like an identifier
pub fn is_identifier_symbol(symbol: &str) -> bool {
    let mut chars = symbol.chars();
    chars.next().is_some_and(is_id_start) && chars.all(is_id_continue)
}

#[inline]
fn is_id_start(ch: char) -> bool {
    ch == '_' || ch.is_alphabetic()
}

#[inline]
fn is_id_continue(ch: char) -> bool {
    ch == '_' || ch.is_alphanumeric()
}

/// Tokenizer over one expression
#[derive(Debug, Clone)]
pub struct Tokenizer<'input> {
    source: &'input str,
    pos: usize,
    /// Punctuation symbols registered by the language, longest first
    symbols: &'input [String],
}

impl<'input> Tokenizer<'input> {
    /// Create a tokenizer matching operator symbols from `symbols`
    ///
    /// `symbols` must be ordered longest first.
    pub fn new(source: &'input str, symbols: &'input [String]) -> Self {
        Self {
            source,
            pos: 0,
            symbols,
        }
    }

    /// Current byte offset
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Full source text
    pub fn source(&self) -> &'input str {
        self.source
    }

    fn rest(&self) -> &'input str {
        &self.source[self.pos..]
    }

    fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        let trimmed = rest.trim_start();
        self.pos += rest.len() - trimmed.len();
    }

    /// Produce the next token, or `None` at end of input
    pub fn next_token(&mut self) -> LexResult<Option<Spanned<Token<'input>>>> {
        self.skip_whitespace();
        let start = self.pos;
        let Some(ch) = self.peek_char() else {
            return Ok(None);
        };

        let token = match ch {
            '0'..='9' => self.parse_number()?,
            '"' | '\'' => Token::String(self.parse_string(ch)?),
            '`' => Token::RawString(self.parse_raw_string()?),
            c if is_id_start(c) => Token::Identifier(self.parse_identifier()),
            _ => self.parse_symbol(ch)?,
        };
        Ok(Some(Spanned::new(token, start, self.pos)))
    }

    /// Tokenize the remaining input
    pub fn tokenize_all(&mut self) -> LexResult<Vec<Spanned<Token<'input>>>> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn parse_symbol(&mut self, ch: char) -> LexResult<Token<'input>> {
        let rest = self.rest();
        if let Some(symbol) = self.symbols.iter().find(|s| rest.starts_with(s.as_str())) {
            let text = &rest[..symbol.len()];
            self.pos += symbol.len();
            return Ok(Token::Operator(text));
        }
        if PUNCTUATION.contains(&ch) {
            self.pos += 1;
            return Ok(Token::Punct(ch));
        }
        if ch.is_ascii_punctuation() {
            let text = &rest[..1];
            self.pos += 1;
            return Ok(Token::Operator(text));
        }
        Err(LexError::UnexpectedCharacter {
            character: ch,
            position: self.pos,
        })
    }

    fn parse_identifier(&mut self) -> &'input str {
        let rest = self.rest();
        let len = rest
            .char_indices()
            .find(|&(_, c)| !is_id_continue(c))
            .map_or(rest.len(), |(i, _)| i);
        self.pos += len;
        &rest[..len]
    }

    fn parse_number(&mut self) -> LexResult<Token<'input>> {
        let start = self.pos;
        let bytes = self.source.as_bytes();
        let digits = |mut i: usize| {
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            i
        };

        let mut end = digits(start);
        if bytes.get(end) == Some(&b'.') && bytes.get(end + 1).is_some_and(u8::is_ascii_digit) {
            end = digits(end + 1);
        }
        if matches!(bytes.get(end), Some(b'e' | b'E')) {
            let mut exponent = end + 1;
            if matches!(bytes.get(exponent), Some(b'+' | b'-')) {
                exponent += 1;
            }
            if bytes.get(exponent).is_some_and(u8::is_ascii_digit) {
                end = digits(exponent);
            }
        }

        let literal = &self.source[start..end];
        self.pos = end;
        literal
            .parse::<f64>()
            .map(Token::Number)
            .map_err(|_| LexError::InvalidNumber {
                literal: literal.to_string(),
                position: start,
            })
    }

    fn parse_raw_string(&mut self) -> LexResult<&'input str> {
        let start = self.pos;
        let body = &self.source[start + 1..];
        match body.find('`') {
            Some(len) => {
                self.pos = start + 1 + len + 1;
                Ok(&body[..len])
            }
            None => Err(LexError::UnclosedRawString { position: start }),
        }
    }

    fn parse_string(&mut self, quote: char) -> LexResult<Cow<'input, str>> {
        let start = self.pos;
        let body_start = start + 1;
        let body = &self.source[body_start..];

        // Fast path: no escapes before the closing quote
        match body.find([quote, '\\']) {
            Some(len) if body[len..].starts_with(quote) => {
                self.pos = body_start + len + 1;
                return Ok(Cow::Borrowed(&body[..len]));
            }
            None => return Err(LexError::UnclosedString { position: start }),
            Some(_) => {}
        }

        let mut decoded = String::with_capacity(body.len());
        let mut chars = body.char_indices();
        while let Some((offset, c)) = chars.next() {
            match c {
                c if c == quote => {
                    self.pos = body_start + offset + 1;
                    return Ok(Cow::Owned(decoded));
                }
                '\\' => {
                    let escape_pos = body_start + offset;
                    decoded.push(self.decode_escape(&mut chars, escape_pos)?);
                }
                c => decoded.push(c),
            }
        }
        Err(LexError::UnclosedString { position: start })
    }

    fn decode_escape(
        &self,
        chars: &mut std::str::CharIndices<'input>,
        position: usize,
    ) -> LexResult<char> {
        let invalid = |sequence: &str| LexError::InvalidEscape {
            sequence: sequence.to_string(),
            position,
        };
        let Some((_, kind)) = chars.next() else {
            return Err(LexError::UnclosedString { position });
        };

        let width = match kind {
            'a' => return Ok('\u{07}'),
            'b' => return Ok('\u{08}'),
            'f' => return Ok('\u{0C}'),
            'n' => return Ok('\n'),
            'r' => return Ok('\r'),
            't' => return Ok('\t'),
            'v' => return Ok('\u{0B}'),
            '\\' | '\'' | '"' => return Ok(kind),
            'x' => 2,
            'u' => 4,
            'U' => 8,
            other => return Err(invalid(&format!("\\{other}"))),
        };

        let mut digits = String::with_capacity(width);
        for _ in 0..width {
            match chars.next() {
                Some((_, c)) if c.is_ascii_hexdigit() => digits.push(c),
                _ => return Err(invalid(&format!("\\{kind}{digits}"))),
            }
        }
        u32::from_str_radix(&digits, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| invalid(&format!("\\{kind}{digits}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn symbols(list: &[&str]) -> Vec<String> {
        let mut symbols: Vec<String> = list.iter().map(|s| s.to_string()).collect();
        symbols.sort_by(|a, b| b.len().cmp(&a.len()));
        symbols
    }

    fn tokens<'a>(input: &'a str, symbols: &'a [String]) -> Vec<Token<'a>> {
        Tokenizer::new(input, symbols)
            .tokenize_all()
            .unwrap()
            .into_iter()
            .map(|t| t.value)
            .collect()
    }

    #[test]
    fn test_tokenizer_basic() {
        let table = symbols(&[">"]);
        assert_eq!(
            tokens("foo.bar > 0", &table),
            vec![
                Token::Identifier("foo"),
                Token::Punct('.'),
                Token::Identifier("bar"),
                Token::Operator(">"),
                Token::Number(0.0),
            ]
        );
    }

    #[test]
    fn test_maximal_munch() {
        let table = symbols(&["<", "<=", "=", "==", "&&", "&"]);
        assert_eq!(
            tokens("a<=b==c&&d&e", &table)
                .iter()
                .filter_map(|t| match t {
                    Token::Operator(s) => Some(*s),
                    _ => None,
                })
                .collect::<Vec<_>>(),
            vec!["<=", "==", "&&", "&"]
        );
    }

    #[test]
    fn test_unregistered_symbols_split() {
        let table = symbols(&["<"]);
        assert_eq!(
            tokens("<=", &table),
            vec![Token::Operator("<"), Token::Operator("=")]
        );
    }

    #[test]
    fn test_spans() {
        let mut tokenizer = Tokenizer::new("  abc  12", &[]);
        let first = tokenizer.next_token().unwrap().unwrap();
        assert_eq!((first.start, first.end), (2, 5));
        assert_eq!(first.value.as_identifier(), Some("abc"));
        let second = tokenizer.next_token().unwrap().unwrap();
        assert_eq!((second.start, second.end), (7, 9));
        assert!(tokenizer.next_token().unwrap().is_none());
    }

    #[rstest]
    #[case("42", 42.0)]
    #[case("3.25", 3.25)]
    #[case("1e3", 1000.0)]
    #[case("2.5E-1", 0.25)]
    fn test_numbers(#[case] input: &str, #[case] expected: f64) {
        assert_eq!(tokens(input, &[]), vec![Token::Number(expected)]);
    }

    #[rstest]
    #[case(r#""hello world""#, "hello world")]
    #[case(r#"'single'"#, "single")]
    #[case(r#""hello world!\n\u263a""#, "hello world!\n\u{263a}")]
    #[case(r#""tab\tquote\"x\x41""#, "tab\tquote\"xA")]
    #[case(r#""\U0001F600""#, "\u{1F600}")]
    fn test_string_escapes(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(tokens(input, &[]), vec![Token::String(expected.into())]);
    }

    #[test]
    fn test_raw_string_is_verbatim() {
        assert_eq!(
            tokens("`line one\nline \\n two`", &[]),
            vec![Token::RawString("line one\nline \\n two")]
        );
    }

    #[test]
    fn test_unicode_identifiers() {
        assert_eq!(tokens("größe_1", &[]), vec![Token::Identifier("größe_1")]);
        assert!(is_identifier_symbol("in"));
        assert!(!is_identifier_symbol("=~"));
    }

    #[test]
    fn test_lex_errors() {
        let err = Tokenizer::new(r#""open"#, &[]).tokenize_all().unwrap_err();
        assert_eq!(err, LexError::UnclosedString { position: 0 });

        let err = Tokenizer::new("x `open", &[]).tokenize_all().unwrap_err();
        assert_eq!(err, LexError::UnclosedRawString { position: 2 });

        let err = Tokenizer::new(r#""bad \q""#, &[]).tokenize_all().unwrap_err();
        assert_eq!(
            err,
            LexError::InvalidEscape {
                sequence: "\\q".to_string(),
                position: 5
            }
        );

        let err = Tokenizer::new("a § b", &[]).tokenize_all().unwrap_err();
        assert_eq!(
            err,
            LexError::UnexpectedCharacter {
                character: '§',
                position: 2
            }
        );
    }
}
