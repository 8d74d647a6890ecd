//! Decoder for the legacy PHP-style serialization some hosts use when a
//! builder document predates JSON storage.
//!
//! The format is length-prefixed and byte-oriented:
//! `s:5:"hello";`, `i:42;`, `d:1.5;`, `b:1;`, `N;`, and
//! `a:2:{<key><value><key><value>}`. Arrays whose keys are the sequence
//! `0..n` decode to JSON sequences; everything else decodes to mappings.

use serde_json::{Map, Number, Value};
use thiserror::Error;

pub type LegacyResult<T> = Result<T, LegacyError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LegacyError {
    #[error("Unexpected byte at {pos}: expected {expected}")]
    Unexpected { pos: usize, expected: String },

    #[error("Unexpected end of input at {pos}")]
    UnexpectedEof { pos: usize },

    #[error("Invalid length prefix at {pos}")]
    InvalidLength { pos: usize },

    #[error("Invalid number at {pos}")]
    InvalidNumber { pos: usize },

    #[error("Invalid array key at {pos}")]
    InvalidKey { pos: usize },
}

impl LegacyError {
    fn unexpected(pos: usize, expected: impl Into<String>) -> Self {
        Self::Unexpected {
            pos,
            expected: expected.into(),
        }
    }
}

/// Quick sniff for whether a string even looks like legacy-serialized
/// data, used to skip the full parse on plain JSON input.
pub fn looks_serialized(input: &str) -> bool {
    let bytes = input.as_bytes();
    matches!(bytes.first(), Some(b'a' | b's' | b'i' | b'd' | b'b' | b'N' | b'O'))
        && (bytes.get(1) == Some(&b':') || bytes.get(1) == Some(&b';'))
}

/// Decode a legacy-serialized string. Failures surface as `None`; the
/// caller falls through to the next decoding strategy.
pub fn decode(input: &str) -> Option<Value> {
    if !looks_serialized(input) {
        return None;
    }
    LegacyParser::new(input).parse().ok()
}

pub struct LegacyParser<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> LegacyParser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input: input.as_bytes(),
            pos: 0,
        }
    }

    /// Parse one serialized value. Trailing bytes are tolerated; hosts
    /// occasionally append padding after the closing brace.
    pub fn parse(mut self) -> LegacyResult<Value> {
        self.parse_value()
    }

    fn parse_value(&mut self) -> LegacyResult<Value> {
        match self.peek()? {
            b's' => self.parse_string().map(Value::String),
            b'i' => self.parse_int(),
            b'd' => self.parse_double(),
            b'b' => self.parse_bool(),
            b'N' => self.parse_null(),
            b'a' => self.parse_array(),
            _ => Err(LegacyError::unexpected(self.pos, "s, i, d, b, N or a")),
        }
    }

    fn parse_string(&mut self) -> LegacyResult<String> {
        self.expect(b's')?;
        self.expect(b':')?;
        let len = self.parse_length()?;
        self.expect(b':')?;
        self.expect(b'"')?;

        // Lengths count bytes, not characters.
        let start = self.pos;
        let end = start
            .checked_add(len)
            .filter(|&end| end <= self.input.len())
            .ok_or(LegacyError::UnexpectedEof { pos: start })?;
        let text = std::str::from_utf8(&self.input[start..end])
            .map_err(|_| LegacyError::InvalidLength { pos: start })?
            .to_string();
        self.pos = end;

        self.expect(b'"')?;
        self.expect(b';')?;
        Ok(text)
    }

    fn parse_int(&mut self) -> LegacyResult<Value> {
        self.expect(b'i')?;
        self.expect(b':')?;
        let digits = self.take_until(b';')?;
        let number = digits
            .parse::<i64>()
            .map_err(|_| LegacyError::InvalidNumber { pos: self.pos })?;
        self.expect(b';')?;
        Ok(Value::Number(number.into()))
    }

    fn parse_double(&mut self) -> LegacyResult<Value> {
        self.expect(b'd')?;
        self.expect(b':')?;
        let digits = self.take_until(b';')?;
        let number = digits
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .ok_or(LegacyError::InvalidNumber { pos: self.pos })?;
        self.expect(b';')?;
        Ok(Value::Number(number))
    }

    fn parse_bool(&mut self) -> LegacyResult<Value> {
        self.expect(b'b')?;
        self.expect(b':')?;
        let flag = match self.next()? {
            b'0' => false,
            b'1' => true,
            _ => return Err(LegacyError::unexpected(self.pos - 1, "0 or 1")),
        };
        self.expect(b';')?;
        Ok(Value::Bool(flag))
    }

    fn parse_null(&mut self) -> LegacyResult<Value> {
        self.expect(b'N')?;
        self.expect(b';')?;
        Ok(Value::Null)
    }

    fn parse_array(&mut self) -> LegacyResult<Value> {
        self.expect(b'a')?;
        self.expect(b':')?;
        let count = self.parse_length()?;
        self.expect(b':')?;
        self.expect(b'{')?;

        let mut entries: Vec<(String, Value)> = Vec::with_capacity(count);
        let mut sequential = true;
        for index in 0..count {
            let key_pos = self.pos;
            let key = match self.parse_value()? {
                Value::String(key) => {
                    sequential = false;
                    key
                }
                Value::Number(number) => {
                    let key = number.to_string();
                    if key != index.to_string() {
                        sequential = false;
                    }
                    key
                }
                _ => return Err(LegacyError::InvalidKey { pos: key_pos }),
            };
            let value = self.parse_value()?;
            entries.push((key, value));
        }
        self.expect(b'}')?;

        if sequential {
            Ok(Value::Array(entries.into_iter().map(|(_, v)| v).collect()))
        } else {
            let mut map = Map::new();
            for (key, value) in entries {
                map.insert(key, value);
            }
            Ok(Value::Object(map))
        }
    }

    fn parse_length(&mut self) -> LegacyResult<usize> {
        let digits = self.take_while_digits();
        if digits.is_empty() {
            return Err(LegacyError::InvalidLength { pos: self.pos });
        }
        digits
            .parse::<usize>()
            .map_err(|_| LegacyError::InvalidLength { pos: self.pos })
    }

    fn take_while_digits(&mut self) -> String {
        let start = self.pos;
        while matches!(self.input.get(self.pos), Some(b) if b.is_ascii_digit()) {
            self.pos += 1;
        }
        String::from_utf8_lossy(&self.input[start..self.pos]).into_owned()
    }

    fn take_until(&mut self, stop: u8) -> LegacyResult<String> {
        let start = self.pos;
        while let Some(&byte) = self.input.get(self.pos) {
            if byte == stop {
                return Ok(String::from_utf8_lossy(&self.input[start..self.pos]).into_owned());
            }
            self.pos += 1;
        }
        Err(LegacyError::UnexpectedEof { pos: self.pos })
    }

    fn peek(&self) -> LegacyResult<u8> {
        self.input
            .get(self.pos)
            .copied()
            .ok_or(LegacyError::UnexpectedEof { pos: self.pos })
    }

    fn next(&mut self) -> LegacyResult<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        Ok(byte)
    }

    fn expect(&mut self, expected: u8) -> LegacyResult<()> {
        let byte = self.next()?;
        if byte != expected {
            return Err(LegacyError::unexpected(
                self.pos - 1,
                (expected as char).to_string(),
            ));
        }
        Ok(())
    }
}
