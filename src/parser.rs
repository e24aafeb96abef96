//! Tolerant notation parser.
//!
//! Accepts JSON plus the shell-style extras people paste from MongoDB tooling:
//!
//! - unquoted keys (`{a: 1, $gt: 2}`) and single-quoted strings
//! - trailing commas
//! - regex literals: `/^ab/i`
//! - dates: `ISODate("2020-01-01T00:00:00Z")`, `new Date("2020-01-01")`,
//!   `Date(1577836800000)`; with no argument the current time is used
//! - ids: `ObjectId("5f1d7f3e9c1b2a0012345678")`, read as the hex string
//! - `NaN`, `Infinity`, `-Infinity`
//!
//! The engine never calls this module; it only prepares input for it.

use std::mem;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use thiserror::Error;

use crate::{
    error::PatternError,
    lexer::{LexError, Lexer},
    token::Token,
    value::{Map, Pattern, Value},
};

#[derive(Debug, Clone, Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("expected {expected}, found {found} at position {position}")]
    UnexpectedToken {
        expected: String,
        found: String,
        position: usize,
    },

    #[error("unknown constructor '{name}' at position {position}")]
    UnknownConstructor { name: String, position: usize },

    #[error("invalid date '{0}'")]
    InvalidDate(String),

    #[error("invalid ObjectId '{0}': expected 24 hex digits")]
    InvalidObjectId(String),

    #[error(transparent)]
    InvalidRegex(#[from] PatternError),
}

pub struct Parser {
    lexer: Lexer,
    pub(crate) current_token: Token,
    token_start: usize,
}

impl Parser {
    pub fn new(mut lexer: Lexer) -> Result<Self, ParseError> {
        let current_token = lexer.next_token()?;
        let token_start = lexer.token_start();
        Ok(Parser {
            lexer,
            current_token,
            token_start,
        })
    }

    pub(crate) fn advance(&mut self) -> Result<(), ParseError> {
        self.current_token = self.lexer.next_token()?;
        self.token_start = self.lexer.token_start();
        Ok(())
    }

    fn check(&self, token: &Token) -> bool {
        mem::discriminant(&self.current_token) == mem::discriminant(token)
    }

    fn expect(&mut self, expected: Token) -> Result<(), ParseError> {
        if !self.check(&expected) {
            return Err(self.unexpected(&format!("{:?}", expected)));
        }
        self.advance()
    }

    pub(crate) fn unexpected(&self, expected: &str) -> ParseError {
        ParseError::UnexpectedToken {
            expected: expected.to_string(),
            found: format!("{:?}", self.current_token),
            position: self.token_start,
        }
    }

    /// Parses a single value and requires the input to end after it.
    pub fn parse(&mut self) -> Result<Value, ParseError> {
        let value = self.parse_value()?;
        if !self.check(&Token::Eof) {
            return Err(self.unexpected("end of input"));
        }
        Ok(value)
    }

    fn parse_value(&mut self) -> Result<Value, ParseError> {
        let position = self.token_start;
        match mem::replace(&mut self.current_token, Token::Eof) {
            Token::Null => {
                self.advance()?;
                Ok(Value::Null)
            }
            Token::Boolean(b) => {
                self.advance()?;
                Ok(Value::Boolean(b))
            }
            Token::Integer(n) => {
                self.advance()?;
                Ok(Value::Integer(n))
            }
            Token::Float(n) => {
                self.advance()?;
                Ok(Value::Float(n))
            }
            Token::String(s) => {
                self.advance()?;
                Ok(Value::String(s))
            }
            Token::Regex { source, flags } => {
                self.advance()?;
                Ok(Value::Regex(Pattern::new(&source, &flags)?))
            }
            Token::LBrace => {
                self.advance()?;
                self.parse_object()
            }
            Token::LBracket => {
                self.advance()?;
                self.parse_array()
            }
            Token::Identifier(name) => {
                self.advance()?;
                self.parse_constructor(name, position)
            }
            token => {
                self.current_token = token;
                Err(self.unexpected("a value"))
            }
        }
    }

    fn parse_object(&mut self) -> Result<Value, ParseError> {
        let mut map = Map::new();

        while !self.check(&Token::RBrace) {
            let key = match &self.current_token {
                Token::String(s) | Token::Identifier(s) => s.clone(),
                _ => return Err(self.unexpected("an object key")),
            };
            self.advance()?;
            self.expect(Token::Colon)?;

            let value = self.parse_value()?;
            map.insert(key, value);

            if !self.check(&Token::RBrace) {
                self.expect(Token::Comma)?;
            }
        }

        self.expect(Token::RBrace)?;
        Ok(Value::Object(map))
    }

    fn parse_array(&mut self) -> Result<Value, ParseError> {
        let mut elements = vec![];

        while !self.check(&Token::RBracket) {
            elements.push(self.parse_value()?);

            if !self.check(&Token::RBracket) {
                self.expect(Token::Comma)?;
            }
        }

        self.expect(Token::RBracket)?;
        Ok(Value::Array(elements))
    }

    /// Bare words in value position: `NaN`, `Infinity` and the pseudo
    /// constructors. The identifier is already consumed.
    fn parse_constructor(&mut self, name: String, position: usize) -> Result<Value, ParseError> {
        match name.as_str() {
            "NaN" => return Ok(Value::Float(f64::NAN)),
            "Infinity" => return Ok(Value::Float(f64::INFINITY)),
            "new" => {
                return match &self.current_token {
                    Token::Identifier(next) if next == "Date" || next == "ISODate" => {
                        let next = next.clone();
                        self.advance()?;
                        self.parse_constructor(next, position)
                    }
                    _ => Err(self.unexpected("Date after 'new'")),
                };
            }
            _ => {}
        }

        self.expect(Token::LParen)?;
        let argument = if self.check(&Token::RParen) {
            None
        } else {
            Some(self.parse_value()?)
        };
        self.expect(Token::RParen)?;

        match (name.as_str(), argument) {
            ("ISODate" | "Date", None) => Ok(Value::Date(Utc::now())),
            ("ISODate" | "Date", Some(Value::String(text))) => parse_date(&text).map(Value::Date),
            ("ISODate" | "Date", Some(Value::Integer(millis))) => DateTime::from_timestamp_millis(millis)
                .map(Value::Date)
                .ok_or_else(|| ParseError::InvalidDate(millis.to_string())),
            ("ISODate" | "Date", Some(other)) => Err(ParseError::InvalidDate(other.to_string())),
            ("ObjectId", Some(Value::String(hex)))
                if hex.len() == 24 && hex.bytes().all(|b| b.is_ascii_hexdigit()) =>
            {
                Ok(Value::String(hex))
            }
            ("ObjectId", argument) => Err(ParseError::InvalidObjectId(
                argument.map(|a| a.to_string()).unwrap_or_default(),
            )),
            _ => Err(ParseError::UnknownConstructor {
                name: name.clone(),
                position,
            }),
        }
    }
}

/// RFC 3339, or a bare `YYYY-MM-DD` / `YYYY-MM-DDTHH:MM:SS[.fff]` taken as UTC.
fn parse_date(text: &str) -> Result<DateTime<Utc>, ParseError> {
    if let Ok(date) = DateTime::parse_from_rfc3339(text) {
        return Ok(date.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(naive.and_utc());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ParseError::InvalidDate(text.to_string()))
}

/// Parses a complete value in tolerant notation.
///
/// # Examples
///
/// ```
/// use querydiff::{parse, Value};
///
/// let query = parse("{name: /^al/i, born: {$lt: ISODate('2000-01-01')}}").unwrap();
/// assert!(matches!(query.as_object().unwrap()["name"], Value::Regex(_)));
/// ```
pub fn parse(input: &str) -> Result<Value, ParseError> {
    Parser::new(Lexer::new(input))?.parse()
}
