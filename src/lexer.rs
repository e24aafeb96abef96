use thiserror::Error;

use crate::token::Token;

/// Errors raised while splitting input into tokens. Positions are character
/// offsets into the input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("unexpected character '{ch}' at position {position}")]
    UnexpectedChar { ch: char, position: usize },

    #[error("unterminated string starting at position {0}")]
    UnterminatedString(usize),

    #[error("invalid escape sequence '\\{ch}' at position {position}")]
    InvalidEscape { ch: char, position: usize },

    #[error("unterminated regex literal starting at position {0}")]
    UnterminatedRegex(usize),

    #[error("invalid number '{text}' at position {position}")]
    InvalidNumber { text: String, position: usize },
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    token_start: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
            token_start: 0,
        }
    }

    /// Offset where the most recently returned token starts.
    pub fn token_start(&self) -> usize {
        self.token_start
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    /// Consumes `ch` if it is next.
    fn eat(&mut self, ch: char) -> bool {
        if self.current_char() == Some(ch) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn is_identifier_start(ch: char) -> bool {
        ch.is_alphabetic() || ch == '_' || ch == '$'
    }

    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_alphanumeric() || ch == '_' || ch == '$' {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    fn read_string(&mut self, quote: char) -> Result<String, LexError> {
        let start = self.position;
        let mut result = String::new();
        self.advance(); // opening quote

        while let Some(ch) = self.current_char() {
            match ch {
                c if c == quote => {
                    self.advance();
                    return Ok(result);
                }
                '\\' => {
                    self.advance();
                    let escaped = self
                        .current_char()
                        .ok_or(LexError::UnterminatedString(start))?;
                    match escaped {
                        'n' => result.push('\n'),
                        't' => result.push('\t'),
                        'r' => result.push('\r'),
                        'b' => result.push('\u{8}'),
                        'f' => result.push('\u{c}'),
                        '"' | '\'' | '\\' | '/' => result.push(escaped),
                        'u' => {
                            result.push(self.read_unicode_escape()?);
                            continue;
                        }
                        other => {
                            return Err(LexError::InvalidEscape {
                                ch: other,
                                position: self.position,
                            });
                        }
                    }
                    self.advance();
                }
                _ => {
                    result.push(ch);
                    self.advance();
                }
            }
        }

        Err(LexError::UnterminatedString(start))
    }

    /// Reads `uXXXX` (the backslash is already consumed).
    fn read_unicode_escape(&mut self) -> Result<char, LexError> {
        let position = self.position;
        let invalid = || LexError::InvalidEscape { ch: 'u', position };
        self.advance(); // 'u'
        let mut code = 0u32;
        for _ in 0..4 {
            let digit = self
                .current_char()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(invalid)?;
            code = code * 16 + digit;
            self.advance();
        }
        char::from_u32(code).ok_or_else(invalid)
    }

    /// Reads `/source/flags` (positioned on the opening slash).
    fn read_regex(&mut self) -> Result<Token, LexError> {
        let start = self.position;
        let mut source = String::new();
        let mut in_class = false;
        self.advance(); // opening slash

        loop {
            let ch = self
                .current_char()
                .ok_or(LexError::UnterminatedRegex(start))?;
            match ch {
                '\n' => return Err(LexError::UnterminatedRegex(start)),
                '/' if !in_class => {
                    self.advance();
                    break;
                }
                '\\' => {
                    self.advance();
                    let escaped = self
                        .current_char()
                        .ok_or(LexError::UnterminatedRegex(start))?;
                    // `\/` only exists to get past the delimiter
                    if escaped != '/' {
                        source.push('\\');
                    }
                    source.push(escaped);
                    self.advance();
                }
                _ => {
                    match ch {
                        '[' => in_class = true,
                        ']' => in_class = false,
                        _ => {}
                    }
                    source.push(ch);
                    self.advance();
                }
            }
        }

        let mut flags = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_ascii_alphabetic() {
                flags.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        Ok(Token::Regex { source, flags })
    }

    fn read_number(&mut self) -> Result<Token, LexError> {
        let start = self.position;
        let mut number = String::new();
        let mut is_float = false;

        if self.eat('-') {
            number.push('-');
        }
        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                number.push(ch);
                self.advance();
            } else if ch == '.'
                && !is_float
                && self.peek_char(1).is_some_and(|c| c.is_ascii_digit())
            {
                is_float = true;
                number.push(ch);
                self.advance();
            } else if (ch == 'e' || ch == 'E') && number.ends_with(|c: char| c.is_ascii_digit()) {
                is_float = true;
                number.push(ch);
                self.advance();
                if let Some(sign @ ('+' | '-')) = self.current_char() {
                    number.push(sign);
                    self.advance();
                }
            } else {
                break;
            }
        }

        let invalid = || LexError::InvalidNumber {
            text: number.clone(),
            position: start,
        };
        if is_float {
            number.parse::<f64>().map(Token::Float).map_err(|_| invalid())
        } else {
            match number.parse::<i64>() {
                Ok(n) => Ok(Token::Integer(n)),
                // Too large for i64: keep it as a float like JSON would
                Err(_) => number.parse::<f64>().map(Token::Float).map_err(|_| invalid()),
            }
        }
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace();
        self.token_start = self.position;

        let Some(ch) = self.current_char() else {
            return Ok(Token::Eof);
        };
        let position = self.position;

        let single = |token: Token, lexer: &mut Lexer| -> Result<Token, LexError> {
            lexer.advance();
            Ok(token)
        };

        match ch {
            '{' => single(Token::LBrace, self),
            '}' => single(Token::RBrace, self),
            '[' => single(Token::LBracket, self),
            ']' => single(Token::RBracket, self),
            '(' => single(Token::LParen, self),
            ')' => single(Token::RParen, self),
            ':' => single(Token::Colon, self),
            ',' => single(Token::Comma, self),
            '.' => single(Token::Dot, self),
            '"' | '\'' => self.read_string(ch).map(Token::String),
            '/' => self.read_regex(),
            '=' => {
                if self.peek_char(1) == Some('=') {
                    self.advance();
                    self.advance();
                    self.eat('=');
                    Ok(Token::EqEq)
                } else {
                    Err(LexError::UnexpectedChar { ch, position })
                }
            }
            '!' => {
                self.advance();
                if self.eat('=') {
                    self.eat('=');
                    Ok(Token::NotEq)
                } else {
                    Ok(Token::Bang)
                }
            }
            '<' => {
                self.advance();
                Ok(if self.eat('=') { Token::LtEq } else { Token::Lt })
            }
            '>' => {
                self.advance();
                Ok(if self.eat('=') { Token::GtEq } else { Token::Gt })
            }
            '&' if self.peek_char(1) == Some('&') => {
                self.position += 2;
                Ok(Token::AndAnd)
            }
            '|' if self.peek_char(1) == Some('|') => {
                self.position += 2;
                Ok(Token::OrOr)
            }
            '-' if self.peek_char(1).is_some_and(|c| c.is_ascii_digit()) => self.read_number(),
            '-' if self.peek_char(1).is_some_and(Self::is_identifier_start) => {
                self.advance();
                match self.read_identifier().as_str() {
                    "Infinity" => Ok(Token::Float(f64::NEG_INFINITY)),
                    "NaN" => Ok(Token::Float(f64::NAN)),
                    _ => Err(LexError::UnexpectedChar { ch, position }),
                }
            }
            c if c.is_ascii_digit() => self.read_number(),
            c if Self::is_identifier_start(c) => {
                let ident = self.read_identifier();
                Ok(match ident.as_str() {
                    "true" => Token::Boolean(true),
                    "false" => Token::Boolean(false),
                    "null" => Token::Null,
                    _ => Token::Identifier(ident),
                })
            }
            _ => Err(LexError::UnexpectedChar { ch, position }),
        }
    }
}
