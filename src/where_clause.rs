//! String form of `$where`.
//!
//! The string is never executed as host code. It is parsed into a small,
//! side-effect free expression language and evaluated against the document,
//! which is bound to `this` (or `obj`):
//!
//! ```text
//! this.qty > 10 && (this.tags[0] == "a" || !this.archived)
//! ```
//!
//! Supported: field access with `.name`, `["name"]` and `[0]`; number,
//! string, `true`, `false` and `null` literals; `==`/`===`, `!=`/`!==`, `<`,
//! `<=`, `>`, `>=`; `&&`, `||`, `!` and parentheses. Equality is structural;
//! ordering follows [`Value::compare`], so mismatched types compare false. A
//! missing field is only equal to another missing field.

use std::{borrow::Cow, cmp::Ordering};

use crate::{
    lexer::Lexer,
    parser::{ParseError, Parser},
    token::Token,
    value::Value,
};

/// A parsed `$where` expression.
#[derive(Debug, Clone, PartialEq)]
pub struct WhereExpr(Expr);

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Literal(Value),
    Path(Vec<Segment>),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Compare {
        op: CompareOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Field(String),
    Index(usize),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl WhereExpr {
    pub fn parse(source: &str) -> Result<Self, ParseError> {
        let mut parser = ExprParser::new(source)?;
        let expr = parser.parse_or()?;
        if parser.tokens.current_token != Token::Eof {
            return Err(parser.tokens.unexpected("end of expression"));
        }
        Ok(WhereExpr(expr))
    }

    /// Whether the expression is truthy with `this` bound to `document`.
    pub fn holds(&self, document: &Value) -> bool {
        self.0
            .eval(document)
            .is_some_and(|value| value.is_truthy())
    }
}

impl Expr {
    /// `None` stands for a missing field.
    fn eval<'a>(&'a self, this: &'a Value) -> Option<Cow<'a, Value>> {
        match self {
            Expr::Literal(value) => Some(Cow::Borrowed(value)),
            Expr::Path(segments) => segments
                .iter()
                .try_fold(this, |current, segment| match (current, segment) {
                    (Value::Object(map), Segment::Field(name)) => map.get(name),
                    (Value::Object(map), Segment::Index(i)) => map.get(&i.to_string()),
                    (Value::Array(items), Segment::Index(i)) => items.get(*i),
                    _ => None,
                })
                .map(Cow::Borrowed),
            Expr::Not(inner) => Some(boolean(!truthy(inner.eval(this)))),
            Expr::And(left, right) => Some(boolean(
                truthy(left.eval(this)) && truthy(right.eval(this)),
            )),
            Expr::Or(left, right) => Some(boolean(
                truthy(left.eval(this)) || truthy(right.eval(this)),
            )),
            Expr::Compare { op, left, right } => {
                let left = left.eval(this);
                let right = right.eval(this);
                let equal = match (&left, &right) {
                    (Some(l), Some(r)) => l.deep_eq(r),
                    (None, None) => true,
                    _ => false,
                };
                let ordering = match (&left, &right) {
                    (Some(l), Some(r)) => l.compare(r),
                    _ => None,
                };
                Some(boolean(match op {
                    CompareOp::Eq => equal,
                    CompareOp::Ne => !equal,
                    CompareOp::Lt => ordering == Some(Ordering::Less),
                    CompareOp::Le => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
                    CompareOp::Gt => ordering == Some(Ordering::Greater),
                    CompareOp::Ge => {
                        matches!(ordering, Some(Ordering::Greater | Ordering::Equal))
                    }
                }))
            }
        }
    }
}

fn truthy(value: Option<Cow<'_, Value>>) -> bool {
    value.is_some_and(|v| v.is_truthy())
}

fn boolean<'a>(b: bool) -> Cow<'a, Value> {
    Cow::Owned(Value::Boolean(b))
}

/// Expression grammar on top of the notation parser's token cursor.
struct ExprParser {
    tokens: Parser,
}

impl ExprParser {
    fn new(source: &str) -> Result<Self, ParseError> {
        Ok(ExprParser {
            tokens: Parser::new(Lexer::new(source))?,
        })
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_and()?;
        while self.tokens.current_token == Token::OrOr {
            self.tokens.advance()?;
            let right = self.parse_and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;
        while self.tokens.current_token == Token::AndAnd {
            self.tokens.advance()?;
            let right = self.parse_unary()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        if self.tokens.current_token == Token::Bang {
            self.tokens.advance()?;
            let inner = self.parse_unary()?;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let left = self.parse_operand()?;
        let op = match self.tokens.current_token {
            Token::EqEq => CompareOp::Eq,
            Token::NotEq => CompareOp::Ne,
            Token::Lt => CompareOp::Lt,
            Token::LtEq => CompareOp::Le,
            Token::Gt => CompareOp::Gt,
            Token::GtEq => CompareOp::Ge,
            _ => return Ok(left),
        };
        self.tokens.advance()?;
        let right = self.parse_operand()?;
        Ok(Expr::Compare {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn parse_operand(&mut self) -> Result<Expr, ParseError> {
        let literal = match &self.tokens.current_token {
            Token::Integer(n) => Value::Integer(*n),
            Token::Float(n) => Value::Float(*n),
            Token::String(s) => Value::String(s.clone()),
            Token::Boolean(b) => Value::Boolean(*b),
            Token::Null => Value::Null,
            Token::LParen => {
                self.tokens.advance()?;
                let inner = self.parse_or()?;
                if self.tokens.current_token != Token::RParen {
                    return Err(self.tokens.unexpected("')'"));
                }
                self.tokens.advance()?;
                return Ok(inner);
            }
            Token::Identifier(name) if name == "this" || name == "obj" => {
                self.tokens.advance()?;
                return self.parse_path();
            }
            _ => return Err(self.tokens.unexpected("a literal, 'this' or '('")),
        };
        self.tokens.advance()?;
        Ok(Expr::Literal(literal))
    }

    /// Segments after `this`.
    fn parse_path(&mut self) -> Result<Expr, ParseError> {
        let mut segments = Vec::new();
        loop {
            match self.tokens.current_token {
                Token::Dot => {
                    self.tokens.advance()?;
                    let Token::Identifier(name) = &self.tokens.current_token else {
                        return Err(self.tokens.unexpected("a field name"));
                    };
                    segments.push(Segment::Field(name.clone()));
                    self.tokens.advance()?;
                }
                Token::LBracket => {
                    self.tokens.advance()?;
                    let segment = match &self.tokens.current_token {
                        Token::String(name) => Segment::Field(name.clone()),
                        Token::Integer(i) if *i >= 0 => Segment::Index(*i as usize),
                        _ => return Err(self.tokens.unexpected("a string or non-negative index")),
                    };
                    self.tokens.advance()?;
                    if self.tokens.current_token != Token::RBracket {
                        return Err(self.tokens.unexpected("']'"));
                    }
                    self.tokens.advance()?;
                    segments.push(segment);
                }
                _ => return Ok(Expr::Path(segments)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    fn holds(source: &str, document: &str) -> bool {
        WhereExpr::parse(source)
            .unwrap()
            .holds(&parse(document).unwrap())
    }

    #[test]
    fn compares_fields() {
        assert!(holds("this.a > 1", "{a: 2}"));
        assert!(!holds("this.a > 1", "{a: '2'}"));
        assert!(holds("obj.a.b[1] === 'y'", "{a: {b: ['x', 'y']}}"));
        assert!(holds("this['odd key'] == null", "{'odd key': null}"));
    }

    #[test]
    fn missing_fields() {
        assert!(!holds("this.missing", "{}"));
        assert!(holds("!this.missing", "{}"));
        assert!(holds("this.missing == this.other", "{}"));
        assert!(!holds("this.missing == null", "{}"));
    }

    #[test]
    fn logic_and_precedence() {
        assert!(holds("this.a == 1 || this.b == 1 && this.c == 1", "{a: 1, b: 0}"));
        assert!(!holds("(this.a == 1 || this.b == 1) && this.c == 1", "{a: 1, b: 0}"));
        assert!(holds("this", "{}"));
    }

    #[test]
    fn rejects_arbitrary_code() {
        assert!(WhereExpr::parse("this.a = 1").is_err());
        assert!(WhereExpr::parse("process.exit()").is_err());
        assert!(WhereExpr::parse("this.a > ").is_err());
    }

    #[test]
    fn errors_point_at_offending_token() {
        match WhereExpr::parse("this.a > )") {
            Err(ParseError::UnexpectedToken { position, .. }) => assert_eq!(position, 9),
            other => panic!("unexpected result: {:?}", other),
        }
        match WhereExpr::parse("this.a this.b") {
            Err(ParseError::UnexpectedToken { position, .. }) => assert_eq!(position, 7),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
