/// Lexical tokens shared by the notation parser and `$where` expressions.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    /// Floating-point number
    ///
    /// # Examples
    /// ```text
    /// 3.14
    /// -1.5e3
    /// ```
    Float(f64),

    /// Integer
    ///
    /// # Examples
    /// ```text
    /// 42
    /// -10
    /// ```
    Integer(i64),

    /// String literal in single or double quotes, escapes already resolved
    String(String),

    /// Boolean values
    Boolean(bool),

    /// Null value
    Null,

    /// Regular expression literal
    ///
    /// # Examples
    /// ```text
    /// /^ab+c/i
    /// /a\/b/
    /// ```
    Regex { source: String, flags: String },

    /// Bare word: unquoted object key, constructor name or `this`
    ///
    /// May start with `$`, so `$gt` lexes as a single identifier.
    Identifier(String),

    // Punctuation
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Colon,
    Comma,
    Dot,

    // Expression operators
    /// `==` or `===`
    EqEq,
    /// `!=` or `!==`
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    /// `&&`
    AndAnd,
    /// `||`
    OrOr,
    /// `!`
    Bang,

    Eof,
}
