//! Explains why a document does not match a MongoDB-style query.
//!
//! [`evaluate`] walks the query against the document and, instead of a
//! boolean, returns the query pruned down to the clauses that failed. An
//! empty result means the document matches.
//!
//! ```
//! use querydiff::{evaluate, parse, to_notation, Value};
//!
//! let doc = parse("{a: [{a: 1}, {a: 2}]}").unwrap();
//! let query = parse("{a: {$elemMatch: {a: {$gt: 5}}}}").unwrap();
//!
//! let mismatch = evaluate(&doc, query.as_object().unwrap()).unwrap();
//! assert_eq!(to_notation(&Value::Object(mismatch)), r#"{"a":{"$elemMatch":{"a":{"$gt":5}}}}"#);
//! ```

pub mod classify;
pub mod cli;
pub mod convert;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod operators;
pub mod output;
pub mod parser;
pub mod path;
pub mod token;
pub mod value;
pub mod where_clause;

pub use classify::{is_primitive, is_query_expression, looks_like_operator};
pub use convert::to_json;
pub use error::{OperatorViolation, PatternError};
pub use evaluator::{evaluate, matches};
pub use lexer::{LexError, Lexer};
pub use output::{to_notation, to_notation_pretty};
pub use parser::{ParseError, Parser, parse};
pub use token::Token;
pub use value::{Map, Pattern, Predicate, Value};
pub use where_clause::WhereExpr;
