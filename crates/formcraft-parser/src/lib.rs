//! Formcraft formula language
//!
//! A small, sandboxed expression language used by derived form fields.
//! Formulas are parsed once into an AST and evaluated against the live
//! values map of a preview session. The only name in scope is `values`.
//!
//! ```
//! use formcraft_parser::{Formula, Value};
//! use std::collections::BTreeMap;
//!
//! let formula = Formula::parse("values.a + values.b").unwrap();
//! let mut values = BTreeMap::new();
//! values.insert("a".to_string(), Value::Number(1.0));
//! values.insert("b".to_string(), Value::Number(2.0));
//!
//! assert_eq!(formula.eval(&values).unwrap(), Value::Number(3.0));
//! ```

pub mod ast;
pub mod error;
pub mod expression;
pub mod lexer;
pub mod parser;
pub mod value;

pub use ast::{BinaryOp, Expr, UnaryOp};
pub use error::ExprError;
pub use expression::{Formula, VALUES_IDENT};
pub use value::Value;
