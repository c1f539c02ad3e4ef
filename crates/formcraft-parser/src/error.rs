// File: src/error.rs
// Purpose: Errors raised while parsing or evaluating a formula

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExprError {
    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("unterminated string literal starting at position {pos}")]
    UnterminatedString { pos: usize },

    #[error("invalid number '{text}' at position {pos}")]
    InvalidNumber { text: String, pos: usize },

    #[error("unexpected {found} at position {pos}")]
    UnexpectedToken { found: String, pos: usize },

    #[error("unexpected end of formula")]
    UnexpectedEnd,

    #[error("formula is empty")]
    Empty,

    #[error("formula nests too deeply at position {pos}")]
    TooDeep { pos: usize },

    #[error("unknown name '{0}' (only `values` is in scope)")]
    UnknownIdentifier(String),

    #[error("cannot use {0} as a number")]
    NotNumeric(&'static str),

    #[error("cannot read property '{property}' of {target}")]
    NotIndexable { property: String, target: &'static str },

    #[error("division by zero")]
    DivisionByZero,

    #[error("result is not a finite number")]
    NonFinite,
}
