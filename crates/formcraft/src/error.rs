// File: src/error.rs
// Purpose: Error types for schemas, the field editor, the store and previews

use formcraft_parser::ExprError;
use std::path::PathBuf;
use thiserror::Error;

/// A schema breaks one of its structural invariants
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("field id '{0}' is used more than once")]
    DuplicateFieldId(String),

    #[error("field '{0}' needs at least one option")]
    MissingOptions(String),

    #[error("field '{0}' has a formula but is not a derived field")]
    StrayFormula(String),
}

/// A field definition could not be built
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    #[error("field label must not be empty")]
    EmptyLabel,

    #[error("{0} fields need at least one option")]
    MissingOptions(String),

    #[error("derived fields need a formula")]
    MissingFormula,

    #[error("invalid formula: {0}")]
    InvalidFormula(#[from] ExprError),

    #[error("unknown field setting '{0}'")]
    UnknownKey(String),

    #[error("field setting '{0}' needs a value")]
    MissingValue(String),

    #[error("invalid value '{value}' for '{key}': {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

/// Reading or writing the backing store failed
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access store file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize forms")]
    Serialize(#[from] serde_json::Error),
}

/// The builder refused an operation
#[derive(Debug, Error)]
pub enum BuilderError {
    #[error("form name must not be empty")]
    EmptyName,

    #[error("form needs at least one field")]
    NoFields,

    #[error("a field with id '{0}' already exists")]
    DuplicateFieldId(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A preview session operation failed
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PreviewError {
    #[error("form is not loaded")]
    NotReady,

    #[error("form has no field '{0}'")]
    UnknownField(String),

    #[error("field '{0}' is computed and cannot be edited")]
    ReadOnlyField(String),

    #[error("invalid input '{input}' for field '{field}': {reason}")]
    InvalidInput {
        field: String,
        input: String,
        reason: String,
    },
}
