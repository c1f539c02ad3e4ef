//! Formcraft Validation Core
//!
//! Pure string validators shared by the form preview and the builder.
//! Each function inspects a single value; there are no cross-field rules.

pub mod email;
pub mod password;
pub mod string;

pub use email::*;
pub use password::*;
pub use string::*;

/// Message shown when a required field is left empty
pub const REQUIRED_MESSAGE: &str = "This field is required";
