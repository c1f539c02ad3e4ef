// File: src/validation.rs
// Purpose: Validate field values against their rules before submission

use crate::model::{FieldConfig, Values};
use formcraft_parser::Value;
use formcraft_validation::{
    validate_email, validate_max_length, validate_min_length, validate_password, REQUIRED_MESSAGE,
};
use serde::Serialize;
use std::collections::BTreeMap;

/// Missing, null and the empty string count as empty. `false` does not.
pub fn is_empty(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

/// Validate one field's value.
///
/// Checks run in order and the first failure wins:
/// required, min length, max length, email, password.
/// Length and pattern rules only look at string values; any other value
/// passes them.
pub fn validate_field(field: &FieldConfig, value: Option<&Value>) -> Option<String> {
    let rule_requires = field
        .validation
        .as_ref()
        .and_then(|rule| rule.required)
        .unwrap_or(false);

    if (field.required || rule_requires) && is_empty(value) {
        return Some(REQUIRED_MESSAGE.to_string());
    }

    let rule = field.validation.as_ref()?;
    let Some(Value::String(text)) = value else {
        return None;
    };

    let min = rule.min_length.filter(|&n| n > 0);
    let max = rule.max_length.filter(|&n| n > 0);

    min.map(|n| validate_min_length(text, n))
        .into_iter()
        .chain(max.map(|n| validate_max_length(text, n)))
        .chain((rule.email == Some(true)).then(|| validate_email(text)))
        .chain((rule.password_rule == Some(true)).then(|| validate_password(text)))
        .find_map(Result::err)
}

/// Per-field error messages, in field order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(into = "BTreeMap<String, String>")]
pub struct FormErrors {
    errors: Vec<(String, String)>,
}

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field_id: impl Into<String>, message: impl Into<String>) {
        let field_id = field_id.into();
        let message = message.into();
        match self.errors.iter_mut().find(|(id, _)| *id == field_id) {
            Some(entry) => entry.1 = message,
            None => self.errors.push((field_id, message)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Error for a specific field
    pub fn get(&self, field_id: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|(id, _)| id == field_id)
            .map(|(_, message)| message.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors.iter().map(|(id, msg)| (id.as_str(), msg.as_str()))
    }
}

impl From<FormErrors> for BTreeMap<String, String> {
    fn from(errors: FormErrors) -> Self {
        errors.errors.into_iter().collect()
    }
}

/// Validate every field of a form against the current values
pub fn validate_form(fields: &[FieldConfig], values: &Values) -> FormErrors {
    fields
        .iter()
        .filter_map(|field| {
            validate_field(field, values.get(&field.id)).map(|message| (field.id.clone(), message))
        })
        .fold(FormErrors::new(), |mut errors, (id, message)| {
            errors.insert(id, message);
            errors
        })
}
