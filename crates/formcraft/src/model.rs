// File: src/model.rs
// Purpose: Form schema data model and its persisted JSON shape

use crate::error::SchemaError;
use chrono::{DateTime, Utc};
use formcraft_parser::Value;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

/// Live mapping of field id to current value during a preview session
pub type Values = BTreeMap<String, Value>;

/// Kind of input control a field renders as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    Text,
    Number,
    Textarea,
    Select,
    Radio,
    Checkbox,
    Date,
    Derived,
}

impl FieldType {
    pub const ALL: [FieldType; 8] = [
        FieldType::Text,
        FieldType::Number,
        FieldType::Textarea,
        FieldType::Select,
        FieldType::Radio,
        FieldType::Checkbox,
        FieldType::Date,
        FieldType::Derived,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Textarea => "textarea",
            FieldType::Select => "select",
            FieldType::Radio => "radio",
            FieldType::Checkbox => "checkbox",
            FieldType::Date => "date",
            FieldType::Derived => "derived",
        }
    }

    /// Select and radio fields choose from a fixed option list
    pub fn needs_options(self) -> bool {
        matches!(self, FieldType::Select | FieldType::Radio)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let names: Vec<&str> = FieldType::ALL.iter().map(|t| t.as_str()).collect();
                format!("unknown field type '{}' (expected one of {})", s, names.join(", "))
            })
    }
}

/// Per-field validation rules. Every rule applies independently.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_rule: Option<bool>,
}

impl ValidationRule {
    /// True when no rule is set at all
    pub fn is_empty(&self) -> bool {
        self == &ValidationRule::default()
    }
}

/// One field of a form schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldConfig {
    pub id: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub label: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    /// Ids the formula reads. Informational; evaluation does not check it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derived_from: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
}

impl FieldConfig {
    pub fn new(id: impl Into<String>, field_type: FieldType, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            field_type,
            label: label.into(),
            required: false,
            default_value: None,
            validation: None,
            options: None,
            derived_from: None,
            formula: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn with_validation(mut self, rule: ValidationRule) -> Self {
        self.validation = Some(rule);
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = Some(options.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_formula<I, S>(mut self, formula: impl Into<String>, derived_from: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.formula = Some(formula.into());
        self.derived_from = Some(derived_from.into_iter().map(Into::into).collect());
        self
    }

    /// Fields that take part in derived-value recomputation: `derivedFrom`
    /// present (even empty) and a non-empty formula. A whitespace-only
    /// formula counts and computes to the empty string.
    pub fn is_computed(&self) -> bool {
        self.derived_from.is_some() && self.formula.as_deref().is_some_and(|f| !f.is_empty())
    }

    /// Derived fields are shown read-only
    pub fn is_read_only(&self) -> bool {
        self.field_type == FieldType::Derived
    }

    pub fn options(&self) -> &[String] {
        self.options.as_deref().unwrap_or(&[])
    }

    /// Starting value for a preview session
    pub fn initial_value(&self) -> Value {
        match &self.default_value {
            Some(value) => value.clone(),
            None if self.field_type == FieldType::Checkbox => Value::Bool(false),
            None => Value::String(String::new()),
        }
    }
}

/// A named, ordered collection of fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSchema {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub fields: Vec<FieldConfig>,
}

impl FormSchema {
    /// An unsaved schema: no id, no name
    pub fn draft() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            created_at: DateTime::<Utc>::default(),
            fields: Vec::new(),
        }
    }

    pub fn field(&self, id: &str) -> Option<&FieldConfig> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Check structural invariants: unique ids, options for choice fields,
    /// formulas only on derived fields
    pub fn check(&self) -> Result<(), SchemaError> {
        let mut seen = HashSet::new();

        for field in &self.fields {
            if !seen.insert(field.id.as_str()) {
                return Err(SchemaError::DuplicateFieldId(field.id.clone()));
            }
            if field.field_type.needs_options() && field.options().is_empty() {
                return Err(SchemaError::MissingOptions(field.label.clone()));
            }
            if field.formula.is_some()
                && field.field_type != FieldType::Derived
                && field.derived_from.is_none()
            {
                return Err(SchemaError::StrayFormula(field.label.clone()));
            }
        }

        Ok(())
    }
}
