// File: src/widget.rs
// Purpose: Describe the input control each field renders as

use crate::model::{FieldConfig, FieldType};
use formcraft_parser::Value;
use serde::Serialize;
use std::fmt;

/// The control a field renders as
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "control", rename_all = "camelCase")]
pub enum Control {
    TextInput,
    NumberInput,
    TextArea,
    DateInput,
    Select { options: Vec<String> },
    Radio { options: Vec<String> },
    Checkbox,
    /// Computed fields are shown but cannot be edited
    ReadOnly,
}

impl Control {
    pub fn for_field(field: &FieldConfig) -> Self {
        match field.field_type {
            FieldType::Text => Control::TextInput,
            FieldType::Number => Control::NumberInput,
            FieldType::Textarea => Control::TextArea,
            FieldType::Date => Control::DateInput,
            FieldType::Select => Control::Select {
                options: field.options().to_vec(),
            },
            FieldType::Radio => Control::Radio {
                options: field.options().to_vec(),
            },
            FieldType::Checkbox => Control::Checkbox,
            FieldType::Derived => Control::ReadOnly,
        }
    }
}

/// One rendered field of a preview
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Widget {
    pub id: String,
    pub label: String,
    pub required: bool,
    #[serde(flatten)]
    pub control: Control,
    pub value: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl fmt::Display for Widget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = if self.required { " *" } else { "" };

        match &self.control {
            Control::Checkbox => {
                let checked = if self.value.to_bool() { "x" } else { " " };
                write!(f, "[{}] {}{}", checked, self.label, marker)?;
            }
            Control::Select { options } => {
                write!(f, "{}{} [select: {}]: {}", self.label, marker, options.join(" | "), self.value)?;
            }
            Control::Radio { options } => {
                let current = self.value.to_string();
                let choices: Vec<String> = options
                    .iter()
                    .map(|opt| {
                        let dot = if *opt == current { "*" } else { " " };
                        format!("({}) {}", dot, opt)
                    })
                    .collect();
                write!(f, "{}{}: {}", self.label, marker, choices.join("  "))?;
            }
            Control::TextArea => {
                write!(f, "{}{} [textarea]:", self.label, marker)?;
                for line in self.value.to_string().lines() {
                    write!(f, "\n    | {}", line)?;
                }
            }
            Control::ReadOnly => write!(f, "{} = {}", self.label, self.value)?,
            Control::TextInput => write!(f, "{}{} [text]: {}", self.label, marker, self.value)?,
            Control::NumberInput => write!(f, "{}{} [number]: {}", self.label, marker, self.value)?,
            Control::DateInput => write!(f, "{}{} [date]: {}", self.label, marker, self.value)?,
        }

        if let Some(error) = &self.error {
            write!(f, "\n    ! {}", error)?;
        }

        Ok(())
    }
}
