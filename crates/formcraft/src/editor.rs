// File: src/editor.rs
// Purpose: Construct one field definition from user-supplied settings

use crate::error::FieldError;
use crate::model::{FieldConfig, FieldType, ValidationRule};
use formcraft_parser::{Formula, Value};
use std::str::FromStr;
use uuid::Uuid;

/// An unfinished field definition
///
/// Parses from `key=value;key=value;flag`, e.g.
/// `label=Total;type=derived;formula=values.a + values.b`.
///
/// Keys: `id`, `label`, `type`, `required`, `options` (`a|b|c`), `formula`,
/// `from` (`a|b`), `default`, `min`, `max`, `email`, `password`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldDraft {
    pub id: Option<String>,
    pub label: String,
    pub field_type: FieldType,
    pub required: bool,
    pub options: Vec<String>,
    pub formula: Option<String>,
    pub derived_from: Vec<String>,
    pub default_value: Option<String>,
    pub validation: ValidationRule,
}

impl FieldDraft {
    pub fn new(label: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            label: label.into(),
            field_type,
            ..Default::default()
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn formula(mut self, formula: impl Into<String>) -> Self {
        self.formula = Some(formula.into());
        self
    }

    /// Finish the field.
    ///
    /// A field id is generated when none was given. When a formula is set
    /// without `from`, the ids it reads become `derivedFrom`.
    pub fn build(self) -> Result<FieldConfig, FieldError> {
        let label = self.label.trim().to_string();
        if label.is_empty() {
            return Err(FieldError::EmptyLabel);
        }

        if self.field_type.needs_options() && self.options.is_empty() {
            return Err(FieldError::MissingOptions(self.field_type.to_string()));
        }

        let formula = self.formula.filter(|f| !f.trim().is_empty());
        if self.field_type == FieldType::Derived && formula.is_none() {
            return Err(FieldError::MissingFormula);
        }

        let derived_from = match &formula {
            Some(source) => {
                let parsed = Formula::parse(source)?;
                if self.derived_from.is_empty() {
                    Some(parsed.references())
                } else {
                    Some(self.derived_from)
                }
            }
            None => None,
        };

        let default_value = self
            .default_value
            .map(|raw| coerce_default(self.field_type, &raw))
            .transpose()?;

        Ok(FieldConfig {
            id: self.id.unwrap_or_else(|| Uuid::new_v4().simple().to_string()),
            field_type: self.field_type,
            label,
            required: self.required,
            default_value,
            validation: (!self.validation.is_empty()).then_some(self.validation),
            options: (!self.options.is_empty()).then_some(self.options),
            derived_from,
            formula,
        })
    }
}

fn coerce_default(field_type: FieldType, raw: &str) -> Result<Value, FieldError> {
    let invalid = |reason: &str| FieldError::InvalidValue {
        key: "default".to_string(),
        value: raw.to_string(),
        reason: reason.to_string(),
    };

    match field_type {
        FieldType::Number => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(Value::Number)
            .ok_or_else(|| invalid("expected a number")),
        FieldType::Checkbox => parse_bool(raw)
            .map(Value::Bool)
            .ok_or_else(|| invalid("expected true or false")),
        _ => Ok(Value::String(raw.to_string())),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split('|')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

impl FromStr for FieldDraft {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut draft = FieldDraft::default();

        for part in s.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = match part.split_once('=') {
                Some((key, value)) => (key.trim(), Some(value.trim())),
                None => (part, None),
            };

            let need = |value: Option<&str>| {
                value
                    .filter(|v| !v.is_empty())
                    .map(String::from)
                    .ok_or_else(|| FieldError::MissingValue(key.to_string()))
            };
            let flag = |value: Option<&str>| match value {
                None => Ok(true),
                Some(raw) => parse_bool(raw).ok_or_else(|| FieldError::InvalidValue {
                    key: key.to_string(),
                    value: raw.to_string(),
                    reason: "expected true or false".to_string(),
                }),
            };
            let length = |value: Option<&str>| {
                let raw = need(value)?;
                raw.parse::<usize>().map_err(|_| FieldError::InvalidValue {
                    key: key.to_string(),
                    value: raw.clone(),
                    reason: "expected a whole number".to_string(),
                })
            };

            match key {
                "id" => draft.id = Some(need(value)?),
                "label" => draft.label = need(value)?,
                "type" => {
                    let raw = need(value)?;
                    draft.field_type = raw.parse().map_err(|reason| FieldError::InvalidValue {
                        key: key.to_string(),
                        value: raw.clone(),
                        reason,
                    })?;
                }
                "required" => draft.required = flag(value)?,
                "options" => draft.options = split_list(&need(value)?),
                "formula" => draft.formula = Some(need(value)?),
                "from" => draft.derived_from = split_list(&need(value)?),
                "default" => draft.default_value = Some(value.unwrap_or_default().to_string()),
                "min" => draft.validation.min_length = Some(length(value)?),
                "max" => draft.validation.max_length = Some(length(value)?),
                "email" => draft.validation.email = Some(flag(value)?),
                "password" => draft.validation.password_rule = Some(flag(value)?),
                other => return Err(FieldError::UnknownKey(other.to_string())),
            }
        }

        Ok(draft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_simple_field() {
        let draft: FieldDraft = "label=Name;type=text;required".parse().unwrap();
        assert_eq!(draft.label, "Name");
        assert_eq!(draft.field_type, FieldType::Text);
        assert!(draft.required);

        let field = draft.build().unwrap();
        assert_eq!(field.id.len(), 32);
        assert!(field.validation.is_none());
        assert!(field.options.is_none());
    }

    #[test]
    fn test_parse_validation_settings() {
        let field = "id=pw;label=Password;min=8;max=64;password"
            .parse::<FieldDraft>()
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(field.id, "pw");
        assert_eq!(
            field.validation,
            Some(ValidationRule {
                min_length: Some(8),
                max_length: Some(64),
                password_rule: Some(true),
                ..Default::default()
            })
        );
    }

    #[test]
    fn test_formula_may_contain_equals() {
        let draft: FieldDraft = "label=Adult;type=derived;formula=values.age >= 18 == true"
            .parse()
            .unwrap();
        assert_eq!(draft.formula.as_deref(), Some("values.age >= 18 == true"));
    }

    #[test]
    fn test_derived_from_inferred_from_formula() {
        let field = FieldDraft::new("Sum", FieldType::Derived)
            .formula("values.a + values.b")
            .build()
            .unwrap();
        assert_eq!(field.derived_from, Some(vec!["a".to_string(), "b".to_string()]));
        assert!(field.is_computed());
    }

    #[test]
    fn test_choice_fields_need_options() {
        let err = FieldDraft::new("Color", FieldType::Select).build().unwrap_err();
        assert_eq!(err, FieldError::MissingOptions("select".into()));

        let field = "label=Color;type=radio;options=red | green|"
            .parse::<FieldDraft>()
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(field.options, Some(vec!["red".to_string(), "green".to_string()]));
    }

    #[test]
    fn test_build_errors() {
        assert_eq!(FieldDraft::new("  ", FieldType::Text).build(), Err(FieldError::EmptyLabel));
        assert_eq!(
            FieldDraft::new("X", FieldType::Derived).build(),
            Err(FieldError::MissingFormula)
        );
        assert!(matches!(
            FieldDraft::new("X", FieldType::Derived).formula("values.a +").build(),
            Err(FieldError::InvalidFormula(_))
        ));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            "label=A;colour=red".parse::<FieldDraft>(),
            Err(FieldError::UnknownKey("colour".into()))
        );
        assert_eq!(
            "label".parse::<FieldDraft>(),
            Err(FieldError::MissingValue("label".into()))
        );
        assert!(matches!(
            "label=A;type=slider".parse::<FieldDraft>(),
            Err(FieldError::InvalidValue { .. })
        ));
        assert!(matches!(
            "label=A;min=-1".parse::<FieldDraft>(),
            Err(FieldError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_default_values_follow_type() {
        let number = "label=N;type=number;default=2.5".parse::<FieldDraft>().unwrap().build().unwrap();
        assert_eq!(number.default_value, Some(Value::Number(2.5)));

        let checkbox = "label=C;type=checkbox;default=yes".parse::<FieldDraft>().unwrap().build().unwrap();
        assert_eq!(checkbox.default_value, Some(Value::Bool(true)));

        let bad = "label=N;type=number;default=abc".parse::<FieldDraft>().unwrap().build();
        assert!(matches!(bad, Err(FieldError::InvalidValue { .. })));
    }
}
