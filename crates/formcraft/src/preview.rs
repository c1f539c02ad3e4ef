// File: src/preview.rs
// Purpose: Preview session state machine: load a saved form, collect input,
// keep derived fields current and validate on submit

use crate::derive::{DerivedFields, Settle};
use crate::error::PreviewError;
use crate::model::{FieldConfig, FieldType, FormSchema, Values};
use crate::store::FormRepository;
use crate::validation::{validate_form, FormErrors};
use crate::widget::{Control, Widget};
use formcraft_parser::Value;
use tracing::{debug, info};

/// Where a session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewStatus {
    Loading,
    Ready,
    /// Terminal: no saved form has the requested id
    NotFound,
}

/// Result of a submit attempt
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Every field passed; carries a snapshot of the values
    Accepted(Values),
    Rejected(FormErrors),
}

impl SubmitOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SubmitOutcome::Accepted(_))
    }
}

/// One preview of one form. Values live only as long as the session.
#[derive(Debug)]
pub struct PreviewSession {
    form_id: String,
    status: PreviewStatus,
    form: Option<FormSchema>,
    derived: DerivedFields,
    values: Values,
    errors: FormErrors,
    max_passes: Option<usize>,
}

impl PreviewSession {
    /// A session waiting to load `form_id`
    pub fn new(form_id: impl Into<String>) -> Self {
        Self {
            form_id: form_id.into(),
            status: PreviewStatus::Loading,
            form: None,
            derived: DerivedFields::default(),
            values: Values::new(),
            errors: FormErrors::new(),
            max_passes: None,
        }
    }

    /// Load `form_id` from the repository
    pub fn open(repo: &impl FormRepository, form_id: impl Into<String>) -> Self {
        let mut session = Self::new(form_id);
        session.load(repo);
        session
    }

    /// A ready session over an in-memory schema, e.g. the builder's draft
    pub fn from_schema(form: FormSchema) -> Self {
        let mut session = Self::new(form.id.clone());
        session.start(form);
        session
    }

    /// Limit derived-field passes per change. `None` or `0` picks the number
    /// of derived fields plus one.
    pub fn with_max_passes(mut self, max_passes: Option<usize>) -> Self {
        self.max_passes = max_passes.filter(|&n| n > 0);
        if self.status == PreviewStatus::Ready {
            self.settle();
        }
        self
    }

    /// Leave `Loading`. Does nothing in any other state.
    pub fn load(&mut self, repo: &impl FormRepository) {
        if self.status != PreviewStatus::Loading {
            return;
        }

        match repo.find(&self.form_id) {
            Some(form) => self.start(form),
            None => {
                info!(form_id = %self.form_id, "Form not found");
                self.status = PreviewStatus::NotFound;
            }
        }
    }

    fn start(&mut self, form: FormSchema) {
        self.values = form
            .fields
            .iter()
            .map(|field| (field.id.clone(), field.initial_value()))
            .collect();
        self.derived = DerivedFields::compile(&form.fields);
        self.errors = FormErrors::new();
        self.form = Some(form);
        self.status = PreviewStatus::Ready;
        self.settle();
    }

    fn settle(&mut self) -> Settle {
        let max_passes = self
            .max_passes
            .unwrap_or_else(|| self.derived.default_max_passes());
        let outcome = self.derived.settle(&mut self.values, max_passes);
        debug!(?outcome, "Derived fields recomputed");
        outcome
    }

    pub fn status(&self) -> PreviewStatus {
        self.status
    }

    pub fn form_id(&self) -> &str {
        &self.form_id
    }

    pub fn form(&self) -> Option<&FormSchema> {
        self.form.as_ref()
    }

    pub fn values(&self) -> &Values {
        &self.values
    }

    pub fn value(&self, field_id: &str) -> Option<&Value> {
        self.values.get(field_id)
    }

    /// Errors from the last submit attempt
    pub fn errors(&self) -> &FormErrors {
        &self.errors
    }

    fn ready_form(&self) -> Result<&FormSchema, PreviewError> {
        match (&self.status, &self.form) {
            (PreviewStatus::Ready, Some(form)) => Ok(form),
            _ => Err(PreviewError::NotReady),
        }
    }

    fn editable_field(&self, field_id: &str) -> Result<&FieldConfig, PreviewError> {
        let field = self
            .ready_form()?
            .field(field_id)
            .ok_or_else(|| PreviewError::UnknownField(field_id.to_string()))?;

        if field.is_read_only() {
            return Err(PreviewError::ReadOnlyField(field_id.to_string()));
        }

        Ok(field)
    }

    /// Store a new value for an editable field and recompute derived fields
    pub fn set_value(&mut self, field_id: &str, value: impl Into<Value>) -> Result<Settle, PreviewError> {
        self.editable_field(field_id)?;
        self.values.insert(field_id.to_string(), value.into());
        Ok(self.settle())
    }

    /// Store raw text typed into a field, converted for the field's type
    pub fn set_input(&mut self, field_id: &str, raw: &str) -> Result<Settle, PreviewError> {
        let field = self.editable_field(field_id)?;
        let value = coerce_input(field, raw)?;
        self.set_value(field_id, value)
    }

    /// Validate every field. The session stays ready either way and nothing
    /// is persisted.
    pub fn submit(&mut self) -> Result<SubmitOutcome, PreviewError> {
        let form = self.ready_form()?;
        self.errors = validate_form(&form.fields, &self.values);

        if self.errors.is_empty() {
            info!(form_id = %self.form_id, "Form submitted");
            Ok(SubmitOutcome::Accepted(self.values.clone()))
        } else {
            debug!(form_id = %self.form_id, errors = self.errors.len(), "Submit rejected");
            Ok(SubmitOutcome::Rejected(self.errors.clone()))
        }
    }

    /// One widget per field, in schema order
    pub fn widgets(&self) -> Vec<Widget> {
        let Some(form) = &self.form else {
            return Vec::new();
        };

        form.fields
            .iter()
            .map(|field| Widget {
                id: field.id.clone(),
                label: field.label.clone(),
                required: field.required,
                control: Control::for_field(field),
                value: self.values.get(&field.id).cloned().unwrap_or_default(),
                error: self.errors.get(&field.id).map(String::from),
            })
            .collect()
    }
}

/// Convert typed text to a value for `field`
fn coerce_input(field: &FieldConfig, raw: &str) -> Result<Value, PreviewError> {
    let invalid = |reason: &str| PreviewError::InvalidInput {
        field: field.id.clone(),
        input: raw.to_string(),
        reason: reason.to_string(),
    };

    match field.field_type {
        FieldType::Number => Ok(match raw.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => Value::Number(n),
            _ => Value::String(raw.to_string()),
        }),
        FieldType::Checkbox => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "on" | "yes" | "1" => Ok(Value::Bool(true)),
            "false" | "off" | "no" | "0" | "" => Ok(Value::Bool(false)),
            _ => Err(invalid("expected true or false")),
        },
        FieldType::Select | FieldType::Radio => {
            if raw.is_empty() || field.options().iter().any(|opt| opt == raw) {
                Ok(Value::String(raw.to_string()))
            } else {
                Err(invalid(&format!("expected one of: {}", field.options().join(", "))))
            }
        }
        _ => Ok(Value::String(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ValidationRule;
    use crate::store::{KvFormRepository, MemoryStore};
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn schema() -> FormSchema {
        FormSchema {
            id: "form-1".into(),
            name: "Order".into(),
            created_at: Utc::now(),
            fields: vec![
                FieldConfig::new("name", FieldType::Text, "Name").required(),
                FieldConfig::new("qty", FieldType::Number, "Quantity").with_default(1),
                FieldConfig::new("price", FieldType::Number, "Price").with_default(2),
                FieldConfig::new("total", FieldType::Derived, "Total")
                    .with_formula("values.qty * values.price", ["qty", "price"]),
                FieldConfig::new("gift", FieldType::Checkbox, "Gift wrap"),
                FieldConfig::new("size", FieldType::Select, "Size").with_options(["S", "M", "L"]),
                FieldConfig::new("email", FieldType::Text, "Email").with_validation(ValidationRule {
                    email: Some(true),
                    ..Default::default()
                }),
            ],
        }
    }

    #[test]
    fn test_open_missing_form_is_terminal() {
        let repo = KvFormRepository::new(MemoryStore::new());
        let mut session = PreviewSession::open(&repo, "nope");

        assert_eq!(session.status(), PreviewStatus::NotFound);
        assert_eq!(session.set_input("name", "x"), Err(PreviewError::NotReady));
        assert_eq!(session.submit(), Err(PreviewError::NotReady));
        assert!(session.widgets().is_empty());

        // Loading again does not leave the terminal state
        repo.add(schema()).unwrap();
        session.load(&repo);
        assert_eq!(session.status(), PreviewStatus::NotFound);
    }

    #[test]
    fn test_initial_values_and_derived() {
        let repo = KvFormRepository::new(MemoryStore::new());
        repo.add(schema()).unwrap();
        let session = PreviewSession::open(&repo, "form-1");

        assert_eq!(session.status(), PreviewStatus::Ready);
        assert_eq!(session.value("name"), Some(&Value::from("")));
        assert_eq!(session.value("gift"), Some(&Value::Bool(false)));
        assert_eq!(session.value("total"), Some(&Value::Number(2.0)));
    }

    #[test]
    fn test_edit_recomputes_derived() {
        let mut session = PreviewSession::from_schema(schema());
        session.set_input("qty", "3").unwrap();
        assert_eq!(session.value("total"), Some(&Value::Number(6.0)));

        session.set_value("price", 2.5).unwrap();
        assert_eq!(session.value("total"), Some(&Value::Number(7.5)));
    }

    #[test]
    fn test_edit_errors() {
        let mut session = PreviewSession::from_schema(schema());
        assert_eq!(
            session.set_input("total", "9"),
            Err(PreviewError::ReadOnlyField("total".into()))
        );
        assert_eq!(
            session.set_input("missing", "9"),
            Err(PreviewError::UnknownField("missing".into()))
        );
        assert!(matches!(
            session.set_input("size", "XL"),
            Err(PreviewError::InvalidInput { .. })
        ));
        assert!(matches!(
            session.set_input("gift", "maybe"),
            Err(PreviewError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_number_input_keeps_unparseable_text() {
        let mut session = PreviewSession::from_schema(schema());
        session.set_input("qty", "lots").unwrap();
        assert_eq!(session.value("qty"), Some(&Value::from("lots")));
        // `"lots" * 2` has no numeric reading, so the total keeps its old value
        assert_eq!(session.value("total"), Some(&Value::Number(2.0)));
    }

    #[test]
    fn test_submit_rejects_then_accepts() {
        let mut session = PreviewSession::from_schema(schema());
        session.set_input("email", "nope").unwrap();

        let SubmitOutcome::Rejected(errors) = session.submit().unwrap() else {
            panic!("expected rejection");
        };
        assert_eq!(errors.get("name"), Some("This field is required"));
        assert_eq!(errors.get("email"), Some("Invalid email address"));
        assert_eq!(session.status(), PreviewStatus::Ready);

        let widgets = session.widgets();
        assert_eq!(widgets[0].error.as_deref(), Some("This field is required"));

        session.set_input("name", "Ada").unwrap();
        session.set_input("email", "ada@example.com").unwrap();
        session.set_input("gift", "on").unwrap();

        let outcome = session.submit().unwrap();
        assert!(outcome.is_accepted());
        if let SubmitOutcome::Accepted(values) = outcome {
            assert_eq!(values["name"], Value::from("Ada"));
            assert_eq!(values["gift"], Value::Bool(true));
        }
        assert!(session.errors().is_empty());
        assert_eq!(session.status(), PreviewStatus::Ready);
    }

    #[test]
    fn test_max_passes_override() {
        let form = FormSchema {
            id: "loop".into(),
            name: "Loop".into(),
            created_at: Utc::now(),
            fields: vec![FieldConfig::new("c", FieldType::Derived, "C").with_formula("values.c * 1 + 1", ["c"])],
        };

        // Never settles: each pass adds one. Default budget is one derived field + 1.
        let session = PreviewSession::from_schema(form);
        assert_eq!(session.value("c"), Some(&Value::Number(2.0)));

        let session = session.with_max_passes(Some(5));
        assert_eq!(session.value("c"), Some(&Value::Number(7.0)));
    }
}
