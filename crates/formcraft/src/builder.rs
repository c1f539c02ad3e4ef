// File: src/builder.rs
// Purpose: In-progress form being authored

use crate::error::BuilderError;
use crate::model::{FieldConfig, FormSchema};
use crate::store::FormRepository;
use chrono::{SubsecRound, Utc};
use tracing::info;
use uuid::Uuid;

/// Holds the one unsaved form being built
#[derive(Debug, Clone)]
pub struct BuilderState {
    form: FormSchema,
}

impl Default for BuilderState {
    fn default() -> Self {
        Self::new()
    }
}

impl BuilderState {
    pub fn new() -> Self {
        Self {
            form: FormSchema::draft(),
        }
    }

    /// Replace the whole draft
    pub fn set_form(&mut self, form: FormSchema) {
        self.form = form;
    }

    pub fn form(&self) -> &FormSchema {
        &self.form
    }

    pub fn fields(&self) -> &[FieldConfig] {
        &self.form.fields
    }

    pub fn is_empty(&self) -> bool {
        self.form.fields.is_empty()
    }

    /// Append a field. Field ids must stay unique.
    pub fn add_field(&mut self, field: FieldConfig) -> Result<(), BuilderError> {
        if self.form.field(&field.id).is_some() {
            return Err(BuilderError::DuplicateFieldId(field.id));
        }
        self.form.fields.push(field);
        Ok(())
    }

    /// Remove a field by id
    pub fn remove_field(&mut self, field_id: &str) -> Option<FieldConfig> {
        let index = self.form.fields.iter().position(|f| f.id == field_id)?;
        Some(self.form.fields.remove(index))
    }

    /// Stamp the draft with a fresh id, `name` and the current time, and
    /// start a new empty draft
    pub fn finish(&mut self, name: &str) -> Result<FormSchema, BuilderError> {
        if self.is_empty() {
            return Err(BuilderError::NoFields);
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(BuilderError::EmptyName);
        }
        self.form.check()?;

        let mut form = std::mem::replace(&mut self.form, FormSchema::draft());
        form.id = Uuid::new_v4().to_string();
        form.name = name.to_string();
        form.created_at = Utc::now().trunc_subsecs(3);

        Ok(form)
    }

    /// Finish the draft and append it to the saved forms
    pub fn save(&mut self, name: &str, repo: &impl FormRepository) -> Result<FormSchema, BuilderError> {
        let form = self.finish(name)?;
        if let Err(e) = repo.add(form.clone()) {
            // Keep the user's work
            self.form = FormSchema {
                id: String::new(),
                name: String::new(),
                created_at: Default::default(),
                fields: form.fields,
            };
            return Err(e.into());
        }

        info!(form_id = %form.id, name = %form.name, fields = form.fields.len(), "Form saved");
        Ok(form)
    }
}
