// File: src/forms_list.rs
// Purpose: Saved forms listing with delete and open-for-preview

use crate::error::StoreError;
use crate::model::FormSchema;
use crate::store::FormRepository;
use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use std::fmt;
use tracing::info;

/// One line of the saved forms list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSummary {
    pub id: String,
    pub name: String,
    pub field_count: usize,
    pub created_at: DateTime<Utc>,
}

impl FormSummary {
    /// Creation time in the local timezone
    pub fn created_display(&self) -> String {
        self.created_at
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M")
            .to_string()
    }
}

impl From<&FormSchema> for FormSummary {
    fn from(form: &FormSchema) -> Self {
        Self {
            id: form.id.clone(),
            name: form.name.clone(),
            field_count: form.fields.len(),
            created_at: form.created_at,
        }
    }
}

impl fmt::Display for FormSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plural = if self.field_count == 1 { "" } else { "s" };
        write!(
            f,
            "{}  ({} field{}, created {})  [{}]",
            self.name,
            self.field_count,
            plural,
            self.created_display(),
            self.id
        )
    }
}

/// In-memory copy of the saved forms
#[derive(Debug, Clone, Default)]
pub struct FormsList {
    forms: Vec<FormSchema>,
}

impl FormsList {
    pub fn load(repo: &impl FormRepository) -> Self {
        Self { forms: repo.load() }
    }

    pub fn forms(&self) -> &[FormSchema] {
        &self.forms
    }

    pub fn len(&self) -> usize {
        self.forms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }

    pub fn entries(&self) -> Vec<FormSummary> {
        self.forms.iter().map(FormSummary::from).collect()
    }

    /// The form to preview, if it is in the list
    pub fn open(&self, id: &str) -> Option<&FormSchema> {
        self.forms.iter().find(|form| form.id == id)
    }

    /// Remove a form from this list and write the remaining list back.
    /// Returns false, without writing, when the id is not in the list.
    pub fn delete(&mut self, repo: &impl FormRepository, id: &str) -> Result<bool, StoreError> {
        let Some(index) = self.forms.iter().position(|form| form.id == id) else {
            return Ok(false);
        };

        let mut remaining = self.forms.clone();
        let removed = remaining.remove(index);
        repo.save_all(&remaining)?;
        self.forms = remaining;

        info!(form_id = %removed.id, name = %removed.name, "Form deleted");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldConfig, FieldType};
    use crate::store::{KvFormRepository, MemoryStore};
    use pretty_assertions::assert_eq;

    fn form(id: &str, name: &str, fields: usize) -> FormSchema {
        FormSchema {
            id: id.into(),
            name: name.into(),
            created_at: Utc::now(),
            fields: (0..fields)
                .map(|i| FieldConfig::new(format!("f{}", i), FieldType::Text, format!("F{}", i)))
                .collect(),
        }
    }

    #[test]
    fn test_entries_keep_saved_order() {
        let repo = KvFormRepository::new(MemoryStore::new());
        repo.save_all(&[form("1", "B", 1), form("2", "A", 3)]).unwrap();

        let list = FormsList::load(&repo);
        let entries = list.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "B");
        assert_eq!(entries[1].field_count, 3);
        assert!(entries[0].to_string().starts_with("B  (1 field, created "));
    }

    #[test]
    fn test_delete_updates_memory_and_store() {
        let repo = KvFormRepository::new(MemoryStore::new());
        repo.save_all(&[form("1", "One", 1), form("2", "Two", 1), form("3", "Three", 1)])
            .unwrap();

        let mut list = FormsList::load(&repo);
        assert!(list.delete(&repo, "2").unwrap());
        assert!(!list.delete(&repo, "2").unwrap());

        let in_memory: Vec<&str> = list.forms().iter().map(|f| f.id.as_str()).collect();
        assert_eq!(in_memory, vec!["1", "3"]);

        let reloaded: Vec<String> = FormsList::load(&repo).forms().iter().map(|f| f.id.clone()).collect();
        assert_eq!(reloaded, vec!["1", "3"]);
    }

    #[test]
    fn test_open() {
        let list = FormsList {
            forms: vec![form("1", "One", 0)],
        };
        assert_eq!(list.open("1").map(|f| f.name.as_str()), Some("One"));
        assert!(list.open("2").is_none());
    }
}
