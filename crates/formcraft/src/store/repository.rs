//! Form repository over a key-value store

use crate::error::StoreError;
use crate::model::FormSchema;
use crate::store::KeyValueStore;
use tracing::{info, warn};

/// Store key holding the saved forms
pub const FORMS_KEY: &str = "forms";

/// Access to the saved form list.
///
/// `load` never fails: a missing or unreadable list is an empty list.
/// The provided methods read the whole list, change it and write it back.
pub trait FormRepository {
    /// All saved forms, in the order they were saved
    fn load(&self) -> Vec<FormSchema>;

    /// Replace the saved list
    fn save_all(&self, forms: &[FormSchema]) -> Result<(), StoreError>;

    fn find(&self, id: &str) -> Option<FormSchema> {
        self.load().into_iter().find(|form| form.id == id)
    }

    /// Append a form to the saved list
    fn add(&self, form: FormSchema) -> Result<(), StoreError> {
        let mut forms = self.load();
        forms.push(form);
        self.save_all(&forms)
    }

    /// Delete a form by id. Returns false when no form had that id.
    fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let mut forms = self.load();
        let before = forms.len();
        forms.retain(|form| form.id != id);

        if forms.len() == before {
            return Ok(false);
        }

        self.save_all(&forms)?;
        Ok(true)
    }
}

/// Keeps the form list as a JSON array under one store key
#[derive(Debug)]
pub struct KvFormRepository<S> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> KvFormRepository<S> {
    /// Repository using the default `"forms"` key
    pub fn new(store: S) -> Self {
        Self::with_key(store, FORMS_KEY)
    }

    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl<S: KeyValueStore> FormRepository for KvFormRepository<S> {
    fn load(&self) -> Vec<FormSchema> {
        let raw = match self.store.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(backend = self.store.name(), key = %self.key, "Failed to read saved forms: {}", e);
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(forms) => forms,
            Err(e) => {
                warn!(backend = self.store.name(), key = %self.key, "Failed to parse saved forms: {}", e);
                Vec::new()
            }
        }
    }

    fn save_all(&self, forms: &[FormSchema]) -> Result<(), StoreError> {
        let json = serde_json::to_string(forms)?;
        self.store.set(&self.key, &json)?;

        info!(backend = self.store.name(), count = forms.len(), "Saved forms");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldConfig, FieldType};
    use crate::store::MemoryStore;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn form(id: &str, name: &str) -> FormSchema {
        FormSchema {
            id: id.to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
            fields: vec![FieldConfig::new("f", FieldType::Text, "F")],
        }
    }

    #[test]
    fn test_missing_key_loads_empty() {
        let repo = KvFormRepository::new(MemoryStore::new());
        assert!(repo.load().is_empty());
    }

    #[test]
    fn test_corrupt_content_loads_empty() {
        let store = MemoryStore::new();
        store.set(FORMS_KEY, "{not json").unwrap();
        let repo = KvFormRepository::new(&store);
        assert!(repo.load().is_empty());

        store.set(FORMS_KEY, r#"{"id": "not an array"}"#).unwrap();
        assert!(repo.load().is_empty());
    }

    #[test]
    fn test_add_find_delete() {
        let repo = KvFormRepository::new(MemoryStore::new());
        repo.add(form("1", "One")).unwrap();
        repo.add(form("2", "Two")).unwrap();
        repo.add(form("3", "Three")).unwrap();

        assert_eq!(repo.find("2").map(|f| f.name), Some("Two".to_string()));
        assert_eq!(repo.find("9"), None);

        assert!(repo.delete("2").unwrap());
        assert!(!repo.delete("2").unwrap());

        let names: Vec<String> = repo.load().into_iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["One", "Three"]);
    }

    #[test]
    fn test_custom_key() {
        let store = MemoryStore::new();
        let repo = KvFormRepository::with_key(&store, "drafts");
        repo.add(form("1", "One")).unwrap();

        assert!(store.get(FORMS_KEY).unwrap().is_none());
        assert!(store.get("drafts").unwrap().is_some());
    }
}
