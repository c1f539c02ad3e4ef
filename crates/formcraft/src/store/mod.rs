//! Storage backends for saved forms
//!
//! Forms live under a single key of a flat key-value store as one JSON
//! array. Every mutation reads the whole list, changes it and writes the
//! whole list back.

use crate::error::StoreError;

pub mod filesystem;
pub mod memory;
pub mod repository;

pub use filesystem::FileStore;
pub use memory::MemoryStore;
pub use repository::{FormRepository, KvFormRepository, FORMS_KEY};

/// Trait for key-value storage backends
pub trait KeyValueStore {
    /// Get the raw value stored under a key
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the value stored under a key
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete a key. Deleting a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Get storage backend name
    fn name(&self) -> &'static str;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
