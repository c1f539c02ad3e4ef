pub mod delete;
pub mod list;
pub mod new;
pub mod preview;
pub mod show;

use anyhow::{Context as _, Result};
use formcraft::{Config, FileStore, KvFormRepository};

/// What every command needs: settings and the form repository
pub struct Context {
    pub config: Config,
    pub repo: KvFormRepository<FileStore>,
}

impl Context {
    pub fn new(config: Config) -> Result<Self> {
        let store = FileStore::new(&config.store.dir).with_context(|| {
            format!("Failed to open store at {}", config.store.dir.display())
        })?;
        let repo = KvFormRepository::with_key(store, config.store.key.clone());

        Ok(Self { config, repo })
    }
}
