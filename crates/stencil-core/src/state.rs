//! Shared application state for the CLI commands.

use std::sync::Arc;

use crate::db::Database;
use crate::store::{DirectoryStore, TemplateStore};

pub struct AppStateInner {
    pub template_store: TemplateStore,
    pub directory_store: DirectoryStore,
}

pub type AppState = Arc<AppStateInner>;

impl AppStateInner {
    pub fn new(db: Database) -> Self {
        Self {
            template_store: TemplateStore::new(db.clone()),
            directory_store: DirectoryStore::new(db),
        }
    }
}
