//! Persistence and directory collaborators of the template builder.

use std::future::Future;

use crate::error::StoreError;
use crate::models::{RoleEntry, Template, TemplateId, UserEntry};

pub mod directory_store;
pub mod template_store;

pub use directory_store::DirectoryStore;
pub use template_store::TemplateStore;

/// Accepts a finished template and assigns it an id.
pub trait TemplateSubmitter {
    fn submit(&self, template: &Template) -> impl Future<Output = Result<TemplateId, StoreError>> + Send;
}

/// Source of selectable share targets.
pub trait DirectoryLookup {
    fn search_users(&self, query: &str) -> impl Future<Output = Result<Vec<UserEntry>, StoreError>> + Send;

    fn list_roles(&self) -> impl Future<Output = Result<Vec<RoleEntry>, StoreError>> + Send;
}
