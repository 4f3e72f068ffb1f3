//! Stencil Core — turns recorded conversations into reusable templates.
//!
//! A transcript of user, assistant and tool turns is imported into a step
//! store. `{name}` placeholders in user text become template variables, and
//! the variable registry is kept in sync with the placeholders actually
//! present as steps are edited and variables renamed or deleted. Finished
//! templates are validated and handed to a persistence collaborator; the
//! SQLite-backed stores in `store` are the default ones.

pub mod db;
pub mod error;
pub mod models;
pub mod placeholder;
pub mod state;
pub mod store;
pub mod workflow;

// Convenience re-exports
pub use db::Database;
pub use error::{EditError, RenderError, StoreError, SubmitError, ValidationError};
pub use state::{AppState, AppStateInner};
pub use workflow::TemplateBuilder;
