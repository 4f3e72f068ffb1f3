//! Error types for the Stencil core.
//!
//! Engine edits fail with `EditError` and leave the draft untouched.
//! Persistence goes through `StoreError`; `SubmitError` joins it with the
//! validation gate in front of submission.

use crate::models::{StepId, StepRole};
use crate::workflow::validator::Violation;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("Invalid variable name: '{0}'")]
    InvalidName(String),

    #[error("A variable named '{0}' already exists")]
    DuplicateName(String),

    #[error("Unknown variable: '{0}'")]
    UnknownVariable(String),

    #[error("Unknown step: {0}")]
    UnknownStep(StepId),

    #[error("Step {0} ({1}) cannot be edited")]
    NotEditable(StepId, StepRole),
}

/// One or more rule violations found before submission.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Template is invalid: {}", summarize(.violations))]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

fn summarize(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("Failed to submit template: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("Missing value for required variable '{0}'")]
    MissingVariable(String),

    #[error("Template has no variable named '{0}'")]
    UnknownVariable(String),
}
