//! Submission checks for an assembled template.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::models::{StepId, Template, Visibility};
use crate::placeholder;

/// A rule a template breaks, reported back to the editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    /// The template name is blank.
    EmptyName,
    /// The transcript had no turns.
    NoSteps,
    /// Visibility is `users` but nobody was selected.
    NoSharedUsers,
    /// Visibility is `roles` but no role was selected.
    NoSharedRoles,
    /// A user step contains nothing but placeholders and whitespace.
    #[serde(rename_all = "camelCase")]
    NoInstructionText { step_id: StepId },
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Violation::EmptyName => write!(f, "name must not be empty"),
            Violation::NoSteps => write!(f, "template needs at least one step"),
            Violation::NoSharedUsers => write!(f, "select at least one user to share with"),
            Violation::NoSharedRoles => write!(f, "select at least one role to share with"),
            Violation::NoInstructionText { step_id } => {
                write!(f, "step {} has no text besides placeholders", step_id)
            }
        }
    }
}

/// Every rule violation in `template`, in rule order.
pub fn validate(template: &Template) -> Vec<Violation> {
    let mut violations = Vec::new();

    if template.name.trim().is_empty() {
        violations.push(Violation::EmptyName);
    }
    if template.steps.is_empty() {
        violations.push(Violation::NoSteps);
    }
    match template.visibility {
        Visibility::Users if template.shared_users.is_empty() => {
            violations.push(Violation::NoSharedUsers);
        }
        Visibility::Roles if template.shared_roles.is_empty() => {
            violations.push(Violation::NoSharedRoles);
        }
        _ => {}
    }
    for step in &template.steps {
        if let Some(content) = step.content() {
            if placeholder::strip_placeholders(content).trim().is_empty() {
                violations.push(Violation::NoInstructionText { step_id: step.id });
            }
        }
    }

    violations
}

pub fn is_valid(template: &Template) -> bool {
    validate(template).is_empty()
}

/// `Ok(())` for a valid template, otherwise all violations as one error.
pub fn check(template: &Template) -> Result<(), ValidationError> {
    let violations = validate(template);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { violations })
    }
}
