//! Fill a template's placeholders with concrete values.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::RenderError;
use crate::models::{StepId, Template};
use crate::placeholder;

/// The instruction text of one user step after substitution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedStep {
    pub step_id: StepId,
    pub text: String,
}

/// Render every user step of `template`.
///
/// A variable resolves to its supplied value, then its default value.
/// A required variable with neither is an error; an optional one becomes
/// empty text.
pub fn render(
    template: &Template,
    values: &HashMap<String, String>,
) -> Result<Vec<RenderedStep>, RenderError> {
    if let Some(unknown) = values.keys().find(|k| template.variable(k).is_none()) {
        return Err(RenderError::UnknownVariable(unknown.clone()));
    }

    let mut resolved: HashMap<&str, String> = HashMap::new();
    for var in &template.variables {
        let value = match values.get(&var.name).or(var.default_value.as_ref()) {
            Some(v) => v.clone(),
            None if var.required => return Err(RenderError::MissingVariable(var.name.clone())),
            None => String::new(),
        };
        resolved.insert(var.name.as_str(), value);
    }

    let rendered = template
        .steps
        .iter()
        .filter_map(|step| {
            step.content().map(|content| RenderedStep {
                step_id: step.id,
                text: placeholder::substitute(content, |name| resolved.get(name).cloned()),
            })
        })
        .collect();
    Ok(rendered)
}
