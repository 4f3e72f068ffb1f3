//! `stencil template` — browse, render and delete stored templates.

use std::collections::HashMap;

use stencil_core::state::AppState;
use stencil_core::workflow::render::render as render_steps;

use super::{parse_key_value, print_json};

pub async fn list(state: &AppState) -> Result<(), String> {
    let records = state
        .template_store
        .list()
        .await
        .map_err(|e| e.to_string())?;
    if records.is_empty() {
        println!("No templates stored yet");
        return Ok(());
    }
    for r in &records {
        println!(
            "{}  {:<32}  {:<8}  {} step(s), {} variable(s)",
            r.id,
            truncate(&r.template.name, 32),
            r.template.visibility,
            r.template.steps.len(),
            r.template.variables.len()
        );
    }
    Ok(())
}

pub async fn show(state: &AppState, id: &str) -> Result<(), String> {
    let record = state
        .template_store
        .get(id)
        .await
        .map_err(|e| e.to_string())?;
    let value = serde_json::to_value(&record)
        .map_err(|e| format!("Failed to serialize template: {}", e))?;
    print_json(&value);
    Ok(())
}

pub async fn delete(state: &AppState, id: &str) -> Result<(), String> {
    state
        .template_store
        .delete(id)
        .await
        .map_err(|e| e.to_string())?;
    println!("🗑  Template {} deleted", id);
    Ok(())
}

/// Print each user step of a stored template with `vars` (`key=value`)
/// substituted for its placeholders.
pub async fn render(state: &AppState, id: &str, vars: &[String]) -> Result<(), String> {
    let values = vars
        .iter()
        .map(|kv| parse_key_value(kv))
        .collect::<Result<HashMap<_, _>, _>>()?;
    let record = state
        .template_store
        .get(id)
        .await
        .map_err(|e| e.to_string())?;

    let steps = render_steps(&record.template, &values).map_err(|e| e.to_string())?;
    for step in steps {
        println!("── Step {} ──", step.step_id);
        println!("{}", step.text);
        println!();
    }
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", truncated)
    }
}
