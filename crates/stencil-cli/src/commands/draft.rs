//! `stencil draft` — build a template from a recorded conversation.
//!
//! A draft is the template's JSON/YAML form on disk. Every command loads it,
//! applies one edit through the core builder and writes it back, so the
//! variable list always matches the placeholders in the step text.

use stencil_core::models::{ShareGrant, StepId, TranscriptTurn, VariablePatch, Visibility};
use stencil_core::state::AppState;
use stencil_core::{SubmitError, TemplateBuilder};

use super::{is_yaml, load_draft, print_json, read_file, save_draft};

/// Import a transcript file and write a new draft.
pub fn init(
    transcript_file: &str,
    output: &str,
    name: Option<&str>,
    description: Option<&str>,
) -> Result<(), String> {
    let turns = TranscriptTurn::parse_list(&read_file(transcript_file)?, is_yaml(transcript_file))?;
    let mut builder = TemplateBuilder::from_transcript(turns);
    if let Some(name) = name {
        builder.set_name(name);
    }
    builder.set_description(description.map(str::to_string));
    save_draft(output, &builder)?;

    println!("📄 Draft written to {}", output);
    println!(
        "   {} step(s), {} variable(s)",
        builder.steps().len(),
        builder.registry().len()
    );
    for var in builder.registry().variables() {
        println!("   • {{{}}}", var.name);
    }
    Ok(())
}

/// Print the draft as JSON.
pub fn show(path: &str) -> Result<(), String> {
    let builder = load_draft(path)?;
    let value = serde_json::to_value(builder.build())
        .map_err(|e| format!("Failed to serialize draft: {}", e))?;
    print_json(&value);
    Ok(())
}

/// Replace the text of a user step.
pub fn edit(path: &str, step: StepId, content: &str) -> Result<(), String> {
    let mut builder = load_draft(path)?;
    let before = builder.registry().names();
    builder.edit_step(step, content).map_err(|e| e.to_string())?;
    save_draft(path, &builder)?;

    let after = builder.registry().names();
    for added in after.iter().filter(|n| !before.contains(*n)) {
        println!("   + {{{}}}", added);
    }
    for removed in before.iter().filter(|n| !after.contains(*n)) {
        println!("   - {{{}}}", removed);
    }
    println!("✅ Step {} updated", step);
    Ok(())
}

pub fn rename(path: &str, old_name: &str, new_name: &str) -> Result<(), String> {
    let mut builder = load_draft(path)?;
    builder
        .rename_variable(old_name, new_name)
        .map_err(|e| e.to_string())?;
    save_draft(path, &builder)?;
    println!("✅ Renamed {{{}}} to {{{}}}", old_name, new_name);
    Ok(())
}

pub fn delete_var(path: &str, name: &str) -> Result<(), String> {
    let mut builder = load_draft(path)?;
    if !builder.delete_variable(name) {
        println!("Variable '{}' not found; nothing to delete", name);
        return Ok(());
    }
    save_draft(path, &builder)?;
    println!("🗑  Deleted {{{}}} and removed it from every step", name);
    Ok(())
}

/// Update a variable's description, required flag or default value.
pub fn set_var(path: &str, name: &str, patch: VariablePatch) -> Result<(), String> {
    let mut builder = load_draft(path)?;
    let var = builder
        .update_variable(name, patch)
        .map_err(|e| e.to_string())?
        .clone();
    save_draft(path, &builder)?;
    let value =
        serde_json::to_value(&var).map_err(|e| format!("Failed to serialize variable: {}", e))?;
    print_json(&value);
    Ok(())
}

/// Metadata changes applied by `stencil draft meta`.
#[derive(Debug, Default)]
pub struct MetaUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub visibility: Option<Visibility>,
    pub share_users: Vec<ShareGrant>,
    pub share_roles: Vec<ShareGrant>,
    pub unshare_users: Vec<String>,
    pub unshare_roles: Vec<String>,
}

impl MetaUpdate {
    /// Warnings for new grants that the resulting visibility will not keep.
    /// Draft files only store the grant list matching their visibility.
    fn discarded_grants(&self, visibility: Visibility) -> Vec<String> {
        let mut warnings = Vec::new();
        if visibility != Visibility::Users {
            warnings.extend(self.share_users.iter().map(|g| {
                format!("user grant '{}' not saved: visibility is {}", g.id, visibility)
            }));
        }
        if visibility != Visibility::Roles {
            warnings.extend(self.share_roles.iter().map(|g| {
                format!("role grant '{}' not saved: visibility is {}", g.id, visibility)
            }));
        }
        warnings
    }
}

pub fn meta(path: &str, update: MetaUpdate) -> Result<(), String> {
    let mut builder = load_draft(path)?;
    let visibility = update.visibility.unwrap_or(builder.visibility());
    for warning in update.discarded_grants(visibility) {
        println!("⚠️  {}", warning);
    }
    if let Some(name) = update.name {
        builder.set_name(name);
    }
    if let Some(description) = update.description {
        builder.set_description(Some(description));
    }
    if let Some(visibility) = update.visibility {
        builder.set_visibility(visibility);
    }
    for grant in update.share_users {
        builder.share_with_user(&grant.id, grant.rights);
    }
    for grant in update.share_roles {
        builder.share_with_role(&grant.id, grant.rights);
    }
    for id in &update.unshare_users {
        builder.unshare_user(id);
    }
    for id in &update.unshare_roles {
        builder.unshare_role(id);
    }
    save_draft(path, &builder)?;

    let t = builder.build();
    println!("✅ Draft '{}' updated", t.name);
    println!("   Visibility: {}", t.visibility);
    match t.visibility {
        Visibility::Users => println!("   Shared with {} user(s)", t.shared_users.len()),
        Visibility::Roles => println!("   Shared with {} role(s)", t.shared_roles.len()),
        _ => {}
    }
    Ok(())
}

/// Check a draft against the submission rules.
pub fn validate(path: &str) -> Result<(), String> {
    let builder = load_draft(path)?;
    let violations = builder.validate();
    if violations.is_empty() {
        println!("✅ Draft '{}' is valid", builder.name());
        println!("   Steps: {}", builder.steps().len());
        println!("   Variables: {}", builder.registry().len());
        return Ok(());
    }
    for v in &violations {
        println!("   ❌ {}", v);
    }
    Err(format!("Draft has {} problem(s)", violations.len()))
}

/// Validate and store the draft, printing the new template id.
pub async fn submit(state: &AppState, path: &str) -> Result<(), String> {
    let builder = load_draft(path)?;
    match builder.submit(&state.template_store).await {
        Ok(id) => {
            println!("🎉 Template '{}' saved", builder.name());
            println!("   id: {}", id);
            Ok(())
        }
        Err(SubmitError::Invalid(e)) => {
            for v in &e.violations {
                println!("   ❌ {}", v);
            }
            Err(e.to_string())
        }
        Err(e) => Err(e.to_string()),
    }
}
