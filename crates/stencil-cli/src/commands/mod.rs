//! CLI command implementations.
//!
//! Each submodule corresponds to a top-level CLI command and reuses
//! the stencil-core domain logic.

pub mod directory;
pub mod draft;
pub mod template;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use stencil_core::models::{AccessRights, ShareGrant, Template};
use stencil_core::state::AppState;
use stencil_core::TemplateBuilder;

/// Default database location: `~/.stencil/stencil.db`, or `stencil.db` in
/// the working directory when there is no home directory.
pub fn default_db_path() -> String {
    dirs::home_dir()
        .map(|home| home.join(".stencil").join("stencil.db"))
        .unwrap_or_else(|| PathBuf::from("stencil.db"))
        .to_string_lossy()
        .to_string()
}

/// Open the SQLite database and build a shared `AppState`.
pub fn init_state(db_path: &str) -> Result<AppState, String> {
    let db = stencil_core::Database::open(db_path)
        .map_err(|e| format!("Failed to open database '{}': {}", db_path, e))?;
    Ok(Arc::new(stencil_core::AppStateInner::new(db)))
}

/// Pretty-print a JSON value to stdout.
pub fn print_json(value: &serde_json::Value) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
    );
}

/// Whether a file should be read and written as YAML (by extension).
pub fn is_yaml(path: &str) -> bool {
    matches!(
        Path::new(path).extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

fn read_file(path: &str) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|e| format!("Failed to read '{}': {}", path, e))
}

/// Load a draft file and resume its editing session.
pub fn load_draft(path: &str) -> Result<TemplateBuilder, String> {
    let template = Template::parse(&read_file(path)?, is_yaml(path))?;
    Ok(TemplateBuilder::restore(template))
}

/// Write the current session state back to its draft file.
pub fn save_draft(path: &str, builder: &TemplateBuilder) -> Result<(), String> {
    let text = builder.build().to_text(is_yaml(path))?;
    std::fs::write(path, text).map_err(|e| format!("Failed to write '{}': {}", path, e))?;
    tracing::debug!("[Draft] saved '{}'", path);
    Ok(())
}

/// Parse a share target of the form `id` or `id:read` / `id:write`.
///
/// Only a trailing `read` or `write` is taken as the rights suffix; any
/// other colon belongs to the id.
pub fn parse_grant(s: &str) -> Result<ShareGrant, String> {
    let (id, rights) = s
        .rsplit_once(':')
        .and_then(|(id, suffix)| suffix.parse::<AccessRights>().ok().map(|r| (id, r)))
        .unwrap_or((s, AccessRights::Read));
    if id.trim().is_empty() {
        return Err(format!("Invalid share target: '{}'", s));
    }
    Ok(ShareGrant::new(id.trim(), rights))
}

/// Parse a `key=value` pair.
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("Expected KEY=VALUE, got '{}'", s))
}
