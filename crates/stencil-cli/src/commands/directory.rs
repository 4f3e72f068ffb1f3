//! `stencil directory` — users and roles templates can be shared with.

use stencil_core::models::{RoleEntry, UserEntry};
use stencil_core::state::AppState;
use stencil_core::store::DirectoryLookup;

use super::print_json;

pub async fn users(state: &AppState, query: &str) -> Result<(), String> {
    let users = state
        .directory_store
        .search_users(query)
        .await
        .map_err(|e| e.to_string())?;
    print_json(&serde_json::json!({ "users": users }));
    Ok(())
}

pub async fn roles(state: &AppState) -> Result<(), String> {
    let roles = state
        .directory_store
        .list_roles()
        .await
        .map_err(|e| e.to_string())?;
    print_json(&serde_json::json!({ "roles": roles }));
    Ok(())
}

pub async fn add_user(state: &AppState, id: &str, email: &str) -> Result<(), String> {
    let user = UserEntry {
        id: id.to_string(),
        email: email.to_string(),
    };
    state
        .directory_store
        .upsert_user(&user)
        .await
        .map_err(|e| e.to_string())?;
    println!("✅ User {} <{}> saved", id, email);
    Ok(())
}

pub async fn add_role(state: &AppState, id: &str, name: &str) -> Result<(), String> {
    let role = RoleEntry {
        id: id.to_string(),
        name: name.to_string(),
    };
    state
        .directory_store
        .upsert_role(&role)
        .await
        .map_err(|e| e.to_string())?;
    println!("✅ Role {} ({}) saved", name, id);
    Ok(())
}
