//! Template builder — one editing session over an imported conversation.
//!
//! Owns the step store, the variable registry and the metadata the user
//! fills in. `build()` is a pure projection of that state; `submit()` gates
//! it through the validator before handing it to a `TemplateSubmitter`.

use crate::error::{EditError, SubmitError};
use crate::models::{
    AccessRights, ShareGrant, StepId, Template, TemplateId, TranscriptTurn, Variable, VariablePatch,
    Visibility,
};
use crate::store::TemplateSubmitter;
use crate::workflow::registry::VariableRegistry;
use crate::workflow::steps::StepStore;
use crate::workflow::validator::{self, Violation};

#[derive(Debug, Clone, Default)]
pub struct TemplateBuilder {
    name: String,
    description: Option<String>,
    visibility: Visibility,
    shared_users: Vec<ShareGrant>,
    shared_roles: Vec<ShareGrant>,
    steps: StepStore,
    registry: VariableRegistry,
}

impl TemplateBuilder {
    /// Start a session from a recorded conversation, registering every
    /// placeholder already present in user turns.
    pub fn from_transcript(turns: Vec<TranscriptTurn>) -> Self {
        let steps = StepStore::import_transcript(turns);
        let registry = VariableRegistry::seeded(&steps);
        tracing::debug!(
            "[Builder] imported {} step(s), {} variable(s)",
            steps.len(),
            registry.len()
        );
        Self {
            steps,
            registry,
            ..Default::default()
        }
    }

    /// Resume a session from a previously built template.
    ///
    /// Step placeholders are re-derived from their text; variable records are
    /// kept for names still in use, missing ones get defaults and unused ones
    /// are dropped.
    pub fn restore(template: Template) -> Self {
        let steps = StepStore::from_steps(template.steps);
        let mut registry = VariableRegistry::seeded(&steps);
        for var in template.variables {
            if registry.contains(&var.name) {
                registry.insert(var);
            } else {
                tracing::debug!("[Builder] dropping unused variable '{}'", var.name);
            }
        }
        Self {
            name: template.name,
            description: template.description,
            visibility: template.visibility,
            shared_users: template.shared_users,
            shared_roles: template.shared_roles,
            steps,
            registry,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description.filter(|d| !d.trim().is_empty());
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Change visibility. Selected users and roles are kept so switching
    /// back restores them; `build()` only emits the list that applies.
    pub fn set_visibility(&mut self, visibility: Visibility) {
        self.visibility = visibility;
    }

    pub fn share_with_user(&mut self, id: &str, rights: AccessRights) {
        upsert_grant(&mut self.shared_users, id, rights);
    }

    pub fn unshare_user(&mut self, id: &str) -> bool {
        remove_grant(&mut self.shared_users, id)
    }

    pub fn share_with_role(&mut self, id: &str, rights: AccessRights) {
        upsert_grant(&mut self.shared_roles, id, rights);
    }

    pub fn unshare_role(&mut self, id: &str) -> bool {
        remove_grant(&mut self.shared_roles, id)
    }

    pub fn steps(&self) -> &StepStore {
        &self.steps
    }

    pub fn registry(&self) -> &VariableRegistry {
        &self.registry
    }

    /// Replace the text of a user step and resync variables.
    pub fn edit_step(&mut self, step_id: StepId, content: &str) -> Result<(), EditError> {
        self.registry
            .reconcile(&mut self.steps, step_id, content)
            .inspect_err(|e| tracing::warn!("[Builder] edit rejected: {}", e))
    }

    pub fn rename_variable(&mut self, old_name: &str, new_name: &str) -> Result<(), EditError> {
        self.registry
            .rename(&mut self.steps, old_name, new_name)
            .inspect_err(|e| tracing::warn!("[Builder] rename rejected: {}", e))
    }

    pub fn delete_variable(&mut self, name: &str) -> bool {
        self.registry.delete(&mut self.steps, name)
    }

    pub fn update_variable(&mut self, name: &str, patch: VariablePatch) -> Result<&Variable, EditError> {
        self.registry.update(name, patch)
    }

    /// Assemble the template from the current session state.
    pub fn build(&self) -> Template {
        let shared_users = match self.visibility {
            Visibility::Users => self.shared_users.clone(),
            _ => Vec::new(),
        };
        let shared_roles = match self.visibility {
            Visibility::Roles => self.shared_roles.clone(),
            _ => Vec::new(),
        };
        Template {
            name: self.name.trim().to_string(),
            description: self.description.clone(),
            visibility: self.visibility,
            shared_users,
            shared_roles,
            variables: self.registry.variables().cloned().collect(),
            steps: self.steps.as_slice().to_vec(),
        }
    }

    pub fn validate(&self) -> Vec<Violation> {
        validator::validate(&self.build())
    }

    /// Validate and hand the template to `submitter`. The submitter is only
    /// called for a valid template and its error is returned as-is; the
    /// session is left intact either way.
    pub async fn submit<S: TemplateSubmitter>(&self, submitter: &S) -> Result<TemplateId, SubmitError> {
        let template = self.build();
        validator::check(&template).inspect_err(|e| tracing::warn!("[Builder] {}", e))?;
        let id = submitter.submit(&template).await?;
        tracing::info!("[Builder] submitted template '{}' as {}", template.name, id);
        Ok(id)
    }
}

fn upsert_grant(grants: &mut Vec<ShareGrant>, id: &str, rights: AccessRights) {
    match grants.iter_mut().find(|g| g.id == id) {
        Some(existing) => existing.rights = rights,
        None => grants.push(ShareGrant::new(id, rights)),
    }
}

fn remove_grant(grants: &mut Vec<ShareGrant>, id: &str) -> bool {
    let before = grants.len();
    grants.retain(|g| g.id != id);
    grants.len() != before
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use std::sync::Mutex;

    struct RecordingSubmitter {
        submitted: Mutex<Vec<Template>>,
        fail: bool,
    }

    impl RecordingSubmitter {
        fn new(fail: bool) -> Self {
            Self { submitted: Mutex::new(Vec::new()), fail }
        }
    }

    impl TemplateSubmitter for RecordingSubmitter {
        async fn submit(&self, template: &Template) -> Result<TemplateId, StoreError> {
            if self.fail {
                return Err(StoreError::Database("disk full".to_string()));
            }
            self.submitted.lock().unwrap().push(template.clone());
            Ok("tpl-1".to_string())
        }
    }

    fn transcript() -> Vec<TranscriptTurn> {
        vec![
            TranscriptTurn::User { content: "Write a haiku about {topic}".to_string() },
            TranscriptTurn::Assistant { content: "Autumn moonlight...".to_string() },
            TranscriptTurn::Tool { tool_name: "save_poem".to_string(), content: None },
            TranscriptTurn::User { content: "Now in {language}".to_string() },
        ]
    }

    #[test]
    fn test_from_transcript_seeds_variables() {
        let b = TemplateBuilder::from_transcript(transcript());
        assert_eq!(b.registry().names(), vec!["language", "topic"]);
        assert_eq!(b.steps().len(), 4);
        assert_eq!(b.visibility(), Visibility::Private);
    }

    #[test]
    fn test_build_is_repeatable() {
        let mut b = TemplateBuilder::from_transcript(transcript());
        b.set_name("Haiku");
        assert_eq!(b.build(), b.build());
    }

    #[test]
    fn test_build_serializes_steps_per_role() {
        let mut b = TemplateBuilder::from_transcript(transcript());
        b.set_name("Haiku");
        let json = serde_json::to_value(b.build()).unwrap();
        let steps = json["steps"].as_array().unwrap();
        assert_eq!(steps[0]["content"], "Write a haiku about {topic}");
        assert_eq!(steps[1]["contentExample"], "Autumn moonlight...");
        assert!(steps[1].get("content").is_none());
        assert_eq!(steps[2]["toolName"], "save_poem");
        assert!(steps[2].get("contentExample").is_none());
    }

    #[test]
    fn test_build_emits_only_grants_for_current_visibility() {
        let mut b = TemplateBuilder::from_transcript(transcript());
        b.share_with_user("u1", AccessRights::Read);
        b.share_with_user("u1", AccessRights::Write);
        b.share_with_role("r1", AccessRights::Read);

        b.set_visibility(Visibility::Users);
        let t = b.build();
        assert_eq!(t.shared_users, vec![ShareGrant::new("u1", AccessRights::Write)]);
        assert!(t.shared_roles.is_empty());

        b.set_visibility(Visibility::Roles);
        let t = b.build();
        assert!(t.shared_users.is_empty());
        assert_eq!(t.shared_roles.len(), 1);

        b.set_visibility(Visibility::Public);
        let t = b.build();
        assert!(t.shared_users.is_empty() && t.shared_roles.is_empty());

        assert!(b.unshare_role("r1"));
        assert!(!b.unshare_role("r1"));
    }

    #[test]
    fn test_edit_step_keeps_registry_in_sync() {
        let mut b = TemplateBuilder::from_transcript(transcript());
        b.edit_step(StepId(3), "Now in {language} with {style}").unwrap();
        assert_eq!(b.registry().names(), vec!["language", "style", "topic"]);
        b.edit_step(StepId(0), "Write a haiku").unwrap();
        assert_eq!(b.registry().names(), vec!["language", "style"]);
        assert!(b.edit_step(StepId(2), "tool text").is_err());
    }

    #[test]
    fn test_restore_resyncs_hand_edited_template() {
        let mut b = TemplateBuilder::from_transcript(transcript());
        b.set_name("Haiku");
        b.update_variable("topic", VariablePatch { description: Some("What to write about".into()), ..Default::default() })
            .unwrap();
        let mut t = b.build();
        t.variables.push(Variable::detected("stale"));
        t.variables.retain(|v| v.name != "language");

        let restored = TemplateBuilder::restore(t);
        assert_eq!(restored.name(), "Haiku");
        assert_eq!(restored.registry().names(), vec!["language", "topic"]);
        assert_eq!(restored.registry().get("topic").unwrap().description, "What to write about");
        assert_eq!(restored.registry().get("language").unwrap().description, "Auto-detected variable");
    }

    #[tokio::test]
    async fn test_submit_rejects_invalid_without_calling_submitter() {
        let b = TemplateBuilder::from_transcript(transcript());
        let submitter = RecordingSubmitter::new(false);

        let err = b.submit(&submitter).await.unwrap_err();
        match err {
            SubmitError::Invalid(v) => assert_eq!(v.violations, vec![Violation::EmptyName]),
            other => panic!("unexpected error: {other}"),
        }
        assert!(submitter.submitted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submit_valid_template() {
        let mut b = TemplateBuilder::from_transcript(transcript());
        b.set_name("Haiku");
        let submitter = RecordingSubmitter::new(false);

        let id = b.submit(&submitter).await.unwrap();
        assert_eq!(id, "tpl-1");
        let submitted = submitter.submitted.lock().unwrap();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0], b.build());
    }

    #[tokio::test]
    async fn test_submit_surfaces_store_failure() {
        let mut b = TemplateBuilder::from_transcript(transcript());
        b.set_name("Haiku");
        let before = b.build();

        let err = b.submit(&RecordingSubmitter::new(true)).await.unwrap_err();
        assert!(matches!(err, SubmitError::Store(StoreError::Database(_))));
        assert_eq!(b.build(), before);
    }
}
