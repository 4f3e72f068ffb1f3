//! Variable registry — keeps template variables in sync with step text.
//!
//! At rest the set of registered names equals the union of every step's
//! `variables_used`. Each mutating operation validates first and only then
//! touches the registry and the step store, so a failed call changes nothing.

use std::collections::BTreeMap;

use crate::error::EditError;
use crate::models::{StepId, Variable, VariablePatch};
use crate::placeholder;
use crate::workflow::steps::StepStore;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableRegistry {
    vars: BTreeMap<String, Variable>,
}

impl VariableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a registry from the placeholders already present in `steps`.
    pub fn seeded(steps: &StepStore) -> Self {
        let mut registry = Self::new();
        for name in steps.used_names() {
            registry.create_if_absent(&name);
        }
        registry
    }

    /// Register `name` with default metadata unless it already exists.
    /// Names come from the placeholder extractor and are not re-checked.
    pub fn create_if_absent(&mut self, name: &str) -> bool {
        if self.vars.contains_key(name) {
            return false;
        }
        self.vars.insert(name.to_string(), Variable::detected(name));
        true
    }

    /// Insert a fully specified variable, replacing any existing record.
    pub(crate) fn insert(&mut self, var: Variable) {
        self.vars.insert(var.name.clone(), var);
    }

    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.vars.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.vars.keys().cloned().collect()
    }

    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.vars.values()
    }

    /// Apply an edit of a user step's text and bring the registry back in
    /// sync: new placeholders are registered, placeholders no step uses any
    /// more are dropped.
    pub fn reconcile(
        &mut self,
        steps: &mut StepStore,
        step_id: StepId,
        new_content: &str,
    ) -> Result<(), EditError> {
        steps.ensure_editable(step_id)?;

        let names = placeholder::extract(new_content);
        let created: Vec<&String> = names
            .iter()
            .filter(|n| self.create_if_absent(n))
            .collect();
        if !created.is_empty() {
            tracing::debug!("[Registry] step {} introduced {:?}", step_id, created);
        }

        steps.set_user_content(step_id, new_content.to_string(), names.clone());

        let collected = self.collect_orphans(steps);
        if !collected.is_empty() {
            tracing::debug!("[Registry] step {} orphaned {:?}", step_id, collected);
        }
        Ok(())
    }

    /// Rename a variable and rewrite every `{old}` reference to `{new}`.
    pub fn rename(
        &mut self,
        steps: &mut StepStore,
        old_name: &str,
        new_name: &str,
    ) -> Result<(), EditError> {
        if !placeholder::is_valid_name(new_name) {
            return Err(EditError::InvalidName(new_name.to_string()));
        }
        if !self.vars.contains_key(old_name) {
            return Err(EditError::UnknownVariable(old_name.to_string()));
        }
        if old_name == new_name {
            return Ok(());
        }
        if self.vars.contains_key(new_name) {
            return Err(EditError::DuplicateName(new_name.to_string()));
        }

        if let Some(mut var) = self.vars.remove(old_name) {
            var.name = new_name.to_string();
            self.vars.insert(new_name.to_string(), var);
        }

        let old_token = placeholder::token(old_name);
        let new_token = placeholder::token(new_name);
        for (content, used) in steps.user_steps_mut() {
            if content.contains(&old_token) {
                *content = content.replace(&old_token, &new_token);
            }
            for name in used.iter_mut().filter(|n| n.as_str() == old_name) {
                *name = new_name.to_string();
            }
        }

        tracing::debug!("[Registry] renamed '{}' -> '{}'", old_name, new_name);
        Ok(())
    }

    /// Delete a variable and strip every `{name}` token from step text.
    ///
    /// Returns whether the variable existed. Stripping a token can join the
    /// surrounding text into a new placeholder (`{a{name}b}` becomes `{ab}`);
    /// such names are registered so the registry stays in sync.
    pub fn delete(&mut self, steps: &mut StepStore, name: &str) -> bool {
        if self.vars.remove(name).is_none() {
            return false;
        }

        let token = placeholder::token(name);
        let mut formed: Vec<String> = Vec::new();
        for (content, used) in steps.user_steps_mut() {
            if !content.contains(&token) {
                continue;
            }
            while content.contains(&token) {
                *content = content.replace(&token, "");
            }
            *used = placeholder::extract(content);
            formed.extend(used.iter().filter(|n| !self.vars.contains_key(*n)).cloned());
        }
        for n in &formed {
            self.create_if_absent(n);
        }

        tracing::debug!("[Registry] deleted '{}'", name);
        true
    }

    /// Update a variable's description, required flag or default value.
    pub fn update(&mut self, name: &str, patch: VariablePatch) -> Result<&Variable, EditError> {
        let var = self
            .vars
            .get_mut(name)
            .ok_or_else(|| EditError::UnknownVariable(name.to_string()))?;
        patch.apply(var);
        Ok(var)
    }

    /// Drop every variable no step references. Returns the dropped names.
    fn collect_orphans(&mut self, steps: &StepStore) -> Vec<String> {
        let used = steps.used_names();
        let orphans: Vec<String> = self
            .vars
            .keys()
            .filter(|k| !used.contains(*k))
            .cloned()
            .collect();
        for name in &orphans {
            self.vars.remove(name);
        }
        orphans
    }
}
