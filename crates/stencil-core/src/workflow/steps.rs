//! Step store — the imported transcript as an indexed, fixed-length list.
//!
//! Steps are addressed by `StepId`, which is their position at import time.
//! The list never grows or shrinks after import; only the text of user
//! steps changes, and `variables_used` is always recomputed together with it.

use crate::error::EditError;
use crate::models::{Step, StepId, StepKind, TranscriptTurn};
use crate::placeholder;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepStore {
    steps: Vec<Step>,
}

impl StepStore {
    /// Build a store from a recorded conversation, one step per turn.
    pub fn import_transcript(turns: Vec<TranscriptTurn>) -> Self {
        let steps = turns
            .into_iter()
            .enumerate()
            .map(|(i, turn)| {
                let kind = match turn {
                    TranscriptTurn::User { content } => StepKind::User {
                        variables_used: placeholder::extract(&content),
                        content,
                    },
                    TranscriptTurn::Assistant { content } => StepKind::Assistant {
                        content_example: content,
                    },
                    TranscriptTurn::Tool { tool_name, .. } => StepKind::Tool { tool_name },
                };
                Step { id: StepId(i), kind }
            })
            .collect();
        Self { steps }
    }

    /// Rebuild a store from previously exported steps. Ids are reassigned
    /// by position and `variables_used` is re-derived from the text.
    pub fn from_steps(steps: Vec<Step>) -> Self {
        let steps = steps
            .into_iter()
            .enumerate()
            .map(|(i, step)| {
                let kind = match step.kind {
                    StepKind::User { content, .. } => StepKind::User {
                        variables_used: placeholder::extract(&content),
                        content,
                    },
                    other => other,
                };
                Step { id: StepId(i), kind }
            })
            .collect();
        Self { steps }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn get(&self, id: StepId) -> Option<&Step> {
        self.steps.get(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter()
    }

    pub fn as_slice(&self) -> &[Step] {
        &self.steps
    }

    /// Check that `id` names an editable (user) step.
    pub(crate) fn ensure_editable(&self, id: StepId) -> Result<(), EditError> {
        let step = self.get(id).ok_or(EditError::UnknownStep(id))?;
        match step.kind {
            StepKind::User { .. } => Ok(()),
            _ => Err(EditError::NotEditable(id, step.role())),
        }
    }

    /// Replace a user step's text and its derived placeholder list.
    /// Callers must have checked `ensure_editable` first.
    pub(crate) fn set_user_content(&mut self, id: StepId, new_content: String, names: Vec<String>) {
        if let Some(Step {
            kind: StepKind::User { content, variables_used },
            ..
        }) = self.steps.get_mut(id.0)
        {
            *content = new_content;
            *variables_used = names;
        }
    }

    /// Mutable access to every user step's text and placeholder list.
    pub(crate) fn user_steps_mut(&mut self) -> impl Iterator<Item = (&mut String, &mut Vec<String>)> {
        self.steps.iter_mut().filter_map(|step| match &mut step.kind {
            StepKind::User { content, variables_used } => Some((content, variables_used)),
            _ => None,
        })
    }

    /// Every placeholder name referenced by any step, in first-use order.
    pub fn used_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for name in self.steps.iter().flat_map(|s| s.variables_used()) {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StepRole;

    fn transcript() -> Vec<TranscriptTurn> {
        vec![
            TranscriptTurn::User { content: "Book a flight to {city} on {date}".to_string() },
            TranscriptTurn::Assistant { content: "Which airline?".to_string() },
            TranscriptTurn::Tool { tool_name: "flights.search".to_string(), content: Some("{}".to_string()) },
            TranscriptTurn::User { content: "Any airline, leaving {date}".to_string() },
        ]
    }

    #[test]
    fn test_import_assigns_sequential_ids_and_roles() {
        let store = StepStore::import_transcript(transcript());
        assert_eq!(store.len(), 4);
        let roles: Vec<StepRole> = store.iter().map(|s| s.role()).collect();
        assert_eq!(roles, vec![StepRole::User, StepRole::Assistant, StepRole::Tool, StepRole::User]);
        for (i, step) in store.iter().enumerate() {
            assert_eq!(step.id, StepId(i));
        }
    }

    #[test]
    fn test_import_derives_variables_used() {
        let store = StepStore::import_transcript(transcript());
        assert_eq!(store.get(StepId(0)).unwrap().variables_used(), ["city", "date"]);
        assert!(store.get(StepId(1)).unwrap().variables_used().is_empty());
        assert_eq!(store.get(StepId(2)).unwrap().tool_name(), Some("flights.search"));
        assert_eq!(store.get(StepId(1)).unwrap().content_example(), Some("Which airline?"));
        assert_eq!(store.used_names(), vec!["city", "date"]);
    }

    #[test]
    fn test_ensure_editable() {
        let store = StepStore::import_transcript(transcript());
        assert!(store.ensure_editable(StepId(0)).is_ok());
        assert_eq!(
            store.ensure_editable(StepId(1)),
            Err(EditError::NotEditable(StepId(1), StepRole::Assistant))
        );
        assert_eq!(store.ensure_editable(StepId(9)), Err(EditError::UnknownStep(StepId(9))));
    }

    #[test]
    fn test_from_steps_recomputes_variables_used() {
        let stale = vec![
            Step {
                id: StepId(7),
                kind: StepKind::User {
                    content: "Hello {name}".to_string(),
                    variables_used: vec!["stale".to_string()],
                },
            },
            Step { id: StepId(3), kind: StepKind::Tool { tool_name: "t".to_string() } },
        ];
        let store = StepStore::from_steps(stale);
        assert_eq!(store.get(StepId(0)).unwrap().variables_used(), ["name"]);
        assert_eq!(store.get(StepId(1)).unwrap().id, StepId(1));
    }
}
