use serde::{Deserialize, Serialize};

/// Stable identifier of a step, assigned once at transcript import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepId(pub usize);

impl std::fmt::Display for StepId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for StepId {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<usize>()
            .map(StepId)
            .map_err(|_| format!("Invalid step id: {}", s))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StepRole {
    User,
    Assistant,
    Tool,
}

impl StepRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
        }
    }
}

impl std::fmt::Display for StepRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role-specific payload of a step.
///
/// Only user steps carry editable text; assistant replies are kept as an
/// example of what the step produced, tool calls only by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum StepKind {
    #[serde(rename_all = "camelCase")]
    User {
        content: String,
        #[serde(default)]
        variables_used: Vec<String>,
    },
    #[serde(rename_all = "camelCase")]
    Assistant { content_example: String },
    #[serde(rename_all = "camelCase")]
    Tool { tool_name: String },
}

/// One turn of an imported conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub id: StepId,
    #[serde(flatten)]
    pub(crate) kind: StepKind,
}

impl Step {
    pub fn role(&self) -> StepRole {
        match self.kind {
            StepKind::User { .. } => StepRole::User,
            StepKind::Assistant { .. } => StepRole::Assistant,
            StepKind::Tool { .. } => StepRole::Tool,
        }
    }

    /// Editable text, present for user steps only.
    pub fn content(&self) -> Option<&str> {
        match &self.kind {
            StepKind::User { content, .. } => Some(content),
            _ => None,
        }
    }

    pub fn content_example(&self) -> Option<&str> {
        match &self.kind {
            StepKind::Assistant { content_example } => Some(content_example),
            _ => None,
        }
    }

    pub fn tool_name(&self) -> Option<&str> {
        match &self.kind {
            StepKind::Tool { tool_name } => Some(tool_name),
            _ => None,
        }
    }

    /// Placeholder names referenced by this step; empty for non-user steps.
    pub fn variables_used(&self) -> &[String] {
        match &self.kind {
            StepKind::User { variables_used, .. } => variables_used,
            _ => &[],
        }
    }
}

/// A recorded conversation turn as supplied by the chat subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum TranscriptTurn {
    User {
        content: String,
    },
    Assistant {
        content: String,
    },
    #[serde(rename_all = "camelCase")]
    Tool {
        tool_name: String,
        #[serde(default)]
        content: Option<String>,
    },
}

impl TranscriptTurn {
    /// Parse a transcript from JSON or YAML text.
    pub fn parse_list(text: &str, yaml: bool) -> Result<Vec<Self>, String> {
        if yaml {
            serde_yaml::from_str(text).map_err(|e| format!("Failed to parse transcript YAML: {}", e))
        } else {
            serde_json::from_str(text).map_err(|e| format!("Failed to parse transcript JSON: {}", e))
        }
    }
}
