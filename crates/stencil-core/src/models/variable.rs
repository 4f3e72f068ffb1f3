use serde::{Deserialize, Serialize};

/// Description given to variables that were created from a detected placeholder.
pub const AUTO_DESCRIPTION: &str = "Auto-detected variable";

/// Value type of a template variable. Only plain text is supported.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VariableType {
    #[default]
    Text,
}

/// A named parameter of a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default)]
    pub var_type: VariableType,
    #[serde(default = "default_true")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Variable {
    /// A variable created implicitly from a placeholder found in step text.
    pub fn detected(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: AUTO_DESCRIPTION.to_string(),
            var_type: VariableType::Text,
            required: true,
            default_value: None,
        }
    }
}

/// Partial update of a variable's metadata. The name is changed through
/// rename only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariablePatch {
    pub description: Option<String>,
    pub required: Option<bool>,
    /// `Some(None)` clears the default value.
    pub default_value: Option<Option<String>>,
}

impl VariablePatch {
    pub(crate) fn apply(self, var: &mut Variable) {
        if let Some(v) = self.description {
            var.description = v;
        }
        if let Some(v) = self.required {
            var.required = v;
        }
        if let Some(v) = self.default_value {
            var.default_value = v;
        }
    }
}
