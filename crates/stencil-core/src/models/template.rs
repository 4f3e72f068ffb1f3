use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::step::Step;
use super::variable::Variable;

/// Identifier assigned to a template by the persistence layer.
pub type TemplateId = String;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Private,
    Users,
    Roles,
    Public,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::Users => "users",
            Self::Roles => "roles",
            Self::Public => "public",
        }
    }
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Visibility {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "private" => Ok(Self::Private),
            "users" => Ok(Self::Users),
            "roles" => Ok(Self::Roles),
            "public" => Ok(Self::Public),
            other => Err(format!("Unknown visibility: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AccessRights {
    #[default]
    Read,
    Write,
}

impl std::str::FromStr for AccessRights {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read" => Ok(Self::Read),
            "write" => Ok(Self::Write),
            other => Err(format!("Unknown access rights: {}", other)),
        }
    }
}

/// Access granted to one user or role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareGrant {
    pub id: String,
    #[serde(default)]
    pub rights: AccessRights,
}

impl ShareGrant {
    pub fn new(id: impl Into<String>, rights: AccessRights) -> Self {
        Self { id: id.into(), rights }
    }
}

/// The persistable template artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub shared_users: Vec<ShareGrant>,
    #[serde(default)]
    pub shared_roles: Vec<ShareGrant>,
    #[serde(default)]
    pub variables: Vec<Variable>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Template {
    /// Parse a template from JSON or YAML text.
    pub fn parse(text: &str, yaml: bool) -> Result<Self, String> {
        if yaml {
            serde_yaml::from_str(text).map_err(|e| format!("Failed to parse template YAML: {}", e))
        } else {
            serde_json::from_str(text).map_err(|e| format!("Failed to parse template JSON: {}", e))
        }
    }

    /// Serialize to JSON or YAML text.
    pub fn to_text(&self, yaml: bool) -> Result<String, String> {
        if yaml {
            serde_yaml::to_string(self).map_err(|e| format!("Failed to serialize template: {}", e))
        } else {
            serde_json::to_string_pretty(self)
                .map_err(|e| format!("Failed to serialize template: {}", e))
        }
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.name == name)
    }
}

/// A template as stored after submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRecord {
    pub id: TemplateId,
    #[serde(flatten)]
    pub template: Template,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_round_trips_through_str() {
        for v in [Visibility::Private, Visibility::Users, Visibility::Roles, Visibility::Public] {
            assert_eq!(v.as_str().parse::<Visibility>().unwrap(), v);
        }
        assert!("everyone".parse::<Visibility>().is_err());
    }

    #[test]
    fn test_parse_template_defaults() {
        let yaml = r#"
name: "Weekly report"
steps:
  - id: 0
    role: user
    content: "Summarize {team} progress"
    variablesUsed: [team]
  - id: 1
    role: assistant
    contentExample: "The team shipped..."
"#;
        let t = Template::parse(yaml, true).unwrap();
        assert_eq!(t.name, "Weekly report");
        assert_eq!(t.visibility, Visibility::Private);
        assert!(t.variables.is_empty());
        assert_eq!(t.steps.len(), 2);
        assert_eq!(t.steps[0].variables_used(), ["team".to_string()]);
        assert_eq!(t.steps[1].content_example(), Some("The team shipped..."));
    }
}
