use serde::{Deserialize, Serialize};

/// A user that templates can be shared with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEntry {
    pub id: String,
    pub email: String,
}

/// A role that templates can be shared with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleEntry {
    pub id: String,
    pub name: String,
}
