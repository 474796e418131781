use serde::{Deserialize, Serialize};

/// Raw YAML representation of an identity document.
#[derive(Debug, Deserialize, Serialize)]
pub struct RawDocument {
    pub name: String,
    /// "system_assigned", "user_assigned" or "system_user_assigned" (default).
    #[serde(default = "default_schema")]
    pub schema: String,
    /// Wire shape the target API version uses.
    pub variant: String,
    #[serde(default)]
    pub identity: Vec<RawIdentityBlock>,
}

fn default_schema() -> String {
    "system_user_assigned".to_string()
}

/// Mirrors the Terraform `identity` block; `type` stays a string until conversion
/// so a bad value is reported against its file.
#[derive(Debug, Deserialize, Serialize)]
pub struct RawIdentityBlock {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub identity_ids: Vec<String>,
}
