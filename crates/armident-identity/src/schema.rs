use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

use crate::error::IdentityError;
use crate::types::{ExpandedConfig, IdentityType};

/// The Terraform `identity { ... }` block as it appears in configuration and state.
///
/// `principal_id` and `tenant_id` are computed: read back on flatten, ignored on expand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityBlock {
    #[serde(rename = "type")]
    pub kind: IdentityType,
    #[serde(default)]
    pub identity_ids: Vec<String>,
    #[serde(default)]
    pub principal_id: String,
    #[serde(default)]
    pub tenant_id: String,
}

/// Which identity types a resource's `identity` block accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaKind {
    SystemAssigned,
    UserAssigned,
    SystemUserAssigned,
}

impl SchemaKind {
    pub fn allowed_types(&self) -> &[IdentityType] {
        match self {
            SchemaKind::SystemAssigned => &[IdentityType::SystemAssigned],
            SchemaKind::UserAssigned => &[IdentityType::UserAssigned],
            SchemaKind::SystemUserAssigned => &[
                IdentityType::SystemAssigned,
                IdentityType::UserAssigned,
                IdentityType::SystemAssignedUserAssigned,
            ],
        }
    }

    pub fn is_type_allowed(&self, kind: &IdentityType) -> bool {
        self.allowed_types().contains(kind)
    }

    /// Turn the (at most one) configured block into the canonical form.
    pub fn expand(&self, input: &[IdentityBlock]) -> Result<ExpandedConfig, IdentityError> {
        let block = match input {
            [] => return Ok(ExpandedConfig::new(IdentityType::None)),
            [block] => block,
            _ => return Err(IdentityError::TooManyBlocks(input.len())),
        };

        if !self.is_type_allowed(&block.kind) {
            return Err(IdentityError::UnsupportedType {
                kind: block.kind,
                allowed: self
                    .allowed_types()
                    .iter()
                    .map(|t| format!("{:?}", t.as_str()))
                    .collect::<Vec<_>>()
                    .join(", "),
            });
        }

        if block.kind.includes_user_assigned() {
            if block.identity_ids.is_empty() {
                return Err(IdentityError::IdentityIdsRequired);
            }
        } else if !block.identity_ids.is_empty() {
            return Err(IdentityError::IdentityIdsNotAllowed);
        }

        debug!(
            schema = %self,
            kind = %block.kind,
            ids = block.identity_ids.len(),
            "expanded identity block"
        );
        Ok(ExpandedConfig::new(block.kind)
            .with_user_assigned_identity_ids(block.identity_ids.iter().cloned()))
    }

    /// Render the canonical form back into state; no identity means no block.
    pub fn flatten(&self, input: Option<&ExpandedConfig>) -> Vec<IdentityBlock> {
        let Some(config) = input else {
            return Vec::new();
        };
        if config.is_none() {
            return Vec::new();
        }
        vec![IdentityBlock {
            kind: config.kind,
            identity_ids: config.user_assigned_identity_ids.clone(),
            principal_id: config.principal_id.clone(),
            tenant_id: config.tenant_id.clone(),
        }]
    }
}

impl std::fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaKind::SystemAssigned => write!(f, "system_assigned"),
            SchemaKind::UserAssigned => write!(f, "user_assigned"),
            SchemaKind::SystemUserAssigned => write!(f, "system_user_assigned"),
        }
    }
}

impl FromStr for SchemaKind {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().replace('-', "_").to_ascii_lowercase().as_str() {
            "system_assigned" => Ok(SchemaKind::SystemAssigned),
            "user_assigned" => Ok(SchemaKind::UserAssigned),
            "system_user_assigned" => Ok(SchemaKind::SystemUserAssigned),
            _ => Err(IdentityError::UnknownSchema(s.to_string())),
        }
    }
}
