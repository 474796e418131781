use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::IdentityError;

// ── Identity type ─────────────────────────────────────────────────────────────

/// Which kinds of managed identity are attached to a resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum IdentityType {
    #[default]
    None,
    SystemAssigned,
    UserAssigned,
    SystemAssignedUserAssigned,
}

impl IdentityType {
    pub const ALL: [IdentityType; 4] = [
        IdentityType::None,
        IdentityType::SystemAssigned,
        IdentityType::UserAssigned,
        IdentityType::SystemAssignedUserAssigned,
    ];

    /// The canonical ARM spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            IdentityType::None => "None",
            IdentityType::SystemAssigned => "SystemAssigned",
            IdentityType::UserAssigned => "UserAssigned",
            IdentityType::SystemAssignedUserAssigned => "SystemAssigned, UserAssigned",
        }
    }

    pub fn includes_system_assigned(&self) -> bool {
        matches!(
            self,
            IdentityType::SystemAssigned | IdentityType::SystemAssignedUserAssigned
        )
    }

    pub fn includes_user_assigned(&self) -> bool {
        matches!(
            self,
            IdentityType::UserAssigned | IdentityType::SystemAssignedUserAssigned
        )
    }
}

impl std::fmt::Display for IdentityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for IdentityType {
    type Err = IdentityError;

    /// Accepts any casing, the legacy `SystemAssigned,UserAssigned` spelling and
    /// the empty string some API versions return for "no identity".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        match compact.to_ascii_lowercase().as_str() {
            "" | "none" => Ok(IdentityType::None),
            "systemassigned" => Ok(IdentityType::SystemAssigned),
            "userassigned" => Ok(IdentityType::UserAssigned),
            "systemassigned,userassigned" => Ok(IdentityType::SystemAssignedUserAssigned),
            _ => Err(IdentityError::UnknownType(s.to_string())),
        }
    }
}

impl TryFrom<String> for IdentityType {
    type Error = IdentityError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<IdentityType> for String {
    fn from(t: IdentityType) -> String {
        t.as_str().to_string()
    }
}

// ── Canonical form ────────────────────────────────────────────────────────────

/// The one shape every wire variant is normalized into.
///
/// Nothing here enforces that the populated fields agree with `kind`; call
/// [`ExpandedConfig::validate`] when that matters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpandedConfig {
    #[serde(rename = "type", default)]
    pub kind: IdentityType,
    #[serde(default)]
    pub principal_id: String,
    #[serde(default)]
    pub tenant_id: String,
    #[serde(default)]
    pub user_assigned_identity_ids: Vec<String>,
}

impl ExpandedConfig {
    pub fn new(kind: IdentityType) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    pub fn with_user_assigned_identity_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.user_assigned_identity_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_none(&self) -> bool {
        self.kind == IdentityType::None
    }

    /// Check that only the fields `kind` allows are populated.
    pub fn validate(&self) -> Result<(), IdentityError> {
        if !self.kind.includes_system_assigned() {
            if !self.principal_id.is_empty() {
                return Err(IdentityError::Inconsistent {
                    field: "principal_id",
                    kind: self.kind,
                });
            }
            if !self.tenant_id.is_empty() {
                return Err(IdentityError::Inconsistent {
                    field: "tenant_id",
                    kind: self.kind,
                });
            }
        }
        if !self.kind.includes_user_assigned() && !self.user_assigned_identity_ids.is_empty() {
            return Err(IdentityError::Inconsistent {
                field: "user_assigned_identity_ids",
                kind: self.kind,
            });
        }
        Ok(())
    }
}

// ── Conversion contract ───────────────────────────────────────────────────────

/// Implemented by every wire representation of a managed identity.
///
/// Both directions are total: missing data degrades to empty values.
pub trait Identity: Sized {
    fn to_expanded_config(&self) -> ExpandedConfig;
    fn from_expanded_config(config: &ExpandedConfig) -> Self;
}

/// Normalize a payload that may be absent; absence yields the zero value.
pub fn expand_optional<T: Identity>(input: Option<&T>) -> ExpandedConfig {
    input.map(Identity::to_expanded_config).unwrap_or_default()
}
