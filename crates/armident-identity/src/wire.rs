//! The five JSON shapes ARM uses for the `identity` property of a resource.
//!
//! Field names and optionality mirror the REST schemas exactly; these structs
//! are serialized straight into request bodies.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::error::IdentityError;
use crate::types::{ExpandedConfig, Identity, IdentityType};

// ── Entries ───────────────────────────────────────────────────────────────────

/// One element of a list-shaped `userAssignedIdentities`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAssignedIdentityReference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal_id: Option<String>,
}

/// The value side of a map-shaped `userAssignedIdentities`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAssignedIdentityDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal_id: Option<String>,
}

// ── Variants ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemAssignedIdentity {
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: IdentityType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAssignedIdentityList {
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: IdentityType,
    #[serde(
        default,
        deserialize_with = "reference_list",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub user_assigned_identities: Vec<UserAssignedIdentityReference>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAssignedIdentityMap {
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: IdentityType,
    #[serde(
        default,
        deserialize_with = "details_map",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub user_assigned_identities: BTreeMap<String, UserAssignedIdentityDetails>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemUserAssignedIdentityList {
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: IdentityType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "reference_list",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub user_assigned_identities: Vec<UserAssignedIdentityReference>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemUserAssignedIdentityMap {
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: IdentityType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "details_map",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub user_assigned_identities: BTreeMap<String, UserAssignedIdentityDetails>,
}

// ── Null handling ─────────────────────────────────────────────────────────────

// ARM sends explicit `null` for unset fields as often as it omits them; both
// decode to the empty value.

fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(d).map(Option::unwrap_or_default)
}

fn reference_list<'de, D>(d: D) -> Result<Vec<UserAssignedIdentityReference>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<Option<UserAssignedIdentityReference>>> = Option::deserialize(d)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect())
}

fn details_map<'de, D>(d: D) -> Result<BTreeMap<String, UserAssignedIdentityDetails>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, Option<UserAssignedIdentityDetails>>> =
        Option::deserialize(d)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(id, details)| (id, details.unwrap_or_default()))
        .collect())
}

// ── Field helpers ─────────────────────────────────────────────────────────────

fn deref(s: &Option<String>) -> String {
    s.clone().unwrap_or_default()
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Entries without a `resourceId` carry nothing the canonical form can hold;
/// they are dropped and reported.
fn ids_from_list(
    entries: &[UserAssignedIdentityReference],
    variant: WireVariant,
) -> Vec<String> {
    let mut ids = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        match entry.resource_id.as_deref() {
            Some(id) if !id.is_empty() => ids.push(id.to_string()),
            _ => warn!(
                %variant,
                index,
                "dropping user-assigned identity entry without a resourceId"
            ),
        }
    }
    ids
}

fn list_from_ids(ids: &[String]) -> Vec<UserAssignedIdentityReference> {
    ids.iter()
        .map(|id| UserAssignedIdentityReference {
            resource_id: Some(id.clone()),
            ..Default::default()
        })
        .collect()
}

fn map_from_ids(ids: &[String]) -> BTreeMap<String, UserAssignedIdentityDetails> {
    ids.iter()
        .map(|id| (id.clone(), UserAssignedIdentityDetails::default()))
        .collect()
}

// ── Conversions ───────────────────────────────────────────────────────────────

impl Identity for SystemAssignedIdentity {
    fn to_expanded_config(&self) -> ExpandedConfig {
        ExpandedConfig {
            kind: self.kind,
            principal_id: deref(&self.principal_id),
            tenant_id: deref(&self.tenant_id),
            user_assigned_identity_ids: Vec::new(),
        }
    }

    fn from_expanded_config(config: &ExpandedConfig) -> Self {
        Self {
            kind: config.kind,
            tenant_id: non_empty(&config.tenant_id),
            principal_id: non_empty(&config.principal_id),
        }
    }
}

impl Identity for UserAssignedIdentityList {
    fn to_expanded_config(&self) -> ExpandedConfig {
        ExpandedConfig {
            kind: self.kind,
            user_assigned_identity_ids: ids_from_list(
                &self.user_assigned_identities,
                WireVariant::UserAssignedList,
            ),
            ..Default::default()
        }
    }

    fn from_expanded_config(config: &ExpandedConfig) -> Self {
        Self {
            kind: config.kind,
            user_assigned_identities: list_from_ids(&config.user_assigned_identity_ids),
        }
    }
}

impl Identity for UserAssignedIdentityMap {
    fn to_expanded_config(&self) -> ExpandedConfig {
        ExpandedConfig {
            kind: self.kind,
            user_assigned_identity_ids: self.user_assigned_identities.keys().cloned().collect(),
            ..Default::default()
        }
    }

    fn from_expanded_config(config: &ExpandedConfig) -> Self {
        Self {
            kind: config.kind,
            user_assigned_identities: map_from_ids(&config.user_assigned_identity_ids),
        }
    }
}

impl Identity for SystemUserAssignedIdentityList {
    fn to_expanded_config(&self) -> ExpandedConfig {
        ExpandedConfig {
            kind: self.kind,
            principal_id: deref(&self.principal_id),
            tenant_id: deref(&self.tenant_id),
            user_assigned_identity_ids: ids_from_list(
                &self.user_assigned_identities,
                WireVariant::SystemUserAssignedList,
            ),
        }
    }

    fn from_expanded_config(config: &ExpandedConfig) -> Self {
        Self {
            kind: config.kind,
            tenant_id: non_empty(&config.tenant_id),
            principal_id: non_empty(&config.principal_id),
            user_assigned_identities: list_from_ids(&config.user_assigned_identity_ids),
        }
    }
}

impl Identity for SystemUserAssignedIdentityMap {
    fn to_expanded_config(&self) -> ExpandedConfig {
        ExpandedConfig {
            kind: self.kind,
            principal_id: deref(&self.principal_id),
            tenant_id: deref(&self.tenant_id),
            user_assigned_identity_ids: self.user_assigned_identities.keys().cloned().collect(),
        }
    }

    fn from_expanded_config(config: &ExpandedConfig) -> Self {
        Self {
            kind: config.kind,
            tenant_id: non_empty(&config.tenant_id),
            principal_id: non_empty(&config.principal_id),
            user_assigned_identities: map_from_ids(&config.user_assigned_identity_ids),
        }
    }
}

// ── Variant selection ─────────────────────────────────────────────────────────

/// Names one of the five shapes. Which one applies is fixed per service and
/// API version, so the caller always knows it up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireVariant {
    SystemAssigned,
    UserAssignedList,
    UserAssignedMap,
    SystemUserAssignedList,
    SystemUserAssignedMap,
}

impl WireVariant {
    pub const ALL: [WireVariant; 5] = [
        WireVariant::SystemAssigned,
        WireVariant::UserAssignedList,
        WireVariant::UserAssignedMap,
        WireVariant::SystemUserAssignedList,
        WireVariant::SystemUserAssignedMap,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WireVariant::SystemAssigned => "system_assigned",
            WireVariant::UserAssignedList => "user_assigned_list",
            WireVariant::UserAssignedMap => "user_assigned_map",
            WireVariant::SystemUserAssignedList => "system_user_assigned_list",
            WireVariant::SystemUserAssignedMap => "system_user_assigned_map",
        }
    }
}

impl std::fmt::Display for WireVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for WireVariant {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace('-', "_").to_ascii_lowercase();
        WireVariant::ALL
            .into_iter()
            .find(|v| v.as_str() == normalized)
            .ok_or_else(|| IdentityError::UnknownVariant(s.to_string()))
    }
}

/// A decoded payload of any of the five shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireIdentity {
    SystemAssigned(SystemAssignedIdentity),
    UserAssignedList(UserAssignedIdentityList),
    UserAssignedMap(UserAssignedIdentityMap),
    SystemUserAssignedList(SystemUserAssignedIdentityList),
    SystemUserAssignedMap(SystemUserAssignedIdentityMap),
}

impl WireIdentity {
    pub fn variant(&self) -> WireVariant {
        match self {
            WireIdentity::SystemAssigned(_) => WireVariant::SystemAssigned,
            WireIdentity::UserAssignedList(_) => WireVariant::UserAssignedList,
            WireIdentity::UserAssignedMap(_) => WireVariant::UserAssignedMap,
            WireIdentity::SystemUserAssignedList(_) => WireVariant::SystemUserAssignedList,
            WireIdentity::SystemUserAssignedMap(_) => WireVariant::SystemUserAssignedMap,
        }
    }

    /// Decode `value` as `variant`. JSON `null` means the resource returned no
    /// identity at all and yields `Ok(None)`.
    pub fn decode(variant: WireVariant, value: &Value) -> Result<Option<Self>, IdentityError> {
        if value.is_null() {
            return Ok(None);
        }
        let err = |source| IdentityError::Decode {
            variant: variant.to_string(),
            source,
        };
        let decoded = match variant {
            WireVariant::SystemAssigned => {
                WireIdentity::SystemAssigned(serde_json::from_value(value.clone()).map_err(err)?)
            }
            WireVariant::UserAssignedList => {
                WireIdentity::UserAssignedList(serde_json::from_value(value.clone()).map_err(err)?)
            }
            WireVariant::UserAssignedMap => {
                WireIdentity::UserAssignedMap(serde_json::from_value(value.clone()).map_err(err)?)
            }
            WireVariant::SystemUserAssignedList => WireIdentity::SystemUserAssignedList(
                serde_json::from_value(value.clone()).map_err(err)?,
            ),
            WireVariant::SystemUserAssignedMap => WireIdentity::SystemUserAssignedMap(
                serde_json::from_value(value.clone()).map_err(err)?,
            ),
        };
        Ok(Some(decoded))
    }

    pub fn encode(&self) -> Value {
        // Every field is a string, list or string-keyed map: serialization cannot fail.
        let encoded = match self {
            WireIdentity::SystemAssigned(v) => serde_json::to_value(v),
            WireIdentity::UserAssignedList(v) => serde_json::to_value(v),
            WireIdentity::UserAssignedMap(v) => serde_json::to_value(v),
            WireIdentity::SystemUserAssignedList(v) => serde_json::to_value(v),
            WireIdentity::SystemUserAssignedMap(v) => serde_json::to_value(v),
        };
        encoded.unwrap_or(Value::Null)
    }

    pub fn to_expanded_config(&self) -> ExpandedConfig {
        match self {
            WireIdentity::SystemAssigned(v) => v.to_expanded_config(),
            WireIdentity::UserAssignedList(v) => v.to_expanded_config(),
            WireIdentity::UserAssignedMap(v) => v.to_expanded_config(),
            WireIdentity::SystemUserAssignedList(v) => v.to_expanded_config(),
            WireIdentity::SystemUserAssignedMap(v) => v.to_expanded_config(),
        }
    }

    pub fn from_expanded_config(variant: WireVariant, config: &ExpandedConfig) -> Self {
        debug!(%variant, kind = %config.kind, "building wire identity");
        match variant {
            WireVariant::SystemAssigned => {
                WireIdentity::SystemAssigned(SystemAssignedIdentity::from_expanded_config(config))
            }
            WireVariant::UserAssignedList => WireIdentity::UserAssignedList(
                UserAssignedIdentityList::from_expanded_config(config),
            ),
            WireVariant::UserAssignedMap => WireIdentity::UserAssignedMap(
                UserAssignedIdentityMap::from_expanded_config(config),
            ),
            WireVariant::SystemUserAssignedList => WireIdentity::SystemUserAssignedList(
                SystemUserAssignedIdentityList::from_expanded_config(config),
            ),
            WireVariant::SystemUserAssignedMap => WireIdentity::SystemUserAssignedMap(
                SystemUserAssignedIdentityMap::from_expanded_config(config),
            ),
        }
    }
}

/// Decode a raw `identity` property straight into the canonical form.
pub fn normalize_json(
    variant: WireVariant,
    value: &Value,
) -> Result<ExpandedConfig, IdentityError> {
    let config = WireIdentity::decode(variant, value)?
        .map(|w| w.to_expanded_config())
        .unwrap_or_default();
    debug!(
        %variant,
        kind = %config.kind,
        ids = config.user_assigned_identity_ids.len(),
        "normalized identity"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    #[test]
    fn list_entry_without_resource_id_is_dropped() {
        let wire = UserAssignedIdentityList {
            kind: IdentityType::UserAssigned,
            user_assigned_identities: vec![
                UserAssignedIdentityReference {
                    resource_id: Some("id-a".into()),
                    ..Default::default()
                },
                UserAssignedIdentityReference::default(),
                UserAssignedIdentityReference {
                    resource_id: Some(String::new()),
                    client_id: Some("c".into()),
                    principal_id: None,
                },
            ],
        };
        assert_eq!(wire.to_expanded_config().user_assigned_identity_ids, vec!["id-a"]);
    }

    #[test]
    fn system_assigned_wire_shape_is_camel_case() {
        let wire = SystemAssignedIdentity {
            kind: IdentityType::SystemAssigned,
            tenant_id: Some("t1".into()),
            principal_id: Some("p1".into()),
        };
        assert_eq!(
            serde_json::to_value(&wire).unwrap(),
            json!({"type": "SystemAssigned", "tenantId": "t1", "principalId": "p1"})
        );
    }

    #[test]
    fn map_output_carries_only_keys() {
        let config = ExpandedConfig::new(IdentityType::UserAssigned)
            .with_user_assigned_identity_ids(["id-b", "id-a"]);
        let wire = UserAssignedIdentityMap::from_expanded_config(&config);
        assert_eq!(
            serde_json::to_value(&wire).unwrap(),
            json!({"type": "UserAssigned", "userAssignedIdentities": {"id-a": {}, "id-b": {}}})
        );
    }

    #[test]
    fn absent_fields_decode_to_defaults() {
        let wire: SystemUserAssignedIdentityMap = serde_json::from_value(json!({})).unwrap();
        assert_eq!(wire, SystemUserAssignedIdentityMap::default());
        assert_eq!(wire.to_expanded_config(), ExpandedConfig::default());
    }

    #[test]
    fn variant_names_parse_with_dashes() {
        assert_eq!(
            "system-user-assigned-map".parse::<WireVariant>().unwrap(),
            WireVariant::SystemUserAssignedMap
        );
        assert!("identity".parse::<WireVariant>().is_err());
    }

    #[test]
    fn decode_null_is_absent() {
        for variant in WireVariant::ALL {
            assert!(WireIdentity::decode(variant, &Value::Null).unwrap().is_none());
            assert_eq!(normalize_json(variant, &Value::Null).unwrap(), ExpandedConfig::default());
        }
    }

    #[test]
    fn decode_rejects_wrong_shape() {
        let result = WireIdentity::decode(
            WireVariant::UserAssignedMap,
            &json!({"type": "UserAssigned", "userAssignedIdentities": [{"resourceId": "a"}]}),
        );
        assert!(matches!(result, Err(IdentityError::Decode { .. })));
    }

    #[test]
    fn null_collection_decodes_as_empty() {
        let body = json!({
            "type": "SystemAssigned",
            "tenantId": "t1",
            "principalId": "p1",
            "userAssignedIdentities": null
        });
        for variant in [
            WireVariant::SystemUserAssignedMap,
            WireVariant::SystemUserAssignedList,
        ] {
            let config = normalize_json(variant, &body).unwrap();
            assert_eq!(config.kind, IdentityType::SystemAssigned);
            assert_eq!(config.tenant_id, "t1");
            assert_eq!(config.principal_id, "p1");
            assert!(config.user_assigned_identity_ids.is_empty());
        }
        let user_only = json!({"type": "None", "userAssignedIdentities": null});
        assert_eq!(
            normalize_json(WireVariant::UserAssignedList, &user_only).unwrap(),
            ExpandedConfig::default()
        );
        assert_eq!(
            normalize_json(WireVariant::UserAssignedMap, &user_only).unwrap(),
            ExpandedConfig::default()
        );
    }

    #[test]
    fn null_map_value_keeps_its_key() {
        let body = json!({"type": "UserAssigned", "userAssignedIdentities": {"/id1": null}});
        let config = normalize_json(WireVariant::UserAssignedMap, &body).unwrap();
        assert_eq!(config.user_assigned_identity_ids, vec!["/id1"]);
    }

    #[test]
    fn null_list_entry_is_dropped() {
        let body = json!({
            "type": "UserAssigned",
            "userAssignedIdentities": [null, {"resourceId": "/id1"}]
        });
        let config = normalize_json(WireVariant::UserAssignedList, &body).unwrap();
        assert_eq!(config.user_assigned_identity_ids, vec!["/id1"]);
    }

    #[test]
    fn null_type_decodes_as_none() {
        let body = json!({"type": null, "tenantId": null, "principalId": null});
        for variant in WireVariant::ALL {
            assert_eq!(normalize_json(variant, &body).unwrap(), ExpandedConfig::default());
        }
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn lines(&self) -> Vec<String> {
            let bytes = self.0.lock().unwrap().clone();
            String::from_utf8(bytes)
                .unwrap()
                .lines()
                .map(str::to_string)
                .collect()
        }
    }

    #[test]
    fn dropped_entries_emit_one_warning_each() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .without_time()
            .finish();

        let wire = SystemUserAssignedIdentityList {
            kind: IdentityType::SystemAssignedUserAssigned,
            user_assigned_identities: vec![
                UserAssignedIdentityReference::default(),
                UserAssignedIdentityReference {
                    resource_id: Some("/id1".into()),
                    ..Default::default()
                },
                UserAssignedIdentityReference {
                    resource_id: Some(String::new()),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let config = tracing::subscriber::with_default(subscriber, || wire.to_expanded_config());
        assert_eq!(config.user_assigned_identity_ids, vec!["/id1"]);

        let lines = logs.lines();
        assert_eq!(lines.len(), 2, "expected two warnings, got {:?}", lines);
        for (line, index) in lines.iter().zip([0, 2]) {
            assert!(line.contains("WARN"), "{line}");
            assert!(line.contains("variant=system_user_assigned_list"), "{line}");
            assert!(line.contains(&format!("index={index}")), "{line}");
        }
    }

    #[test]
    fn well_formed_list_emits_no_warning() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_max_level(tracing::Level::WARN)
            .finish();

        let config = ExpandedConfig::new(IdentityType::UserAssigned)
            .with_user_assigned_identity_ids(["/a"]);
        let wire = UserAssignedIdentityList::from_expanded_config(&config);
        tracing::subscriber::with_default(subscriber, || wire.to_expanded_config());
        assert!(logs.lines().is_empty());
    }
}
