use armident_identity::{ExpandedConfig, IdentityBlock, WireVariant};
use serde::Serialize;

/// The `identity` property to send for one document.
#[derive(Debug, Serialize)]
pub struct RequestBody {
    pub name: String,
    pub variant: WireVariant,
    pub identity: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct CheckResult {
    pub name: String,
    pub path: String,
    pub error: Option<String>,
}

/// Render request bodies as text, one JSON object per document.
pub fn render_bodies(bodies: &[RequestBody]) -> String {
    let mut out = String::new();
    for body in bodies {
        out.push_str(&format!("# {} ({})\n", body.name, body.variant));
        let json = serde_json::to_string_pretty(&body.identity).unwrap_or_default();
        out.push_str(&json);
        out.push('\n');
    }
    out
}

/// Render the canonical form as plain text.
pub fn render_config(config: &ExpandedConfig) -> String {
    let mut out = format!("type: {}\n", config.kind);
    if !config.principal_id.is_empty() {
        out.push_str(&format!("principal_id: {}\n", config.principal_id));
    }
    if !config.tenant_id.is_empty() {
        out.push_str(&format!("tenant_id: {}\n", config.tenant_id));
    }
    for id in &config.user_assigned_identity_ids {
        out.push_str(&format!("user_assigned: {}\n", id));
    }
    out
}

/// Render identity blocks the way they read in HCL.
pub fn render_blocks(blocks: &[IdentityBlock]) -> String {
    if blocks.is_empty() {
        return "No identity.\n".to_string();
    }
    let mut out = String::new();
    for block in blocks {
        out.push_str("identity {\n");
        out.push_str(&format!("  type         = \"{}\"\n", block.kind));
        if !block.identity_ids.is_empty() {
            out.push_str("  identity_ids = [\n");
            for id in &block.identity_ids {
                out.push_str(&format!("    \"{}\",\n", id));
            }
            out.push_str("  ]\n");
        }
        if !block.principal_id.is_empty() {
            out.push_str(&format!("  principal_id = \"{}\"\n", block.principal_id));
        }
        if !block.tenant_id.is_empty() {
            out.push_str(&format!("  tenant_id    = \"{}\"\n", block.tenant_id));
        }
        out.push_str("}\n");
    }
    out
}

pub fn render_checks(results: &[CheckResult]) -> String {
    let mut out = String::new();
    for r in results {
        let line = match &r.error {
            None => format!("ok    {} ({})", r.name, r.path),
            Some(e) => format!("error {} ({}): {}", r.name, r.path, e),
        };
        out.push_str(&line);
        out.push('\n');
    }
    out
}
