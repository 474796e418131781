use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use armident_config::{load_document, load_documents, IdentityDocument};
use armident_identity::{normalize_json, ExpandedConfig, SchemaKind, WireIdentity, WireVariant};
use serde::Serialize;
use tracing::info;

use crate::cli::OutputFormat;
use crate::output::{self, CheckResult, RequestBody};

// ── Expand ────────────────────────────────────────────────────────────────────

pub fn expand(path: &Path, format: OutputFormat) -> Result<()> {
    let docs = load(path)?;
    let bodies = docs
        .iter()
        .map(request_body)
        .collect::<Result<Vec<_>>>()?;
    info!(documents = bodies.len(), "expanded identity documents");
    emit(&bodies, format, || output::render_bodies(&bodies))
}

fn request_body(doc: &IdentityDocument) -> Result<RequestBody> {
    let config = doc
        .expand()
        .with_context(|| format!("expanding `identity` for '{}'", doc.name))?;
    let wire = WireIdentity::from_expanded_config(doc.variant, &config);
    Ok(RequestBody {
        name: doc.name.clone(),
        variant: doc.variant,
        identity: wire.encode(),
    })
}

// ── Normalize ─────────────────────────────────────────────────────────────────

pub fn normalize(variant: WireVariant, file: Option<&Path>, format: OutputFormat) -> Result<()> {
    let config = read_payload(variant, file)?;
    emit(&config, format, || output::render_config(&config))
}

// ── Flatten ───────────────────────────────────────────────────────────────────

pub fn flatten(
    variant: WireVariant,
    schema: SchemaKind,
    file: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let config = read_payload(variant, file)?;
    let blocks = schema.flatten(Some(&config));
    emit(&blocks, format, || output::render_blocks(&blocks))
}

// ── Check ─────────────────────────────────────────────────────────────────────

pub fn check(path: &Path, format: OutputFormat) -> Result<()> {
    let docs = load(path)?;
    let results: Vec<CheckResult> = docs.iter().map(check_document).collect();
    emit(&results, format, || output::render_checks(&results))?;
    check_outcome(&results)
}

fn check_outcome(results: &[CheckResult]) -> Result<()> {
    let failed = results.iter().filter(|r| r.error.is_some()).count();
    if failed > 0 {
        anyhow::bail!("{failed} of {} identity document(s) failed validation", results.len());
    }
    Ok(())
}

fn check_document(doc: &IdentityDocument) -> CheckResult {
    let outcome = doc.expand().and_then(|config| config.validate().map(|_| config));
    CheckResult {
        name: doc.name.clone(),
        path: doc.path.display().to_string(),
        error: outcome.err().map(|e| e.to_string()),
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn load(path: &Path) -> Result<Vec<IdentityDocument>> {
    if path.is_dir() {
        load_documents(path)
            .with_context(|| format!("loading identity documents from {}", path.display()))
    } else {
        let doc = load_document(path)
            .with_context(|| format!("loading identity document {}", path.display()))?;
        Ok(vec![doc])
    }
}

fn read_payload(variant: WireVariant, file: Option<&Path>) -> Result<ExpandedConfig> {
    let content = match file {
        Some(p) => std::fs::read_to_string(p)
            .with_context(|| format!("Failed to read {}", p.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read payload from stdin")?;
            buf
        }
    };
    let value: serde_json::Value =
        serde_json::from_str(&content).context("payload is not valid JSON")?;
    normalize_json(variant, &value).with_context(|| format!("normalizing {variant} payload"))
}

fn emit<T, F>(value: &T, format: OutputFormat, text: F) -> Result<()>
where
    T: Serialize + ?Sized,
    F: FnOnce() -> String,
{
    match format {
        OutputFormat::Text => print!("{}", text()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(value)?),
    }
    Ok(())
}
