use std::path::{Path, PathBuf};

use armident_identity::{
    ExpandedConfig, IdentityBlock, IdentityError, IdentityType, SchemaKind, WireVariant,
};
use tracing::debug;

use crate::error::ConfigError;
use crate::raw::{RawDocument, RawIdentityBlock};

/// One resource's identity configuration, loaded from YAML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityDocument {
    pub name: String,
    pub schema: SchemaKind,
    pub variant: WireVariant,
    pub identity: Vec<IdentityBlock>,
    /// File the document was loaded from.
    pub path: PathBuf,
}

impl IdentityDocument {
    /// Run the schema rules over the configured block.
    pub fn expand(&self) -> Result<ExpandedConfig, IdentityError> {
        self.schema.expand(&self.identity)
    }
}

/// Load a single identity document.
pub fn load_document(path: &Path) -> Result<IdentityDocument, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let raw: RawDocument = serde_yaml::from_str(&content).map_err(|e| ConfigError::YamlParse {
        path: path.display().to_string(),
        source: e,
    })?;
    debug!("Loading identity document from {}", path.display());
    convert_document(raw, path)
}

/// Walk `dir` and load every `*.yml` / `*.yaml` file found, ordered by path.
pub fn load_documents(dir: &Path) -> Result<Vec<IdentityDocument>, ConfigError> {
    let mut paths = Vec::new();
    collect_paths(dir, &mut paths)?;
    paths.sort();
    paths.iter().map(|p| load_document(p)).collect()
}

fn collect_paths(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), ConfigError> {
    let entries = std::fs::read_dir(dir).map_err(|e| ConfigError::Io {
        path: dir.display().to_string(),
        source: e,
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::Io {
            path: dir.display().to_string(),
            source: e,
        })?;
        let path = entry.path();
        if path.is_dir() {
            collect_paths(&path, out)?;
        } else if is_yaml(&path) {
            out.push(path);
        }
    }

    Ok(())
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yml") | Some("yaml")
    )
}

fn convert_document(raw: RawDocument, path: &Path) -> Result<IdentityDocument, ConfigError> {
    let schema = raw
        .schema
        .parse::<SchemaKind>()
        .map_err(|e| conversion(path, e))?;
    let variant = raw
        .variant
        .parse::<WireVariant>()
        .map_err(|e| conversion(path, e))?;
    let identity = raw
        .identity
        .into_iter()
        .map(|b| convert_block(b, path))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(IdentityDocument {
        name: raw.name,
        schema,
        variant,
        identity,
        path: path.to_path_buf(),
    })
}

fn convert_block(raw: RawIdentityBlock, path: &Path) -> Result<IdentityBlock, ConfigError> {
    let kind = raw
        .kind
        .parse::<IdentityType>()
        .map_err(|e| conversion(path, e))?;
    Ok(IdentityBlock {
        kind,
        identity_ids: raw.identity_ids,
        ..Default::default()
    })
}

fn conversion(path: &Path, err: IdentityError) -> ConfigError {
    ConfigError::Conversion {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}
