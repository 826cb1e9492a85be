//! Artifact and capability registries.
//!
//! The registries are the static catalogs a profile selects from:
//! - **Artifacts** (`artifacts.yaml`): fixed metadata per compiled document
//! - **Capabilities** (`capabilities.yaml`): reusable fragments with an
//!   optional storage path
//!
//! Both are decoded straight into typed records. Unknown keys and missing
//! required keys are load errors naming the file.

mod artifacts;
mod capabilities;


pub use artifacts::{ArtifactDefinition, ArtifactRegistry, OutputShape};
pub use capabilities::{CapabilityDefinition, CapabilityRegistry};

use crate::config::PipelineConfig;
use crate::error::{QuireError, Result};
use serde::de::DeserializeOwned;
use std::path::Path;

/// Both registries, loaded once per run.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    pub artifacts: ArtifactRegistry,
    pub capabilities: CapabilityRegistry,
}

impl Registry {
    /// Load both registries from the content root.
    pub fn load(source_root: &Path, config: &PipelineConfig) -> Result<Self> {
        let artifacts =
            ArtifactRegistry::load(&source_root.join(config.artifact_registry_path()))?;
        let capabilities =
            CapabilityRegistry::load(&source_root.join(config.capability_registry_path()))?;

        tracing::debug!(
            artifacts = artifacts.len(),
            capabilities = capabilities.len(),
            "registries loaded"
        );

        Ok(Self {
            artifacts,
            capabilities,
        })
    }
}

/// Read and decode a YAML document, mapping every failure to a load error.
pub(crate) fn load_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|e| QuireError::load(path, e))?;
    parse_document(&content, path)
}

/// Decode a YAML document. `path` only labels errors.
pub(crate) fn parse_document<T: DeserializeOwned>(yaml: &str, path: &Path) -> Result<T> {
    if yaml.trim().is_empty() {
        return Err(QuireError::load(path, "document is empty"));
    }
    serde_yaml::from_str(yaml).map_err(|e| QuireError::load(path, e))
}

/// Check that an id can name a directory and an output file.
pub(crate) fn validate_id(kind: &str, id: &str, path: &Path) -> Result<()> {
    if id.trim().is_empty() {
        return Err(QuireError::load(path, format!("{} id must be non-empty", kind)));
    }

    if id.contains(['/', '\\']) || id == "." || id == ".." {
        return Err(QuireError::load(
            path,
            format!("{} id '{}' must not contain path separators", kind, id),
        ));
    }

    Ok(())
}
